use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::foundation::error::{CanvasError, CanvasResult};
use crate::protocol::payload::EditPayload;
use crate::session::gate::{SessionTicket, WaitOutcome};

/// Process-wide single slot for the edit session in flight.
///
/// The node thread installs itself with [`SessionStore::begin`] and blocks on the returned ticket;
/// the HTTP completion handler calls [`SessionStore::deliver`]. Installing a new session replaces
/// whatever was there (last writer wins, nothing is queued).
#[derive(Debug, Default)]
pub struct SessionStore {
    slot: Mutex<Slot>,
    signal: Condvar,
}

#[derive(Debug, Default)]
struct Slot {
    next_generation: u64,
    active: Option<ActiveSession>,
}

#[derive(Debug)]
struct ActiveSession {
    generation: u64,
    owner: String,
    // `Some` doubles as the completion signal.
    payload: Option<EditPayload>,
}

impl Slot {
    fn delivered_to(&self, generation: u64) -> bool {
        self.active
            .as_ref()
            .is_some_and(|s| s.generation == generation && s.payload.is_some())
    }
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install `owner` as the active session, dropping any previous one and its payload.
    pub fn begin(self: &Arc<Self>, owner: impl Into<String>) -> SessionTicket {
        let owner = owner.into();
        let mut slot = self.lock_slot();
        let generation = slot.next_generation;
        slot.next_generation = slot.next_generation.wrapping_add(1);
        if let Some(prev) = slot.active.replace(ActiveSession {
            generation,
            owner: owner.clone(),
            payload: None,
        }) {
            tracing::warn!(
                previous = %prev.owner,
                owner = %owner,
                "canvas session preempted by a newer run"
            );
        }
        drop(slot);
        tracing::debug!(owner = %owner, generation, "canvas session started");
        SessionTicket::new(Arc::clone(self), generation, owner)
    }

    /// Hand the browser's payload to the active session and wake its waiter.
    pub fn deliver(&self, payload: EditPayload) -> CanvasResult<()> {
        let mut slot = self.lock_slot();
        let Some(active) = slot.active.as_mut() else {
            return Err(CanvasError::NoActiveSession);
        };
        tracing::debug!(owner = %active.owner, confirmed = payload.confirmed, "canvas edit delivered");
        active.payload = Some(payload);
        drop(slot);
        self.signal.notify_all();
        Ok(())
    }

    /// Clear the slot if it still belongs to `generation`.
    pub(crate) fn end(&self, generation: u64) {
        let mut slot = self.lock_slot();
        if slot
            .active
            .as_ref()
            .is_some_and(|s| s.generation == generation)
        {
            slot.active = None;
            tracing::debug!(generation, "canvas session ended");
        }
    }

    /// Block until `generation` receives a payload or `timeout` elapses.
    pub(crate) fn wait_for(&self, generation: u64, timeout: Duration) -> WaitOutcome {
        let slot = self.lock_slot();
        let (mut slot, _) = self
            .signal
            .wait_timeout_while(slot, timeout, |slot| !slot.delivered_to(generation))
            .unwrap_or_else(PoisonError::into_inner);

        match slot.active.as_mut() {
            Some(active) if active.generation == generation => match active.payload.take() {
                Some(payload) => WaitOutcome::Delivered(payload),
                None => WaitOutcome::TimedOut,
            },
            _ => WaitOutcome::TimedOut,
        }
    }

    /// Whether any session currently owns the slot.
    pub fn is_active(&self) -> bool {
        self.lock_slot().active.is_some()
    }

    /// Owner of the active session, if any.
    pub fn active_owner(&self) -> Option<String> {
        self.lock_slot().active.as_ref().map(|s| s.owner.clone())
    }

    /// Whether the active session has a payload waiting to be picked up.
    pub fn is_signaled(&self) -> bool {
        self.lock_slot()
            .active
            .as_ref()
            .is_some_and(|s| s.payload.is_some())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/store.rs"]
mod tests;
