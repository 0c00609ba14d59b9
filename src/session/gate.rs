use std::sync::Arc;
use std::time::Duration;

use crate::protocol::payload::EditPayload;
use crate::session::store::SessionStore;

/// Result of blocking on a session.
#[derive(Clone, Debug, PartialEq)]
pub enum WaitOutcome {
    /// The browser posted a payload (confirmed or cancelled).
    Delivered(EditPayload),
    /// Nothing arrived in time; the caller degrades to default outputs.
    TimedOut,
}

/// Ownership of the active session slot, held by the node for the length of one run.
///
/// Dropping the ticket ends the session, so every exit path of the run clears the slot.
#[derive(Debug)]
pub struct SessionTicket {
    store: Arc<SessionStore>,
    generation: u64,
    owner: String,
}

impl SessionTicket {
    pub(crate) fn new(store: Arc<SessionStore>, generation: u64, owner: String) -> Self {
        Self {
            store,
            generation,
            owner,
        }
    }

    /// Owner id this ticket was issued for.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Suspend the calling thread until the completion handler delivers or `timeout` elapses.
    ///
    /// A ticket that was preempted by a newer [`SessionStore::begin`] never sees a delivery and
    /// runs into the timeout.
    pub fn wait(&self, timeout: Duration) -> WaitOutcome {
        let outcome = self.store.wait_for(self.generation, timeout);
        if outcome == WaitOutcome::TimedOut {
            tracing::info!(
                owner = %self.owner,
                timeout_secs = timeout.as_secs_f64(),
                "no canvas edit before timeout"
            );
        }
        outcome
    }

    /// End the session now instead of at drop.
    pub fn end(self) {
        drop(self);
    }
}

impl Drop for SessionTicket {
    fn drop(&mut self) {
        self.store.end(self.generation);
    }
}
