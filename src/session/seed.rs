use std::fmt;

/// Source of random 64-bit values for seed tokens and cache keys.
pub trait SeedSource: Send {
    /// Next random value.
    fn next_u64(&mut self) -> u64;
}

/// [`SeedSource`] backed by the thread-local `rand` generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRngSeed;

impl SeedSource for ThreadRngSeed {
    fn next_u64(&mut self) -> u64 {
        rand::random()
    }
}

/// [`SeedSource`] that always yields the same value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedSeed(pub u64);

impl SeedSource for FixedSeed {
    fn next_u64(&mut self) -> u64 {
        self.0
    }
}

/// Per-run token naming the artifact files, doubling as the host cache key.
///
/// With "keep canvas" set the token is the stable `use_cache` sentinel, so the host sees the same
/// key on every run and skips re-executing the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeedToken {
    /// Fresh random value.
    Random(u64),
    /// Stable sentinel.
    UseCache,
}

impl SeedToken {
    /// Sentinel text for [`SeedToken::UseCache`].
    pub const USE_CACHE: &'static str = "use_cache";

    /// Token for one run.
    pub fn draw(keep_canvas: bool, seeds: &mut dyn SeedSource) -> Self {
        if keep_canvas {
            Self::UseCache
        } else {
            Self::Random(seeds.next_u64())
        }
    }
}

impl fmt::Display for SeedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random(v) => write!(f, "{v}"),
            Self::UseCache => f.write_str(Self::USE_CACHE),
        }
    }
}

impl serde::Serialize for SeedToken {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Random(v) => serializer.serialize_u64(*v),
            Self::UseCache => serializer.serialize_str(Self::USE_CACHE),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/seed.rs"]
mod tests;
