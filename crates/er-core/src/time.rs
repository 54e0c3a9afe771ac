//! Host time as seen by the planner.
//!
//! The host owns the clock; the planner only compares ticks, to scope its
//! decision cache and to debounce repeated opportunity searches.

use std::fmt;

/// A host simulation tick.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Ticks elapsed from `earlier` to `self`; zero when `earlier` is later.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// `true` while fewer than `window` ticks have passed since `earlier`.
    #[inline]
    pub fn within(self, earlier: Tick, window: u64) -> bool {
        self.since(earlier) < window
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0.saturating_add(rhs))
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// A host-side tick counter.
#[derive(Copy, Clone, Debug, Default)]
pub struct SimClock {
    now: Tick,
}

impl SimClock {
    #[inline]
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Move to the next tick and return it.
    #[inline]
    pub fn advance(&mut self) -> Tick {
        self.now = self.now + 1;
        self.now
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.now)
    }
}
