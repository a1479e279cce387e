//! Onboarding tour flags.
//!
//! Whether the tour has been seen is persisted so returning users are not
//! shown the tutorial again; the active/step state is per-session.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::storage::{Storage, TUTORIAL_SEEN_KEY};

/// Per-session tour progress plus the persisted seen flag.
pub struct Tour {
    active: AtomicBool,
    step: AtomicUsize,
    storage: Arc<dyn Storage>,
}

impl Tour {
    pub(crate) fn new(storage: Arc<dyn Storage>) -> Self {
        Self { active: AtomicBool::new(false), step: AtomicUsize::new(0), storage }
    }

    /// Start the tour from the first step.
    pub fn start(&self) {
        self.step.store(0, Ordering::Relaxed);
        self.active.store(true, Ordering::Relaxed);
    }

    /// End the tour and remember that it has been seen.
    pub fn end(&self) {
        self.active.store(false, Ordering::Relaxed);
        self.storage.set(TUTORIAL_SEEN_KEY, "true");
    }

    pub fn advance(&self) -> usize {
        self.step.fetch_add(1, Ordering::Relaxed) + 1
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn step(&self) -> usize {
        self.step.load(Ordering::Relaxed)
    }

    /// True when a previous session completed the tour.
    #[must_use]
    pub fn seen(&self) -> bool {
        self.storage.get(TUTORIAL_SEEN_KEY).as_deref() == Some("true")
    }
}

#[cfg(test)]
#[path = "tour_test.rs"]
mod tests;
