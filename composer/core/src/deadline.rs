use crate::{Error, Stage};
use std::time::{Duration, Instant};

/// A caller-imposed limit on the wall-clock time of one composition.
///
/// The pipeline never blocks, so the deadline is checked between stages rather than enforced by
/// a timer.
#[derive(Copy, Clone, Debug, Default)]
pub struct Deadline(Option<Expiry>);

#[derive(Copy, Clone, Debug)]
struct Expiry {
    at: Instant,
    budget: Duration,
}

// === impl Deadline ===

impl Deadline {
    /// A deadline that never expires.
    pub fn none() -> Self {
        Self(None)
    }

    pub fn after(budget: Duration) -> Self {
        match Instant::now().checked_add(budget) {
            Some(at) => Self(Some(Expiry { at, budget })),
            None => Self::none(),
        }
    }

    pub fn check(&self, stage: Stage) -> Result<(), Error> {
        match self.0 {
            Some(Expiry { at, budget }) if Instant::now() >= at => {
                Err(Error::Timeout { stage, budget })
            }
            _ => Ok(()),
        }
    }
}
