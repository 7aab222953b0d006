//! Wall-clock accounting for the phases of a REXI step.

use std::fmt;
use std::time::{Duration, Instant};

/// Phase of [`ParallelSumEngine::advance`](super::ParallelSumEngine::advance).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Broadcast,
    Preprocessing,
    Solve,
    Reduce,
}

/// Accumulated time per phase over all `advance` calls since the last reset.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RexiTimings {
    pub broadcast: Duration,
    pub preprocessing: Duration,
    pub solve: Duration,
    pub reduce: Duration,
    pub calls: usize,
}

impl RexiTimings {
    /// Add the time elapsed since `start` to a phase.
    pub fn record(&mut self, phase: Phase, start: Instant) {
        let elapsed = start.elapsed();
        match phase {
            Phase::Broadcast => self.broadcast += elapsed,
            Phase::Preprocessing => self.preprocessing += elapsed,
            Phase::Solve => self.solve += elapsed,
            Phase::Reduce => self.reduce += elapsed,
        }
    }

    /// Sum over all phases.
    pub fn total(&self) -> Duration {
        self.broadcast + self.preprocessing + self.solve + self.reduce
    }

    /// Mean total time per call.
    pub fn mean_per_call(&self) -> Duration {
        if self.calls == 0 {
            Duration::ZERO
        } else {
            self.total() / self.calls as u32
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for RexiTimings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "broadcast {:.3?}, preprocessing {:.3?}, solve {:.3?}, reduce {:.3?} ({} calls)",
            self.broadcast, self.preprocessing, self.solve, self.reduce, self.calls
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_reset() {
        let mut t = RexiTimings::default();
        let start = Instant::now() - Duration::from_millis(5);
        t.record(Phase::Solve, start);
        t.calls = 1;
        assert!(t.solve >= Duration::from_millis(5));
        assert_eq!(t.total(), t.solve);
        assert_eq!(t.mean_per_call(), t.total());
        t.reset();
        assert_eq!(t, RexiTimings::default());
    }
}
