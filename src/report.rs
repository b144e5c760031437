//! Summary printed when a run ends.

use std::fmt;
use std::time::Duration;

use crate::world::TerminationState;

/// Timing and step figures for a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Wall-clock time between construction and finalization.
    pub real_time: Duration,
    /// Accumulated simulated time (s).
    pub sim_time: f64,
    /// Counted public calls, or 0 when counting is disabled.
    pub steps: u64,
    pub outcome: TerminationState,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Real time taken to complete: {}ms", (self.real_time.as_secs_f64() * 1000.0).round())?;
        writeln!(f, "Sleep time taken to complete: {}s", self.sim_time.round())?;
        write!(f, "steps taken to complete: {}", self.steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_display() {
        let report = RunReport {
            real_time: Duration::from_micros(12_600),
            sim_time: 17.6,
            steps: 1234,
            outcome: TerminationState::DoneManual,
        };
        assert_eq!(
            report.to_string(),
            "Real time taken to complete: 13ms\nSleep time taken to complete: 18s\nsteps taken to complete: 1234"
        );
    }
}
