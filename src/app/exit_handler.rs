//! Exit code logic for the dumper process.
//!
//! Single responsibility: map how the run ended to the process exit outcome.

use stream_dumper::DumpError;
use tracing::debug;

use crate::ProcessExit;

/// How a supervised dump ended.
#[derive(Debug)]
pub(crate) enum RunOutcome {
    /// Stopped on request (OS signal).
    Stopped,
    /// The stream reached its end.
    Finished,
    /// The copy failed; carries the first error seen.
    Failed(DumpError),
}

/// Determines the process exit outcome for a run.
pub(crate) fn determine_exit_outcome(outcome: &RunOutcome) -> ProcessExit {
    match outcome {
        RunOutcome::Stopped | RunOutcome::Finished => ProcessExit::Success,
        RunOutcome::Failed(error) => {
            debug!(error = %error, failures = error.failure_count(), "run ended in a dump error");
            ProcessExit::Failure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_outcome_success_when_stopped() {
        assert_eq!(
            determine_exit_outcome(&RunOutcome::Stopped),
            ProcessExit::Success
        );
    }

    #[test]
    fn test_exit_outcome_success_when_finished() {
        assert_eq!(
            determine_exit_outcome(&RunOutcome::Finished),
            ProcessExit::Success
        );
    }

    #[test]
    fn test_exit_outcome_failure_when_dump_failed() {
        let outcome = RunOutcome::Failed(DumpError::invalid_url("x"));
        assert_eq!(determine_exit_outcome(&outcome), ProcessExit::Failure);
    }
}
