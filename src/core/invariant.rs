//! Fatal-invariant checking.
//!
//! Per the error-handling design, violations of the data-model invariants
//! (e.g. a finding referencing a file absent from `per_file`) are
//! programming errors, not recoverable runtime conditions: they panic in
//! debug builds so they are caught in development and testing, and degrade
//! to a logged error in release builds so a production run still completes.

use tracing::error;

/// Check a data-model invariant.
///
/// In debug builds, a failed check panics immediately with `message`. In
/// release builds, it logs the violation at `error` level and returns
/// `false` so the caller can drop the offending item and continue.
#[track_caller]
pub fn check(condition: bool, message: &str) -> bool {
    if !condition {
        if cfg!(debug_assertions) {
            panic!("invariant violated: {message}");
        }
        error!(invariant = message, "invariant violated, dropping item");
    }
    condition
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passing_condition_is_a_no_op() {
        assert!(check(true, "should never fire"));
    }

    #[test]
    #[should_panic(expected = "invariant violated")]
    fn failing_condition_panics_in_debug() {
        check(false, "deliberate test failure");
    }
}
