//! The typed blackboard shared between analyzers.
//!
//! Each analyzer writes exactly one [`Slot`] and may read any slot an
//! earlier analyzer produced. A slot is one of `Empty`, `Filled`, or
//! `Failed`; every downstream read goes through [`Slot::available`] before
//! [`Slot::value`] — there is no implicit unwrap, so a missing or failed
//! upstream slot degrades the patterns that depend on it instead of
//! crashing the pipeline (§5, §7).

use std::fmt;

/// A single typed cell on the blackboard.
pub enum Slot<T> {
    /// Nothing has attempted to populate this slot yet.
    Empty,
    /// The producing analyzer populated this slot successfully.
    Filled {
        /// The produced value.
        value: T,
        /// Name of the analyzer that produced it.
        producer: &'static str,
    },
    /// The producing analyzer ran but failed.
    Failed {
        /// Description of the failure.
        error: String,
        /// Name of the analyzer that failed.
        producer: &'static str,
    },
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<T> Slot<T> {
    /// True only when the slot holds a successfully produced value.
    pub fn available(&self) -> bool {
        matches!(self, Slot::Filled { .. })
    }

    /// Borrow the value, or `None` if the slot is empty or failed.
    pub fn value(&self) -> Option<&T> {
        match self {
            Slot::Filled { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Take ownership of the value if present, consuming the slot.
    pub fn into_value(self) -> Option<T> {
        match self {
            Slot::Filled { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Fill the slot with a value produced by `producer`.
    pub fn set(&mut self, value: T, producer: &'static str) {
        *self = Slot::Filled { value, producer };
    }

    /// Mark the slot as failed.
    pub fn fail(&mut self, error: impl Into<String>, producer: &'static str) {
        *self = Slot::Failed {
            error: error.into(),
            producer,
        };
    }

    /// Name of the analyzer that produced (or failed to produce) this slot.
    pub fn producer(&self) -> Option<&'static str> {
        match self {
            Slot::Filled { producer, .. } | Slot::Failed { producer, .. } => Some(producer),
            Slot::Empty => None,
        }
    }

    /// Error message if the slot failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Slot::Failed { error, .. } => Some(error.as_str()),
            _ => None,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Empty => write!(f, "Slot::Empty"),
            Slot::Filled { value, producer } => {
                write!(f, "Slot::Filled({producer} -> {value:?})")
            }
            Slot::Failed { error, producer } => write!(f, "Slot::Failed({producer}: {error})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slot_is_unavailable() {
        let slot: Slot<i32> = Slot::default();
        assert!(!slot.available());
        assert_eq!(slot.value(), None);
    }

    #[test]
    fn filled_slot_reports_its_producer() {
        let mut slot: Slot<i32> = Slot::default();
        slot.set(42, "structural");
        assert!(slot.available());
        assert_eq!(slot.value(), Some(&42));
        assert_eq!(slot.producer(), Some("structural"));
    }

    #[test]
    fn failed_slot_is_unavailable_but_explains_why() {
        let mut slot: Slot<i32> = Slot::default();
        slot.fail("no git history", "temporal");
        assert!(!slot.available());
        assert_eq!(slot.error(), Some("no git history"));
    }
}
