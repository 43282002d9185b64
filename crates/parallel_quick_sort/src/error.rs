use std::any::Any;

use thiserror::Error;

/// Failure of a parallel sort.
///
/// Cloneable so that a single failure can be handed to every thread waiting
/// on the partition that produced it.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SortError {
    #[error("comparator panicked while sorting a partition: {0}")]
    ComparatorPanicked(String),
    #[error("partition result was dropped before it was delivered")]
    ResultLost,
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, UnwindSafe};

    use super::*;

    fn payload_of(f: impl FnOnce() + UnwindSafe) -> Box<dyn Any + Send> {
        panic::catch_unwind(f).unwrap_err()
    }

    #[test]
    fn panic_message_extracts_str_and_string_payloads() {
        let payload = payload_of(|| panic!("static message"));
        assert_eq!(panic_message(&*payload), "static message");

        let payload = payload_of(|| panic!("formatted {}", 7));
        assert_eq!(panic_message(&*payload), "formatted 7");

        let payload = payload_of(|| panic::panic_any(42_u32));
        assert_eq!(panic_message(&*payload), "non-string panic payload");
    }

    #[test]
    fn display_includes_panic_message() {
        let err = SortError::ComparatorPanicked("boom".to_string());
        assert_eq!(
            err.to_string(),
            "comparator panicked while sorting a partition: boom"
        );
    }
}
