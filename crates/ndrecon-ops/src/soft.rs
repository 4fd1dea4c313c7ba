//! Success-flag adapters for callers that prefer logging over propagation.

use crate::error::TensorOpsError;

/// Converts an operation result into a logged success flag.
pub trait SoftResult<T> {
    /// Returns `true` on success. A failure is logged with `operation` and dropped.
    fn succeeded(self, operation: &str) -> bool;

    /// Returns the value on success. A failure is logged with `operation` and dropped.
    fn ok_or_log(self, operation: &str) -> Option<T>;
}

impl<T> SoftResult<T> for Result<T, TensorOpsError> {
    fn succeeded(self, operation: &str) -> bool {
        self.ok_or_log(operation).is_some()
    }

    fn ok_or_log(self, operation: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("{operation} failed ({:?}): {e}", e.kind());
                None
            }
        }
    }
}
