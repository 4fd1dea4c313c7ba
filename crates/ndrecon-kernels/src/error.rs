use thiserror::Error;

/// An error type for kernel operations.
#[derive(Error, Debug, PartialEq)]
pub enum KernelError {
    /// Length mismatch for vector operations
    #[error("Length mismatch: expected equal length vectors, got {0} and {1}")]
    LengthMismatch(usize, usize),

    /// The kernel needs at least one element
    #[error("Empty input: {0} requires at least one element")]
    EmptyInput(&'static str),
}
