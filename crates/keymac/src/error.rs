//! MAC errors.

#![forbid(unsafe_code)]

/// An error from a [`Mac`][crate::mac::Mac] engine.
///
/// All errors are raised synchronously at the point of
/// violation: key and parameter errors at construction (or
/// [`rekey`][crate::mac::Mac::rekey]) time, argument errors at
/// call time. No engine is ever left partially initialized.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum MacError {
    /// The key violates the algorithm's key-size constraints.
    #[error("invalid key: {0}")]
    InvalidKey(&'static str),

    /// An algorithm parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// A caller-supplied argument is invalid (e.g., an output
    /// buffer too small for the tag).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The MAC (authentication tag) could not be verified.
    #[error("unable to verify MAC")]
    Verification,
}
