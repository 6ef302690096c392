//! Attribute error types

use thiserror::Error;

/// Errors raised while constructing, encoding or decoding attributes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    /// Wire data is inconsistent with its declared lengths
    #[error("Malformed attribute data: {0}")]
    Malformed(String),

    /// A value does not satisfy the contract of its attribute kind
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Sub-attribute vendor ID does not match the enclosing Vendor-Specific attribute
    #[error("Sub-attribute has incorrect vendor ID: expected {expected}, got {actual}")]
    VendorMismatch { expected: u32, actual: u32 },

    /// Rendered attribute does not fit its one-byte length field
    #[error("Encoded attribute too long: {length} bytes (max {limit})")]
    EncodeOverflow { length: usize, limit: usize },

    /// Rendered Vendor-Specific attribute length outside 7..=255
    #[error("Vendor-Specific attribute length out of range: {0} bytes (expected 7..=255)")]
    VendorSpecificLength(usize),

    /// Text is neither a known enumeration name nor an unsigned integer
    #[error("Invalid integer value: {0}")]
    InvalidInteger(String),
}

/// Result type for attribute operations
pub type AttributeResult<T> = Result<T, AttributeError>;
