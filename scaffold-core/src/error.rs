//! Error types for the signing primitives

/// Result type for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Core error types
///
/// Signature mismatches are not errors; verification reports them as `false`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The MAC rejected the key
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    /// A query component did not decode to UTF-8
    #[error("Invalid percent-encoding in {segment:?}: {reason}")]
    InvalidEncoding {
        /// The undecoded component
        segment: String,
        /// Decoder message
        reason: String,
    },
}
