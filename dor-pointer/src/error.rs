//! Error types for strict pointer handling

use thiserror::Error;

/// Errors raised by strict pointer parsing and limit validation.
///
/// The lenient operations (segment decoding, lookups, replacement) never
/// produce these; absence is reported as `None` there.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointerError {
    /// Invalid pointer syntax
    #[error(
        "Invalid JSON Pointer syntax: '{pointer}' - {reason}\n\
         \n\
         JSON Pointers must:\n\
         - Start with '/' (or be empty string for root)\n\
         - Use '~0' to escape '~' and '~1' to escape '/'\n\
         \n\
         See RFC 6901 for details."
    )]
    InvalidPointer {
        /// The invalid pointer string
        pointer: String,
        /// Explanation of why the pointer is invalid
        reason: String,
    },

    /// Pointer string too long
    #[error("Pointer too long: {length} characters (max: {max_length})")]
    PointerTooLong {
        /// The pointer string that exceeded the limit
        pointer: String,
        /// Actual length of the pointer string (bytes)
        length: usize,
        /// Maximum pointer length allowed (bytes)
        max_length: usize,
    },

    /// Pointer depth limit exceeded
    #[error("Pointer depth limit exceeded: '{pointer}' has depth {depth} (max: {max_depth})")]
    DepthLimitExceeded {
        /// JSON Pointer being parsed
        pointer: String,
        /// Actual number of segments
        depth: usize,
        /// Maximum depth allowed
        max_depth: usize,
    },

    /// Configuration exceeds hard limits
    #[error(
        "Configuration exceeds hard limits: {reason}\n\
         \n\
         Hard limits:\n\
         - max_depth: {max_depth}\n\
         - max_pointer_length: {max_ptr_len} characters"
    )]
    ConfigurationExceedsHardLimits {
        /// Description of which limit was exceeded
        reason: String,
        /// Hard maximum depth
        max_depth: usize,
        /// Hard maximum pointer length
        max_ptr_len: usize,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PointerError>;
