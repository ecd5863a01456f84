//! Limits applied by strict pointer parsing

use crate::error::PointerError;
use serde::{Deserialize, Serialize};

/// Limits enforced by [`JsonPointer::parse_strict`](crate::JsonPointer::parse_strict)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerLimits {
    /// Maximum pointer depth (number of segments)
    pub max_depth: usize,
    /// Maximum pointer string length in bytes
    pub max_pointer_length: usize,
}

impl Default for PointerLimits {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_pointer_length: 1024,
        }
    }
}

impl PointerLimits {
    /// Hard maximum limits that cannot be exceeded
    pub fn hard_maximums() -> Self {
        Self {
            max_depth: 256,
            max_pointer_length: 16 * 1024,
        }
    }

    /// Validate limits against hard maximums
    pub fn validate(&self) -> Result<(), PointerError> {
        let hard = Self::hard_maximums();

        if self.max_depth > hard.max_depth {
            return Err(PointerError::ConfigurationExceedsHardLimits {
                reason: format!(
                    "max_depth {} exceeds hard limit {}",
                    self.max_depth, hard.max_depth
                ),
                max_depth: hard.max_depth,
                max_ptr_len: hard.max_pointer_length,
            });
        }

        if self.max_pointer_length > hard.max_pointer_length {
            return Err(PointerError::ConfigurationExceedsHardLimits {
                reason: format!(
                    "max_pointer_length {} exceeds hard limit {}",
                    self.max_pointer_length, hard.max_pointer_length
                ),
                max_depth: hard.max_depth,
                max_ptr_len: hard.max_pointer_length,
            });
        }

        Ok(())
    }
}
