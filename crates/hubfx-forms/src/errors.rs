//! Error taxonomy for control-tree operations
//!
//! All variants signal caller bugs (stale paths, wrong node kinds, badly
//! shaped values). They are returned from the pure tree functions and never
//! caught internally.

use serde::{Deserialize, Serialize};

use crate::config::FormControlType;
use crate::control_ref::ControlRef;

/// Error type for all forms operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum FormsError {
    /// A path does not resolve to an existing control
    #[error("Control not found: [{control_ref}]")]
    NotFound {
        /// Path that failed to resolve
        control_ref: ControlRef,
    },

    /// The control at a path is not of the expected variant
    #[error("Wrong control type at [{control_ref}]: expected {expected:?}, found {actual:?}")]
    WrongControlType {
        /// Path of the offending control
        control_ref: ControlRef,
        /// Variant the operation requires
        expected: FormControlType,
        /// Variant actually found
        actual: FormControlType,
    },

    /// A whole-value replacement does not fit the existing children
    #[error("Shape mismatch at [{control_ref}]: {reason}")]
    ShapeMismatch {
        /// Path of the Group/Array receiving the value
        control_ref: ControlRef,
        /// Description of the mismatch
        reason: String,
    },
}

impl FormsError {
    /// Create a not found error
    pub fn not_found(control_ref: &ControlRef) -> Self {
        Self::NotFound {
            control_ref: control_ref.clone(),
        }
    }

    /// Create a wrong control type error
    pub fn wrong_control_type(
        control_ref: &ControlRef,
        expected: FormControlType,
        actual: FormControlType,
    ) -> Self {
        Self::WrongControlType {
            control_ref: control_ref.clone(),
            expected,
            actual,
        }
    }

    /// Create a shape mismatch error
    pub fn shape_mismatch(control_ref: &ControlRef, reason: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            control_ref: control_ref.clone(),
            reason: reason.into(),
        }
    }
}
