//! # Async validation bookkeeping
//!
//! In-flight state per control and validator index:
//! - start: every control from the root to the target becomes `validating`,
//!   and every async validator index on the target is marked in progress
//! - resolve: the index is cleared, its errors merged, and `validating` is
//!   recomputed from the target back up to the root

use serde::{Deserialize, Serialize};

use crate::control::AbstractControl;
use crate::control_ref::{ControlKey, ControlRef};
use crate::errors::FormsError;
use crate::validators::FormErrors;

/// Result of one async validator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlAsyncValidationResponse {
    /// Control the validator is attached to
    pub control_ref: ControlRef,
    /// Position of the validator in the control's async validator list
    pub validator_index: usize,
    /// Validator output
    pub errors: FormErrors,
}

/// Mark async validation as started for the control at `path`.
pub fn handle_async_validation(tree: &AbstractControl, path: &ControlRef) -> Result<AbstractControl, FormsError> {
    let mut next = tree.clone();
    start(&mut next, path.segments(), path)?;
    Ok(next)
}

fn start(node: &mut AbstractControl, rest: &[ControlKey], path: &ControlRef) -> Result<(), FormsError> {
    node.validating = true;
    match rest.split_first() {
        None => {
            for index in 0..node.config.async_validators.len() {
                node.async_validate_in_progress.insert(index, true);
            }
            Ok(())
        }
        Some((key, tail)) => {
            let child = node.child_mut(key).ok_or_else(|| FormsError::not_found(path))?;
            start(child, tail, path)
        }
    }
}

/// Apply an async validation result.
///
/// The merge is unconditional: a result for an index that is not in flight
/// is still applied.
pub fn handle_async_validation_response_success(
    tree: &AbstractControl,
    response: &ControlAsyncValidationResponse,
) -> Result<AbstractControl, FormsError> {
    let mut next = tree.clone();
    resolve(&mut next, response.control_ref.segments(), response)?;
    Ok(next)
}

/// Returns the node's new `validating` flag.
fn resolve(
    node: &mut AbstractControl,
    rest: &[ControlKey],
    response: &ControlAsyncValidationResponse,
) -> Result<bool, FormsError> {
    let child_validating = match rest.split_first() {
        None => {
            if response.validator_index >= node.config.async_validators.len() {
                tracing::warn!(
                    control_ref = %response.control_ref,
                    validator_index = response.validator_index,
                    "async validation result for an unconfigured validator index"
                );
            }
            node.async_validate_in_progress.insert(response.validator_index, false);
            for (key, flag) in &response.errors {
                node.async_errors.insert(key.clone(), *flag);
                node.errors.insert(key.clone(), *flag);
            }
            false
        }
        Some((key, tail)) => {
            let child = node
                .child_mut(key)
                .ok_or_else(|| FormsError::not_found(&response.control_ref))?;
            resolve(child, tail, response)?
        }
    };

    node.validating = node.is_async_validating() || child_validating;
    Ok(node.validating)
}
