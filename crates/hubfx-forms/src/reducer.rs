//! # Forms reducer
//!
//! `(tree, message) -> tree`. Value and structural changes are followed by
//! sync validation and a dirty pass; async bookkeeping messages only touch
//! in-flight state (plus sync validation on resolve).

use futures::future;
use futures::stream::{BoxStream, Stream, StreamExt};
use hubfx_core::Message;

use crate::actions::FormsAction;
use crate::async_validation::{handle_async_validation, handle_async_validation_response_success};
use crate::control::AbstractControl;
use crate::errors::FormsError;
use crate::mutations::{
    add_form_array_control, add_form_group_control, mark_control_as_pristine, mark_control_as_touched,
    mark_control_as_untouched, remove_control, reset_control, update_dirty,
};
use crate::tree::set_value_and_propagate;
use crate::validation::sync_validate;

/// Reduce one message into the tree.
///
/// Errors are caller bugs (stale path, wrong variant, bad value shape) and
/// are returned as-is. Messages of other kinds leave the tree unchanged.
pub fn forms_reducer(state: &AbstractControl, action: &FormsAction) -> Result<AbstractControl, FormsError> {
    tracing::trace!(
        message_type = action.message_type(),
        control_ref = ?action.control_ref(),
        "reducing forms message"
    );

    let next = match action {
        FormsAction::ControlChange(change) => update_dirty(&sync_validate(&set_value_and_propagate(
            &change.control_ref,
            change.value.clone(),
            state,
        )?)),
        FormsAction::ValueChangeEffect(effect) => handle_async_validation(state, &effect.control_ref)?,
        FormsAction::AsyncValidationResponseSuccess(response) => {
            sync_validate(&handle_async_validation_response_success(state, response)?)
        }
        FormsAction::AddGroupControl(add) => update_dirty(&sync_validate(&add_form_group_control(state, add)?)),
        FormsAction::AddFormArrayControl(add) => update_dirty(&sync_validate(&add_form_array_control(state, add)?)),
        FormsAction::RemoveControl(path) => update_dirty(&sync_validate(&remove_control(state, path)?)),
        FormsAction::ResetControl(path) => update_dirty(&sync_validate(&reset_control(state, path)?)),
        FormsAction::MarkControlAsPristine(path) => update_dirty(&mark_control_as_pristine(state, path)?),
        FormsAction::MarkControlAsTouched(path) => mark_control_as_touched(state, path)?,
        FormsAction::MarkControlAsUntouched(path) => mark_control_as_untouched(state, path)?,
        FormsAction::Other { .. } => state.clone(),
    };
    Ok(next)
}

/// Scan `messages` with [`forms_reducer`], one state per message.
///
/// The first error is yielded and ends the projection. This includes an
/// async validation result that arrives after its control was removed:
/// callers that remove controls while validation is in flight should drop
/// results for paths no longer in the tree before projecting.
pub fn project_form_state<S>(messages: S, initial: AbstractControl) -> BoxStream<'static, Result<AbstractControl, FormsError>>
where
    S: Stream<Item = FormsAction> + Send + 'static,
{
    messages
        .scan(Some(initial), |state, action| {
            let Some(current) = state.as_ref() else {
                return future::ready(None);
            };
            let result = forms_reducer(current, &action);
            *state = result.as_ref().ok().cloned();
            future::ready(Some(result))
        })
        .boxed()
}
