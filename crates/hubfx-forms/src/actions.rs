//! # Action catalog
//!
//! The closed set of forms message kinds, their payloads and creators.
//! Creators that need to know the post-change tree (to build the
//! value-change-effects for the affected branch) reduce the change against
//! the current state first.

use hubfx_core::{Message, ScopedEffects};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::async_validation::ControlAsyncValidationResponse;
use crate::control::AbstractControl;
use crate::control_ref::ControlRef;
use crate::effects::value_change_effects;
use crate::errors::FormsError;
use crate::mutations::AddControl;
use crate::reducer::forms_reducer;
use crate::tree::{get_control, get_control_branch};

/// Value change of one control
pub const FORMS_CONTROL_CHANGE: &str = "FORMS_CONTROL_CHANGE";
/// Async validation start for one control
pub const FORMS_VALUE_CHANGE_EFFECT: &str = "FORMS_VALUE_CHANGE_EFFECT";
/// Async validator result
pub const FORMS_CONTROL_ASYNC_VALIDATION_RESPONSE_SUCCESS: &str = "FORMS_CONTROL_ASYNC_VALIDATION_RESPONSE_SUCCESS";
/// Group member insertion
pub const FORMS_ADD_GROUP_CONTROL: &str = "FORMS_ADD_GROUP_CONTROL";
/// Array element append
pub const FORMS_ADD_FORM_ARRAY_CONTROL: &str = "FORMS_ADD_FORM_ARRAY_CONTROL";
/// Control removal
pub const FORMS_REMOVE_CONTROL: &str = "FORMS_REMOVE_CONTROL";
/// Reset to the pristine snapshot
pub const FORMS_RESET_CONTROL: &str = "FORMS_RESET_CONTROL";
/// New pristine snapshot
pub const FORMS_MARK_CONTROL_AS_PRISTINE: &str = "FORMS_MARK_CONTROL_AS_PRISTINE";
/// Touch along the ancestor chain
pub const FORMS_MARK_CONTROL_AS_TOUCHED: &str = "FORMS_MARK_CONTROL_AS_TOUCHED";
/// Untouch a subtree
pub const FORMS_MARK_CONTROL_AS_UNTOUCHED: &str = "FORMS_MARK_CONTROL_AS_UNTOUCHED";

/// New value for the control at `control_ref`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlChange {
    /// Control to change
    pub control_ref: ControlRef,
    /// Replacement value
    pub value: Value,
}

impl ControlChange {
    /// Build a change.
    pub fn new(control_ref: ControlRef, value: impl Into<Value>) -> Self {
        Self {
            control_ref,
            value: value.into(),
        }
    }
}

/// Starts async validation of one control.
///
/// The scope key is the control's path, so each control gets its own
/// pipelines; `value` is the control's value when the message was created.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueChangeEffect {
    /// Control to validate
    pub control_ref: ControlRef,
    /// Value fed to the async validators
    pub value: Value,
    /// One effect per async validator, keyed by the control path
    pub scoped_effects: ScopedEffects<FormsAction>,
}

/// Every message the forms reducer understands.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum FormsAction {
    ControlChange(ControlChange),
    ValueChangeEffect(ValueChangeEffect),
    AsyncValidationResponseSuccess(ControlAsyncValidationResponse),
    AddGroupControl(AddControl),
    AddFormArrayControl(AddControl),
    RemoveControl(ControlRef),
    ResetControl(ControlRef),
    MarkControlAsPristine(ControlRef),
    MarkControlAsTouched(ControlRef),
    MarkControlAsUntouched(ControlRef),
    /// Any other message sharing the hub; the reducer ignores it
    Other { action_type: String, payload: Value },
}

impl FormsAction {
    /// Path the message targets, if any.
    pub fn control_ref(&self) -> Option<&ControlRef> {
        match self {
            FormsAction::ControlChange(change) => Some(&change.control_ref),
            FormsAction::ValueChangeEffect(effect) => Some(&effect.control_ref),
            FormsAction::AsyncValidationResponseSuccess(response) => Some(&response.control_ref),
            FormsAction::AddGroupControl(add) | FormsAction::AddFormArrayControl(add) => Some(&add.control_ref),
            FormsAction::RemoveControl(path)
            | FormsAction::ResetControl(path)
            | FormsAction::MarkControlAsPristine(path)
            | FormsAction::MarkControlAsTouched(path)
            | FormsAction::MarkControlAsUntouched(path) => Some(path),
            FormsAction::Other { .. } => None,
        }
    }
}

impl Message for FormsAction {
    fn message_type(&self) -> &str {
        match self {
            FormsAction::ControlChange(_) => FORMS_CONTROL_CHANGE,
            FormsAction::ValueChangeEffect(_) => FORMS_VALUE_CHANGE_EFFECT,
            FormsAction::AsyncValidationResponseSuccess(_) => FORMS_CONTROL_ASYNC_VALIDATION_RESPONSE_SUCCESS,
            FormsAction::AddGroupControl(_) => FORMS_ADD_GROUP_CONTROL,
            FormsAction::AddFormArrayControl(_) => FORMS_ADD_FORM_ARRAY_CONTROL,
            FormsAction::RemoveControl(_) => FORMS_REMOVE_CONTROL,
            FormsAction::ResetControl(_) => FORMS_RESET_CONTROL,
            FormsAction::MarkControlAsPristine(_) => FORMS_MARK_CONTROL_AS_PRISTINE,
            FormsAction::MarkControlAsTouched(_) => FORMS_MARK_CONTROL_AS_TOUCHED,
            FormsAction::MarkControlAsUntouched(_) => FORMS_MARK_CONTROL_AS_UNTOUCHED,
            FormsAction::Other { action_type, .. } => action_type,
        }
    }

    fn scoped_effects(&self) -> Option<&ScopedEffects<Self>> {
        match self {
            FormsAction::ValueChangeEffect(effect) => Some(&effect.scoped_effects),
            _ => None,
        }
    }
}

// ============================================================================
// Creators
// ============================================================================

/// The change followed by one value-change-effect per control on the changed
/// branch that has async validators.
pub fn control_change(change: ControlChange, state: &AbstractControl) -> Result<Vec<FormsAction>, FormsError> {
    let path = change.control_ref.clone();
    let action = FormsAction::ControlChange(change);
    let next = forms_reducer(state, &action)?;

    let mut actions = vec![action];
    actions.extend(value_change_effects(get_control_branch(&path, &next)?));
    Ok(actions)
}

/// The append followed by value-change-effects for the new element, its
/// descendants and its ancestors.
pub fn add_form_array_control(add: AddControl, state: &AbstractControl) -> Result<Vec<FormsAction>, FormsError> {
    let array_ref = add.control_ref.clone();
    let action = FormsAction::AddFormArrayControl(add);
    let next = forms_reducer(state, &action)?;

    let index = get_control(&array_ref, &next)?.children().count().saturating_sub(1);
    let mut actions = vec![action];
    actions.extend(value_change_effects(get_control_branch(&array_ref.child(index), &next)?));
    Ok(actions)
}

/// Insert a group member.
pub fn add_group_control(add: AddControl) -> FormsAction {
    FormsAction::AddGroupControl(add)
}

/// Remove a control.
pub fn remove_control(control_ref: ControlRef) -> FormsAction {
    FormsAction::RemoveControl(control_ref)
}

/// Reset a control to its pristine snapshot.
pub fn reset_control(control_ref: ControlRef) -> FormsAction {
    FormsAction::ResetControl(control_ref)
}

/// Take new pristine snapshots under a control.
pub fn mark_control_as_pristine(control_ref: ControlRef) -> FormsAction {
    FormsAction::MarkControlAsPristine(control_ref)
}

/// Touch a control and its ancestors.
pub fn mark_control_as_touched(control_ref: ControlRef) -> FormsAction {
    FormsAction::MarkControlAsTouched(control_ref)
}

/// Untouch a control and its descendants.
pub fn mark_control_as_untouched(control_ref: ControlRef) -> FormsAction {
    FormsAction::MarkControlAsUntouched(control_ref)
}

/// Wrap an async validator result.
pub fn async_validation_response_success(response: ControlAsyncValidationResponse) -> FormsAction {
    FormsAction::AsyncValidationResponseSuccess(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlConfig;
    use crate::control_ref;
    use crate::tree::build_control_state;
    use crate::validators::{AsyncValidator, FormErrors, ValueStream};
    use assert_matches::assert_matches;
    use futures::StreamExt;
    use serde_json::json;

    fn never_taken() -> AsyncValidator {
        AsyncValidator::new("taken", |values: ValueStream| values.map(|_| FormErrors::new()))
    }

    fn make_test_tree() -> AbstractControl {
        build_control_state(
            ControlConfig::group([
                ("name", ControlConfig::field("")),
                ("email", ControlConfig::field("").with_async_validators(vec![never_taken()])),
                (
                    "emails",
                    ControlConfig::array([ControlConfig::field("a@a.com").with_async_validators(vec![never_taken()])])
                        .with_async_validators(vec![never_taken()]),
                ),
            ])
            .with_async_validators(vec![never_taken()]),
        )
    }

    fn effect_paths(actions: &[FormsAction]) -> Vec<ControlRef> {
        actions
            .iter()
            .filter_map(|action| match action {
                FormsAction::ValueChangeEffect(effect) => Some(effect.control_ref.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_message_types_and_signatures() {
        let change = FormsAction::ControlChange(ControlChange::new(control_ref!["name"], "Homer"));
        assert_eq!(change.message_type(), FORMS_CONTROL_CHANGE);
        assert_eq!(change.signature(), "type:FORMS_CONTROL_CHANGE,scoped:true");

        let other = FormsAction::Other {
            action_type: "APP_LOADED".to_string(),
            payload: Value::Null,
        };
        assert_eq!(other.message_type(), "APP_LOADED");
        assert!(other.control_ref().is_none());
    }

    #[test]
    fn test_control_change_emits_branch_effects() {
        let tree = make_test_tree();
        let actions = control_change(ControlChange::new(control_ref!["email"], "homer@homer.com"), &tree).unwrap();

        assert_matches!(&actions[0], FormsAction::ControlChange(change) if change.control_ref == control_ref!["email"]);
        assert_eq!(effect_paths(&actions), vec![ControlRef::root(), control_ref!["email"]]);

        let FormsAction::ValueChangeEffect(effect) = &actions[2] else {
            panic!("expected a value change effect");
        };
        assert_eq!(effect.value, json!("homer@homer.com"));
        assert_eq!(
            actions[2].signature(),
            "type:FORMS_VALUE_CHANGE_EFFECT,scoped:true,key:email"
        );
        assert_eq!(actions[1].signature(), "type:FORMS_VALUE_CHANGE_EFFECT,scoped:true");
    }

    #[test]
    fn test_control_change_without_async_validators() {
        let tree = build_control_state(ControlConfig::group([("name", ControlConfig::field(""))]));
        let actions = control_change(ControlChange::new(control_ref!["name"], "Homer"), &tree).unwrap();
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn test_control_change_propagates_errors() {
        let tree = make_test_tree();
        assert_matches!(
            control_change(ControlChange::new(control_ref!["missing"], 1), &tree),
            Err(FormsError::NotFound { .. })
        );
    }

    #[test]
    fn test_add_form_array_control_targets_new_element() {
        let tree = make_test_tree();
        let add = AddControl::new(
            control_ref!["emails"],
            ControlConfig::field("b@b.com").with_async_validators(vec![never_taken()]),
        );
        let actions = add_form_array_control(add, &tree).unwrap();
        assert_matches!(&actions[0], FormsAction::AddFormArrayControl(_));
        assert_eq!(
            effect_paths(&actions),
            vec![ControlRef::root(), control_ref!["emails"], control_ref!["emails", 1]]
        );
    }
}
