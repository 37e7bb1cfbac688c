//! Property test strategies for forms types
//!
//! # Example
//!
//! ```rust
//! use hubfx_testkit::strategies::arb_control_config;
//! use proptest::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn test_builds(config in arb_control_config()) {
//!         let tree = hubfx_forms::build_control_state(config);
//!         prop_assert_eq!(hubfx_forms::sync_validate(&tree), tree);
//!     }
//! }
//! ```

use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

use hubfx_forms::{AbstractControl, AddControl, ControlChange, ControlConfig, ControlRef, FormControlType, FormsAction};
use serde_json::Value;

use crate::validators::required;

/// Strategy for leaf values: short strings, the empty string included.
pub fn arb_field_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::String(String::new())),
        "[a-c]{1,3}".prop_map(Value::String),
    ]
}

/// Strategy for a field config, with or without `required`.
pub fn arb_field_config() -> impl Strategy<Value = ControlConfig> {
    (arb_field_value(), any::<bool>()).prop_map(|(value, is_required)| {
        let config = ControlConfig::field(value);
        if is_required {
            config.with_validators(vec![required()])
        } else {
            config
        }
    })
}

/// Strategy for config trees up to three levels deep.
///
/// Groups name their members `k0`, `k1`, ...; arrays hold up to four
/// elements.
pub fn arb_control_config() -> impl Strategy<Value = ControlConfig> {
    arb_field_config().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(|children| {
                ControlConfig::group(
                    children
                        .into_iter()
                        .enumerate()
                        .map(|(index, child)| (format!("k{index}"), child)),
                )
            }),
            prop::collection::vec(inner, 0..4).prop_map(ControlConfig::array),
        ]
    })
}

/// Paths of every field in `tree`, in pre-order.
pub fn field_paths(tree: &AbstractControl) -> Vec<ControlRef> {
    hubfx_forms::get_descendant_controls(tree)
        .into_iter()
        .filter(|control| control.control_type() == FormControlType::Field)
        .map(|control| control.control_ref.clone())
        .collect()
}

/// Strategy for a sequence of (field selector, new value) edits.
///
/// Resolve each selector against the current fields with
/// [`prop::sample::Index::index`].
pub fn arb_edits(max: usize) -> impl Strategy<Value = Vec<(prop::sample::Index, Value)>> {
    prop::collection::vec((any::<prop::sample::Index>(), arb_field_value()), 0..=max)
}

/// One step of an edit session, with selectors resolved against the tree
/// current at that step by [`FormOp::resolve`].
#[derive(Debug, Clone)]
pub enum FormOp {
    /// New value for a field
    Change(prop::sample::Index, Value),
    /// Append an element to an array
    AddArrayElement(prop::sample::Index, ControlConfig),
    /// Insert a member into a group
    AddGroupMember(prop::sample::Index, ControlConfig),
    /// Remove any non-root control
    Remove(prop::sample::Index),
    /// Reset any control
    Reset(prop::sample::Index),
    /// Mark any control as pristine
    MarkPristine(prop::sample::Index),
    /// Mark any control as touched
    Touch(prop::sample::Index),
    /// Mark any control as untouched
    Untouch(prop::sample::Index),
}

fn paths_where(tree: &AbstractControl, keep: impl Fn(&AbstractControl) -> bool) -> Vec<ControlRef> {
    hubfx_forms::get_descendant_controls(tree)
        .into_iter()
        .filter(|control| keep(control))
        .map(|control| control.control_ref.clone())
        .collect()
}

fn pick(paths: Vec<ControlRef>, selector: &prop::sample::Index) -> Option<ControlRef> {
    if paths.is_empty() {
        return None;
    }
    let index = selector.index(paths.len());
    paths.into_iter().nth(index)
}

impl FormOp {
    /// The message this step sends against `tree`, or `None` when the tree
    /// has no control of the kind the step needs.
    ///
    /// `step` names new group members so they never collide.
    pub fn resolve(&self, tree: &AbstractControl, step: usize) -> Option<FormsAction> {
        let of_type = |kind: FormControlType| paths_where(tree, move |control| control.control_type() == kind);
        let any = || paths_where(tree, |_| true);
        let non_root = || paths_where(tree, |control| !control.control_ref.is_root());

        let action = match self {
            FormOp::Change(selector, value) => FormsAction::ControlChange(ControlChange::new(
                pick(of_type(FormControlType::Field), selector)?,
                value.clone(),
            )),
            FormOp::AddArrayElement(selector, config) => FormsAction::AddFormArrayControl(AddControl::new(
                pick(of_type(FormControlType::Array), selector)?,
                config.clone(),
            )),
            FormOp::AddGroupMember(selector, config) => FormsAction::AddGroupControl(AddControl::new(
                pick(of_type(FormControlType::Group), selector)?.child(format!("added{step}")),
                config.clone(),
            )),
            FormOp::Remove(selector) => FormsAction::RemoveControl(pick(non_root(), selector)?),
            FormOp::Reset(selector) => FormsAction::ResetControl(pick(any(), selector)?),
            FormOp::MarkPristine(selector) => FormsAction::MarkControlAsPristine(pick(any(), selector)?),
            FormOp::Touch(selector) => FormsAction::MarkControlAsTouched(pick(any(), selector)?),
            FormOp::Untouch(selector) => FormsAction::MarkControlAsUntouched(pick(any(), selector)?),
        };
        Some(action)
    }
}

/// Strategy for a single [`FormOp`], value changes weighted up.
pub fn arb_form_op() -> impl Strategy<Value = FormOp> {
    let selector = any::<prop::sample::Index>;
    prop_oneof![
        3 => (selector(), arb_field_value()).prop_map(|(at, value)| FormOp::Change(at, value)),
        1 => (selector(), arb_control_config()).prop_map(|(at, config)| FormOp::AddArrayElement(at, config)),
        1 => (selector(), arb_field_config()).prop_map(|(at, config)| FormOp::AddGroupMember(at, config)),
        1 => selector().prop_map(FormOp::Remove),
        1 => selector().prop_map(FormOp::Reset),
        1 => selector().prop_map(FormOp::MarkPristine),
        1 => selector().prop_map(FormOp::Touch),
        1 => selector().prop_map(FormOp::Untouch),
    ]
}

/// Strategy for an edit session of up to `max` mixed steps.
pub fn arb_form_ops(max: usize) -> impl Strategy<Value = Vec<FormOp>> {
    prop::collection::vec(arb_form_op(), 0..=max)
}
