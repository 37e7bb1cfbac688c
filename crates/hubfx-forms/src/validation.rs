//! # Synchronous validation
//!
//! Bottom-up recomputation of `errors` and `valid`. A node's errors are its
//! own sync validators' outputs merged in order, then its retained async
//! errors; it is valid when none of those is set and every child is valid.

use crate::control::AbstractControl;
use crate::validators::{has_error, FormErrors};

/// Own errors and validity of `control`, assuming its children are already
/// validated.
pub(crate) fn evaluate_node(control: &AbstractControl) -> (FormErrors, bool) {
    let controls_has_errors = control.children().any(|child| !child.valid);

    let mut errors = control
        .config
        .validators
        .iter()
        .fold(FormErrors::new(), |mut acc, validator| {
            acc.extend(validator.validate(&control.value));
            acc
        });
    errors.extend(control.async_errors.iter().map(|(key, flag)| (key.clone(), *flag)));

    let valid = !has_error(&errors) && !controls_has_errors;
    (errors, valid)
}

/// Re-run sync validation over the whole tree.
///
/// Idempotent: validating an already validated tree yields an equal tree.
pub fn sync_validate(control: &AbstractControl) -> AbstractControl {
    revalidate(control).unwrap_or_else(|| control.clone())
}

/// Validated copy of `control`, or `None` when nothing changed.
fn revalidate(control: &AbstractControl) -> Option<AbstractControl> {
    let rebuilt = control.map_children(revalidate);
    let current = rebuilt.as_ref().unwrap_or(control);
    let (errors, valid) = evaluate_node(current);

    if rebuilt.is_none() && errors == control.errors && valid == control.valid {
        return None;
    }

    let mut node = rebuilt.unwrap_or_else(|| control.clone());
    node.errors = errors;
    node.valid = valid;
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlConfig;
    use crate::control_ref;
    use crate::tree::{build_control_state, get_control, set_value_and_propagate};
    use crate::validators::Validator;
    use serde_json::json;
    use std::sync::Arc;

    fn required() -> Validator {
        Validator::new("required", |value| {
            FormErrors::from([("required".to_string(), value.as_str().map_or(true, str::is_empty))])
        })
    }

    fn not_homer() -> Validator {
        Validator::new("notHomer", |value| {
            FormErrors::from([
                ("required".to_string(), false),
                ("homer".to_string(), value == &json!("Homer")),
            ])
        })
    }

    #[test]
    fn test_group_invalid_from_children_only() {
        let tree = build_control_state(ControlConfig::group([
            ("firstName", ControlConfig::field("").with_validators(vec![required()])),
            ("lastName", ControlConfig::field("").with_validators(vec![required()])),
        ]));
        assert!(!tree.valid);
        assert!(tree.errors.is_empty());
    }

    #[test]
    fn test_grandchild_error_invalidates_root() {
        let tree = build_control_state(ControlConfig::group([(
            "doctorInfo",
            ControlConfig::group([("email", ControlConfig::field("").with_validators(vec![required()]))]),
        )]));
        let doctor = get_control(&control_ref!["doctorInfo"], &tree).unwrap();
        assert!(doctor.errors.is_empty());
        assert!(!doctor.valid);
        assert!(!tree.valid);
    }

    #[test]
    fn test_later_validator_overrides_key() {
        let tree = build_control_state(ControlConfig::field("").with_validators(vec![required(), not_homer()]));
        assert_eq!(
            tree.errors,
            FormErrors::from([("homer".to_string(), false), ("required".to_string(), false)])
        );
        assert!(tree.valid);
    }

    #[test]
    fn test_revalidates_after_value_change() {
        let tree = build_control_state(ControlConfig::group([(
            "firstName",
            ControlConfig::field("").with_validators(vec![required()]),
        )]));
        let changed = set_value_and_propagate(&control_ref!["firstName"], json!("Homer"), &tree).unwrap();
        let validated = sync_validate(&changed);
        assert!(validated.valid);
        assert_eq!(
            get_control(&control_ref!["firstName"], &validated).unwrap().errors,
            FormErrors::from([("required".to_string(), false)])
        );
    }

    #[test]
    fn test_async_errors_survive_revalidation() {
        let mut tree = build_control_state(ControlConfig::field("x").with_validators(vec![required()]));
        tree.async_errors.insert("uniqueEmail".to_string(), true);
        let validated = sync_validate(&tree);
        assert_eq!(validated.errors["uniqueEmail"], true);
        assert_eq!(validated.errors["required"], false);
        assert!(!validated.valid);
        assert_eq!(sync_validate(&validated), validated);
    }

    #[test]
    fn test_unchanged_subtrees_stay_shared() {
        let tree = build_control_state(ControlConfig::array([
            ControlConfig::field("a"),
            ControlConfig::field(""),
        ]));
        let validated = sync_validate(&tree);
        let (crate::ControlChildren::Array(before), crate::ControlChildren::Array(after)) =
            (&tree.controls, &validated.controls)
        else {
            panic!("root must be an array");
        };
        assert!(Arc::ptr_eq(&before[0], &after[0]));
    }
}
