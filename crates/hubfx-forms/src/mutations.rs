//! # Structural mutations
//!
//! Add/remove/reset controls, pristine and touch bookkeeping, dirty
//! recomputation. Every function takes the current tree by reference and
//! returns a new tree.

use std::sync::Arc;

use crate::config::{ControlConfig, FormControlType};
use crate::control::{AbstractControl, ControlChildren};
use crate::control_ref::{ControlKey, ControlRef};
use crate::errors::FormsError;
use crate::tree::{build_control_state_at, get_control, get_control_mut, update_ancestor_values};

/// Payload for adding a control to a group or an array.
#[derive(Debug, Clone, PartialEq)]
pub struct AddControl {
    /// Group: path of the new control. Array: path of the array.
    pub control_ref: ControlRef,
    /// Configuration of the new control
    pub config: Arc<ControlConfig>,
}

impl AddControl {
    /// Build a payload.
    pub fn new(control_ref: ControlRef, config: ControlConfig) -> Self {
        Self {
            control_ref,
            config: Arc::new(config),
        }
    }
}

// ============================================================================
// Add / remove
// ============================================================================

/// Insert a control built from `add.config` at `add.control_ref` into its
/// parent group.
pub fn add_form_group_control(tree: &AbstractControl, add: &AddControl) -> Result<AbstractControl, FormsError> {
    let path = &add.control_ref;
    let (parent_ref, key) = match (path.parent(), path.last()) {
        (Some(parent_ref), Some(key)) => (parent_ref, key.clone()),
        _ => return Err(FormsError::not_found(path)),
    };

    let mut next = tree.clone();
    let parent = get_control_mut(&parent_ref, &mut next)?;
    let actual = parent.control_type();
    let ControlChildren::Group(children) = &mut parent.controls else {
        return Err(FormsError::wrong_control_type(&parent_ref, FormControlType::Group, actual));
    };
    let ControlKey::Name(name) = key else {
        return Err(FormsError::shape_mismatch(
            path,
            format!("group member key must be a name, got index {key}"),
        ));
    };
    children.insert(name, Arc::new(build_control_state_at(add.config.clone(), path.clone())));

    update_ancestor_values(&mut next, path)?;
    Ok(next)
}

/// Append a control built from `add.config` to the array at `add.control_ref`.
pub fn add_form_array_control(tree: &AbstractControl, add: &AddControl) -> Result<AbstractControl, FormsError> {
    let path = &add.control_ref;
    let mut next = tree.clone();
    let array = get_control_mut(path, &mut next)?;
    let actual = array.control_type();
    let ControlChildren::Array(children) = &mut array.controls else {
        return Err(FormsError::wrong_control_type(path, FormControlType::Array, actual));
    };

    let index = children.len();
    let element_ref = path.child(index);
    children.push(Arc::new(build_control_state_at(add.config.clone(), element_ref.clone())));

    update_ancestor_values(&mut next, &element_ref)?;
    Ok(next)
}

/// Remove the control at `path`.
///
/// Array siblings after the removed index are re-indexed, descendants and
/// pristine snapshots included. Removing the root is a no-op.
pub fn remove_control(tree: &AbstractControl, path: &ControlRef) -> Result<AbstractControl, FormsError> {
    get_control(path, tree)?;
    let (parent_ref, key) = match (path.parent(), path.last()) {
        (Some(parent_ref), Some(key)) => (parent_ref, key),
        _ => return Ok(tree.clone()),
    };

    let mut next = tree.clone();
    let parent = get_control_mut(&parent_ref, &mut next)?;
    match (&mut parent.controls, key) {
        (ControlChildren::Group(children), ControlKey::Name(name)) => {
            children.shift_remove(name);
        }
        (ControlChildren::Array(children), ControlKey::Index(removed)) => {
            children.remove(*removed);
            for (index, child) in children.iter_mut().enumerate().skip(*removed) {
                reindex_control(Arc::make_mut(child), &parent_ref, index);
            }
        }
        _ => return Err(FormsError::not_found(path)),
    }

    update_ancestor_values(&mut next, path)?;
    Ok(next)
}

/// Rewrite the array segment of every path in `control`'s subtree.
fn reindex_control(control: &mut AbstractControl, array_ref: &ControlRef, index: usize) {
    control.control_ref = control.control_ref.reindexed(array_ref, index);
    if let Some(pristine) = control.pristine_control.as_mut() {
        reindex_control(Arc::make_mut(pristine), array_ref, index);
    }
    for child in control.children_mut() {
        reindex_control(child, array_ref, index);
    }
}

/// Rewrite every path in `control`'s subtree from `from` to `to`.
fn rebase_control(control: &mut AbstractControl, from: &ControlRef, to: &ControlRef) {
    control.control_ref = control.control_ref.rebased(from, to);
    if let Some(pristine) = control.pristine_control.as_mut() {
        rebase_control(Arc::make_mut(pristine), from, to);
    }
    for child in control.children_mut() {
        rebase_control(child, from, to);
    }
}

// ============================================================================
// Reset / pristine
// ============================================================================

/// Pristine snapshot of `control` with the snapshot re-attached to itself.
fn restored(control: &AbstractControl) -> Option<AbstractControl> {
    let pristine = control.pristine_control.clone()?;
    let mut restored = pristine.as_ref().clone();
    restored.pristine_control = Some(pristine);
    Some(restored)
}

/// Restore the control at `path` to its last pristine snapshot: value,
/// flags, errors and in-flight state.
pub fn reset_control(tree: &AbstractControl, path: &ControlRef) -> Result<AbstractControl, FormsError> {
    if path.is_root() {
        return Ok(restored(tree).unwrap_or_else(|| tree.clone()));
    }

    let mut next = tree.clone();
    let control = get_control_mut(path, &mut next)?;
    if let Some(mut replacement) = restored(control) {
        if replacement.control_ref != *path {
            let from = replacement.control_ref.clone();
            rebase_control(&mut replacement, &from, path);
        }
        *control = replacement;
    }

    update_ancestor_values(&mut next, path)?;
    Ok(next)
}

/// Snapshot every control under `path` (inclusive) as its new pristine state.
pub fn mark_control_as_pristine(tree: &AbstractControl, path: &ControlRef) -> Result<AbstractControl, FormsError> {
    let mut next = tree.clone();
    snapshot_subtree(get_control_mut(path, &mut next)?);
    Ok(next)
}

// Children first, so each parent snapshot carries the children's new
// snapshots.
fn snapshot_subtree(control: &mut AbstractControl) {
    for child in control.children_mut() {
        snapshot_subtree(child);
    }
    control.pristine_control = Some(Arc::new(control.snapshot()));
}

// ============================================================================
// Touch / dirty
// ============================================================================

/// Set `touched` on every control from the root to `path`.
pub fn mark_control_as_touched(tree: &AbstractControl, path: &ControlRef) -> Result<AbstractControl, FormsError> {
    let mut next = tree.clone();
    let mut node = &mut next;
    node.touched = true;
    for key in path.segments() {
        node = node.child_mut(key).ok_or_else(|| FormsError::not_found(path))?;
        node.touched = true;
    }
    Ok(next)
}

/// Clear `touched` on every control under `path` (inclusive).
pub fn mark_control_as_untouched(tree: &AbstractControl, path: &ControlRef) -> Result<AbstractControl, FormsError> {
    let mut next = tree.clone();
    untouch_subtree(get_control_mut(path, &mut next)?);
    Ok(next)
}

fn untouch_subtree(control: &mut AbstractControl) {
    control.touched = false;
    for child in control.children_mut() {
        untouch_subtree(child);
    }
}

/// Recompute `dirty` for every control against its pristine value.
pub fn update_dirty(tree: &AbstractControl) -> AbstractControl {
    recompute_dirty(tree).unwrap_or_else(|| tree.clone())
}

fn recompute_dirty(control: &AbstractControl) -> Option<AbstractControl> {
    let rebuilt = control.map_children(recompute_dirty);
    let dirty = control
        .pristine()
        .map_or(false, |pristine| pristine.value != control.value);

    if rebuilt.is_none() && dirty == control.dirty {
        return None;
    }
    let mut node = rebuilt.unwrap_or_else(|| control.clone());
    node.dirty = dirty;
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_ref;
    use crate::tree::{build_control_state, get_descendant_controls, set_value_and_propagate};
    use crate::validation::sync_validate;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn contact(first: &str, email: &str) -> ControlConfig {
        ControlConfig::group([
            ("firstName", ControlConfig::field(first)),
            ("email", ControlConfig::field(email)),
        ])
    }

    fn make_test_tree() -> AbstractControl {
        build_control_state(ControlConfig::group([
            ("firstName", ControlConfig::field("")),
            (
                "emergencyContacts",
                ControlConfig::array([contact("Homer", "homer@homer.com"), contact("moe", "moe@moe.com")]),
            ),
        ]))
    }

    #[test]
    fn test_add_group_control() {
        let tree = make_test_tree();
        let add = AddControl::new(control_ref!["lastName"], ControlConfig::field("Simpson"));
        let next = add_form_group_control(&tree, &add).unwrap();

        assert_eq!(get_control(&control_ref!["lastName"], &next).unwrap().control_ref, control_ref!["lastName"]);
        assert_eq!(next.value["lastName"], json!("Simpson"));
        assert!(get_control(&control_ref!["lastName"], &tree).is_err());
    }

    #[test]
    fn test_add_group_control_requires_group_parent() {
        let tree = make_test_tree();
        let add = AddControl::new(control_ref!["firstName", "nested"], ControlConfig::field(""));
        assert_matches!(
            add_form_group_control(&tree, &add),
            Err(FormsError::WrongControlType { expected: FormControlType::Group, actual: FormControlType::Field, .. })
        );
    }

    #[test]
    fn test_add_group_control_rejects_index_key() {
        let tree = make_test_tree();
        let add = AddControl::new(control_ref!["emergencyContacts", 0, 5], ControlConfig::field(""));
        let err = add_form_group_control(&tree, &add).unwrap_err();
        assert_matches!(err, FormsError::ShapeMismatch { ref control_ref, .. } if *control_ref == add.control_ref);
        assert_eq!(
            err.to_string(),
            "Shape mismatch at [emergencyContacts,0,5]: group member key must be a name, got index 5"
        );
    }

    #[test]
    fn test_add_array_control_appends() {
        let tree = make_test_tree();
        let add = AddControl::new(control_ref!["emergencyContacts"], contact("Barney", "barney@barney.com"));
        let next = add_form_array_control(&tree, &add).unwrap();

        let added = get_control(&control_ref!["emergencyContacts", 2, "email"], &next).unwrap();
        assert_eq!(added.control_ref, control_ref!["emergencyContacts", 2, "email"]);
        assert_eq!(next.value["emergencyContacts"][2]["firstName"], json!("Barney"));
        assert_eq!(next.value["emergencyContacts"].as_array().map(Vec::len), Some(3));

        assert_matches!(
            add_form_array_control(&tree, &AddControl::new(control_ref!["firstName"], ControlConfig::field(""))),
            Err(FormsError::WrongControlType { expected: FormControlType::Array, .. })
        );
    }

    #[test]
    fn test_remove_array_element_reindexes() {
        let tree = make_test_tree();
        let next = remove_control(&tree, &control_ref!["emergencyContacts", 0]).unwrap();

        let moved = get_control(&control_ref!["emergencyContacts", 0], &next).unwrap();
        let refs: Vec<ControlRef> = get_descendant_controls(moved).iter().map(|c| c.control_ref.clone()).collect();
        assert_eq!(
            refs,
            vec![
                control_ref!["emergencyContacts", 0],
                control_ref!["emergencyContacts", 0, "firstName"],
                control_ref!["emergencyContacts", 0, "email"],
            ]
        );
        assert_eq!(
            moved.pristine().unwrap().control_ref,
            control_ref!["emergencyContacts", 0]
        );
        assert_eq!(next.value["emergencyContacts"], json!([{ "firstName": "moe", "email": "moe@moe.com" }]));
    }

    #[test]
    fn test_remove_group_member_and_edge_cases() {
        let tree = make_test_tree();
        let next = remove_control(&tree, &control_ref!["firstName"]).unwrap();
        assert!(next.value.get("firstName").is_none());

        assert_eq!(remove_control(&tree, &ControlRef::root()).unwrap(), tree);
        assert_matches!(
            remove_control(&tree, &control_ref!["emergencyContacts", 7]),
            Err(FormsError::NotFound { .. })
        );
    }

    #[test]
    fn test_reset_root_restores_built_tree() {
        let tree = make_test_tree();
        let changed = set_value_and_propagate(&control_ref!["firstName"], json!("Bart"), &tree).unwrap();
        let changed = mark_control_as_touched(&update_dirty(&changed), &control_ref!["firstName"]).unwrap();
        assert!(changed.dirty && changed.touched);

        assert_eq!(reset_control(&changed, &ControlRef::root()).unwrap(), tree);
    }

    #[test]
    fn test_reset_nested_updates_ancestors() {
        let tree = make_test_tree();
        let path = control_ref!["emergencyContacts", 1, "email"];
        let changed = update_dirty(&set_value_and_propagate(&path, json!("x@x.com"), &tree).unwrap());
        let reset = update_dirty(&reset_control(&changed, &path).unwrap());

        assert_eq!(reset.value, tree.value);
        assert!(!reset.dirty);
        assert!(!get_control(&path, &reset).unwrap().dirty);
    }

    #[test]
    fn test_reset_after_reindex_keeps_current_paths() {
        let tree = make_test_tree();
        let removed = remove_control(&tree, &control_ref!["emergencyContacts", 0]).unwrap();
        let reset = reset_control(&removed, &control_ref!["emergencyContacts", 0]).unwrap();
        let email = get_control(&control_ref!["emergencyContacts", 0, "email"], &reset).unwrap();
        assert_eq!(email.control_ref, control_ref!["emergencyContacts", 0, "email"]);
        assert_eq!(email.value, json!("moe@moe.com"));
    }

    #[test]
    fn test_mark_pristine_then_dirty_clears() {
        let tree = make_test_tree();
        let path = control_ref!["emergencyContacts", 0, "firstName"];
        let changed = update_dirty(&set_value_and_propagate(&path, json!("Marge"), &tree).unwrap());
        assert!(changed.dirty);

        let marked = mark_control_as_pristine(&changed, &control_ref!["emergencyContacts"]).unwrap();
        assert!(get_control(&path, &marked).unwrap().dirty, "mark pristine leaves dirty alone");

        let recomputed = update_dirty(&marked);
        assert!(!get_control(&path, &recomputed).unwrap().dirty);
        assert!(!get_control(&control_ref!["emergencyContacts"], &recomputed).unwrap().dirty);
        assert!(recomputed.dirty, "root pristine was not re-snapshotted");

        let contacts = get_control(&control_ref!["emergencyContacts"], &recomputed).unwrap();
        let pristine_child = contacts.pristine().unwrap().children().next().unwrap();
        assert_eq!(pristine_child.pristine().unwrap().value["firstName"], json!("Marge"));
    }

    #[test]
    fn test_touch_bubbles_up_untouch_pushes_down() {
        let tree = make_test_tree();
        let path = control_ref!["emergencyContacts", 1, "email"];
        let touched = mark_control_as_touched(&tree, &path).unwrap();
        for control in crate::tree::get_ancestor_controls(&path, &touched).unwrap() {
            assert!(control.touched);
        }
        assert!(!get_control(&control_ref!["firstName"], &touched).unwrap().touched);

        let untouched = mark_control_as_untouched(&touched, &control_ref!["emergencyContacts"]).unwrap();
        assert!(untouched.touched);
        for control in get_descendant_controls(get_control(&control_ref!["emergencyContacts"], &untouched).unwrap()) {
            assert!(!control.touched);
        }
    }

    #[test]
    fn test_structural_ops_compose_with_validation() {
        let tree = make_test_tree();
        let next = sync_validate(&remove_control(&tree, &control_ref!["emergencyContacts", 1]).unwrap());
        assert!(next.valid);
    }
}
