//! # Tree algorithms
//!
//! Building a tree from configuration, path lookup, ancestor/descendant
//! traversal and value propagation.

use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::config::{ControlConfig, ControlConfigKind, FormControlType};
use crate::control::{AbstractControl, ControlChildren};
use crate::control_ref::{ControlKey, ControlRef};
use crate::errors::FormsError;
use crate::validation::evaluate_node;
use crate::validators::FormErrors;

// ============================================================================
// Building
// ============================================================================

/// Materialize a control tree from `config`, rooted at the empty path.
pub fn build_control_state(config: ControlConfig) -> AbstractControl {
    build_control_state_at(Arc::new(config), ControlRef::root())
}

/// Materialize a control subtree from `config` at `control_ref`.
///
/// Values are aggregated from children, sync validators run bottom-up and
/// every node gets a pristine snapshot of itself.
pub fn build_control_state_at(config: Arc<ControlConfig>, control_ref: ControlRef) -> AbstractControl {
    let (controls, value) = match &config.kind {
        ControlConfigKind::Field { initial_value } => (ControlChildren::Field, initial_value.clone()),
        ControlConfigKind::Group { controls } => {
            let children: IndexMap<String, Arc<AbstractControl>> = controls
                .iter()
                .map(|(key, child)| {
                    let built = build_control_state_at(child.clone(), control_ref.child(key.as_str()));
                    (key.clone(), Arc::new(built))
                })
                .collect();
            (ControlChildren::Group(children), Value::Null)
        }
        ControlConfigKind::Array { controls } => {
            let children: Vec<Arc<AbstractControl>> = controls
                .iter()
                .enumerate()
                .map(|(index, child)| Arc::new(build_control_state_at(child.clone(), control_ref.child(index))))
                .collect();
            (ControlChildren::Array(children), Value::Null)
        }
    };

    let mut control = AbstractControl {
        control_ref,
        value,
        dirty: false,
        touched: false,
        valid: true,
        errors: FormErrors::new(),
        async_errors: FormErrors::new(),
        async_validate_in_progress: BTreeMap::new(),
        validating: false,
        config,
        pristine_control: None,
        controls,
    };
    control.refresh_value();

    let (errors, valid) = evaluate_node(&control);
    control.errors = errors;
    control.valid = valid;
    control.pristine_control = Some(Arc::new(control.snapshot()));
    control
}

// ============================================================================
// Lookup
// ============================================================================

/// Control at `path`; the tree itself for the root path.
pub fn get_control<'a>(path: &ControlRef, tree: &'a AbstractControl) -> Result<&'a AbstractControl, FormsError> {
    path.segments().iter().try_fold(tree, |node, key| {
        node.child(key).ok_or_else(|| FormsError::not_found(path))
    })
}

/// Mutable control at `path`, copying shared nodes along the way.
pub(crate) fn get_control_mut<'a>(
    path: &ControlRef,
    tree: &'a mut AbstractControl,
) -> Result<&'a mut AbstractControl, FormsError> {
    let mut node = tree;
    for key in path.segments() {
        node = node.child_mut(key).ok_or_else(|| FormsError::not_found(path))?;
    }
    Ok(node)
}

/// Root followed by every control along `path`, ending at the target.
pub fn get_ancestor_controls<'a>(
    path: &ControlRef,
    tree: &'a AbstractControl,
) -> Result<Vec<&'a AbstractControl>, FormsError> {
    let mut chain = Vec::with_capacity(path.len() + 1);
    let mut node = tree;
    chain.push(node);
    for key in path.segments() {
        node = node.child(key).ok_or_else(|| FormsError::not_found(path))?;
        chain.push(node);
    }
    Ok(chain)
}

/// `control` followed by every descendant, depth-first pre-order.
pub fn get_descendant_controls(control: &AbstractControl) -> Vec<&AbstractControl> {
    let mut out = Vec::new();
    collect_descendants(control, &mut out);
    out
}

fn collect_descendants<'a>(control: &'a AbstractControl, out: &mut Vec<&'a AbstractControl>) {
    out.push(control);
    for child in control.children() {
        collect_descendants(child, out);
    }
}

/// Ancestors of `path` (root to target) followed by the target's proper
/// descendants: every control whose async validation a change at `path`
/// must re-trigger.
pub fn get_control_branch<'a>(
    path: &ControlRef,
    tree: &'a AbstractControl,
) -> Result<Vec<&'a AbstractControl>, FormsError> {
    let mut branch = get_ancestor_controls(path, tree)?;
    if let Some(target) = branch.last().copied() {
        branch.extend(get_descendant_controls(target).into_iter().skip(1));
    }
    Ok(branch)
}

// ============================================================================
// Value propagation
// ============================================================================

/// Set the value at `path` and propagate it.
///
/// A Group/Array given a whole value redistributes it into its children,
/// level by level; the ancestors then re-aggregate their values. Fails with
/// `ShapeMismatch` when the value does not fit the existing children.
pub fn set_value_and_propagate(
    path: &ControlRef,
    value: Value,
    tree: &AbstractControl,
) -> Result<AbstractControl, FormsError> {
    let mut next = tree.clone();
    let target = get_control_mut(path, &mut next)?;
    target.value = value;
    update_child_values(target)?;
    update_ancestor_values(&mut next, path)?;
    Ok(next)
}

/// Push a container's value down into its children.
fn update_child_values(control: &mut AbstractControl) -> Result<(), FormsError> {
    match control.control_type() {
        FormControlType::Field => Ok(()),
        FormControlType::Group => {
            let Value::Object(values) = &control.value else {
                return Err(FormsError::shape_mismatch(
                    &control.control_ref,
                    "group value must be a mapping",
                ));
            };
            let values = values.clone();
            let ControlChildren::Group(children) = &mut control.controls else {
                return Ok(());
            };
            if values.len() != children.len() {
                return Err(FormsError::shape_mismatch(
                    &control.control_ref,
                    format!("expected {} keys, got {}", children.len(), values.len()),
                ));
            }
            for (key, child) in children.iter_mut() {
                let child_value = values.get(key).cloned().ok_or_else(|| {
                    FormsError::shape_mismatch(&control.control_ref, format!("missing key '{key}'"))
                })?;
                let child = Arc::make_mut(child);
                child.value = child_value;
                update_child_values(child)?;
            }
            Ok(())
        }
        FormControlType::Array => {
            let Value::Array(values) = &control.value else {
                return Err(FormsError::shape_mismatch(
                    &control.control_ref,
                    "array value must be a sequence",
                ));
            };
            let values = values.clone();
            let ControlChildren::Array(children) = &mut control.controls else {
                return Ok(());
            };
            if values.len() != children.len() {
                return Err(FormsError::shape_mismatch(
                    &control.control_ref,
                    format!("expected {} elements, got {}", children.len(), values.len()),
                ));
            }
            for (child, child_value) in children.iter_mut().zip(values) {
                let child = Arc::make_mut(child);
                child.value = child_value;
                update_child_values(child)?;
            }
            Ok(())
        }
    }
}

/// Re-aggregate the value of every ancestor of `path`, parent first.
///
/// `path` itself need not exist any more (after a removal); only its
/// ancestors must.
pub(crate) fn update_ancestor_values(tree: &mut AbstractControl, path: &ControlRef) -> Result<(), FormsError> {
    match path.parent() {
        Some(parent) => refresh_along(tree, parent.segments(), path),
        None => Ok(()),
    }
}

fn refresh_along(node: &mut AbstractControl, rest: &[ControlKey], path: &ControlRef) -> Result<(), FormsError> {
    if let Some((key, tail)) = rest.split_first() {
        let child = node.child_mut(key).ok_or_else(|| FormsError::not_found(path))?;
        refresh_along(child, tail, path)?;
    }
    node.refresh_value();
    Ok(())
}
