//! # Control tree model
//!
//! `AbstractControl` is one node of the form state tree. The variant lives in
//! `ControlChildren`; every tree algorithm matches on it and recurses.
//!
//! Children are held behind `Arc`. Mutating operations clone the root and
//! call `Arc::make_mut` along the path they touch, so untouched subtrees stay
//! shared with the previous tree value and the previous value is never
//! modified.

use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::config::{ControlConfig, FormControlType};
use crate::control_ref::{ControlKey, ControlRef};
use crate::validators::FormErrors;

/// Children of a control, by variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlChildren {
    /// Leaf
    Field,
    /// Named children in configuration order
    Group(IndexMap<String, Arc<AbstractControl>>),
    /// Ordered children
    Array(Vec<Arc<AbstractControl>>),
}

/// One node of the control tree.
#[derive(Debug, Clone, PartialEq)]
pub struct AbstractControl {
    /// Absolute path from the root
    pub control_ref: ControlRef,
    /// Current value; mapping for groups, sequence for arrays
    pub value: Value,
    /// Value differs from the pristine snapshot's value
    pub dirty: bool,
    /// Control was interacted with
    pub touched: bool,
    /// No own error set and every descendant valid
    pub valid: bool,
    /// Merged sync and async error flags
    pub errors: FormErrors,
    /// Merged results of every async validation received so far
    pub async_errors: FormErrors,
    /// Validator index → in-flight flag
    pub async_validate_in_progress: BTreeMap<usize, bool>,
    /// Own or on-path descendant async validation in flight
    pub validating: bool,
    /// Configuration this control was built from
    pub config: Arc<ControlConfig>,
    /// Snapshot taken at the last pristine point (no nested snapshot of its own)
    pub pristine_control: Option<Arc<AbstractControl>>,
    /// Children, by variant
    pub controls: ControlChildren,
}

impl AbstractControl {
    /// Variant tag.
    pub fn control_type(&self) -> FormControlType {
        match self.controls {
            ControlChildren::Field => FormControlType::Field,
            ControlChildren::Group(_) => FormControlType::Group,
            ControlChildren::Array(_) => FormControlType::Array,
        }
    }

    /// Direct children in configuration / index order.
    pub fn children(&self) -> Box<dyn Iterator<Item = &AbstractControl> + '_> {
        match &self.controls {
            ControlChildren::Field => Box::new(std::iter::empty()),
            ControlChildren::Group(controls) => Box::new(controls.values().map(|child| &**child)),
            ControlChildren::Array(controls) => Box::new(controls.iter().map(|child| &**child)),
        }
    }

    /// Direct child addressed by `key`, if it exists.
    pub fn child(&self, key: &ControlKey) -> Option<&AbstractControl> {
        match (&self.controls, key) {
            (ControlChildren::Group(controls), ControlKey::Name(name)) => {
                controls.get(name).map(|child| &**child)
            }
            (ControlChildren::Array(controls), ControlKey::Index(index)) => {
                controls.get(*index).map(|child| &**child)
            }
            _ => None,
        }
    }

    pub(crate) fn child_mut(&mut self, key: &ControlKey) -> Option<&mut AbstractControl> {
        match (&mut self.controls, key) {
            (ControlChildren::Group(controls), ControlKey::Name(name)) => {
                controls.get_mut(name).map(Arc::make_mut)
            }
            (ControlChildren::Array(controls), ControlKey::Index(index)) => {
                controls.get_mut(*index).map(Arc::make_mut)
            }
            _ => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Box<dyn Iterator<Item = &mut AbstractControl> + '_> {
        match &mut self.controls {
            ControlChildren::Field => Box::new(std::iter::empty()),
            ControlChildren::Group(controls) => Box::new(controls.values_mut().map(Arc::make_mut)),
            ControlChildren::Array(controls) => Box::new(controls.iter_mut().map(Arc::make_mut)),
        }
    }

    /// Pristine snapshot, if one has been taken.
    pub fn pristine(&self) -> Option<&AbstractControl> {
        self.pristine_control.as_deref()
    }

    /// Any own async validator in flight.
    pub fn is_async_validating(&self) -> bool {
        self.async_validate_in_progress.values().any(|flag| *flag)
    }

    /// Copy of this control without its own pristine snapshot.
    pub(crate) fn snapshot(&self) -> AbstractControl {
        AbstractControl {
            pristine_control: None,
            ..self.clone()
        }
    }

    /// Recompute a Group/Array value from its children. Fields are untouched.
    pub(crate) fn refresh_value(&mut self) {
        match &self.controls {
            ControlChildren::Field => {}
            ControlChildren::Group(controls) => {
                self.value = Value::Object(
                    controls
                        .iter()
                        .map(|(key, child)| (key.clone(), child.value.clone()))
                        .collect::<Map<String, Value>>(),
                );
            }
            ControlChildren::Array(controls) => {
                self.value = Value::Array(controls.iter().map(|child| child.value.clone()).collect());
            }
        }
    }

    /// Rebuild this node with every child for which `update` returns a
    /// replacement. Returns `None` when no child changed, leaving the caller
    /// free to keep sharing the original node.
    pub(crate) fn map_children<F>(&self, mut update: F) -> Option<AbstractControl>
    where
        F: FnMut(&AbstractControl) -> Option<AbstractControl>,
    {
        let mut rebuilt: Option<AbstractControl> = None;
        match &self.controls {
            ControlChildren::Field => {}
            ControlChildren::Group(controls) => {
                for (key, child) in controls {
                    if let Some(updated) = update(&**child) {
                        let node = rebuilt.get_or_insert_with(|| self.clone());
                        if let ControlChildren::Group(children) = &mut node.controls {
                            children.insert(key.clone(), Arc::new(updated));
                        }
                    }
                }
            }
            ControlChildren::Array(controls) => {
                for (index, child) in controls.iter().enumerate() {
                    if let Some(updated) = update(&**child) {
                        let node = rebuilt.get_or_insert_with(|| self.clone());
                        if let ControlChildren::Array(children) = &mut node.controls {
                            children[index] = Arc::new(updated);
                        }
                    }
                }
            }
        }
        rebuilt
    }
}
