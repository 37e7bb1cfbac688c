//! # Control configuration
//!
//! Static description of a control tree: variant, initial values, sync and
//! async validators. Children are `Arc`-shared so every built node can hold
//! its own configuration cheaply.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::validators::{AsyncValidator, Validator};

/// Control variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormControlType {
    /// Leaf holding a scalar or opaque value
    Field,
    /// Named children
    Group,
    /// Ordered children
    Array,
}

/// Variant-specific configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlConfigKind {
    /// Leaf with its initial value
    Field {
        /// Value the field starts with
        initial_value: Value,
    },
    /// Named children in declaration order
    Group {
        /// Child configurations
        controls: IndexMap<String, Arc<ControlConfig>>,
    },
    /// Ordered children
    Array {
        /// Child configurations
        controls: Vec<Arc<ControlConfig>>,
    },
}

/// Configuration of one control (and, recursively, its children).
#[derive(Debug, Clone, PartialEq)]
pub struct ControlConfig {
    /// Variant and children
    pub kind: ControlConfigKind,
    /// Sync validators, applied in order
    pub validators: Vec<Validator>,
    /// Async validators, addressed by their index
    pub async_validators: Vec<AsyncValidator>,
}

impl ControlConfig {
    fn with_kind(kind: ControlConfigKind) -> Self {
        Self {
            kind,
            validators: Vec::new(),
            async_validators: Vec::new(),
        }
    }

    /// Field starting at `initial_value`.
    pub fn field(initial_value: impl Into<Value>) -> Self {
        Self::with_kind(ControlConfigKind::Field {
            initial_value: initial_value.into(),
        })
    }

    /// Group of named children, kept in the given order.
    pub fn group<K, I>(controls: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ControlConfig)>,
    {
        Self::with_kind(ControlConfigKind::Group {
            controls: controls
                .into_iter()
                .map(|(key, config)| (key.into(), Arc::new(config)))
                .collect(),
        })
    }

    /// Array of children.
    pub fn array(controls: impl IntoIterator<Item = ControlConfig>) -> Self {
        Self::with_kind(ControlConfigKind::Array {
            controls: controls.into_iter().map(Arc::new).collect(),
        })
    }

    /// Replace the sync validators.
    pub fn with_validators(mut self, validators: Vec<Validator>) -> Self {
        self.validators = validators;
        self
    }

    /// Replace the async validators.
    pub fn with_async_validators(mut self, async_validators: Vec<AsyncValidator>) -> Self {
        self.async_validators = async_validators;
        self
    }

    /// Variant tag.
    pub fn control_type(&self) -> FormControlType {
        match self.kind {
            ControlConfigKind::Field { .. } => FormControlType::Field,
            ControlConfigKind::Group { .. } => FormControlType::Group,
            ControlConfigKind::Array { .. } => FormControlType::Array,
        }
    }
}

/// Value a control built from `config` starts with.
pub fn value_from_config(config: &ControlConfig) -> Value {
    match &config.kind {
        ControlConfigKind::Field { initial_value } => initial_value.clone(),
        ControlConfigKind::Group { controls } => Value::Object(
            controls
                .iter()
                .map(|(key, child)| (key.clone(), value_from_config(child)))
                .collect::<Map<String, Value>>(),
        ),
        ControlConfigKind::Array { controls } => {
            Value::Array(controls.iter().map(|child| value_from_config(child)).collect())
        }
    }
}
