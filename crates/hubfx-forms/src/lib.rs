//! # hubfx forms
//!
//! Form state as an immutable control tree driven by messages:
//! - `ControlConfig` describes fields, groups and arrays with their sync and
//!   async validators; `build_control_state` materializes it
//! - `forms_reducer` applies one `FormsAction` to a tree and returns the next
//!   tree (value propagation, validation, dirty/touched/pristine bookkeeping)
//! - `actions` builds the messages to dispatch on a `hubfx_core::Hub`; a value
//!   change carries one scoped value-change-effect per control with async
//!   validators, so each control's validation runs in its own pipeline
//!
//! Every tree operation returns a new tree. Unchanged subtrees are shared
//! with the previous value.

pub mod actions;
mod async_validation;
mod config;
mod control;
mod control_ref;
mod effects;
mod errors;
mod mutations;
mod reducer;
mod tree;
mod validation;
mod validators;

pub use actions::{
    ControlChange, FormsAction, ValueChangeEffect, FORMS_ADD_FORM_ARRAY_CONTROL, FORMS_ADD_GROUP_CONTROL,
    FORMS_CONTROL_ASYNC_VALIDATION_RESPONSE_SUCCESS, FORMS_CONTROL_CHANGE, FORMS_MARK_CONTROL_AS_PRISTINE,
    FORMS_MARK_CONTROL_AS_TOUCHED, FORMS_MARK_CONTROL_AS_UNTOUCHED, FORMS_REMOVE_CONTROL, FORMS_RESET_CONTROL,
    FORMS_VALUE_CHANGE_EFFECT,
};
pub use async_validation::{
    handle_async_validation, handle_async_validation_response_success, ControlAsyncValidationResponse,
};
pub use config::{value_from_config, ControlConfig, ControlConfigKind, FormControlType};
pub use control::{AbstractControl, ControlChildren};
pub use control_ref::{ControlKey, ControlRef, WILDCARD};
pub use effects::value_change_effects;
pub use errors::FormsError;
pub use mutations::{
    add_form_array_control, add_form_group_control, mark_control_as_pristine, mark_control_as_touched,
    mark_control_as_untouched, remove_control, reset_control, update_dirty, AddControl,
};
pub use reducer::{forms_reducer, project_form_state};
pub use tree::{
    build_control_state, build_control_state_at, get_ancestor_controls, get_control, get_control_branch,
    get_descendant_controls, set_value_and_propagate,
};
pub use validation::sync_validate;
pub use validators::{has_error, AsyncValidator, ErrorStream, FormErrors, Validator, ValueStream};
