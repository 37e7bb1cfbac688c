//! # Value-change effects
//!
//! Turns a control's async validators into scoped hub effects. Each effect
//! sees only the value-change-effect messages of its own control (the hub
//! routes by signature), feeds their values to the validator and tags every
//! result with the control path and the validator index.

use futures::future;
use futures::stream::StreamExt;
use hubfx_core::{effect, Effect, MessageStream, ScopedEffects};

use crate::actions::{FormsAction, ValueChangeEffect};
use crate::async_validation::ControlAsyncValidationResponse;
use crate::control::AbstractControl;
use crate::control_ref::ControlRef;
use crate::validators::AsyncValidator;

/// One value-change-effect per control that has async validators.
pub fn value_change_effects<'a>(controls: impl IntoIterator<Item = &'a AbstractControl>) -> Vec<FormsAction> {
    controls
        .into_iter()
        .filter(|control| !control.config.async_validators.is_empty())
        .map(|control| {
            let effects = control
                .config
                .async_validators
                .iter()
                .enumerate()
                .map(|(index, validator)| validation_effect(control.control_ref.clone(), index, validator.clone()))
                .collect();

            FormsAction::ValueChangeEffect(ValueChangeEffect {
                control_ref: control.control_ref.clone(),
                value: control.value.clone(),
                scoped_effects: ScopedEffects::keyed(control.control_ref.key(), effects),
            })
        })
        .collect()
}

fn validation_effect(control_ref: ControlRef, validator_index: usize, validator: AsyncValidator) -> Effect<FormsAction> {
    effect(move |actions: MessageStream<FormsAction>| {
        let values = actions
            .filter_map(|action| {
                future::ready(match action {
                    FormsAction::ValueChangeEffect(change) => Some(change.value),
                    _ => None,
                })
            })
            .boxed();

        let control_ref = control_ref.clone();
        validator.validate(values).map(move |errors| {
            tracing::trace!(%control_ref, validator_index, ?errors, "async validation result");
            FormsAction::AsyncValidationResponseSuccess(ControlAsyncValidationResponse {
                control_ref: control_ref.clone(),
                validator_index,
                errors,
            })
        })
    })
}
