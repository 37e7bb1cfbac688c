//! # Scoped Effect Router
//!
//! Registry of scope signatures seen by one hub. The first message carrying
//! a given signature registers it together with its effect list; later
//! messages with the same signature are routed into the already-running
//! pipelines and never re-register.
//!
//! The registry is only written from `Hub::dispatch`, which serializes
//! delivery, so registration is race-free.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::message::{Effect, Message};

/// Registration outcome for a newly seen signature.
pub(crate) struct Registration<M> {
    pub(crate) signature: String,
    pub(crate) effects: Vec<Effect<M>>,
}

/// Per-hub signature registry (signature → number of effects started).
#[derive(Debug, Default)]
pub(crate) struct ScopedEffectRouter {
    registry: Mutex<HashMap<String, usize>>,
}

impl ScopedEffectRouter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register the message's scope if its signature has not been seen.
    ///
    /// Returns `None` for unscoped messages, messages with an empty effect
    /// list and already-registered signatures.
    pub(crate) fn register<M: Message>(&self, message: &M) -> Option<Registration<M>> {
        let scope = message.scoped_effects().filter(|scope| !scope.is_empty())?;
        let signature = message.signature();

        let mut registry = self.registry.lock();
        if registry.contains_key(&signature) {
            return None;
        }
        registry.insert(signature.clone(), scope.effects.len());

        Some(Registration {
            signature,
            effects: scope.effects.clone(),
        })
    }

    pub(crate) fn signatures(&self) -> Vec<String> {
        let mut signatures: Vec<String> = self.registry.lock().keys().cloned().collect();
        signatures.sort();
        signatures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{effect, Action, ScopedEffects};

    fn scoped(key: Option<&str>) -> Action<u32> {
        let passthrough: Effect<Action<u32>> = effect(|input| input);
        let scope = match key {
            Some(key) => ScopedEffects::keyed(key, vec![passthrough]),
            None => ScopedEffects::new(vec![passthrough]),
        };
        Action::new("TEST_ACTION", 0).scoped(scope)
    }

    #[test]
    fn test_first_sighting_wins() {
        let router = ScopedEffectRouter::new();
        assert!(router.register(&scoped(Some("a"))).is_some());
        assert!(router.register(&scoped(Some("a"))).is_none());
        assert_eq!(
            router.signatures(),
            vec!["type:TEST_ACTION,scoped:true,key:a".to_string()]
        );
    }

    #[test]
    fn test_distinct_keys_register_independently() {
        let router = ScopedEffectRouter::new();
        assert!(router.register(&scoped(Some("a"))).is_some());
        assert!(router.register(&scoped(Some("b"))).is_some());
        assert!(router.register(&scoped(None)).is_some());
        assert_eq!(router.signatures().len(), 3);
    }

    #[test]
    fn test_unscoped_and_empty_scopes_ignored() {
        let router = ScopedEffectRouter::new();
        assert!(router.register(&Action::new("TEST_ACTION", 0u32)).is_none());

        let empty = Action::new("TEST_ACTION", 0u32).scoped(ScopedEffects::keyed("a", vec![]));
        assert!(router.register(&empty).is_none());
        assert!(router.signatures().is_empty());
    }
}
