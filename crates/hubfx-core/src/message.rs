//! # Messages and Effects
//!
//! A message is anything the hub can route: it names its type and may carry
//! a scope descriptor (`ScopedEffects`). Effects are stream transforms from
//! messages to messages.

use std::fmt;
use std::sync::Arc;

use futures::stream::{BoxStream, Stream, StreamExt};

/// Boxed stream of messages flowing into or out of an effect.
pub type MessageStream<M> = BoxStream<'static, M>;

/// Transform from an input message stream to a derived message stream.
///
/// Scoped effects are called once, when their signature is first seen.
pub type Effect<M> = Arc<dyn Fn(MessageStream<M>) -> MessageStream<M> + Send + Sync>;

/// Wrap a stream transform as an [`Effect`].
pub fn effect<M, F, S>(transform: F) -> Effect<M>
where
    M: Send + 'static,
    F: Fn(MessageStream<M>) -> S + Send + Sync + 'static,
    S: Stream<Item = M> + Send + 'static,
{
    Arc::new(move |input| transform(input).boxed())
}

/// Routing signature for a scoped message.
///
/// The key segment is omitted when the key is absent or empty.
pub fn scope_signature(message_type: &str, key: Option<&str>) -> String {
    match key {
        Some(key) if !key.is_empty() => format!("type:{message_type},scoped:true,key:{key}"),
        _ => format!("type:{message_type},scoped:true"),
    }
}

/// Scope descriptor carried by a message.
///
/// Messages sharing a signature share one set of running effect pipelines.
pub struct ScopedEffects<M> {
    /// Optional key distinguishing scopes of the same message type
    pub key: Option<String>,
    /// Effects started when this signature is first seen
    pub effects: Vec<Effect<M>>,
}

impl<M> ScopedEffects<M> {
    /// Scope without a key.
    pub fn new(effects: Vec<Effect<M>>) -> Self {
        Self { key: None, effects }
    }

    /// Scope with a key.
    pub fn keyed(key: impl Into<String>, effects: Vec<Effect<M>>) -> Self {
        Self {
            key: Some(key.into()),
            effects,
        }
    }

    /// True when no effects are attached.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl<M> Clone for ScopedEffects<M> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            effects: self.effects.clone(),
        }
    }
}

impl<M> fmt::Debug for ScopedEffects<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedEffects")
            .field("key", &self.key)
            .field("effects", &self.effects.len())
            .finish()
    }
}

// Effects compare by identity.
impl<M> PartialEq for ScopedEffects<M> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.effects.len() == other.effects.len()
            && self
                .effects
                .iter()
                .zip(&other.effects)
                .all(|(a, b)| Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>())
    }
}

/// A message routable by the hub.
pub trait Message: Clone + fmt::Debug + Send + Sync + 'static {
    /// The message type name.
    fn message_type(&self) -> &str;

    /// Scope descriptor, if this message requests scoped effects.
    fn scoped_effects(&self) -> Option<&ScopedEffects<Self>> {
        None
    }

    /// Routing signature derived from the type and the scope key.
    fn signature(&self) -> String {
        scope_signature(
            self.message_type(),
            self.scoped_effects().and_then(|scope| scope.key.as_deref()),
        )
    }
}

/// General-purpose message: a type name, a payload and an optional scope.
pub struct Action<P> {
    /// Message type name
    pub action_type: String,
    /// Message payload
    pub payload: P,
    /// Optional scope descriptor
    pub scoped_effects: Option<ScopedEffects<Action<P>>>,
}

impl<P> Action<P> {
    /// Unscoped action.
    pub fn new(action_type: impl Into<String>, payload: P) -> Self {
        Self {
            action_type: action_type.into(),
            payload,
            scoped_effects: None,
        }
    }

    /// Attach a scope descriptor.
    pub fn scoped(mut self, scope: ScopedEffects<Action<P>>) -> Self {
        self.scoped_effects = Some(scope);
        self
    }
}

impl<P: Clone> Clone for Action<P> {
    fn clone(&self) -> Self {
        Self {
            action_type: self.action_type.clone(),
            payload: self.payload.clone(),
            scoped_effects: self.scoped_effects.clone(),
        }
    }
}

impl<P: fmt::Debug> fmt::Debug for Action<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("action_type", &self.action_type)
            .field("payload", &self.payload)
            .field("scoped_effects", &self.scoped_effects)
            .finish()
    }
}

impl<P: PartialEq> PartialEq for Action<P> {
    fn eq(&self, other: &Self) -> bool {
        self.action_type == other.action_type
            && self.payload == other.payload
            && self.scoped_effects == other.scoped_effects
    }
}

impl<P> Message for Action<P>
where
    P: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn message_type(&self) -> &str {
        &self.action_type
    }

    fn scoped_effects(&self) -> Option<&ScopedEffects<Self>> {
        self.scoped_effects.as_ref()
    }
}
