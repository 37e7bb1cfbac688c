//! # Message Hub
//!
//! Wiring between:
//! - an input broadcast channel that effects read dispatched messages from
//! - an output outlet (broadcast + replay slot) that subscribers observe
//! - the scoped effect router and the task registry running every pipeline
//!
//! Dispatched messages are published to the outlet before effects see them,
//! so an effect-derived message is always observed after its cause.

use std::fmt;
use std::sync::Arc;

use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use crate::config::HubConfig;
use crate::errors::HubError;
use crate::message::{Effect, Message, MessageStream};
use crate::router::ScopedEffectRouter;
use crate::state::{self, StateConfig};
use crate::tasks::TaskRegistry;

// ─────────────────────────────────────────────────────────────────────────────
// Outlet
// ─────────────────────────────────────────────────────────────────────────────

/// Externally observed stream: broadcast plus a replay slot for the most
/// recent message.
struct Outlet<M> {
    tx: broadcast::Sender<M>,
    last: Arc<Mutex<Option<M>>>,
}

impl<M> Clone for Outlet<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            last: self.last.clone(),
        }
    }
}

impl<M: Message> Outlet<M> {
    fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self {
            tx,
            last: Arc::new(Mutex::new(None)),
        }
    }

    fn publish(&self, message: M) {
        // The replay slot lock is held across the send so a concurrent
        // subscriber sees each message exactly once.
        let mut last = self.last.lock();
        *last = Some(message.clone());
        let _ = self.tx.send(message);
    }

    fn subscribe(&self) -> MessageStream<M> {
        let last = self.last.lock();
        let rx = self.tx.subscribe();
        let replay = last.clone();
        drop(last);

        stream::iter(replay).chain(receiver_stream(rx)).boxed()
    }
}

fn receiver_stream<M: Message>(rx: broadcast::Receiver<M>) -> MessageStream<M> {
    BroadcastStream::new(rx)
        .filter_map(|item| {
            future::ready(match item {
                Ok(message) => Some(message),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "hub subscriber lagged; messages skipped");
                    None
                }
            })
        })
        .boxed()
}

async fn run_pipeline<M: Message>(mut output: MessageStream<M>, outlet: Outlet<M>) {
    while let Some(message) = output.next().await {
        outlet.publish(message);
    }
    tracing::trace!("effect pipeline finished");
}

// ─────────────────────────────────────────────────────────────────────────────
// Hub
// ─────────────────────────────────────────────────────────────────────────────

struct HubShared<M: Message> {
    config: HubConfig,
    input_tx: broadcast::Sender<M>,
    outlet: Outlet<M>,
    router: ScopedEffectRouter,
    tasks: TaskRegistry,
    /// Serializes scope registration and delivery so both happen in call order.
    delivery: Mutex<()>,
}

/// Reactive message hub.
///
/// Cloning yields another handle to the same hub. Effect tasks stop when
/// the last handle is dropped.
pub struct Hub<M: Message> {
    shared: Arc<HubShared<M>>,
}

impl<M: Message> Hub<M> {
    /// Create a hub with default configuration and the given generic effects.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(effects: Vec<Effect<M>>) -> Result<Self, HubError> {
        Self::with_config(HubConfig::default(), effects)
    }

    /// Create a hub with explicit configuration.
    pub fn with_config(config: HubConfig, effects: Vec<Effect<M>>) -> Result<Self, HubError> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|e| HubError::NoRuntime {
            reason: e.to_string(),
        })?;

        let (input_tx, _input_rx) = broadcast::channel(config.channel_capacity);
        let outlet = Outlet::new(config.channel_capacity);
        let tasks = TaskRegistry::new(runtime);

        for effect in &effects {
            let output = effect(receiver_stream(input_tx.subscribe()));
            tasks.spawn_cancellable(run_pipeline(output, outlet.clone()));
        }

        tracing::debug!(
            effects = effects.len(),
            capacity = config.channel_capacity,
            "message hub started"
        );

        Ok(Self {
            shared: Arc::new(HubShared {
                config,
                input_tx,
                outlet,
                router: ScopedEffectRouter::new(),
                tasks,
                delivery: Mutex::new(()),
            }),
        })
    }

    /// Dispatch one message.
    ///
    /// A scoped message whose signature is seen for the first time starts
    /// its effect pipelines before it is delivered, so those pipelines
    /// receive it. Effects are constructed outside the delivery lock; a
    /// constructor may dispatch into the hub, and what it dispatches is
    /// delivered ahead of the message that started it.
    pub fn dispatch(&self, message: M) {
        let shared = &self.shared;
        tracing::trace!(message_type = message.message_type(), "dispatch");

        // Subscribe under the lock so the new pipelines see this message.
        let pending = {
            let _delivery = shared.delivery.lock();
            shared.router.register(&message).map(|registration| {
                let signature = registration.signature;
                let inputs: Vec<_> = registration
                    .effects
                    .into_iter()
                    .map(|effect| {
                        let wanted = signature.clone();
                        let input = receiver_stream(shared.input_tx.subscribe())
                            .filter(move |candidate| future::ready(candidate.signature() == wanted))
                            .boxed();
                        (effect, input)
                    })
                    .collect();
                (signature, inputs)
            })
        };

        if let Some((signature, inputs)) = pending {
            tracing::debug!(%signature, effects = inputs.len(), "starting scoped effects");
            for (effect, input) in inputs {
                shared
                    .tasks
                    .spawn_cancellable(run_pipeline(effect(input), shared.outlet.clone()));
            }
        }

        let _delivery = shared.delivery.lock();
        shared.outlet.publish(message.clone());
        let _ = shared.input_tx.send(message);
    }

    /// Dispatch several messages in order.
    pub fn dispatch_all(&self, messages: impl IntoIterator<Item = M>) {
        for message in messages {
            self.dispatch(message);
        }
    }

    /// Stream of dispatched and effect-derived messages.
    ///
    /// Replays the most recent message first, if any.
    pub fn messages(&self) -> MessageStream<M> {
        self.shared.outlet.subscribe()
    }

    /// Project a state stream by scanning [`Hub::messages`] with a reducer.
    pub fn state<S>(&self, config: StateConfig<S, M>) -> BoxStream<'static, S>
    where
        S: Clone + PartialEq + fmt::Debug + Send + 'static,
    {
        state::project(self.messages(), config)
    }

    /// Signatures registered by the scoped effect router, sorted.
    pub fn scoped_signatures(&self) -> Vec<String> {
        self.shared.router.signatures()
    }

    /// Number of effect pipelines still running.
    pub fn running_effects(&self) -> usize {
        self.shared.tasks.running()
    }

    /// Hub configuration.
    pub fn config(&self) -> &HubConfig {
        &self.shared.config
    }
}

impl<M: Message> Clone for Hub<M> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<M: Message> fmt::Debug for Hub<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hub")
            .field("config", &self.shared.config)
            .field("scoped_signatures", &self.shared.router.signatures())
            .finish()
    }
}

impl<M: Message> Drop for Hub<M> {
    fn drop(&mut self) {
        if Arc::strong_count(&self.shared) == 1 {
            self.shared.tasks.shutdown();
        }
    }
}
