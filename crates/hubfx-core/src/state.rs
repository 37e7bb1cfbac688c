//! # State Projection
//!
//! Scans a message stream with a reducer, emitting one state per message.

use std::fmt;
use std::sync::Arc;

use futures::future;
use futures::stream::{BoxStream, StreamExt};

use crate::message::{Message, MessageStream};

/// Reducer used by a state projection.
pub type Reducer<S, M> = Arc<dyn Fn(&S, &M) -> S + Send + Sync>;

/// Configuration for [`crate::Hub::state`].
pub struct StateConfig<S, M> {
    /// Projection name used in debug logs
    pub name: Option<String>,
    /// State before the first message
    pub initial_state: S,
    /// Reducer applied to every message
    pub reducer: Reducer<S, M>,
    /// Log every message and state transition at `debug`
    pub debug: bool,
}

impl<S, M> StateConfig<S, M> {
    /// Unnamed projection with debug logging disabled.
    pub fn new<F>(initial_state: S, reducer: F) -> Self
    where
        F: Fn(&S, &M) -> S + Send + Sync + 'static,
    {
        Self {
            name: None,
            initial_state,
            reducer: Arc::new(reducer),
            debug: false,
        }
    }

    /// Set the projection name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Enable or disable debug logging.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

pub(crate) fn project<S, M>(messages: MessageStream<M>, config: StateConfig<S, M>) -> BoxStream<'static, S>
where
    S: Clone + PartialEq + fmt::Debug + Send + 'static,
    M: Message,
{
    let StateConfig {
        name,
        initial_state,
        reducer,
        debug,
    } = config;
    let name = name.unwrap_or_else(|| "undefined".to_string());

    messages
        .scan(initial_state, move |state, message| {
            if debug {
                tracing::debug!(stream = %name, message = ?message, "message received");
            }
            let next = reducer(state, &message);
            if debug {
                if next == *state {
                    tracing::debug!(stream = %name, state = ?next, "state unchanged");
                } else {
                    tracing::debug!(stream = %name, prev = ?state, next = ?next, "state changed");
                }
            }
            *state = next.clone();
            future::ready(Some(next))
        })
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Action;
    use futures::stream;

    fn counter(state: &i64, action: &Action<i64>) -> i64 {
        match action.action_type.as_str() {
            "ADD" => state + action.payload,
            "SUB" => state - action.payload,
            _ => *state,
        }
    }

    #[tokio::test]
    async fn test_projection_emits_one_state_per_message() {
        let messages = stream::iter(vec![
            Action::new("ADD", 5),
            Action::new("NOOP", 0),
            Action::new("SUB", 2),
        ])
        .boxed();

        let states: Vec<i64> = project(messages, StateConfig::new(10, counter).named("counter").with_debug(true))
            .collect()
            .await;
        assert_eq!(states, vec![15, 15, 13]);
    }
}
