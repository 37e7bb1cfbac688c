//! # hubfx core
//!
//! Minimal reactive message hub:
//! - `Hub`: broadcast dispatcher with replay-of-last-message semantics
//! - Generic effects: stream transforms attached at construction
//! - Scoped effects: per-signature pipelines started lazily on first sighting
//! - `Hub::state`: reducer projection over the message stream
//! - `switch_map` / `merge_map`: flattening strategies for effects
//!
//! Effects run as tokio tasks owned by the hub; they are aborted when the
//! last hub handle is dropped.

mod config;
mod errors;
mod hub;
mod message;
mod operators;
mod router;
mod state;
mod tasks;

pub use config::HubConfig;
pub use errors::HubError;
pub use hub::Hub;
pub use message::{effect, scope_signature, Action, Effect, Message, MessageStream, ScopedEffects};
pub use operators::{merge_map, switch_map, SwitchMap};
pub use state::{Reducer, StateConfig};
