//! Message recorder
//!
//! Collects everything a hub emits so tests can assert exact, ordered
//! message sequences.

use std::sync::Arc;

use futures::StreamExt;
use hubfx_core::{Hub, Message};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Records every message observed on a hub's message stream.
pub struct MessageRecorder<M> {
    messages: Arc<Mutex<Vec<M>>>,
    task: JoinHandle<()>,
}

impl<M: Message> MessageRecorder<M> {
    /// Subscribe to `hub` and start recording.
    ///
    /// Must run inside a tokio runtime. A message dispatched before this call
    /// is only seen if it is the hub's most recent one (replay).
    pub fn start(hub: &Hub<M>) -> Self {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = messages.clone();
        let mut stream = hub.messages();
        let task = tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                sink.lock().push(message);
            }
        });
        Self { messages, task }
    }

    /// Copy of everything recorded so far.
    pub fn messages(&self) -> Vec<M> {
        self.messages.lock().clone()
    }

    /// Types of everything recorded so far, in order.
    pub fn message_types(&self) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .map(|message| message.message_type().to_string())
            .collect()
    }

    /// Number of recorded messages.
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

impl<M> Drop for MessageRecorder<M> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
