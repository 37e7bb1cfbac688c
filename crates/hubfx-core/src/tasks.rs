//! Background task registry for effect pipelines.

use std::future::Future;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Owns every task a hub spawns so they can be stopped together.
#[derive(Debug)]
pub(crate) struct TaskRegistry {
    runtime: Handle,
    shutdown_tx: watch::Sender<bool>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl TaskRegistry {
    pub(crate) fn new(runtime: Handle) -> Self {
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);
        Self {
            runtime,
            shutdown_tx,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Spawn `fut` on the hub runtime; it stops early on shutdown.
    pub(crate) fn spawn_cancellable<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let handle = self.runtime.spawn(async move {
            tokio::select! {
                _ = shutdown_rx.changed() => {}
                _ = fut => {}
            }
        });
        let mut handles = self.handles.lock();
        handles.retain(|handle| !handle.is_finished());
        handles.push(handle);
    }

    pub(crate) fn running(&self) -> usize {
        self.handles
            .lock()
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    pub(crate) fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        for handle in self.handles.lock().drain(..) {
            handle.abort();
        }
    }
}
