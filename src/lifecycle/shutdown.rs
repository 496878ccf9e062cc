//! Graceful shutdown.
//!
//! A `Shutdown` is cloned into every long-running task. Triggering it is
//! latched: a task that starts waiting after the trigger returns at once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct Shutdown {
    fired: Arc<AtomicBool>,
    notify: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(1);
        Self {
            fired: Arc::new(AtomicBool::new(false)),
            notify,
        }
    }

    /// Fire the signal. Returns false if it had already fired.
    pub fn trigger(&self) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            return false;
        }
        let _ = self.notify.send(());
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Resolve once `trigger` has been called, before or after this call.
    pub async fn wait(&self) {
        // subscribe first so a trigger racing the flag check is still seen
        let mut rx = self.notify.subscribe();
        if self.is_triggered() {
            return;
        }
        let _ = rx.recv().await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
