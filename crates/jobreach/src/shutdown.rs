//! Cooperative shutdown signal.
//!
//! Shared between the workflow runner (which stops picking up jobs) and
//! the dispatcher (which abandons its pacing sleep mid-batch). A job
//! interrupted this way keeps its current step and resumes on the next
//! startup.

use tokio::sync::watch;

/// Creates the shutdown channel. Keep the sender on the embedding shell;
/// hand clones of the receiver to the orchestrator.
pub fn channel() -> (watch::Sender<bool>, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (tx, Shutdown { rx })
}

/// Receiving half of the shutdown signal. Cloning is cheap.
#[derive(Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// Whether shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown is requested. Never resolves if the
    /// sender is dropped without signalling, so selecting against this
    /// stays safe in tests that discard the sender.
    pub async fn wait(&mut self) {
        loop {
            if *self.rx.borrow() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
