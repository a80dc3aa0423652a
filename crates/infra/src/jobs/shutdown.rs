//! Cooperative stop signal for the update worker.

use tokio::sync::watch;

/// Raising side of the signal. Dropping it counts as raising.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn raise(&self) {
        // send_replace never fails, even with no receiver left.
        self.tx.send_replace(true);
    }
}

/// Observing side of the signal.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn pair() -> (ShutdownTrigger, ShutdownSignal) {
        let (tx, rx) = watch::channel(false);
        (ShutdownTrigger { tx }, ShutdownSignal { rx })
    }

    pub fn is_raised(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolve once the signal is raised or the trigger is gone.
    pub async fn raised(&mut self) {
        let _ = self.rx.wait_for(|stop| *stop).await;
    }
}
