//! Router teardown latch.
//!
//! A one-way flag shared by the router and its background tasks. Once set
//! it stays set, so a task that starts waiting after `destroy` still sees it.

use tokio::sync::watch;

/// Set exactly once, by the first `Router::destroy`.
pub struct Teardown {
    tx: watch::Sender<bool>,
}

impl Teardown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Set the latch. True only for the call that actually set it.
    pub fn begin(&self) -> bool {
        !self.tx.send_replace(true)
    }

    pub fn is_done(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn signal(&self) -> TeardownSignal {
        TeardownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Background tasks still holding a signal.
    pub fn waiters(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Teardown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half held by a background task.
pub struct TeardownSignal {
    rx: watch::Receiver<bool>,
}

impl TeardownSignal {
    /// Resolves once the router is torn down, immediately if it already is.
    pub async fn wait(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            // A dropped latch means the router is gone.
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}
