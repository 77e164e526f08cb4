//! Popstate listener task.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::history::PopStateEvent;
use crate::lifecycle::TeardownSignal;
use crate::router::Router;

/// Forward substrate events into the router until teardown.
///
/// Returns `None` when called outside a tokio runtime; events are then
/// never delivered.
pub(crate) fn spawn_popstate_listener(
    router: &Router,
    mut events: mpsc::UnboundedReceiver<PopStateEvent>,
    mut teardown: TeardownSignal,
) -> Option<JoinHandle<()>> {
    let Ok(handle) = Handle::try_current() else {
        tracing::warn!("No tokio runtime; popstate events will not be delivered");
        return None;
    };
    let weak = Arc::downgrade(&router.inner);

    Some(handle.spawn(async move {
        tracing::debug!("Popstate listener started");
        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        tracing::debug!("Popstate channel closed");
                        break;
                    };
                    let Some(inner) = weak.upgrade() else {
                        break;
                    };
                    let router = Router::from_inner(inner);
                    tokio::spawn(async move {
                        let url = event.url.clone();
                        if let Err(e) = router.handle_popstate(event).await {
                            tracing::warn!(url = %url, error = %e, "Popstate navigation failed");
                        }
                    });
                }
                _ = teardown.wait() => {
                    tracing::debug!("Router torn down, popstate listener exiting");
                    break;
                }
            }
        }
    }))
}
