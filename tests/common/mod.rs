//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;

use nav_router::guards::Guard;
use nav_router::{
    sync_guard, HistorySubstrate, PopStateEvent, RenderAdapter, Route, RouteConfig, Router,
    RouterOptions,
};

pub const BASE: &str = "http://localhost/";

/// Ordered log of hook invocations.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

/// A guard that logs `label to.full_path` and continues.
pub fn recording_guard(recorder: &Arc<Recorder>, label: &'static str) -> Guard {
    let recorder = recorder.clone();
    sync_guard(move |to, _| {
        recorder.record(format!("{} {}", label, to.full_path));
        Ok(())
    })
}

pub fn param(route: Option<&Route>, name: &str) -> String {
    route
        .and_then(|r| r.params.get(name).cloned())
        .unwrap_or_else(|| "-".to_string())
}

/// Counts render notifications.
#[derive(Default)]
pub struct RenderCounter {
    updates: AtomicUsize,
    destroyed: AtomicBool,
    last_path: Mutex<Option<String>>,
}

impl RenderCounter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn last_path(&self) -> Option<String> {
        self.last_path.lock().unwrap().clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

impl RenderAdapter for RenderCounter {
    fn update(&self, router: &Router) {
        self.updates.fetch_add(1, Ordering::SeqCst);
        *self.last_path.lock().unwrap() = router.route().map(|r| r.full_path.clone());
    }

    fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }
}

/// In-memory stand-in for a browser's session history.
#[derive(Default)]
pub struct FakeSubstrate {
    calls: Mutex<Vec<String>>,
    sender: Mutex<Option<mpsc::UnboundedSender<PopStateEvent>>>,
}

impl FakeSubstrate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Deliver a native popstate to whoever subscribed.
    pub fn emit(&self, url: &str, position: Option<usize>) {
        let sender = self.sender.lock().unwrap();
        if let Some(tx) = sender.as_ref() {
            let _ = tx.send(PopStateEvent {
                url: url.to_string(),
                state: Value::Null,
                position,
            });
        }
    }
}

impl HistorySubstrate for FakeSubstrate {
    fn push_state(&self, url: &str, _state: &Value, position: usize) {
        self.calls.lock().unwrap().push(format!("push {} @{}", url, position));
    }

    fn replace_state(&self, url: &str, _state: &Value, position: usize) {
        self.calls.lock().unwrap().push(format!("replace {} @{}", url, position));
    }

    fn go(&self, delta: isize) {
        self.calls.lock().unwrap().push(format!("go {}", delta));
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<PopStateEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.sender.lock().unwrap() = Some(tx);
        rx
    }

    fn unsubscribe(&self) {
        self.calls.lock().unwrap().push("unsubscribe".to_string());
        self.sender.lock().unwrap().take();
    }
}

pub fn options(routes: Vec<RouteConfig>) -> RouterOptions {
    RouterOptions::new(BASE, routes).unwrap()
}

pub fn router(routes: Vec<RouteConfig>) -> Router {
    Router::new(options(routes)).unwrap()
}

/// Poll until `check` holds or a second elapses.
pub async fn wait_for(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
