//! Payload stage: run deferred loaders of the target chain concurrently.

use std::sync::Arc;

use futures_util::future::join_all;
use serde_json::Value;

use crate::error::RouterError;
use crate::observability::metrics;
use crate::route::Route;
use crate::routing::{CompiledRoute, PayloadLoader, RoutePayload};

/// Load every missing payload of `to.matched` and cache the results.
///
/// All loaders are awaited even when one fails; the first failure in chain
/// order is returned.
pub(crate) async fn load_payloads(to: &Route, record_metrics: bool) -> Result<(), RouterError> {
    let pending: Vec<(Arc<CompiledRoute>, PayloadLoader)> = to
        .matched
        .iter()
        .filter(|node| node.needs_payload())
        .filter_map(|node| match node.payload_source() {
            RoutePayload::Deferred(loader) => Some((node.clone(), loader.clone())),
            _ => None,
        })
        .collect();

    if pending.is_empty() {
        return Ok(());
    }
    tracing::debug!(count = pending.len(), "Loading payloads");

    let results = join_all(pending.iter().map(|(_, loader)| loader())).await;

    let mut first_error = None;
    for ((node, _), result) in pending.iter().zip(results) {
        let route = node.absolute_path().to_string();
        let error = match result {
            Ok(Value::Null) => {
                tracing::error!(route = %route, "Payload loader resolved to null");
                Some(RouterError::InvalidPayload { route })
            }
            Ok(value) => {
                node.store_payload(value);
                None
            }
            Err(source) => {
                tracing::error!(route = %route, error = %source, "Payload loader failed");
                Some(RouterError::PayloadLoad { route, source })
            }
        };
        if record_metrics {
            metrics::record_payload_load(error.is_none());
        }
        if first_error.is_none() {
            first_error = error;
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::route::{resolve, RouteType};
    use crate::routing::{RouteConfig, RouteMatcher};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Barrier;
    use tokio::time::timeout;
    use url::Url;

    fn route(matcher: &RouteMatcher, path: &str) -> Route {
        let base = Url::parse("http://localhost/").unwrap();
        resolve(&path.into(), &base, None, matcher, RouteType::Push).unwrap()
    }

    #[tokio::test]
    async fn test_loaders_run_concurrently_and_are_cached() {
        // Each loader waits for the other; run one after another they never finish.
        let barrier = Arc::new(Barrier::new(2));
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = |value: Value| {
            let calls = calls.clone();
            let barrier = barrier.clone();
            RoutePayload::deferred(move || {
                let calls = calls.clone();
                let barrier = barrier.clone();
                let value = value.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    barrier.wait().await;
                    Ok::<_, BoxError>(value)
                }
            })
        };

        let matcher = RouteMatcher::compile(&[RouteConfig::new("/a")
            .payload(loader(json!("outer")))
            .child(RouteConfig::new("b").payload(loader(json!("inner"))))])
        .unwrap();
        let to = route(&matcher, "/a/b");

        timeout(Duration::from_secs(5), load_payloads(&to, false))
            .await
            .expect("loaders did not overlap")
            .unwrap();
        assert_eq!(to.payload(0).as_deref(), Some(&json!("outer")));
        assert_eq!(to.payload(1).as_deref(), Some(&json!("inner")));

        load_payloads(&to, false).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_null_and_error_fail_the_stage() {
        let matcher = RouteMatcher::compile(&[
            RouteConfig::new("/null").payload(RoutePayload::deferred(|| async { Ok::<_, BoxError>(Value::Null) })),
            RouteConfig::new("/err")
                .payload(RoutePayload::deferred(|| async { Err::<Value, BoxError>("offline".into()) })),
        ])
        .unwrap();

        let err = load_payloads(&route(&matcher, "/null"), false).await.unwrap_err();
        assert!(matches!(err, RouterError::InvalidPayload { ref route } if route == "/null"));

        let err = load_payloads(&route(&matcher, "/err"), false).await.unwrap_err();
        assert!(err.is_payload_error());
        assert!(err.to_string().contains("offline"));
    }
}
