//! Guard ordering, outcomes and redirects.

use std::sync::Arc;

use serde_json::json;

use nav_router::{
    after_hook, guard, sync_guard, BoxError, GuardOutcome, RouteConfig, RoutePayload, RouteStatus,
    RouteType, Router, RouterError,
};

mod common;
use common::{param, recording_guard, Recorder, RenderCounter};

fn user_routes(recorder: &Arc<Recorder>) -> Vec<RouteConfig> {
    let enter = recorder.clone();
    let update = recorder.clone();
    let leave = recorder.clone();
    vec![
        RouteConfig::new("/"),
        RouteConfig::new("/user/:id")
            .before_enter(sync_guard(move |to, _| {
                enter.record(format!("enter {}", param(Some(to), "id")));
                Ok(())
            }))
            .before_update(sync_guard(move |to, from| {
                update.record(format!("update {}->{}", param(from, "id"), param(Some(to), "id")));
                Ok(())
            }))
            .before_leave(sync_guard(move |_, from| {
                leave.record(format!("leave {}", param(from, "id")));
                Ok(())
            })),
    ]
}

#[tokio::test]
async fn test_enter_update_leave_scenario() {
    let recorder = Recorder::new();
    let router = common::router(user_routes(&recorder));

    router.replace("/").await.unwrap();
    assert!(recorder.take().is_empty());

    router.push("/user/1").await.unwrap();
    assert_eq!(recorder.take(), vec!["enter 1"]);

    router.push("/user/2").await.unwrap();
    assert_eq!(recorder.take(), vec!["update 1->2"]);

    router.push("/").await.unwrap();
    assert_eq!(recorder.take(), vec!["leave 2"]);
    assert_eq!(router.route().unwrap().path, "/");
}

#[tokio::test]
async fn test_hash_only_change_is_an_update() {
    let recorder = Recorder::new();
    let router = common::router(user_routes(&recorder));

    router.push("/user/1#a").await.unwrap();
    router.push("/user/1#b").await.unwrap();
    assert_eq!(recorder.take(), vec!["enter 1", "update 1->1"]);
    assert_eq!(router.route().unwrap().hash, "#b");
}

#[tokio::test]
async fn test_same_full_path_runs_no_route_hooks() {
    let recorder = Recorder::new();
    let router = common::router(user_routes(&recorder));
    router.before_each(recording_guard(&recorder, "each"));

    router.push("/user/1").await.unwrap();
    recorder.take();
    router.push("/user/1").await.unwrap();
    assert_eq!(recorder.take(), vec!["each /user/1"]);
}

#[tokio::test]
async fn test_phase_order_leave_each_enter() {
    let recorder = Recorder::new();
    let router = common::router(vec![
        RouteConfig::new("/a").before_leave(recording_guard(&recorder, "leave")),
        RouteConfig::new("/b").before_enter(recording_guard(&recorder, "enter")),
    ]);
    router.before_each(recording_guard(&recorder, "each-1"));
    router.before_each(recording_guard(&recorder, "each-2"));

    router.push("/a").await.unwrap();
    recorder.take();

    router.push("/b").await.unwrap();
    assert_eq!(
        recorder.take(),
        vec!["leave /b", "each-1 /b", "each-2 /b", "enter /b"]
    );
}

#[tokio::test]
async fn test_nested_update_runs_root_to_leaf() {
    let recorder = Recorder::new();
    let router = common::router(vec![RouteConfig::new("/org/:org")
        .before_update(recording_guard(&recorder, "org"))
        .before_leave(recording_guard(&recorder, "leave-org"))
        .child(
            RouteConfig::new("team/:team")
                .before_update(recording_guard(&recorder, "team"))
                .before_leave(recording_guard(&recorder, "leave-team")),
        )
        .child(RouteConfig::new("settings").before_enter(recording_guard(&recorder, "settings")))]);

    router.push("/org/1/team/1").await.unwrap();
    router.push("/org/1/team/2").await.unwrap();
    assert_eq!(
        recorder.take(),
        vec!["org /org/1/team/2", "team /org/1/team/2"]
    );

    // The shared /org/:org depth neither leaves nor enters.
    router.push("/org/1/settings").await.unwrap();
    assert_eq!(
        recorder.take(),
        vec!["leave-team /org/1/settings", "settings /org/1/settings"]
    );
}

#[tokio::test]
async fn test_abort_leaves_route_unchanged() {
    let recorder = Recorder::new();
    let render = RenderCounter::new();
    let options = common::options(vec![
        RouteConfig::new("/"),
        RouteConfig::new("/blocked").before_enter(sync_guard(|_, _| Ok(false))),
    ])
    .with_render(render.clone());
    let router = Router::new(options).unwrap();

    let after = recorder.clone();
    router.after_each(after_hook(move |to, _| after.record(format!("after {}", to.path))));
    router.before_each(recording_guard(&recorder, "each"));

    router.replace("/").await.unwrap();
    recorder.take();
    let history_before = router.history_snapshot();

    let route = router.push("/blocked").await.unwrap();
    assert_eq!(route.status, RouteStatus::Aborted);
    assert_eq!(router.route().unwrap().path, "/");
    assert_eq!(recorder.take(), vec!["each /blocked"]);
    assert_eq!(router.history_snapshot(), history_before);
    assert_eq!(render.updates(), 1);
}

#[tokio::test]
async fn test_abort_skips_remaining_phases() {
    let recorder = Recorder::new();
    let router = common::router(vec![
        RouteConfig::new("/a"),
        RouteConfig::new("/b").before_enter(recording_guard(&recorder, "enter")),
    ]);
    router.before_each(sync_guard(|_, _| Ok(false)));
    router.before_each(recording_guard(&recorder, "each-after-abort"));

    let route = router.push("/b").await.unwrap();
    assert_eq!(route.status, RouteStatus::Aborted);
    assert!(recorder.take().is_empty());
    assert!(router.route().is_none());
}

#[tokio::test]
async fn test_guard_redirect_settles_on_final_target() {
    let recorder = Recorder::new();
    let router = common::router(vec![
        RouteConfig::new("/"),
        RouteConfig::new("/private").before_enter(sync_guard(|_, _| Ok("/login"))),
        RouteConfig::new("/login").before_enter(recording_guard(&recorder, "enter")),
    ]);
    router.replace("/").await.unwrap();

    let route = router.push("/private").await.unwrap();
    assert_eq!(route.path, "/login");
    assert_eq!(route.route_type, RouteType::Push);
    assert_eq!(route.status, RouteStatus::Success);
    assert_eq!(router.route().unwrap().path, "/login");
    assert_eq!(recorder.take(), vec!["enter /login"]);

    let history = router.history_snapshot();
    assert_eq!(history.entries.len(), 2);
    assert_eq!(history.entries[1].url, "http://localhost/login");
}

#[tokio::test]
async fn test_async_guard_redirect_with_location_object() {
    let router = common::router(vec![
        RouteConfig::new("/old/:id").before_enter(guard(|to, _| async move {
            let id = to.params.get("id").cloned().unwrap_or_default();
            let target = nav_router::RouteLocation::new(format!("/new/{}", id)).with_query("moved", "1");
            Ok::<_, BoxError>(GuardOutcome::Redirect(target))
        })),
        RouteConfig::new("/new/:id"),
    ]);

    let route = router.push("/old/7").await.unwrap();
    assert_eq!(route.full_path, "/new/7?moved=1");
}

#[tokio::test]
async fn test_redirect_cycle_is_bounded() {
    let router = Router::new(
        common::options(vec![RouteConfig::new("/a"), RouteConfig::new("/b")]).with_max_redirects(3),
    )
    .unwrap();
    router.before_each(sync_guard(|to, _| {
        Ok(if to.path == "/a" { "/b" } else { "/a" })
    }));

    let err = router.push("/a").await.unwrap_err();
    assert!(matches!(err, RouterError::TooManyRedirects { limit: 3, .. }));
    assert!(err.is_guard_error());
    assert_eq!(router.epoch(), 4);
    assert!(router.route().is_none());
}

#[tokio::test]
async fn test_guard_error_rejects_with_original_source() {
    let recorder = Recorder::new();
    let router = common::router(vec![
        RouteConfig::new("/"),
        RouteConfig::new("/admin")
            .before_enter(sync_guard(|_, _| Err::<(), BoxError>("session expired".into()))),
    ]);
    router.before_each(recording_guard(&recorder, "each"));
    let after = recorder.clone();
    router.after_each(after_hook(move |to, _| after.record(format!("after {}", to.path))));

    router.replace("/").await.unwrap();
    recorder.take();

    let err = router.push("/admin").await.unwrap_err();
    match err {
        RouterError::Guard { ref path, ref source } => {
            assert_eq!(path, "/admin");
            assert_eq!(source.to_string(), "session expired");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(recorder.take(), vec!["each /admin"]);
    assert_eq!(router.route().unwrap().path, "/");
}

#[tokio::test]
async fn test_panicking_guard_rejects_like_an_error() {
    let router = common::router(vec![
        RouteConfig::new("/"),
        RouteConfig::new("/broken").before_enter(guard(|_, _| async {
            if true {
                panic!("guard bug");
            }
            Ok::<_, BoxError>(())
        })),
    ]);
    router.replace("/").await.unwrap();

    let err = router.push("/broken").await.unwrap_err();
    assert!(matches!(err, RouterError::Guard { ref path, .. } if path == "/broken"));
    assert!(err.to_string().contains("guard bug"));

    assert_eq!(router.route().unwrap().path, "/");
    assert_eq!(router.push("/").await.unwrap().status, RouteStatus::Success);
}

#[tokio::test]
async fn test_after_each_failures_are_isolated() {
    let recorder = Recorder::new();
    let router = common::router(vec![RouteConfig::new("/")]);

    router.after_each(after_hook(|_, _| panic!("observer bug")));
    let after = recorder.clone();
    router.after_each(after_hook(move |to, from| {
        after.record(format!("after {} from {:?}", to.path, from.map(|f| f.path.clone())));
    }));

    let route = router.push("/").await.unwrap();
    assert_eq!(route.status, RouteStatus::Success);
    assert_eq!(recorder.take(), vec!["after / from None"]);
}

#[tokio::test]
async fn test_unmatched_goes_to_fallback_without_commit() {
    let options = common::options(vec![RouteConfig::new("/")]).with_fallback(
        |to: &nav_router::Route, _: Option<&nav_router::Route>| Some(json!({ "external": to.href() })),
    );
    let router = Router::new(options).unwrap();
    router.replace("/").await.unwrap();
    let epoch = router.epoch();

    let route = router.push("/nowhere").await.unwrap();
    assert_eq!(route.status, RouteStatus::Success);
    assert_eq!(route.handle, Some(json!({ "external": "http://localhost/nowhere" })));
    assert_eq!(router.route().unwrap().path, "/");
    assert_eq!(router.epoch(), epoch);
    assert_eq!(router.history_snapshot().entries.len(), 1);
}

#[tokio::test]
async fn test_push_window_delegates_to_fallback() {
    let recorder = Recorder::new();
    let seen = recorder.clone();
    let options = common::options(vec![
        RouteConfig::new("/"),
        RouteConfig::new("/report").before_enter(recording_guard(&recorder, "enter")),
    ])
    .with_fallback(move |to: &nav_router::Route, _: Option<&nav_router::Route>| {
        seen.record(format!("window {} {}", to.route_type, to.path));
        None
    });
    let router = Router::new(options).unwrap();
    router.replace("/").await.unwrap();

    let route = router.push_window("/report").await.unwrap();
    assert_eq!(route.route_type, RouteType::PushWindow);
    assert!(route.is_push);
    assert_eq!(recorder.take(), vec!["window pushWindow /report"]);
    assert_eq!(router.route().unwrap().path, "/");

    router.replace_window("/report").await.unwrap();
    assert_eq!(recorder.take(), vec!["window replaceWindow /report"]);
}

#[tokio::test]
async fn test_payloads_load_before_commit() {
    let render = RenderCounter::new();
    let options = common::options(vec![
        RouteConfig::new("/doc").payload(RoutePayload::deferred(|| async {
            Ok::<_, BoxError>(json!({ "body": "hello" }))
        })),
        RouteConfig::new("/broken")
            .payload(RoutePayload::deferred(|| async { Err::<serde_json::Value, BoxError>("404".into()) })),
        RouteConfig::new("/static").payload(RoutePayload::Static(json!(1))),
    ])
    .with_render(render.clone());
    let router = Router::new(options).unwrap();

    let route = router.push("/doc").await.unwrap();
    assert_eq!(route.payload(0).as_deref(), Some(&json!({ "body": "hello" })));
    assert_eq!(render.updates(), 1);

    let err = router.push("/broken").await.unwrap_err();
    assert!(err.is_payload_error());
    assert_eq!(router.route().unwrap().path, "/doc");
    assert_eq!(render.updates(), 1);

    let route = router.push("/static").await.unwrap();
    assert_eq!(route.payload(0).as_deref(), Some(&json!(1)));
}

#[tokio::test]
async fn test_app_selection_prefers_leaf() {
    let router = common::router(vec![RouteConfig::new("/shop")
        .app("shell")
        .child(RouteConfig::new("cart").app("cart"))
        .child(RouteConfig::new("help"))]);

    assert_eq!(router.push("/shop/cart").await.unwrap().app().as_deref(), Some("cart"));
    assert_eq!(router.push("/shop/help").await.unwrap().app().as_deref(), Some("shell"));
}
