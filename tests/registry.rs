//! Initialization registry: memoization, retries, re-entrancy.

use std::error::Error as _;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use nav_kernel::config::schema::InitializationConfig;
use nav_kernel::registry::{ComponentStatus, InitError, InitializationRegistry};
use nav_kernel::BoxError;

mod common;
use common::Counter;

#[tokio::test(start_paused = true)]
async fn test_concurrent_initialize_runs_once() {
    let registry = InitializationRegistry::<()>::default();
    let calls = Counter::default();
    {
        let calls = calls.clone();
        registry.register(
            "storage",
            move |_| {
                calls.bump();
                async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(())
                }
            },
            &[],
        );
    }

    let ctx = Arc::new(());
    let (a, b, c) = tokio::join!(
        registry.initialize("storage", ctx.clone()),
        registry.initialize("storage", ctx.clone()),
        registry.initialize("storage", ctx.clone()),
    );
    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(calls.get(), 1);
    assert_eq!(registry.status("storage"), Some(ComponentStatus::Initialized));

    // Later calls resolve from the memo.
    registry.initialize("storage", ctx).await.unwrap();
    assert_eq!(calls.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_share_one_rejection() {
    let registry = InitializationRegistry::<()>::default();
    let calls = Counter::default();
    {
        let calls = calls.clone();
        registry.register(
            "storage",
            move |_| {
                calls.bump();
                async { Err::<(), BoxError>("down".into()) }
            },
            &[],
        );
    }

    let ctx = Arc::new(());
    let (a, b, c) = tokio::join!(
        registry.initialize("storage", ctx.clone()),
        registry.initialize("storage", ctx.clone()),
        registry.initialize("storage", ctx.clone()),
    );
    // One retry cycle for all three callers.
    assert_eq!(calls.get(), 3);

    let failures: Vec<_> = [a, b, c]
        .into_iter()
        .map(|result| match result.unwrap_err() {
            InitError::Failed { name, attempts, source } => (name, attempts, source),
            other => panic!("unexpected error: {other:?}"),
        })
        .collect();
    for (name, attempts, source) in &failures {
        assert_eq!(name, "storage");
        assert_eq!(*attempts, 3);
        assert_eq!(source.to_string(), "down");
        assert!(Arc::ptr_eq(source, &failures[0].2));
    }
    assert_eq!(registry.status("storage"), Some(ComponentStatus::Registered));
}

#[tokio::test(start_paused = true)]
async fn test_three_attempts_with_exponential_backoff() {
    let registry = InitializationRegistry::<()>::default();
    let attempts_at = Arc::new(Mutex::new(Vec::new()));
    {
        let attempts_at = attempts_at.clone();
        registry.register(
            "flaky",
            move |_| {
                attempts_at.lock().unwrap().push(Instant::now());
                async { Err::<(), BoxError>("connection refused".into()) }
            },
            &[],
        );
    }

    let err = registry.initialize("flaky", Arc::new(())).await.unwrap_err();
    match &err {
        InitError::Failed { name, attempts, .. } => {
            assert_eq!(name, "flaky");
            assert_eq!(*attempts, 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.source().unwrap().to_string(), "connection refused");

    let times = attempts_at.lock().unwrap().clone();
    assert_eq!(times.len(), 3);
    let first_gap = times[1] - times[0];
    let second_gap = times[2] - times[1];
    assert!(first_gap >= Duration::from_millis(200));
    assert!(second_gap >= Duration::from_millis(400));
    assert!(second_gap > first_gap);

    // The failure is not memoized: the next call starts a fresh cycle.
    assert_eq!(registry.status("flaky"), Some(ComponentStatus::Registered));
    assert!(registry.initialize("flaky", Arc::new(())).await.is_err());
    assert_eq!(attempts_at.lock().unwrap().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_recovers_within_retry_budget() {
    let registry = InitializationRegistry::<()>::default();
    let calls = Counter::default();
    {
        let calls = calls.clone();
        registry.register(
            "network",
            move |_| {
                let n = calls.bump();
                async move {
                    if n < 3 {
                        return Err::<(), BoxError>("not yet".into());
                    }
                    Ok(())
                }
            },
            &[],
        );
    }

    registry.initialize("network", Arc::new(())).await.unwrap();
    assert_eq!(calls.get(), 3);
    assert_eq!(registry.attempts("network"), Some(3));
    assert!(registry.is_initialized("network"));
}

#[tokio::test]
async fn test_attempt_limit_follows_config() {
    let config = InitializationConfig {
        max_attempts: 1,
        ..InitializationConfig::default()
    };
    let registry = InitializationRegistry::<()>::new(&config);
    let calls = Counter::default();
    {
        let calls = calls.clone();
        registry.register(
            "once",
            move |_| {
                calls.bump();
                async { Err::<(), BoxError>("no".into()) }
            },
            &[],
        );
    }

    assert!(registry.initialize("once", Arc::new(())).await.is_err());
    assert_eq!(calls.get(), 1);
}

#[tokio::test]
async fn test_self_reentry_is_circular() {
    let registry = InitializationRegistry::<()>::default();
    let handle = registry.clone();
    registry.register(
        "loop",
        move |ctx| {
            let handle = handle.clone();
            async move {
                handle.initialize("loop", ctx).await?;
                Ok::<_, BoxError>(())
            }
        },
        &[],
    );

    let err = registry.initialize("loop", Arc::new(())).await.unwrap_err();
    let InitError::Failed { attempts, source, .. } = err else {
        panic!("expected the outer initializer to fail");
    };
    // Re-entrancy is never retried.
    assert_eq!(attempts, 1);
    let inner = source.downcast_ref::<InitError>().unwrap();
    assert!(matches!(
        inner,
        InitError::CircularDependency { chain } if chain == &["loop", "loop"]
    ));
}

#[tokio::test]
async fn test_mutual_reentry_is_circular() {
    let registry = InitializationRegistry::<()>::default();
    for (name, other) in [("a", "b"), ("b", "a")] {
        let handle = registry.clone();
        registry.register(
            name,
            move |ctx| {
                let handle = handle.clone();
                async move {
                    handle.initialize(other, ctx).await?;
                    Ok::<_, BoxError>(())
                }
            },
            &[other],
        );
    }

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        registry.initialize("a", Arc::new(())),
    )
    .await
    .expect("re-entrant initialization must not deadlock");
    let err = result.unwrap_err();
    assert_eq!(err.component(), "a");

    // a failed because b failed because b re-entered a.
    let InitError::Failed { attempts, source, .. } = &err else {
        panic!("expected a to fail, got {err:?}");
    };
    assert_eq!(*attempts, 1);
    let Some(InitError::Failed { name, source, .. }) = source.downcast_ref::<InitError>() else {
        panic!("expected b's failure as the cause");
    };
    assert_eq!(name, "b");
    assert!(matches!(
        source.downcast_ref::<InitError>(),
        Some(InitError::CircularDependency { chain }) if chain == &["a", "b", "a"]
    ));

    assert_eq!(registry.status("a"), Some(ComponentStatus::Registered));
    assert_eq!(registry.status("b"), Some(ComponentStatus::Registered));
}

#[tokio::test]
async fn test_unregistered_name() {
    let registry = InitializationRegistry::<()>::default();
    let err = registry.initialize("ghost", Arc::new(())).await.unwrap_err();
    assert!(matches!(err, InitError::NotRegistered(ref n) if n == "ghost"));
}

#[tokio::test]
async fn test_duplicate_registration_keeps_first() {
    let registry = InitializationRegistry::<()>::default();
    assert!(registry.register("a", |_| async { Ok(()) }, &[]));
    assert!(!registry.register("a", |_| async { Err("replaced".into()) }, &[]));

    registry.initialize("a", Arc::new(())).await.unwrap();
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn test_dependencies_are_not_initialized_implicitly() {
    let registry = InitializationRegistry::<()>::default();
    registry.register("storage", |_| async { Ok(()) }, &[]);
    registry.register("router", |_| async { Ok(()) }, &["storage"]);

    registry.initialize("router", Arc::new(())).await.unwrap();
    assert!(registry.is_initialized("router"));
    assert!(!registry.is_initialized("storage"));
    assert_eq!(registry.dependencies("router"), Some(vec!["storage".to_string()]));
}

#[tokio::test]
async fn test_initialize_all() {
    let registry = InitializationRegistry::<()>::default();
    let calls = Counter::default();
    for name in ["a", "b", "c"] {
        let calls = calls.clone();
        registry.register(
            name,
            move |_| {
                calls.bump();
                async { Ok(()) }
            },
            &[],
        );
    }

    registry.initialize_all(Arc::new(())).await.unwrap();
    assert_eq!(calls.get(), 3);
    assert!(["a", "b", "c"].iter().all(|n| registry.is_initialized(n)));
}

#[tokio::test]
async fn test_initialize_all_reports_the_failure() {
    let config = InitializationConfig {
        max_attempts: 1,
        ..InitializationConfig::default()
    };
    let registry = InitializationRegistry::<()>::new(&config);
    registry.register("settings", |_| async { Ok(()) }, &[]);
    registry.register("storage", |_| async { Err::<(), BoxError>("disk full".into()) }, &[]);
    registry.register("routes", |_| async { Ok(()) }, &[]);

    let err = registry.initialize_all(Arc::new(())).await.unwrap_err();
    assert_eq!(err.component(), "storage");
    assert!(matches!(err, InitError::Failed { attempts: 1, .. }));
    assert_eq!(err.source().unwrap().to_string(), "disk full");
    assert!(!registry.is_initialized("storage"));
}

#[test]
fn test_dependency_order_and_cycles() {
    let registry = InitializationRegistry::<()>::default();
    registry.register("router", |_| async { Ok(()) }, &["storage", "settings"]);
    registry.register("storage", |_| async { Ok(()) }, &["settings"]);
    registry.register("settings", |_| async { Ok(()) }, &[]);
    assert_eq!(
        registry.dependency_order().unwrap(),
        vec!["settings", "storage", "router"]
    );

    registry.register("settings", |_| async { Ok(()) }, &["router"]);
    assert!(registry.check_dependency_graph().is_ok(), "duplicate is ignored");

    let cyclic = InitializationRegistry::<()>::default();
    cyclic.register("x", |_| async { Ok(()) }, &["y"]);
    cyclic.register("y", |_| async { Ok(()) }, &["x"]);
    assert!(cyclic.check_dependency_graph().is_err());
}
