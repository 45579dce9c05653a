//! Script loader retry, polling and idempotence

mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use bookline_core::ScriptLoader;
use bookline_domain::{AuthError, LoaderConfig};
use support::FakeInjector;

fn loader(injector: &Arc<FakeInjector>) -> ScriptLoader {
    ScriptLoader::new(injector.clone(), LoaderConfig::default())
}

#[tokio::test(start_paused = true)]
async fn test_second_load_does_not_inject_again() {
    let injector = Arc::new(FakeInjector::loads_cleanly());
    let loader = loader(&injector);

    loader.load().await.unwrap();
    loader.load().await.unwrap();

    assert_eq!(injector.injections(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_already_available_resolves_immediately() {
    let injector = Arc::new(FakeInjector::loaded());
    let started = tokio::time::Instant::now();

    loader(&injector).load().await.unwrap();

    assert_eq!(injector.injections(), 0);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_waits_for_in_flight_script() {
    let injector = Arc::new(FakeInjector::in_flight());
    let available = injector.available.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(450)).await;
        available.store(true, Ordering::SeqCst);
    });
    let started = tokio::time::Instant::now();

    loader(&injector).load().await.unwrap();

    assert_eq!(injector.injections(), 0);
    assert_eq!(started.elapsed(), Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_script_that_never_loads_times_out() {
    let injector = Arc::new(FakeInjector::in_flight());
    let started = tokio::time::Instant::now();

    let err = loader(&injector).load().await.unwrap_err();

    assert_eq!(err, AuthError::ScriptLoad("Google script loading timeout".into()));
    // three 10s waits separated by 1s and 2s of backoff
    assert_eq!(started.elapsed(), Duration::from_secs(33));
    assert_eq!(injector.injections(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_transient_injection_failure_is_retried() {
    let injector = Arc::new(FakeInjector::failing(1));

    loader(&injector).load().await.unwrap();

    assert_eq!(injector.injections(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_persistent_failure_surfaces_last_error() {
    let injector = Arc::new(FakeInjector::failing(5));

    let err = loader(&injector).load().await.unwrap_err();

    assert_eq!(err, AuthError::ScriptLoad("Failed to load Google authentication script".into()));
    assert_eq!(injector.injections(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_loaded_script_without_surface_adds_one_element() {
    let injector = Arc::new(FakeInjector::loads_empty());

    let err = loader(&injector).load().await.unwrap_err();

    assert!(matches!(err, AuthError::ScriptLoad(_)));
    assert_eq!(injector.injections(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_zero_poll_interval_still_honours_max_wait() {
    let injector = Arc::new(FakeInjector::in_flight());
    let config = LoaderConfig {
        max_attempts: 1,
        poll_interval: Duration::ZERO,
        max_wait: Duration::from_secs(2),
        ..LoaderConfig::default()
    };
    let started = tokio::time::Instant::now();

    let result = tokio::time::timeout(
        Duration::from_secs(3),
        ScriptLoader::new(injector.clone(), config).load(),
    )
    .await
    .expect("wait for an in-flight script must be bounded");

    assert_eq!(result, Err(AuthError::ScriptLoad("Google script loading timeout".into())));
    assert_eq!(started.elapsed(), Duration::from_secs(2));
}
