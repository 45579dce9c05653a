//! Shared test helpers for `bookline-core` integration tests.
//!
//! In-memory stand-ins for every browser and backend port, so the login
//! flow can be driven deterministically under paused tokio time.

#![allow(dead_code)]

pub mod browser;
pub mod backend;

use std::sync::Arc;

use bookline_common::MemoryStore;
use bookline_core::login::{CoordinatorDeps, LoginCoordinator, ScriptLoader, StateGuard};
use bookline_core::{MessageBridge, SessionStore, TokenStore};
use bookline_domain::{AppConfig, AuthSuccess, LoginPhase, UserRecord};

pub use backend::{FakeBackend, FakeIdentity};
pub use browser::{FakeBus, FakeInjector, FakeOpener, FakeSdk};

pub const APP_ORIGIN: &str = "https://book.example";

pub fn user(id: i64, first_name: &str) -> UserRecord {
    serde_json::from_value(serde_json::json!({"id": id, "first_name": first_name})).unwrap()
}

pub fn success(id: i64, access: &str) -> AuthSuccess {
    serde_json::from_value(serde_json::json!({
        "user": {"id": id, "first_name": "Ana"},
        "access": access,
        "refresh": "refresh-1",
    }))
    .unwrap()
}

pub fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.app_origin = APP_ORIGIN.to_string();
    config.oauth.client_id = Some("client-123".to_string());
    config
}

/// A coordinator wired to fakes, with handles to every fake
pub struct Harness {
    pub coordinator: LoginCoordinator,
    pub bridge: MessageBridge,
    pub injector: Arc<FakeInjector>,
    pub sdk: Arc<FakeSdk>,
    pub opener: Arc<FakeOpener>,
    pub backend: Arc<FakeBackend>,
    pub store: MemoryStore,
    pub tokens: TokenStore,
    pub session: SessionStore,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(config(), FakeInjector::loaded())
    }

    pub fn with_config(config: AppConfig, injector: FakeInjector) -> Self {
        let store = MemoryStore::new();
        let injector = Arc::new(injector);
        let sdk = Arc::new(FakeSdk::default());
        let opener = Arc::new(FakeOpener::default());
        let backend = Arc::new(FakeBackend::default());
        let tokens = TokenStore::new(Arc::new(store.clone()));
        let session = SessionStore::new();

        let coordinator = LoginCoordinator::new(
            config.clone(),
            CoordinatorDeps {
                loader: ScriptLoader::new(injector.clone(), config.loader.clone()),
                guard: StateGuard::new(Arc::new(store.clone())),
                sdk: sdk.clone(),
                opener: opener.clone(),
                backend: backend.clone(),
                tokens: tokens.clone(),
                session: session.clone(),
            },
        );
        let bridge = MessageBridge::new(APP_ORIGIN, coordinator.clone());

        Self { coordinator, bridge, injector, sdk, opener, backend, store, tokens, session }
    }

    /// Yield until the coordinator reaches `phase`
    pub async fn wait_for_phase(&self, phase: LoginPhase) {
        for _ in 0..1_000 {
            if self.coordinator.phase() == phase {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("coordinator never reached {phase}, stuck in {}", self.coordinator.phase());
    }
}
