//! Application context - dependency injection container

mod forced_logout;

use std::sync::Arc;
use std::time::Instant;

use bookline_common::PersistentStore;
use bookline_core::login::{CoordinatorDeps, MessageBridge};
use bookline_core::{
    CallbackHandler, ClientBootstrapper, IdentityApi, IdentitySdk, LoginCoordinator,
    LogoutNotifier, MessageBus, ScriptInjector, ScriptLoader, ServerBootstrapper,
    SessionBootstrapper, SessionService, SessionStore, StateGuard, TokenStore, WindowOpener,
};
use bookline_domain::{AppConfig, AuthError, AuthSuccess, Result, Session};
use bookline_infra::{ApiGateway, AuthApi, CookieIdentity, HttpClient};
pub use forced_logout::ForcedLogout;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

use crate::utils::logging::log_login_outcome;

/// Capabilities only the hosting browser (or a test) can provide
pub struct BrowserCapabilities {
    pub injector: Arc<dyn ScriptInjector>,
    pub sdk: Arc<dyn IdentitySdk>,
    pub opener: Arc<dyn WindowOpener>,
    pub bus: Arc<dyn MessageBus>,
    /// Told when a failed refresh ends the session
    pub notifier: Arc<dyn LogoutNotifier>,
}

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: AppConfig,
    pub tokens: TokenStore,
    pub session: SessionStore,
    pub gateway: ApiGateway,
    pub auth: Arc<AuthApi>,
    pub accounts: SessionService,
    pub state_guard: StateGuard,
    pub coordinator: LoginCoordinator,

    bus: Arc<dyn MessageBus>,
    bridge_task: Mutex<Option<JoinHandle<()>>>,
}

impl AppContext {
    /// Wire every service for one application window.
    ///
    /// `store` is the client-persisted storage holding tokens and the OAuth
    /// nonce.
    ///
    /// # Errors
    /// Returns `BooklineError::Config` if the HTTP client cannot be built
    pub fn new(
        config: AppConfig,
        store: Arc<dyn PersistentStore>,
        browser: BrowserCapabilities,
    ) -> Result<Self> {
        let tokens = TokenStore::new(Arc::clone(&store));
        let session = SessionStore::new();
        let notifier: Arc<dyn LogoutNotifier> =
            Arc::new(ForcedLogout::new(session.clone(), browser.notifier));

        let gateway = ApiGateway::new(&config.api, tokens.clone(), notifier)?;
        let auth = Arc::new(AuthApi::new(gateway.clone()));
        let state_guard = StateGuard::new(store);

        let coordinator = LoginCoordinator::new(
            config.clone(),
            CoordinatorDeps {
                loader: ScriptLoader::new(browser.injector, config.loader.clone()),
                guard: state_guard.clone(),
                sdk: browser.sdk,
                opener: browser.opener,
                backend: auth.clone(),
                tokens: tokens.clone(),
                session: session.clone(),
            },
        );
        let accounts = SessionService::new(auth.clone(), tokens.clone(), session.clone());

        info!(api = %gateway.base_url(), origin = %config.app_origin, "application context created");

        Ok(Self {
            config,
            tokens,
            session,
            gateway,
            auth,
            accounts,
            state_guard,
            coordinator,
            bus: browser.bus,
            bridge_task: Mutex::new(None),
        })
    }

    /// Start routing popup messages into the login coordinator.
    ///
    /// Must run inside a tokio runtime. Calling it again is a no-op.
    pub fn start(&self) {
        let mut task = self.bridge_task.lock();
        if task.is_none() {
            let bridge = MessageBridge::new(self.config.app_origin.clone(), self.coordinator.clone());
            *task = Some(bridge.listen(self.bus.as_ref()));
            info!("message bridge listening");
        }
    }

    /// Run one login attempt (silent first, popup fallback)
    ///
    /// # Errors
    /// The typed reason the attempt failed
    pub async fn login(&self) -> std::result::Result<AuthSuccess, AuthError> {
        let started = Instant::now();
        let outcome = self.coordinator.login().await;
        log_login_outcome(&outcome, started.elapsed());
        outcome
    }

    /// Restore the session from stored tokens
    pub async fn bootstrap(&self) -> Session {
        ClientBootstrapper::new(self.tokens.clone(), self.auth.clone(), self.session.clone())
            .bootstrap()
            .await
    }

    /// Handler for the OAuth redirect page, posting to `popup_bus`'s opener
    pub fn callback_handler(&self, popup_bus: Arc<dyn MessageBus>) -> CallbackHandler {
        CallbackHandler::new(
            self.state_guard.clone(),
            self.auth.clone(),
            popup_bus,
            self.config.app_origin.clone(),
        )
    }

    /// Stop the bridge and cancel any login in progress
    pub fn shutdown(&self) {
        self.coordinator.cleanup();
        if let Some(task) = self.bridge_task.lock().take() {
            task.abort();
        }
        info!("application context shut down");
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        if let Some(task) = self.bridge_task.get_mut().take() {
            task.abort();
        }
    }
}

/// Bootstrapper for a server-rendered request carrying `cookie`.
///
/// Touches no persisted storage; a missing cookie header yields an
/// anonymous session without a network call.
///
/// # Errors
/// Returns `BooklineError::Config` if the HTTP client cannot be built
pub fn server_bootstrapper(config: &AppConfig, cookie: Option<&str>) -> Result<ServerBootstrapper> {
    let http = HttpClient::builder().timeout(config.api.timeout()).build()?;
    let identity = CookieIdentity::from_cookie_header(http, &config.api.base_url, cookie)
        .map(|identity| Arc::new(identity) as Arc<dyn IdentityApi>);
    Ok(ServerBootstrapper::new(identity))
}

/// Convenience: bootstrap a server-rendered request in one call
///
/// # Errors
/// Returns `BooklineError::Config` if the HTTP client cannot be built
pub async fn bootstrap_server_session(config: &AppConfig, cookie: Option<&str>) -> Result<Session> {
    Ok(server_bootstrapper(config, cookie)?.bootstrap().await)
}
