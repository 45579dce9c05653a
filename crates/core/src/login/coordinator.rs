//! Login flow coordinator
//!
//! Drives one login attempt at a time through the state machine in
//! [`super::machine`]. The pending request, the armed timer and the phase
//! live together in one record behind a mutex, so "at most one pending
//! request" and "no dangling timer" hold by construction: registering a
//! new request settles the old one, and every timer handle is aborted
//! before it is replaced or dropped.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::time::Instant;

use bookline_domain::constants::POPUP_WINDOW_NAME;
use bookline_domain::{
    ApiErrorKind, ApiFailure, AppConfig, AuthError, AuthSuccess, LoginPhase, PromptMoment,
};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::machine::{transition, Effect, LoginEvent, TimerKind};
use super::ports::{AuthBackend, IdentitySdk, SdkInitOptions, WindowGeometry, WindowOpener};
use super::script_loader::ScriptLoader;
use super::state_guard::StateGuard;
use crate::session::{SessionStore, TokenStore};

const INVALID_AUTH_RESPONSE: &str = "Invalid response from authentication server";

type LoginOutcome = Result<AuthSuccess, AuthError>;

/// The one outstanding login attempt
struct PendingLoginRequest {
    attempt: u64,
    reply: oneshot::Sender<LoginOutcome>,
}

#[derive(Default)]
struct FlowState {
    phase: LoginPhase,
    last_attempt: u64,
    pending: Option<PendingLoginRequest>,
    timer: Option<JoinHandle<()>>,
}

impl FlowState {
    fn active(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.attempt)
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }
}

/// Effects that run after the state lock is released
enum Deferred {
    ShowPrompt { attempt: u64 },
    OpenPopup { attempt: u64 },
    Exchange { attempt: u64, credential: String },
    ClearNonce,
    Settle { request: PendingLoginRequest, outcome: LoginOutcome },
}

/// Everything the coordinator needs from the outside world
pub struct CoordinatorDeps {
    pub loader: ScriptLoader,
    pub guard: StateGuard,
    pub sdk: Arc<dyn IdentitySdk>,
    pub opener: Arc<dyn WindowOpener>,
    pub backend: Arc<dyn AuthBackend>,
    pub tokens: TokenStore,
    pub session: SessionStore,
}

struct Inner {
    config: AppConfig,
    deps: CoordinatorDeps,
    initialized: tokio::sync::Mutex<bool>,
    state: Mutex<FlowState>,
}

/// Orchestrates silent and popup login for one application window
#[derive(Clone)]
pub struct LoginCoordinator {
    inner: Arc<Inner>,
}

/// Callback handle given to the identity SDK.
///
/// Handles passed to [`IdentitySdk::prompt`] are bound to one attempt; the
/// handle passed to [`IdentitySdk::initialize`] follows whichever attempt
/// is pending when a credential arrives.
#[derive(Clone)]
pub struct SdkEvents {
    inner: Weak<Inner>,
    attempt: Option<u64>,
}

impl SdkEvents {
    /// Report a silent-prompt moment
    pub fn moment(&self, moment: PromptMoment) {
        self.deliver(|attempt| LoginEvent::Prompt { attempt, moment });
    }

    /// Deliver the credential issued by the provider
    pub fn credential(&self, credential: Option<String>) {
        self.deliver(|attempt| LoginEvent::Credential { attempt, credential });
    }

    fn deliver(&self, event: impl FnOnce(u64) -> LoginEvent) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        match self.attempt {
            Some(attempt) => inner.dispatch(event(attempt)),
            None => inner.dispatch_current(event),
        }
    }
}

impl LoginCoordinator {
    pub fn new(config: AppConfig, deps: CoordinatorDeps) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                deps,
                initialized: tokio::sync::Mutex::new(false),
                state: Mutex::new(FlowState::default()),
            }),
        }
    }

    /// Load and initialize the identity SDK once.
    ///
    /// Concurrent callers wait on the same initialization; a failed
    /// initialization is not remembered, so the next call tries again.
    ///
    /// # Errors
    /// `AuthError::Config` without a client id, `AuthError::ScriptLoad` when
    /// the SDK cannot be loaded
    pub async fn initialize(&self) -> Result<(), AuthError> {
        self.inner.ensure_initialized().await
    }

    /// Run one login attempt to completion.
    ///
    /// Any attempt still pending is failed with `AuthError::Cancelled`.
    ///
    /// # Errors
    /// The typed reason the attempt failed
    pub async fn login(&self) -> Result<AuthSuccess, AuthError> {
        let started = Instant::now();
        let (reply, outcome) = oneshot::channel();
        let attempt = self.inner.begin(reply);

        let init = self.inner.ensure_initialized().await;
        self.inner.dispatch(match init {
            Ok(()) => LoginEvent::Initialized { attempt },
            Err(error) => LoginEvent::InitFailed { attempt, error },
        });

        let result = outcome.await.unwrap_or(Err(AuthError::Cancelled));
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &result {
            Ok(success) => info!(attempt, elapsed_ms, user_id = success.user.id, "login resolved"),
            Err(error) => warn!(attempt, elapsed_ms, reason = error.label(), "login failed"),
        }
        result
    }

    /// Route a popup result into the pending attempt.
    ///
    /// Ignored when nothing is pending (stale popup, duplicate message).
    pub fn complete_popup(&self, outcome: LoginOutcome) {
        self.inner.dispatch_current(move |attempt| match outcome {
            Ok(payload) => LoginEvent::Succeeded { attempt, payload: Box::new(payload) },
            Err(error) => LoginEvent::Rejected { attempt, error },
        });
    }

    /// Cancel everything: abort timers, fail any pending attempt with
    /// `AuthError::Cancelled`, and drop the OAuth nonce. Safe in any phase.
    pub fn cleanup(&self) {
        self.inner.dispatch(LoginEvent::Cancel);
    }

    #[must_use]
    pub fn phase(&self) -> LoginPhase {
        self.inner.state.lock().phase
    }

    /// Whether a login attempt is waiting to be settled
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.inner.state.lock().pending.is_some()
    }

    /// Whether a fallback or deadline timer is armed
    #[must_use]
    pub fn timer_armed(&self) -> bool {
        self.inner.state.lock().timer.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Inner {
    async fn ensure_initialized(self: &Arc<Self>) -> Result<(), AuthError> {
        let mut initialized = self.initialized.lock().await;
        if *initialized {
            return Ok(());
        }

        let client_id = self
            .config
            .oauth
            .client_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AuthError::Config("Google Client ID is not configured".to_string()))?;

        self.deps.loader.load().await?;

        let events = SdkEvents { inner: Arc::downgrade(self), attempt: None };
        self.deps.sdk.initialize(&SdkInitOptions::for_client(client_id), events)?;

        *initialized = true;
        info!("identity SDK initialized");
        Ok(())
    }

    fn begin(self: &Arc<Self>, reply: oneshot::Sender<LoginOutcome>) -> u64 {
        let (attempt, deferred) = {
            let mut state = self.state.lock();
            state.last_attempt += 1;
            let attempt = state.last_attempt;
            let deferred = self.apply(&mut state, LoginEvent::Begin { attempt });
            state.pending = Some(PendingLoginRequest { attempt, reply });
            (attempt, deferred)
        };
        debug!(attempt, "login attempt started");
        self.run_all(deferred);
        attempt
    }

    fn dispatch(self: &Arc<Self>, event: LoginEvent) {
        let deferred = {
            let mut state = self.state.lock();
            self.apply(&mut state, event)
        };
        self.run_all(deferred);
    }

    /// Dispatch an event addressed to whichever attempt is pending
    fn dispatch_current(self: &Arc<Self>, event: impl FnOnce(u64) -> LoginEvent) {
        let deferred = {
            let mut state = self.state.lock();
            let Some(attempt) = state.active() else {
                debug!("no login pending, event ignored");
                return;
            };
            self.apply(&mut state, event(attempt))
        };
        self.run_all(deferred);
    }

    fn run_all(self: &Arc<Self>, deferred: Vec<Deferred>) {
        let mut queue = VecDeque::from(deferred);
        while let Some(action) = queue.pop_front() {
            if let Some(event) = self.run(action) {
                let mut state = self.state.lock();
                queue.extend(self.apply(&mut state, event));
            }
        }
    }

    /// Apply one transition under the state lock
    fn apply(self: &Arc<Self>, state: &mut FlowState, event: LoginEvent) -> Vec<Deferred> {
        let active = state.active();
        let step = transition(state.phase, active, event);
        if step.phase != state.phase {
            debug!(from = %state.phase, to = %step.phase, "login phase changed");
        }
        state.phase = step.phase;

        let mut deferred = Vec::new();
        for effect in step.effects {
            match effect {
                Effect::CancelTimer => state.cancel_timer(),
                Effect::ArmTimer(kind) => {
                    if let Some(attempt) = active {
                        let handle = self.arm_timer(kind, attempt);
                        if let Some(previous) = state.timer.replace(handle) {
                            previous.abort();
                        }
                    }
                }
                Effect::ShowPrompt => {
                    if let Some(attempt) = active {
                        deferred.push(Deferred::ShowPrompt { attempt });
                    }
                }
                Effect::OpenPopup => {
                    if let Some(attempt) = active {
                        deferred.push(Deferred::OpenPopup { attempt });
                    }
                }
                Effect::ExchangeCredential(credential) => {
                    if let Some(attempt) = active {
                        deferred.push(Deferred::Exchange { attempt, credential });
                    }
                }
                Effect::ClearNonce => deferred.push(Deferred::ClearNonce),
                Effect::Resolve(payload) => {
                    if let Some(request) = state.pending.take() {
                        deferred.push(Deferred::Settle { request, outcome: Ok(*payload) });
                    }
                }
                Effect::Reject(error) => {
                    if let Some(request) = state.pending.take() {
                        deferred.push(Deferred::Settle { request, outcome: Err(error) });
                    }
                }
            }
        }
        deferred
    }

    fn arm_timer(self: &Arc<Self>, kind: TimerKind, attempt: u64) -> JoinHandle<()> {
        let (delay, event) = match kind {
            TimerKind::SilentFallback => {
                (self.config.login.silent_timeout, LoginEvent::SilentTimedOut { attempt })
            }
            TimerKind::PopupDeadline => {
                (self.config.login.popup_timeout, LoginEvent::PopupTimedOut { attempt })
            }
        };
        let inner = Arc::downgrade(self);

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = inner.upgrade() {
                debug!(attempt, timer = ?kind, "login timer fired");
                inner.dispatch(event);
            }
        })
    }

    fn run(self: &Arc<Self>, action: Deferred) -> Option<LoginEvent> {
        match action {
            Deferred::ShowPrompt { attempt } => {
                let events = SdkEvents { inner: Arc::downgrade(self), attempt: Some(attempt) };
                match self.deps.sdk.prompt(events) {
                    Ok(()) => None,
                    Err(error) => {
                        warn!(attempt, error = %error, "silent prompt failed; falling back to popup");
                        Some(LoginEvent::Prompt { attempt, moment: PromptMoment::NotDisplayed })
                    }
                }
            }
            Deferred::OpenPopup { attempt } => Some(match self.open_popup() {
                Ok(true) => LoginEvent::PopupOpened { attempt },
                Ok(false) => LoginEvent::PopupBlocked { attempt },
                Err(error) => LoginEvent::Rejected { attempt, error },
            }),
            Deferred::Exchange { attempt, credential } => {
                let inner = Arc::clone(self);
                tokio::spawn(async move {
                    let event = match inner.deps.backend.google_login(&credential).await {
                        Ok(payload) => LoginEvent::Succeeded { attempt, payload: Box::new(payload) },
                        Err(failure) => LoginEvent::Rejected { attempt, error: exchange_error(failure) },
                    };
                    inner.dispatch(event);
                });
                None
            }
            Deferred::ClearNonce => {
                self.deps.guard.clear();
                None
            }
            Deferred::Settle { request, outcome } => {
                if let Ok(success) = &outcome {
                    self.record_success(success);
                }
                if request.reply.send(outcome).is_err() {
                    debug!(attempt = request.attempt, "login caller went away before settlement");
                }
                None
            }
        }
    }

    fn open_popup(&self) -> Result<bool, AuthError> {
        let url = self.deps.guard.authorization_url(&self.config)?;
        let (width, height) = (self.config.login.popup_width, self.config.login.popup_height);
        let features = popup_features(width, height);

        let Some(popup) = self.deps.opener.open(&url, POPUP_WINDOW_NAME, &features) else {
            warn!("authorization popup was blocked");
            return Ok(false);
        };

        let (left, top) = centred(self.deps.opener.geometry(), width, height);
        popup.move_to(left, top);
        popup.focus();
        debug!(left, top, "authorization popup opened");
        Ok(true)
    }

    fn record_success(&self, success: &AuthSuccess) {
        if let Some(grant) = success.grant() {
            if let Err(e) = self.deps.tokens.store(&grant) {
                warn!(error = %e, "failed to persist tokens from login");
            }
        }
        self.deps.session.set_user(Some(success.user.clone()));
    }
}

fn exchange_error(failure: ApiFailure) -> AuthError {
    if failure.kind == ApiErrorKind::Decode {
        AuthError::InvalidCredentialResponse(INVALID_AUTH_RESPONSE.to_string())
    } else {
        AuthError::from(failure)
    }
}

/// `window.open` feature string for the authorization popup
#[must_use]
pub fn popup_features(width: u32, height: u32) -> String {
    format!(
        "width={width},height={height},scrollbars=yes,resizable=yes,toolbar=no,menubar=no,\
         location=no,directories=no,status=no,copyhistory=no"
    )
}

/// Top-left corner that centres a `width`×`height` window over `parent`
#[must_use]
pub fn centred(parent: WindowGeometry, width: u32, height: u32) -> (i32, i32) {
    fn axis(origin: i32, outer: u32, size: u32) -> i32 {
        let offset = (i64::from(outer) - i64::from(size)) / 2;
        i32::try_from(i64::from(origin) + offset).unwrap_or(origin)
    }
    (
        axis(parent.screen_x, parent.outer_width, width),
        axis(parent.screen_y, parent.outer_height, height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popup_features() {
        let features = popup_features(500, 600);
        assert!(features.starts_with("width=500,height=600,scrollbars=yes"));
        assert!(features.ends_with("copyhistory=no"));
    }

    #[test]
    fn test_centred_over_parent() {
        let parent = WindowGeometry { screen_x: 100, screen_y: 50, outer_width: 1500, outer_height: 900 };
        assert_eq!(centred(parent, 500, 600), (600, 200));

        let small = WindowGeometry { screen_x: 0, screen_y: 0, outer_width: 300, outer_height: 400 };
        assert_eq!(centred(small, 500, 600), (-100, -100));
    }

    #[test]
    fn test_decode_failure_is_invalid_credential_response() {
        let decode = ApiFailure::new(ApiErrorKind::Decode, "missing field `user`", Some(200));
        assert_eq!(
            exchange_error(decode),
            AuthError::InvalidCredentialResponse(INVALID_AUTH_RESPONSE.to_string())
        );

        let rejected = ApiFailure::new(ApiErrorKind::BadRequest, "Invalid Google token", Some(400));
        assert_eq!(exchange_error(rejected), AuthError::Provider("Invalid Google token".into()));
    }
}
