use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bookline_core::login::AuthBackend;
use bookline_core::IdentityApi;
use bookline_domain::{ApiErrorKind, ApiFailure, AuthSuccess, UserRecord};
use serde_json::Value;

use super::success;

/// Backend whose exchange endpoints return a scripted result
pub struct FakeBackend {
    pub exchange: Mutex<Result<AuthSuccess, ApiFailure>>,
    pub google_logins: Mutex<Vec<String>>,
    pub callbacks: Mutex<Vec<String>>,
    pub logouts: AtomicUsize,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            exchange: Mutex::new(Ok(success(7, "access-1"))),
            google_logins: Mutex::new(Vec::new()),
            callbacks: Mutex::new(Vec::new()),
            logouts: AtomicUsize::new(0),
        }
    }
}

impl FakeBackend {
    pub fn respond(&self, result: Result<AuthSuccess, ApiFailure>) {
        *self.exchange.lock().unwrap() = result;
    }

    pub fn google_login_count(&self) -> usize {
        self.google_logins.lock().unwrap().len()
    }

    fn result(&self) -> Result<AuthSuccess, ApiFailure> {
        self.exchange.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthBackend for FakeBackend {
    async fn login(&self, _credentials: &Value) -> Result<AuthSuccess, ApiFailure> {
        self.result()
    }

    async fn register(&self, _user_data: &Value) -> Result<AuthSuccess, ApiFailure> {
        self.result()
    }

    async fn google_login(&self, credential: &str) -> Result<AuthSuccess, ApiFailure> {
        self.google_logins.lock().unwrap().push(credential.to_string());
        self.result()
    }

    async fn google_callback(&self, code: &str) -> Result<AuthSuccess, ApiFailure> {
        self.callbacks.lock().unwrap().push(code.to_string());
        self.result()
    }

    async fn logout(&self) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeIdentity {
    pub result: Result<UserRecord, ApiFailure>,
    pub calls: AtomicUsize,
}

impl FakeIdentity {
    pub fn returning(user: UserRecord) -> Self {
        Self { result: Ok(user), calls: AtomicUsize::new(0) }
    }

    pub fn unauthorized() -> Self {
        Self {
            result: Err(ApiFailure::new(
                ApiErrorKind::Unauthorized,
                "You need to sign in to access this resource.",
                Some(401),
            )),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityApi for FakeIdentity {
    async fn current_user(&self) -> Result<UserRecord, ApiFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
