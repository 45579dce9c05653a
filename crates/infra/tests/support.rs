//! Shared helpers for `bookline-infra` integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use bookline_common::MemoryStore;
use bookline_core::{LogoutNotice, LogoutNotifier, TokenStore};
use bookline_domain::{ApiConfig, TokenGrant};
use bookline_infra::ApiGateway;

/// Records every forced-logout notice
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<LogoutNotice>>,
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.notices.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<LogoutNotice> {
        self.notices.lock().unwrap().last().cloned()
    }
}

impl LogoutNotifier for RecordingNotifier {
    fn session_expired(&self, notice: &LogoutNotice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

/// A gateway pointed at a mock server, with handles to its collaborators
pub struct GatewayHarness {
    pub gateway: ApiGateway,
    pub tokens: TokenStore,
    pub store: MemoryStore,
    pub notifier: Arc<RecordingNotifier>,
}

impl GatewayHarness {
    pub fn new(base_url: &str) -> Self {
        let store = MemoryStore::new();
        let tokens = TokenStore::new(Arc::new(store.clone()));
        let notifier = Arc::new(RecordingNotifier::default());
        let config = ApiConfig { base_url: base_url.to_string(), ..ApiConfig::default() };
        let gateway = ApiGateway::new(&config, tokens.clone(), notifier.clone())
            .expect("gateway should build");

        Self { gateway, tokens, store, notifier }
    }

    pub fn signed_in(base_url: &str, access: &str, refresh: &str) -> Self {
        let harness = Self::new(base_url);
        harness
            .tokens
            .store(&TokenGrant { access: access.into(), refresh: Some(refresh.into()) })
            .unwrap();
        harness
    }
}
