//! Shared helpers for `bookline-api` integration tests.
//!
//! Browser capabilities are faked; the backend is a `wiremock` server, so
//! the context's real gateway and auth client are exercised end to end.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bookline_common::{MemoryStore, PersistentStore};
use bookline_core::login::{
    IdentitySdk, PopupWindow, ScriptInjector, SdkEvents, SdkInitOptions, WindowGeometry,
    WindowOpener,
};
use bookline_core::{LogoutNotice, LogoutNotifier};
use bookline_domain::{AppConfig, AuthError, LoginPhase, PromptMoment};
use bookline_infra::InProcessBus;
use bookline_lib::{AppContext, BrowserCapabilities};

pub const APP_ORIGIN: &str = "https://book.example";

/// SDK script already on the page
pub struct LoadedPage;

#[async_trait]
impl ScriptInjector for LoadedPage {
    fn sdk_available(&self) -> bool {
        true
    }

    fn script_present(&self, _marker: &str) -> bool {
        true
    }

    async fn inject(&self, _src: &str) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum PromptReply {
    Moment(PromptMoment),
    Credential(String),
}

/// Identity SDK answering each prompt from a script
#[derive(Default)]
pub struct ScriptedSdk {
    replies: Mutex<VecDeque<PromptReply>>,
}

impl ScriptedSdk {
    pub fn reply(&self, reply: PromptReply) {
        self.replies.lock().unwrap().push_back(reply);
    }
}

impl IdentitySdk for ScriptedSdk {
    fn initialize(&self, _options: &SdkInitOptions, _events: SdkEvents) -> Result<(), AuthError> {
        Ok(())
    }

    fn prompt(&self, events: SdkEvents) -> Result<(), AuthError> {
        match self.replies.lock().unwrap().pop_front() {
            Some(PromptReply::Moment(moment)) => events.moment(moment),
            Some(PromptReply::Credential(credential)) => events.credential(Some(credential)),
            None => {}
        }
        Ok(())
    }
}

struct InertPopup;

impl PopupWindow for InertPopup {
    fn move_to(&self, _left: i32, _top: i32) {}

    fn focus(&self) {}
}

/// Opener that always succeeds and remembers the URLs it opened
#[derive(Default)]
pub struct RecordingOpener {
    urls: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn last_url(&self) -> Option<String> {
        self.urls.lock().unwrap().last().cloned()
    }
}

impl WindowOpener for RecordingOpener {
    fn open(&self, url: &str, _name: &str, _features: &str) -> Option<Box<dyn PopupWindow>> {
        self.urls.lock().unwrap().push(url.to_string());
        Some(Box::new(InertPopup))
    }

    fn geometry(&self) -> WindowGeometry {
        WindowGeometry { screen_x: 0, screen_y: 0, outer_width: 1280, outer_height: 800 }
    }
}

/// Host side of a forced logout
#[derive(Default)]
pub struct RecordingHost {
    notices: Mutex<Vec<LogoutNotice>>,
    count: AtomicUsize,
}

impl RecordingHost {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Option<LogoutNotice> {
        self.notices.lock().unwrap().last().cloned()
    }
}

impl LogoutNotifier for RecordingHost {
    fn session_expired(&self, notice: &LogoutNotice) {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.notices.lock().unwrap().push(notice.clone());
    }
}

pub fn config(api_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.app_origin = APP_ORIGIN.to_string();
    config.api.base_url = api_url.to_string();
    config.oauth.client_id = Some("client-123".to_string());
    config.login.silent_timeout = Duration::from_millis(200);
    config.login.popup_timeout = Duration::from_secs(5);
    config
}

/// An application context wired to fakes and a mock backend
pub struct TestApp {
    pub ctx: Arc<AppContext>,
    pub sdk: Arc<ScriptedSdk>,
    pub opener: Arc<RecordingOpener>,
    pub bus: Arc<InProcessBus>,
    pub host: Arc<RecordingHost>,
}

impl TestApp {
    pub fn new(api_url: &str) -> Self {
        Self::with_store(api_url, Arc::new(MemoryStore::new()))
    }

    pub fn with_store(api_url: &str, store: Arc<dyn PersistentStore>) -> Self {
        let sdk = Arc::new(ScriptedSdk::default());
        let opener = Arc::new(RecordingOpener::default());
        let bus = Arc::new(InProcessBus::new());
        let host = Arc::new(RecordingHost::default());

        let ctx = AppContext::new(
            config(api_url),
            store,
            BrowserCapabilities {
                injector: Arc::new(LoadedPage),
                sdk: sdk.clone(),
                opener: opener.clone(),
                bus: bus.clone(),
                notifier: host.clone(),
            },
        )
        .expect("context should build");

        Self { ctx: Arc::new(ctx), sdk, opener, bus, host }
    }

    /// Poll in real time until the coordinator reaches `phase`
    pub async fn wait_for_phase(&self, phase: LoginPhase) {
        for _ in 0..200 {
            if self.ctx.coordinator.phase() == phase {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("coordinator never reached {phase}, stuck in {}", self.ctx.coordinator.phase());
    }
}
