use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bookline_core::login::{
    IdentitySdk, MessageBus, PopupWindow, ScriptInjector, SdkEvents, SdkInitOptions,
    WindowGeometry, WindowOpener,
};
use bookline_domain::{AuthError, InboundMessage, PromptMoment};
use tokio::sync::broadcast;

/// Page with a scriptable SDK surface.
///
/// A failed injection leaves no element behind, matching a host that
/// removes script tags whose load errored.
#[derive(Default)]
pub struct FakeInjector {
    pub available: Arc<AtomicBool>,
    pub present: AtomicBool,
    pub injections: AtomicUsize,
    pub failures_left: AtomicUsize,
    pub expose_on_load: bool,
}

impl FakeInjector {
    /// SDK already reachable
    pub fn loaded() -> Self {
        let injector = Self::default();
        injector.available.store(true, Ordering::SeqCst);
        injector
    }

    /// SDK appears once its script loads
    pub fn loads_cleanly() -> Self {
        Self { expose_on_load: true, ..Self::default() }
    }

    /// Script loads but never exposes the SDK
    pub fn loads_empty() -> Self {
        Self::default()
    }

    /// A script element is already on the page, added by someone else
    pub fn in_flight() -> Self {
        let injector = Self::default();
        injector.present.store(true, Ordering::SeqCst);
        injector
    }

    pub fn failing(times: usize) -> Self {
        let injector = Self::loads_cleanly();
        injector.failures_left.store(times, Ordering::SeqCst);
        injector
    }

    pub fn injections(&self) -> usize {
        self.injections.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScriptInjector for FakeInjector {
    fn sdk_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn script_present(&self, marker: &str) -> bool {
        assert_eq!(marker, "gsi/client");
        self.present.load(Ordering::SeqCst)
    }

    async fn inject(&self, src: &str) -> Result<(), String> {
        assert!(src.contains("gsi/client"));
        self.injections.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err("net::ERR_CONNECTION_RESET".to_string());
        }

        self.present.store(true, Ordering::SeqCst);
        if self.expose_on_load {
            self.available.store(true, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Identity SDK whose prompt replies are scripted per call
#[derive(Default)]
pub struct FakeSdk {
    pub init_options: Mutex<Vec<SdkInitOptions>>,
    pub init_events: Mutex<Option<SdkEvents>>,
    pub prompts: Mutex<Vec<SdkEvents>>,
    /// Replies for successive prompts; `None` leaves the prompt silent
    pub replies: Mutex<VecDeque<PromptReply>>,
    pub fail_init: AtomicBool,
}

#[derive(Debug, Clone)]
pub enum PromptReply {
    Moment(PromptMoment),
    Credential(Option<String>),
    Silent,
    Fail(String),
}

impl FakeSdk {
    pub fn reply(&self, reply: PromptReply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn init_count(&self) -> usize {
        self.init_options.lock().unwrap().len()
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Events handle bound to the most recent prompt
    pub fn last_prompt(&self) -> SdkEvents {
        self.prompts.lock().unwrap().last().cloned().unwrap()
    }

    /// Deliver a credential through the initialization callback
    pub fn issue_credential(&self, credential: &str) {
        let events = self.init_events.lock().unwrap().clone().unwrap();
        events.credential(Some(credential.to_string()));
    }
}

impl IdentitySdk for FakeSdk {
    fn initialize(&self, options: &SdkInitOptions, events: SdkEvents) -> Result<(), AuthError> {
        if self.fail_init.load(Ordering::SeqCst) {
            return Err(AuthError::Provider("initialize rejected".into()));
        }
        self.init_options.lock().unwrap().push(options.clone());
        *self.init_events.lock().unwrap() = Some(events);
        Ok(())
    }

    fn prompt(&self, events: SdkEvents) -> Result<(), AuthError> {
        self.prompts.lock().unwrap().push(events.clone());
        let reply = self.replies.lock().unwrap().pop_front().unwrap_or(PromptReply::Silent);
        match reply {
            PromptReply::Moment(moment) => events.moment(moment),
            PromptReply::Credential(credential) => events.credential(credential),
            PromptReply::Silent => {}
            PromptReply::Fail(reason) => return Err(AuthError::Provider(reason)),
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct PopupLog {
    pub moves: Mutex<Vec<(i32, i32)>>,
    pub focused: AtomicUsize,
}

struct FakePopup(Arc<PopupLog>);

impl PopupWindow for FakePopup {
    fn move_to(&self, left: i32, top: i32) {
        self.0.moves.lock().unwrap().push((left, top));
    }

    fn focus(&self) {
        self.0.focused.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeOpener {
    pub blocked: AtomicBool,
    pub opened: Mutex<Vec<(String, String, String)>>,
    pub popup: Arc<PopupLog>,
}

impl FakeOpener {
    pub fn block(&self) {
        self.blocked.store(true, Ordering::SeqCst);
    }

    pub fn open_count(&self) -> usize {
        self.opened.lock().unwrap().len()
    }

    pub fn last_url(&self) -> String {
        self.opened.lock().unwrap().last().map(|(url, _, _)| url.clone()).unwrap()
    }
}

impl WindowOpener for FakeOpener {
    fn open(&self, url: &str, name: &str, features: &str) -> Option<Box<dyn PopupWindow>> {
        self.opened.lock().unwrap().push((url.into(), name.into(), features.into()));
        if self.blocked.load(Ordering::SeqCst) {
            return None;
        }
        Some(Box::new(FakePopup(self.popup.clone())))
    }

    fn geometry(&self) -> WindowGeometry {
        WindowGeometry { screen_x: 0, screen_y: 0, outer_width: 1500, outer_height: 1000 }
    }
}

/// Broadcast bus that also records what was posted to the opener
pub struct FakeBus {
    tx: broadcast::Sender<InboundMessage>,
    pub posted: Mutex<Vec<InboundMessage>>,
}

impl Default for FakeBus {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx, posted: Mutex::new(Vec::new()) }
    }
}

impl FakeBus {
    /// Simulate a message arriving at this window
    pub fn deliver(&self, message: InboundMessage) {
        let _ = self.tx.send(message);
    }
}

impl MessageBus for FakeBus {
    fn subscribe(&self) -> broadcast::Receiver<InboundMessage> {
        self.tx.subscribe()
    }

    fn post_to_opener(&self, message: InboundMessage) {
        self.posted.lock().unwrap().push(message);
    }
}
