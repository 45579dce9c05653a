//! Port interfaces for the login flow
//!
//! Every browser capability the login flow touches (script tags, the
//! identity SDK's global surface, window management, cross-window
//! messaging) sits behind one of these traits so the flow runs without a
//! browsing context. Hosts supply the real implementations.

use async_trait::async_trait;
use bookline_domain::{ApiFailure, AuthError, AuthSuccess, InboundMessage};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

use super::coordinator::SdkEvents;

/// Page-level access to script elements and the SDK's global surface
#[async_trait]
pub trait ScriptInjector: Send + Sync {
    /// Whether the SDK's entry point (`google.accounts.id`) is reachable
    fn sdk_available(&self) -> bool;

    /// Whether a script element whose source contains `marker` is on the page
    fn script_present(&self, marker: &str) -> bool;

    /// Append a script element for `src` and wait for its load event.
    ///
    /// # Errors
    /// Returns the reason reported by the error event
    async fn inject(&self, src: &str) -> Result<(), String>;
}

/// Options passed to the identity SDK when it is initialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SdkInitOptions {
    pub client_id: String,
    pub auto_select: bool,
    pub cancel_on_tap_outside: bool,
    pub use_fedcm_for_prompt: bool,
    pub ux_mode: String,
}

impl SdkInitOptions {
    pub fn for_client(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            auto_select: false,
            cancel_on_tap_outside: true,
            use_fedcm_for_prompt: true,
            ux_mode: "popup".to_string(),
        }
    }
}

/// The identity SDK once its script has loaded
pub trait IdentitySdk: Send + Sync {
    /// Register the client and the credential callback.
    ///
    /// Credentials issued later are delivered through `events`.
    ///
    /// # Errors
    /// Returns error if the SDK rejects the options
    fn initialize(&self, options: &SdkInitOptions, events: SdkEvents) -> Result<(), AuthError>;

    /// Show the silent (one-tap) prompt; moments arrive through `events`
    ///
    /// # Errors
    /// Returns error if the prompt could not be shown at all. The
    /// coordinator treats this like a prompt that was not displayed.
    fn prompt(&self, events: SdkEvents) -> Result<(), AuthError>;
}

/// Position and size of the hosting window, in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowGeometry {
    pub screen_x: i32,
    pub screen_y: i32,
    pub outer_width: u32,
    pub outer_height: u32,
}

/// A window opened by [`WindowOpener::open`]
pub trait PopupWindow: Send + Sync {
    fn move_to(&self, left: i32, top: i32);
    fn focus(&self);
}

/// Opens browser windows
pub trait WindowOpener: Send + Sync {
    /// Open `url` in a new window; `None` when the browser blocked it
    fn open(&self, url: &str, name: &str, features: &str) -> Option<Box<dyn PopupWindow>>;

    /// Geometry of the window doing the opening
    fn geometry(&self) -> WindowGeometry;
}

/// Cross-window message channel
pub trait MessageBus: Send + Sync {
    /// Receive every message posted to this window from now on
    fn subscribe(&self) -> broadcast::Receiver<InboundMessage>;

    /// Post `message` to the window that opened this one
    fn post_to_opener(&self, message: InboundMessage);
}

/// Backend endpoints that turn credentials into a session.
///
/// Implementations persist any tokens the backend issues before returning.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// `POST /accounts/login/`
    async fn login(&self, credentials: &Value) -> Result<AuthSuccess, ApiFailure>;

    /// `POST /accounts/register/`
    async fn register(&self, user_data: &Value) -> Result<AuthSuccess, ApiFailure>;

    /// Exchange an SDK-issued credential (`POST /accounts/google-login/`)
    async fn google_login(&self, credential: &str) -> Result<AuthSuccess, ApiFailure>;

    /// Exchange an authorization code (`POST /accounts/google-callback/`)
    async fn google_callback(&self, code: &str) -> Result<AuthSuccess, ApiFailure>;

    /// Drop local credentials
    async fn logout(&self);
}
