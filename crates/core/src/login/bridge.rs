//! Cross-window message bridge
//!
//! Routes popup results into the login coordinator. Messages from any
//! origin other than the application's own are dropped without touching
//! the session; only the origin is logged, never the payload.

use bookline_domain::constants::{MESSAGE_AUTH_ERROR, MESSAGE_AUTH_SUCCESS};
use bookline_domain::{AuthError, InboundMessage, PopupMessage};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::coordinator::LoginCoordinator;
use super::ports::MessageBus;

const DEFAULT_POPUP_ERROR: &str = "Google authentication failed";
const UNREADABLE_POPUP_RESULT: &str = "Failed to process authentication result";

/// What the bridge did with one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// Sent from another origin; dropped
    ForeignOrigin,
    /// Not a login result; ignored
    Unrecognized,
    /// Handed to the coordinator
    Routed,
}

/// Routes same-origin popup results to a [`LoginCoordinator`]
#[derive(Clone)]
pub struct MessageBridge {
    app_origin: String,
    coordinator: LoginCoordinator,
}

impl MessageBridge {
    pub fn new(app_origin: impl Into<String>, coordinator: LoginCoordinator) -> Self {
        Self { app_origin: app_origin.into(), coordinator }
    }

    /// Validate and route one inbound message
    pub fn handle(&self, message: &InboundMessage) -> BridgeOutcome {
        if message.origin != self.app_origin {
            debug!(origin = %message.origin, "dropping message from foreign origin");
            return BridgeOutcome::ForeignOrigin;
        }

        match PopupMessage::from_value(&message.data) {
            Some(PopupMessage::Success { data }) => {
                self.coordinator.complete_popup(Ok(data));
                BridgeOutcome::Routed
            }
            Some(PopupMessage::Error { error }) => {
                let text = error.message();
                let text = if text.is_empty() { DEFAULT_POPUP_ERROR } else { text };
                self.coordinator.complete_popup(Err(AuthError::Provider(text.to_string())));
                BridgeOutcome::Routed
            }
            None => self.handle_malformed(message),
        }
    }

    /// A login result whose body did not decode still ends the attempt
    fn handle_malformed(&self, message: &InboundMessage) -> BridgeOutcome {
        let error = match message.data.get("type").and_then(|kind| kind.as_str()) {
            Some(MESSAGE_AUTH_SUCCESS) => {
                warn!("popup success message carried an unreadable result");
                AuthError::InvalidCredentialResponse(UNREADABLE_POPUP_RESULT.to_string())
            }
            Some(MESSAGE_AUTH_ERROR) => AuthError::Provider(DEFAULT_POPUP_ERROR.to_string()),
            _ => return BridgeOutcome::Unrecognized,
        };

        self.coordinator.complete_popup(Err(error));
        BridgeOutcome::Routed
    }

    /// Route every message posted to `bus` until the bus closes
    pub fn listen(self, bus: &dyn MessageBus) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(message) => {
                        self.handle(&message);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "message bridge fell behind");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
