use bookline_core::MessageBus;
use bookline_domain::InboundMessage;
use tokio::sync::broadcast;
use tracing::debug;

const DEFAULT_CAPACITY: usize = 16;

/// In-process window messaging.
///
/// Each bus is one window's inbox. A bus created with [`InProcessBus::child`]
/// stands for a window opened by this one: whatever the child posts to its
/// opener lands in this bus's inbox.
#[derive(Debug, Clone)]
pub struct InProcessBus {
    inbox: broadcast::Sender<InboundMessage>,
    opener: Option<broadcast::Sender<InboundMessage>>,
}

impl Default for InProcessBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl InProcessBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (inbox, _) = broadcast::channel(capacity.max(1));
        Self { inbox, opener: None }
    }

    /// Bus for a window opened by this one
    #[must_use]
    pub fn child(&self) -> Self {
        let (inbox, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self { inbox, opener: Some(self.inbox.clone()) }
    }

    /// Deliver a message to this window's listeners; returns how many saw it
    pub fn deliver(&self, message: InboundMessage) -> usize {
        self.inbox.send(message).unwrap_or(0)
    }
}

impl MessageBus for InProcessBus {
    fn subscribe(&self) -> broadcast::Receiver<InboundMessage> {
        self.inbox.subscribe()
    }

    fn post_to_opener(&self, message: InboundMessage) {
        match &self.opener {
            Some(opener) => {
                if opener.send(message).is_err() {
                    debug!("opener has no listeners, message dropped");
                }
            }
            None => debug!("window has no opener, message dropped"),
        }
    }
}
