//! Observable session state

use bookline_domain::{Session, UserRecord};
use tokio::sync::watch;

/// Holder of the current [`Session`].
///
/// Clones share the same state. UI layers subscribe to receive every
/// change; writers are the login coordinator, the gateway's forced logout
/// and the bootstrapper.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: watch::Sender<Session>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// New store in the loading state
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Session::loading());
        Self { tx }
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    pub fn set(&self, session: Session) {
        self.tx.send_replace(session);
    }

    /// Settle on `user` (`None` signs out)
    pub fn set_user(&self, user: Option<UserRecord>) {
        self.set(Session::from_user(user));
    }

    /// Settle on the signed-out state
    pub fn clear(&self) {
        self.set(Session::anonymous());
    }
}
