//! Session state, tokens and bootstrap

pub mod bootstrap;
pub mod ports;
pub mod service;
pub mod store;
pub mod token_store;

pub use bootstrap::{ClientBootstrapper, ServerBootstrapper, SessionBootstrapper};
pub use ports::{IdentityApi, LogoutNotice, LogoutNotifier};
pub use service::SessionService;
pub use store::SessionStore;
pub use token_store::TokenStore;

impl LogoutNotifier for SessionStore {
    fn session_expired(&self, _notice: &LogoutNotice) {
        self.clear();
    }
}
