//! # Bookline Core
//!
//! Authentication logic with no infrastructure dependencies.
//!
//! This crate contains:
//! - The login flow coordinator and its state machine
//! - Identity SDK loading, OAuth state checks and the popup message path
//! - Token and session state, and the session bootstrap
//! - Port interfaces (traits) for every browser and backend capability
//!
//! ## Architecture Principles
//! - Depends only on `bookline-common` and `bookline-domain`
//! - No HTTP, storage or window-system code
//! - All external capabilities via traits

pub mod login;
pub mod session;

pub use login::{
    AuthBackend, CallbackHandler, CallbackParams, IdentitySdk, LoginCoordinator, MessageBridge,
    MessageBus, ScriptInjector, ScriptLoader, SdkEvents, StateGuard, WindowOpener,
};
pub use session::{
    ClientBootstrapper, IdentityApi, LogoutNotice, LogoutNotifier, ServerBootstrapper,
    SessionBootstrapper, SessionService, SessionStore, TokenStore,
};
