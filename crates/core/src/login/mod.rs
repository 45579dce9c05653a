//! Login flow: SDK loading, CSRF state, the coordinator and the popup
//! message path

pub mod bridge;
pub mod callback;
pub mod coordinator;
pub mod machine;
pub mod ports;
pub mod script_loader;
pub mod state_guard;

pub use bridge::{BridgeOutcome, MessageBridge};
pub use callback::{CallbackHandler, CallbackParams};
pub use coordinator::{CoordinatorDeps, LoginCoordinator, SdkEvents};
pub use machine::{transition, Effect, LoginEvent, TimerKind, Transition};
pub use ports::{
    AuthBackend, IdentitySdk, MessageBus, PopupWindow, ScriptInjector, SdkInitOptions,
    WindowGeometry, WindowOpener,
};
pub use script_loader::ScriptLoader;
pub use state_guard::StateGuard;
