//! Backend API access
//!
//! - [`client::ApiGateway`]: authenticated JSON calls with one
//!   refresh-and-retry on 401
//! - [`refresh::TokenRefresher`]: shared in-flight token refresh
//! - [`auth::AuthApi`]: account endpoints that persist issued tokens
//! - [`cookie::CookieIdentity`]: identity lookup for server rendering
//! - [`errors`]: status and server-payload message classification

pub mod auth;
pub mod client;
pub mod cookie;
pub mod errors;
pub mod refresh;

pub use auth::AuthApi;
pub use client::ApiGateway;
pub use cookie::CookieIdentity;
pub use refresh::TokenRefresher;
