//! Domain types and models

pub mod login;
pub mod messages;
pub mod request;
pub mod session;
pub mod tokens;
pub mod user;

pub use login::{LoginPhase, PromptMoment};
pub use messages::{AuthSuccess, InboundMessage, PopupErrorDetail, PopupMessage};
pub use request::{HttpMethod, MultipartPart, PartValue, RequestBody, RequestContext};
pub use session::Session;
pub use tokens::{TokenGrant, TokenPair};
pub use user::{UserRecord, UserType};
