pub mod context;
pub mod hash;
pub mod token;
pub mod verify_session;

pub use context::RequestContext;
pub use verify_session::verify_session;
