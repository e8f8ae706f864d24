pub mod responder;
pub mod templates;

pub use responder::{ChatReply, ChatResponder};
