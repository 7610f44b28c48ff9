mod action;
mod api;
mod errors;
mod event;
mod interaction;
mod message;
mod progress;
mod role;
mod run_request;
mod stream;
mod stream_event;

pub use action::*;
pub use api::*;
pub use errors::*;
pub use event::*;
pub use interaction::*;
pub use message::*;
pub use progress::*;
pub use role::*;
pub use run_request::*;
pub use stream::*;
pub use stream_event::*;
