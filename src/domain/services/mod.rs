pub mod actions;
mod chat_state;
mod credentials;
mod interaction_dispatcher;
mod message_reducer;
mod progress_store;
mod relogin;
mod stream_guard;
mod transcript;
mod user_store;

pub use chat_state::*;
pub use credentials::*;
pub use interaction_dispatcher::*;
pub use message_reducer::*;
pub use progress_store::*;
pub use relogin::*;
pub use stream_guard::*;
pub use transcript::*;
pub use user_store::*;
