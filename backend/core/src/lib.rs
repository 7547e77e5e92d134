pub mod context;
pub mod error;
pub mod event;
pub mod meta;
pub mod traits;
pub mod update;

pub use context::UpdateContext;
pub use error::BotError;
pub use event::UpdateEvent;
pub use meta::UpdateMeta;
pub use traits::ReplySink;
pub use update::{Chat, ChatKind, IncomingMessage, User};
