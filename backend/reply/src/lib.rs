//! Pending-reply state and interception.
//!
//! A command that still needs input parks a [`PendingReply`] under the
//! conversation scope; the next plain-text message from that scope is
//! folded back into a command line (inspector mode) or handed to the
//! arming command (custom mode).

pub mod interceptor;
pub mod listen;
pub mod pending;
pub mod sinks;
pub mod store;

pub use interceptor::{rebuild_inspector_input, ReplyInterceptor};
pub use listen::ReplyListener;
pub use pending::{NextInput, PendingReply};
pub use sinks::{DispatchSink, ReplyTarget};
pub use store::{CacheReplyStore, ReplyStore, KEY_PREFIX};
