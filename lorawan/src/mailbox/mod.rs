//! Hardware mailbox transport
//!
//! The mailbox links the coordinator core with the core issuing commands. It
//! carries short byte frames on numbered channels and raises an interrupt on
//! reception. Drivers implement [`Mailbox`]; the receive side is wired by the
//! application, which forwards `(channel, bytes)` from its interrupt handler
//! to `protocol::CommandReceiver::on_mailbox`.

/// Mailbox trait and bounded send
pub mod traits;

pub use traits::{send_with_timeout, Mailbox, MailboxError, SendPolicy};
