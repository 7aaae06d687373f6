//! Mailbox command/report protocol
//!
//! Frames are exchanged on a single mailbox channel. Byte 0 carries a tag,
//! the remaining bytes depend on it. Multi-byte integers are little endian.
//!
//! Commands (toward the coordinator):
//!
//! | tag | command         | payload                           |
//! |-----|-----------------|-----------------------------------|
//! | 0   | `get_datetime`  | -                                 |
//! | 1   | `send_message`  | port, confirmed, size, data[size] |
//! | 2   | `change_class`  | class                             |
//! | 3   | `current_class` | -                                 |
//!
//! Reports (from the coordinator):
//!
//! | tag | report          | payload                           |
//! |-----|-----------------|-----------------------------------|
//! | 0   | `core_started`  | -                                 |
//! | 1   | `join_request`  | 0 on success, 1 otherwise         |
//! | 2   | `data_sent`     | event status                      |
//! | 3   | `sent_acked`    | -                                 |
//! | 4   | `data_received` | port, size, data[size]            |
//! | 5   | `class_changed` | class                             |
//! | 6   | `get_datetime`  | seconds (u32), subseconds (u16)   |
//! | 7   | `current_class` | class, 3 while entering B, 0xFF busy |

use heapless::Vec;

/// Command/report routing between the mailbox and the coordinator
pub mod adapter;
/// Inbound commands
pub mod command;
/// Outbound reports
pub mod report;

pub use adapter::{CommandProcessor, CommandReceiver, CommandSignal, ReportSink};
pub use command::{Command, CommandTag, UplinkMessage};
pub use report::{ClassReport, Report, ReportTag};

/// Mailbox channel used by the protocol
pub const MAILBOX_CHANNEL: u8 = 0;

/// Largest frame on the channel
pub const MAX_FRAME_SIZE: usize = 255;

/// Largest application payload carried by a frame
pub const MAX_APP_PAYLOAD: usize = crate::lorawan::mac::MAX_MAC_PAYLOAD_SIZE;

/// Encoded frame
pub type Frame = Vec<u8, MAX_FRAME_SIZE>;

/// Protocol error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Frame has no tag byte
    Empty,
    /// Tag is not part of the tag space
    UnknownTag(u8),
    /// Frame is shorter than its tag requires
    Truncated,
    /// Class code is not A, B or C
    InvalidClass(u8),
    /// Payload does not fit in a frame
    PayloadTooLarge,
    /// Mailbox transport failed
    Transport,
    /// Mailbox channel stayed busy
    Timeout,
}

/// Append `bytes` to `frame`
pub(crate) fn put(frame: &mut Frame, bytes: &[u8]) -> Result<(), ProtocolError> {
    frame
        .extend_from_slice(bytes)
        .map_err(|_| ProtocolError::PayloadTooLarge)
}
