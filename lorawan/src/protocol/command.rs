use heapless::Vec;

use super::{put, Frame, ProtocolError, MAX_APP_PAYLOAD};
use crate::class::DeviceClass;

/// Command tag space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CommandTag {
    /// Read the network time
    GetDatetime = 0,
    /// Send an uplink
    SendMessage = 1,
    /// Switch the device class
    ChangeClass = 2,
    /// Read the device class
    CurrentClass = 3,
}

impl TryFrom<u8> for CommandTag {
    type Error = ProtocolError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(CommandTag::GetDatetime),
            1 => Ok(CommandTag::SendMessage),
            2 => Ok(CommandTag::ChangeClass),
            3 => Ok(CommandTag::CurrentClass),
            other => Err(ProtocolError::UnknownTag(other)),
        }
    }
}

/// Uplink requested by the command source
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UplinkMessage {
    /// Application port
    pub port: u8,
    /// Request an acknowledgement
    pub confirmed: bool,
    /// Application payload
    pub data: Vec<u8, MAX_APP_PAYLOAD>,
}

impl UplinkMessage {
    /// Build a message, failing if `data` exceeds the application payload limit
    pub fn new(port: u8, confirmed: bool, data: &[u8]) -> Result<Self, ProtocolError> {
        Ok(Self {
            port,
            confirmed,
            data: Vec::from_slice(data).map_err(|_| ProtocolError::PayloadTooLarge)?,
        })
    }
}

/// Command received over the mailbox
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Read the network time
    GetDatetime,
    /// Send an uplink
    SendMessage(UplinkMessage),
    /// Switch the device class
    ChangeClass(DeviceClass),
    /// Read the device class
    CurrentClass,
}

impl Command {
    /// Tag of this command
    pub fn tag(&self) -> CommandTag {
        match self {
            Command::GetDatetime => CommandTag::GetDatetime,
            Command::SendMessage(_) => CommandTag::SendMessage,
            Command::ChangeClass(_) => CommandTag::ChangeClass,
            Command::CurrentClass => CommandTag::CurrentClass,
        }
    }

    /// Decode a command frame
    ///
    /// Bytes past the end of the command are ignored, mailbox slots have a
    /// fixed size.
    pub fn decode(frame: &[u8]) -> Result<Self, ProtocolError> {
        let (&tag, payload) = frame.split_first().ok_or(ProtocolError::Empty)?;

        match CommandTag::try_from(tag)? {
            CommandTag::GetDatetime => Ok(Command::GetDatetime),
            CommandTag::CurrentClass => Ok(Command::CurrentClass),
            CommandTag::ChangeClass => {
                let &code = payload.first().ok_or(ProtocolError::Truncated)?;
                DeviceClass::from_code(code)
                    .map(Command::ChangeClass)
                    .ok_or(ProtocolError::InvalidClass(code))
            }
            CommandTag::SendMessage => {
                let [port, confirmed, size, rest @ ..] = payload else {
                    return Err(ProtocolError::Truncated);
                };
                let size = usize::from(*size);
                if size > MAX_APP_PAYLOAD {
                    return Err(ProtocolError::PayloadTooLarge);
                }
                let data = rest.get(..size).ok_or(ProtocolError::Truncated)?;
                UplinkMessage::new(*port, *confirmed != 0, data).map(Command::SendMessage)
            }
        }
    }

    /// Encode the command into a frame
    pub fn encode(&self) -> Result<Frame, ProtocolError> {
        let mut frame = Frame::new();
        put(&mut frame, &[self.tag() as u8])?;

        match self {
            Command::GetDatetime | Command::CurrentClass => {}
            Command::ChangeClass(class) => put(&mut frame, &[class.code()])?,
            Command::SendMessage(message) => {
                put(
                    &mut frame,
                    &[message.port, u8::from(message.confirmed), message.data.len() as u8],
                )?;
                put(&mut frame, &message.data)?;
            }
        }
        Ok(frame)
    }
}
