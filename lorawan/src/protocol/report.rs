use heapless::Vec;

use super::{put, Frame, ProtocolError, MAX_APP_PAYLOAD};
use crate::class::{class_b::SysTime, DeviceClass};
use crate::lorawan::mac::EventStatus;

/// Report tag space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum ReportTag {
    CoreStarted = 0,
    JoinRequest = 1,
    DataSent = 2,
    SentAcked = 3,
    DataReceived = 4,
    ClassChanged = 5,
    GetDatetime = 6,
    CurrentClass = 7,
}

impl TryFrom<u8> for ReportTag {
    type Error = ProtocolError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Ok(match tag {
            0 => ReportTag::CoreStarted,
            1 => ReportTag::JoinRequest,
            2 => ReportTag::DataSent,
            3 => ReportTag::SentAcked,
            4 => ReportTag::DataReceived,
            5 => ReportTag::ClassChanged,
            6 => ReportTag::GetDatetime,
            7 => ReportTag::CurrentClass,
            other => return Err(ProtocolError::UnknownTag(other)),
        })
    }
}

/// Answer to a `current_class` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClassReport {
    /// Active class
    Class(DeviceClass),
    /// Class B entry in flight
    ClassBPending,
    /// Not joined or engine busy
    Busy,
}

impl ClassReport {
    /// Code sent while a Class B entry is in flight
    pub const CLASS_B_PENDING: u8 = 3;
    /// Code sent while the node is busy
    pub const BUSY: u8 = 0xFF;

    /// Wire code
    pub fn code(self) -> u8 {
        match self {
            ClassReport::Class(class) => class.code(),
            ClassReport::ClassBPending => Self::CLASS_B_PENDING,
            ClassReport::Busy => Self::BUSY,
        }
    }

    /// Decode a wire code
    pub fn from_code(code: u8) -> Result<Self, ProtocolError> {
        match code {
            Self::CLASS_B_PENDING => Ok(ClassReport::ClassBPending),
            Self::BUSY => Ok(ClassReport::Busy),
            code => DeviceClass::from_code(code)
                .map(ClassReport::Class)
                .ok_or(ProtocolError::InvalidClass(code)),
        }
    }
}

/// Report sent over the mailbox
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Report {
    /// Coordinator is ready for commands
    CoreStarted,
    /// Activation finished
    JoinRequest {
        /// Activation succeeded
        ok: bool,
    },
    /// Uplink confirmed by the MAC engine
    DataSent {
        /// Outcome of the uplink
        status: EventStatus,
    },
    /// Confirmed uplink acknowledged by the network
    SentAcked,
    /// Downlink received
    DataReceived {
        /// Application port
        port: u8,
        /// Application payload
        data: Vec<u8, MAX_APP_PAYLOAD>,
    },
    /// Device class switched
    ClassChanged(DeviceClass),
    /// Network time
    GetDatetime(SysTime),
    /// Answer to `current_class`
    CurrentClass(ClassReport),
}

impl Report {
    /// Tag of this report
    pub fn tag(&self) -> ReportTag {
        match self {
            Report::CoreStarted => ReportTag::CoreStarted,
            Report::JoinRequest { .. } => ReportTag::JoinRequest,
            Report::DataSent { .. } => ReportTag::DataSent,
            Report::SentAcked => ReportTag::SentAcked,
            Report::DataReceived { .. } => ReportTag::DataReceived,
            Report::ClassChanged(_) => ReportTag::ClassChanged,
            Report::GetDatetime(_) => ReportTag::GetDatetime,
            Report::CurrentClass(_) => ReportTag::CurrentClass,
        }
    }

    /// Build a downlink report, failing if `data` exceeds the payload limit
    pub fn data_received(port: u8, data: &[u8]) -> Result<Self, ProtocolError> {
        Ok(Report::DataReceived {
            port,
            data: Vec::from_slice(data).map_err(|_| ProtocolError::PayloadTooLarge)?,
        })
    }

    /// Encode the report into a frame
    pub fn encode(&self) -> Result<Frame, ProtocolError> {
        let mut frame = Frame::new();
        put(&mut frame, &[self.tag() as u8])?;

        match self {
            Report::CoreStarted | Report::SentAcked => {}
            Report::JoinRequest { ok } => put(&mut frame, &[u8::from(!ok)])?,
            Report::DataSent { status } => put(&mut frame, &[status.code()])?,
            Report::DataReceived { port, data } => {
                put(&mut frame, &[*port, data.len() as u8])?;
                put(&mut frame, data)?;
            }
            Report::ClassChanged(class) => put(&mut frame, &[class.code()])?,
            Report::GetDatetime(time) => {
                put(&mut frame, &time.seconds.to_le_bytes())?;
                put(&mut frame, &time.subseconds.to_le_bytes())?;
            }
            Report::CurrentClass(class) => put(&mut frame, &[class.code()])?,
        }
        Ok(frame)
    }

    /// Decode a report frame
    pub fn decode(frame: &[u8]) -> Result<Self, ProtocolError> {
        let (&tag, payload) = frame.split_first().ok_or(ProtocolError::Empty)?;
        let byte = |index: usize| payload.get(index).copied().ok_or(ProtocolError::Truncated);

        match ReportTag::try_from(tag)? {
            ReportTag::CoreStarted => Ok(Report::CoreStarted),
            ReportTag::SentAcked => Ok(Report::SentAcked),
            ReportTag::JoinRequest => Ok(Report::JoinRequest { ok: byte(0)? == 0 }),
            ReportTag::DataSent => {
                let code = byte(0)?;
                let status = EventStatus::from_code(code).unwrap_or(EventStatus::Error);
                Ok(Report::DataSent { status })
            }
            ReportTag::DataReceived => {
                let port = byte(0)?;
                let size = usize::from(byte(1)?);
                let data = payload.get(2..2 + size).ok_or(ProtocolError::Truncated)?;
                Report::data_received(port, data)
            }
            ReportTag::ClassChanged => {
                let code = byte(0)?;
                DeviceClass::from_code(code)
                    .map(Report::ClassChanged)
                    .ok_or(ProtocolError::InvalidClass(code))
            }
            ReportTag::GetDatetime => {
                let bytes = payload.get(..6).ok_or(ProtocolError::Truncated)?;
                let seconds = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                let subseconds = u16::from_le_bytes([bytes[4], bytes[5]]);
                Ok(Report::GetDatetime(SysTime::new(seconds, subseconds)))
            }
            ReportTag::CurrentClass => ClassReport::from_code(byte(0)?).map(Report::CurrentClass),
        }
    }
}
