use embedded_hal::blocking::delay::DelayUs;

/// Mailbox transport error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MailboxError<E> {
    /// Frame exceeds the transport's maximum payload
    Oversized,
    /// Channel was not freed by the peer in time
    Timeout,
    /// Transport specific error
    Transport(E),
}

/// Channel-addressed hardware mailbox
pub trait Mailbox {
    /// Error type for transport operations
    type Error;

    /// Largest frame the transport accepts
    fn max_payload(&self) -> usize;

    /// Post a frame on `channel`
    ///
    /// Returns `WouldBlock` while the peer still holds the channel.
    fn send(&mut self, channel: u8, data: &[u8]) -> nb::Result<(), Self::Error>;
}

/// Bounded wait for a busy channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SendPolicy {
    /// Number of send attempts
    pub attempts: u32,
    /// Delay between two attempts in microseconds
    pub poll_interval_us: u32,
}

impl Default for SendPolicy {
    fn default() -> Self {
        Self {
            attempts: 1_000,
            poll_interval_us: 10,
        }
    }
}

/// Send a frame, spinning on a busy channel for at most `policy.attempts`
pub fn send_with_timeout<T, D>(
    mailbox: &mut T,
    delay: &mut D,
    policy: SendPolicy,
    channel: u8,
    data: &[u8],
) -> Result<(), MailboxError<T::Error>>
where
    T: Mailbox,
    D: DelayUs<u32>,
{
    if data.len() > mailbox.max_payload() {
        return Err(MailboxError::Oversized);
    }

    for _ in 0..policy.attempts {
        match mailbox.send(channel, data) {
            Ok(()) => return Ok(()),
            Err(nb::Error::WouldBlock) => delay.delay_us(policy.poll_interval_us),
            Err(nb::Error::Other(err)) => return Err(MailboxError::Transport(err)),
        }
    }

    Err(MailboxError::Timeout)
}
