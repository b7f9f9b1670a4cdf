//! Vote protocol vocabulary and session logic.
//!
//! Every message on the vote service is a single byte: [`Command`]s flow
//! from the manager board to the controllers, [`Vote`]s flow back.

pub mod indicator;
pub mod session;


pub use indicator::Indicators;
pub use session::{Clock, ReportingMode, Results, TickOutcome, TimingMode, VoteSession, VoteTally};

/// Manager -> controller command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// Voting opened; light the vote buttons.
    Start = 0x01,
    /// Voting closed.
    Stop = 0x02,
    IndicateYes = 0x03,
    IndicateNo = 0x04,
    /// Clear the result indicators.
    IndicateNone = 0x05,
}

impl Command {
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Wire payload.
    pub const fn to_bytes(self) -> [u8; 1] {
        [self as u8]
    }

    /// Decode a payload; anything but a single known byte is rejected.
    pub fn from_bytes(payload: &[u8]) -> Option<Self> {
        match payload {
            [b] => Self::try_from(*b).ok(),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Command::Start),
            0x02 => Ok(Command::Stop),
            0x03 => Ok(Command::IndicateYes),
            0x04 => Ok(Command::IndicateNo),
            0x05 => Ok(Command::IndicateNone),
            other => Err(other),
        }
    }
}

/// Controller -> manager vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Vote {
    No = 0x10,
    Yes = 0x11,
}

impl Vote {
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    pub const fn to_bytes(self) -> [u8; 1] {
        [self as u8]
    }

    pub fn from_bytes(payload: &[u8]) -> Option<Self> {
        match payload {
            [b] => Self::try_from(*b).ok(),
            _ => None,
        }
    }

    /// Command that shows this vote back on the voter's controller.
    pub const fn indication(self) -> Command {
        match self {
            Vote::Yes => Command::IndicateYes,
            Vote::No => Command::IndicateNo,
        }
    }
}

impl TryFrom<u8> for Vote {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x10 => Ok(Vote::No),
            0x11 => Ok(Vote::Yes),
            other => Err(other),
        }
    }
}
