//! LED state of a vote controller.

use crate::vote::Command;

/// What the controller board currently shows.
///
/// The board applies this to its pins after every change; keeping it as
/// plain state lets the command handling run on the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Indicators {
    /// Backlights of both vote buttons; lit while a vote can be cast.
    pub buttons_lit: bool,
    pub yes: bool,
    pub no: bool,
}

impl Indicators {
    pub const fn new() -> Self {
        Self {
            buttons_lit: false,
            yes: false,
            no: false,
        }
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Start => self.buttons_lit = true,
            Command::Stop => self.buttons_lit = false,
            Command::IndicateYes => {
                self.yes = true;
                self.no = false;
            }
            Command::IndicateNo => {
                self.yes = false;
                self.no = true;
            }
            Command::IndicateNone => {
                self.yes = false;
                self.no = false;
            }
        }
    }

    /// Decode and apply a received payload. Unknown payloads leave the
    /// state untouched.
    pub fn apply_payload(&mut self, payload: &[u8]) -> Option<Command> {
        let command = Command::from_bytes(payload);
        match command {
            Some(command) => self.apply(command),
            None => warn!("indicators: unknown command {=[u8]:x}", payload),
        }
        command
    }

    /// A vote went out; the buttons go dark until the next round.
    pub fn vote_sent(&mut self) {
        self.buttons_lit = false;
    }
}
