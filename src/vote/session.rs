//! One voting round on the manager board.
//!
//! [`VoteSession`] is pure state: it decides which [`Command`] to send and
//! when the round is over, and the caller moves the bytes through the
//! central manager. It is ticked once per second.

use crate::ble::ConnHandle;
use crate::config::MAX_PEERS;
use crate::vote::{Command, Vote};
use core::fmt;
use heapless::LinearMap;

/// Whether voters see their own vote echoed back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportingMode {
    /// Each vote is echoed to its voter as an indicate command.
    #[default]
    Public,
    Anonymous,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimingMode {
    /// Runs until every peer voted.
    #[default]
    Infinite,
    /// Countdown in seconds.
    Timed(u32),
}

/// Latest vote of each peer.
#[derive(Clone, Debug)]
pub struct VoteTally {
    votes: LinearMap<ConnHandle, Vote, MAX_PEERS>,
}

impl VoteTally {
    pub const fn new() -> Self {
        Self {
            votes: LinearMap::new(),
        }
    }

    /// Record `vote` for `peer`, replacing an earlier one. Returns `false`
    /// when the tally is full and `peer` has not voted before.
    pub fn record(&mut self, peer: ConnHandle, vote: Vote) -> bool {
        self.votes.insert(peer, vote).is_ok()
    }

    pub fn vote_of(&self, peer: ConnHandle) -> Option<Vote> {
        self.votes.get(&peer).copied()
    }

    pub fn yes(&self) -> usize {
        self.votes.values().filter(|v| **v == Vote::Yes).count()
    }

    pub fn no(&self) -> usize {
        self.votes.values().filter(|v| **v == Vote::No).count()
    }

    pub fn total(&self) -> usize {
        self.votes.len()
    }

    pub fn clear(&mut self) {
        self.votes.clear();
    }

    pub fn results(&self) -> Results {
        Results {
            yes: self.yes(),
            no: self.no(),
            total: self.total(),
        }
    }
}

impl Default for VoteTally {
    fn default() -> Self {
        Self::new()
    }
}

/// Final counts of a round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Results {
    pub yes: usize,
    pub no: usize,
    pub total: usize,
}

impl fmt::Display for Results {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total == 0 {
            return f.write_str("No votes");
        }
        write!(f, "Yes: {}, No: {}, Total: {}", self.yes, self.no, self.total)
    }
}

/// Seconds rendered as `MM:SS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Clock(pub u32);

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// Result of a one-second tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// No round running.
    Idle,
    /// Still collecting; `time_left` is set for timed rounds.
    Running { time_left: Option<u32> },
    /// Countdown expired or everyone voted. Call [`VoteSession::end`].
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Phase {
    Idle,
    Voting,
    Ended,
}

#[derive(Clone, Debug)]
pub struct VoteSession {
    reporting: ReportingMode,
    timing: TimingMode,
    /// Timing of the round in progress.
    round_timing: TimingMode,
    tally: VoteTally,
    phase: Phase,
    /// Goes negative once a timed round overruns.
    time_left: i64,
    results: Option<Results>,
}

impl VoteSession {
    pub fn new(reporting: ReportingMode, timing: TimingMode) -> Self {
        Self {
            reporting,
            timing,
            round_timing: timing,
            tally: VoteTally::new(),
            phase: Phase::Idle,
            time_left: 0,
            results: None,
        }
    }

    /// Takes effect immediately, including for votes still to come.
    pub fn set_reporting_mode(&mut self, mode: ReportingMode) {
        self.reporting = mode;
    }

    /// Takes effect at the next [`start`](Self::start).
    pub fn set_timing_mode(&mut self, mode: TimingMode) {
        self.timing = mode;
    }

    pub fn reporting_mode(&self) -> ReportingMode {
        self.reporting
    }

    pub fn timing_mode(&self) -> TimingMode {
        self.timing
    }

    /// Open the round. Returns the command to broadcast, or `None` if a
    /// round is already running.
    pub fn start(&mut self) -> Option<Command> {
        if self.phase == Phase::Voting {
            return None;
        }
        self.time_left = match self.timing {
            TimingMode::Timed(seconds) => i64::from(seconds),
            TimingMode::Infinite => 1,
        };
        self.round_timing = self.timing;
        self.phase = Phase::Voting;
        self.results = None;
        info!("session: voting started ({})", self.timing);
        Some(Command::Start)
    }

    /// Record a payload received from `peer`. Returns the command to send
    /// back to that peer, if any. Payloads outside a round are dropped.
    pub fn record(&mut self, peer: ConnHandle, payload: &[u8]) -> Option<Command> {
        if self.phase != Phase::Voting {
            debug!("session: {} sent a payload outside a round", peer);
            return None;
        }

        let echo = match Vote::from_bytes(payload) {
            Some(vote) => {
                if !self.tally.record(peer, vote) {
                    warn!("session: tally full, dropping vote from {}", peer);
                    return None;
                }
                debug!("session: {} voted {}", peer, vote);
                vote.indication()
            }
            None => {
                warn!("session: unknown payload from {}", peer);
                Command::IndicateNone
            }
        };

        match self.reporting {
            ReportingMode::Public => Some(echo),
            ReportingMode::Anonymous => None,
        }
    }

    /// Advance the round by one second. `peers` is the number of currently
    /// connected controllers.
    pub fn tick(&mut self, peers: usize) -> TickOutcome {
        if self.phase != Phase::Voting {
            return TickOutcome::Idle;
        }
        if let TimingMode::Timed(_) = self.round_timing {
            self.time_left -= 1;
        }
        if self.time_left < 0 || self.tally.total() == peers {
            return TickOutcome::Finished;
        }
        TickOutcome::Running {
            time_left: self.time_left(),
        }
    }

    /// Close the round and freeze the results. Returns the command to
    /// broadcast the first time only.
    pub fn end(&mut self) -> Option<Command> {
        if self.phase != Phase::Voting {
            return None;
        }
        self.phase = Phase::Ended;
        let results = self.tally.results();
        info!("session: voting ended: {}", results);
        self.results = Some(results);
        Some(Command::Stop)
    }

    /// Forget the round. Returns the command that clears every
    /// controller's indicators.
    pub fn reset(&mut self) -> Command {
        self.tally.clear();
        self.results = None;
        self.phase = Phase::Idle;
        Command::IndicateNone
    }

    pub fn is_voting(&self) -> bool {
        self.phase == Phase::Voting
    }

    /// Seconds left in a timed round.
    pub fn time_left(&self) -> Option<u32> {
        match self.round_timing {
            TimingMode::Timed(_) if self.phase == Phase::Voting => {
                Some(self.time_left.max(0) as u32)
            }
            _ => None,
        }
    }

    pub fn tally(&self) -> &VoteTally {
        &self.tally
    }

    /// Results of the last ended round.
    pub fn results(&self) -> Option<Results> {
        self.results
    }
}

impl Default for VoteSession {
    fn default() -> Self {
        Self::new(ReportingMode::default(), TimingMode::default())
    }
}
