//! BLE protocol core of a distributed voting appliance.
//!
//! One manager board (BLE central) collects votes from up to
//! [`config::MAX_PEERS`] handheld controllers (BLE peripherals). This
//! crate holds everything between the radio stack and the application:
//!
//! - [`ble::central::CentralManager`] - scan, connect, discover and
//!   subscribe to controllers; send commands to one or all of them.
//! - [`ble::peripheral::VoteService`] - the controller's GATT server.
//! - [`queue`] - hands payloads from radio callbacks to async tasks.
//! - [`vote`] - command/vote bytes, the manager's session state and the
//!   controller's indicator state.
//!
//! The platform radio stack plugs in through the traits in
//! [`ble::radio`] and feeds [`ble::event`]s back in. Everything here is
//! `no_std` and runs on the host for testing.
//!
//! Enable the `defmt` feature for on-target logging.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod ble;
pub mod config;
pub mod error;
pub mod input;
pub mod queue;
pub mod vote;

pub use ble::central::{CentralManager, Peer, Stage};
pub use ble::peripheral::VoteService;
pub use ble::{Address, AddressKind, AttrHandle, ConnHandle, ScanMode, Uuid};
pub use error::{Error, QueueError, RadioError};
pub use queue::{Channel, Inbound, Payload, Receiver, Sender};
pub use vote::{Command, Vote};
