//! Bluetooth Low Energy subsystem.
//!
//! The protocol core for both boards of the voting appliance:
//!
//! 1. **Central manager** - scans for vote controllers advertising the
//!    vote service, connects, walks GATT discovery down to the CCCD and
//!    keeps a bounded set of peers.
//! 2. **Vote service** - the mirrored GATT server on each controller:
//!    advertises, accepts centrals, delivers writes and notifies votes.
//! 3. **Advertising helpers** - building and matching advertising payloads.
//!
//! Both roles are event-driven: the platform's radio stack delivers one
//! [`event`] at a time and the managers answer through the [`radio`]
//! traits. Nothing in here blocks.

pub mod adv;
pub mod central;
pub mod event;
pub mod peripheral;
pub mod radio;

#[cfg(test)]
pub(crate) mod mock;

use core::fmt;

/// Connection identifier assigned by the radio stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnHandle(pub u16);

/// Index of an attribute in a connection's attribute table.
pub type AttrHandle = u16;

/// Link-layer address type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressKind {
    Public,
    Random,
}

/// Link-layer device address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Address {
    pub kind: AddressKind,
    pub bytes: [u8; 6],
}

impl Address {
    pub const fn new(kind: AddressKind, bytes: [u8; 6]) -> Self {
        Self { kind, bytes }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.bytes.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

/// Service or characteristic UUID, kept in little-endian wire order so it
/// can be compared directly against advertising and discovery bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Uuid {
    Uuid16([u8; 2]),
    Uuid128([u8; 16]),
}

impl Uuid {
    pub const fn new_16(uuid: u16) -> Self {
        Uuid::Uuid16(uuid.to_le_bytes())
    }

    pub const fn from_u128(uuid: u128) -> Self {
        Uuid::Uuid128(uuid.to_le_bytes())
    }

    /// Parse wire-order bytes (2 or 16 long).
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes.len() {
            2 => Some(Uuid::Uuid16([bytes[0], bytes[1]])),
            16 => {
                let mut b = [0u8; 16];
                b.copy_from_slice(bytes);
                Some(Uuid::Uuid128(b))
            }
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Uuid::Uuid16(b) => b,
            Uuid::Uuid128(b) => b,
        }
    }
}

/// Scan duty cycle currently requested from the radio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanMode {
    /// High duty, bounded window - right after a topology change.
    Fast,
    /// Low duty, runs until stopped - steady state.
    Slow,
    Stopped,
}
