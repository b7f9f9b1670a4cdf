//! Boundary to the platform's Bluetooth host stack.
//!
//! The managers issue requests through these traits and learn about their
//! outcome from later [`event`](crate::ble::event)s. Implementations must
//! return immediately; they are called from the radio callback context.

use crate::ble::{Address, AttrHandle, ConnHandle, Uuid};
use crate::error::RadioError;
use embassy_time::Duration;
use heapless::Vec;

/// Maximum characteristics registered in one service.
pub const MAX_SERVICE_CHARACTERISTICS: usize = 4;

/// GAP scan timing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanParams {
    /// `None` scans until stopped.
    pub duration: Option<Duration>,
    pub interval: Duration,
    pub window: Duration,
}

/// GATT client write procedure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteKind {
    /// Write Command; fire-and-forget.
    WithoutResponse,
    /// Write Request; completion arrives as `CentralEvent::WriteDone`.
    WithResponse,
}

/// Characteristic property flags, as carried in the declaration.
pub mod props {
    pub const READ: u8 = 0x02;
    pub const WRITE_NO_RESPONSE: u8 = 0x04;
    pub const WRITE: u8 = 0x08;
    pub const NOTIFY: u8 = 0x10;
}

/// One characteristic to register on the local GATT server.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CharacteristicDef {
    pub uuid: Uuid,
    pub properties: u8,
}

/// Requests the central manager makes of the radio.
pub trait CentralRadio {
    /// Open a scan window; it ends with one `CentralEvent::ScanDone`.
    fn scan_start(&mut self, params: &ScanParams) -> Result<(), RadioError>;

    fn scan_stop(&mut self) -> Result<(), RadioError>;

    /// Start a connection attempt; the result arrives as `Connected` or
    /// `ConnectFailed`.
    fn connect(&mut self, address: &Address) -> Result<(), RadioError>;

    fn cancel_connect(&mut self) -> Result<(), RadioError>;

    /// Primary service discovery restricted to `uuid`.
    fn discover_services(&mut self, conn: ConnHandle, uuid: &Uuid) -> Result<(), RadioError>;

    fn discover_characteristics(
        &mut self,
        conn: ConnHandle,
        start: AttrHandle,
        end: AttrHandle,
    ) -> Result<(), RadioError>;

    fn write(
        &mut self,
        conn: ConnHandle,
        handle: AttrHandle,
        data: &[u8],
        kind: WriteKind,
    ) -> Result<(), RadioError>;

    fn disconnect(&mut self, conn: ConnHandle) -> Result<(), RadioError>;
}

/// Requests the vote service makes of the radio.
pub trait PeripheralRadio {
    /// Register one primary service. Returns the value handle of each
    /// characteristic, in the order given.
    fn register_service(
        &mut self,
        service: &Uuid,
        characteristics: &[CharacteristicDef],
    ) -> Result<Vec<AttrHandle, MAX_SERVICE_CHARACTERISTICS>, RadioError>;

    fn advertise(&mut self, interval: Duration, payload: &[u8]) -> Result<(), RadioError>;

    fn stop_advertising(&mut self) -> Result<(), RadioError>;

    fn notify(&mut self, conn: ConnHandle, handle: AttrHandle, data: &[u8])
        -> Result<(), RadioError>;

    /// Copy the current value of a local attribute into `buf`, returning
    /// its full length. A value longer than `buf` is cut to fit, but the
    /// returned length is still the full one.
    fn read(&mut self, handle: AttrHandle, buf: &mut [u8]) -> Result<usize, RadioError>;
}
