//! Radio events delivered by the platform stack.
//!
//! The stack serializes events: one is handed to a manager at a time, from
//! the radio callback context. Borrowed payloads are only valid for the
//! duration of that call.

use crate::ble::{Address, AttrHandle, ConnHandle, Uuid};

/// Status value the stack reports for a successful GATT procedure.
pub const GATT_STATUS_SUCCESS: u16 = 0;

/// Events seen by the central (GATT client) role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CentralEvent<'a> {
    /// One advertising report.
    ScanResult {
        address: Address,
        rssi: i8,
        data: &'a [u8],
    },
    /// A scan window ended (duration expired or scan stopped). Every
    /// started window ends with exactly one of these, in start order.
    ScanDone,
    Connected {
        conn: ConnHandle,
        address: Address,
    },
    ConnectFailed {
        address: Address,
        status: u16,
    },
    Disconnected {
        conn: ConnHandle,
        address: Address,
        reason: u8,
    },
    ServiceResult {
        conn: ConnHandle,
        start: AttrHandle,
        end: AttrHandle,
        uuid: Uuid,
    },
    ServiceDone {
        conn: ConnHandle,
        status: u16,
    },
    CharacteristicResult {
        conn: ConnHandle,
        def_handle: AttrHandle,
        value_handle: AttrHandle,
        properties: u8,
        uuid: Uuid,
    },
    CharacteristicDone {
        conn: ConnHandle,
        status: u16,
    },
    /// Completion of a write-with-response.
    WriteDone {
        conn: ConnHandle,
        handle: AttrHandle,
        status: u16,
    },
    Notify {
        conn: ConnHandle,
        handle: AttrHandle,
        data: &'a [u8],
    },
}

/// Events seen by the peripheral (GATT server) role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeripheralEvent {
    Connected {
        conn: ConnHandle,
        address: Address,
    },
    Disconnected {
        conn: ConnHandle,
        address: Address,
    },
    /// A central wrote to one of our attributes; the value is read back
    /// from the attribute table.
    Write {
        conn: ConnHandle,
        handle: AttrHandle,
    },
}
