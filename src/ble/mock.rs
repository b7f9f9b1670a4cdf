//! Recording radio used by the unit tests.

use crate::ble::radio::{
    CentralRadio, CharacteristicDef, PeripheralRadio, ScanParams, WriteKind,
    MAX_SERVICE_CHARACTERISTICS,
};
use crate::ble::{Address, AttrHandle, ConnHandle, Uuid};
use crate::error::RadioError;
use embassy_time::Duration;
use std::vec::Vec;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    ScanStart(ScanParams),
    ScanStop,
    Connect(Address),
    CancelConnect,
    DiscoverServices(ConnHandle, Uuid),
    DiscoverCharacteristics(ConnHandle, AttrHandle, AttrHandle),
    Write(ConnHandle, AttrHandle, Vec<u8>, WriteKind),
    Disconnect(ConnHandle),
    RegisterService(Uuid, usize),
    Advertise(Duration, Vec<u8>),
    StopAdvertising,
    Notify(ConnHandle, AttrHandle, Vec<u8>),
}

#[derive(Default)]
pub struct MockRadio {
    pub calls: Vec<Call>,
    pub connect_error: Option<RadioError>,
    pub discover_error: Option<RadioError>,
    pub advertise_error: Option<RadioError>,
    /// Links that silently dropped: notify/write against them fails.
    pub dropped: Vec<ConnHandle>,
    /// Value returned by `read`.
    pub attr_value: Vec<u8>,
    /// First handle handed out by `register_service`.
    pub next_handle: AttrHandle,
}

impl MockRadio {
    pub fn new() -> Self {
        Self {
            next_handle: 0x10,
            ..Default::default()
        }
    }

    pub fn take_calls(&mut self) -> Vec<Call> {
        core::mem::take(&mut self.calls)
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn writes(&self) -> Vec<(ConnHandle, AttrHandle, Vec<u8>, WriteKind)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Write(conn, h, d, k) => Some((*conn, *h, d.clone(), *k)),
                _ => None,
            })
            .collect()
    }

    pub fn last_scan(&self) -> Option<ScanParams> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::ScanStart(p) => Some(*p),
            _ => None,
        })
    }
}

impl CentralRadio for MockRadio {
    fn scan_start(&mut self, params: &ScanParams) -> Result<(), RadioError> {
        self.calls.push(Call::ScanStart(*params));
        Ok(())
    }

    fn scan_stop(&mut self) -> Result<(), RadioError> {
        self.calls.push(Call::ScanStop);
        Ok(())
    }

    fn connect(&mut self, address: &Address) -> Result<(), RadioError> {
        self.calls.push(Call::Connect(*address));
        match self.connect_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn cancel_connect(&mut self) -> Result<(), RadioError> {
        self.calls.push(Call::CancelConnect);
        Ok(())
    }

    fn discover_services(&mut self, conn: ConnHandle, uuid: &Uuid) -> Result<(), RadioError> {
        self.calls.push(Call::DiscoverServices(conn, *uuid));
        match self.discover_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn discover_characteristics(
        &mut self,
        conn: ConnHandle,
        start: AttrHandle,
        end: AttrHandle,
    ) -> Result<(), RadioError> {
        self.calls
            .push(Call::DiscoverCharacteristics(conn, start, end));
        Ok(())
    }

    fn write(
        &mut self,
        conn: ConnHandle,
        handle: AttrHandle,
        data: &[u8],
        kind: WriteKind,
    ) -> Result<(), RadioError> {
        self.calls
            .push(Call::Write(conn, handle, data.to_vec(), kind));
        if self.dropped.contains(&conn) {
            return Err(RadioError::NotConnected);
        }
        Ok(())
    }

    fn disconnect(&mut self, conn: ConnHandle) -> Result<(), RadioError> {
        self.calls.push(Call::Disconnect(conn));
        Ok(())
    }
}

impl PeripheralRadio for MockRadio {
    fn register_service(
        &mut self,
        service: &Uuid,
        characteristics: &[CharacteristicDef],
    ) -> Result<heapless::Vec<AttrHandle, MAX_SERVICE_CHARACTERISTICS>, RadioError> {
        self.calls
            .push(Call::RegisterService(*service, characteristics.len()));
        let mut handles = heapless::Vec::new();
        for _ in characteristics {
            // Value handle followed by its CCCD.
            let _ = handles.push(self.next_handle);
            self.next_handle += 3;
        }
        Ok(handles)
    }

    fn advertise(&mut self, interval: Duration, payload: &[u8]) -> Result<(), RadioError> {
        self.calls
            .push(Call::Advertise(interval, payload.to_vec()));
        match self.advertise_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn stop_advertising(&mut self) -> Result<(), RadioError> {
        self.calls.push(Call::StopAdvertising);
        Ok(())
    }

    fn notify(
        &mut self,
        conn: ConnHandle,
        handle: AttrHandle,
        data: &[u8],
    ) -> Result<(), RadioError> {
        self.calls
            .push(Call::Notify(conn, handle, data.to_vec()));
        if self.dropped.contains(&conn) {
            return Err(RadioError::NotConnected);
        }
        Ok(())
    }

    fn read(&mut self, _handle: AttrHandle, buf: &mut [u8]) -> Result<usize, RadioError> {
        let n = self.attr_value.len().min(buf.len());
        buf[..n].copy_from_slice(&self.attr_value[..n]);
        Ok(self.attr_value.len())
    }
}
