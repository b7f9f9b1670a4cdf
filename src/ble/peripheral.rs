//! Peripheral-role vote service (GATT server on the controller board).
//!
//! Registers the vote service with a notify characteristic (votes out) and
//! a write-without-response characteristic (commands in), advertises it,
//! and tracks the centrals connected to it.

use crate::ble::adv::AdvPayload;
use crate::ble::event::PeripheralEvent;
use crate::ble::radio::{props, CharacteristicDef, PeripheralRadio};
use crate::ble::{AttrHandle, ConnHandle};
use crate::config::{PeripheralConfig, MAX_CENTRALS, MAX_PAYLOAD_LEN};
use crate::error::{Error, RadioError};
use heapless::Vec;

/// The vote GATT service over a radio `R`.
///
/// `on_write` receives each command written by a central. Like every
/// radio callback it must not block; errors it returns are logged.
pub struct VoteService<R, F> {
    radio: R,
    on_write: F,
    config: PeripheralConfig,
    adv: AdvPayload,
    notify_handle: AttrHandle,
    write_handle: AttrHandle,
    connected: Vec<ConnHandle, MAX_CENTRALS>,
}

impl<R, F> VoteService<R, F>
where
    R: PeripheralRadio,
    F: FnMut(&[u8]) -> Result<(), Error>,
{
    /// Register the service and start advertising it.
    pub fn start(mut radio: R, config: PeripheralConfig, on_write: F) -> Result<Self, Error> {
        let adv = AdvPayload::for_service(config.name, &config.service_uuid)?;

        let characteristics = [
            CharacteristicDef {
                uuid: config.notify_uuid,
                properties: props::NOTIFY,
            },
            CharacteristicDef {
                uuid: config.write_uuid,
                properties: props::WRITE_NO_RESPONSE,
            },
        ];
        let handles = radio.register_service(&config.service_uuid, &characteristics)?;
        let (notify_handle, write_handle) = match handles.as_slice() {
            [notify, write, ..] => (*notify, *write),
            _ => return Err(Error::ServiceRegistration),
        };
        debug!(
            "vote service: notify handle {}, write handle {}",
            notify_handle,
            write_handle
        );

        radio.advertise(config.adv_interval, adv.as_bytes())?;
        info!("vote service: advertising as {}", config.name);

        Ok(Self {
            radio,
            on_write,
            config,
            adv,
            notify_handle,
            write_handle,
            connected: Vec::new(),
        })
    }

    /// Feed one radio event. Only a failure to restart advertising is
    /// returned; the device is unreachable after it.
    pub fn handle_event(&mut self, event: PeripheralEvent) -> Result<(), Error> {
        match event {
            PeripheralEvent::Connected { conn, address } => {
                if self.connected.contains(&conn) {
                    return Ok(());
                }
                match self.connected.push(conn) {
                    Ok(()) => info!("vote service: {} connected ({})", conn, address),
                    Err(_) => warn!("vote service: central table full, ignoring {}", conn),
                }
                Ok(())
            }
            PeripheralEvent::Disconnected { conn, address } => {
                info!("vote service: {} disconnected ({})", conn, address);
                self.connected.retain(|c| *c != conn);
                self.restart_advertising()
            }
            PeripheralEvent::Write { conn, handle } => {
                if handle != self.write_handle {
                    trace!("vote service: write to foreign handle {}", handle);
                    return Ok(());
                }
                let mut buf = [0u8; MAX_PAYLOAD_LEN];
                match self.radio.read(handle, &mut buf) {
                    Ok(len) if len > buf.len() => {
                        warn!(
                            "vote service: dropping {}-byte write from {}, limit is {}",
                            len,
                            conn,
                            buf.len()
                        );
                    }
                    Ok(len) => {
                        if let Err(e) = (self.on_write)(&buf[..len]) {
                            warn!("vote service: write handler failed for {}: {}", conn, e);
                        }
                    }
                    Err(e) => warn!("vote service: reading write value failed: {}", e),
                }
                Ok(())
            }
        }
    }

    /// Notify `data` to every connected central. A central whose link
    /// has already dropped is evicted. Returns how many were notified.
    pub fn send(&mut self, data: &[u8]) -> usize {
        let handle = self.notify_handle;
        let radio = &mut self.radio;
        let mut sent = 0;
        self.connected
            .retain(|conn| match radio.notify(*conn, handle, data) {
                Ok(()) => {
                    sent += 1;
                    true
                }
                Err(e) => {
                    warn!("vote service: notify {} failed, evicting: {}", conn, e);
                    false
                }
            });
        sent
    }

    pub fn connected(&self) -> &[ConnHandle] {
        &self.connected
    }

    pub fn is_connected(&self, conn: ConnHandle) -> bool {
        self.connected.contains(&conn)
    }

    pub fn notify_handle(&self) -> AttrHandle {
        self.notify_handle
    }

    pub fn write_handle(&self) -> AttrHandle {
        self.write_handle
    }

    pub fn config(&self) -> &PeripheralConfig {
        &self.config
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    fn restart_advertising(&mut self) -> Result<(), Error> {
        let _ = self.radio.stop_advertising();
        match self
            .radio
            .advertise(self.config.adv_interval, self.adv.as_bytes())
        {
            Ok(()) | Err(RadioError::AlreadyAdvertising) => Ok(()),
            Err(e) => {
                error!("vote service: restarting advertising failed: {}", e);
                Err(e.into())
            }
        }
    }
}
