//! Central connection manager - keeps up to `max_peers` vote controllers
//! connected and subscribed.
//!
//! Per peer the manager walks:
//!
//! ```text
//! Scanning(fast|slow) -> Connecting -> ServiceDiscovery
//!     -> CharacteristicDiscovery -> (CCCD write) -> Active
//!     -> (disconnect) -> Scanning
//! ```
//!
//! Every radio event is matched against the stage of the peer it concerns;
//! events that don't fit the current stage are ignored. Only one
//! connection attempt is in flight at a time, and scanning is paused while
//! it is. Connect results are matched to that attempt by address, so the
//! outcome of a cancelled attempt cannot release a newer one.
//!
//! Peers live in a fixed arena indexed by slot. The manager is the only
//! writer; [`CentralManager::send`] and [`CentralManager::broadcast`] work
//! from a snapshot so the set can change underneath them without effect.
//!
//! A peer that stalls in discovery for longer than
//! [`CentralConfig::discovery_timeout`] (checked by
//! [`CentralManager::poll_timeouts`]) or reports a failed stage is
//! abandoned: its link is dropped and the slot freed.

use crate::ble::adv::{contains_uuid, extract_device_name};
use crate::ble::event::{CentralEvent, GATT_STATUS_SUCCESS};
use crate::ble::radio::{CentralRadio, WriteKind};
use crate::ble::{Address, AttrHandle, ConnHandle, ScanMode};
use crate::config::{CentralConfig, MAX_PEERS};
use crate::error::Error;
use embassy_time::Instant;
use heapless::Vec;

/// CCCD value enabling notifications (0x0001, little-endian).
pub const CCCD_ENABLE_NOTIFY: [u8; 2] = 1u16.to_le_bytes();

/// Discovery progress of a connected peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    ServiceDiscovery,
    CharacteristicDiscovery,
    /// Subscribed; notifications flow.
    Active,
}

/// Book-keeping for one connected vote controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Peer {
    pub conn: ConnHandle,
    pub address: Address,
    /// Vote service attribute range (start, end).
    pub service_range: Option<(AttrHandle, AttrHandle)>,
    /// Peripheral -> us.
    pub notify_handle: Option<AttrHandle>,
    /// Us -> peripheral.
    pub write_handle: Option<AttrHandle>,
    pub stage: Stage,
    stage_since: Instant,
}

impl Peer {
    fn new(conn: ConnHandle, address: Address, now: Instant) -> Self {
        Self {
            conn,
            address,
            service_range: None,
            notify_handle: None,
            write_handle: None,
            stage: Stage::ServiceDiscovery,
            stage_since: now,
        }
    }

    fn enter(&mut self, stage: Stage, now: Instant) {
        self.stage = stage;
        self.stage_since = now;
    }

    /// Handle of the notify characteristic's CCCD.
    pub fn cccd_handle(&self) -> Option<AttrHandle> {
        self.notify_handle.map(|h| h + 1)
    }
}

#[derive(Clone, Copy, Debug)]
struct PendingConnect {
    address: Address,
    since: Instant,
}

/// Central-role manager over a radio `R`.
///
/// `on_notify` receives every notification from a tracked peer. It runs in
/// the radio callback context, so it must not block; errors it returns are
/// logged and dropped.
pub struct CentralManager<R, F, const N: usize = MAX_PEERS> {
    radio: R,
    on_notify: F,
    config: CentralConfig,
    peers: [Option<Peer>; N],
    pending: Option<PendingConnect>,
    scan: ScanMode,
    /// Scan windows started whose `ScanDone` has not arrived yet.
    open_windows: u8,
    paused: bool,
}

impl<R, F, const N: usize> CentralManager<R, F, N>
where
    R: CentralRadio,
    F: FnMut(ConnHandle, &[u8]) -> Result<(), Error>,
{
    pub fn new(radio: R, config: CentralConfig, on_notify: F) -> Self {
        Self {
            radio,
            on_notify,
            config,
            peers: [None; N],
            pending: None,
            scan: ScanMode::Stopped,
            open_windows: 0,
            paused: false,
        }
    }

    /// Kick off discovery with a fast scan.
    pub fn start(&mut self) {
        info!("central: starting, max {} peers", self.max_peers());
        self.start_scan(ScanMode::Fast);
    }

    // ═══════════════════════════════════════════════════════════════════
    // Operator controls
    // ═══════════════════════════════════════════════════════════════════

    /// Write `data` to one peer's write characteristic without waiting
    /// for a response. Unknown peers and peers whose write handle is not
    /// resolved yet are skipped. Returns whether a write was issued.
    pub fn send(&mut self, conn: ConnHandle, data: &[u8]) -> bool {
        let Some(handle) = self
            .peers
            .iter()
            .flatten()
            .find(|p| p.conn == conn)
            .and_then(|p| p.write_handle)
        else {
            return false;
        };

        match self
            .radio
            .write(conn, handle, data, WriteKind::WithoutResponse)
        {
            Ok(()) => true,
            Err(e) => {
                warn!("central: write to {} failed: {}", conn, e);
                false
            }
        }
    }

    /// [`send`](Self::send) to every peer tracked at the time of the call.
    /// Returns how many writes were issued.
    pub fn broadcast(&mut self, data: &[u8]) -> usize {
        let targets: Vec<ConnHandle, N> = self.peers.iter().flatten().map(|p| p.conn).collect();
        targets.iter().filter(|conn| self.send(**conn, data)).count()
    }

    /// Freeze the peer set: stop scanning and drop any pending connection
    /// attempt until [`resume_scanning`](Self::resume_scanning).
    pub fn stop_scanning(&mut self) {
        info!("central: scanning paused");
        self.paused = true;
        if let Some(pending) = self.pending.take() {
            debug!("central: cancelling connect to {}", pending.address);
            if let Err(e) = self.radio.cancel_connect() {
                warn!("central: cancel connect failed: {}", e);
            }
        }
        if self.scan != ScanMode::Stopped {
            self.stop_scan();
        }
    }

    pub fn resume_scanning(&mut self) {
        info!("central: scanning resumed");
        self.paused = false;
        self.refill();
    }

    // ═══════════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════════

    pub fn peer_count(&self) -> usize {
        self.peers.iter().flatten().count()
    }

    /// Copy of every tracked peer.
    pub fn peers(&self) -> Vec<Peer, N> {
        self.peers.iter().flatten().copied().collect()
    }

    pub fn peer(&self, conn: ConnHandle) -> Option<Peer> {
        self.peers.iter().flatten().find(|p| p.conn == conn).copied()
    }

    pub fn scan_mode(&self) -> ScanMode {
        self.scan
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_connecting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn max_peers(&self) -> usize {
        self.config.max_peers.min(N)
    }

    pub fn config(&self) -> &CentralConfig {
        &self.config
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    // ═══════════════════════════════════════════════════════════════════
    // Event handling
    // ═══════════════════════════════════════════════════════════════════

    /// Feed one radio event. `now` timestamps stage transitions for
    /// [`poll_timeouts`](Self::poll_timeouts).
    pub fn handle_event(&mut self, event: CentralEvent<'_>, now: Instant) {
        match event {
            CentralEvent::ScanResult {
                address,
                rssi,
                data,
            } => self.on_scan_result(address, rssi, data, now),
            CentralEvent::ScanDone => self.on_scan_done(),
            CentralEvent::Connected { conn, address } => self.on_connected(conn, address, now),
            CentralEvent::ConnectFailed { address, status } => {
                if !self.is_pending(&address) {
                    debug!("central: stale connect failure for {}", address);
                    return;
                }
                warn!("central: connect to {} failed ({})", address, status);
                self.pending = None;
                self.refill();
            }
            CentralEvent::Disconnected {
                conn,
                address,
                reason,
            } => self.on_disconnected(conn, address, reason),
            CentralEvent::ServiceResult {
                conn,
                start,
                end,
                uuid,
            } => {
                let service = self.config.service_uuid;
                if let Some(peer) = self.peer_in_stage(conn, Stage::ServiceDiscovery) {
                    if uuid == service {
                        peer.service_range = Some((start, end));
                    }
                }
            }
            CentralEvent::ServiceDone { conn, status } => self.on_service_done(conn, status, now),
            CentralEvent::CharacteristicResult {
                conn,
                value_handle,
                uuid,
                ..
            } => {
                let (notify_uuid, write_uuid) = (self.config.notify_uuid, self.config.write_uuid);
                if let Some(peer) = self.peer_in_stage(conn, Stage::CharacteristicDiscovery) {
                    if uuid == notify_uuid {
                        peer.notify_handle = Some(value_handle);
                    } else if uuid == write_uuid {
                        peer.write_handle = Some(value_handle);
                    }
                }
            }
            CentralEvent::CharacteristicDone { conn, status } => {
                self.on_characteristic_done(conn, status, now)
            }
            CentralEvent::WriteDone {
                conn,
                handle,
                status,
            } => {
                let Some(slot) = self.slot_of(conn) else {
                    return;
                };
                let is_cccd = self.peers[slot].and_then(|p| p.cccd_handle()) == Some(handle);
                if is_cccd && status != GATT_STATUS_SUCCESS {
                    warn!("central: {} rejected subscription ({})", conn, status);
                    self.abandon(slot);
                }
            }
            CentralEvent::Notify { conn, data, .. } => {
                if self.slot_of(conn).is_none() {
                    trace!("central: notify from untracked {}", conn);
                    return;
                }
                if let Err(e) = (self.on_notify)(conn, data) {
                    warn!("central: notify handler failed for {}: {}", conn, e);
                }
            }
        }
    }

    /// Abandon a connection attempt or discovery stage that has not
    /// progressed within the configured timeout.
    pub fn poll_timeouts(&mut self, now: Instant) {
        let timeout = self.config.discovery_timeout;

        if let Some(pending) = self.pending {
            if now >= pending.since + timeout {
                warn!("central: connect to {} timed out", pending.address);
                self.pending = None;
                if let Err(e) = self.radio.cancel_connect() {
                    warn!("central: cancel connect failed: {}", e);
                }
                self.refill();
            }
        }

        for slot in 0..N {
            let expired = matches!(
                self.peers[slot],
                Some(p) if p.stage != Stage::Active && now >= p.stage_since + timeout
            );
            if expired {
                self.abandon(slot);
            }
        }
    }

    fn on_scan_result(&mut self, address: Address, rssi: i8, data: &[u8], now: Instant) {
        if self.paused || self.pending.is_some() {
            return;
        }
        if !contains_uuid(data, &self.config.service_uuid) {
            return;
        }
        if self.is_tracked(&address) || self.peer_count() >= self.max_peers() {
            return;
        }

        let name = extract_device_name(data);
        info!(
            "central: connecting to {} ({}, rssi {})",
            address,
            name.as_str(),
            rssi
        );
        self.stop_scan();
        match self.radio.connect(&address) {
            Ok(()) => self.pending = Some(PendingConnect { address, since: now }),
            Err(e) => {
                warn!("central: connect request failed: {}", e);
                self.refill();
            }
        }
    }

    fn on_scan_done(&mut self) {
        self.open_windows = self.open_windows.saturating_sub(1);
        if self.open_windows > 0 {
            trace!("central: earlier scan window closed");
            return;
        }
        self.scan = ScanMode::Stopped;
        if !self.paused && self.pending.is_none() && self.peer_count() < self.max_peers() {
            self.start_scan(ScanMode::Slow);
        }
    }

    fn on_connected(&mut self, conn: ConnHandle, address: Address, now: Instant) {
        if self.is_pending(&address) {
            self.pending = None;
        } else if self.paused {
            warn!("central: late connection {} while paused, dropping link", conn);
            self.drop_link(conn);
            return;
        }

        if self.slot_of(conn).is_some() {
            return;
        }
        let free = self.peers.iter().position(Option::is_none);
        let slot = match free {
            Some(slot) if self.peer_count() < self.max_peers() && !self.is_tracked(&address) => {
                slot
            }
            _ => {
                warn!("central: no slot for {}, dropping link", conn);
                self.drop_link(conn);
                return;
            }
        };

        info!("central: connected {} ({}) in slot {}", conn, address, slot);
        self.peers[slot] = Some(Peer::new(conn, address, now));

        let service = self.config.service_uuid;
        if let Err(e) = self.radio.discover_services(conn, &service) {
            warn!("central: service discovery on {} failed: {}", conn, e);
            self.abandon(slot);
        }
    }

    fn on_disconnected(&mut self, conn: ConnHandle, address: Address, reason: u8) {
        info!(
            "central: disconnected {} ({}) reason {}",
            conn,
            address,
            reason
        );
        if let Some(slot) = self.slot_of(conn) {
            self.peers[slot] = None;
        }
        self.refill();
    }

    fn on_service_done(&mut self, conn: ConnHandle, status: u16, now: Instant) {
        let Some(slot) = self.slot_of(conn) else {
            return;
        };
        let Some(peer) = self.peers[slot].as_mut() else {
            return;
        };
        if peer.stage != Stage::ServiceDiscovery {
            return;
        }

        let range = match peer.service_range {
            Some(range) if status == GATT_STATUS_SUCCESS => range,
            _ => {
                warn!("central: vote service not found on {} ({})", conn, status);
                self.abandon(slot);
                return;
            }
        };

        peer.enter(Stage::CharacteristicDiscovery, now);
        if let Err(e) = self.radio.discover_characteristics(conn, range.0, range.1) {
            warn!("central: characteristic discovery on {} failed: {}", conn, e);
            self.abandon(slot);
        }
    }

    fn on_characteristic_done(&mut self, conn: ConnHandle, status: u16, now: Instant) {
        let Some(slot) = self.slot_of(conn) else {
            return;
        };
        let Some(peer) = self.peers[slot].as_mut() else {
            return;
        };
        if peer.stage != Stage::CharacteristicDiscovery {
            return;
        }

        let cccd = match (peer.cccd_handle(), peer.write_handle) {
            (Some(cccd), Some(_)) if status == GATT_STATUS_SUCCESS => cccd,
            _ => {
                warn!("central: vote characteristics missing on {} ({})", conn, status);
                self.abandon(slot);
                return;
            }
        };

        peer.enter(Stage::Active, now);
        match self
            .radio
            .write(conn, cccd, &CCCD_ENABLE_NOTIFY, WriteKind::WithResponse)
        {
            Ok(()) => {
                info!("central: subscribed to {}", conn);
                self.refill();
            }
            Err(e) => {
                warn!("central: subscribe to {} failed: {}", conn, e);
                self.abandon(slot);
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Helpers
    // ═══════════════════════════════════════════════════════════════════

    fn slot_of(&self, conn: ConnHandle) -> Option<usize> {
        self.peers
            .iter()
            .position(|p| matches!(p, Some(p) if p.conn == conn))
    }

    fn peer_in_stage(&mut self, conn: ConnHandle, stage: Stage) -> Option<&mut Peer> {
        self.peers
            .iter_mut()
            .flatten()
            .find(|p| p.conn == conn && p.stage == stage)
    }

    fn is_tracked(&self, address: &Address) -> bool {
        self.peers.iter().flatten().any(|p| p.address == *address)
    }

    fn is_pending(&self, address: &Address) -> bool {
        self.pending.is_some_and(|p| p.address == *address)
    }

    fn drop_link(&mut self, conn: ConnHandle) {
        if let Err(e) = self.radio.disconnect(conn) {
            warn!("central: disconnect {} failed: {}", conn, e);
        }
    }

    /// Drop a peer's slot and its link, then look for a replacement.
    fn abandon(&mut self, slot: usize) {
        if let Some(peer) = self.peers[slot].take() {
            warn!("central: abandoning {} in {}", peer.conn, peer.stage);
            self.drop_link(peer.conn);
        }
        self.refill();
    }

    /// Fast scan if a slot is free and nothing blocks it.
    fn refill(&mut self) {
        if !self.paused && self.pending.is_none() && self.peer_count() < self.max_peers() {
            self.start_scan(ScanMode::Fast);
        }
    }

    fn start_scan(&mut self, mode: ScanMode) {
        let params = match mode {
            ScanMode::Fast => self.config.fast_scan,
            ScanMode::Slow => self.config.slow_scan,
            ScanMode::Stopped => return self.stop_scan(),
        };
        if self.scan != ScanMode::Stopped {
            self.stop_scan();
        }
        match self.radio.scan_start(&params) {
            Ok(()) => {
                debug!("central: scan {}", mode);
                self.scan = mode;
                self.open_windows = self.open_windows.saturating_add(1);
            }
            Err(e) => {
                warn!("central: scan start failed: {}", e);
                self.scan = ScanMode::Stopped;
            }
        }
    }

    fn stop_scan(&mut self) {
        if let Err(e) = self.radio.scan_stop() {
            warn!("central: scan stop failed: {}", e);
        }
        self.scan = ScanMode::Stopped;
    }
}
