//! Application-wide constants and compile-time configuration.
//!
//! UUIDs, radio timing parameters and capacities live here so they can be
//! tuned in one place. Both firmware images must be built from the same
//! values for discovery to succeed.

use crate::ble::radio::ScanParams;
use crate::ble::Uuid;
use embassy_time::Duration;

// Vote service identity

/// Primary vote service.
pub const VOTE_SERVICE_UUID: Uuid = Uuid::from_u128(0x12345678_1234_5678_1234_56789abcdef0);

/// Peripheral -> central (notify): votes.
pub const VOTE_NOTIFY_CHAR_UUID: Uuid = Uuid::from_u128(0x12345678_1234_5678_1234_56789abcdef1);

/// Central -> peripheral (write without response): commands.
pub const VOTE_WRITE_CHAR_UUID: Uuid = Uuid::from_u128(0x12345678_1234_5678_1234_56789abcdef2);

// Central (manager board)

/// Upper bound on simultaneously tracked vote controllers.
pub const MAX_PEERS: usize = 5;

/// Fast scan: 30 ms window every 60 ms (50 % duty) for 5 s.
pub const FAST_SCAN_WINDOW_US: u64 = 30_000;
pub const FAST_SCAN_INTERVAL_US: u64 = 60_000;
pub const FAST_SCAN_DURATION_MS: u64 = 5_000;

/// Slow scan: 15 ms window every 300 ms (5 % duty), until stopped.
pub const SLOW_SCAN_WINDOW_US: u64 = 15_000;
pub const SLOW_SCAN_INTERVAL_US: u64 = 300_000;

/// A connect or discovery stage that makes no progress for this long is
/// abandoned and its link dropped.
pub const DISCOVERY_STAGE_TIMEOUT_MS: u64 = 10_000;

// Peripheral (controller board)

/// Advertised complete local name. Must fit next to the flags and the
/// 128-bit UUID in 31 bytes (8 bytes max).
pub const DEVICE_NAME: &str = "PP Ctrl";

/// Advertising interval (µs).
pub const ADV_INTERVAL_US: u64 = 500_000;

/// Maximum centrals tracked by the vote service.
pub const MAX_CENTRALS: usize = 4;

// Payloads and queues

/// Largest GATT payload moved through the queue (default ATT MTU - 3).
pub const MAX_PAYLOAD_LEN: usize = 20;

/// Backing array length of the radio -> task queues (usable slots: N - 1).
pub const QUEUE_CAPACITY: usize = 16;

// Inputs

/// Vote button debounce time (ms).
pub const VOTE_BUTTON_DEBOUNCE_MS: u64 = 40;

/// Encoder push-button debounce time (ms).
pub const ENCODER_BUTTON_DEBOUNCE_MS: u64 = 400;

/// Runtime configuration of the central manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CentralConfig {
    pub service_uuid: Uuid,
    pub notify_uuid: Uuid,
    pub write_uuid: Uuid,
    /// Clamped to the manager's arena size.
    pub max_peers: usize,
    pub fast_scan: ScanParams,
    pub slow_scan: ScanParams,
    pub discovery_timeout: Duration,
}

impl Default for CentralConfig {
    fn default() -> Self {
        Self {
            service_uuid: VOTE_SERVICE_UUID,
            notify_uuid: VOTE_NOTIFY_CHAR_UUID,
            write_uuid: VOTE_WRITE_CHAR_UUID,
            max_peers: MAX_PEERS,
            fast_scan: ScanParams {
                duration: Some(Duration::from_millis(FAST_SCAN_DURATION_MS)),
                interval: Duration::from_micros(FAST_SCAN_INTERVAL_US),
                window: Duration::from_micros(FAST_SCAN_WINDOW_US),
            },
            slow_scan: ScanParams {
                duration: None,
                interval: Duration::from_micros(SLOW_SCAN_INTERVAL_US),
                window: Duration::from_micros(SLOW_SCAN_WINDOW_US),
            },
            discovery_timeout: Duration::from_millis(DISCOVERY_STAGE_TIMEOUT_MS),
        }
    }
}

/// Runtime configuration of the peripheral vote service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeripheralConfig {
    pub name: &'static str,
    pub service_uuid: Uuid,
    pub notify_uuid: Uuid,
    pub write_uuid: Uuid,
    pub adv_interval: Duration,
}

impl Default for PeripheralConfig {
    fn default() -> Self {
        Self {
            name: DEVICE_NAME,
            service_uuid: VOTE_SERVICE_UUID,
            notify_uuid: VOTE_NOTIFY_CHAR_UUID,
            write_uuid: VOTE_WRITE_CHAR_UUID,
            adv_interval: Duration::from_micros(ADV_INTERVAL_US),
        }
    }
}
