//! Advertising payload building and matching.
//!
//! Payloads are sequences of `(length, type, value)` records. The vote
//! service advertises flags, its complete local name and the service UUID.

use crate::ble::Uuid;
use crate::error::Error;
use heapless::{String, Vec};

/// Legacy advertising PDU payload limit.
pub const ADV_MAX_LEN: usize = 31;

pub const AD_TYPE_FLAGS: u8 = 0x01;
pub const AD_TYPE_INCOMPLETE_UUID16: u8 = 0x02;
pub const AD_TYPE_COMPLETE_UUID16: u8 = 0x03;
pub const AD_TYPE_COMPLETE_UUID128: u8 = 0x07;
pub const AD_TYPE_SHORT_NAME: u8 = 0x08;
pub const AD_TYPE_COMPLETE_NAME: u8 = 0x09;

/// LE General Discoverable, BR/EDR not supported.
pub const FLAGS_GENERAL_DISC_NO_BREDR: u8 = 0x06;

/// Builder for a legacy advertising payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdvPayload {
    buf: Vec<u8, ADV_MAX_LEN>,
}

impl AdvPayload {
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Flags, complete local name and one service UUID.
    pub fn for_service(name: &str, service: &Uuid) -> Result<Self, Error> {
        let mut payload = Self::new();
        payload.push(AD_TYPE_FLAGS, &[FLAGS_GENERAL_DISC_NO_BREDR])?;
        payload.push(AD_TYPE_COMPLETE_NAME, name.as_bytes())?;
        payload.push_uuid(service)?;
        Ok(payload)
    }

    /// Append one `(length, type, value)` record.
    pub fn push(&mut self, ad_type: u8, value: &[u8]) -> Result<(), Error> {
        if self.buf.len() + 2 + value.len() > ADV_MAX_LEN {
            return Err(Error::AdvertisingDataTooLong);
        }
        // Capacity was checked above, so none of these can fail.
        let _ = self.buf.push(value.len() as u8 + 1);
        let _ = self.buf.push(ad_type);
        let _ = self.buf.extend_from_slice(value);
        Ok(())
    }

    /// Append a complete UUID list record holding `uuid`.
    pub fn push_uuid(&mut self, uuid: &Uuid) -> Result<(), Error> {
        let ad_type = match uuid {
            Uuid::Uuid16(_) => AD_TYPE_COMPLETE_UUID16,
            Uuid::Uuid128(_) => AD_TYPE_COMPLETE_UUID128,
        };
        self.push(ad_type, uuid.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}

/// Check whether the raw advertising data carries `uuid` as a contiguous
/// byte run. Matches regardless of which record holds it.
pub fn contains_uuid(data: &[u8], uuid: &Uuid) -> bool {
    let needle = uuid.as_bytes();
    data.len() >= needle.len() && data.windows(needle.len()).any(|w| w == needle)
}

/// Extract complete/shortened local name from advertisement data.
pub fn extract_device_name(data: &[u8]) -> String<32> {
    let mut i = 0;
    while i < data.len() {
        let len = data[i] as usize;
        if len == 0 || i + len >= data.len() {
            break;
        }
        let ad_type = data[i + 1];
        if ad_type == AD_TYPE_SHORT_NAME || ad_type == AD_TYPE_COMPLETE_NAME {
            let name_bytes = &data[i + 2..i + 1 + len];
            let mut name = String::new();
            for &b in name_bytes {
                if name.push(b as char).is_err() {
                    break;
                }
            }
            return name;
        }
        i += len + 1;
    }

    let mut s = String::new();
    let _ = s.push_str("Unknown");
    s
}
