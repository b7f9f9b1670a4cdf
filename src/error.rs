//! Unified error type for ble-vote.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for efficient
//! on-target logging.

use core::fmt;

/// Top-level error type used across the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The radio stack rejected a request.
    Radio(RadioError),

    /// Non-blocking queue operation could not complete.
    Queue(QueueError),

    /// Payload does not fit in a [`Payload`](crate::queue::Payload) buffer.
    PayloadTooLong,

    /// Advertising records exceed the 31-byte legacy advertising limit.
    AdvertisingDataTooLong,

    /// The radio returned fewer characteristic handles than were registered.
    ServiceRegistration,
}

/// Failures reported by the platform radio stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioError {
    /// Host-stack error code, passed through verbatim.
    Raw(i32),
    /// Advertising is already running (benign after a disconnect).
    AlreadyAdvertising,
    /// The connection handle no longer refers to a live link.
    NotConnected,
    /// The controller cannot accept the request right now.
    Busy,
}

/// Outcome of a non-blocking queue operation that could not proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueueError {
    /// No free slot; the value was dropped.
    Full,
    /// Nothing to read.
    Empty,
}

// Convenience conversions

impl From<RadioError> for Error {
    fn from(e: RadioError) -> Self {
        Error::Radio(e)
    }
}

impl From<QueueError> for Error {
    fn from(e: QueueError) -> Self {
        Error::Queue(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Radio(e) => write!(f, "radio error: {:?}", e),
            Error::Queue(QueueError::Full) => f.write_str("queue full"),
            Error::Queue(QueueError::Empty) => f.write_str("queue empty"),
            Error::PayloadTooLong => f.write_str("payload too long"),
            Error::AdvertisingDataTooLong => f.write_str("advertising data too long"),
            Error::ServiceRegistration => f.write_str("service registration failed"),
        }
    }
}
