//! Interrupt-safe single-producer/single-consumer queue.
//!
//! Bridges the radio callback context, which must never suspend, to a
//! cooperative task, which must never spin. The ring buffer is a
//! [`heapless::spsc::Queue`]; two signals stand in for "data available" and
//! "space available" so either side can park without polling.
//!
//! [`Channel::split`] hands out exactly one [`Sender`] and one
//! [`Receiver`]. Firmware keeps the channel in a `static` and splits it once
//! at startup.
//!
//! A backing array of `N` slots holds at most `N - 1` items: the queue is
//! full when advancing the write index would land on the read index.

use crate::ble::ConnHandle;
use crate::config::MAX_PAYLOAD_LEN;
use crate::error::{Error, QueueError};
use core::hint::spin_loop;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use heapless::spsc::{Consumer, Producer, Queue};
use heapless::Vec;

/// Radio payload buffer moved through the queue without allocation.
pub type Payload = Vec<u8, MAX_PAYLOAD_LEN>;

/// Copy `data` into a [`Payload`].
pub fn payload(data: &[u8]) -> Result<Payload, Error> {
    Vec::from_slice(data).map_err(|_| Error::PayloadTooLong)
}

/// A notification tagged with the connection it arrived on.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Inbound {
    pub peer: ConnHandle,
    pub payload: Payload,
}

impl Inbound {
    pub fn new(peer: ConnHandle, data: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            peer,
            payload: payload(data)?,
        })
    }
}

type Flag = Signal<CriticalSectionRawMutex, ()>;

/// Fixed-capacity queue shared by one producer and one consumer.
pub struct Channel<T, const N: usize> {
    queue: Queue<T, N>,
    /// Raised by the producer, awaited by the consumer.
    data_available: Flag,
    /// Raised by the consumer, awaited by the producer.
    space_available: Flag,
}

impl<T, const N: usize> Channel<T, N> {
    pub const fn new() -> Self {
        Self {
            queue: Queue::new(),
            data_available: Signal::new(),
            space_available: Signal::new(),
        }
    }

    /// Split into the producer and consumer halves.
    pub fn split(&mut self) -> (Sender<'_, T, N>, Receiver<'_, T, N>) {
        let Self {
            queue,
            data_available,
            space_available,
        } = self;
        let data_available: &Flag = data_available;
        let space_available: &Flag = space_available;
        let (producer, consumer) = queue.split();
        (
            Sender {
                producer,
                data_available,
                space_available,
            },
            Receiver {
                consumer,
                data_available,
                space_available,
            },
        )
    }
}

impl<T, const N: usize> Default for Channel<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer half. Callback contexts use [`Sender::put_sync`] with
/// `blocking = false` only.
pub struct Sender<'a, T, const N: usize> {
    producer: Producer<'a, T, N>,
    data_available: &'a Flag,
    space_available: &'a Flag,
}

impl<'a, T, const N: usize> Sender<'a, T, N> {
    /// Enqueue without suspending.
    ///
    /// The consumer is woken either way. When the queue is full and
    /// `blocking` is false the value is dropped and `QueueError::Full`
    /// returned; with `blocking` set this spins until the consumer frees a
    /// slot, so it must only be used where the consumer can preempt.
    pub fn put_sync(&mut self, value: T, blocking: bool) -> Result<(), QueueError> {
        if !self.producer.ready() {
            self.data_available.signal(());
            if !blocking {
                return Err(QueueError::Full);
            }
            while !self.producer.ready() {
                spin_loop();
            }
        }
        self.producer
            .enqueue(value)
            .map_err(|_| QueueError::Full)?;
        self.data_available.signal(());
        Ok(())
    }

    /// Enqueue, suspending while the queue is full.
    pub async fn put(&mut self, value: T) {
        while !self.producer.ready() {
            self.space_available.wait().await;
        }
        // Single producer: the slot seen above cannot be taken by anyone else.
        if self.producer.enqueue(value).is_err() {
            error!("queue: slot vanished under the producer, value dropped");
        }
        self.data_available.signal(());
    }

    pub fn is_full(&self) -> bool {
        !self.producer.ready()
    }

    pub fn is_empty(&self) -> bool {
        self.producer.len() == 0
    }

    pub fn len(&self) -> usize {
        self.producer.len()
    }

    /// Usable slots (`N - 1`).
    pub fn capacity(&self) -> usize {
        self.producer.capacity()
    }
}

/// Consumer half, owned by the application task.
pub struct Receiver<'a, T, const N: usize> {
    consumer: Consumer<'a, T, N>,
    data_available: &'a Flag,
    space_available: &'a Flag,
}

impl<'a, T, const N: usize> Receiver<'a, T, N> {
    /// Dequeue without suspending. Non-blocking calls return
    /// `QueueError::Empty` instead of spinning.
    pub fn get_sync(&mut self, blocking: bool) -> Result<T, QueueError> {
        loop {
            if let Some(value) = self.consumer.dequeue() {
                self.space_available.signal(());
                return Ok(value);
            }
            if !blocking {
                return Err(QueueError::Empty);
            }
            spin_loop();
        }
    }

    /// Dequeue, suspending while the queue is empty.
    pub async fn get(&mut self) -> T {
        loop {
            if let Some(value) = self.consumer.dequeue() {
                self.space_available.signal(());
                return value;
            }
            self.data_available.wait().await;
        }
    }

    pub fn is_full(&self) -> bool {
        self.consumer.len() == self.consumer.capacity()
    }

    pub fn is_empty(&self) -> bool {
        !self.consumer.ready()
    }

    pub fn len(&self) -> usize {
        self.consumer.len()
    }
}
