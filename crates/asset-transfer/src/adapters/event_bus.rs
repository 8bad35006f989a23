//! # Event Bus
//!
//! Broadcasts committed mutation events to any number of listeners.
//!
//! Uses `tokio::sync::broadcast` for multi-producer, multi-consumer delivery.
//! Publishing never blocks and never fails: with no listeners the event is
//! dropped.

use crate::events::ChaincodeEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Events buffered per listener before it starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was dropped.
    #[error("Event bus closed")]
    Closed,
}

/// In-memory event bus.
#[derive(Debug)]
pub struct ChaincodeEventBus {
    sender: broadcast::Sender<ChaincodeEvent>,
    events_published: AtomicU64,
}

impl ChaincodeEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            events_published: AtomicU64::new(0),
        }
    }

    /// Publish a committed event. Returns the number of listeners reached.
    pub fn publish(&self, event: ChaincodeEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        let tx_id = event.tx_id.clone();
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(tx_id = %tx_id, receivers, "Event published");
                receivers
            }
            Err(_) => {
                warn!(tx_id = %tx_id, "Event dropped (no receivers)");
                0
            }
        }
    }

    /// Listen for events named `event_name`, or for every event when `None`.
    #[must_use]
    pub fn subscribe(&self, event_name: Option<&str>) -> EventSubscription {
        EventSubscription {
            receiver: self.sender.subscribe(),
            event_name: event_name.map(str::to_string),
        }
    }

    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

impl Default for ChaincodeEventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A listener handle.
pub struct EventSubscription {
    receiver: broadcast::Receiver<ChaincodeEvent>,
    event_name: Option<String>,
}

impl EventSubscription {
    fn matches(&self, event: &ChaincodeEvent) -> bool {
        self.event_name
            .as_deref()
            .map_or(true, |name| name == event.event_name)
    }

    /// Next matching event, or `None` once the bus is dropped.
    pub async fn recv(&mut self) -> Option<ChaincodeEvent> {
        loop {
            let event = match self.receiver.recv().await {
                Ok(e) => e,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some events dropped");
                    continue;
                }
            };
            if self.matches(&event) {
                return Some(event);
            }
        }
    }

    /// Next matching event without waiting.
    pub fn try_recv(&mut self) -> Result<Option<ChaincodeEvent>, SubscriptionError> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(e) => e,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };
            if self.matches(&event) {
                return Ok(Some(event));
            }
        }
    }
}
