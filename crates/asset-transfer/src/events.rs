//! # Event Emitter
//!
//! One notification per successful mutation, published on a single named
//! channel when the enclosing transaction commits.
//!
//! | Operation | Payload |
//! |-----------|---------|
//! | create, update, transfer | the post-mutation asset |
//! | delete | `{"ID": id}` |

use crate::domain::entities::Asset;
use crate::ports::outbound::EventEmitter;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default notification channel name.
pub const EVENT_NAME: &str = "chaincodeEvent";

/// Payload of a mutation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetEventPayload {
    /// The asset as written.
    Asset(Asset),
    /// Marker for a removed asset.
    Deleted {
        #[serde(rename = "ID")]
        id: String,
    },
}

impl AssetEventPayload {
    /// Key of the affected asset.
    #[must_use]
    pub fn asset_id(&self) -> &str {
        match self {
            Self::Asset(asset) => &asset.id,
            Self::Deleted { id } => id,
        }
    }

    /// Parse a payload received from the bus.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// An event as published after commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeEvent {
    pub tx_id: String,
    pub event_name: String,
    pub payload: Vec<u8>,
}

impl ChaincodeEvent {
    /// Decode the payload as an [`AssetEventPayload`].
    pub fn asset_payload(&self) -> Result<AssetEventPayload, serde_json::Error> {
        AssetEventPayload::from_bytes(&self.payload)
    }
}

/// Attach `payload` to the current transaction under `name`.
///
/// Fire-and-forget: failures are logged, never returned.
pub fn emit_asset_event<E: EventEmitter + ?Sized>(
    ctx: &mut E,
    name: &str,
    payload: &AssetEventPayload,
) {
    let bytes = match serde_json::to_vec(payload) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(asset_id = %payload.asset_id(), error = %err, "Failed to encode event payload");
            return;
        }
    };
    match ctx.set_event(name, bytes) {
        Ok(()) => debug!(event = name, asset_id = %payload.asset_id(), "Event set"),
        Err(err) => warn!(event = name, error = %err, "Failed to set event"),
    }
}
