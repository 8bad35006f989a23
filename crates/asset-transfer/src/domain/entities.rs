//! # Domain Entities
//!
//! The asset record, its decoded/raw value wrapper, and the history types
//! reconstructed from a key's change log.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize, Serializer};
use tracing::warn;

/// Tag written into seeded records.
pub const DOC_TYPE_ASSET: &str = "asset";

/// Civil-time layout used when rendering history timestamps.
pub const CIVIL_TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

// =============================================================================
// ASSET
// =============================================================================

/// An asset as stored at its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Color")]
    pub color: String,
    #[serde(rename = "Size")]
    pub size: u64,
    #[serde(rename = "Owner")]
    pub owner: String,
    #[serde(rename = "AppraisedValue")]
    pub appraised_value: u64,
    /// Only seeded records carry a document type.
    #[serde(rename = "docType", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
}

impl Asset {
    /// Build an untagged asset from caller-supplied fields.
    #[must_use]
    pub fn from_draft(draft: AssetDraft) -> Self {
        Self {
            id: draft.id,
            color: draft.color,
            size: draft.size,
            owner: draft.owner,
            appraised_value: draft.appraised_value,
            doc_type: None,
        }
    }

    /// Tag the asset with the seed document type.
    #[must_use]
    pub fn tagged(mut self) -> Self {
        self.doc_type = Some(DOC_TYPE_ASSET.to_string());
        self
    }

    /// Same record with `owner` replaced.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }
}

/// Caller-supplied fields for `create` and `update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDraft {
    pub id: String,
    pub color: String,
    pub size: u64,
    pub owner: String,
    pub appraised_value: u64,
}

impl AssetDraft {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        color: impl Into<String>,
        size: u64,
        owner: impl Into<String>,
        appraised_value: u64,
    ) -> Self {
        Self {
            id: id.into(),
            color: color.into(),
            size,
            owner: owner.into(),
            appraised_value,
        }
    }
}

// =============================================================================
// STORED VALUES
// =============================================================================

/// A stored value that either decoded as an [`Asset`] or is carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StoredValue {
    Decoded(Asset),
    Raw(String),
}

impl StoredValue {
    /// Decode `bytes`, falling back to the raw text.
    ///
    /// Returns the decode error alongside the raw value so callers can log it.
    #[must_use]
    pub fn decode(bytes: &[u8]) -> (Self, Option<serde_json::Error>) {
        match serde_json::from_slice::<Asset>(bytes) {
            Ok(asset) => (Self::Decoded(asset), None),
            Err(err) => (
                Self::Raw(String::from_utf8_lossy(bytes).into_owned()),
                Some(err),
            ),
        }
    }

    #[must_use]
    pub fn as_asset(&self) -> Option<&Asset> {
        match self {
            Self::Decoded(asset) => Some(asset),
            Self::Raw(_) => None,
        }
    }

    #[must_use]
    pub fn into_asset(self) -> Option<Asset> {
        match self {
            Self::Decoded(asset) => Some(asset),
            Self::Raw(_) => None,
        }
    }

    /// The value as caller-facing text: decoded records as JSON, raw values verbatim.
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Decoded(asset) => serde_json::to_string(asset),
            Self::Raw(text) => Ok(text.clone()),
        }
    }
}

/// One entry of a full range scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRecord {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Record")]
    pub record: StoredValue,
}

/// A raw key/value pair returned by a range scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

// =============================================================================
// CHANGE LOG
// =============================================================================

/// Transaction timestamp as recorded by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LedgerTimestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl LedgerTimestamp {
    #[must_use]
    pub fn from_seconds(seconds: i64) -> Self {
        Self { seconds, nanos: 0 }
    }

    #[must_use]
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            seconds: now.timestamp(),
            nanos: now.timestamp_subsec_nanos(),
        }
    }

    /// Seconds-resolution civil time at `offset`, or `None` outside chrono's range.
    #[must_use]
    pub fn try_to_civil(self, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
        offset.timestamp_opt(self.seconds, 0).single()
    }

    /// Seconds-resolution civil time at `offset`.
    ///
    /// Out-of-range stamps render as the epoch and are logged with their raw
    /// seconds.
    #[must_use]
    pub fn to_civil(self, offset: FixedOffset) -> DateTime<FixedOffset> {
        self.try_to_civil(offset).unwrap_or_else(|| {
            warn!(
                seconds = self.seconds,
                nanos = self.nanos,
                "Ledger timestamp out of range; rendering as epoch"
            );
            DateTime::<Utc>::UNIX_EPOCH.with_timezone(&offset)
        })
    }
}

/// One entry of a key's change log, as replayed by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyModification {
    pub tx_id: String,
    pub value: Vec<u8>,
    pub timestamp: LedgerTimestamp,
    pub is_delete: bool,
}

/// A reconstructed, typed history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    #[serde(rename = "TxId")]
    pub tx_id: String,
    #[serde(rename = "IsDelete")]
    pub is_delete: bool,
    #[serde(rename = "Timestamp", serialize_with = "serialize_civil_time")]
    pub timestamp: DateTime<FixedOffset>,
    #[serde(rename = "Value")]
    pub value: StoredValue,
}

fn serialize_civil_time<S: Serializer>(
    time: &DateTime<FixedOffset>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format(CIVIL_TIME_FORMAT))
}

// =============================================================================
// TESTS
// =============================================================================
