//! # History Reconstructor
//!
//! Rebuilds a typed audit trail from a key's raw change log.
//!
//! `HistoryReader` is a pull iterator over the ledger cursor. The cursor is
//! closed exactly once: after the exhausted read, after a failed read, or on
//! drop if the reader is abandoned early.

use super::entities::{HistoryEntry, StoredValue, KeyModification};
use super::errors::LedgerError;
use crate::ports::outbound::HistoryCursor;
use chrono::FixedOffset;
use tracing::{debug, warn};

/// Iterator of [`HistoryEntry`] values over one key's change log.
pub struct HistoryReader {
    key: String,
    cursor: Option<Box<dyn HistoryCursor>>,
    offset: FixedOffset,
}

impl HistoryReader {
    /// Wrap an open cursor. Timestamps are rendered at `offset`.
    #[must_use]
    pub fn new(key: impl Into<String>, cursor: Box<dyn HistoryCursor>, offset: FixedOffset) -> Self {
        Self {
            key: key.into(),
            cursor: Some(cursor),
            offset,
        }
    }

    /// Returns true once the underlying cursor has been released.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cursor.is_none()
    }

    fn release(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            if let Err(err) = cursor.close() {
                warn!(key = %self.key, error = %err, "Failed to close history cursor");
            } else {
                debug!(key = %self.key, "History cursor closed");
            }
        }
    }

    fn to_entry(&self, modification: KeyModification) -> HistoryEntry {
        let (value, decode_err) = StoredValue::decode(&modification.value);
        if let Some(err) = decode_err {
            warn!(
                key = %self.key,
                tx_id = %modification.tx_id,
                error = %err,
                "History value is not an asset; keeping raw text"
            );
        }
        HistoryEntry {
            tx_id: modification.tx_id,
            is_delete: modification.is_delete,
            timestamp: modification.timestamp.to_civil(self.offset),
            value,
        }
    }
}

impl Iterator for HistoryReader {
    type Item = Result<HistoryEntry, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let step = self.cursor.as_mut()?.next_modification();
            match step {
                Ok(Some(modification)) => {
                    if modification.value.is_empty() && !modification.is_delete {
                        continue;
                    }
                    if modification.value.is_empty() {
                        // Delete markers carry no snapshot.
                        return Some(Ok(HistoryEntry {
                            tx_id: modification.tx_id,
                            is_delete: true,
                            timestamp: modification.timestamp.to_civil(self.offset),
                            value: StoredValue::Raw(String::new()),
                        }));
                    }
                    return Some(Ok(self.to_entry(modification)));
                }
                Ok(None) => {
                    self.release();
                    return None;
                }
                Err(err) => {
                    self.release();
                    return Some(Err(err));
                }
            }
        }
    }
}

impl Drop for HistoryReader {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Asset, AssetDraft, LedgerTimestamp};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ScriptedCursor {
        steps: VecDeque<Result<Option<KeyModification>, LedgerError>>,
        closes: Arc<AtomicUsize>,
    }

    impl HistoryCursor for ScriptedCursor {
        fn next_modification(&mut self) -> Result<Option<KeyModification>, LedgerError> {
            self.steps.pop_front().unwrap_or(Ok(None))
        }

        fn close(&mut self) -> Result<(), LedgerError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn modification(tx: &str, value: &[u8], is_delete: bool) -> KeyModification {
        KeyModification {
            tx_id: tx.to_string(),
            value: value.to_vec(),
            timestamp: LedgerTimestamp::from_seconds(1_700_000_000),
            is_delete,
        }
    }

    fn reader(
        steps: Vec<Result<Option<KeyModification>, LedgerError>>,
    ) -> (HistoryReader, Arc<AtomicUsize>) {
        let closes = Arc::new(AtomicUsize::new(0));
        let cursor = ScriptedCursor {
            steps: steps.into(),
            closes: closes.clone(),
        };
        let offset = FixedOffset::east_opt(0).unwrap();
        (HistoryReader::new("a1", Box::new(cursor), offset), closes)
    }

    #[test]
    fn test_decodes_and_falls_back() {
        let asset = Asset::from_draft(AssetDraft::new("a1", "blue", 5, "Tom", 300));
        let bytes = serde_json::to_vec(&asset).unwrap();
        let (reader, closes) = reader(vec![
            Ok(Some(modification("t1", &bytes, false))),
            Ok(Some(modification("t2", b"{broken", false))),
        ]);

        let entries: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].value, StoredValue::Decoded(asset));
        assert_eq!(entries[1].value, StoredValue::Raw("{broken".to_string()));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_skips_empty_values_but_keeps_delete_marker() {
        let (reader, closes) = reader(vec![
            Ok(Some(modification("t1", b"", false))),
            Ok(Some(modification("t2", b"", true))),
        ]);
        let entries: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_delete);
        assert_eq!(entries[0].tx_id, "t2");
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_closes_once_on_error() {
        let (mut reader, closes) = reader(vec![Err(LedgerError::Storage("disk".to_string()))]);
        assert!(matches!(reader.next(), Some(Err(LedgerError::Storage(_)))));
        assert!(reader.is_closed());
        assert!(reader.next().is_none());
        drop(reader);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_closes_on_early_drop() {
        let (mut reader, closes) = reader(vec![
            Ok(Some(modification("t1", b"x", false))),
            Ok(Some(modification("t2", b"y", false))),
        ]);
        assert!(reader.next().is_some());
        drop(reader);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_log() {
        let (reader, closes) = reader(vec![]);
        assert_eq!(reader.count(), 0);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }
}
