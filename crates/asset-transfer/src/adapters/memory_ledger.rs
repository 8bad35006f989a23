//! # In-Memory Ledger
//!
//! Versioned key/value store with a per-key change log and buffered
//! transactions.
//!
//! ## Transaction model
//!
//! - `begin()` opens a [`LedgerTransaction`] with a fresh tx id and timestamp
//! - reads observe committed state only, and record the version they saw
//! - writes and the (single) event are buffered in the transaction
//! - `commit()` first re-checks every recorded read; a key (or range) that
//!   changed since it was read fails the commit with [`LedgerError::Conflict`]
//!   and nothing is applied
//! - otherwise it applies every write atomically, appends one change-log
//!   entry per written key, then publishes the buffered event on the bus
//! - dropping an uncommitted transaction discards its writes and event

use crate::adapters::event_bus::ChaincodeEventBus;
use crate::domain::entities::{KeyModification, KeyValue, LedgerTimestamp};
use crate::domain::errors::LedgerError;
use crate::events::ChaincodeEvent;
use crate::ports::outbound::{EventEmitter, HistoryCursor, LedgerStore, TransactionContext};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Default)]
struct LedgerState {
    current: BTreeMap<String, Vec<u8>>,
    history: HashMap<String, Vec<KeyModification>>,
    /// Version of the last write to each key, deletes included.
    versions: HashMap<String, u64>,
    version_clock: u64,
    committed_transactions: u64,
}

impl LedgerState {
    /// Zero for a key that was never written.
    fn version_of(&self, key: &str) -> u64 {
        self.versions.get(key).copied().unwrap_or(0)
    }

    fn next_version(&mut self) -> u64 {
        self.version_clock += 1;
        self.version_clock
    }
}

/// Shared in-memory ledger.
#[derive(Debug, Clone)]
pub struct InMemoryLedger {
    state: Arc<RwLock<LedgerState>>,
    bus: Arc<ChaincodeEventBus>,
    open_cursors: Arc<AtomicUsize>,
}

impl InMemoryLedger {
    /// Empty ledger with its own event bus.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bus(Arc::new(ChaincodeEventBus::new()))
    }

    /// Empty ledger publishing on `bus`.
    #[must_use]
    pub fn with_bus(bus: Arc<ChaincodeEventBus>) -> Self {
        Self {
            state: Arc::new(RwLock::new(LedgerState::default())),
            bus,
            open_cursors: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The bus committed events are published on.
    #[must_use]
    pub fn bus(&self) -> Arc<ChaincodeEventBus> {
        self.bus.clone()
    }

    /// Open a transaction stamped with the current time.
    #[must_use]
    pub fn begin(&self) -> LedgerTransaction<'_> {
        self.begin_at(LedgerTimestamp::now())
    }

    /// Open a transaction stamped with `timestamp`.
    #[must_use]
    pub fn begin_at(&self, timestamp: LedgerTimestamp) -> LedgerTransaction<'_> {
        let tx_id = Uuid::new_v4().simple().to_string();
        debug!(tx_id = %tx_id, "Transaction opened");
        LedgerTransaction {
            ledger: self,
            tx_id,
            timestamp,
            reads: RefCell::new(BTreeMap::new()),
            range_reads: RefCell::new(Vec::new()),
            writes: BTreeMap::new(),
            event: None,
        }
    }

    /// History cursors opened and not yet closed.
    #[must_use]
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Number of keys holding a current value.
    pub fn len(&self) -> Result<usize, LedgerError> {
        Ok(self.read()?.current.len())
    }

    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }

    /// Transactions committed so far.
    pub fn committed_transactions(&self) -> Result<u64, LedgerError> {
        Ok(self.read()?.committed_transactions)
    }

    /// Store `value` at `key` outside any transaction, without a change-log
    /// entry. Used to stage foreign or legacy values.
    pub fn put_raw(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        let mut state = self.write()?;
        let version = state.next_version();
        state.versions.insert(key.to_string(), version);
        state.current.insert(key.to_string(), value);
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, LedgerState>, LedgerError> {
        self.state.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.state.write().map_err(|_| LedgerError::LockPoisoned)
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TRANSACTION
// =============================================================================

/// Summary of a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub tx_id: String,
    pub keys_written: usize,
    pub event_published: bool,
}

/// Keys a range scan returned, with the versions it saw.
#[derive(Debug)]
struct RangeRead {
    lower: Bound<String>,
    upper: Bound<String>,
    seen: Vec<(String, u64)>,
}

impl RangeRead {
    /// First key whose presence or version differs from what the scan saw.
    fn conflict(&self, state: &LedgerState) -> Option<String> {
        let mut current = state
            .current
            .range((self.lower.clone(), self.upper.clone()))
            .map(|(key, _)| key);
        let mut seen = self.seen.iter();
        loop {
            match (current.next(), seen.next()) {
                (None, None) => return None,
                (Some(key), Some((seen_key, version)))
                    if key == seen_key && state.version_of(key) == *version => {}
                (Some(key), _) => return Some(key.clone()),
                (None, Some((seen_key, _))) => return Some(seen_key.clone()),
            }
        }
    }
}

/// One invocation's view of the ledger.
pub struct LedgerTransaction<'a> {
    ledger: &'a InMemoryLedger,
    tx_id: String,
    timestamp: LedgerTimestamp,
    /// First version seen for each key read.
    reads: RefCell<BTreeMap<String, u64>>,
    range_reads: RefCell<Vec<RangeRead>>,
    /// `None` marks a delete.
    writes: BTreeMap<String, Option<Vec<u8>>>,
    event: Option<ChaincodeEvent>,
}

impl LedgerTransaction<'_> {
    /// Keys with a buffered write.
    #[must_use]
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// The buffered event, if any.
    #[must_use]
    pub fn pending_event(&self) -> Option<&ChaincodeEvent> {
        self.event.as_ref()
    }

    /// Apply buffered writes and publish the buffered event.
    ///
    /// Fails with [`LedgerError::Conflict`] if anything this transaction read
    /// was changed by a transaction that committed after the read.
    pub fn commit(self) -> Result<CommitReceipt, LedgerError> {
        let keys_written = self.writes.len();
        {
            let mut state = self.ledger.write()?;
            if let Some(key) = self.conflicting_read(&state) {
                warn!(tx_id = %self.tx_id, key = %key, "Read conflict; transaction discarded");
                return Err(LedgerError::Conflict { key });
            }

            let version = state.next_version();
            for (key, write) in self.writes {
                state.versions.insert(key.clone(), version);
                let modification = match write {
                    Some(value) => {
                        state.current.insert(key.clone(), value.clone());
                        KeyModification {
                            tx_id: self.tx_id.clone(),
                            value,
                            timestamp: self.timestamp,
                            is_delete: false,
                        }
                    }
                    None => {
                        state.current.remove(&key);
                        KeyModification {
                            tx_id: self.tx_id.clone(),
                            value: Vec::new(),
                            timestamp: self.timestamp,
                            is_delete: true,
                        }
                    }
                };
                state.history.entry(key).or_default().push(modification);
            }
            state.committed_transactions += 1;
        }

        let event_published = match self.event {
            Some(event) => {
                self.ledger.bus.publish(event);
                true
            }
            None => false,
        };

        info!(tx_id = %self.tx_id, keys_written, event_published, "Transaction committed");
        Ok(CommitReceipt {
            tx_id: self.tx_id,
            keys_written,
            event_published,
        })
    }

    fn conflicting_read(&self, state: &LedgerState) -> Option<String> {
        let stale = self
            .reads
            .borrow()
            .iter()
            .find(|(key, seen)| state.version_of(key) != **seen)
            .map(|(key, _)| key.clone());
        stale.or_else(|| {
            self.range_reads
                .borrow()
                .iter()
                .find_map(|range| range.conflict(state))
        })
    }

    /// Discard buffered writes and event.
    pub fn rollback(self) {
        debug!(
            tx_id = %self.tx_id,
            discarded = self.writes.len(),
            "Transaction rolled back"
        );
    }
}

impl LedgerStore for LedgerTransaction<'_> {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        let state = self.ledger.read()?;
        self.reads
            .borrow_mut()
            .entry(key.to_string())
            .or_insert_with(|| state.version_of(key));
        Ok(state.current.get(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        if key.is_empty() {
            return Err(LedgerError::EmptyKey);
        }
        self.writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    fn delete_state(&mut self, key: &str) -> Result<(), LedgerError> {
        if key.is_empty() {
            return Err(LedgerError::EmptyKey);
        }
        self.writes.insert(key.to_string(), None);
        Ok(())
    }

    fn state_by_range(&self, start: &str, end: &str) -> Result<Vec<KeyValue>, LedgerError> {
        let lower = if start.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start.to_string())
        };
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end.to_string())
        };
        if let (Bound::Included(lo), Bound::Excluded(hi)) = (&lower, &upper) {
            if lo >= hi {
                return Ok(Vec::new());
            }
        }

        let state = self.ledger.read()?;
        let rows: Vec<KeyValue> = state
            .current
            .range((lower.clone(), upper.clone()))
            .map(|(key, value)| KeyValue {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        self.range_reads.borrow_mut().push(RangeRead {
            lower,
            upper,
            seen: rows
                .iter()
                .map(|row| (row.key.clone(), state.version_of(&row.key)))
                .collect(),
        });
        Ok(rows)
    }

    fn history_for_key(&self, key: &str) -> Result<Box<dyn HistoryCursor>, LedgerError> {
        let entries: VecDeque<_> = self
            .ledger
            .read()?
            .history
            .get(key)
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default();
        self.ledger.open_cursors.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryHistoryCursor {
            entries,
            open_cursors: self.ledger.open_cursors.clone(),
            closed: false,
        }))
    }
}

impl EventEmitter for LedgerTransaction<'_> {
    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), LedgerError> {
        if name.is_empty() {
            return Err(LedgerError::EmptyEventName);
        }
        self.event = Some(ChaincodeEvent {
            tx_id: self.tx_id.clone(),
            event_name: name.to_string(),
            payload,
        });
        Ok(())
    }
}

impl TransactionContext for LedgerTransaction<'_> {
    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn timestamp(&self) -> LedgerTimestamp {
        self.timestamp
    }
}

// =============================================================================
// HISTORY CURSOR
// =============================================================================

/// Snapshot cursor over one key's change log.
struct MemoryHistoryCursor {
    entries: VecDeque<KeyModification>,
    open_cursors: Arc<AtomicUsize>,
    closed: bool,
}

impl HistoryCursor for MemoryHistoryCursor {
    fn next_modification(&mut self) -> Result<Option<KeyModification>, LedgerError> {
        if self.closed {
            return Err(LedgerError::CursorClosed);
        }
        Ok(self.entries.pop_front())
    }

    fn close(&mut self) -> Result<(), LedgerError> {
        if self.closed {
            return Err(LedgerError::CursorClosed);
        }
        self.closed = true;
        self.open_cursors.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
