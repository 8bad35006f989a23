//! # Asset Lifecycle Engine
//!
//! Runs each operation as one read/compute/write sequence against the host
//! transaction. The engine keeps no state between calls.
//!
//! ## Presence state machine (per key)
//!
//! ```text
//!            create (admin)               delete (admin)
//!   absent ─────────────────→ present ─────────────────→ absent
//!                              │   ↑
//!                              └───┘ update / transfer (admin)
//! ```
//!
//! Preconditions are checked before anything is buffered, so a failed call
//! leaves neither a write nor an event in the transaction.

use crate::config::{AssetConfig, ConfigError, DEFAULT_UTC_OFFSET_SECONDS};
use crate::domain::entities::{Asset, AssetDraft, AssetRecord, HistoryEntry, StoredValue};
use crate::domain::errors::{AssetError, LedgerError};
use crate::domain::history::HistoryReader;
use crate::domain::identity::{IdentityResolver, Principal};
use crate::domain::policy::{AccessPolicy, Operation};
use crate::domain::seed::seed_assets;
use crate::events::{emit_asset_event, AssetEventPayload};
use crate::ports::inbound::AssetTransferApi;
use crate::ports::outbound::{LedgerStore, TransactionContext};
use chrono::{FixedOffset, Offset, Utc};
use tracing::{debug, info, instrument, warn};

/// The asset lifecycle engine.
#[derive(Debug, Clone)]
pub struct AssetTransferService {
    config: AssetConfig,
    policy: AccessPolicy,
    offset: FixedOffset,
}

impl AssetTransferService {
    /// Create the engine from a validated configuration.
    pub fn new(config: AssetConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let offset = config.utc_offset()?;
        Ok(Self {
            config,
            policy: AccessPolicy::new(),
            offset,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AssetConfig {
        &self.config
    }

    /// Identity resolver sharing this engine's admin allowlist.
    #[must_use]
    pub fn identity_resolver(&self) -> IdentityResolver {
        IdentityResolver::new(&self.config)
    }

    /// Present means a value exists at `id` and is non-empty.
    fn exists<S: LedgerStore + ?Sized>(ctx: &S, id: &str) -> Result<bool, AssetError> {
        Ok(ctx.get_state(id)?.is_some_and(|value| !value.is_empty()))
    }

    fn load_bytes<S: LedgerStore + ?Sized>(ctx: &S, id: &str) -> Result<Vec<u8>, AssetError> {
        match ctx.get_state(id)? {
            Some(bytes) if !bytes.is_empty() => Ok(bytes),
            _ => Err(AssetError::NotFound { id: id.to_string() }),
        }
    }

    /// Typed load; an undecodable value is `Corrupted`.
    fn load<S: LedgerStore + ?Sized>(ctx: &S, id: &str) -> Result<Asset, AssetError> {
        let bytes = Self::load_bytes(ctx, id)?;
        serde_json::from_slice(&bytes).map_err(|err| AssetError::Corrupted {
            id: id.to_string(),
            reason: err.to_string(),
        })
    }

    fn store(ctx: &mut dyn TransactionContext, asset: &Asset) -> Result<(), AssetError> {
        let bytes = serde_json::to_vec(asset).map_err(LedgerError::from)?;
        ctx.put_state(&asset.id, bytes)?;
        Ok(())
    }

    fn authorize(&self, principal: &Principal, operation: Operation) -> Result<(), AssetError> {
        self.policy
            .authorize(&principal.role, operation)
            .inspect_err(|_| {
                warn!(
                    principal = %principal.id,
                    role = %principal.role,
                    operation = %operation,
                    "Access denied"
                );
            })
    }

    fn emit(&self, ctx: &mut dyn TransactionContext, payload: &AssetEventPayload) {
        emit_asset_event(ctx, &self.config.event_name, payload);
    }
}

impl Default for AssetTransferService {
    fn default() -> Self {
        Self {
            config: AssetConfig::default(),
            policy: AccessPolicy::new(),
            offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix()),
        }
    }
}

impl AssetTransferApi for AssetTransferService {
    #[instrument(skip(self, ctx), fields(tx_id = %ctx.tx_id()))]
    fn seed_initial_assets(&self, ctx: &mut dyn TransactionContext) -> Result<(), AssetError> {
        for asset in seed_assets() {
            Self::store(ctx, &asset)?;
            info!(asset_id = %asset.id, "Asset initialized");
        }
        Ok(())
    }

    #[instrument(skip(self, ctx, principal, draft), fields(asset_id = %draft.id, principal = %principal.id))]
    fn create_asset(
        &self,
        ctx: &mut dyn TransactionContext,
        principal: &Principal,
        draft: AssetDraft,
    ) -> Result<Asset, AssetError> {
        self.authorize(principal, Operation::Create)?;
        if Self::exists(&*ctx, &draft.id)? {
            return Err(AssetError::AlreadyExists { id: draft.id });
        }

        let asset = Asset::from_draft(draft);
        Self::store(ctx, &asset)?;
        self.emit(ctx, &AssetEventPayload::Asset(asset.clone()));
        info!(owner = %asset.owner, "Asset created");
        Ok(asset)
    }

    fn read_asset(&self, ctx: &dyn TransactionContext, id: &str) -> Result<StoredValue, AssetError> {
        let (value, decode_err) = StoredValue::decode(&Self::load_bytes(ctx, id)?);
        match decode_err {
            Some(err) => warn!(asset_id = %id, error = %err, "Stored value is not an asset; keeping raw text"),
            None => debug!(asset_id = %id, "Asset read"),
        }
        Ok(value)
    }

    #[instrument(skip(self, ctx, principal, draft), fields(asset_id = %draft.id, principal = %principal.id))]
    fn update_asset(
        &self,
        ctx: &mut dyn TransactionContext,
        principal: &Principal,
        draft: AssetDraft,
    ) -> Result<bool, AssetError> {
        self.authorize(principal, Operation::Update)?;
        if !Self::exists(&*ctx, &draft.id)? {
            return Err(AssetError::NotFound { id: draft.id });
        }

        let asset = Asset::from_draft(draft);
        Self::store(ctx, &asset)?;
        self.emit(ctx, &AssetEventPayload::Asset(asset));
        info!("Asset updated");
        Ok(true)
    }

    #[instrument(skip(self, ctx, principal), fields(principal = %principal.id))]
    fn delete_asset(
        &self,
        ctx: &mut dyn TransactionContext,
        principal: &Principal,
        id: &str,
    ) -> Result<bool, AssetError> {
        self.authorize(principal, Operation::Delete)?;
        if !Self::exists(&*ctx, id)? {
            return Err(AssetError::NotFound { id: id.to_string() });
        }

        ctx.delete_state(id)?;
        self.emit(ctx, &AssetEventPayload::Deleted { id: id.to_string() });
        info!("Asset deleted");
        Ok(true)
    }

    fn asset_exists(&self, ctx: &dyn TransactionContext, id: &str) -> Result<bool, AssetError> {
        Self::exists(ctx, id)
    }

    #[instrument(skip(self, ctx, principal), fields(principal = %principal.id))]
    fn transfer_asset(
        &self,
        ctx: &mut dyn TransactionContext,
        principal: &Principal,
        id: &str,
        new_owner: &str,
    ) -> Result<bool, AssetError> {
        self.authorize(principal, Operation::Transfer)?;
        let current = Self::load(&*ctx, id)?;
        let previous_owner = current.owner.clone();

        let asset = current.with_owner(new_owner);
        Self::store(ctx, &asset)?;
        self.emit(ctx, &AssetEventPayload::Asset(asset));
        info!(from = %previous_owner, to = %new_owner, "Asset transferred");
        Ok(true)
    }

    fn get_all_assets(&self, ctx: &dyn TransactionContext) -> Result<Vec<AssetRecord>, AssetError> {
        let records = ctx
            .state_by_range("", "")?
            .into_iter()
            .map(|kv| {
                let (record, decode_err) = StoredValue::decode(&kv.value);
                if let Some(err) = decode_err {
                    warn!(key = %kv.key, error = %err, "Stored value is not an asset; keeping raw text");
                }
                AssetRecord {
                    key: kv.key,
                    record,
                }
            })
            .collect::<Vec<_>>();
        debug!(count = records.len(), "Listed assets");
        Ok(records)
    }

    #[instrument(skip(self, ctx))]
    fn get_asset_history(
        &self,
        ctx: &dyn TransactionContext,
        id: &str,
    ) -> Result<Vec<HistoryEntry>, AssetError> {
        let cursor = ctx.history_for_key(id)?;
        let entries = HistoryReader::new(id, cursor, self.offset).collect::<Result<Vec<_>, _>>()?;
        debug!(count = entries.len(), "History reconstructed");
        Ok(entries)
    }
}

// =============================================================================
// TESTS
// =============================================================================
