//! # Driving Port (Inbound)
//!
//! The operation surface of the asset lifecycle engine. Every mutating
//! operation takes the request's resolved [`Principal`]; the principal is
//! built once at the boundary and never re-derived mid-operation.

use crate::domain::entities::{Asset, AssetDraft, AssetRecord, HistoryEntry, StoredValue};
use crate::domain::errors::AssetError;
use crate::domain::identity::Principal;
use crate::ports::outbound::TransactionContext;

/// Asset lifecycle operations, each run against one host transaction.
pub trait AssetTransferApi {
    /// Write the seed catalog, overwriting any existing values.
    fn seed_initial_assets(&self, ctx: &mut dyn TransactionContext) -> Result<(), AssetError>;

    /// Create a new asset. Requires admin; the key must be absent.
    fn create_asset(
        &self,
        ctx: &mut dyn TransactionContext,
        principal: &Principal,
        draft: AssetDraft,
    ) -> Result<Asset, AssetError>;

    /// Current value of an asset. A value that is not a well-formed asset
    /// comes back as raw text.
    fn read_asset(&self, ctx: &dyn TransactionContext, id: &str) -> Result<StoredValue, AssetError>;

    /// Replace every mutable field of an existing asset. Requires admin.
    fn update_asset(
        &self,
        ctx: &mut dyn TransactionContext,
        principal: &Principal,
        draft: AssetDraft,
    ) -> Result<bool, AssetError>;

    /// Remove an existing asset. Requires admin.
    fn delete_asset(
        &self,
        ctx: &mut dyn TransactionContext,
        principal: &Principal,
        id: &str,
    ) -> Result<bool, AssetError>;

    /// True if a non-empty value is present at `id`.
    fn asset_exists(&self, ctx: &dyn TransactionContext, id: &str) -> Result<bool, AssetError>;

    /// Replace only the owner of an existing asset. Requires admin.
    fn transfer_asset(
        &self,
        ctx: &mut dyn TransactionContext,
        principal: &Principal,
        id: &str,
        new_owner: &str,
    ) -> Result<bool, AssetError>;

    /// Every stored record in key order.
    fn get_all_assets(&self, ctx: &dyn TransactionContext) -> Result<Vec<AssetRecord>, AssetError>;

    /// The change log of `id`, oldest first.
    fn get_asset_history(
        &self,
        ctx: &dyn TransactionContext,
        id: &str,
    ) -> Result<Vec<HistoryEntry>, AssetError>;
}
