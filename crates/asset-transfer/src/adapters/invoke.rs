//! # Invocation Adapter
//!
//! Text-in/text-out surface over [`AssetTransferApi`]: a function name plus
//! string arguments in, a JSON document out.
//!
//! | Function | Arguments | Result |
//! |----------|-----------|--------|
//! | `InitLedger` | - | empty |
//! | `CreateAsset` | id, color, size, owner, appraisedValue | asset |
//! | `ReadAsset` | id | asset, or the stored text if it is not one |
//! | `UpdateAsset` | id, color, size, owner, appraisedValue | `true` |
//! | `DeleteAsset` | id | `true` |
//! | `AssetExists` | id | `true` / `false` |
//! | `TransferAsset` | id, newOwner | `true` |
//! | `GetAllAssets` | - | `[{Key, Record}]` |
//! | `GetAssetHistory` | id | `[{TxId, IsDelete, Timestamp, Value}]` |

use crate::domain::entities::AssetDraft;
use crate::domain::errors::{AssetError, LedgerError};
use crate::domain::identity::{IdentityResolver, Principal};
use crate::ports::inbound::AssetTransferApi;
use crate::ports::outbound::{CallerCredential, TransactionContext};
use crate::service::AssetTransferService;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Functions exposed by the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractFunction {
    InitLedger,
    CreateAsset,
    ReadAsset,
    UpdateAsset,
    DeleteAsset,
    AssetExists,
    TransferAsset,
    GetAllAssets,
    GetAssetHistory,
}

impl ContractFunction {
    pub const ALL: [ContractFunction; 9] = [
        Self::InitLedger,
        Self::CreateAsset,
        Self::ReadAsset,
        Self::UpdateAsset,
        Self::DeleteAsset,
        Self::AssetExists,
        Self::TransferAsset,
        Self::GetAllAssets,
        Self::GetAssetHistory,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::InitLedger => "InitLedger",
            Self::CreateAsset => "CreateAsset",
            Self::ReadAsset => "ReadAsset",
            Self::UpdateAsset => "UpdateAsset",
            Self::DeleteAsset => "DeleteAsset",
            Self::AssetExists => "AssetExists",
            Self::TransferAsset => "TransferAsset",
            Self::GetAllAssets => "GetAllAssets",
            Self::GetAssetHistory => "GetAssetHistory",
        }
    }

    /// Number of arguments the function takes.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::InitLedger | Self::GetAllAssets => 0,
            Self::ReadAsset | Self::DeleteAsset | Self::AssetExists | Self::GetAssetHistory => 1,
            Self::TransferAsset => 2,
            Self::CreateAsset | Self::UpdateAsset => 5,
        }
    }

    /// Returns true if the function needs the caller's principal.
    #[must_use]
    pub fn is_gated(self) -> bool {
        matches!(
            self,
            Self::CreateAsset | Self::UpdateAsset | Self::DeleteAsset | Self::TransferAsset
        )
    }
}

impl FromStr for ContractFunction {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| AssetError::UnknownFunction(s.to_string()))
    }
}

impl fmt::Display for ContractFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Routes named invocations to the engine.
pub struct ContractDispatcher<A: AssetTransferApi = AssetTransferService> {
    api: A,
    resolver: IdentityResolver,
}

impl ContractDispatcher<AssetTransferService> {
    /// Dispatcher over `service`, resolving callers with its allowlist.
    #[must_use]
    pub fn new(service: AssetTransferService) -> Self {
        let resolver = service.identity_resolver();
        Self::with_resolver(service, resolver)
    }
}

impl<A: AssetTransferApi> ContractDispatcher<A> {
    #[must_use]
    pub fn with_resolver(api: A, resolver: IdentityResolver) -> Self {
        Self { api, resolver }
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Run `function` with `args` inside `ctx` on behalf of `credential`.
    pub fn invoke(
        &self,
        ctx: &mut dyn TransactionContext,
        credential: &dyn CallerCredential,
        function: &str,
        args: &[String],
    ) -> Result<String, AssetError> {
        let function: ContractFunction = function.parse()?;
        if args.len() != function.arity() {
            return Err(AssetError::InvalidArgument(format!(
                "{function} expects {} argument(s), got {}",
                function.arity(),
                args.len()
            )));
        }

        // Resolved once, before any engine call.
        let principal = if function.is_gated() {
            Some(self.resolver.resolve(credential)?)
        } else {
            None
        };
        debug!(function = %function, tx_id = %ctx.tx_id(), "Invoking");

        match (function, principal.as_ref()) {
            (ContractFunction::InitLedger, _) => {
                self.api.seed_initial_assets(ctx)?;
                Ok(String::new())
            }
            (ContractFunction::CreateAsset, Some(principal)) => {
                let asset = self.api.create_asset(ctx, principal, draft(args)?)?;
                to_json(&asset)
            }
            (ContractFunction::ReadAsset, _) => Ok(self
                .api
                .read_asset(&*ctx, &args[0])?
                .to_text()
                .map_err(LedgerError::from)?),
            (ContractFunction::UpdateAsset, Some(principal)) => {
                to_json(&self.api.update_asset(ctx, principal, draft(args)?)?)
            }
            (ContractFunction::DeleteAsset, Some(principal)) => {
                to_json(&self.api.delete_asset(ctx, principal, &args[0])?)
            }
            (ContractFunction::AssetExists, _) => {
                to_json(&self.api.asset_exists(&*ctx, &args[0])?)
            }
            (ContractFunction::TransferAsset, Some(principal)) => {
                to_json(&self.api.transfer_asset(ctx, principal, &args[0], &args[1])?)
            }
            (ContractFunction::GetAllAssets, _) => to_json(&self.api.get_all_assets(&*ctx)?),
            (ContractFunction::GetAssetHistory, _) => {
                to_json(&self.api.get_asset_history(&*ctx, &args[0])?)
            }
            (gated, None) => Err(AssetError::MalformedIdentity {
                reason: format!("{gated} requires a resolved principal"),
            }),
        }
    }

    /// Resolve `credential` without invoking anything.
    pub fn resolve(&self, credential: &dyn CallerCredential) -> Result<Principal, AssetError> {
        self.resolver.resolve(credential)
    }
}

fn draft(args: &[String]) -> Result<AssetDraft, AssetError> {
    Ok(AssetDraft::new(
        args[0].clone(),
        args[1].clone(),
        parse_amount("size", &args[2])?,
        args[3].clone(),
        parse_amount("appraisedValue", &args[4])?,
    ))
}

fn parse_amount(name: &str, raw: &str) -> Result<u64, AssetError> {
    raw.trim()
        .parse()
        .map_err(|_| AssetError::InvalidArgument(format!("{name} must be an unsigned integer, got {raw:?}")))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, AssetError> {
    Ok(serde_json::to_string(value).map_err(LedgerError::from)?)
}
