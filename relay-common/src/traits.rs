//! Contracts of the collaborators the host application plugs into the adapter.
use std::{fmt, sync::Arc};

use async_trait::async_trait;
use num_bigint::BigUint;

use crate::{
    models::{
        asset::AssetValue,
        error::{DepositError, WalletError},
    },
    TxHash,
};

/// A fully assembled deposit, ready to be signed and broadcast by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositRequest {
    pub asset_value: AssetValue,
    /// Inbound vault address. Empty for deposits on the protocol chain itself, those are
    /// routed by their memo alone.
    pub recipient: String,
    pub memo: String,
    pub router: Option<String>,
    pub fee_rate: Option<f64>,
}

/// The host's chain agnostic deposit primitive.
///
/// Implementations own signing, broadcasting and any retry policy.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait DepositHandler: Send + Sync {
    async fn deposit(&self, request: DepositRequest) -> Result<TxHash, DepositError>;
}

/// Parameters of an ERC20 style allowance check or approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalRequest {
    /// Allowance in base units.
    pub amount: BigUint,
    pub asset_address: String,
    pub from_address: String,
    pub spender_address: String,
}

#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait AllowanceCapability: Send + Sync {
    /// Whether `spender_address` may already move `amount` on behalf of `from_address`.
    async fn is_approved(&self, request: ApprovalRequest) -> Result<bool, WalletError>;
}

#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait ApproveCapability: Send + Sync {
    /// Sends an approval transaction and returns its hash.
    async fn approve(&self, request: ApprovalRequest) -> Result<TxHash, WalletError>;
}

/// Per chain wallet as exposed by the host.
///
/// Every capability is optional: a wallet for a chain without allowances simply leaves the
/// approval slots empty.
#[derive(Clone, Default)]
pub struct WalletHandle {
    pub address: Option<String>,
    pub approve: Option<Arc<dyn ApproveCapability>>,
    pub is_approved: Option<Arc<dyn AllowanceCapability>>,
}

impl WalletHandle {
    pub fn new(address: impl Into<String>) -> Self {
        Self { address: Some(address.into()), ..Default::default() }
    }

    pub fn with_approve(mut self, approve: Arc<dyn ApproveCapability>) -> Self {
        self.approve = Some(approve);
        self
    }

    pub fn with_is_approved(mut self, is_approved: Arc<dyn AllowanceCapability>) -> Self {
        self.is_approved = Some(is_approved);
        self
    }
}

impl fmt::Debug for WalletHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletHandle")
            .field("address", &self.address)
            .field("approve", &self.approve.is_some())
            .field("is_approved", &self.is_approved.is_some())
            .finish()
    }
}
