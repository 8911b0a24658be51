use thiserror::Error;

use crate::models::Chain;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Invalid asset identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Unknown chain in asset identifier: {0}")]
    UnknownChain(String),
}

/// Errors reported by the host's deposit function.
///
/// The adapter never inspects these, it only forwards them (wrapped in a leg specific error
/// where an operation issues more than one deposit).
#[derive(Error, Debug)]
pub enum DepositError {
    #[error("Deposit rejected: {0}")]
    Rejected(String),

    #[error("Failed to broadcast deposit on {0}: {1}")]
    Broadcast(Chain, String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors reported by a wallet capability (`approve` / `is_approved`).
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Allowance query failed: {0}")]
    Allowance(String),

    #[error("Approval transaction failed: {0}")]
    Approval(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
