//! # Protocol adapter
//!
//! Assembles deposits for the liquidity protocol (pool deposits, liquidity provisioning,
//! savings, node bonding, name registration) and hands them to the host's deposit function.
//!
//! Every operation is a fresh fetch, compute and dispatch cycle. Two leg operations issue
//! their deposits one after the other and never roll back: if the second leg fails the first
//! one has already been dispatched, and the returned error says which leg failed.
use std::{collections::HashMap, str::FromStr, sync::Arc};

use relay_common::{
    memo::{basis_points, Memo},
    models::{
        asset::AssetValue,
        error::{DepositError, WalletError},
        route::InboundRoute,
        Chain, NetworkParams,
    },
    traits::{ApprovalRequest, DepositHandler, DepositRequest, WalletHandle},
    TxHash,
};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::{
    config::AdapterConfig,
    rpc::{InboundDataClient, RPCError},
};

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("No inbound route found for chain {0}")]
    RouteNotFound(Chain),

    #[error("Chain {0} is halted")]
    ChainHalted(Chain),

    /// No wallet for the chain, or the wallet lacks the capability the call needs.
    #[error("No suitable wallet found for chain {0}")]
    WalletNotFound(Chain),

    #[error("Address required for approval on {0} is missing")]
    AddressMissing(Chain),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Base asset address is required but could not be resolved")]
    BaseAddressMissing,

    #[error("Gas rate {1:?} of chain {0} is not a number")]
    InvalidGasRate(Chain, String),

    #[error("Base asset deposit of create liquidity failed: {0}")]
    CreateLiquidityBaseError(#[source] Box<AdapterError>),

    /// The base leg was dispatched as `base_tx` before the asset leg failed.
    #[error("Asset deposit of create liquidity failed after base deposit {base_tx}: {source}")]
    CreateLiquidityAssetError {
        base_tx: TxHash,
        #[source]
        source: Box<AdapterError>,
    },

    #[error("Base asset deposit of add liquidity failed: {0}")]
    AddLiquidityBaseError(#[source] Box<AdapterError>),

    /// `base_tx` is set when a base leg was dispatched before the asset leg failed.
    #[error("Asset deposit of add liquidity failed: {source}")]
    AddLiquidityAssetError {
        base_tx: Option<TxHash>,
        #[source]
        source: Box<AdapterError>,
    },

    #[error(transparent)]
    Rpc(#[from] RPCError),

    #[error(transparent)]
    Deposit(#[from] DepositError),

    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Gas fee tier applied on top of the inbound gas rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeeOption {
    Average,
    #[default]
    Fast,
    Fastest,
}

impl FeeOption {
    pub fn multiplier(&self) -> f64 {
        match self {
            FeeOption::Average => 1.2,
            FeeOption::Fast => 1.5,
            FeeOption::Fastest => 2.0,
        }
    }

    /// `floor(gas_rate) * multiplier`. Only the leading integer part of the rate is used.
    pub fn fee_rate(&self, route: &InboundRoute) -> Result<f64, AdapterError> {
        let digits = route
            .gas_rate
            .trim()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect::<String>();
        let gas_rate = digits
            .parse::<u64>()
            .map_err(|_| AdapterError::InvalidGasRate(route.chain, route.gas_rate.clone()))?;
        Ok(gas_rate as f64 * self.multiplier())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalMode {
    CheckOnly,
    Approve,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// Result of an allowance check.
    Checked(bool),
    /// Approval transaction hash, or `"approved"` when no approval was necessary.
    Approved(TxHash),
}

/// Which side(s) of a liquidity position an operation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiquidityMode {
    Sym,
    BaseAsset,
    Asset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAction {
    Bond,
    Unbond,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SavingsAction {
    Add,
    /// Withdraw `percent` (0-100) of the saver position.
    Withdraw { percent: f64 },
}

/// Transactions dispatched by a two leg liquidity operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LiquidityTxs {
    pub base_tx: Option<TxHash>,
    pub asset_tx: Option<TxHash>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterParams {
    /// Registration fee paid in the protocol's native asset.
    pub asset_value: AssetValue,
    pub name: String,
    pub chain: Chain,
    pub address: String,
    pub owner: Option<String>,
    pub preferred_asset: Option<String>,
    pub expiry_block: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddLiquidityPartParams {
    pub asset_value: AssetValue,
    /// Pool identifier in `CHAIN.SYMBOL` form.
    pub pool_address: String,
    pub address: Option<String>,
    pub symmetric: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddLiquidityParams {
    pub base_asset_value: AssetValue,
    pub asset_value: AssetValue,
    pub base_asset_addr: Option<String>,
    pub asset_addr: Option<String>,
    /// The asset side of a symmetric position is waiting for its base side.
    pub is_pending_symm_asset: bool,
    pub mode: LiquidityMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavingsParams {
    pub asset_value: AssetValue,
    /// Overrides the generated memo.
    pub memo: Option<String>,
    pub action: SavingsAction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawParams {
    /// Overrides the generated memo.
    pub memo: Option<String>,
    pub asset_value: AssetValue,
    pub percent: f64,
    pub from: LiquidityMode,
    pub to: LiquidityMode,
}

/// Façade over the liquidity protocol.
///
/// Holds no state besides its static configuration; collaborators are shared through `Arc`
/// so a host can keep using them elsewhere.
pub struct ProtocolAdapter {
    deposit_handler: Arc<dyn DepositHandler>,
    inbound_client: Arc<dyn InboundDataClient>,
    params: NetworkParams,
    wallets: HashMap<Chain, WalletHandle>,
}

impl ProtocolAdapter {
    pub fn new(
        deposit_handler: Arc<dyn DepositHandler>,
        inbound_client: Arc<dyn InboundDataClient>,
        config: AdapterConfig,
        wallets: HashMap<Chain, WalletHandle>,
    ) -> Self {
        Self { deposit_handler, inbound_client, params: config.into(), wallets }
    }

    pub fn params(&self) -> &NetworkParams {
        &self.params
    }

    fn protocol_chain(&self) -> Chain {
        self.params.protocol.chain()
    }

    fn wallet_address(&self, chain: Chain) -> Option<String> {
        self.wallets
            .get(&chain)
            .and_then(|wallet| wallet.address.clone())
            .filter(|address| !address.is_empty())
    }

    /// Returns the inbound route of `chain`.
    ///
    /// The protocol's own chain is answered locally without a node request and is never
    /// halted.
    #[instrument(skip(self))]
    pub async fn resolve_inbound_route(&self, chain: Chain) -> Result<InboundRoute, AdapterError> {
        if chain == self.protocol_chain() {
            return Ok(InboundRoute::protocol_native(self.params.protocol));
        }

        let route = self
            .inbound_client
            .get_inbound_routes(&self.params)
            .await?
            .into_iter()
            .find(|route| route.chain == chain)
            .ok_or(AdapterError::RouteNotFound(chain))?;

        if route.halted {
            warn!(%chain, "Inbound route is halted");
            return Err(AdapterError::ChainHalted(chain));
        }
        Ok(route)
    }

    /// Checks or sets the router's allowance for `asset_value`.
    ///
    /// Gas assets, assets of non EVM chains and synthetic assets need no allowance; for them
    /// this returns `Checked(true)` / `Approved("approved")` without touching the wallet.
    #[instrument(skip(self, asset_value), fields(asset = %asset_value))]
    pub async fn check_or_set_approval(
        &self,
        asset_value: &AssetValue,
        mode: ApprovalMode,
    ) -> Result<ApprovalOutcome, AdapterError> {
        let chain = asset_value.deposit_chain(self.params.protocol);
        let route = self
            .resolve_inbound_route(chain)
            .await?;

        if asset_value.synth || !chain.is_evm() || asset_value.is_gas_asset() {
            return Ok(match mode {
                ApprovalMode::CheckOnly => ApprovalOutcome::Checked(true),
                ApprovalMode::Approve => ApprovalOutcome::Approved("approved".to_string()),
            });
        }

        let wallet = self
            .wallets
            .get(&chain)
            .ok_or(AdapterError::WalletNotFound(chain))?;
        match mode {
            ApprovalMode::CheckOnly => {
                let is_approved = wallet
                    .is_approved
                    .clone()
                    .ok_or(AdapterError::WalletNotFound(chain))?;
                let request = self.approval_request(asset_value, route)?;
                debug!(?request, "Checking allowance");
                Ok(ApprovalOutcome::Checked(is_approved.is_approved(request).await?))
            }
            ApprovalMode::Approve => {
                let approve = wallet
                    .approve
                    .clone()
                    .ok_or(AdapterError::WalletNotFound(chain))?;
                let request = self.approval_request(asset_value, route)?;
                debug!(?request, "Approving allowance");
                Ok(ApprovalOutcome::Approved(approve.approve(request).await?))
            }
        }
    }

    fn approval_request(
        &self,
        asset_value: &AssetValue,
        route: InboundRoute,
    ) -> Result<ApprovalRequest, AdapterError> {
        let chain = route.chain;
        Ok(ApprovalRequest {
            amount: asset_value.base_value().clone(),
            asset_address: asset_value
                .address
                .clone()
                .ok_or(AdapterError::AddressMissing(chain))?,
            from_address: self
                .wallet_address(chain)
                .ok_or(AdapterError::AddressMissing(chain))?,
            spender_address: route
                .router
                .ok_or(AdapterError::AddressMissing(chain))?,
        })
    }

    /// Deposits on the protocol chain itself. The action is carried by the memo alone.
    #[instrument(skip(self, asset_value), fields(asset = %asset_value))]
    pub async fn deposit_to_protocol(
        &self,
        asset_value: AssetValue,
        memo: String,
    ) -> Result<TxHash, AdapterError> {
        let flags = self
            .inbound_client
            .get_mimir_flags(&self.params)
            .await?;
        if flags.is_halted() {
            warn!(?flags, "Protocol chain is halted");
            return Err(AdapterError::ChainHalted(self.protocol_chain()));
        }

        debug!("Dispatching protocol deposit");
        let tx = self
            .deposit_handler
            .deposit(DepositRequest {
                asset_value,
                recipient: String::new(),
                memo,
                router: None,
                fee_rate: None,
            })
            .await?;
        Ok(tx)
    }

    /// Deposits into the pool vault of the asset's chain.
    #[instrument(skip(self, asset_value), fields(asset = %asset_value))]
    pub async fn deposit_to_pool(
        &self,
        asset_value: AssetValue,
        memo: String,
        fee_option: FeeOption,
    ) -> Result<TxHash, AdapterError> {
        let route = self
            .resolve_inbound_route(asset_value.deposit_chain(self.params.protocol))
            .await?;
        let fee_rate = fee_option.fee_rate(&route)?;

        debug!(recipient = %route.address, fee_rate, "Dispatching pool deposit");
        let tx = self
            .deposit_handler
            .deposit(DepositRequest {
                asset_value,
                recipient: route.address,
                memo,
                router: route.router,
                fee_rate: Some(fee_rate),
            })
            .await?;
        Ok(tx)
    }

    /// Registers a name.
    #[instrument(skip(self, params), fields(name = %params.name))]
    pub async fn register(&self, params: RegisterParams) -> Result<TxHash, AdapterError> {
        let memo = Memo::NameRegister {
            name: params.name,
            chain: params.chain,
            address: params.address,
            owner: params.owner,
            preferred_asset: params.preferred_asset,
            expiry_block: params.expiry_block,
        };
        self.deposit_to_protocol(params.asset_value, memo.to_string())
            .await
    }

    /// Bonds `asset_value` to, unbonds `asset_value` from, or leaves the node at `address`.
    ///
    /// Only bonding transfers the given value; unbond and leave send the protocol chain's
    /// minimum amount as memo carrier.
    #[instrument(skip(self, asset_value), fields(asset = %asset_value))]
    pub async fn node_action(
        &self,
        action: NodeAction,
        asset_value: AssetValue,
        address: String,
    ) -> Result<TxHash, AdapterError> {
        let memo = match action {
            NodeAction::Bond => Memo::Bond { address },
            NodeAction::Unbond => {
                Memo::Unbond { address, amount: asset_value.base_value().clone() }
            }
            NodeAction::Leave => Memo::Leave { address },
        };
        let value = match action {
            NodeAction::Bond => asset_value,
            NodeAction::Unbond | NodeAction::Leave => {
                AssetValue::min_for_chain(self.protocol_chain())
            }
        };
        self.deposit_to_protocol(value, memo.to_string())
            .await
    }

    /// Opens a new symmetric position: base asset first, then the pool asset.
    #[instrument(skip_all, fields(base = %base_asset_value, asset = %asset_value))]
    pub async fn create_liquidity(
        &self,
        base_asset_value: AssetValue,
        asset_value: AssetValue,
    ) -> Result<LiquidityTxs, AdapterError> {
        if !base_asset_value.is_positive() || !asset_value.is_positive() {
            return Err(AdapterError::InvalidParams(
                "Base asset and asset amounts must both be greater than zero".to_string(),
            ));
        }

        let base_address = self.wallet_address(self.protocol_chain());
        let asset_address = self.wallet_address(asset_value.chain);

        let base_memo = Memo::Deposit {
            chain: asset_value.chain,
            symbol: asset_value.symbol.clone(),
            address: asset_address,
        };
        let base_tx = self
            .deposit_to_pool(base_asset_value, base_memo.to_string(), FeeOption::default())
            .await
            .map_err(|e| AdapterError::CreateLiquidityBaseError(Box::new(e)))?;

        let asset_memo = Memo::Deposit {
            chain: asset_value.chain,
            symbol: asset_value.symbol.clone(),
            address: base_address,
        };
        let asset_tx = match self
            .deposit_to_pool(asset_value, asset_memo.to_string(), FeeOption::default())
            .await
        {
            Ok(tx) => tx,
            Err(e) => {
                warn!(%base_tx, "Asset deposit failed after base deposit was dispatched");
                return Err(AdapterError::CreateLiquidityAssetError {
                    base_tx,
                    source: Box::new(e),
                });
            }
        };

        Ok(LiquidityTxs { base_tx: Some(base_tx), asset_tx: Some(asset_tx) })
    }

    /// Adds one side of a position to the pool identified by `pool_address`.
    #[instrument(skip_all, fields(pool = %params.pool_address, symmetric = params.symmetric))]
    pub async fn add_liquidity_part(
        &self,
        params: AddLiquidityPartParams,
    ) -> Result<TxHash, AdapterError> {
        let address = params
            .address
            .filter(|address| !address.is_empty());
        if params.symmetric && address.is_none() {
            return Err(AdapterError::InvalidParams(
                "Address is required for a symmetric deposit".to_string(),
            ));
        }

        let (chain, symbol) = params
            .pool_address
            .split_once('.')
            .ok_or_else(|| {
                AdapterError::InvalidParams(format!("Invalid pool {}", params.pool_address))
            })?;
        let chain = Chain::from_str(&chain.to_uppercase())
            .map_err(|_| AdapterError::InvalidParams(format!("Unknown pool chain {chain}")))?;

        let memo = Memo::Deposit {
            chain,
            symbol: symbol.to_string(),
            address: if params.symmetric { address } else { None },
        };
        self.deposit_to_pool(params.asset_value, memo.to_string(), FeeOption::default())
            .await
    }

    /// Adds liquidity on the sides selected by `mode`, base asset leg first.
    #[instrument(skip_all, fields(mode = ?params.mode, asset = %params.asset_value))]
    pub async fn add_liquidity(
        &self,
        params: AddLiquidityParams,
    ) -> Result<LiquidityTxs, AdapterError> {
        let AddLiquidityParams {
            base_asset_value,
            asset_value,
            base_asset_addr,
            asset_addr,
            is_pending_symm_asset,
            mode,
        } = params;

        let base_transfer = base_asset_value.is_positive() &&
            matches!(mode, LiquidityMode::Sym | LiquidityMode::BaseAsset);
        let asset_transfer = asset_value.is_positive() &&
            matches!(mode, LiquidityMode::Sym | LiquidityMode::Asset);

        if !base_transfer && !asset_transfer {
            return Err(AdapterError::InvalidParams(
                "Nothing to deposit for the selected mode".to_string(),
            ));
        }

        let include_base_address = base_transfer || is_pending_symm_asset;
        let base_address = if include_base_address {
            let address = base_asset_addr
                .filter(|address| !address.is_empty())
                .or_else(|| self.wallet_address(self.protocol_chain()));
            Some(address.ok_or(AdapterError::BaseAddressMissing)?)
        } else {
            None
        };
        let asset_address = if asset_transfer || mode == LiquidityMode::Sym {
            asset_addr
                .filter(|address| !address.is_empty())
                .or_else(|| self.wallet_address(asset_value.chain))
        } else {
            None
        };

        let base_tx = if base_transfer {
            let memo = Memo::Deposit {
                chain: asset_value.chain,
                symbol: asset_value.symbol.clone(),
                address: asset_address,
            };
            let tx = self
                .deposit_to_pool(base_asset_value, memo.to_string(), FeeOption::default())
                .await
                .map_err(|e| AdapterError::AddLiquidityBaseError(Box::new(e)))?;
            Some(tx)
        } else {
            None
        };

        let asset_tx = if asset_transfer {
            let memo = Memo::Deposit {
                chain: asset_value.chain,
                symbol: asset_value.symbol.clone(),
                address: base_address,
            };
            match self
                .deposit_to_pool(asset_value, memo.to_string(), FeeOption::default())
                .await
            {
                Ok(tx) => Some(tx),
                Err(e) => {
                    if let Some(base_tx) = &base_tx {
                        warn!(%base_tx, "Asset deposit failed after base deposit was dispatched");
                    }
                    return Err(AdapterError::AddLiquidityAssetError {
                        base_tx,
                        source: Box::new(e),
                    });
                }
            }
        } else {
            None
        };

        Ok(LiquidityTxs { base_tx, asset_tx })
    }

    /// Deposits into or withdraws from the asset's savings vault.
    #[instrument(skip_all, fields(asset = %params.asset_value, action = ?params.action))]
    pub async fn savings(&self, params: SavingsParams) -> Result<TxHash, AdapterError> {
        let SavingsParams { asset_value, memo, action } = params;
        let memo = memo.unwrap_or_else(|| {
            let memo = match action {
                SavingsAction::Add => Memo::SavingsDeposit {
                    chain: asset_value.chain,
                    symbol: asset_value.symbol.clone(),
                },
                SavingsAction::Withdraw { percent } => Memo::SavingsWithdraw {
                    chain: asset_value.chain,
                    symbol: asset_value.symbol.clone(),
                    basis_points: basis_points(percent),
                },
            };
            memo.to_string()
        });
        let value = match action {
            SavingsAction::Add => asset_value,
            SavingsAction::Withdraw { .. } => AssetValue::min_for_chain(asset_value.chain),
        };
        self.deposit_to_pool(value, memo, FeeOption::default())
            .await
    }

    /// Withdraws `percent` of a liquidity position held on the `from` side, paid out to the
    /// `to` side.
    #[instrument(skip_all, fields(asset = %params.asset_value, from = ?params.from, to = ?params.to))]
    pub async fn withdraw(&self, params: WithdrawParams) -> Result<TxHash, AdapterError> {
        let WithdrawParams { memo, asset_value, percent, from, to } = params;

        let target_asset = match (from, to) {
            (LiquidityMode::Sym | LiquidityMode::Asset, LiquidityMode::BaseAsset) => {
                Some(AssetValue::gas_asset(self.protocol_chain(), 0u64).to_string())
            }
            (LiquidityMode::Sym, LiquidityMode::Sym) |
            (LiquidityMode::BaseAsset, _) |
            (LiquidityMode::Asset, _) => None,
            (LiquidityMode::Sym, LiquidityMode::Asset) => Some(asset_value.to_string()),
        };
        let value = AssetValue::min_for_chain(match from {
            LiquidityMode::Asset => asset_value.chain,
            LiquidityMode::Sym | LiquidityMode::BaseAsset => self.protocol_chain(),
        });

        let memo = memo.unwrap_or_else(|| {
            Memo::Withdraw {
                chain: asset_value.chain,
                symbol: asset_value.symbol.clone(),
                basis_points: basis_points(percent),
                target_asset,
            }
            .to_string()
        });
        self.deposit_to_pool(value, memo, FeeOption::default())
            .await
    }
}
