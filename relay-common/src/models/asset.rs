use std::{fmt, str::FromStr};

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::models::{error::AssetError, Chain, ProtocolChain};

/// An amount of a specific asset, kept in base units.
///
/// Identifiers follow the protocol notation: `CHAIN.SYMBOL` for layer-1 assets and
/// `CHAIN/SYMBOL` for synthetic assets. Token symbols carry their contract address after a
/// dash, e.g. `ETH.USDC-0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetValue {
    pub chain: Chain,
    pub symbol: String,
    pub ticker: String,
    pub address: Option<String>,
    pub decimals: u32,
    pub synth: bool,
    base_value: BigUint,
}

impl AssetValue {
    pub fn new(identifier: &str, decimals: u32, base_value: impl Into<BigUint>) -> Result<Self, AssetError> {
        let (separator, synth) = if identifier.contains('/') { ('/', true) } else { ('.', false) };
        let (chain, symbol) = identifier
            .split_once(separator)
            .filter(|(chain, symbol)| !chain.is_empty() && !symbol.is_empty())
            .ok_or_else(|| AssetError::InvalidIdentifier(identifier.to_string()))?;
        let chain = Chain::from_str(&chain.to_uppercase())
            .map_err(|_| AssetError::UnknownChain(chain.to_string()))?;

        let (ticker, address) = match symbol.split_once('-') {
            Some((ticker, address)) if !address.is_empty() => (ticker, Some(address.to_string())),
            Some(_) => return Err(AssetError::InvalidIdentifier(identifier.to_string())),
            None => (symbol, None),
        };

        Ok(Self {
            chain,
            symbol: symbol.to_string(),
            ticker: ticker.to_string(),
            address,
            decimals,
            synth,
            base_value: base_value.into(),
        })
    }

    /// The gas asset of `chain` holding `base_value` base units.
    pub fn gas_asset(chain: Chain, base_value: impl Into<BigUint>) -> Self {
        let ticker = chain.gas_asset_ticker();
        Self {
            chain,
            symbol: ticker.to_string(),
            ticker: ticker.to_string(),
            address: None,
            decimals: chain.gas_asset_decimals(),
            synth: false,
            base_value: base_value.into(),
        }
    }

    /// Smallest amount of the chain's gas asset the protocol accepts as a deposit.
    ///
    /// Used as the value carrier for deposits where only the memo matters.
    pub fn min_for_chain(chain: Chain) -> Self {
        // (mantissa, digits after the decimal point)
        let (mantissa, scale): (u64, u32) = match chain {
            Chain::Bitcoin | Chain::BitcoinCash | Chain::Litecoin | Chain::Dash => (10_001, 8),
            Chain::Dogecoin => (100_000_001, 8),
            Chain::Ethereum |
            Chain::Avalanche |
            Chain::BinanceSmartChain |
            Chain::Arbitrum |
            Chain::Base => (1, 8),
            Chain::Cosmos | Chain::Kujira => (1, 6),
            Chain::THORChain | Chain::Maya => (0, 0),
        };
        let decimals = chain.gas_asset_decimals();
        let base_value = BigUint::from(mantissa) * BigUint::from(10u32).pow(decimals - scale);
        Self::gas_asset(chain, base_value)
    }

    /// Same asset, different amount.
    pub fn with_base_value(&self, base_value: impl Into<BigUint>) -> Self {
        Self { base_value: base_value.into(), ..self.clone() }
    }

    pub fn base_value(&self) -> &BigUint {
        &self.base_value
    }

    /// The amount as a decimal number. Lossy for amounts beyond f64 precision.
    pub fn to_f64(&self) -> f64 {
        self.base_value
            .to_f64()
            .unwrap_or(f64::INFINITY) /
            10f64.powi(self.decimals as i32)
    }

    pub fn is_positive(&self) -> bool {
        !self.base_value.is_zero()
    }

    pub fn is_zero(&self) -> bool {
        self.base_value.is_zero()
    }

    pub fn is_gas_asset(&self) -> bool {
        !self.synth &&
            self.address.is_none() &&
            self.symbol
                .eq_ignore_ascii_case(self.chain.gas_asset_ticker())
    }

    /// Chain whose inbound route receives deposits of this asset.
    ///
    /// Synthetic assets live on the protocol chain regardless of the chain they track.
    pub fn deposit_chain(&self, protocol: ProtocolChain) -> Chain {
        if self.synth {
            protocol.chain()
        } else {
            self.chain
        }
    }
}

impl fmt::Display for AssetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if self.synth { '/' } else { '.' };
        write!(f, "{}{}{}", self.chain, separator, self.symbol)
    }
}
