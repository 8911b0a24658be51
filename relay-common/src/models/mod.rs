pub mod asset;
pub mod error;
pub mod route;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Chains a deposit can originate from.
///
/// Serialised and parsed as the protocol's chain identifiers (`ETH`, `THOR`, ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumString, Display,
)]
pub enum Chain {
    #[serde(rename = "ETH")]
    #[strum(serialize = "ETH")]
    Ethereum,
    #[serde(rename = "AVAX")]
    #[strum(serialize = "AVAX")]
    Avalanche,
    #[serde(rename = "BSC")]
    #[strum(serialize = "BSC")]
    BinanceSmartChain,
    #[serde(rename = "ARB")]
    #[strum(serialize = "ARB")]
    Arbitrum,
    #[serde(rename = "BASE")]
    #[strum(serialize = "BASE")]
    Base,
    #[serde(rename = "BTC")]
    #[strum(serialize = "BTC")]
    Bitcoin,
    #[serde(rename = "BCH")]
    #[strum(serialize = "BCH")]
    BitcoinCash,
    #[serde(rename = "LTC")]
    #[strum(serialize = "LTC")]
    Litecoin,
    #[serde(rename = "DOGE")]
    #[strum(serialize = "DOGE")]
    Dogecoin,
    #[serde(rename = "DASH")]
    #[strum(serialize = "DASH")]
    Dash,
    #[serde(rename = "GAIA")]
    #[strum(serialize = "GAIA")]
    Cosmos,
    #[serde(rename = "KUJI")]
    #[strum(serialize = "KUJI")]
    Kujira,
    #[serde(rename = "THOR")]
    #[strum(serialize = "THOR")]
    THORChain,
    #[serde(rename = "MAYA")]
    #[strum(serialize = "MAYA")]
    Maya,
}

impl Chain {
    /// Whether token transfers on this chain go through an ERC20 style allowance.
    pub fn is_evm(&self) -> bool {
        matches!(
            self,
            Chain::Ethereum |
                Chain::Avalanche |
                Chain::BinanceSmartChain |
                Chain::Arbitrum |
                Chain::Base
        )
    }

    /// Ticker of the asset gas is paid in.
    pub fn gas_asset_ticker(&self) -> &'static str {
        match self {
            Chain::Ethereum | Chain::Arbitrum | Chain::Base => "ETH",
            Chain::Avalanche => "AVAX",
            Chain::BinanceSmartChain => "BNB",
            Chain::Bitcoin => "BTC",
            Chain::BitcoinCash => "BCH",
            Chain::Litecoin => "LTC",
            Chain::Dogecoin => "DOGE",
            Chain::Dash => "DASH",
            Chain::Cosmos => "ATOM",
            Chain::Kujira => "KUJI",
            Chain::THORChain => "RUNE",
            Chain::Maya => "CACAO",
        }
    }

    /// Decimals of the gas asset.
    pub fn gas_asset_decimals(&self) -> u32 {
        match self {
            Chain::Ethereum |
            Chain::Avalanche |
            Chain::BinanceSmartChain |
            Chain::Arbitrum |
            Chain::Base => 18,
            Chain::Cosmos | Chain::Kujira => 6,
            Chain::Maya => 10,
            Chain::Bitcoin |
            Chain::BitcoinCash |
            Chain::Litecoin |
            Chain::Dogecoin |
            Chain::Dash |
            Chain::THORChain => 8,
        }
    }
}

/// The chain hosting the liquidity protocol an adapter talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
pub enum ProtocolChain {
    #[default]
    #[serde(rename = "thorchain")]
    #[strum(serialize = "thorchain")]
    THORChain,
    #[serde(rename = "maya")]
    #[strum(serialize = "maya")]
    Maya,
}

impl ProtocolChain {
    pub fn chain(&self) -> Chain {
        match self {
            ProtocolChain::THORChain => Chain::THORChain,
            ProtocolChain::Maya => Chain::Maya,
        }
    }

    /// Mimir key that halts the protocol chain itself.
    pub fn halt_mimir_key(&self) -> &'static str {
        match self {
            ProtocolChain::THORChain => "HALTTHORCHAIN",
            ProtocolChain::Maya => "HALTMAYACHAIN",
        }
    }

    /// Path segment of the node API (`/thorchain/...`, `/mayachain/...`).
    pub fn api_prefix(&self) -> &'static str {
        match self {
            ProtocolChain::THORChain => "thorchain",
            ProtocolChain::Maya => "mayachain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Network {
    #[default]
    Mainnet,
    Stagenet,
}

/// Selects which protocol deployment a collaborator call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NetworkParams {
    pub protocol: ProtocolChain,
    pub network: Network,
}

impl NetworkParams {
    pub fn new(protocol: ProtocolChain, network: Network) -> Self {
        Self { protocol, network }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::eth("ETH", Chain::Ethereum)]
    #[case::bsc("BSC", Chain::BinanceSmartChain)]
    #[case::cosmos("GAIA", Chain::Cosmos)]
    #[case::thor("THOR", Chain::THORChain)]
    #[case::maya("MAYA", Chain::Maya)]
    fn test_chain_identifier(#[case] identifier: &str, #[case] chain: Chain) {
        assert_eq!(Chain::from_str(identifier).unwrap(), chain);
        assert_eq!(chain.to_string(), identifier);
        assert_eq!(serde_json::to_string(&chain).unwrap(), format!("\"{identifier}\""));
    }

    #[test]
    fn test_evm_chains() {
        assert!(Chain::Arbitrum.is_evm());
        assert!(Chain::Avalanche.is_evm());
        assert!(!Chain::Bitcoin.is_evm());
        assert!(!Chain::THORChain.is_evm());
    }

    #[test]
    fn test_protocol_chain_from_config_string() {
        let params: NetworkParams =
            serde_json::from_str(r#"{"protocol": "maya", "network": "stagenet"}"#).unwrap();

        assert_eq!(params, NetworkParams::new(ProtocolChain::Maya, Network::Stagenet));
        assert_eq!(params.protocol.chain(), Chain::Maya);
        assert_eq!(params.protocol.halt_mimir_key(), "HALTMAYACHAIN");
    }
}
