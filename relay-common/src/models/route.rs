use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Chain, ProtocolChain};

/// Where and how to send funds into the protocol for a single chain.
///
/// Mirrors an entry of the node's `inbound_addresses` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundRoute {
    pub chain: Chain,
    /// Vault address deposits are sent to.
    #[serde(default)]
    pub address: String,
    /// Router contract, only present on EVM chains.
    #[serde(default)]
    pub router: Option<String>,
    /// Gas rate in the chain's own unit. Kept as received, the node reports it as a string.
    #[serde(default)]
    pub gas_rate: String,
    #[serde(default)]
    pub halted: bool,
}

impl InboundRoute {
    /// Route for the protocol's own chain. Deposits there are plain memo transactions, they
    /// have no vault address and cannot be halted through inbound data.
    pub fn protocol_native(protocol: ProtocolChain) -> Self {
        Self {
            chain: protocol.chain(),
            address: String::new(),
            router: None,
            gas_rate: "0".to_string(),
            halted: false,
        }
    }
}

/// Protocol wide halt switches read from mimir.
///
/// A value of `1` or more means the switch is engaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MimirFlags {
    pub halt_global: i64,
    pub halt_protocol: i64,
}

impl MimirFlags {
    pub const HALT_GLOBAL_KEY: &'static str = "HALTCHAINGLOBAL";

    /// Picks the halt switches of `protocol` out of the full mimir key/value map. Keys that are
    /// not set read as disengaged.
    pub fn from_mimir(protocol: ProtocolChain, mimir: &HashMap<String, i64>) -> Self {
        Self {
            halt_global: mimir
                .get(Self::HALT_GLOBAL_KEY)
                .copied()
                .unwrap_or_default(),
            halt_protocol: mimir
                .get(protocol.halt_mimir_key())
                .copied()
                .unwrap_or_default(),
        }
    }

    pub fn is_halted(&self) -> bool {
        self.halt_global >= 1 || self.halt_protocol >= 1
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_deserialize_inbound_route() {
        let raw = r#"
        {
            "chain": "ETH",
            "pub_key": "thorpub1addwnpepq",
            "address": "0x88a6c1e0b4e2a1b7d3f5e6d7c8b9a0f1e2d3c4b5",
            "router": "0xD37BbE5744D730a1d98d8DC97c42F0Ca46aD7146",
            "halted": false,
            "global_trading_paused": false,
            "gas_rate": "12",
            "gas_rate_units": "gwei",
            "outbound_fee": "240000"
        }
        "#;

        let route: InboundRoute = serde_json::from_str(raw).expect("deserialize");

        assert_eq!(
            route,
            InboundRoute {
                chain: Chain::Ethereum,
                address: "0x88a6c1e0b4e2a1b7d3f5e6d7c8b9a0f1e2d3c4b5".to_string(),
                router: Some("0xD37BbE5744D730a1d98d8DC97c42F0Ca46aD7146".to_string()),
                gas_rate: "12".to_string(),
                halted: false,
            }
        );
    }

    #[rstest]
    #[case::nothing_set(&[], false)]
    #[case::global(&[("HALTCHAINGLOBAL", 1)], true)]
    #[case::protocol(&[("HALTTHORCHAIN", 12345)], true)]
    #[case::other_protocol(&[("HALTMAYACHAIN", 1)], false)]
    #[case::disengaged(&[("HALTCHAINGLOBAL", 0), ("HALTTHORCHAIN", 0)], false)]
    fn test_mimir_halt(#[case] entries: &[(&str, i64)], #[case] halted: bool) {
        let mimir = entries
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect::<HashMap<_, _>>();

        let flags = MimirFlags::from_mimir(ProtocolChain::THORChain, &mimir);

        assert_eq!(flags.is_halted(), halted);
    }
}
