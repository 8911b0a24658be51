//! Transaction memos understood by the liquidity protocol.
//!
//! A memo is rendered once per operation and attached to the deposit that carries it. The
//! textual format is owned by the protocol; [`Memo`] only knows how to print it.
use std::fmt;

use num_bigint::BigUint;

use crate::models::Chain;

/// Upper bound of a basis point value (100%).
pub const MAX_BASIS_POINTS: u32 = 10_000;

/// Converts a percentage into basis points, clamped to `[0, 10000]`.
pub fn basis_points(percent: f64) -> u32 {
    let bps = (percent * 100.0).round();
    if bps.is_nan() || bps <= 0.0 {
        0
    } else {
        bps.min(MAX_BASIS_POINTS as f64) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Memo {
    /// Liquidity deposit into the `chain.symbol` pool. `address` pairs the deposit with the
    /// other side of a symmetric position.
    Deposit { chain: Chain, symbol: String, address: Option<String> },
    /// Deposit into the `chain/symbol` savings vault.
    SavingsDeposit { chain: Chain, symbol: String },
    /// Liquidity withdrawal from the `chain.symbol` pool, optionally paid out in
    /// `target_asset` only.
    Withdraw { chain: Chain, symbol: String, basis_points: u32, target_asset: Option<String> },
    /// Withdrawal from the `chain/symbol` savings vault.
    SavingsWithdraw { chain: Chain, symbol: String, basis_points: u32 },
    Bond { address: String },
    Unbond { address: String, amount: BigUint },
    Leave { address: String },
    /// Registers (or updates) a name pointing at `address` on `chain`.
    NameRegister {
        name: String,
        chain: Chain,
        address: String,
        owner: Option<String>,
        preferred_asset: Option<String>,
        expiry_block: Option<u64>,
    },
}

impl fmt::Display for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Memo::Deposit { chain, symbol, address } => {
                write!(f, "+:{chain}.{symbol}")?;
                match address.as_deref() {
                    Some(address) if !address.is_empty() => write!(f, ":{address}"),
                    _ => Ok(()),
                }
            }
            Memo::SavingsDeposit { chain, symbol } => write!(f, "+:{chain}/{symbol}"),
            Memo::Withdraw { chain, symbol, basis_points, target_asset } => {
                write!(f, "-:{chain}.{symbol}:{basis_points}")?;
                match target_asset {
                    Some(target) => write!(f, ":{target}"),
                    None => Ok(()),
                }
            }
            Memo::SavingsWithdraw { chain, symbol, basis_points } => {
                write!(f, "-:{chain}/{symbol}:{basis_points}")
            }
            Memo::Bond { address } => write!(f, "BOND:{address}"),
            Memo::Unbond { address, amount } => write!(f, "UNBOND:{address}:{amount}"),
            Memo::Leave { address } => write!(f, "LEAVE:{address}"),
            Memo::NameRegister { name, chain, address, owner, preferred_asset, expiry_block } => {
                write!(f, "~:{name}:{chain}:{address}")?;
                let mut tail = vec![
                    owner.clone(),
                    preferred_asset.clone(),
                    expiry_block.map(|block| block.to_string()),
                ];
                while matches!(tail.last(), Some(None)) {
                    tail.pop();
                }
                for field in tail {
                    write!(f, ":{}", field.unwrap_or_default())?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::half(50.0, 5_000)]
    #[case::fraction(12.346, 1_235)]
    #[case::full(100.0, 10_000)]
    #[case::above_full(150.0, 10_000)]
    #[case::negative(-3.0, 0)]
    #[case::nan(f64::NAN, 0)]
    fn test_basis_points(#[case] percent: f64, #[case] expected: u32) {
        assert_eq!(basis_points(percent), expected);
    }

    #[rstest]
    #[case::deposit_sym(
        Memo::Deposit { chain: Chain::Bitcoin, symbol: "BTC".into(), address: Some("thor1abc".into()) },
        "+:BTC.BTC:thor1abc"
    )]
    #[case::deposit_no_address(
        Memo::Deposit { chain: Chain::Bitcoin, symbol: "BTC".into(), address: Some(String::new()) },
        "+:BTC.BTC"
    )]
    #[case::savings_deposit(
        Memo::SavingsDeposit { chain: Chain::Ethereum, symbol: "ETH".into() },
        "+:ETH/ETH"
    )]
    #[case::withdraw_target(
        Memo::Withdraw {
            chain: Chain::Ethereum,
            symbol: "ETH".into(),
            basis_points: 5_000,
            target_asset: Some("THOR.RUNE".into()),
        },
        "-:ETH.ETH:5000:THOR.RUNE"
    )]
    #[case::savings_withdraw(
        Memo::SavingsWithdraw { chain: Chain::Bitcoin, symbol: "BTC".into(), basis_points: 10_000 },
        "-:BTC/BTC:10000"
    )]
    #[case::bond(Memo::Bond { address: "thor1node".into() }, "BOND:thor1node")]
    #[case::unbond(
        Memo::Unbond { address: "thor1node".into(), amount: BigUint::from(150_000_000u64) },
        "UNBOND:thor1node:150000000"
    )]
    #[case::leave(Memo::Leave { address: "thor1node".into() }, "LEAVE:thor1node")]
    #[case::name_minimal(
        Memo::NameRegister {
            name: "alice".into(),
            chain: Chain::THORChain,
            address: "thor1alice".into(),
            owner: None,
            preferred_asset: None,
            expiry_block: None,
        },
        "~:alice:THOR:thor1alice"
    )]
    #[case::name_expiry_only(
        Memo::NameRegister {
            name: "alice".into(),
            chain: Chain::Ethereum,
            address: "0xalice".into(),
            owner: Some("thor1owner".into()),
            preferred_asset: None,
            expiry_block: Some(123_456),
        },
        "~:alice:ETH:0xalice:thor1owner::123456"
    )]
    fn test_render_memo(#[case] memo: Memo, #[case] expected: &str) {
        assert_eq!(memo.to_string(), expected);
    }
}
