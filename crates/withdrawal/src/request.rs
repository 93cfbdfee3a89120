//! Caller input validation.
//!
//! Everything here runs before the chain is touched, so a malformed request
//! never costs a transaction.

use crate::{types::l2_fee_reservation, Error, Result, WithdrawalRequest};
use alloy_primitives::{Address, U256};
use balance::BalanceOracle;
use serde::Serialize;
use std::{fmt, str::FromStr};
use tracing::info;

/// Requested withdrawal amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSpec {
    /// Exact amount in wei
    Exact(U256),
    /// Whole pre-fork balance minus the L2 fee reservation
    All,
}

impl FromStr for ValueSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "all" {
            return Ok(Self::All);
        }

        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => U256::from_str_radix(hex, 16),
            None => U256::from_str_radix(s, 10),
        };

        parsed
            .map(Self::Exact)
            .map_err(|_| Error::InvalidValue(s.to_string()))
    }
}

impl fmt::Display for ValueSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(value) => write!(f, "{value} wei"),
            Self::All => f.write_str("all"),
        }
    }
}

/// Parse a destination address. Accepts 40 hex digits with an optional `0x`
/// prefix; mixed-case input must carry a valid EIP-55 checksum.
pub fn parse_destination(input: &str) -> Result<Address> {
    let trimmed = input.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidAddress(input.to_string()));
    }

    let mixed_case = hex.bytes().any(|b| b.is_ascii_lowercase())
        && hex.bytes().any(|b| b.is_ascii_uppercase());

    let parsed = if mixed_case {
        Address::parse_checksummed(format!("0x{hex}"), None).ok()
    } else {
        Address::from_str(hex).ok()
    };

    parsed.ok_or_else(|| Error::InvalidAddress(input.to_string()))
}

pub fn parse_nonce(input: &str) -> Result<u64> {
    input
        .trim()
        .parse()
        .map_err(|_| Error::InvalidNonce(input.to_string()))
}

/// Raw caller input, as typed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalInput {
    pub nonce: String,
    pub value: String,
    pub destination: String,
}

impl WithdrawalInput {
    pub fn new(
        nonce: impl Into<String>,
        value: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            nonce: nonce.into(),
            value: value.into(),
            destination: destination.into(),
        }
    }

    /// Syntactic validation. The destination is checked first.
    pub fn parse(&self) -> Result<ParsedInput> {
        let destination = parse_destination(&self.destination)?;
        let nonce = parse_nonce(&self.nonce)?;
        let value = self.value.parse()?;

        Ok(ParsedInput {
            nonce,
            value,
            destination,
        })
    }
}

/// Input that passed syntactic validation; the value may still be `all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedInput {
    pub nonce: u64,
    pub value: ValueSpec,
    pub destination: Address,
}

impl ParsedInput {
    /// Resolve the value and build the request. `all` looks up the balance of
    /// the destination at the L2 fork block.
    pub async fn resolve<O: BalanceOracle>(
        self,
        oracle: &O,
        l2_fork_block: Option<u64>,
    ) -> Result<WithdrawalRequest> {
        let value = match self.value {
            ValueSpec::Exact(value) => value,
            ValueSpec::All => {
                let block = l2_fork_block.ok_or(Error::MissingConfig("l2_fork_block"))?;
                let balance = oracle.balance_at(self.destination, block).await?;
                let value = withdrawable_after_fee(balance.amount)?;

                info!(
                    holder = %balance.holder,
                    block,
                    balance = %balance.amount,
                    value = %value,
                    "Resolved withdrawal of the whole balance"
                );
                value
            }
        };

        WithdrawalRequest::new(self.nonce, value, self.destination)
    }
}

/// Balance left once the L2 fee reservation is taken out. Zero or less is an
/// error.
pub fn withdrawable_after_fee(balance: U256) -> Result<U256> {
    let reserved = l2_fee_reservation();
    balance
        .checked_sub(reserved)
        .filter(|value| !value.is_zero())
        .ok_or(Error::InsufficientFunds { balance, reserved })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use balance::{Balance, BalanceError};

    const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    struct FixedOracle(U256);

    impl BalanceOracle for FixedOracle {
        async fn balance_at(&self, holder: Address, block: u64) -> Result<Balance, BalanceError> {
            Ok(Balance {
                holder,
                block,
                amount: self.0,
            })
        }
    }

    struct FailingOracle;

    impl BalanceOracle for FailingOracle {
        async fn balance_at(&self, _: Address, _: u64) -> Result<Balance, BalanceError> {
            Err(BalanceError::Transport("connection refused".to_string()))
        }
    }

    #[test]
    fn test_parse_destination() {
        let expected = address!("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");

        assert_eq!(parse_destination(CHECKSUMMED).unwrap(), expected);
        assert_eq!(
            parse_destination("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap(),
            expected
        );
        assert_eq!(
            parse_destination("5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").unwrap(),
            expected
        );
        assert_eq!(
            parse_destination(" 0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed ").unwrap(),
            expected
        );
    }

    #[test]
    fn test_parse_destination_rejects_malformed() {
        let bad_checksum = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD";

        for input in [
            "",
            "0x",
            "0x1234",
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed00",
            "0xzzaeb6053f3e94c9b9a09f33669435e7ef1beaed",
            bad_checksum,
        ] {
            assert!(
                matches!(parse_destination(input), Err(Error::InvalidAddress(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_nonce() {
        assert_eq!(parse_nonce("7").unwrap(), 7);
        assert!(matches!(parse_nonce("-1"), Err(Error::InvalidNonce(_))));
        assert!(matches!(parse_nonce("0x07"), Err(Error::InvalidNonce(_))));
        assert!(matches!(parse_nonce("seven"), Err(Error::InvalidNonce(_))));
    }

    #[test]
    fn test_value_spec() {
        assert_eq!("all".parse::<ValueSpec>().unwrap(), ValueSpec::All);
        for token in ["ALL", "All", "everything"] {
            assert!(matches!(
                token.parse::<ValueSpec>(),
                Err(Error::InvalidValue(_))
            ));
        }
        assert_eq!(
            "1000".parse::<ValueSpec>().unwrap(),
            ValueSpec::Exact(U256::from(1000))
        );
        assert_eq!(
            "0x3e8".parse::<ValueSpec>().unwrap(),
            ValueSpec::Exact(U256::from(1000))
        );
        assert!(matches!(
            "-1".parse::<ValueSpec>(),
            Err(Error::InvalidValue(_))
        ));
        assert!(matches!(
            "1.5".parse::<ValueSpec>(),
            Err(Error::InvalidValue(_))
        ));
    }

    #[test]
    fn test_input_checks_destination_first() {
        let input = WithdrawalInput::new("not-a-nonce", "nope", "0x1234");
        assert!(matches!(input.parse(), Err(Error::InvalidAddress(_))));

        let input = WithdrawalInput::new("not-a-nonce", "nope", CHECKSUMMED);
        assert!(matches!(input.parse(), Err(Error::InvalidNonce(_))));
    }

    #[test]
    fn test_withdrawable_after_fee() {
        let reserved = l2_fee_reservation();

        assert_eq!(
            withdrawable_after_fee(U256::from(1_000_000_000_000_000u64)).unwrap(),
            U256::from(988_000_000_000_000u64)
        );
        assert!(matches!(
            withdrawable_after_fee(reserved),
            Err(Error::InsufficientFunds { .. })
        ));
        assert!(matches!(
            withdrawable_after_fee(U256::from(1)),
            Err(Error::InsufficientFunds { .. })
        ));
        assert_eq!(
            withdrawable_after_fee(reserved + U256::from(1)).unwrap(),
            U256::from(1)
        );
    }

    #[tokio::test]
    async fn test_resolve_exact_value_skips_oracle() {
        let parsed = WithdrawalInput::new("1", "1000", CHECKSUMMED).parse().unwrap();

        let request = parsed.resolve(&FailingOracle, None).await.unwrap();
        assert_eq!(request.value, U256::from(1000));
        assert_eq!(request.nonce, 1);
    }

    #[tokio::test]
    async fn test_resolve_all() {
        let parsed = WithdrawalInput::new("1", "all", CHECKSUMMED).parse().unwrap();
        let oracle = FixedOracle(U256::from(1_000_000_000_000_000u64));

        let request = parsed.resolve(&oracle, Some(22_207_816)).await.unwrap();
        assert_eq!(request.value, U256::from(988_000_000_000_000u64));

        assert!(matches!(
            parsed.resolve(&oracle, None).await,
            Err(Error::MissingConfig(_))
        ));
        assert!(matches!(
            parsed.resolve(&FixedOracle(U256::ZERO), Some(1)).await,
            Err(Error::InsufficientFunds { .. })
        ));
        assert!(matches!(
            parsed.resolve(&FailingOracle, Some(1)).await,
            Err(Error::Oracle(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_zero_exact_value() {
        let parsed = WithdrawalInput::new("1", "0", CHECKSUMMED).parse().unwrap();
        assert!(matches!(
            parsed.resolve(&FailingOracle, None).await,
            Err(Error::NonPositiveValue)
        ));
    }
}
