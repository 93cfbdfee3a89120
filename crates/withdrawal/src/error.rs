use alloy_primitives::{B256, U256};
use balance::BalanceError;
use client::ChainError;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can stop a forced withdrawal run. None of these are
/// retried: a run either completes or terminates.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid destination address {0:?}")]
    InvalidAddress(String),

    #[error("Invalid nonce {0:?}: expected a decimal integer")]
    InvalidNonce(String),

    #[error("Invalid value {0:?}: expected an amount in wei or \"all\"")]
    InvalidValue(String),

    #[error("Value should be greater than 0")]
    NonPositiveValue,

    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("Refusing to run against production chain {chain_id}")]
    ProductionChain { chain_id: u64 },

    #[error("Balance oracle failed: {0}")]
    Oracle(#[from] BalanceError),

    #[error(
        "Insufficient funds: balance of {balance} wei does not cover the {reserved} wei L2 fee reservation"
    )]
    InsufficientFunds { balance: U256, reserved: U256 },

    #[error("{step} failed: {source}")]
    Chain {
        step: &'static str,
        #[source]
        source: ChainError,
    },

    #[error("{step} transaction {tx_hash} reverted")]
    Reverted { step: &'static str, tx_hash: B256 },

    #[error("Delayed messages up to {total_messages} are already included")]
    AlreadyIncluded { total_messages: U256 },

    #[error("Failed to decode {event}: {reason}")]
    Decode { event: &'static str, reason: String },
}

impl Error {
    /// Wrap a chain error with the stage it interrupted.
    pub fn chain(step: &'static str) -> impl Fn(ChainError) -> Self {
        move |source| Self::Chain { step, source }
    }
}
