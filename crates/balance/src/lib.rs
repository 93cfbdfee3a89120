//! Historical balance lookup for "withdraw everything" requests.
//!
//! The withdrawable amount is the L2 balance at the last block before the
//! fork. This crate provides the [`BalanceOracle`] abstraction and two
//! sources for it: a block-explorer HTTP API and an L2 archive node.

pub mod explorer;
pub mod rpc;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

pub use explorer::ExplorerBalanceOracle;
pub use rpc::RpcBalanceOracle;

/// A native balance at a specific block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// The address holding the balance
    pub holder: Address,
    /// Block height the balance was read at
    pub block: u64,
    /// The balance amount in wei
    pub amount: U256,
}

#[derive(Error, Debug)]
pub enum BalanceError {
    /// Network or node failure, worth retrying
    #[error("Balance request failed: {0}")]
    Transport(String),

    /// The oracle answered with an error
    #[error("Balance API error: {message}: {result}")]
    Api { message: String, result: String },

    /// The oracle answered with something that is not a wei amount
    #[error("Malformed balance: {0:?}")]
    Malformed(String),
}

impl BalanceError {
    /// Whether a retry might succeed.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Source of historical native balances.
pub trait BalanceOracle: Send + Sync {
    /// Native balance of `address` at L2 block `block`.
    fn balance_at(
        &self,
        address: Address,
        block: u64,
    ) -> impl Future<Output = Result<Balance, BalanceError>> + Send;
}
