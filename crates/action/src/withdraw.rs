use crate::{ensure_success, Action};
use alloy_primitives::{utils::format_ether, B256, U256};
use binding::arbitrum::IDelayedInbox::sendWithdrawEthToForkCall;
use client::{ChainError, L1Chain, TxReceipt};
use tracing::info;
use withdrawal::{
    extract_delayed_message,
    types::{L2_GAS_LIMIT, L2_MAX_FEE_PER_GAS},
    Error, Result, WithdrawalRequest,
};

const STEP: &str = "sendWithdrawEthToFork";

/// Receipt of a previously submitted transaction. A transaction that is not
/// mined yet is an error.
pub async fn fetch_withdrawal_receipt<C: L1Chain>(chain: &C, tx_hash: B256) -> Result<TxReceipt> {
    chain
        .transaction_receipt(tx_hash)
        .await
        .map_err(Error::chain("getTransactionReceipt"))?
        .ok_or(Error::Chain {
            step: "getTransactionReceipt",
            source: ChainError::Pending(tx_hash),
        })
}

/// Queues the withdrawal in the delayed inbox.
pub struct WithdrawAction<C> {
    chain: C,
    request: WithdrawalRequest,
    /// Only set for a withdrawal that was submitted by an earlier run
    tx_hash: Option<B256>,
}

impl<C: L1Chain> WithdrawAction<C> {
    pub const fn new(chain: C, request: WithdrawalRequest) -> Self {
        Self {
            chain,
            request,
            tx_hash: None,
        }
    }

    /// Track a withdrawal that was already submitted.
    pub fn with_tx_hash(mut self, tx_hash: B256) -> Self {
        self.tx_hash = Some(tx_hash);
        self
    }

    /// Call data for the inbox, in the contract's argument order.
    pub fn call(&self) -> sendWithdrawEthToForkCall {
        sendWithdrawEthToForkCall {
            gasLimit: U256::from(L2_GAS_LIMIT),
            maxFeePerGas: U256::from(L2_MAX_FEE_PER_GAS),
            nonce: U256::from(self.request.nonce),
            value: self.request.value,
            withdrawTo: self.request.destination,
        }
    }

    /// Receipt of the tracked withdrawal, if it succeeded and queued a
    /// delayed message.
    async fn submitted_receipt(&self) -> Result<Option<TxReceipt>> {
        let Some(tx_hash) = self.tx_hash else {
            return Ok(None);
        };

        let receipt = self
            .chain
            .transaction_receipt(tx_hash)
            .await
            .map_err(Error::chain("getTransactionReceipt"))?;

        Ok(receipt.filter(|r| r.status && extract_delayed_message(r).is_ok()))
    }
}

impl<C: L1Chain> Action for WithdrawAction<C> {
    type Output = TxReceipt;

    async fn is_ready(&self) -> Result<bool> {
        Ok(!self.request.value.is_zero())
    }

    async fn is_completed(&self) -> Result<bool> {
        Ok(self.submitted_receipt().await?.is_some())
    }

    async fn execute(&mut self) -> Result<TxReceipt> {
        if let Some(receipt) = self.submitted_receipt().await? {
            info!(
                tx_hash = %receipt.transaction_hash,
                "Withdrawal already queued, reusing its receipt"
            );
            return Ok(receipt);
        }

        if !self.is_ready().await? {
            return Err(Error::NonPositiveValue);
        }

        info!(
            nonce = self.request.nonce,
            value = %self.request.value,
            destination = %self.request.destination,
            "Submitting withdrawal to the delayed inbox"
        );

        let receipt = self
            .chain
            .send_withdraw_eth_to_fork(self.call())
            .await
            .map_err(Error::chain(STEP))?;
        let receipt = ensure_success(STEP, receipt)?;

        info!(
            tx_hash = %receipt.transaction_hash,
            block_number = receipt.block_number,
            gas_used = receipt.gas_used,
            "Withdrawal queued in the delayed inbox"
        );

        self.tx_hash = Some(receipt.transaction_hash);
        Ok(receipt)
    }

    fn description(&self) -> String {
        format!(
            "Withdrawing {} ETH to {} through the delayed inbox",
            format_ether(self.request.value),
            self.request.destination
        )
    }
}
