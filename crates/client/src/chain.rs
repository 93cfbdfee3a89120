//! Parent chain access for the forced-inclusion flow.
//!
//! [`L1Chain`] is the only seam between the protocol stages and the network:
//! every read and every transaction the orchestrator performs goes through it.
//! [`RpcChain`] implements it over an alloy wallet provider.

use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, Log, B256, U256};
use alloy_provider::{PendingTransactionBuilder, Provider};
use alloy_rpc_types::TransactionRequest;
use alloy_rpc_types_eth::TransactionReceipt;
use binding::arbitrum::{
    IDelayedInbox::{self, sendWithdrawEthToForkCall},
    ISequencerInbox::{self, forceInclusionCall},
};
use std::future::Future;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ChainError {
    /// Transport or node error on a read or while waiting for a receipt
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The node refused the transaction (usually a revert during gas estimation)
    #[error("{call} rejected: {reason}")]
    Rejected { call: &'static str, reason: String },

    /// A receipt was returned without a block number
    #[error("Transaction {0} is not mined")]
    Pending(B256),
}

impl ChainError {
    fn rpc(err: impl std::fmt::Display) -> Self {
        Self::Rpc(err.to_string())
    }
}

/// Mined transaction receipt, reduced to what the protocol stages read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub transaction_hash: B256,
    pub block_number: u64,
    /// false if the transaction reverted
    pub status: bool,
    pub gas_used: u64,
    pub logs: Vec<Log>,
}

impl TryFrom<TransactionReceipt> for TxReceipt {
    type Error = ChainError;

    fn try_from(receipt: TransactionReceipt) -> Result<Self, Self::Error> {
        let block_number = receipt
            .block_number
            .ok_or(ChainError::Pending(receipt.transaction_hash))?;

        Ok(Self {
            transaction_hash: receipt.transaction_hash,
            block_number,
            status: receipt.status(),
            gas_used: receipt.gas_used,
            logs: receipt.logs().iter().map(|log| log.inner.clone()).collect(),
        })
    }
}

/// Sequencer inbox delay window, as returned by `maxTimeVariation()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxTimeVariation {
    pub delay_blocks: U256,
    pub future_blocks: U256,
    pub delay_seconds: U256,
    pub future_seconds: U256,
}

/// L1 contract addresses the chain client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboxContracts {
    pub delayed_inbox: Address,
    pub sequencer_inbox: Address,
}

/// Parent chain operations used by the forced-inclusion flow.
///
/// Every transaction method blocks until the transaction is mined and returns
/// its receipt, reverted or not. Callers decide what a revert means.
pub trait L1Chain: Send + Sync {
    /// Address of the account signing every transaction.
    fn signer(&self) -> Address;

    fn chain_id(&self) -> impl Future<Output = Result<u64, ChainError>> + Send;

    /// Current chain head.
    fn block_number(&self) -> impl Future<Output = Result<u64, ChainError>> + Send;

    fn max_time_variation(
        &self,
    ) -> impl Future<Output = Result<MaxTimeVariation, ChainError>> + Send;

    fn total_delayed_messages_read(&self) -> impl Future<Output = Result<U256, ChainError>> + Send;

    /// Receipt of an already submitted transaction, if it is mined.
    fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> impl Future<Output = Result<Option<TxReceipt>, ChainError>> + Send;

    fn remove_delay_after_fork(&self) -> impl Future<Output = Result<TxReceipt, ChainError>> + Send;

    fn send_withdraw_eth_to_fork(
        &self,
        call: sendWithdrawEthToForkCall,
    ) -> impl Future<Output = Result<TxReceipt, ChainError>> + Send;

    fn force_inclusion(
        &self,
        call: forceInclusionCall,
    ) -> impl Future<Output = Result<TxReceipt, ChainError>> + Send;

    /// Zero value transfer from the signer to itself, used to mine a block.
    fn self_transfer(&self) -> impl Future<Output = Result<TxReceipt, ChainError>> + Send;
}

/// [`L1Chain`] backed by a wallet provider.
#[derive(Debug, Clone)]
pub struct RpcChain<P> {
    provider: P,
    signer: Address,
    contracts: InboxContracts,
}

impl<P> RpcChain<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, signer: Address, contracts: InboxContracts) -> Self {
        Self {
            provider,
            signer,
            contracts,
        }
    }

    pub const fn contracts(&self) -> InboxContracts {
        self.contracts
    }

    /// Wait for a submitted transaction to be mined.
    async fn confirm(
        call: &'static str,
        pending: PendingTransactionBuilder<alloy_network::Ethereum>,
    ) -> Result<TxReceipt, ChainError> {
        debug!(call, tx_hash = %pending.tx_hash(), "Waiting for transaction receipt");

        let receipt = pending.get_receipt().await.map_err(ChainError::rpc)?;
        TxReceipt::try_from(receipt)
    }
}

impl<P> L1Chain for RpcChain<P>
where
    P: Provider + Clone,
{
    fn signer(&self) -> Address {
        self.signer
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        self.provider.get_chain_id().await.map_err(ChainError::rpc)
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        self.provider.get_block_number().await.map_err(ChainError::rpc)
    }

    async fn max_time_variation(&self) -> Result<MaxTimeVariation, ChainError> {
        let inbox = ISequencerInbox::new(self.contracts.sequencer_inbox, &self.provider);
        let variation = inbox
            .maxTimeVariation()
            .call()
            .await
            .map_err(ChainError::rpc)?;

        Ok(MaxTimeVariation {
            delay_blocks: variation.delayBlocks,
            future_blocks: variation.futureBlocks,
            delay_seconds: variation.delaySeconds,
            future_seconds: variation.futureSeconds,
        })
    }

    async fn total_delayed_messages_read(&self) -> Result<U256, ChainError> {
        let inbox = ISequencerInbox::new(self.contracts.sequencer_inbox, &self.provider);
        inbox
            .totalDelayedMessagesRead()
            .call()
            .await
            .map_err(ChainError::rpc)
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>, ChainError> {
        self.provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(ChainError::rpc)?
            .map(TxReceipt::try_from)
            .transpose()
    }

    async fn remove_delay_after_fork(&self) -> Result<TxReceipt, ChainError> {
        const CALL: &str = "removeDelayAfterFork";

        let inbox = ISequencerInbox::new(self.contracts.sequencer_inbox, &self.provider);
        let pending = inbox
            .removeDelayAfterFork()
            .send()
            .await
            .map_err(|e| ChainError::Rejected {
                call: CALL,
                reason: e.to_string(),
            })?;

        Self::confirm(CALL, pending).await
    }

    async fn send_withdraw_eth_to_fork(
        &self,
        call: sendWithdrawEthToForkCall,
    ) -> Result<TxReceipt, ChainError> {
        const CALL: &str = "sendWithdrawEthToFork";

        let inbox = IDelayedInbox::new(self.contracts.delayed_inbox, &self.provider);
        let pending = inbox
            .sendWithdrawEthToFork(
                call.gasLimit,
                call.maxFeePerGas,
                call.nonce,
                call.value,
                call.withdrawTo,
            )
            .send()
            .await
            .map_err(|e| ChainError::Rejected {
                call: CALL,
                reason: e.to_string(),
            })?;

        Self::confirm(CALL, pending).await
    }

    async fn force_inclusion(&self, call: forceInclusionCall) -> Result<TxReceipt, ChainError> {
        const CALL: &str = "forceInclusion";

        let inbox = ISequencerInbox::new(self.contracts.sequencer_inbox, &self.provider);
        let pending = inbox
            .forceInclusion(
                call.totalMessages,
                call.kind,
                call.l1BlockAndTime,
                call.baseFeeL1,
                call.sender,
                call.messageDataHash,
            )
            .send()
            .await
            .map_err(|e| ChainError::Rejected {
                call: CALL,
                reason: e.to_string(),
            })?;

        Self::confirm(CALL, pending).await
    }

    async fn self_transfer(&self) -> Result<TxReceipt, ChainError> {
        const CALL: &str = "selfTransfer";

        let tx = TransactionRequest::default()
            .with_from(self.signer)
            .with_to(self.signer)
            .with_value(U256::ZERO);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ChainError::Rejected {
                call: CALL,
                reason: e.to_string(),
            })?;

        Self::confirm(CALL, pending).await
    }
}
