//! In-memory [`L1Chain`] for tests.
//!
//! The mock keeps a chain head, records every call in order and fabricates
//! receipts. Transactions land in the current head block, except the ones
//! that mine a block on a real fork (`removeDelayAfterFork` and the self
//! transfer), which advance the head by one first.

use crate::{ChainError, L1Chain, MaxTimeVariation, TxReceipt};
use alloy_primitives::{address, Address, Bytes, Log, B256, U256};
use alloy_sol_types::SolEvent;
use binding::arbitrum::{
    IBridge, IDelayedInbox::sendWithdrawEthToForkCall, ISequencerInbox,
    ISequencerInbox::forceInclusionCall,
};
use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
};

/// Bridge address used for fabricated `MessageDelivered` logs.
pub const MOCK_BRIDGE: Address = address!("0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");

/// A call observed by [`MockChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainCall {
    ChainId,
    BlockNumber,
    MaxTimeVariation,
    TotalDelayedMessagesRead,
    TransactionReceipt(B256),
    RemoveDelayAfterFork,
    SendWithdrawEthToFork(sendWithdrawEthToForkCall),
    ForceInclusion(forceInclusionCall),
    SelfTransfer,
}

impl ChainCall {
    /// Whether this call submitted a transaction.
    pub const fn is_transaction(&self) -> bool {
        matches!(
            self,
            Self::RemoveDelayAfterFork
                | Self::SendWithdrawEthToFork(_)
                | Self::ForceInclusion(_)
                | Self::SelfTransfer
        )
    }
}

#[derive(Debug, Default)]
struct MockState {
    chain_id: u64,
    head: u64,
    scripted_heads: VecDeque<u64>,
    delay_blocks: U256,
    total_delayed_messages_read: U256,
    withdraw_logs: Vec<Log>,
    force_inclusion_logs: Vec<Log>,
    reverting: Vec<&'static str>,
    receipts: HashMap<B256, TxReceipt>,
    calls: Vec<ChainCall>,
    tx_count: u64,
}

impl MockState {
    fn mine(&mut self, call: &'static str, logs: Vec<Log>) -> TxReceipt {
        self.tx_count += 1;
        let receipt = TxReceipt {
            transaction_hash: B256::from(U256::from(self.tx_count).to_be_bytes::<32>()),
            block_number: self.head,
            status: !self.reverting.contains(&call),
            gas_used: 21_000,
            logs: if self.reverting.contains(&call) {
                Vec::new()
            } else {
                logs
            },
        };
        self.receipts
            .insert(receipt.transaction_hash, receipt.clone());
        receipt
    }
}

/// Scriptable in-memory parent chain.
#[derive(Debug, Clone)]
pub struct MockChain {
    signer: Address,
    state: Arc<Mutex<MockState>>,
}

impl MockChain {
    /// A chain with the given id and head, a delay policy already collapsed
    /// to one block and no delayed messages read.
    pub fn new(chain_id: u64, head: u64) -> Self {
        let state = MockState {
            chain_id,
            head,
            delay_blocks: U256::from(1),
            ..Default::default()
        };

        Self {
            signer: Address::repeat_byte(0x5c),
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn with_delay_blocks(self, delay_blocks: u64) -> Self {
        self.state().delay_blocks = U256::from(delay_blocks);
        self
    }

    pub fn with_total_delayed_messages_read(self, total: u64) -> Self {
        self.state().total_delayed_messages_read = U256::from(total);
        self
    }

    /// Heads returned by successive `block_number` polls. Once exhausted the
    /// head stays where it is.
    pub fn with_scripted_heads(self, heads: impl IntoIterator<Item = u64>) -> Self {
        self.state().scripted_heads.extend(heads);
        self
    }

    /// Logs attached to the `sendWithdrawEthToFork` receipt.
    pub fn with_withdraw_logs(self, logs: Vec<Log>) -> Self {
        self.state().withdraw_logs = logs;
        self
    }

    /// Logs attached to the `forceInclusion` receipt.
    pub fn with_force_inclusion_logs(self, logs: Vec<Log>) -> Self {
        self.state().force_inclusion_logs = logs;
        self
    }

    /// Make the named call (`"forceInclusion"`, `"sendWithdrawEthToFork"`,
    /// `"removeDelayAfterFork"`, `"selfTransfer"`) mine with a failed status.
    pub fn reverting(self, call: &'static str) -> Self {
        self.state().reverting.push(call);
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<ChainCall> {
        self.state().calls.clone()
    }

    /// Only the calls that submitted a transaction.
    pub fn transactions(&self) -> Vec<ChainCall> {
        self.calls()
            .into_iter()
            .filter(ChainCall::is_transaction)
            .collect()
    }

    pub fn head(&self) -> u64 {
        self.state().head
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock chain state poisoned")
    }
}

impl L1Chain for MockChain {
    fn signer(&self) -> Address {
        self.signer
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        let mut state = self.state();
        state.calls.push(ChainCall::ChainId);
        Ok(state.chain_id)
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        let mut state = self.state();
        state.calls.push(ChainCall::BlockNumber);
        if let Some(head) = state.scripted_heads.pop_front() {
            state.head = head;
        }
        Ok(state.head)
    }

    async fn max_time_variation(&self) -> Result<MaxTimeVariation, ChainError> {
        let mut state = self.state();
        state.calls.push(ChainCall::MaxTimeVariation);
        Ok(MaxTimeVariation {
            delay_blocks: state.delay_blocks,
            future_blocks: U256::from(32),
            delay_seconds: state.delay_blocks * U256::from(12),
            future_seconds: U256::from(3600),
        })
    }

    async fn total_delayed_messages_read(&self) -> Result<U256, ChainError> {
        let mut state = self.state();
        state.calls.push(ChainCall::TotalDelayedMessagesRead);
        Ok(state.total_delayed_messages_read)
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>, ChainError> {
        let mut state = self.state();
        state.calls.push(ChainCall::TransactionReceipt(tx_hash));
        Ok(state.receipts.get(&tx_hash).cloned())
    }

    async fn remove_delay_after_fork(&self) -> Result<TxReceipt, ChainError> {
        let mut state = self.state();
        state.calls.push(ChainCall::RemoveDelayAfterFork);
        state.head += 1;
        let receipt = state.mine("removeDelayAfterFork", Vec::new());
        if receipt.status {
            state.delay_blocks = U256::from(1);
        }
        Ok(receipt)
    }

    async fn send_withdraw_eth_to_fork(
        &self,
        call: sendWithdrawEthToForkCall,
    ) -> Result<TxReceipt, ChainError> {
        let mut state = self.state();
        state.calls.push(ChainCall::SendWithdrawEthToFork(call));
        let logs = state.withdraw_logs.clone();
        Ok(state.mine("sendWithdrawEthToFork", logs))
    }

    async fn force_inclusion(&self, call: forceInclusionCall) -> Result<TxReceipt, ChainError> {
        let mut state = self.state();
        let total_messages = call.totalMessages;
        state.calls.push(ChainCall::ForceInclusion(call));
        let logs = state.force_inclusion_logs.clone();
        let receipt = state.mine("forceInclusion", logs);
        if receipt.status {
            state.total_delayed_messages_read = total_messages;
        }
        Ok(receipt)
    }

    async fn self_transfer(&self) -> Result<TxReceipt, ChainError> {
        let mut state = self.state();
        state.calls.push(ChainCall::SelfTransfer);
        state.head += 1;
        Ok(state.mine("selfTransfer", Vec::new()))
    }
}

/// Bridge `MessageDelivered` log as emitted for a new delayed message.
pub fn message_delivered_log(
    index: U256,
    kind: u8,
    sender: Address,
    data_hash: B256,
    base_fee: U256,
    timestamp: u64,
) -> Log {
    let event = IBridge::MessageDelivered {
        messageIndex: index,
        beforeInboxAcc: B256::repeat_byte(0xac),
        inbox: Address::repeat_byte(0x4d),
        kind,
        sender,
        messageDataHash: data_hash,
        baseFeeL1: base_fee,
        timestamp,
    };

    Log::new_unchecked(
        MOCK_BRIDGE,
        vec![
            IBridge::MessageDelivered::SIGNATURE_HASH,
            B256::from(index.to_be_bytes::<32>()),
            event.beforeInboxAcc,
        ],
        Bytes::from(event.encode_data()),
    )
}

/// Sequencer inbox `SequencerBatchDelivered` log for a forced batch.
pub fn batch_delivered_log(batch_sequence_number: U256) -> Log {
    Log::new_unchecked(
        Address::repeat_byte(0x1c),
        vec![
            ISequencerInbox::SequencerBatchDelivered::SIGNATURE_HASH,
            B256::from(batch_sequence_number.to_be_bytes::<32>()),
            B256::repeat_byte(0x01),
            B256::repeat_byte(0x02),
        ],
        Bytes::new(),
    )
}

/// A log from some other contract, used to check that decoders search by
/// event signature instead of position.
pub fn unrelated_log() -> Log {
    Log::new_unchecked(
        Address::repeat_byte(0xee),
        vec![B256::repeat_byte(0xee), B256::repeat_byte(0x07)],
        Bytes::from(vec![0u8; 32]),
    )
}
