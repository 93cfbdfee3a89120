use crate::{ensure_success, Action};
use alloy_primitives::U256;
use binding::arbitrum::ISequencerInbox::forceInclusionCall;
use client::L1Chain;
use tracing::info;
use withdrawal::{
    extract_batch_sequence_number, types::TARGET_DELAY_BLOCKS, DelayedMessage, Error,
    InclusionResult, Result,
};

const STEP: &str = "forceInclusion";

/// Forces the sequencer inbox to include every delayed message up to and
/// including ours.
pub struct ForceIncludeAction<C> {
    chain: C,
    message: DelayedMessage,
}

impl<C: L1Chain> ForceIncludeAction<C> {
    pub const fn new(chain: C, message: DelayedMessage) -> Self {
        Self { chain, message }
    }

    pub fn call(&self) -> forceInclusionCall {
        forceInclusionCall {
            totalMessages: self.message.total_messages(),
            kind: self.message.kind,
            l1BlockAndTime: [self.message.l1_block_number, self.message.l1_timestamp],
            baseFeeL1: self.message.l1_base_fee,
            sender: self.message.sender,
            messageDataHash: self.message.data_hash,
        }
    }

    async fn total_delayed_messages_read(&self) -> Result<U256> {
        self.chain
            .total_delayed_messages_read()
            .await
            .map_err(Error::chain("totalDelayedMessagesRead"))
    }
}

impl<C: L1Chain> Action for ForceIncludeAction<C> {
    type Output = InclusionResult;

    async fn is_ready(&self) -> Result<bool> {
        let head = self
            .chain
            .block_number()
            .await
            .map_err(Error::chain("blockNumber"))?;
        Ok(head >= self.message.l1_block_number.saturating_add(TARGET_DELAY_BLOCKS))
    }

    async fn is_completed(&self) -> Result<bool> {
        Ok(self.total_delayed_messages_read().await? >= self.message.total_messages())
    }

    async fn execute(&mut self) -> Result<InclusionResult> {
        let read = self.total_delayed_messages_read().await?;
        if read >= self.message.total_messages() {
            return Err(Error::AlreadyIncluded {
                total_messages: read,
            });
        }

        let call = self.call();
        info!(
            total_messages = %call.totalMessages,
            kind = call.kind,
            l1_block_number = self.message.l1_block_number,
            l1_timestamp = self.message.l1_timestamp,
            base_fee = %call.baseFeeL1,
            sender = %call.sender,
            "Forcing inclusion of delayed messages"
        );

        let receipt = self
            .chain
            .force_inclusion(call)
            .await
            .map_err(Error::chain(STEP))?;
        let receipt = ensure_success(STEP, receipt)?;
        let batch_sequence_number = extract_batch_sequence_number(&receipt)?;

        info!(
            tx_hash = %receipt.transaction_hash,
            block_number = receipt.block_number,
            gas_used = receipt.gas_used,
            batch_sequence_number = %batch_sequence_number,
            "Delayed messages force included"
        );

        Ok(InclusionResult {
            batch_sequence_number,
            transaction_hash: receipt.transaction_hash,
        })
    }

    fn description(&self) -> String {
        format!(
            "Force including delayed message {} recorded at block {}",
            self.message.index, self.message.l1_block_number
        )
    }
}
