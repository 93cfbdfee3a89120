//! Sequencer inbox delay policy.
//!
//! Forced inclusion is only accepted once a delayed message is older than the
//! inbox delay. On a freshly forked chain that delay is collapsed to a single
//! block before anything else is submitted.

use crate::{ensure_success, Action};
use client::{L1Chain, TxReceipt};
use tracing::{debug, info};
use withdrawal::{types::TARGET_DELAY_BLOCKS, DelayPolicy, Error, Result};

/// Read the current delay policy. Never cached.
pub async fn read_delay_policy<C: L1Chain>(chain: &C) -> Result<DelayPolicy> {
    let variation = chain
        .max_time_variation()
        .await
        .map_err(Error::chain("maxTimeVariation"))?;

    let policy = DelayPolicy::from(variation);
    debug!(
        delay_blocks = policy.delay_blocks,
        delay_seconds = %variation.delay_seconds,
        "Read sequencer inbox delay policy"
    );
    Ok(policy)
}

/// Collapse the delay if it is above the target. Returns the receipt of the
/// collapse transaction, or `None` when nothing had to be done.
pub async fn collapse_delay_if_needed<C: L1Chain + Clone>(
    chain: &C,
    policy: DelayPolicy,
) -> Result<Option<TxReceipt>> {
    let mut action = DelayCollapseAction::new(chain.clone(), policy);
    if !action.is_ready().await? {
        info!(
            delay_blocks = policy.delay_blocks,
            "Sequencer inbox delay already at target"
        );
        return Ok(None);
    }

    action.execute().await.map(Some)
}

/// Issues `removeDelayAfterFork()`.
pub struct DelayCollapseAction<C> {
    chain: C,
    policy: DelayPolicy,
}

impl<C: L1Chain> DelayCollapseAction<C> {
    pub const fn new(chain: C, policy: DelayPolicy) -> Self {
        Self { chain, policy }
    }
}

impl<C: L1Chain> Action for DelayCollapseAction<C> {
    type Output = TxReceipt;

    async fn is_ready(&self) -> Result<bool> {
        Ok(self.policy.requires_collapse())
    }

    async fn is_completed(&self) -> Result<bool> {
        let policy = read_delay_policy(&self.chain).await?;
        Ok(!policy.requires_collapse())
    }

    async fn execute(&mut self) -> Result<TxReceipt> {
        const STEP: &str = "removeDelayAfterFork";

        info!(
            delay_blocks = self.policy.delay_blocks,
            target = TARGET_DELAY_BLOCKS,
            "Collapsing sequencer inbox delay"
        );

        let receipt = self
            .chain
            .remove_delay_after_fork()
            .await
            .map_err(Error::chain(STEP))?;
        let receipt = ensure_success(STEP, receipt)?;

        info!(
            tx_hash = %receipt.transaction_hash,
            block_number = receipt.block_number,
            gas_used = receipt.gas_used,
            "Sequencer inbox delay removed"
        );

        self.policy = DelayPolicy {
            delay_blocks: TARGET_DELAY_BLOCKS,
        };
        Ok(receipt)
    }

    fn description(&self) -> String {
        format!(
            "Collapsing sequencer inbox delay from {} blocks to {}",
            self.policy.delay_blocks, TARGET_DELAY_BLOCKS
        )
    }
}
