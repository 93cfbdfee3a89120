//! Inclusion gate.
//!
//! The sequencer inbox rejects forced inclusion of a delayed message until
//! the parent chain has moved past the block that recorded it. The gate polls
//! the head, waits according to a [`RetryPolicy`], and as a last resort mines
//! a block with a zero value self transfer.

use crate::ensure_success;
use alloy_primitives::B256;
use client::L1Chain;
use serde::{Deserialize, Serialize};
use std::{future::Future, time::Duration};
use tracing::{debug, info, warn};
use withdrawal::{types::TARGET_DELAY_BLOCKS, DelayedMessage, Error, Result};

/// Source of waits, so tests can run without sleeping.
pub trait Clock: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How long to wait for the chain to advance on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Number of waits before nudging the chain
    pub max_attempts: u32,
    /// First wait, in seconds
    pub wait_secs: u64,
    /// Each following wait is this many times longer
    pub backoff_multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            wait_secs: 30,
            backoff_multiplier: 1,
        }
    }
}

impl RetryPolicy {
    /// Wait before the given zero-based attempt.
    pub fn wait(&self, attempt: u32) -> Duration {
        let factor = u64::from(self.backoff_multiplier).saturating_pow(attempt);
        Duration::from_secs(self.wait_secs.saturating_mul(factor))
    }
}

/// What the gate observed before letting force inclusion proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GateOutcome {
    /// Lowest head at which force inclusion is accepted
    pub threshold: u64,
    pub observed_height: u64,
    pub waits: u32,
    /// Self transfer mined to advance the chain
    pub nudge_tx: Option<B256>,
}

impl GateOutcome {
    pub const fn is_eligible(&self) -> bool {
        self.observed_height >= self.threshold
    }
}

pub struct InclusionGate<C, K> {
    chain: C,
    clock: K,
    policy: RetryPolicy,
    skip_waits: bool,
}

impl<C: L1Chain, K: Clock> InclusionGate<C, K> {
    pub const fn new(chain: C, clock: K, policy: RetryPolicy) -> Self {
        Self {
            chain,
            clock,
            policy,
            skip_waits: false,
        }
    }

    /// Skip policy waits and nudge immediately. Used on a local fork, where
    /// blocks are only mined on demand.
    pub fn skip_waits(mut self, skip: bool) -> Self {
        self.skip_waits = skip;
        self
    }

    async fn head(&self) -> Result<u64> {
        self.chain
            .block_number()
            .await
            .map_err(Error::chain("blockNumber"))
    }

    /// Returns once the parent chain is at least one block past the message.
    /// After the self transfer it proceeds regardless of the head; the inbox
    /// contract has the final say.
    pub async fn await_inclusion_eligibility(
        &self,
        message: &DelayedMessage,
    ) -> Result<GateOutcome> {
        let threshold = message.l1_block_number.saturating_add(TARGET_DELAY_BLOCKS);
        let mut outcome = GateOutcome {
            threshold,
            observed_height: self.head().await?,
            waits: 0,
            nudge_tx: None,
        };

        if outcome.is_eligible() {
            debug!(
                head = outcome.observed_height,
                threshold,
                "Chain already past the message block"
            );
            return Ok(outcome);
        }

        if !self.skip_waits {
            for attempt in 0..self.policy.max_attempts {
                let wait = self.policy.wait(attempt);
                info!(
                    head = outcome.observed_height,
                    threshold,
                    wait_secs = wait.as_secs(),
                    "Waiting for a new parent chain block"
                );

                self.clock.sleep(wait).await;
                outcome.waits += 1;
                outcome.observed_height = self.head().await?;

                if outcome.is_eligible() {
                    return Ok(outcome);
                }
            }
        }

        info!(
            head = outcome.observed_height,
            threshold,
            "No new block, mining one with a self transfer"
        );

        let receipt = self
            .chain
            .self_transfer()
            .await
            .map_err(Error::chain("selfTransfer"))?;
        let receipt = ensure_success("selfTransfer", receipt)?;

        outcome.nudge_tx = Some(receipt.transaction_hash);
        outcome.observed_height = outcome.observed_height.max(receipt.block_number);

        if outcome.is_eligible() {
            info!(
                tx_hash = %receipt.transaction_hash,
                block_number = receipt.block_number,
                "Parent chain advanced"
            );
        } else {
            warn!(
                head = outcome.observed_height,
                threshold,
                "Head still below the inclusion threshold, proceeding anyway"
            );
        }

        Ok(outcome)
    }
}
