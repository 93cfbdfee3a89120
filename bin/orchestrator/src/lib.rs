//! Forced withdrawal orchestration.
//!
//! Runs the whole flow against a forked parent chain, one stage after the
//! other:
//!
//! 1. validate the input and refuse to touch the production chain
//! 2. resolve the value (`all` uses the pre-fork balance)
//! 3. collapse the sequencer inbox delay if needed
//! 4. queue the withdrawal in the delayed inbox
//! 5. wait until the parent chain is past the message block
//! 6. force include the delayed message
//!
//! Nothing is retried and nothing is checkpointed. A failed run is started
//! over from scratch.

pub mod config;

use action::{
    collapse_delay_if_needed, fetch_withdrawal_receipt, read_delay_policy, Action, Clock,
    ForceIncludeAction, GateOutcome, InclusionGate, RetryPolicy, WithdrawAction,
};
use alloy_primitives::{Address, B256};
use balance::BalanceOracle;
use client::L1Chain;
use ::config::{LOCAL_FORK_CHAIN_ID, PRODUCTION_CHAIN_ID};
use serde::Serialize;
use tracing::info;
use withdrawal::{
    extract_delayed_message, predict_l2_tx_hash, DelayPolicy, DelayedMessage, Error,
    InclusionResult, Result, WithdrawalInput, WithdrawalRequest,
};

/// Per-run settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Chain id of the rollup the withdrawal executes on
    pub l2_chain_id: u64,
    /// Last L2 block before the fork, used to resolve `all`
    pub l2_fork_block: Option<u64>,
    pub inclusion: RetryPolicy,
}

/// Everything known before the first transaction is sent.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedWithdrawal {
    pub l1_chain_id: u64,
    /// L1 account signing every transaction
    pub sender: Address,
    pub request: WithdrawalRequest,
    pub delay_policy: DelayPolicy,
    pub predicted_l2_tx_hash: B256,
}

/// Result of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalOutcome {
    pub request: WithdrawalRequest,
    pub delay_collapse_tx: Option<B256>,
    pub withdrawal_tx: B256,
    pub delayed_message: DelayedMessage,
    pub gate: GateOutcome,
    pub inclusion: InclusionResult,
    pub predicted_l2_tx_hash: B256,
}

/// Result of force including a withdrawal submitted earlier.
#[derive(Debug, Clone, Serialize)]
pub struct ResumedInclusion {
    pub withdrawal_tx: B256,
    pub delayed_message: DelayedMessage,
    pub gate: GateOutcome,
    pub inclusion: InclusionResult,
}

pub struct Orchestrator<C, O, K> {
    chain: C,
    oracle: O,
    clock: K,
    settings: Settings,
}

impl<C, O, K> Orchestrator<C, O, K>
where
    C: L1Chain + Clone,
    O: BalanceOracle,
    K: Clock + Clone,
{
    pub const fn new(chain: C, oracle: O, clock: K, settings: Settings) -> Self {
        Self {
            chain,
            oracle,
            clock,
            settings,
        }
    }

    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Chain id of the parent chain. Fails on the production chain.
    pub async fn guard_chain(&self) -> Result<u64> {
        let chain_id = self
            .chain
            .chain_id()
            .await
            .map_err(Error::chain("chainId"))?;

        if chain_id == PRODUCTION_CHAIN_ID {
            return Err(Error::ProductionChain { chain_id });
        }
        Ok(chain_id)
    }

    /// Resolve the request without sending anything. The destination is
    /// validated before the chain is queried.
    pub async fn resolve_request(&self, input: &WithdrawalInput) -> Result<WithdrawalRequest> {
        let parsed = input.parse()?;
        parsed
            .resolve(&self.oracle, self.settings.l2_fork_block)
            .await
    }

    /// Hash of the L2 transaction the request will execute as.
    pub fn predict_hash(&self, request: &WithdrawalRequest) -> B256 {
        predict_l2_tx_hash(self.settings.l2_chain_id, self.chain.signer(), request)
    }

    /// Validate, guard, resolve and read the delay policy. Sends nothing.
    pub async fn prepare(&self, input: &WithdrawalInput) -> Result<PreparedWithdrawal> {
        let parsed = input.parse()?;
        let l1_chain_id = self.guard_chain().await?;
        let request = parsed
            .resolve(&self.oracle, self.settings.l2_fork_block)
            .await?;
        let delay_policy = read_delay_policy(&self.chain).await?;
        let predicted_l2_tx_hash = self.predict_hash(&request);

        info!(
            l1_chain_id,
            sender = %self.chain.signer(),
            nonce = request.nonce,
            value = %request.value,
            destination = %request.destination,
            delay_blocks = delay_policy.delay_blocks,
            predicted_l2_tx_hash = %predicted_l2_tx_hash,
            "Prepared forced withdrawal"
        );

        Ok(PreparedWithdrawal {
            l1_chain_id,
            sender: self.chain.signer(),
            request,
            delay_policy,
            predicted_l2_tx_hash,
        })
    }

    /// Full run: prepare, collapse the delay, queue the withdrawal and force
    /// include it.
    pub async fn run(&self, input: &WithdrawalInput) -> Result<WithdrawalOutcome> {
        let prepared = self.prepare(input).await?;

        let collapse = collapse_delay_if_needed(&self.chain, prepared.delay_policy).await?;

        let mut withdraw = WithdrawAction::new(self.chain.clone(), prepared.request);
        info!("{}", withdraw.description());
        let receipt = withdraw.execute().await?;

        let delayed_message = extract_delayed_message(&receipt)?;
        info!(
            index = %delayed_message.index,
            kind = delayed_message.kind,
            l1_block_number = delayed_message.l1_block_number,
            "Delayed message recorded"
        );

        let (gate, inclusion) = self
            .include(prepared.l1_chain_id, delayed_message)
            .await?;

        info!(
            batch_sequence_number = %inclusion.batch_sequence_number,
            predicted_l2_tx_hash = %prepared.predicted_l2_tx_hash,
            "Forced withdrawal complete"
        );

        Ok(WithdrawalOutcome {
            request: prepared.request,
            delay_collapse_tx: collapse.map(|receipt| receipt.transaction_hash),
            withdrawal_tx: receipt.transaction_hash,
            delayed_message,
            gate,
            inclusion,
            predicted_l2_tx_hash: prepared.predicted_l2_tx_hash,
        })
    }

    /// Gate and force include a withdrawal submitted by an earlier run.
    pub async fn resume(&self, withdrawal_tx: B256) -> Result<ResumedInclusion> {
        let l1_chain_id = self.guard_chain().await?;

        let receipt = fetch_withdrawal_receipt(&self.chain, withdrawal_tx).await?;
        if !receipt.status {
            return Err(Error::Reverted {
                step: "sendWithdrawEthToFork",
                tx_hash: withdrawal_tx,
            });
        }

        let delayed_message = extract_delayed_message(&receipt)?;
        let (gate, inclusion) = self.include(l1_chain_id, delayed_message).await?;

        Ok(ResumedInclusion {
            withdrawal_tx,
            delayed_message,
            gate,
            inclusion,
        })
    }

    async fn include(
        &self,
        l1_chain_id: u64,
        message: DelayedMessage,
    ) -> Result<(GateOutcome, InclusionResult)> {
        let gate = InclusionGate::new(
            self.chain.clone(),
            self.clock.clone(),
            self.settings.inclusion,
        )
        .skip_waits(l1_chain_id == LOCAL_FORK_CHAIN_ID);
        let gate = gate.await_inclusion_eligibility(&message).await?;

        let mut force = ForceIncludeAction::new(self.chain.clone(), message);
        info!("{}", force.description());
        let inclusion = force.execute().await?;

        Ok((gate, inclusion))
    }
}
