//! Common test setup utilities shared across integration tests.
#![allow(dead_code)] // not every test file uses every helper

use action::{Clock, RetryPolicy};
use alloy_primitives::{Address, Log, B256, U256};
use balance::{Balance, BalanceError, BalanceOracle};
use client::{
    mock::{batch_delivered_log, message_delivered_log, MockChain},
    L1Chain,
};
use orchestrator::{Orchestrator, Settings};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

pub const ARBITRUM_ONE_CHAIN_ID: u64 = 42161;
pub const FORK_BLOCK: u64 = 22_207_816;
/// Any chain that is neither production nor the local fork
pub const DEVNET_CHAIN_ID: u64 = 1337;

pub const MESSAGE_INDEX: u64 = 5;
pub const BATCH_SEQUENCE_NUMBER: u64 = 812_345;

/// Records waits instead of sleeping.
#[derive(Debug, Clone, Default)]
pub struct RecordingClock {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingClock {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for RecordingClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Balance oracle returning the same amount for everyone and recording lookups.
#[derive(Debug, Clone, Default)]
pub struct FixedBalanceOracle {
    amount: U256,
    lookups: Arc<Mutex<Vec<(Address, u64)>>>,
}

impl FixedBalanceOracle {
    pub fn new(amount: U256) -> Self {
        Self {
            amount,
            lookups: Arc::default(),
        }
    }

    pub fn lookups(&self) -> Vec<(Address, u64)> {
        self.lookups.lock().unwrap().clone()
    }
}

impl BalanceOracle for FixedBalanceOracle {
    async fn balance_at(&self, holder: Address, block: u64) -> Result<Balance, BalanceError> {
        self.lookups.lock().unwrap().push((holder, block));
        Ok(Balance {
            holder,
            block,
            amount: self.amount,
        })
    }
}

pub fn settings() -> Settings {
    Settings {
        l2_chain_id: ARBITRUM_ONE_CHAIN_ID,
        l2_fork_block: Some(FORK_BLOCK),
        inclusion: RetryPolicy::default(),
    }
}

/// The `MessageDelivered` log of the reference scenario: index 5, kind 0,
/// base fee 10, timestamp 1000.
pub fn delivered_log(sender: Address) -> Log {
    message_delivered_log(
        U256::from(MESSAGE_INDEX),
        0,
        sender,
        B256::repeat_byte(0xd4),
        U256::from(10),
        1000,
    )
}

/// Chain at height 100 that emits the reference scenario logs and never
/// advances on its own.
pub fn scenario_chain(chain_id: u64) -> MockChain {
    let chain = MockChain::new(chain_id, 100)
        .with_total_delayed_messages_read(MESSAGE_INDEX)
        .with_force_inclusion_logs(vec![batch_delivered_log(U256::from(
            BATCH_SEQUENCE_NUMBER,
        ))]);
    let sender = chain.signer();
    chain.with_withdraw_logs(vec![delivered_log(sender)])
}

pub fn build_orchestrator(
    chain: MockChain,
    oracle: FixedBalanceOracle,
    clock: RecordingClock,
) -> Orchestrator<MockChain, FixedBalanceOracle, RecordingClock> {
    Orchestrator::new(chain, oracle, clock, settings())
}
