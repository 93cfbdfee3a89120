use alloy_primitives::{Address, B256, U256};
use client::MaxTimeVariation;
use serde::Serialize;

/// Gas limit of the L2 withdrawal transaction.
pub const L2_GAS_LIMIT: u64 = 100_000;

/// Max fee per gas of the L2 withdrawal transaction, 0.12 gwei.
pub const L2_MAX_FEE_PER_GAS: u64 = 120_000_000;

/// Delay the sequencer inbox must enforce before forced inclusion is attempted.
pub const TARGET_DELAY_BLOCKS: u64 = 1;

/// Wei held back from an `all` withdrawal to pay for L2 execution.
pub fn l2_fee_reservation() -> U256 {
    U256::from(L2_GAS_LIMIT) * U256::from(L2_MAX_FEE_PER_GAS)
}

/// Sequencer inbox delay in blocks, saturated to `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DelayPolicy {
    pub delay_blocks: u64,
}

impl DelayPolicy {
    pub const fn requires_collapse(&self) -> bool {
        self.delay_blocks > TARGET_DELAY_BLOCKS
    }
}

impl From<MaxTimeVariation> for DelayPolicy {
    fn from(variation: MaxTimeVariation) -> Self {
        Self {
            delay_blocks: variation.delay_blocks.saturating_to(),
        }
    }
}

/// Validated withdrawal. Immutable once submission begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WithdrawalRequest {
    /// L2 nonce of the user at the pre-fork snapshot height
    pub nonce: u64,
    pub value: U256,
    pub destination: Address,
}

impl WithdrawalRequest {
    pub fn new(nonce: u64, value: U256, destination: Address) -> crate::Result<Self> {
        if value.is_zero() {
            return Err(crate::Error::NonPositiveValue);
        }

        Ok(Self {
            nonce,
            value,
            destination,
        })
    }
}

/// Delayed message recorded by the bridge for a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DelayedMessage {
    pub index: U256,
    pub kind: u8,
    pub sender: Address,
    pub data_hash: B256,
    pub l1_base_fee: U256,
    pub l1_timestamp: u64,
    pub l1_block_number: u64,
}

impl DelayedMessage {
    /// Delayed message count the sequencer inbox must reach to include this one.
    pub fn total_messages(&self) -> U256 {
        self.index.saturating_add(U256::from(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InclusionResult {
    pub batch_sequence_number: U256,
    pub transaction_hash: B256,
}
