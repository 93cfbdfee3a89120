//! Arbitrum Nitro contract bindings.
//!
//! Includes contracts for forcing a withdrawal through the delayed inbox:
//! - Inbox (L1, accepts the withdrawal intent)
//! - Bridge (L1, emits `MessageDelivered` for every delayed message)
//! - SequencerInbox (L1, delay policy and forced inclusion)
//! - ArbSys (L2 precompile at `0x64`)

use alloy_primitives::{address, Address};
use alloy_sol_types::sol;

/// ArbSys precompile address on every Arbitrum chain.
pub const ARB_SYS_ADDRESS: Address = address!("0x0000000000000000000000000000000000000064");

sol! {
    /// Delayed inbox - L1 entry point for messages that bypass the sequencer
    #[sol(rpc, all_derives)]
    interface IDelayedInbox {
        /// Queue an unsigned L2 `ArbSys.withdrawEth` call on behalf of the
        /// sender. Only callable once the parent chain has forked.
        function sendWithdrawEthToFork(
            uint256 gasLimit,
            uint256 maxFeePerGas,
            uint256 nonce,
            uint256 value,
            address withdrawTo
        ) external returns (uint256);
    }

    /// Bridge - accumulates every delayed message
    /// See: https://github.com/OffchainLabs/nitro-contracts/blob/main/src/bridge/IBridge.sol
    #[sol(all_derives)]
    interface IBridge {
        event MessageDelivered(
            uint256 indexed messageIndex,
            bytes32 indexed beforeInboxAcc,
            address inbox,
            uint8 kind,
            address sender,
            bytes32 messageDataHash,
            uint256 baseFeeL1,
            uint64 timestamp
        );
    }

    /// SequencerInbox - canonical batch sequence consumed by the L2
    #[sol(rpc, all_derives)]
    interface ISequencerInbox {
        struct TimeBounds {
            uint64 minTimestamp;
            uint64 maxTimestamp;
            uint64 minBlockNumber;
            uint64 maxBlockNumber;
        }

        enum BatchDataLocation {
            TxInput,
            SeparateBatchEvent,
            NoData,
            Blob
        }

        /// Emitted for every batch, including forced inclusions
        event SequencerBatchDelivered(
            uint256 indexed batchSequenceNumber,
            bytes32 indexed beforeAcc,
            bytes32 indexed afterAcc,
            bytes32 delayedAcc,
            uint256 afterDelayedMessagesRead,
            TimeBounds timeBounds,
            BatchDataLocation dataLocation
        );

        /// Force include delayed messages up to `totalMessages`, bypassing the sequencer
        function forceInclusion(
            uint256 totalMessages,
            uint8 kind,
            uint64[2] calldata l1BlockAndTime,
            uint256 baseFeeL1,
            address sender,
            bytes32 messageDataHash
        ) external;

        /// Number of delayed messages already sequenced
        function totalDelayedMessagesRead() external view returns (uint256);

        /// Collapse the force inclusion delay to a single block. Reverts unless
        /// the parent chain has forked.
        function removeDelayAfterFork() external;

        /// Current delay window for forced inclusion
        function maxTimeVariation() external view returns (
            uint256 delayBlocks,
            uint256 futureBlocks,
            uint256 delaySeconds,
            uint256 futureSeconds
        );
    }

    /// ArbSys - L2 system precompile
    #[sol(all_derives)]
    interface IArbSys {
        /// Send ETH from L2 to `destination` on L1
        function withdrawEth(address destination) external payable returns (uint256);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;
    use alloy_sol_types::SolCall;

    #[test]
    fn test_withdraw_eth_selector() {
        assert_eq!(IArbSys::withdrawEthCall::SELECTOR, hex!("25e16063"));
    }

    #[test]
    fn test_arb_sys_address() {
        assert_eq!(ARB_SYS_ADDRESS, Address::with_last_byte(0x64));
    }
}
