//! L2 transaction hash prediction.
//!
//! A withdrawal queued through `sendWithdrawEthToFork` executes on L2 as an
//! unsigned transaction calling `ArbSys.withdrawEth(destination)`. Its hash is
//! `keccak256(0x65 || rlp(fields))`.

use crate::{
    types::{L2_GAS_LIMIT, L2_MAX_FEE_PER_GAS},
    WithdrawalRequest,
};
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_rlp::{Encodable, RlpEncodable};
use alloy_sol_types::SolCall;
use binding::arbitrum::{IArbSys, ARB_SYS_ADDRESS};

/// Arbitrum unsigned transaction type.
pub const ARBITRUM_UNSIGNED_TX_TYPE: u8 = 0x65;

#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable)]
pub struct UnsignedL2Transaction {
    pub chain_id: U256,
    pub from: Address,
    pub nonce: u64,
    pub max_fee_per_gas: U256,
    pub gas: u64,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

impl UnsignedL2Transaction {
    /// The `ArbSys.withdrawEth` call a forced withdrawal turns into.
    pub fn withdraw_eth(l2_chain_id: u64, sender: Address, request: &WithdrawalRequest) -> Self {
        let data = IArbSys::withdrawEthCall {
            destination: request.destination,
        }
        .abi_encode();

        Self {
            chain_id: U256::from(l2_chain_id),
            from: sender,
            nonce: request.nonce,
            max_fee_per_gas: U256::from(L2_MAX_FEE_PER_GAS),
            gas: L2_GAS_LIMIT,
            to: ARB_SYS_ADDRESS,
            value: request.value,
            data: data.into(),
        }
    }

    /// Typed envelope: type byte followed by the RLP list.
    pub fn encoded(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.length());
        out.push(ARBITRUM_UNSIGNED_TX_TYPE);
        self.encode(&mut out);
        out
    }

    pub fn hash(&self) -> B256 {
        keccak256(self.encoded())
    }
}

/// Hash of the L2 transaction the withdrawal will execute as. `sender` is the
/// L1 account that queued it.
pub fn predict_l2_tx_hash(l2_chain_id: u64, sender: Address, request: &WithdrawalRequest) -> B256 {
    UnsignedL2Transaction::withdraw_eth(l2_chain_id, sender, request).hash()
}
