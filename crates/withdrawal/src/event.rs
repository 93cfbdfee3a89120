//! Receipt log decoding.
//!
//! Logs are located by event signature, so unrelated logs emitted ahead of
//! the one we need are skipped.

use crate::{DelayedMessage, Error, Result};
use alloy_primitives::{Log, B256, U256};
use alloy_sol_types::SolEvent;
use binding::arbitrum::{IBridge, ISequencerInbox};
use client::TxReceipt;

fn find_log<'a>(receipt: &'a TxReceipt, signature: B256, event: &'static str) -> Result<&'a Log> {
    receipt
        .logs
        .iter()
        .find(|log| log.topics().first() == Some(&signature))
        .ok_or_else(|| Error::Decode {
            event,
            reason: format!(
                "no matching log among {} in transaction {}",
                receipt.logs.len(),
                receipt.transaction_hash
            ),
        })
}

fn indexed_u256(log: &Log, position: usize, event: &'static str) -> Result<U256> {
    log.topics()
        .get(position)
        .map(|topic| U256::from_be_bytes(topic.0))
        .ok_or_else(|| Error::Decode {
            event,
            reason: format!("missing indexed topic {position}"),
        })
}

/// Recover the delayed message created by a `sendWithdrawEthToFork` receipt.
pub fn extract_delayed_message(receipt: &TxReceipt) -> Result<DelayedMessage> {
    const EVENT: &str = "MessageDelivered";

    let log = find_log(receipt, IBridge::MessageDelivered::SIGNATURE_HASH, EVENT)?;
    let index = indexed_u256(log, 1, EVENT)?;

    let (_inbox, kind, sender, data_hash, l1_base_fee, l1_timestamp) =
        IBridge::MessageDelivered::abi_decode_data(&log.data.data).map_err(|e| {
            Error::Decode {
                event: EVENT,
                reason: e.to_string(),
            }
        })?;

    Ok(DelayedMessage {
        index,
        kind,
        sender,
        data_hash,
        l1_base_fee,
        l1_timestamp,
        l1_block_number: receipt.block_number,
    })
}

/// Batch sequence number confirmed by a `forceInclusion` receipt.
pub fn extract_batch_sequence_number(receipt: &TxReceipt) -> Result<U256> {
    const EVENT: &str = "SequencerBatchDelivered";

    let log = find_log(
        receipt,
        ISequencerInbox::SequencerBatchDelivered::SIGNATURE_HASH,
        EVENT,
    )?;
    indexed_u256(log, 1, EVENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bytes};
    use client::mock::{batch_delivered_log, message_delivered_log, unrelated_log};

    fn receipt(logs: Vec<Log>) -> TxReceipt {
        TxReceipt {
            transaction_hash: B256::repeat_byte(0x42),
            block_number: 100,
            status: true,
            gas_used: 90_000,
            logs,
        }
    }

    fn delivered() -> Log {
        message_delivered_log(
            U256::from(5),
            0,
            Address::repeat_byte(0x5c),
            B256::repeat_byte(0xd4),
            U256::from(10),
            1000,
        )
    }

    #[test]
    fn test_extract_delayed_message() {
        let message = extract_delayed_message(&receipt(vec![delivered()])).unwrap();

        assert_eq!(message.index, U256::from(5));
        assert_eq!(message.total_messages(), U256::from(6));
        assert_eq!(message.kind, 0);
        assert_eq!(message.sender, Address::repeat_byte(0x5c));
        assert_eq!(message.data_hash, B256::repeat_byte(0xd4));
        assert_eq!(message.l1_base_fee, U256::from(10));
        assert_eq!(message.l1_timestamp, 1000);
        assert_eq!(message.l1_block_number, 100);
    }

    #[test]
    fn test_extract_skips_unrelated_logs() {
        let message =
            extract_delayed_message(&receipt(vec![unrelated_log(), delivered()])).unwrap();
        assert_eq!(message.index, U256::from(5));
    }

    #[test]
    fn test_extract_with_two_topics() {
        let full = delivered();
        let log = Log::new_unchecked(
            full.address,
            full.topics()[..2].to_vec(),
            full.data.data.clone(),
        );

        let message = extract_delayed_message(&receipt(vec![log])).unwrap();
        assert_eq!(message.index, U256::from(5));
    }

    #[test]
    fn test_extract_missing_event() {
        let err = extract_delayed_message(&receipt(vec![unrelated_log()])).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                event: "MessageDelivered",
                ..
            }
        ));

        assert!(extract_delayed_message(&receipt(Vec::new())).is_err());
    }

    #[test]
    fn test_extract_missing_index_topic() {
        let log = Log::new_unchecked(
            Address::repeat_byte(0xbb),
            vec![IBridge::MessageDelivered::SIGNATURE_HASH],
            delivered().data.data,
        );

        let err = extract_delayed_message(&receipt(vec![log])).unwrap_err();
        assert!(err.to_string().contains("missing indexed topic 1"));
    }

    #[test]
    fn test_extract_malformed_body() {
        let full = delivered();
        let log = Log::new_unchecked(
            full.address,
            full.topics().to_vec(),
            Bytes::from(vec![0u8; 31]),
        );

        assert!(matches!(
            extract_delayed_message(&receipt(vec![log])),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn test_extract_batch_sequence_number() {
        let logs = vec![unrelated_log(), batch_delivered_log(U256::from(812_345))];
        assert_eq!(
            extract_batch_sequence_number(&receipt(logs)).unwrap(),
            U256::from(812_345)
        );

        assert!(matches!(
            extract_batch_sequence_number(&receipt(vec![delivered()])),
            Err(Error::Decode {
                event: "SequencerBatchDelivered",
                ..
            })
        ));
    }
}
