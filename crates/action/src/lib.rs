pub mod delay;
pub mod force;
pub mod gate;
pub mod withdraw;

pub use delay::{collapse_delay_if_needed, read_delay_policy, DelayCollapseAction};
pub use force::ForceIncludeAction;
pub use gate::{Clock, GateOutcome, InclusionGate, RetryPolicy, TokioClock};
pub use withdraw::{fetch_withdrawal_receipt, WithdrawAction};

use client::TxReceipt;
use std::future::Future;
use withdrawal::Error;

/// Trait for executable onchain actions.
pub trait Action: Send + Sync {
    /// What a successful execution yields.
    type Output;

    /// Check to see if the action is ready to be executed.
    fn is_ready(&self) -> impl Future<Output = withdrawal::Result<bool>> + Send;

    /// Check if the action has already been completed.
    ///
    /// Returns true if the action was already executed successfully.
    fn is_completed(&self) -> impl Future<Output = withdrawal::Result<bool>> + Send;

    /// Execute the action. Submits at most one transaction and waits for it
    /// to be mined.
    fn execute(&mut self) -> impl Future<Output = withdrawal::Result<Self::Output>> + Send;

    /// Get a human-readable description of this action.
    fn description(&self) -> String;
}

/// Reverted receipts are fatal.
pub(crate) fn ensure_success(
    step: &'static str,
    receipt: TxReceipt,
) -> withdrawal::Result<TxReceipt> {
    if receipt.status {
        Ok(receipt)
    } else {
        Err(Error::Reverted {
            step,
            tx_hash: receipt.transaction_hash,
        })
    }
}
