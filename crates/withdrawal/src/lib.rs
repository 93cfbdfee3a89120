//! Forced-inclusion withdrawal domain.
//!
//! - [`types`]: protocol constants and the values passed between stages
//! - [`request`]: caller input validation and value resolution
//! - [`event`]: delayed message and batch extraction from receipts
//! - [`hash`]: prediction of the resulting L2 transaction hash

pub mod error;
pub mod event;
pub mod hash;
pub mod request;
pub mod types;

pub use error::{Error, Result};
pub use event::{extract_batch_sequence_number, extract_delayed_message};
pub use hash::{predict_l2_tx_hash, UnsignedL2Transaction};
pub use request::{ParsedInput, ValueSpec, WithdrawalInput};
pub use types::{DelayPolicy, DelayedMessage, InclusionResult, WithdrawalRequest};
