//! Contract bindings for all external contracts.
//!
//! This crate consolidates the Solidity interfaces the forced-inclusion
//! withdrawal flow talks to:
//! - Arbitrum delayed inbox and bridge (withdrawal submission, `MessageDelivered`)
//! - Arbitrum sequencer inbox (delay policy, forced inclusion)
//! - ArbSys precompile (L2 call data for the predicted withdrawal)
//!
//! All bindings are generated using alloy's `sol!` macro.

pub mod arbitrum;
