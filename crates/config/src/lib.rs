//! Configuration types for the forced-inclusion withdrawal system.
//!
//! This crate provides:
//! - Network configurations (Arbitrum One on a forked mainnet, Arbitrum Sepolia)
//! - Contract addresses for the parent chain inbox contracts
//! - Chain ids used by the safety guard and the inclusion gate

pub mod network;

pub use network::{
    ArbitrumConfig, NetworkConfig, NetworkConfigBuilder, NetworkType,
    LOCAL_FORK_CHAIN_ID, PRODUCTION_CHAIN_ID,
};
