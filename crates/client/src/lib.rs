mod chain;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use chain::{ChainError, InboxContracts, L1Chain, MaxTimeVariation, RpcChain, TxReceipt};

use alloy_network::EthereumWallet;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// Error connecting to the RPC endpoint
    #[error("Connection error: {0}")]
    Connection(String),

    /// Error with private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),
}

/// Convenience function to create an ethereum rpc provider from url.
pub fn create_provider(rpc_url: &str) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;
    let provider = ProviderBuilder::new().connect_http(url);

    Ok(provider)
}

/// Parse a hex private key (with or without `0x` prefix) into a local signer.
pub fn parse_signer(private_key: &str) -> Result<PrivateKeySigner, ClientError> {
    private_key
        .parse()
        .map_err(|e| ClientError::InvalidPrivateKey(format!("{}", e)))
}

/// Create a provider with wallet signing capability from a private key.
///
/// The provider fills nonces from the account's pending transaction count, so
/// consecutive transactions from the same key never collide.
pub fn create_wallet_provider(
    rpc_url: &str,
    private_key: &str,
) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;

    let signer = parse_signer(private_key)?;
    let wallet = EthereumWallet::from(signer);

    let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

    Ok(provider)
}

/// Connect an [`RpcChain`] that signs with `private_key` and talks to the
/// given inbox contracts.
pub fn connect_chain(
    rpc_url: &str,
    private_key: &str,
    contracts: InboxContracts,
) -> Result<RpcChain<impl Provider + Clone>, ClientError> {
    let signer = parse_signer(private_key)?.address();
    let provider = create_wallet_provider(rpc_url, private_key)?;

    Ok(RpcChain::new(provider, signer, contracts))
}
