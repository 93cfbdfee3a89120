use crate::{Balance, BalanceError, BalanceOracle};
use alloy_primitives::Address;
use alloy_provider::Provider;
use alloy_rpc_types_eth::BlockId;
use tracing::debug;

/// Balance oracle reading `eth_getBalance` from an L2 archive node.
pub struct RpcBalanceOracle<P> {
    provider: P,
}

impl<P> RpcBalanceOracle<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P> BalanceOracle for RpcBalanceOracle<P>
where
    P: Provider + Clone,
{
    async fn balance_at(&self, address: Address, block: u64) -> Result<Balance, BalanceError> {
        debug!(%address, block, "Querying historical balance from L2 node");

        let amount = self
            .provider
            .get_balance(address)
            .block_id(BlockId::number(block))
            .await
            .map_err(|e| BalanceError::Transport(e.to_string()))?;

        Ok(Balance {
            holder: address,
            block,
            amount,
        })
    }
}
