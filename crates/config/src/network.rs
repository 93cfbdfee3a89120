//! Network configuration for forced withdrawals.
//!
//! Provides chain-specific addresses and parameters for the rollups the
//! orchestrator can target. Local Nitro deployments get fresh contract
//! addresses on every run, so every address can be overridden through
//! [`NetworkConfigBuilder`].

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

/// Ethereum mainnet chain id. No transaction is ever built against it.
pub const PRODUCTION_CHAIN_ID: u64 = 1;

/// Chain id reported by a local hardhat/anvil fork. Blocks are mined on
/// demand there, so the inclusion gate skips its timed wait.
pub const LOCAL_FORK_CHAIN_ID: u64 = 31337;

/// Network type (mainnet or testnet rollup).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Mainnet,
    Testnet,
}

/// Arbitrum rollup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrumConfig {
    /// L2 chain ID, part of the predicted L2 transaction
    pub chain_id: u64,
    /// Delayed inbox contract on L1
    pub delayed_inbox: Address,
    /// Sequencer inbox contract on L1
    pub sequencer_inbox: Address,
}

impl ArbitrumConfig {
    /// Arbitrum One configuration.
    pub const fn mainnet() -> Self {
        Self {
            chain_id: 42161,
            // https://etherscan.io/address/0x4Dbd4fc535Ac27206064B68FfCf827b0A60BAB3f
            delayed_inbox: address!("0x4Dbd4fc535Ac27206064B68FfCf827b0A60BAB3f"),
            // https://etherscan.io/address/0x1c479675ad559dc151f6ec7ed3fbf8cee79582b6
            sequencer_inbox: address!("0x1c479675ad559dc151f6ec7ed3fbf8cee79582b6"),
        }
    }

    /// Arbitrum Sepolia configuration.
    pub const fn sepolia() -> Self {
        Self {
            chain_id: 421614,
            // https://sepolia.etherscan.io/address/0xaAe29B0366299461418F5324a79Afc425BE5ae21
            delayed_inbox: address!("0xaAe29B0366299461418F5324a79Afc425BE5ae21"),
            // https://sepolia.etherscan.io/address/0x6c97864CE4bEf387dE0b3310A44230f7E3F1be0D
            sequencer_inbox: address!("0x6c97864CE4bEf387dE0b3310A44230f7E3F1be0D"),
        }
    }
}

/// Complete network configuration for forced withdrawals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network type (mainnet or testnet)
    pub network_type: NetworkType,
    /// Arbitrum/L2 configuration
    pub arbitrum: ArbitrumConfig,
}

impl NetworkConfig {
    /// Create mainnet configuration.
    pub const fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            arbitrum: ArbitrumConfig::mainnet(),
        }
    }

    /// Create testnet (Sepolia) configuration.
    pub const fn sepolia() -> Self {
        Self {
            network_type: NetworkType::Testnet,
            arbitrum: ArbitrumConfig::sepolia(),
        }
    }

    /// Create configuration from network type.
    pub const fn from_network_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Testnet => Self::sepolia(),
        }
    }
}

/// Builder for custom network configurations.
#[derive(Debug, Clone)]
pub struct NetworkConfigBuilder {
    network_type: NetworkType,
    arbitrum: ArbitrumConfig,
}

impl NetworkConfigBuilder {
    /// Start with mainnet defaults.
    pub const fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            arbitrum: ArbitrumConfig::mainnet(),
        }
    }

    /// Start with testnet defaults.
    pub const fn testnet() -> Self {
        Self {
            network_type: NetworkType::Testnet,
            arbitrum: ArbitrumConfig::sepolia(),
        }
    }

    /// Start from the defaults of the given network type.
    pub const fn from_network_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Testnet => Self::testnet(),
        }
    }

    /// Override the delayed inbox address.
    pub const fn delayed_inbox(mut self, address: Address) -> Self {
        self.arbitrum.delayed_inbox = address;
        self
    }

    /// Override the sequencer inbox address.
    pub const fn sequencer_inbox(mut self, address: Address) -> Self {
        self.arbitrum.sequencer_inbox = address;
        self
    }

    /// Override the L2 chain id.
    pub const fn l2_chain_id(mut self, chain_id: u64) -> Self {
        self.arbitrum.chain_id = chain_id;
        self
    }

    /// Build the network configuration.
    pub const fn build(self) -> NetworkConfig {
        NetworkConfig {
            network_type: self.network_type,
            arbitrum: self.arbitrum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_config() {
        let config = NetworkConfig::mainnet();
        assert_eq!(config.arbitrum.chain_id, 42161);
        assert_eq!(config.network_type, NetworkType::Mainnet);
    }

    #[test]
    fn test_sepolia_config() {
        let config = NetworkConfig::sepolia();
        assert_eq!(config.arbitrum.chain_id, 421614);
        assert_eq!(config.network_type, NetworkType::Testnet);
    }

    #[test]
    fn test_custom_config_builder() {
        let inbox = address!("1111111111111111111111111111111111111111");
        let sequencer_inbox = address!("2222222222222222222222222222222222222222");

        let config = NetworkConfigBuilder::mainnet()
            .delayed_inbox(inbox)
            .sequencer_inbox(sequencer_inbox)
            .l2_chain_id(412346)
            .build();

        assert_eq!(config.arbitrum.delayed_inbox, inbox);
        assert_eq!(config.arbitrum.sequencer_inbox, sequencer_inbox);
        assert_eq!(config.arbitrum.chain_id, 412346);
        assert_eq!(config.network_type, NetworkType::Mainnet);
    }

    #[test]
    fn test_network_type_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            network: NetworkType,
        }

        let wrapper: Wrapper = toml::from_str("network = \"testnet\"").unwrap();
        assert_eq!(wrapper.network, NetworkType::Testnet);
    }
}
