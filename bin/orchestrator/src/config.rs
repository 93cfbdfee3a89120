use crate::Settings;
use action::RetryPolicy;
use alloy_primitives::Address;
use balance::explorer::ARBISCAN_API_URL;
use client::InboxContracts;
use config::{NetworkConfig, NetworkConfigBuilder, NetworkType};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_explorer_api_url() -> String {
    ARBISCAN_API_URL.to_string()
}

/// Top-level orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// L1 RPC endpoint url (the forked parent chain)
    pub l1_rpc_url: String,

    /// Rollup the fork belongs to
    pub network: NetworkType,

    /// Delayed inbox override, for local deployments
    #[serde(default)]
    pub delayed_inbox: Option<Address>,

    /// Sequencer inbox override, for local deployments
    #[serde(default)]
    pub sequencer_inbox: Option<Address>,

    /// L2 chain id override
    #[serde(default)]
    pub l2_chain_id: Option<u64>,

    /// Last L2 block before the fork. Required to withdraw `all`.
    #[serde(default)]
    pub l2_fork_block: Option<u64>,

    /// Explorer API used for historical balances
    #[serde(default = "default_explorer_api_url")]
    pub explorer_api_url: String,

    #[serde(default)]
    pub explorer_api_key: Option<String>,

    /// L2 archive node. Takes precedence over the explorer when set.
    #[serde(default)]
    pub l2_rpc_url: Option<String>,

    /// How long the inclusion gate waits for a new block
    #[serde(default)]
    pub inclusion: RetryPolicy,

    /// Dry-run mode: validate and print the plan without sending transactions
    #[serde(default)]
    pub dry_run: bool,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;

        Ok(config)
    }

    /// Network defaults with the configured overrides applied.
    pub fn network_config(&self) -> NetworkConfig {
        let mut builder = NetworkConfigBuilder::from_network_type(self.network);
        if let Some(address) = self.delayed_inbox {
            builder = builder.delayed_inbox(address);
        }
        if let Some(address) = self.sequencer_inbox {
            builder = builder.sequencer_inbox(address);
        }
        if let Some(chain_id) = self.l2_chain_id {
            builder = builder.l2_chain_id(chain_id);
        }
        builder.build()
    }

    pub fn contracts(&self) -> InboxContracts {
        let network = self.network_config();
        InboxContracts {
            delayed_inbox: network.arbitrum.delayed_inbox,
            sequencer_inbox: network.arbitrum.sequencer_inbox,
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            l2_chain_id: self.network_config().arbitrum.chain_id,
            l2_fork_block: self.l2_fork_block,
            inclusion: self.inclusion,
        }
    }
}
