//! Force a withdrawal out of a forked Arbitrum chain.
//!
//! ```text
//! force-withdraw <NONCE> <VALUE|all> <ADDRESS> [--config config.toml] [--dry-run] [--json]
//! ```

use action::TokioClock;
use balance::{BalanceOracle, ExplorerBalanceOracle, RpcBalanceOracle};
use clap::Parser;
use orchestrator::{config::Config, Orchestrator};
use tracing::info;
use withdrawal::WithdrawalInput;

#[derive(Parser)]
#[command(name = "force-withdraw")]
#[command(about = "Force a withdrawal through the delayed inbox of a forked parent chain")]
struct Cli {
    /// L2 nonce of the account at the last block before the fork
    nonce: String,

    /// Amount in wei, or `all` to withdraw the pre-fork balance minus L2 fees
    value: String,

    /// Destination of the withdrawn ETH
    address: String,

    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Private key for signing transactions (hex string, with or without 0x prefix)
    #[arg(short = 'k', long, env = "PRIVATE_KEY")]
    private_key: String,

    /// Last L2 block before the fork, overrides the configuration file
    #[arg(long, env = "L2_FORK_BLOCK")]
    l2_fork_block: Option<u64>,

    /// Dry-run mode: validate and print the plan without sending transactions
    #[arg(long)]
    dry_run: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_file(&cli.config)?;

    if cli.dry_run {
        config.dry_run = true;
    }
    if cli.l2_fork_block.is_some() {
        config.l2_fork_block = cli.l2_fork_block;
    }

    let network = config.network_config();
    info!(
        network = ?config.network,
        delayed_inbox = %network.arbitrum.delayed_inbox,
        sequencer_inbox = %network.arbitrum.sequencer_inbox,
        l2_chain_id = network.arbitrum.chain_id,
        dry_run = config.dry_run,
        "Loaded config"
    );

    match config.l2_rpc_url.clone() {
        Some(url) => {
            let oracle = RpcBalanceOracle::new(client::create_provider(&url)?);
            force_withdraw(&cli, &config, oracle).await
        }
        None => {
            let oracle = ExplorerBalanceOracle::new(
                config.explorer_api_url.clone(),
                config.explorer_api_key.clone(),
            );
            force_withdraw(&cli, &config, oracle).await
        }
    }
}

async fn force_withdraw<O: BalanceOracle>(
    cli: &Cli,
    config: &Config,
    oracle: O,
) -> eyre::Result<()> {
    let input = WithdrawalInput::new(&cli.nonce, &cli.value, &cli.address);

    // Reject a malformed request before connecting to anything
    input.parse()?;

    let chain =
        client::connect_chain(&config.l1_rpc_url, &cli.private_key, config.contracts())?;
    let orchestrator = Orchestrator::new(chain, oracle, TokioClock, config.settings());

    if config.dry_run {
        let prepared = orchestrator.prepare(&input).await?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&prepared)?);
        } else {
            info!("DRY-RUN: no transaction sent");
            println!(
                "Would force withdraw {} wei to {}",
                prepared.request.value, prepared.request.destination
            );
            println!(
                "Predicted L2 transaction hash: {}",
                prepared.predicted_l2_tx_hash
            );
        }
        return Ok(());
    }

    let outcome = orchestrator.run(&input).await?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("Withdrawal transaction: {}", outcome.withdrawal_tx);
        println!(
            "Force inclusion transaction: {}",
            outcome.inclusion.transaction_hash
        );
        println!(
            "Batch sequence number: {}",
            outcome.inclusion.batch_sequence_number
        );
        println!(
            "Predicted L2 transaction hash: {}",
            outcome.predicted_l2_tx_hash
        );
    }

    Ok(())
}
