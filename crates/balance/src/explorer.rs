//! Etherscan-family explorer API client (Arbiscan by default).

use crate::{Balance, BalanceError, BalanceOracle};
use alloy_primitives::{Address, U256};
use serde::Deserialize;
use std::{future::Future, str::FromStr};
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::{debug, warn};

/// Default Arbitrum One explorer endpoint.
pub const ARBISCAN_API_URL: &str = "https://api.arbiscan.io/api";

/// Balance oracle backed by an explorer's `account/balance` endpoint.
#[derive(Debug, Clone)]
pub struct ExplorerBalanceOracle {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl ExplorerBalanceOracle {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key,
        }
    }

    /// Query parameters for a balance lookup. Explorers take the block tag
    /// as a hex quantity.
    fn query(&self, address: Address, block: u64) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("module", "account".to_string()),
            ("action", "balance".to_string()),
            ("address", address.to_string()),
            ("tag", format!("{block:#x}")),
        ];
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.clone()));
        }
        query
    }

    async fn fetch(&self, address: Address, block: u64) -> Result<U256, BalanceError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&self.query(address, block))
            .send()
            .await
            .map_err(|e| BalanceError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BalanceError::Transport(format!(
                "explorer returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BalanceError::Transport(e.to_string()))?;

        parse_response(&body)
    }
}

/// Runs `lookup` with backoff. Only transient failures are retried.
async fn with_retry<F, Fut>(lookup: F) -> Result<U256, BalanceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<U256, BalanceError>>,
{
    // 200ms, 400ms, 800ms
    let retry_strategy = ExponentialBackoff::from_millis(2).factor(100).take(3);

    RetryIf::spawn(retry_strategy, lookup, BalanceError::is_transient).await
}

impl BalanceOracle for ExplorerBalanceOracle {
    async fn balance_at(&self, address: Address, block: u64) -> Result<Balance, BalanceError> {
        debug!(%address, block, api = %self.api_url, "Querying historical balance from explorer");

        let amount = with_retry(|| async {
            self.fetch(address, block).await.inspect_err(|e| {
                warn!(%address, block, error = %e, "Balance lookup failed");
            })
        })
        .await?;

        Ok(Balance {
            holder: address,
            block,
            amount,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    status: String,
    message: String,
    result: String,
}

/// A body that is not an explorer response is malformed, not a transport
/// failure.
fn parse_response(body: &str) -> Result<U256, BalanceError> {
    let response: ExplorerResponse =
        serde_json::from_str(body).map_err(|_| BalanceError::Malformed(body.to_string()))?;

    response.into_amount()
}

impl ExplorerResponse {
    fn into_amount(self) -> Result<U256, BalanceError> {
        if self.status != "1" {
            return Err(BalanceError::Api {
                message: self.message,
                result: self.result,
            });
        }

        U256::from_str(&self.result).map_err(|_| BalanceError::Malformed(self.result))
    }
}
