//! GraphQL client for the lock contract's indexing subgraph
//!
//! Only the recent `transfers` list is queried. Records are logged and
//! counted; they are not rendered yet.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const TRANSFERS_QUERY: &str = "query Transfers($first: Int!) { \
transfers(first: $first, orderBy: timestamp, orderDirection: desc) { \
id from to token amount timestamp } }";

/// One indexed transfer into or out of the lock contract
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransferRecord {
    pub id: String,
    pub from: String,
    pub to: String,
    pub token: String,
    pub amount: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl TransferRecord {
    /// Timestamp as a UTC date, when the subgraph provides unix seconds
    pub fn time(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        let secs = self.timestamp.as_deref()?.parse::<i64>().ok()?;
        chrono::DateTime::from_timestamp(secs, 0)
    }
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: TransfersVariables,
}

#[derive(Debug, Serialize)]
struct TransfersVariables {
    first: usize,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<TransfersData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct TransfersData {
    #[serde(default)]
    transfers: Vec<TransferRecord>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

pub struct SubgraphClient {
    http: reqwest::Client,
    url: String,
}

impl SubgraphClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub async fn transfers(&self, first: usize) -> Result<Vec<TransferRecord>> {
        let body = GraphQlRequest {
            query: TRANSFERS_QUERY,
            variables: TransfersVariables { first },
        };

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .context("Subgraph request failed")?
            .error_for_status()
            .context("Subgraph returned an error status")?;

        let text = response.text().await.context("Failed to read subgraph body")?;
        let transfers = parse_transfers(&text)?;

        tracing::info!(count = transfers.len(), url = %self.url, "transfers loaded");
        for transfer in &transfers {
            tracing::debug!(
                id = %transfer.id,
                from = %transfer.from,
                to = %transfer.to,
                token = %transfer.token,
                amount = %transfer.amount,
                at = ?transfer.time(),
                "transfer"
            );
        }

        Ok(transfers)
    }
}

fn parse_transfers(body: &str) -> Result<Vec<TransferRecord>> {
    let response: GraphQlResponse =
        serde_json::from_str(body).context("Invalid subgraph response")?;

    if let Some(err) = response.errors.first() {
        anyhow::bail!("Subgraph error: {}", err.message);
    }

    Ok(response.data.map(|data| data.transfers).unwrap_or_default())
}
