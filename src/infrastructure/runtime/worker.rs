//! Async worker - runs in Tokio runtime and handles chain operations

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::Instant;

use crate::domain::ChainError;
use crate::infrastructure::ethereum::{create_client, ChainClient};
use crate::infrastructure::runtime::bridge::{RuntimeCommand, RuntimeEvent, WorkerSettings};
use crate::infrastructure::runtime::executor::execute;
use crate::infrastructure::subgraph::SubgraphClient;

const TRANSFERS_PAGE: usize = 20;
const RECONNECT_DELAY: Duration = Duration::from_millis(900);

/// Run the async worker loop
pub async fn run_async_worker(
    settings: WorkerSettings,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    if settings.endpoints.is_empty() {
        anyhow::bail!("No endpoints configured");
    }

    let endpoints = &settings.endpoints;
    let mut endpoint_index = 0usize;
    let mut client: Option<Arc<dyn ChainClient>> = None;
    let mut next_attempt = Instant::now();

    let subgraph = match settings.subgraph.as_deref() {
        Some(url) => Some(Arc::new(SubgraphClient::new(url)?)),
        None => None,
    };

    loop {
        // Try to connect if not connected. Commands are still drained while
        // disconnected so chain requests fail instead of queueing forever.
        if client.is_none() && Instant::now() >= next_attempt {
            let config = endpoints[endpoint_index].clone();
            match create_client(config.clone(), settings.signer.clone()).await {
                Ok(connected) => {
                    let _ = evt_tx.send(RuntimeEvent::Connected {
                        endpoint: connected.endpoint_name(),
                        chain_id: connected.chain_id(),
                        sender: connected.sender(),
                    });
                    client = Some(Arc::new(connected));
                }
                Err(err) => {
                    tracing::warn!(endpoint = %config.display(), error = %format!("{:#}", err), "connection failed");
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("Connection failed ({}): {:#}", config.display(), err),
                    });

                    // Try next endpoint if available
                    if endpoints.len() > 1 {
                        endpoint_index = (endpoint_index + 1) % endpoints.len();
                    }

                    next_attempt = Instant::now() + RECONNECT_DELAY;
                }
            }
        }

        // Process commands (non-blocking)
        while let Ok(cmd) = cmd_rx.try_recv() {
            match cmd {
                RuntimeCommand::Shutdown => return Ok(()),

                RuntimeCommand::SwitchEndpoint { index } => {
                    if index >= endpoints.len() {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!(
                                "Invalid endpoint index {} ({} total)",
                                index,
                                endpoints.len()
                            ),
                        });
                        continue;
                    }
                    endpoint_index = index;
                    client = None;
                    next_attempt = Instant::now();
                    break;
                }

                RuntimeCommand::Execute(request) => {
                    let Some(connected) = client.as_ref().map(Arc::clone) else {
                        tracing::warn!(action = %request.action(), "no node connected");
                        let outcome = request.fail(ChainError::Disconnected);
                        let _ = evt_tx.send(RuntimeEvent::Outcome(outcome));
                        continue;
                    };
                    let locker = settings.locker;
                    let evt_tx = evt_tx.clone();
                    tracing::debug!(action = %request.action(), ticket = ?request.ticket(), "executing");
                    tokio::spawn(async move {
                        let outcome = execute(connected.as_ref(), locker, request).await;
                        let _ = evt_tx.send(RuntimeEvent::Outcome(outcome));
                    });
                }

                RuntimeCommand::FetchTransfers => {
                    let Some(subgraph) = subgraph.as_ref().map(Arc::clone) else {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: "No subgraph configured".to_string(),
                        });
                        continue;
                    };
                    let evt_tx = evt_tx.clone();
                    tokio::spawn(async move {
                        match subgraph.transfers(TRANSFERS_PAGE).await {
                            Ok(transfers) => {
                                let _ = evt_tx.send(RuntimeEvent::TransfersReady { transfers });
                            }
                            Err(err) => {
                                tracing::warn!(error = %format!("{:#}", err), "transfers query failed");
                                let _ = evt_tx.send(RuntimeEvent::Error {
                                    message: format!("Transfers query failed: {:#}", err),
                                });
                            }
                        }
                    });
                }
            }
        }

        // Small yield to prevent busy loop
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
