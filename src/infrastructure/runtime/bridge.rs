//! Runtime bridge - connects sync TUI thread with async Tokio runtime
//!
//! This module provides a bridge between the synchronous TUI (ratatui) thread
//! and the asynchronous Tokio runtime that talks to the node.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use tokio::runtime::Runtime;

use crate::domain::{Outcome, Request};
use crate::infrastructure::ethereum::ProviderConfig;
use crate::infrastructure::runtime::worker::run_async_worker;
use crate::infrastructure::subgraph::TransferRecord;

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum RuntimeCommand {
    /// Run a workflow request against the chain
    Execute(Request),
    /// Query recent transfers from the subgraph
    FetchTransfers,
    /// Switch to a different endpoint
    SwitchEndpoint { index: usize },
    /// Shutdown the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Successfully connected to a node
    Connected {
        endpoint: String,
        chain_id: u64,
        sender: Option<Address>,
    },
    /// A request finished
    Outcome(Outcome),
    /// Transfers from the subgraph
    TransfersReady { transfers: Vec<TransferRecord> },
    /// Error occurred
    Error { message: String },
}

/// Everything the worker needs to reach the chain
#[derive(Clone)]
pub struct WorkerSettings {
    pub endpoints: Vec<ProviderConfig>,
    pub locker: Address,
    pub signer: Option<PrivateKeySigner>,
    pub subgraph: Option<String>,
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    /// Spawn the worker thread with its own Tokio runtime
    pub fn new(settings: WorkerSettings) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        thread::Builder::new()
            .name("unlock-runtime".to_string())
            .spawn(move || {
                let rt = match Runtime::new() {
                    Ok(rt) => rt,
                    Err(err) => {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Failed to create Tokio runtime: {err}"),
                        });
                        return;
                    }
                };
                rt.block_on(async {
                    if let Err(err) = run_async_worker(settings, cmd_rx, evt_tx.clone()).await {
                        tracing::error!(error = %format!("{:#}", err), "worker exited");
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Worker exited: {:#}", err),
                        });
                    }
                });
            })?;

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}
