use thiserror::Error;

/// Failure of a single chain interaction, carried back inside an outcome
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("transaction reverted: {0}")]
    Reverted(String),
    #[error("signature rejected: {0}")]
    Rejected(String),
    #[error("unexpected return data: {0}")]
    Decode(String),
    #[error("not connected to a node")]
    Disconnected,
}

impl ChainError {
    /// Classify a provider error by its rendered message.
    pub fn classify(err: &anyhow::Error) -> Self {
        let message = format!("{:#}", err);
        let lower = message.to_lowercase();
        if lower.contains("user rejected") || lower.contains("user denied") {
            ChainError::Rejected(message)
        } else if lower.contains("revert") {
            ChainError::Reverted(message)
        } else {
            ChainError::Rpc(message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("early withdrawal with penalty is not supported")]
    EarlyWithdrawalUnsupported,
    #[error("no token selected")]
    NoTokenSelected,
}
