//! Domain layer - token catalog and the withdrawal workflow
//!
//! Nothing in here performs I/O. Operations return requests that the
//! runtime executes, and completions come back as outcomes.

pub mod withdraw;

pub use withdraw::{
    parse_address, short_address, to_checksum_address, Action, ChainError, LockedBalance,
    Outcome, Report, Request, SelectionState, Ticket, Token, TokenAmount, TokenCatalog,
    WithdrawReceipt, WithdrawalWorkflow, WorkflowError, FILTER_LIMIT,
};
