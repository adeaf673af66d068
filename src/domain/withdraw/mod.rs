//! Token withdrawal domain models
//!
//! - `token`: token, address validation and amount formatting
//! - `catalog`: seed + discovered tokens, prefix filtering
//! - `workflow`: selection state and its transition functions

mod catalog;
mod error;
mod token;
mod workflow;

pub use catalog::{TokenCatalog, FILTER_LIMIT};
pub use error::{ChainError, WorkflowError};
pub use token::{parse_address, short_address, to_checksum_address, Token, TokenAmount};
pub use workflow::{
    Action, LockedBalance, Outcome, Report, Request, SelectionState, Ticket, WithdrawReceipt,
    WithdrawalWorkflow,
};
