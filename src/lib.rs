//! Unlock: withdraw previously locked ERC-20 tokens from a lock contract.
//!
//! - `domain`: token catalog and the selection/withdrawal workflow
//! - `infrastructure`: Alloy chain client, runtime bridge, subgraph, token lists
//! - `app` / `ui`: terminal front end state and rendering

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod ui;
