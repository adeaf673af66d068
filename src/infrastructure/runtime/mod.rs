//! Runtime infrastructure - Tokio runtime bridge for async operations

mod bridge;
mod executor;
mod worker;

pub use bridge::{RuntimeBridge, RuntimeCommand, RuntimeEvent, WorkerSettings};
pub use executor::execute;
pub use worker::run_async_worker;
