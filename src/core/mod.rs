//! Core UI plumbing shared by the app and the binary

pub mod command;

pub use command::{parse_command, Command};
