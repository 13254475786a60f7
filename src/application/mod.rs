//! Application layer - use cases and CLI

pub mod commands;
pub mod services;

pub use commands::{Cli, CommandExecutor, Commands};
pub use services::{DexService, TransactionService};
