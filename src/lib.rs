//! dexcodec - turns swap and liquidity intents into Solana DEX transactions

pub mod application;
pub mod config;
pub mod domain;
pub mod exchanges;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::{DexService, TransactionService};
pub use config::Config;
pub use domain::dex::{AdapterRegistry, RegistryHandle};
pub use domain::execution::{TransactionAssembler, TransactionExecutor};
pub use exchanges::{create_adapter, DexAdapter};
pub use shared::errors::{DexError, DexResult};
