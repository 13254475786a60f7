//! Infrastructure layer - external collaborators

pub mod rpc_client;

pub use rpc_client::{LedgerRpc, RetryingLedger, SolanaRpcClient};
