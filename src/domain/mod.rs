//! Domain layer - adapter registry and transaction execution

pub mod dex;
pub mod execution;
