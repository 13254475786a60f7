//! DEX domain - adapter registry

pub mod registry;

pub use registry::{AdapterRegistry, RegistryHandle, RegistrySnapshot};
