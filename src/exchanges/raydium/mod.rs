pub mod adapter;

pub use adapter::RaydiumAdapter;
