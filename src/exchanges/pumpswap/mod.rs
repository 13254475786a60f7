pub mod adapter;

pub use adapter::PumpSwapAdapter;
