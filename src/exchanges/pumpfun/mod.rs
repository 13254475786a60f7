pub mod adapter;

pub use adapter::PumpfunAdapter;
