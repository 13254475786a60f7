//! HTTP clients for the off-chain quote and pool APIs

pub mod http;

pub use http::{Envelope, QuoteHttpClient};
