use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::config::DexConfig;
use crate::exchanges::api_clients::QuoteHttpClient;
use crate::exchanges::utils::min_amount_out;
use crate::shared::errors::{DexError, DexResult};
use crate::shared::types::SwapRequest;

/// Slippage sent with quote requests when the caller has not chosen one yet
pub const QUOTE_SLIPPAGE: f64 = 0.005;
pub const QUOTE_SLIPPAGE_BPS: u32 = 50;

/// JSON body of the POST quote endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequestBody<'a> {
    pub input_mint: &'a str,
    pub output_mint: &'a str,
    pub amount: u64,
    pub slippage: f64,
}

impl<'a> QuoteRequestBody<'a> {
    pub fn new(input_mint: &'a str, output_mint: &'a str, amount: u64) -> Self {
        Self {
            input_mint,
            output_mint,
            amount,
            slippage: QUOTE_SLIPPAGE,
        }
    }
}

/// State every adapter carries: its config, parsed program id and HTTP client
#[derive(Debug, Clone)]
pub struct BaseAdapter {
    config: DexConfig,
    program_id: Pubkey,
    http: QuoteHttpClient,
}

impl BaseAdapter {
    pub fn new(config: DexConfig) -> DexResult<Self> {
        let program_id = Pubkey::from_str(&config.program_id)
            .map_err(|e| DexError::Config(format!("invalid program ID: {}", e)))?;
        let http = QuoteHttpClient::new(config.timeout(), config.retry_count)?;

        Ok(Self {
            config,
            program_id,
            http,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &DexConfig {
        &self.config
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    pub fn http(&self) -> &QuoteHttpClient {
        &self.http
    }

    #[cfg(test)]
    pub(crate) fn set_http(&mut self, http: QuoteHttpClient) {
        self.http = http;
    }

    pub fn endpoint(&self, key: &str) -> DexResult<&str> {
        self.config
            .endpoint(key)
            .ok_or_else(|| DexError::validation(format!("{} endpoint not configured", key)))
    }

    /// `{api}/{path}` under the configured `api` base URL
    pub fn api_url(&self, path: &str) -> DexResult<String> {
        let api = self.endpoint("api")?;
        Ok(format!("{}/{}", api.trim_end_matches('/'), path))
    }

    /// Explicit `quote` endpoint, else `{api}/quote`
    pub fn quote_url(&self) -> DexResult<String> {
        match self.config.endpoint("quote") {
            Some(url) => Ok(url.to_string()),
            None => self
                .api_url("quote")
                .map_err(|_| DexError::validation("quote endpoint not configured")),
        }
    }
}

/// Min-out for a swap: from the quoted output when known, else from the input amount
pub fn swap_min_amount_out(req: &SwapRequest) -> u64 {
    min_amount_out(req.quoted_amount_out.unwrap_or(req.amount_in), req.slippage)
}

/// Decimal amount as returned in string form by some quote APIs; empty means zero
pub fn parse_amount(field: &str, value: &str) -> DexResult<u64> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse::<u64>()
        .map_err(|e| DexError::Serialization(format!("invalid {} '{}': {}", field, value, e)))
}
