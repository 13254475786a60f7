//! Request and response types shared by the adapters and services

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroize;

use crate::shared::errors::DexError;

/// Swap intent: trade `amount_in` of `input_mint` for `output_mint`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwapRequest {
    pub dex_type: String,
    pub input_mint: String,
    pub output_mint: String,
    pub amount_in: u64,
    #[serde(default)]
    pub slippage: f64,
    #[serde(default)]
    pub priority_fee: u64,
    pub user_wallet: String,
    /// Expected output from a prior quote; min-out is derived from it when set
    #[serde(default)]
    pub quoted_amount_out: Option<u64>,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiquidityOperation {
    Add,
    Remove,
}

impl LiquidityOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            LiquidityOperation::Add => "add",
            LiquidityOperation::Remove => "remove",
        }
    }

    /// Operation byte written into liquidity payloads (0 add, 1 remove)
    pub fn op_type(&self) -> u8 {
        match self {
            LiquidityOperation::Add => 0,
            LiquidityOperation::Remove => 1,
        }
    }
}

impl FromStr for LiquidityOperation {
    type Err = DexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "add" => Ok(LiquidityOperation::Add),
            "remove" => Ok(LiquidityOperation::Remove),
            _ => Err(DexError::validation("operation must be 'add' or 'remove'")),
        }
    }
}

impl fmt::Display for LiquidityOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Add or remove liquidity for a token pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityRequest {
    pub dex_type: String,
    pub operation: LiquidityOperation,
    pub token_a_mint: String,
    pub token_b_mint: String,
    pub amount_a: u64,
    pub amount_b: u64,
    #[serde(default)]
    pub slippage: f64,
    #[serde(default)]
    pub priority_fee: u64,
    pub user_wallet: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Outcome of a sign + simulate/send round
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionResult {
    pub transaction_data: String,
    pub signature: Option<String>,
    pub success: bool,
    pub error_message: Option<String>,
    pub gas_used: Option<u64>,
}

/// Response of the encode-swap / encode-liquidity operations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub success: bool,
    pub transaction: String,
    pub estimated_fee: u64,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransactionResponse {
    pub fn failure(request_id: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: request_id.to_string(),
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Input of the test/simulate operations; the key is wiped on drop and never printed
#[derive(Clone, Deserialize)]
pub struct TransactionTestRequest {
    /// Base64 of the bincode-serialized transaction
    pub transaction: String,
    /// Base58 encoded 64-byte keypair
    pub private_key: String,
    #[serde(default)]
    pub simulate_only: bool,
}

impl fmt::Debug for TransactionTestRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionTestRequest")
            .field("transaction", &self.transaction)
            .field("private_key", &"<redacted>")
            .field("simulate_only", &self.simulate_only)
            .finish()
    }
}

impl Drop for TransactionTestRequest {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionTestResponse {
    pub success: bool,
    pub stage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub logs: Vec<String>,
    pub gas_used: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransactionTestResponse {
    pub fn into_result(self, transaction_data: String) -> TransactionResult {
        TransactionResult {
            transaction_data,
            signature: self.signature,
            success: self.success,
            error_message: self.error,
            gas_used: if self.gas_used > 0 { Some(self.gas_used) } else { None },
        }
    }
}

/// DEX description as exposed to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DexInfo {
    pub name: String,
    pub program_id: String,
    pub router_address: Option<String>,
    pub endpoints: std::collections::HashMap<String, String>,
    pub enabled: bool,
    pub status: String,
}
