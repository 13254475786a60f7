use serde::{Deserialize, Serialize};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
use std::fmt;
use std::str::FromStr;

use crate::shared::errors::DexError;
use crate::shared::types::{LiquidityRequest, SwapRequest};

/// The closed set of DEX programs this service can encode for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DexKind {
    Raydium,
    Pumpfun,
    PumpSwap,
}

/// What a DEX variant can build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub swap: bool,
    pub liquidity: bool,
}

impl DexKind {
    pub const ALL: [DexKind; 3] = [DexKind::Raydium, DexKind::Pumpfun, DexKind::PumpSwap];

    pub fn as_str(&self) -> &'static str {
        match self {
            DexKind::Raydium => "raydium",
            DexKind::Pumpfun => "pumpfun",
            DexKind::PumpSwap => "pumpswap",
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            DexKind::Raydium | DexKind::PumpSwap => Capabilities { swap: true, liquidity: true },
            DexKind::Pumpfun => Capabilities { swap: true, liquidity: false },
        }
    }
}

impl FromStr for DexKind {
    type Err = DexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raydium" => Ok(DexKind::Raydium),
            "pumpfun" | "pump.fun" => Ok(DexKind::Pumpfun),
            "pumpswap" | "pump_swap" => Ok(DexKind::PumpSwap),
            _ => Err(DexError::AdapterNotFound(s.to_string())),
        }
    }
}

impl fmt::Display for DexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed view over the two request variants an adapter validates
#[derive(Debug, Clone, Copy)]
pub enum DexRequest<'a> {
    Swap(&'a SwapRequest),
    Liquidity(&'a LiquidityRequest),
}

/// One encoded program call; converted into a `solana_sdk` instruction by the assembler
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionData {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

impl InstructionData {
    pub fn signers(&self) -> impl Iterator<Item = &Pubkey> {
        self.accounts.iter().filter(|meta| meta.is_signer).map(|meta| &meta.pubkey)
    }
}

impl From<InstructionData> for Instruction {
    fn from(ix: InstructionData) -> Self {
        Instruction {
            program_id: ix.program_id,
            accounts: ix.accounts,
            data: ix.data,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub input_mint: String,
    pub output_mint: String,
    pub pool_id: String,
    pub fee_rate: f64,
    pub dex: String,
    pub amount_in: u64,
    pub amount_out: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub input_mint: String,
    pub output_mint: String,
    pub amount_in: u64,
    pub amount_out: u64,
    pub min_amount_out: u64,
    pub price_impact: f64,
    pub fee: u64,
    pub route: Vec<Route>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub address: String,
    pub token_a_mint: String,
    pub token_b_mint: String,
    pub token_a_name: String,
    pub token_b_name: String,
    pub reserve_a: u64,
    pub reserve_b: u64,
    pub liquidity: u64,
    pub fee_rate: f64,
    pub tvl: f64,
    pub volume_24h: f64,
    pub apr: f64,
}
