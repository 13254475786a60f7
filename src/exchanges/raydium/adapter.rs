use async_trait::async_trait;
use serde::Deserialize;
use solana_sdk::instruction::AccountMeta;
use tracing::{debug, info};

use crate::config::DexConfig;
use crate::exchanges::accounts::{associated_token_address, token_program};
use crate::exchanges::api_clients::Envelope;
use crate::exchanges::base::{parse_amount, swap_min_amount_out, BaseAdapter, QUOTE_SLIPPAGE_BPS};
use crate::exchanges::layout::{self, RAYDIUM_LIQUIDITY, RAYDIUM_SWAP};
use crate::exchanges::types::{DexKind, DexRequest, InstructionData, PoolInfo, QuoteResponse};
use crate::exchanges::utils::{parse_pubkey, validate_liquidity_request, validate_swap_request};
use crate::exchanges::DexAdapter;
use crate::shared::errors::DexResult;
use crate::shared::types::{LiquidityRequest, SwapRequest};

/// Raydium quote payload; amounts arrive as decimal strings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RaydiumQuote {
    #[serde(default)]
    out_amount: String,
    #[serde(default)]
    min_out_amount: String,
    #[serde(default, rename = "priceImpactPct")]
    price_impact: f64,
    #[serde(default)]
    fee: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RaydiumPool {
    id: String,
    base_mint: String,
    quote_mint: String,
    #[serde(default)]
    base_symbol: String,
    #[serde(default)]
    quote_symbol: String,
    #[serde(default)]
    liquidity: String,
    #[serde(default, rename = "volume24h")]
    volume_24h: f64,
    #[serde(default)]
    fee_rate: f64,
    #[serde(default)]
    tvl: f64,
    #[serde(default)]
    apr: f64,
}

/// Raydium AMM: swaps and liquidity against the user's ATAs, no PDAs involved
pub struct RaydiumAdapter {
    base: BaseAdapter,
}

impl RaydiumAdapter {
    pub fn new(config: DexConfig) -> DexResult<Self> {
        Ok(Self {
            base: BaseAdapter::new(config)?,
        })
    }
}

#[async_trait]
impl DexAdapter for RaydiumAdapter {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn config(&self) -> &DexConfig {
        self.base.config()
    }

    fn kind(&self) -> DexKind {
        DexKind::Raydium
    }

    fn validate_request(&self, request: DexRequest<'_>) -> DexResult<()> {
        match request {
            DexRequest::Swap(req) => validate_swap_request(req),
            DexRequest::Liquidity(req) => validate_liquidity_request(req),
        }
    }

    fn build_swap_instruction(&self, req: &SwapRequest) -> DexResult<InstructionData> {
        validate_swap_request(req)?;

        let wallet = parse_pubkey("user wallet", &req.user_wallet)?;
        let input_mint = parse_pubkey("input mint", &req.input_mint)?;
        let output_mint = parse_pubkey("output mint", &req.output_mint)?;

        let accounts = vec![
            AccountMeta::new_readonly(wallet, true),
            AccountMeta::new(associated_token_address(&wallet, &input_mint), false),
            AccountMeta::new(associated_token_address(&wallet, &output_mint), false),
            AccountMeta::new_readonly(input_mint, false),
            AccountMeta::new_readonly(output_mint, false),
            AccountMeta::new_readonly(token_program(), false),
        ];

        let min_out = swap_min_amount_out(req);
        debug!(dex = self.name(), amount_in = req.amount_in, min_out, "encoding raydium swap");

        Ok(InstructionData {
            program_id: self.base.program_id(),
            accounts,
            data: layout::encode_swap(RAYDIUM_SWAP, req.amount_in, min_out),
        })
    }

    fn build_liquidity_instruction(&self, req: &LiquidityRequest) -> DexResult<InstructionData> {
        validate_liquidity_request(req)?;

        let wallet = parse_pubkey("user wallet", &req.user_wallet)?;
        let mint_a = parse_pubkey("token A mint", &req.token_a_mint)?;
        let mint_b = parse_pubkey("token B mint", &req.token_b_mint)?;

        let accounts = vec![
            AccountMeta::new_readonly(wallet, true),
            AccountMeta::new(associated_token_address(&wallet, &mint_a), false),
            AccountMeta::new(associated_token_address(&wallet, &mint_b), false),
            AccountMeta::new_readonly(mint_a, false),
            AccountMeta::new_readonly(mint_b, false),
            AccountMeta::new_readonly(token_program(), false),
        ];

        Ok(InstructionData {
            program_id: self.base.program_id(),
            accounts,
            data: layout::encode_liquidity(
                RAYDIUM_LIQUIDITY,
                req.operation.op_type(),
                req.amount_a,
                req.amount_b,
            ),
        })
    }

    async fn get_quote(&self, input_mint: &str, output_mint: &str, amount_in: u64) -> DexResult<QuoteResponse> {
        let url = self.base.endpoint("quote")?;
        let query = [
            ("inputMint", input_mint.to_string()),
            ("outputMint", output_mint.to_string()),
            ("amount", amount_in.to_string()),
            ("slippageBps", QUOTE_SLIPPAGE_BPS.to_string()),
        ];

        let envelope: Envelope<RaydiumQuote> = self.base.http().get_json(url, &query).await?;
        let quote = envelope.into_data("quote")?;

        let amount_out = parse_amount("outAmount", &quote.out_amount)?;
        let min_amount_out = parse_amount("minOutAmount", &quote.min_out_amount)?.min(amount_out);

        info!(dex = self.name(), amount_in, amount_out, "raydium quote");

        Ok(QuoteResponse {
            input_mint: input_mint.to_string(),
            output_mint: output_mint.to_string(),
            amount_in,
            amount_out,
            min_amount_out,
            price_impact: quote.price_impact,
            fee: parse_amount("fee", &quote.fee)?,
            route: Vec::new(),
        })
    }

    async fn get_pools(&self) -> DexResult<Vec<PoolInfo>> {
        let url = self.base.endpoint("pools")?;
        let envelope: Envelope<Vec<RaydiumPool>> = self.base.http().get_json(url, &[]).await?;

        envelope
            .into_data("pools")?
            .into_iter()
            .map(|pool| -> DexResult<PoolInfo> {
                Ok(PoolInfo {
                    liquidity: parse_amount("liquidity", &pool.liquidity)?,
                    address: pool.id,
                    token_a_mint: pool.base_mint,
                    token_b_mint: pool.quote_mint,
                    token_a_name: pool.base_symbol,
                    token_b_name: pool.quote_symbol,
                    fee_rate: pool.fee_rate,
                    tvl: pool.tvl,
                    volume_24h: pool.volume_24h,
                    apr: pool.apr,
                    ..Default::default()
                })
            })
            .collect()
    }
}
