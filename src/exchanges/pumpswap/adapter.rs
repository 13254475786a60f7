use async_trait::async_trait;
use serde::Deserialize;
use solana_sdk::instruction::AccountMeta;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use tracing::{debug, info};

use crate::config::DexConfig;
use crate::exchanges::accounts::{associated_token_address, lp_mint_address, pool_address, token_program};
use crate::exchanges::api_clients::Envelope;
use crate::exchanges::base::{swap_min_amount_out, BaseAdapter, QuoteRequestBody};
use crate::exchanges::layout::{self, PUMPSWAP_ADD_LIQUIDITY, PUMPSWAP_REMOVE_LIQUIDITY, PUMPSWAP_SWAP};
use crate::exchanges::types::{DexKind, DexRequest, InstructionData, PoolInfo, QuoteResponse, Route};
use crate::exchanges::utils::{parse_pubkey, validate_liquidity_request, validate_swap_request};
use crate::exchanges::DexAdapter;
use crate::shared::errors::{DexError, DexResult};
use crate::shared::types::{LiquidityOperation, LiquidityRequest, SwapRequest};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PumpSwapHop {
    pool_id: String,
    input_mint: String,
    output_mint: String,
    #[serde(default)]
    amount_in: u64,
    #[serde(default)]
    amount_out: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PumpSwapQuote {
    #[serde(default)]
    amount_out: u64,
    #[serde(default)]
    min_amount_out: u64,
    #[serde(default)]
    price_impact: f64,
    #[serde(default)]
    fee: u64,
    #[serde(default)]
    route: Vec<PumpSwapHop>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PumpSwapPool {
    address: String,
    token_a_mint: String,
    token_b_mint: String,
    #[serde(default)]
    token_a_name: String,
    #[serde(default)]
    token_b_name: String,
    #[serde(default)]
    reserve_a: u64,
    #[serde(default)]
    reserve_b: u64,
    #[serde(default)]
    liquidity: u64,
    #[serde(default)]
    fee_rate: f64,
    #[serde(default)]
    tvl: f64,
    #[serde(default, rename = "volume24h")]
    volume_24h: f64,
    #[serde(default)]
    apr: f64,
}

/// PumpSwap AMM: pool and LP mint are PDAs of the program, trades go through the router
pub struct PumpSwapAdapter {
    base: BaseAdapter,
    router: Pubkey,
}

impl PumpSwapAdapter {
    pub fn new(config: DexConfig) -> DexResult<Self> {
        let base = BaseAdapter::new(config)?;
        let router = base
            .config()
            .router_address
            .as_deref()
            .ok_or_else(|| DexError::Config("invalid router address: not configured".to_string()))
            .and_then(|s| {
                Pubkey::from_str(s).map_err(|e| DexError::Config(format!("invalid router address: {}", e)))
            })?;

        Ok(Self { base, router })
    }

    pub fn router(&self) -> Pubkey {
        self.router
    }

    /// Pool for a mint pair; the same address regardless of argument order
    pub fn derive_pool(&self, mint_a: &Pubkey, mint_b: &Pubkey) -> Pubkey {
        pool_address(mint_a, mint_b, &self.base.program_id())
    }
}

#[async_trait]
impl DexAdapter for PumpSwapAdapter {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn config(&self) -> &DexConfig {
        self.base.config()
    }

    fn kind(&self) -> DexKind {
        DexKind::PumpSwap
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

        let pool = self.derive_pool(&input_mint, &output_mint);

        let accounts = vec![
            AccountMeta::new_readonly(wallet, true),
            AccountMeta::new(associated_token_address(&wallet, &input_mint), false),
            AccountMeta::new(associated_token_address(&wallet, &output_mint), false),
            AccountMeta::new(pool, false),
            AccountMeta::new(associated_token_address(&pool, &input_mint), false),
            AccountMeta::new(associated_token_address(&pool, &output_mint), false),
            AccountMeta::new_readonly(self.router, false),
            AccountMeta::new_readonly(input_mint, false),
            AccountMeta::new_readonly(output_mint, false),
            AccountMeta::new_readonly(token_program(), false),
        ];

        let min_out = swap_min_amount_out(req);
        debug!(dex = self.name(), %pool, min_out, "encoding pumpswap swap");

        Ok(InstructionData {
            program_id: self.base.program_id(),
            accounts,
            data: layout::encode_swap(PUMPSWAP_SWAP, req.amount_in, min_out),
        })
    }

    fn build_liquidity_instruction(&self, req: &LiquidityRequest) -> DexResult<InstructionData> {
        validate_liquidity_request(req)?;

        let wallet = parse_pubkey("user wallet", &req.user_wallet)?;
        let mint_a = parse_pubkey("token A mint", &req.token_a_mint)?;
        let mint_b = parse_pubkey("token B mint", &req.token_b_mint)?;

        let program_id = self.base.program_id();
        let pool = self.derive_pool(&mint_a, &mint_b);
        let lp_mint = lp_mint_address(&pool, &program_id);

        let accounts = vec![
            AccountMeta::new_readonly(wallet, true),
            AccountMeta::new(associated_token_address(&wallet, &mint_a), false),
            AccountMeta::new(associated_token_address(&wallet, &mint_b), false),
            AccountMeta::new(associated_token_address(&wallet, &lp_mint), false),
            AccountMeta::new(pool, false),
            AccountMeta::new(lp_mint, false),
            AccountMeta::new_readonly(mint_a, false),
            AccountMeta::new_readonly(mint_b, false),
            AccountMeta::new_readonly(token_program(), false),
        ];

        let opcode = match req.operation {
            LiquidityOperation::Add => PUMPSWAP_ADD_LIQUIDITY,
            LiquidityOperation::Remove => PUMPSWAP_REMOVE_LIQUIDITY,
        };

        Ok(InstructionData {
            program_id,
            accounts,
            data: layout::encode_liquidity(opcode, req.operation.op_type(), req.amount_a, req.amount_b),
        })
    }

    async fn get_quote(&self, input_mint: &str, output_mint: &str, amount_in: u64) -> DexResult<QuoteResponse> {
        let url = self.base.quote_url()?;
        let body = QuoteRequestBody::new(input_mint, output_mint, amount_in);

        let envelope: Envelope<PumpSwapQuote> = self.base.http().post_json(&url, &body).await?;
        let quote = envelope.into_data("quote")?;

        info!(
            dex = self.name(),
            amount_in,
            amount_out = quote.amount_out,
            hops = quote.route.len(),
            "pumpswap quote"
        );

        let route = quote
            .route
            .into_iter()
            .map(|hop| Route {
                input_mint: hop.input_mint,
                output_mint: hop.output_mint,
                pool_id: hop.pool_id,
                dex: DexKind::PumpSwap.as_str().to_string(),
                amount_in: hop.amount_in,
                amount_out: hop.amount_out,
                ..Default::default()
            })
            .collect();

        Ok(QuoteResponse {
            input_mint: input_mint.to_string(),
            output_mint: output_mint.to_string(),
            amount_in,
            amount_out: quote.amount_out,
            min_amount_out: quote.min_amount_out.min(quote.amount_out),
            price_impact: quote.price_impact,
            fee: quote.fee,
            route,
        })
    }

    async fn get_pools(&self) -> DexResult<Vec<PoolInfo>> {
        let url = self.base.api_url("pools")?;
        let envelope: Envelope<Vec<PumpSwapPool>> = self.base.http().get_json(&url, &[]).await?;

        let pools = envelope
            .into_data("pools")?
            .into_iter()
            .map(|pool| PoolInfo {
                address: pool.address,
                token_a_mint: pool.token_a_mint,
                token_b_mint: pool.token_b_mint,
                token_a_name: pool.token_a_name,
                token_b_name: pool.token_b_name,
                reserve_a: pool.reserve_a,
                reserve_b: pool.reserve_b,
                liquidity: pool.liquidity,
                fee_rate: pool.fee_rate,
                tvl: pool.tvl,
                volume_24h: pool.volume_24h,
                apr: pool.apr,
            })
            .collect();

        Ok(pools)
    }
}
