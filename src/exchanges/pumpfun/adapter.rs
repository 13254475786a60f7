use async_trait::async_trait;
use serde::Deserialize;
use solana_sdk::instruction::AccountMeta;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info};

use crate::config::DexConfig;
use crate::exchanges::accounts::{
    associated_token_address, bonding_curve_address, native_mint, system_program, token_program,
};
use crate::exchanges::api_clients::Envelope;
use crate::exchanges::base::{swap_min_amount_out, BaseAdapter, QuoteRequestBody};
use crate::exchanges::layout::{self, PUMPFUN_BUY, PUMPFUN_SELL};
use crate::exchanges::types::{DexKind, DexRequest, InstructionData, PoolInfo, QuoteResponse};
use crate::exchanges::utils::{parse_pubkey, validate_swap_request};
use crate::exchanges::DexAdapter;
use crate::shared::errors::{DexError, DexResult};
use crate::shared::types::{LiquidityRequest, SwapRequest};

/// Bonding-curve trades are charged a flat 1%
const BONDING_CURVE_FEE_RATE: f64 = 0.01;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PumpfunQuote {
    #[serde(default)]
    amount_out: u64,
    #[serde(default)]
    min_amount_out: u64,
    #[serde(default)]
    price_impact: f64,
    #[serde(default)]
    fee: u64,
}

#[derive(Debug, Deserialize)]
struct PumpfunToken {
    mint: String,
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    market_cap: f64,
    #[serde(default)]
    liquidity: f64,
    #[serde(default)]
    volume_24h: f64,
}

/// Pump.fun bonding curves; swap only
pub struct PumpfunAdapter {
    base: BaseAdapter,
}

impl PumpfunAdapter {
    pub fn new(config: DexConfig) -> DexResult<Self> {
        Ok(Self {
            base: BaseAdapter::new(config)?,
        })
    }

    fn liquidity_unsupported(&self) -> DexError {
        DexError::unsupported(self.name(), "liquidity")
    }
}

/// Buying spends SOL; anything else sells the token back into the curve
fn is_buy(input_mint: &Pubkey) -> bool {
    *input_mint == native_mint()
}

#[async_trait]
impl DexAdapter for PumpfunAdapter {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn config(&self) -> &DexConfig {
        self.base.config()
    }

    fn kind(&self) -> DexKind {
        DexKind::Pumpfun
    }

    fn validate_request(&self, request: DexRequest<'_>) -> DexResult<()> {
        match request {
            DexRequest::Swap(req) => validate_swap_request(req),
            DexRequest::Liquidity(_) => Err(self.liquidity_unsupported()),
        }
    }

    fn build_swap_instruction(&self, req: &SwapRequest) -> DexResult<InstructionData> {
        validate_swap_request(req)?;

        let wallet = parse_pubkey("user wallet", &req.user_wallet)?;
        let input_mint = parse_pubkey("input mint", &req.input_mint)?;
        let output_mint = parse_pubkey("output mint", &req.output_mint)?;

        let program_id = self.base.program_id();
        let bonding_curve = bonding_curve_address(&output_mint, &program_id);
        let bonding_curve_token = associated_token_address(&bonding_curve, &output_mint);

        let accounts = vec![
            AccountMeta::new_readonly(wallet, true),
            AccountMeta::new(associated_token_address(&wallet, &input_mint), false),
            AccountMeta::new(associated_token_address(&wallet, &output_mint), false),
            AccountMeta::new(bonding_curve, false),
            AccountMeta::new(bonding_curve_token, false),
            AccountMeta::new_readonly(input_mint, false),
            AccountMeta::new(output_mint, false),
            AccountMeta::new_readonly(token_program(), false),
            AccountMeta::new_readonly(system_program(), false),
        ];

        let buy = is_buy(&input_mint);
        let (opcode, direction) = if buy { (PUMPFUN_BUY, 0) } else { (PUMPFUN_SELL, 1) };
        let min_out = swap_min_amount_out(req);
        debug!(dex = self.name(), buy, %bonding_curve, min_out, "encoding pumpfun swap");

        Ok(InstructionData {
            program_id,
            accounts,
            data: layout::encode_directed_swap(opcode, req.amount_in, min_out, direction),
        })
    }

    fn build_liquidity_instruction(&self, _req: &LiquidityRequest) -> DexResult<InstructionData> {
        Err(self.liquidity_unsupported())
    }

    async fn get_quote(&self, input_mint: &str, output_mint: &str, amount_in: u64) -> DexResult<QuoteResponse> {
        let url = self.base.quote_url()?;
        let body = QuoteRequestBody::new(input_mint, output_mint, amount_in);

        let envelope: Envelope<PumpfunQuote> = self.base.http().post_json(&url, &body).await?;
        let quote = envelope.into_data("quote")?;

        info!(dex = self.name(), amount_in, amount_out = quote.amount_out, "pumpfun quote");

        Ok(QuoteResponse {
            input_mint: input_mint.to_string(),
            output_mint: output_mint.to_string(),
            amount_in,
            amount_out: quote.amount_out,
            min_amount_out: quote.min_amount_out.min(quote.amount_out),
            price_impact: quote.price_impact,
            fee: quote.fee,
            route: Vec::new(),
        })
    }

    /// Every listed token is reported as a SOL/token pool backed by its bonding curve
    async fn get_pools(&self) -> DexResult<Vec<PoolInfo>> {
        let url = self.base.api_url("tokens")?;
        let envelope: Envelope<Vec<PumpfunToken>> = self.base.http().get_json(&url, &[]).await?;
        let sol = native_mint().to_string();

        let pools = envelope
            .into_data("tokens")?
            .into_iter()
            .map(|token| PoolInfo {
                address: token.mint.clone(),
                token_a_mint: sol.clone(),
                token_b_mint: token.mint,
                token_a_name: "SOL".to_string(),
                token_b_name: token.symbol,
                liquidity: token.liquidity as u64,
                fee_rate: BONDING_CURVE_FEE_RATE,
                tvl: token.market_cap,
                volume_24h: token.volume_24h,
                ..Default::default()
            })
            .collect();

        Ok(pools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchanges::api_clients::QuoteHttpClient;
    use crate::exchanges::utils::fixtures;
    use crate::shared::types::LiquidityOperation;
    use mockito::Matcher;
    use serde_json::json;
    use std::time::Duration;

    const PROGRAM: &str = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P";

    fn adapter(config: DexConfig) -> PumpfunAdapter {
        let mut adapter = PumpfunAdapter::new(config).unwrap();
        adapter.base.set_http(
            QuoteHttpClient::new(Duration::from_secs(5), 1)
                .unwrap()
                .with_backoff(Duration::from_millis(1)),
        );
        adapter
    }

    #[test]
    fn test_buy_instruction() {
        let adapter = adapter(DexConfig::new("pumpfun", PROGRAM));
        let req = fixtures::swap("pumpfun");
        let ix = adapter.build_swap_instruction(&req).unwrap();

        assert_eq!(ix.data.len(), 18);
        assert_eq!(ix.data[0], PUMPFUN_BUY);
        assert_eq!(ix.data[17], 0);
        assert_eq!(ix.accounts.len(), 9);
        assert!(ix.accounts[0].is_signer);

        let output_mint: Pubkey = fixtures::USDC.parse().unwrap();
        let curve = bonding_curve_address(&output_mint, &PROGRAM.parse().unwrap());
        assert_eq!(ix.accounts[3].pubkey, curve);
        assert!(ix.accounts[3].is_writable);
        assert_eq!(ix.accounts[4].pubkey, associated_token_address(&curve, &output_mint));
        assert!(ix.accounts[6].is_writable);
        assert_eq!(ix.accounts[8].pubkey, system_program());
    }

    #[test]
    fn test_sell_instruction() {
        let adapter = adapter(DexConfig::new("pumpfun", PROGRAM));
        let mut req = fixtures::swap("pumpfun");
        std::mem::swap(&mut req.input_mint, &mut req.output_mint);
        let ix = adapter.build_swap_instruction(&req).unwrap();

        assert_eq!(ix.data[0], PUMPFUN_SELL);
        assert_eq!(ix.data[17], 1);
    }

    #[test]
    fn test_liquidity_unsupported() {
        let adapter = adapter(DexConfig::new("pumpfun", PROGRAM));

        for operation in [LiquidityOperation::Add, LiquidityOperation::Remove] {
            let req = fixtures::liquidity("pumpfun", operation);

            let err = adapter.build_liquidity_instruction(&req).unwrap_err();
            assert_eq!(err.to_string(), "pumpfun does not support liquidity operations");
            assert!(matches!(
                adapter.validate_request(DexRequest::Liquidity(&req)),
                Err(DexError::UnsupportedOperation { .. })
            ));
        }
        assert!(!adapter.capabilities().liquidity);
    }

    #[tokio::test]
    async fn test_quote_posts_to_api() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/quote")
            .match_body(Matcher::PartialJson(json!({"inputMint": fixtures::SOL, "amount": 500})))
            .with_status(200)
            .with_body(
                json!({"success": true, "data": {"amountOut": 480, "minAmountOut": 470, "priceImpact": 0.4, "fee": 5}})
                    .to_string(),
            )
            .create_async()
            .await;

        let config = DexConfig::new("pumpfun", PROGRAM).with_endpoint("api", &server.url());
        let quote = adapter(config).get_quote(fixtures::SOL, fixtures::USDC, 500).await.unwrap();
        assert_eq!(quote.amount_out, 480);
        assert_eq!(quote.min_amount_out, 470);
        assert_eq!(quote.fee, 5);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_quote_error_envelope() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/quote")
            .with_status(200)
            .with_body(json!({"success": false, "error": "token graduated"}).to_string())
            .create_async()
            .await;

        let config = DexConfig::new("pumpfun", PROGRAM).with_endpoint("api", &server.url());
        let err = adapter(config).get_quote(fixtures::SOL, fixtures::USDC, 1).await.unwrap_err();
        assert!(err.to_string().contains("token graduated"));
    }

    #[tokio::test]
    async fn test_tokens_become_sol_pools() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/tokens")
            .with_status(200)
            .with_body(
                json!({"success": true, "data": [
                    {"mint": fixtures::USDC, "name": "Test", "symbol": "TST", "market_cap": 42000.0, "liquidity": 1500.7, "volume_24h": 9.0}
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let config = DexConfig::new("pumpfun", PROGRAM).with_endpoint("api", &server.url());
        let pools = adapter(config).get_pools().await.unwrap();
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].address, fixtures::USDC);
        assert_eq!(pools[0].token_a_mint, fixtures::SOL);
        assert_eq!(pools[0].token_a_name, "SOL");
        assert_eq!(pools[0].token_b_name, "TST");
        assert_eq!(pools[0].liquidity, 1500);
        assert_eq!(pools[0].fee_rate, 0.01);
        assert_eq!(pools[0].tvl, 42000.0);
    }
}
