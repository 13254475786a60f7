//! Application services: encode, test and inspect

use chrono::Utc;
use futures::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::DexConfig;
use crate::domain::dex::RegistryHandle;
use crate::domain::execution::{AssembledTransaction, TransactionAssembler, TransactionExecutor};
use crate::exchanges::types::{DexRequest, PoolInfo, QuoteResponse};
use crate::exchanges::utils::parse_pubkey;
use crate::exchanges::DexAdapter;
use crate::infrastructure::LedgerRpc;
use crate::shared::errors::{DexError, DexResult};
use crate::shared::types::{
    DexInfo, LiquidityRequest, SwapRequest, TransactionResponse, TransactionTestRequest,
    TransactionTestResponse,
};
use crate::shared::utils::generate_id;

/// Turns swap/liquidity intents into encoded transactions and runs test transactions
pub struct TransactionService {
    registry: Arc<RegistryHandle>,
    rpc: Arc<dyn LedgerRpc>,
    executor: TransactionExecutor,
}

impl TransactionService {
    pub fn new(registry: Arc<RegistryHandle>, rpc: Arc<dyn LedgerRpc>) -> Self {
        Self {
            executor: TransactionExecutor::new(rpc.clone()),
            registry,
            rpc,
        }
    }

    pub async fn encode_swap(&self, mut req: SwapRequest) -> TransactionResponse {
        req.id = generate_id();
        req.created_at = Some(Utc::now());

        match self.build_swap(&mut req).await {
            Ok(assembled) => {
                info!(
                    request_id = %req.id,
                    dex = %req.dex_type,
                    fee = assembled.estimated_fee,
                    "swap transaction encoded"
                );
                encoded_response(&req.id, assembled)
            }
            Err(e) => {
                warn!(request_id = %req.id, dex = %req.dex_type, error = %e, "swap encoding failed");
                TransactionResponse::failure(&req.id, e.to_string())
            }
        }
    }

    pub async fn encode_liquidity(&self, mut req: LiquidityRequest) -> TransactionResponse {
        req.id = generate_id();
        req.created_at = Some(Utc::now());

        match self.build_liquidity(&req).await {
            Ok(assembled) => {
                info!(
                    request_id = %req.id,
                    dex = %req.dex_type,
                    operation = %req.operation,
                    "liquidity transaction encoded"
                );
                encoded_response(&req.id, assembled)
            }
            Err(e) => {
                warn!(request_id = %req.id, dex = %req.dex_type, error = %e, "liquidity encoding failed");
                TransactionResponse::failure(&req.id, e.to_string())
            }
        }
    }

    pub async fn test_transaction(&self, req: &TransactionTestRequest) -> TransactionTestResponse {
        self.executor.execute(req).await
    }

    pub async fn simulate_transaction(&self, mut req: TransactionTestRequest) -> TransactionTestResponse {
        req.simulate_only = true;
        self.executor.execute(&req).await
    }

    pub fn supported_dexes(&self) -> BTreeSet<String> {
        self.registry.load().registry.list()
    }

    pub fn adapter(&self, name: &str) -> DexResult<Arc<dyn DexAdapter>> {
        self.registry.load().registry.get(name)
    }

    async fn build_swap(&self, req: &mut SwapRequest) -> DexResult<AssembledTransaction> {
        let adapter = self.adapter(&req.dex_type)?;
        adapter.validate_request(DexRequest::Swap(req))?;

        if req.quoted_amount_out.is_none() {
            match adapter.get_quote(&req.input_mint, &req.output_mint, req.amount_in).await {
                Ok(quote) => req.quoted_amount_out = Some(quote.amount_out),
                Err(e) => {
                    warn!(request_id = %req.id, error = %e, "quote unavailable, min-out taken from input amount")
                }
            }
        }

        let instruction = adapter.build_swap_instruction(req)?;
        let payer = parse_pubkey("user wallet", &req.user_wallet)?;

        TransactionAssembler::new(self.rpc.as_ref())
            .assemble(vec![instruction], &payer, req.priority_fee)
            .await
    }

    async fn build_liquidity(&self, req: &LiquidityRequest) -> DexResult<AssembledTransaction> {
        let adapter = self.adapter(&req.dex_type)?;
        adapter.validate_request(DexRequest::Liquidity(req))?;

        let instruction = adapter.build_liquidity_instruction(req)?;
        let payer = parse_pubkey("user wallet", &req.user_wallet)?;

        TransactionAssembler::new(self.rpc.as_ref())
            .assemble(vec![instruction], &payer, req.priority_fee)
            .await
    }
}

fn encoded_response(request_id: &str, assembled: AssembledTransaction) -> TransactionResponse {
    TransactionResponse {
        success: true,
        transaction: assembled.encoded,
        estimated_fee: assembled.estimated_fee,
        request_id: request_id.to_string(),
        error: None,
    }
}

/// Read-only view over the configured DEXes and their quote/pool APIs
pub struct DexService {
    registry: Arc<RegistryHandle>,
}

fn dex_info(cfg: &DexConfig) -> DexInfo {
    DexInfo {
        name: cfg.name.clone(),
        program_id: cfg.program_id.clone(),
        router_address: cfg.router_address.clone(),
        endpoints: cfg.endpoints.clone(),
        enabled: cfg.enabled,
        status: if cfg.enabled { "online" } else { "offline" }.to_string(),
    }
}

impl DexService {
    pub fn new(registry: Arc<RegistryHandle>) -> Self {
        Self { registry }
    }

    pub fn list_dexes(&self) -> Vec<DexInfo> {
        self.registry.load().config.dexes.iter().map(dex_info).collect()
    }

    /// Any configured DEX, enabled or not
    pub fn get_dex(&self, name: &str) -> DexResult<DexInfo> {
        let snapshot = self.registry.load();
        snapshot
            .config
            .dexes
            .iter()
            .find(|dex| dex.name == name)
            .map(dex_info)
            .ok_or_else(|| DexError::Config(format!("dex config not found: {}", name)))
    }

    pub fn enabled_dexes(&self) -> Vec<DexInfo> {
        self.list_dexes().into_iter().filter(|dex| dex.enabled).collect()
    }

    pub fn check_dex_status(&self, name: &str) -> DexResult<&'static str> {
        let info = self.get_dex(name)?;
        Ok(if info.enabled { "online" } else { "disabled" })
    }

    pub async fn get_pools(&self, name: &str) -> DexResult<Vec<PoolInfo>> {
        let adapter = self.registry.load().registry.get(name)?;
        adapter.get_pools().await
    }

    /// Pools of every registered adapter, fetched concurrently; per-DEX failures are kept
    pub async fn get_all_pools(&self) -> Vec<(String, DexResult<Vec<PoolInfo>>)> {
        let snapshot = self.registry.load();
        let fetches = snapshot.registry.get_all().iter().map(|(name, adapter)| {
            let adapter = adapter.clone();
            let name = name.clone();
            async move { (name, adapter.get_pools().await) }
        });

        let mut results = join_all(fetches).await;
        results.sort_by(|a, b| a.0.cmp(&b.0));
        results
    }

    pub async fn get_quote(
        &self,
        name: &str,
        input_mint: &str,
        output_mint: &str,
        amount_in: u64,
    ) -> DexResult<QuoteResponse> {
        let adapter = self.registry.load().registry.get(name)?;
        adapter.get_quote(input_mint, output_mint, amount_in).await
    }

    pub fn validate_request(&self, name: &str, request: DexRequest<'_>) -> DexResult<()> {
        self.registry.load().registry.get(name)?.validate_request(request)
    }
}
