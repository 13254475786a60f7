pub mod accounts;
pub mod api_clients;
pub mod base;
pub mod compute_budget;
pub mod layout;
pub mod pumpfun;
pub mod pumpswap;
pub mod raydium;
pub mod types;
pub mod utils;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::DexConfig;
use crate::shared::errors::DexResult;
use crate::shared::types::{LiquidityRequest, SwapRequest};
use types::{Capabilities, DexKind, DexRequest, InstructionData, PoolInfo, QuoteResponse};

/// One DEX program: validates intents, encodes its instructions and talks to its quote API
#[async_trait]
pub trait DexAdapter: Send + Sync {
    /// Registry key; always equal to `config().name`
    fn name(&self) -> &str;

    fn config(&self) -> &DexConfig;

    fn kind(&self) -> DexKind;

    fn capabilities(&self) -> Capabilities {
        self.kind().capabilities()
    }

    fn validate_request(&self, request: DexRequest<'_>) -> DexResult<()>;

    fn build_swap_instruction(&self, req: &SwapRequest) -> DexResult<InstructionData>;

    fn build_liquidity_instruction(&self, req: &LiquidityRequest) -> DexResult<InstructionData>;

    async fn get_quote(&self, input_mint: &str, output_mint: &str, amount_in: u64) -> DexResult<QuoteResponse>;

    async fn get_pools(&self) -> DexResult<Vec<PoolInfo>>;
}

pub fn create_adapter(kind: DexKind, config: DexConfig) -> DexResult<Arc<dyn DexAdapter>> {
    match kind {
        DexKind::Raydium => Ok(Arc::new(raydium::RaydiumAdapter::new(config)?)),
        DexKind::Pumpfun => Ok(Arc::new(pumpfun::PumpfunAdapter::new(config)?)),
        DexKind::PumpSwap => Ok(Arc::new(pumpswap::PumpSwapAdapter::new(config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_adapter_keeps_config_name() {
        let config = DexConfig::new("raydium-main", "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8");
        let adapter = create_adapter(DexKind::Raydium, config).unwrap();
        assert_eq!(adapter.name(), "raydium-main");
        assert_eq!(adapter.kind(), DexKind::Raydium);
        assert!(adapter.capabilities().liquidity);
    }

    #[test]
    fn test_create_adapter_rejects_bad_program_id() {
        for kind in DexKind::ALL {
            let mut config = DexConfig::new(kind.as_str(), "invalid-program-id");
            config.router_address = Some("11111111111111111111111111111111".to_string());
            let err = create_adapter(kind, config).err().unwrap();
            assert!(err.to_string().contains("invalid program ID"), "{}: {}", kind, err);
        }
    }
}
