//! CLI commands and handlers
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::services::{DexService, TransactionService};
use crate::config::Config;
use crate::domain::dex::RegistryHandle;
use crate::infrastructure::{LedgerRpc, SolanaRpcClient};
use crate::shared::types::{
    LiquidityOperation, LiquidityRequest, SwapRequest, TransactionTestRequest, TransactionTestResponse,
};

#[derive(Parser)]
#[command(name = "dexcodec")]
#[command(version, about = "Encode Solana DEX swap and liquidity intents into transactions")]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true, default_value = "Config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List configured DEXes
    List {
        /// Only show enabled DEXes
        #[arg(long)]
        enabled: bool,
    },

    /// Show one DEX and its status
    Info { name: String },

    /// Fetch pools from a DEX API, or from every registered DEX
    Pools {
        name: Option<String>,

        /// Limit number of pools to show per DEX
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Ask a DEX for a swap quote
    Quote {
        name: String,

        #[arg(long)]
        input: String,

        #[arg(long)]
        output: String,

        /// Input amount in base units
        #[arg(long)]
        amount: u64,
    },

    /// Encode an unsigned swap transaction
    EncodeSwap(SwapArgs),

    /// Encode an unsigned add/remove liquidity transaction
    EncodeLiquidity(LiquidityArgs),

    /// Sign an encoded transaction and submit it, or dry-run it with --simulate-only
    TestTx(TestTxArgs),

    /// Sign and simulate an encoded transaction without submitting
    Simulate(TestTxArgs),
}

#[derive(Args)]
pub struct SwapArgs {
    #[arg(long)]
    pub dex: String,

    #[arg(long)]
    pub input_mint: String,

    #[arg(long)]
    pub output_mint: String,

    #[arg(long)]
    pub amount: u64,

    /// Fraction between 0 and 1
    #[arg(long, default_value_t = 0.005)]
    pub slippage: f64,

    /// Compute unit price in micro-lamports; 0 adds no budget instruction
    #[arg(long, default_value_t = 0)]
    pub priority_fee: u64,

    #[arg(long)]
    pub wallet: String,

    /// Expected output from an earlier quote; fetched from the DEX when omitted
    #[arg(long)]
    pub quoted_out: Option<u64>,
}

impl From<SwapArgs> for SwapRequest {
    fn from(args: SwapArgs) -> Self {
        SwapRequest {
            dex_type: args.dex,
            input_mint: args.input_mint,
            output_mint: args.output_mint,
            amount_in: args.amount,
            slippage: args.slippage,
            priority_fee: args.priority_fee,
            user_wallet: args.wallet,
            quoted_amount_out: args.quoted_out,
            ..Default::default()
        }
    }
}

#[derive(Args)]
pub struct LiquidityArgs {
    #[arg(long)]
    pub dex: String,

    /// add or remove
    #[arg(long)]
    pub operation: LiquidityOperation,

    #[arg(long)]
    pub token_a: String,

    #[arg(long)]
    pub token_b: String,

    #[arg(long)]
    pub amount_a: u64,

    #[arg(long)]
    pub amount_b: u64,

    #[arg(long, default_value_t = 0.005)]
    pub slippage: f64,

    #[arg(long, default_value_t = 0)]
    pub priority_fee: u64,

    #[arg(long)]
    pub wallet: String,
}

impl From<LiquidityArgs> for LiquidityRequest {
    fn from(args: LiquidityArgs) -> Self {
        LiquidityRequest {
            dex_type: args.dex,
            operation: args.operation,
            token_a_mint: args.token_a,
            token_b_mint: args.token_b,
            amount_a: args.amount_a,
            amount_b: args.amount_b,
            slippage: args.slippage,
            priority_fee: args.priority_fee,
            user_wallet: args.wallet,
            id: String::new(),
            created_at: None,
        }
    }
}

#[derive(Args)]
pub struct TestTxArgs {
    /// Base64 encoded transaction
    #[arg(long)]
    pub transaction: String,

    /// Base58 encoded keypair; falls back to DEXCODEC_PRIVATE_KEY
    #[arg(long, env = "DEXCODEC_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// Stop after simulation (test-tx only)
    #[arg(long)]
    pub simulate_only: bool,
}

impl From<TestTxArgs> for TransactionTestRequest {
    fn from(args: TestTxArgs) -> Self {
        TransactionTestRequest {
            transaction: args.transaction,
            private_key: args.private_key,
            simulate_only: args.simulate_only,
        }
    }
}

/// Wires the services for one CLI invocation
pub struct CommandExecutor {
    dex_service: DexService,
    tx_service: TransactionService,
}

impl CommandExecutor {
    pub fn new(config: Config) -> Self {
        let rpc: Arc<dyn LedgerRpc> = Arc::new(SolanaRpcClient::with_retries(&config.solana));
        Self::with_rpc(config, rpc)
    }

    pub fn with_rpc(config: Config, rpc: Arc<dyn LedgerRpc>) -> Self {
        let registry = Arc::new(RegistryHandle::new(config));
        Self {
            dex_service: DexService::new(registry.clone()),
            tx_service: TransactionService::new(registry, rpc),
        }
    }

    /// Execute the selected command and print its JSON result to stdout
    pub async fn execute(command: Commands, config: Config) -> Result<()> {
        let output = Self::new(config).run(command).await?;
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    pub async fn run(&self, command: Commands) -> Result<Value> {
        match command {
            Commands::List { enabled } => {
                let dexes = if enabled {
                    self.dex_service.enabled_dexes()
                } else {
                    self.dex_service.list_dexes()
                };
                Ok(serde_json::to_value(dexes)?)
            }
            Commands::Info { name } => {
                let dex = self.dex_service.get_dex(&name)?;
                let status = self.dex_service.check_dex_status(&name)?;
                let capabilities = self
                    .tx_service
                    .adapter(&name)
                    .map(|adapter| adapter.capabilities())
                    .ok();

                Ok(json!({
                    "dex": dex,
                    "status": status,
                    "capabilities": capabilities.map(|caps| json!({
                        "swap": caps.swap,
                        "liquidity": caps.liquidity,
                    })),
                }))
            }
            Commands::Pools { name, limit } => self.pools(name, limit).await,
            Commands::Quote {
                name,
                input,
                output,
                amount,
            } => {
                let quote = self
                    .dex_service
                    .get_quote(&name, &input, &output, amount)
                    .await
                    .with_context(|| format!("quote from {}", name))?;
                Ok(serde_json::to_value(quote)?)
            }
            Commands::EncodeSwap(args) => {
                let response = self.tx_service.encode_swap(args.into()).await;
                Ok(serde_json::to_value(response)?)
            }
            Commands::EncodeLiquidity(args) => {
                let response = self.tx_service.encode_liquidity(args.into()).await;
                Ok(serde_json::to_value(response)?)
            }
            Commands::TestTx(args) => {
                let req = TransactionTestRequest::from(args);
                let response = self.tx_service.test_transaction(&req).await;
                info!(stage = %response.stage, success = response.success, "test transaction finished");
                test_output(response, req.transaction.clone())
            }
            Commands::Simulate(args) => {
                let req = TransactionTestRequest::from(args);
                let transaction_data = req.transaction.clone();
                let response = self.tx_service.simulate_transaction(req).await;
                test_output(response, transaction_data)
            }
        }
    }

    async fn pools(&self, name: Option<String>, limit: usize) -> Result<Value> {
        if let Some(name) = name {
            let mut pools = self
                .dex_service
                .get_pools(&name)
                .await
                .with_context(|| format!("pools from {}", name))?;
            pools.truncate(limit);
            return Ok(serde_json::to_value(pools)?);
        }

        let mut by_dex = serde_json::Map::new();
        for (name, result) in self.dex_service.get_all_pools().await {
            let entry = match result {
                Ok(mut pools) => {
                    pools.truncate(limit);
                    serde_json::to_value(pools)?
                }
                Err(e) => {
                    warn!(dex = %name, error = %e, "pool fetch failed");
                    json!({ "error": e.to_string() })
                }
            };
            by_dex.insert(name, entry);
        }
        Ok(Value::Object(by_dex))
    }
}

/// Stage and logs next to the `TransactionResult` of the run
fn test_output(response: TransactionTestResponse, transaction_data: String) -> Result<Value> {
    let stage = response.stage.clone();
    let logs = response.logs.clone();
    let result = response.into_result(transaction_data);
    Ok(json!({
        "stage": stage,
        "logs": logs,
        "result": serde_json::to_value(result)?,
    }))
}
