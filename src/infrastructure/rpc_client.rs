//! Ledger RPC access behind a trait so assembly and execution can run against a fake

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, message::Message, signature::Signature,
    transaction::Transaction,
};
use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::UiTransactionEncoding;
use std::time::Duration;

use crate::config::SolanaCfg;
use crate::shared::errors::{DexError, DexResult};
use crate::shared::utils::RetryPolicy;

/// Base pause between ledger RPC attempts
pub const RPC_BACKOFF_UNIT: Duration = Duration::from_millis(500);

/// Result of a dry run; `err` is set when the program failed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationOutcome {
    pub err: Option<String>,
    pub logs: Vec<String>,
    pub units_consumed: Option<u64>,
}

/// What the ledger recorded for a landed transaction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandedTransaction {
    pub err: Option<String>,
    pub logs: Vec<String>,
    pub compute_units: Option<u64>,
    pub fee: u64,
    pub slot: u64,
}

#[async_trait]
pub trait LedgerRpc: Send + Sync {
    async fn latest_blockhash(&self) -> DexResult<Hash>;

    async fn fee_for_message(&self, message: &Message) -> DexResult<u64>;

    async fn simulate(&self, transaction: &Transaction) -> DexResult<SimulationOutcome>;

    async fn send(&self, transaction: &Transaction) -> DexResult<Signature>;

    async fn get_transaction(&self, signature: &Signature) -> DexResult<LandedTransaction>;
}

/// Solana RPC client wrapper
pub struct SolanaRpcClient {
    client: RpcClient,
}

fn commitment(level: &str) -> CommitmentConfig {
    match level {
        "processed" => CommitmentConfig::processed(),
        "finalized" => CommitmentConfig::finalized(),
        _ => CommitmentConfig::confirmed(),
    }
}

impl SolanaRpcClient {
    pub fn new(cfg: &SolanaCfg) -> Self {
        Self {
            client: RpcClient::new_with_timeout_and_commitment(
                cfg.rpc_url.clone(),
                cfg.timeout(),
                commitment(&cfg.commitment),
            ),
        }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }

    /// Client whose reads are retried `cfg.retry_count` times
    pub fn with_retries(cfg: &SolanaCfg) -> RetryingLedger<Self> {
        RetryingLedger::new(Self::new(cfg), RetryPolicy::new(cfg.retry_count, RPC_BACKOFF_UNIT))
    }
}

/// Retries `Network` failures of the read calls; `send` is attempted once
pub struct RetryingLedger<L> {
    inner: L,
    policy: RetryPolicy,
}

impl<L: LedgerRpc> RetryingLedger<L> {
    pub fn new(inner: L, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }
}

#[async_trait]
impl<L: LedgerRpc> LedgerRpc for RetryingLedger<L> {
    async fn latest_blockhash(&self) -> DexResult<Hash> {
        self.policy.run("latest blockhash", || self.inner.latest_blockhash()).await
    }

    async fn fee_for_message(&self, message: &Message) -> DexResult<u64> {
        self.policy.run("fee for message", || self.inner.fee_for_message(message)).await
    }

    async fn simulate(&self, transaction: &Transaction) -> DexResult<SimulationOutcome> {
        self.policy.run("simulate", || self.inner.simulate(transaction)).await
    }

    async fn send(&self, transaction: &Transaction) -> DexResult<Signature> {
        self.inner.send(transaction).await
    }

    async fn get_transaction(&self, signature: &Signature) -> DexResult<LandedTransaction> {
        self.policy
            .run("get transaction", || self.inner.get_transaction(signature))
            .await
    }
}

#[async_trait]
impl LedgerRpc for SolanaRpcClient {
    async fn latest_blockhash(&self) -> DexResult<Hash> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(|e| DexError::Network(format!("failed to get latest blockhash: {}", e)))
    }

    async fn fee_for_message(&self, message: &Message) -> DexResult<u64> {
        self.client
            .get_fee_for_message(message)
            .await
            .map_err(|e| DexError::Network(format!("failed to get fee for message: {}", e)))
    }

    async fn simulate(&self, transaction: &Transaction) -> DexResult<SimulationOutcome> {
        let response = self
            .client
            .simulate_transaction(transaction)
            .await
            .map_err(|e| DexError::Network(format!("simulation request failed: {}", e)))?;

        let value = response.value;
        Ok(SimulationOutcome {
            err: value.err.map(|e| e.to_string()),
            logs: value.logs.unwrap_or_default(),
            units_consumed: value.units_consumed,
        })
    }

    async fn send(&self, transaction: &Transaction) -> DexResult<Signature> {
        self.client
            .send_transaction(transaction)
            .await
            .map_err(|e| DexError::Submission(e.to_string()))
    }

    async fn get_transaction(&self, signature: &Signature) -> DexResult<LandedTransaction> {
        let confirmed = self
            .client
            .get_transaction(signature, UiTransactionEncoding::Json)
            .await
            .map_err(|e| DexError::Network(format!("failed to get transaction {}: {}", signature, e)))?;

        let mut landed = LandedTransaction {
            slot: confirmed.slot,
            ..Default::default()
        };

        if let Some(meta) = confirmed.transaction.meta {
            landed.err = meta.err.map(|e| e.to_string());
            landed.fee = meta.fee;
            if let OptionSerializer::Some(logs) = meta.log_messages {
                landed.logs = logs;
            }
            if let OptionSerializer::Some(units) = meta.compute_units_consumed {
                landed.compute_units = Some(units);
            }
        }

        Ok(landed)
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeLedger;
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn retrying(ledger: FakeLedger, attempts: u32) -> RetryingLedger<FakeLedger> {
        RetryingLedger::new(ledger, RetryPolicy::new(attempts, Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn test_blockhash_retried_after_transient_failure() {
        let rpc = retrying(
            FakeLedger {
                blockhash_failures: AtomicU32::new(1),
                ..Default::default()
            },
            3,
        );

        let hash = rpc.latest_blockhash().await.unwrap();
        assert_eq!(hash, rpc.inner().blockhash);
        assert_eq!(rpc.inner().blockhash_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let rpc = retrying(
            FakeLedger {
                blockhash_failures: AtomicU32::new(5),
                ..Default::default()
            },
            3,
        );

        let err = rpc.latest_blockhash().await.unwrap_err();
        assert_eq!(err, DexError::Network("transient".into()));
        assert_eq!(rpc.inner().blockhash_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_send_is_not_retried() {
        let rpc = retrying(
            FakeLedger {
                send_result: Err(DexError::Submission("blockhash not found".into())),
                ..Default::default()
            },
            3,
        );

        let tx = Transaction::default();
        assert!(matches!(rpc.send(&tx).await, Err(DexError::Submission(_))));
        assert_eq!(rpc.inner().sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_with_retries_uses_configured_count() {
        let cfg = SolanaCfg {
            rpc_url: "http://localhost:8899".to_string(),
            retry_count: 4,
            ..Default::default()
        };
        let rpc = SolanaRpcClient::with_retries(&cfg);
        assert_eq!(rpc.policy.attempts(), 4);
        assert_eq!(rpc.policy.delay(2), RPC_BACKOFF_UNIT * 2);
        assert_eq!(rpc.inner().url(), "http://localhost:8899");
    }

    #[test]
    fn test_commitment_levels() {
        assert_eq!(commitment("processed"), CommitmentConfig::processed());
        assert_eq!(commitment("finalized"), CommitmentConfig::finalized());
        assert_eq!(commitment("confirmed"), CommitmentConfig::confirmed());
        assert_eq!(commitment(""), CommitmentConfig::confirmed());
    }

    #[test]
    fn test_client_uses_configured_url() {
        let cfg = SolanaCfg {
            rpc_url: "http://localhost:8899".to_string(),
            timeout_ms: 1_000,
            ..Default::default()
        };
        assert_eq!(SolanaRpcClient::new(&cfg).url(), "http://localhost:8899");
    }
}
