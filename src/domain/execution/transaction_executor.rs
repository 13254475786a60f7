//! Sign, simulate and submit pre-built transactions
//!
//! A transaction moves `BuiltTransaction -> SignedTransaction -> ExecutionReport`;
//! only a signed transaction can reach the ledger.

use serde::{Deserialize, Serialize};
use solana_sdk::{
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::transaction_builder::decode_transaction;
use crate::infrastructure::LedgerRpc;
use crate::shared::errors::{DexError, DexResult};
use crate::shared::types::{TransactionTestRequest, TransactionTestResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStage {
    Built,
    Signed,
    Simulated,
    Submitted,
    Confirmed,
    Failed,
}

impl ExecutionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStage::Built => "built",
            ExecutionStage::Signed => "signed",
            ExecutionStage::Simulated => "simulated",
            ExecutionStage::Submitted => "submitted",
            ExecutionStage::Confirmed => "confirmed",
            ExecutionStage::Failed => "failed",
        }
    }
}

impl fmt::Display for ExecutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unsigned transaction as produced by the assembler
#[derive(Debug, Clone)]
pub struct BuiltTransaction {
    transaction: Transaction,
}

/// Transaction carrying every required signature
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    transaction: Transaction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub stage: ExecutionStage,
    pub signature: Option<Signature>,
    pub logs: Vec<String>,
    pub units_consumed: Option<u64>,
    pub error: Option<String>,
}

impl ExecutionReport {
    pub fn succeeded(&self) -> bool {
        self.stage != ExecutionStage::Failed
    }

    pub fn into_response(self) -> TransactionTestResponse {
        TransactionTestResponse {
            success: self.succeeded(),
            stage: self.stage.to_string(),
            signature: self.signature.map(|s| s.to_string()),
            logs: self.logs,
            gas_used: self.units_consumed.unwrap_or(0),
            error: self.error,
        }
    }
}

impl BuiltTransaction {
    pub fn new(transaction: Transaction) -> Self {
        Self { transaction }
    }

    /// From the base64 transport encoding
    pub fn decode(encoded: &str) -> DexResult<Self> {
        decode_transaction(encoded).map(Self::new)
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// Signs with a base58 64-byte keypair; the key must cover every required signature
    pub fn sign(self, private_key: &str) -> DexResult<SignedTransaction> {
        let keypair = keypair_from_base58(private_key)?;
        let mut transaction = self.transaction;
        let blockhash = transaction.message.recent_blockhash;

        transaction
            .try_partial_sign(&[&keypair], blockhash)
            .map_err(|e| DexError::Signing(format!("failed to sign transaction: {}", e)))?;

        if !transaction.is_signed() {
            return Err(DexError::Signing(
                "transaction requires signatures from other keys".to_string(),
            ));
        }

        debug!(signer = %keypair.pubkey(), "transaction signed");
        Ok(SignedTransaction { transaction })
    }
}

fn keypair_from_base58(private_key: &str) -> DexResult<Keypair> {
    let bytes = Zeroizing::new(
        bs58::decode(private_key.trim())
            .into_vec()
            .map_err(|e| DexError::Signing(format!("invalid private key encoding: {}", e)))?,
    );
    Keypair::try_from(bytes.as_slice()).map_err(|e| DexError::Signing(format!("invalid private key: {}", e)))
}

impl SignedTransaction {
    pub fn signature(&self) -> Signature {
        self.transaction.signatures.first().copied().unwrap_or_default()
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// Dry run; a program error becomes `DexError::Simulation` with the ledger's logs
    pub async fn simulate(&self, rpc: &dyn LedgerRpc) -> DexResult<ExecutionReport> {
        let outcome = rpc.simulate(&self.transaction).await?;

        if let Some(err) = outcome.err {
            return Err(DexError::Simulation {
                message: err,
                logs: outcome.logs,
            });
        }

        info!(units = outcome.units_consumed, logs = outcome.logs.len(), "simulation succeeded");
        Ok(ExecutionReport {
            stage: ExecutionStage::Simulated,
            signature: None,
            logs: outcome.logs,
            units_consumed: outcome.units_consumed,
            error: None,
        })
    }

    /// Sends, then looks the transaction up once; a failed lookup still reports the signature
    pub async fn submit(self, rpc: &dyn LedgerRpc) -> DexResult<ExecutionReport> {
        let signature = rpc.send(&self.transaction).await?;
        info!(%signature, "transaction submitted");

        let mut report = ExecutionReport {
            stage: ExecutionStage::Submitted,
            signature: Some(signature),
            logs: Vec::new(),
            units_consumed: None,
            error: None,
        };

        match rpc.get_transaction(&signature).await {
            Ok(landed) => {
                debug!(%signature, slot = landed.slot, fee = landed.fee, "transaction found on ledger");
                report.logs = landed.logs;
                report.units_consumed = landed.compute_units;
                match landed.err {
                    Some(err) => {
                        warn!(%signature, error = %err, "transaction landed with error");
                        report.stage = ExecutionStage::Failed;
                        report.error = Some(err);
                    }
                    None => report.stage = ExecutionStage::Confirmed,
                }
            }
            Err(e) => {
                warn!(%signature, error = %e, "transaction lookup failed");
            }
        }

        Ok(report)
    }
}

/// Runs test requests end to end; every failure is folded into the response
pub struct TransactionExecutor {
    rpc: Arc<dyn LedgerRpc>,
}

impl TransactionExecutor {
    pub fn new(rpc: Arc<dyn LedgerRpc>) -> Self {
        Self { rpc }
    }

    pub async fn execute(&self, request: &TransactionTestRequest) -> TransactionTestResponse {
        match self.run(request).await {
            Ok(report) => report.into_response(),
            Err(e) => {
                warn!(error = %e, simulate_only = request.simulate_only, "transaction test failed");
                TransactionTestResponse {
                    success: false,
                    stage: ExecutionStage::Failed.to_string(),
                    logs: e.logs().to_vec(),
                    error: Some(e.to_string()),
                    ..Default::default()
                }
            }
        }
    }

    async fn run(&self, request: &TransactionTestRequest) -> DexResult<ExecutionReport> {
        let signed = BuiltTransaction::decode(&request.transaction)?.sign(&request.private_key)?;

        if request.simulate_only {
            signed.simulate(self.rpc.as_ref()).await
        } else {
            signed.submit(self.rpc.as_ref()).await
        }
    }
}
