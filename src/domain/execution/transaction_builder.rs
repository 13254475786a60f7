//! Transaction assembly: instructions to an unsigned, transport-encoded transaction

use base64::{engine::general_purpose::STANDARD, Engine as _};
use solana_sdk::{instruction::Instruction, message::Message, pubkey::Pubkey, transaction::Transaction};
use tracing::{debug, warn};

use crate::exchanges::compute_budget::with_priority_fee;
use crate::exchanges::types::InstructionData;
use crate::exchanges::utils::format_address;
use crate::infrastructure::LedgerRpc;
use crate::shared::errors::{DexError, DexResult};

/// Fee reported when the ledger cannot price the message
pub const DEFAULT_FEE_LAMPORTS: u64 = 5_000;

#[derive(Debug, Clone)]
pub struct AssembledTransaction {
    pub transaction: Transaction,
    pub estimated_fee: u64,
    /// true when `estimated_fee` is the fallback rather than a ledger quote
    pub fee_is_estimate: bool,
    /// base64 of the bincode-serialized transaction
    pub encoded: String,
}

/// Builds unsigned transactions against the ledger's latest blockhash
pub struct TransactionAssembler<'a> {
    rpc: &'a dyn LedgerRpc,
}

impl<'a> TransactionAssembler<'a> {
    pub fn new(rpc: &'a dyn LedgerRpc) -> Self {
        Self { rpc }
    }

    pub async fn assemble(
        &self,
        instructions: Vec<InstructionData>,
        fee_payer: &Pubkey,
        priority_fee: u64,
    ) -> DexResult<AssembledTransaction> {
        if instructions.is_empty() {
            return Err(DexError::validation("no instructions to assemble"));
        }

        let instructions: Vec<Instruction> = instructions.into_iter().map(Instruction::from).collect();
        let instructions = with_priority_fee(priority_fee, instructions);

        let blockhash = self.rpc.latest_blockhash().await?;
        let message = Message::new_with_blockhash(&instructions, Some(fee_payer), &blockhash);

        let (estimated_fee, fee_is_estimate) = match self.rpc.fee_for_message(&message).await {
            Ok(fee) => (fee, false),
            Err(e) => {
                warn!(error = %e, fallback = DEFAULT_FEE_LAMPORTS, "fee lookup failed, using default");
                (DEFAULT_FEE_LAMPORTS, true)
            }
        };

        let transaction = Transaction::new_unsigned(message);
        let encoded = encode_transaction(&transaction)?;

        debug!(
            payer = %format_address(fee_payer),
            instructions = instructions.len(),
            estimated_fee,
            bytes = encoded.len(),
            "transaction assembled"
        );

        Ok(AssembledTransaction {
            transaction,
            estimated_fee,
            fee_is_estimate,
            encoded,
        })
    }
}

pub fn encode_transaction(transaction: &Transaction) -> DexResult<String> {
    let bytes = bincode::serialize(transaction)?;
    Ok(STANDARD.encode(bytes))
}

pub fn decode_transaction(encoded: &str) -> DexResult<Transaction> {
    let bytes = STANDARD.decode(encoded.trim())?;
    Ok(bincode::deserialize(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::rpc_client::fake::FakeLedger;
    use crate::infrastructure::RetryingLedger;
    use crate::shared::utils::RetryPolicy;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use solana_sdk::compute_budget;
    use solana_sdk::instruction::AccountMeta;

    fn instruction(payer: Pubkey) -> InstructionData {
        InstructionData {
            program_id: Pubkey::new_unique(),
            accounts: vec![
                AccountMeta::new_readonly(payer, true),
                AccountMeta::new(Pubkey::new_unique(), false),
            ],
            data: vec![9, 1, 2, 3],
        }
    }

    #[tokio::test]
    async fn test_priority_fee_prefix() {
        let rpc = FakeLedger::default();
        let payer = Pubkey::new_unique();
        let assembled = TransactionAssembler::new(&rpc)
            .assemble(vec![instruction(payer)], &payer, 10_000)
            .await
            .unwrap();

        let message = &assembled.transaction.message;
        assert_eq!(message.instructions.len(), 2);
        let first_program = message.account_keys[message.instructions[0].program_id_index as usize];
        assert_eq!(first_program, compute_budget::id());
        assert_eq!(message.instructions[0].data[0], 3);
        assert_eq!(&message.instructions[0].data[1..], &10_000u64.to_le_bytes());

        assert_eq!(message.recent_blockhash, rpc.blockhash);
        assert_eq!(message.account_keys[0], payer);
        assert!(!assembled.fee_is_estimate);
        assert_eq!(assembled.estimated_fee, 5_000);
    }

    #[tokio::test]
    async fn test_no_prefix_without_priority_fee() {
        let rpc = FakeLedger::default();
        let payer = Pubkey::new_unique();
        let assembled = TransactionAssembler::new(&rpc)
            .assemble(vec![instruction(payer)], &payer, 0)
            .await
            .unwrap();
        assert_eq!(assembled.transaction.message.instructions.len(), 1);
        assert!(!assembled.transaction.is_signed());
    }

    #[tokio::test]
    async fn test_fee_lookup_failure_falls_back() {
        let rpc = FakeLedger {
            fee: Err(DexError::Network("rpc down".into())),
            ..Default::default()
        };
        let payer = Pubkey::new_unique();
        let assembled = TransactionAssembler::new(&rpc)
            .assemble(vec![instruction(payer)], &payer, 0)
            .await
            .unwrap();
        assert_eq!(assembled.estimated_fee, DEFAULT_FEE_LAMPORTS);
        assert!(assembled.fee_is_estimate);
    }

    #[tokio::test]
    async fn test_encoded_round_trip() {
        let rpc = FakeLedger::default();
        let payer = Pubkey::new_unique();
        let assembled = TransactionAssembler::new(&rpc)
            .assemble(vec![instruction(payer)], &payer, 1)
            .await
            .unwrap();

        let decoded = decode_transaction(&assembled.encoded).unwrap();
        assert_eq!(decoded, assembled.transaction);
    }

    #[tokio::test]
    async fn test_empty_instructions_rejected() {
        let rpc = FakeLedger::default();
        let err = TransactionAssembler::new(&rpc)
            .assemble(Vec::new(), &Pubkey::new_unique(), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, DexError::Validation(_)));
    }

    #[tokio::test]
    async fn test_transient_blockhash_failure_is_retried() {
        let rpc = RetryingLedger::new(
            FakeLedger {
                blockhash_failures: AtomicU32::new(1),
                ..Default::default()
            },
            RetryPolicy::new(3, Duration::from_millis(1)),
        );
        let payer = Pubkey::new_unique();
        let assembled = TransactionAssembler::new(&rpc)
            .assemble(vec![instruction(payer)], &payer, 0)
            .await
            .unwrap();

        assert_eq!(assembled.transaction.message.recent_blockhash, rpc.inner().blockhash);
        assert_eq!(rpc.inner().blockhash_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_transaction("!!!not base64"), Err(DexError::Serialization(_))));
        assert!(matches!(decode_transaction("AAAA"), Err(DexError::Serialization(_))));
    }
}
