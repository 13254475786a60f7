//! Execution domain - transaction assembly and execution

pub mod transaction_builder;
pub mod transaction_executor;

pub use transaction_builder::{
    decode_transaction, encode_transaction, AssembledTransaction, TransactionAssembler, DEFAULT_FEE_LAMPORTS,
};
pub use transaction_executor::{
    BuiltTransaction, ExecutionReport, ExecutionStage, SignedTransaction, TransactionExecutor,
};
