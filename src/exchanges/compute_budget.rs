use solana_sdk::{compute_budget::ComputeBudgetInstruction, instruction::Instruction};

/// ComputeBudget instruction setting the priority fee (micro-lamports per compute unit)
pub fn create_priority_fee_instruction(priority_fee: u64) -> Instruction {
    ComputeBudgetInstruction::set_compute_unit_price(priority_fee)
}

/// Priority fee instruction followed by `instructions`; no prefix when the fee is zero
pub fn with_priority_fee(priority_fee: u64, instructions: Vec<Instruction>) -> Vec<Instruction> {
    if priority_fee == 0 {
        return instructions;
    }
    let mut out = Vec::with_capacity(instructions.len() + 1);
    out.push(create_priority_fee_instruction(priority_fee));
    out.extend(instructions);
    out
}
