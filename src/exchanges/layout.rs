//! Fixed-width instruction payloads
//!
//! All integers are little-endian and stored as byte arrays so the structs
//! stay `Pod` without alignment padding.

use bytemuck::{Pod, Zeroable};
use std::mem::size_of;

pub const RAYDIUM_SWAP: u8 = 9;
pub const RAYDIUM_LIQUIDITY: u8 = 10;
pub const PUMPFUN_BUY: u8 = 6;
pub const PUMPFUN_SELL: u8 = 7;
pub const PUMPSWAP_SWAP: u8 = 1;
pub const PUMPSWAP_ADD_LIQUIDITY: u8 = 2;
pub const PUMPSWAP_REMOVE_LIQUIDITY: u8 = 3;

/// `[opcode][amount_in][min_amount_out]`
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SwapLayout {
    pub opcode: u8,
    pub amount_in: [u8; 8],
    pub min_amount_out: [u8; 8],
}

/// Swap payload with a trailing direction byte (0 buy, 1 sell)
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DirectedSwapLayout {
    pub opcode: u8,
    pub amount_in: [u8; 8],
    pub min_amount_out: [u8; 8],
    pub direction: u8,
}

/// `[opcode][op_type][amount_a][amount_b]`
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LiquidityLayout {
    pub opcode: u8,
    pub op_type: u8,
    pub amount_a: [u8; 8],
    pub amount_b: [u8; 8],
}

pub const SWAP_LEN: usize = 17;
pub const DIRECTED_SWAP_LEN: usize = 18;
pub const LIQUIDITY_LEN: usize = 18;

const _: () = assert!(size_of::<SwapLayout>() == SWAP_LEN);
const _: () = assert!(size_of::<DirectedSwapLayout>() == DIRECTED_SWAP_LEN);
const _: () = assert!(size_of::<LiquidityLayout>() == LIQUIDITY_LEN);

pub fn encode_swap(opcode: u8, amount_in: u64, min_amount_out: u64) -> Vec<u8> {
    let layout = SwapLayout {
        opcode,
        amount_in: amount_in.to_le_bytes(),
        min_amount_out: min_amount_out.to_le_bytes(),
    };
    bytemuck::bytes_of(&layout).to_vec()
}

pub fn encode_directed_swap(opcode: u8, amount_in: u64, min_amount_out: u64, direction: u8) -> Vec<u8> {
    let layout = DirectedSwapLayout {
        opcode,
        amount_in: amount_in.to_le_bytes(),
        min_amount_out: min_amount_out.to_le_bytes(),
        direction,
    };
    bytemuck::bytes_of(&layout).to_vec()
}

pub fn encode_liquidity(opcode: u8, op_type: u8, amount_a: u64, amount_b: u64) -> Vec<u8> {
    let layout = LiquidityLayout {
        opcode,
        op_type,
        amount_a: amount_a.to_le_bytes(),
        amount_b: amount_b.to_le_bytes(),
    };
    bytemuck::bytes_of(&layout).to_vec()
}
