//! Deterministic account derivation: program-derived and associated token addresses

use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;

pub const BONDING_CURVE_SEED: &[u8] = b"bonding-curve";
pub const POOL_SEED: &[u8] = b"pool";
pub const LP_MINT_SEED: &[u8] = b"lp-mint";

/// Wrapped SOL, the network's native asset as a mint
pub fn native_mint() -> Pubkey {
    spl_token::native_mint::id()
}

pub fn token_program() -> Pubkey {
    spl_token::id()
}

pub fn system_program() -> Pubkey {
    solana_sdk::system_program::id()
}

/// Canonical ATA holding `mint` for `owner`
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address(owner, mint)
}

/// Pump.fun bonding curve for a token mint
pub fn bonding_curve_address(mint: &Pubkey, program_id: &Pubkey) -> Pubkey {
    let (address, _bump) = Pubkey::find_program_address(&[BONDING_CURVE_SEED, mint.as_ref()], program_id);
    address
}

/// Orders two mints by their base58 form so both call orders hit the same pool
pub fn canonical_mint_order<'a>(a: &'a Pubkey, b: &'a Pubkey) -> (&'a Pubkey, &'a Pubkey) {
    if a.to_string() < b.to_string() {
        (a, b)
    } else {
        (b, a)
    }
}

/// PumpSwap pool for a mint pair, independent of argument order
pub fn pool_address(mint_a: &Pubkey, mint_b: &Pubkey, program_id: &Pubkey) -> Pubkey {
    let (lo, hi) = canonical_mint_order(mint_a, mint_b);
    let (address, _bump) = Pubkey::find_program_address(&[POOL_SEED, lo.as_ref(), hi.as_ref()], program_id);
    address
}

pub fn lp_mint_address(pool: &Pubkey, program_id: &Pubkey) -> Pubkey {
    let (address, _bump) = Pubkey::find_program_address(&[LP_MINT_SEED, pool.as_ref()], program_id);
    address
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn key(s: &str) -> Pubkey {
        Pubkey::from_str(s).unwrap()
    }

    #[test]
    fn test_pool_address_order_independent() {
        let program = key("pAMMBay6oceH9fJKBRHGP5D4bD4sWpmSwMn52FMfXEA");
        let sol = native_mint();
        let usdc = key("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");
        assert_eq!(pool_address(&sol, &usdc, &program), pool_address(&usdc, &sol, &program));

        for _ in 0..8 {
            let a = Pubkey::new_unique();
            let b = Pubkey::new_unique();
            assert_eq!(pool_address(&a, &b, &program), pool_address(&b, &a, &program));
        }
    }

    #[test]
    fn test_derivation_is_pure() {
        let program = key("6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P");
        let mint = Pubkey::new_unique();
        let curve = bonding_curve_address(&mint, &program);
        assert_eq!(curve, bonding_curve_address(&mint, &program));
        assert!(!curve.is_on_curve());

        let other_program = Pubkey::new_unique();
        assert_ne!(curve, bonding_curve_address(&mint, &other_program));
    }

    #[test]
    fn test_lp_mint_depends_on_pool() {
        let program = Pubkey::new_unique();
        let pool_a = Pubkey::new_unique();
        let pool_b = Pubkey::new_unique();
        assert_ne!(lp_mint_address(&pool_a, &program), lp_mint_address(&pool_b, &program));
    }

    #[test]
    fn test_ata_matches_spl_derivation() {
        let owner = Pubkey::new_unique();
        let mint = native_mint();
        let (expected, _) = Pubkey::find_program_address(
            &[owner.as_ref(), token_program().as_ref(), mint.as_ref()],
            &spl_associated_token_account::id(),
        );
        assert_eq!(associated_token_address(&owner, &mint), expected);
    }
}
