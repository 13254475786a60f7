use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::shared::errors::DexError;
use crate::shared::types::{LiquidityRequest, SwapRequest};

pub fn format_address(address: &Pubkey) -> String {
    let s = address.to_string();
    format!("{}...{}", &s[..8], &s[s.len() - 8..])
}

/// Parse a base58 public key, naming the offending field on failure
pub fn parse_pubkey(field: &str, value: &str) -> Result<Pubkey, DexError> {
    if value.is_empty() {
        return Err(DexError::validation(format!("{} is required", field)));
    }
    Pubkey::from_str(value).map_err(|e| DexError::address(field, e))
}

pub fn validate_slippage(slippage: f64) -> Result<(), DexError> {
    if !(0.0..=1.0).contains(&slippage) {
        return Err(DexError::validation("slippage must be between 0 and 1"));
    }
    Ok(())
}

/// Minimum acceptable output for a quoted amount: floor(amount_out * (1 - slippage))
pub fn min_amount_out(amount_out: u64, slippage: f64) -> u64 {
    if !(slippage > 0.0) {
        return amount_out;
    }
    let scaled = (amount_out as f64 * (1.0 - slippage.min(1.0))).floor();
    // f64 rounding near u64::MAX can land above the input
    (scaled as u64).min(amount_out)
}

pub fn validate_swap_request(req: &SwapRequest) -> Result<(), DexError> {
    if req.input_mint.is_empty() {
        return Err(DexError::validation("input mint is required"));
    }
    if req.output_mint.is_empty() {
        return Err(DexError::validation("output mint is required"));
    }
    if req.amount_in == 0 {
        return Err(DexError::validation("amount must be positive"));
    }
    if req.user_wallet.is_empty() {
        return Err(DexError::validation("user wallet is required"));
    }
    validate_slippage(req.slippage)?;

    parse_pubkey("input mint", &req.input_mint)?;
    parse_pubkey("output mint", &req.output_mint)?;
    parse_pubkey("user wallet", &req.user_wallet)?;

    Ok(())
}

pub fn validate_liquidity_request(req: &LiquidityRequest) -> Result<(), DexError> {
    if req.token_a_mint.is_empty() {
        return Err(DexError::validation("token A mint is required"));
    }
    if req.token_b_mint.is_empty() {
        return Err(DexError::validation("token B mint is required"));
    }
    if req.amount_a == 0 {
        return Err(DexError::validation("amount A must be greater than 0"));
    }
    if req.amount_b == 0 {
        return Err(DexError::validation("amount B must be greater than 0"));
    }
    if req.user_wallet.is_empty() {
        return Err(DexError::validation("user wallet is required"));
    }
    validate_slippage(req.slippage)?;

    parse_pubkey("token A mint", &req.token_a_mint)?;
    parse_pubkey("token B mint", &req.token_b_mint)?;
    parse_pubkey("user wallet", &req.user_wallet)?;

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::shared::types::LiquidityOperation;

    #[test]
    fn test_valid_swap_passes() {
        assert!(validate_swap_request(&swap("raydium")).is_ok());
    }

    #[test]
    fn test_swap_rejections() {
        let cases: [(&str, fn(&mut SwapRequest)); 9] = [
            ("empty input mint", |r| r.input_mint.clear()),
            ("empty output mint", |r| r.output_mint.clear()),
            ("zero amount", |r| r.amount_in = 0),
            ("empty wallet", |r| r.user_wallet.clear()),
            ("slippage above one", |r| r.slippage = 1.5),
            ("negative slippage", |r| r.slippage = -0.1),
            ("nan slippage", |r| r.slippage = f64::NAN),
            ("malformed input mint", |r| r.input_mint = "invalid-mint-address".into()),
            ("malformed wallet", |r| r.user_wallet = "0OIl".into()),
        ];

        for (name, mutate) in cases {
            let mut req = swap("raydium");
            mutate(&mut req);
            assert!(validate_swap_request(&req).is_err(), "{} should be rejected", name);
        }
    }

    #[test]
    fn test_malformed_key_is_address_error() {
        let mut req = swap("raydium");
        req.output_mint = "not-a-key".to_string();
        match validate_swap_request(&req) {
            Err(DexError::AddressFormat { field, .. }) => assert_eq!(field, "output mint"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_liquidity_rejections() {
        assert!(validate_liquidity_request(&liquidity("raydium", LiquidityOperation::Add)).is_ok());

        let mut req = liquidity("raydium", LiquidityOperation::Remove);
        req.amount_b = 0;
        assert!(validate_liquidity_request(&req).is_err());

        let mut req = liquidity("raydium", LiquidityOperation::Remove);
        req.token_a_mint = "xyz".to_string();
        assert!(matches!(
            validate_liquidity_request(&req),
            Err(DexError::AddressFormat { .. })
        ));
    }

    #[test]
    fn test_min_amount_out_bounds() {
        for amount in [0u64, 1, 999, 1_000_000_000, u64::MAX / 3, u64::MAX] {
            assert_eq!(min_amount_out(amount, 0.0), amount);
            for slippage in [0.0001, 0.005, 0.3, 0.999, 1.0] {
                assert!(min_amount_out(amount, slippage) <= amount);
            }
        }
        assert_eq!(min_amount_out(1_000, -0.5), 1_000);
        assert_eq!(min_amount_out(1_000, 1.0), 0);
        assert_eq!(min_amount_out(1_000, 0.01), 990);
    }

    #[test]
    fn test_format_address() {
        let key: Pubkey = USDC.parse().unwrap();
        assert_eq!(format_address(&key), "EPjFWdd5...ZwyTDt1v");
    }
}
