//! Fee to fuel conversion.

use crate::error::{ExecError, ExecResult};
use sandbox_config::FUEL_LIMIT_MULTIPLIER;

/// Fuel a transaction can buy: the fee above `min_fee`, divided by the fuel
/// rate, times [`FUEL_LIMIT_MULTIPLIER`], capped at `cap`.
pub fn derive_fuel_limit(fee: u64, min_fee: u64, fuel_rate: u64, cap: u64) -> ExecResult<u64> {
    if fuel_rate == 0 {
        return Err(ExecError::fee("fuel rate is zero"));
    }
    if fee < min_fee {
        return Err(ExecError::fee(format!(
            "fee {} below minimum {}",
            fee, min_fee
        )));
    }
    let limit = ((fee - min_fee) / fuel_rate).saturating_mul(FUEL_LIMIT_MULTIPLIER);
    Ok(limit.min(cap))
}

/// Fee owed for `fuel_used` at `fuel_rate`.
pub fn fee_for(fuel_used: u64, fuel_rate: u64) -> ExecResult<u64> {
    fuel_used.checked_mul(fuel_rate).ok_or_else(|| {
        ExecError::overflow(format!("fee for {} fuel at rate {}", fuel_used, fuel_rate))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use sandbox_config::MAX_BLOCK_RUN_STEP;

    #[test]
    fn test_limit_from_fee() {
        assert_eq!(derive_fuel_limit(20_000, 10_000, 100, MAX_BLOCK_RUN_STEP).unwrap(), 10_000);
        assert_eq!(derive_fuel_limit(10_099, 10_000, 100, MAX_BLOCK_RUN_STEP).unwrap(), 0);
        assert_eq!(
            derive_fuel_limit(u64::MAX, 0, 1, MAX_BLOCK_RUN_STEP).unwrap(),
            MAX_BLOCK_RUN_STEP
        );
    }

    #[test]
    fn test_limit_rejects_bad_fees() {
        assert_eq!(derive_fuel_limit(1, 0, 0, 10).unwrap_err().kind(), ErrorKind::Fee);
        assert_eq!(derive_fuel_limit(9, 10, 1, 10).unwrap_err().kind(), ErrorKind::Fee);
    }

    #[test]
    fn test_fee_for() {
        assert_eq!(fee_for(250, 100).unwrap(), 25_000);
        assert_eq!(fee_for(u64::MAX, 2).unwrap_err().kind(), ErrorKind::ArithmeticOverflow);
    }
}
