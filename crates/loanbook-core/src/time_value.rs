use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::error::LoanbookError;
use crate::types::{Money, Percent, Rate};
use crate::LoanbookResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Monthly periodic rate for a nominal annual percentage (9.5 -> 0.0079166..).
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / PERCENT / MONTHS_PER_YEAR
}

/// (1 + rate)^nper
pub fn growth_factor(rate: Rate, nper: u32) -> LoanbookResult<Decimal> {
    Decimal::ONE
        .checked_add(rate)
        .and_then(|one_plus_r| one_plus_r.checked_powu(u64::from(nper)))
        .ok_or_else(|| LoanbookError::overflow("term_months"))
}

/// Level payment that fully repays `principal` over `nper` periods.
///
/// `principal * r / (1 - (1 + r)^-n)`, or `principal / n` at a zero rate.
pub fn pmt(rate: Rate, nper: u32, principal: Money) -> LoanbookResult<Money> {
    if nper == 0 {
        return Err(LoanbookError::invalid(
            "nper",
            "Number of periods must be > 0",
        ));
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let factor = growth_factor(rate, nper)?;
    let annuity_factor = Decimal::ONE - Decimal::ONE / factor;

    if annuity_factor.is_zero() {
        return Err(LoanbookError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    principal
        .checked_mul(rate)
        .and_then(|interest| interest.checked_div(annuity_factor))
        .ok_or_else(|| LoanbookError::overflow("principal"))
}

/// Outstanding balance after `paid` level payments of `payment`.
///
/// Negative when the payments more than repay the loan.
pub fn balance_after(
    rate: Rate,
    principal: Money,
    payment: Money,
    paid: u32,
) -> LoanbookResult<Money> {
    let balance = if rate.is_zero() {
        payment
            .checked_mul(Decimal::from(paid))
            .and_then(|repaid| principal.checked_sub(repaid))
    } else {
        let factor = growth_factor(rate, paid)?;
        let grown = principal.checked_mul(factor);
        let repaid = payment
            .checked_mul(factor - Decimal::ONE)
            .and_then(|fv| fv.checked_div(rate));
        grown
            .zip(repaid)
            .and_then(|(grown, repaid)| grown.checked_sub(repaid))
    };
    balance.ok_or_else(|| LoanbookError::overflow("monthly_payment"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_rate() {
        let r = monthly_rate(dec!(9.5));
        assert!((r - dec!(0.0079167)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_pmt_standard_loan() {
        let payment = pmt(monthly_rate(dec!(9.5)), 60, dec!(100000)).unwrap();
        assert!((payment - dec!(2100.19)).abs() < dec!(0.01));
    }

    #[test]
    fn test_pmt_zero_rate() {
        assert_eq!(pmt(Decimal::ZERO, 12, dec!(12000)).unwrap(), dec!(1000));
    }

    #[test]
    fn test_growth_factor_overflow_is_an_error() {
        assert!(growth_factor(dec!(10), 600).is_err());
    }

    #[test]
    fn test_growth_factor_long_term() {
        let f = growth_factor(monthly_rate(dec!(6)), 360).unwrap();
        // 1.005^360
        assert!((f - dec!(6.022575212)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_pmt_huge_principal_is_an_error() {
        let err = pmt(monthly_rate(dec!(1500)), 12, Decimal::MAX).unwrap_err();
        assert!(matches!(err, LoanbookError::InvalidArgument { .. }));
    }

    #[test]
    fn test_balance_after_underpayment_is_positive() {
        let r = monthly_rate(dec!(6));
        let bal = balance_after(r, dec!(12000), dec!(1000), 12).unwrap();
        // 12000 * 1.005^12 - 1000 * (1.005^12 - 1) / 0.005
        assert!((bal - dec!(404.57)).abs() < dec!(0.01));
    }

    #[test]
    fn test_pmt_zero_periods() {
        assert!(pmt(dec!(0.01), 0, dec!(1000)).is_err());
    }

    #[test]
    fn test_balance_after_full_term_is_zero() {
        let r = monthly_rate(dec!(6));
        let payment = pmt(r, 24, dec!(5000)).unwrap();
        let bal = balance_after(r, dec!(5000), payment, 24).unwrap();
        assert!(bal.abs() < dec!(0.000001));
    }
}
