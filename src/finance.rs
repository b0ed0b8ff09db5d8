//! Discounting and depreciation laws.
//!
//! The objective and the cash-flow post-processor both use these functions, so the discounted
//! value of a solution is the same whichever way it is computed.
use crate::coefficients::FinanceCoefficients;
use crate::units::Money;

pub mod cash_flow;

/// Factor discounting an amount in `year` back to year 0
pub fn discount_factor(rate: f64, year: u32) -> f64 {
    (1.0 + rate).powi(-(year as i32))
}

/// The operating years of the project, as indexes into the cash-flow table
pub fn operating_years(finance: &FinanceCoefficients) -> std::ops::Range<u32> {
    finance.first_operating_year()..finance.project_years()
}

/// Present value of one unit of money in every operating year
pub fn annuity_factor(finance: &FinanceCoefficients) -> f64 {
    operating_years(finance)
        .map(|year| discount_factor(finance.interest_rate, year))
        .sum()
}

/// Fraction of the total overnight cost depreciated in an operating year.
///
/// Uses the declining-balance method starting in the first operating year. Returns zero outside
/// the operating years.
pub fn depreciation_fraction(finance: &FinanceCoefficients, year: u32) -> f64 {
    if !operating_years(finance).contains(&year) {
        return 0.0;
    }

    let elapsed = year - finance.first_operating_year();
    let d = finance.depreciation_rate;
    d * (1.0 - d).powi(elapsed as i32)
}

/// Depreciation of the total overnight cost in a given year
pub fn depreciation(finance: &FinanceCoefficients, total_overnight_cost: Money, year: u32) -> Money {
    total_overnight_cost * depreciation_fraction(finance, year)
}

/// Present value of the capital outlay per unit of total overnight cost, net of the tax shield
/// from depreciation
pub fn capital_charge_factor(finance: &FinanceCoefficients) -> f64 {
    let r = finance.interest_rate;
    let outlay: f64 = (0..)
        .zip(&finance.construction_split)
        .map(|(year, fraction)| fraction * discount_factor(r, year))
        .sum();
    let tax_shield: f64 = operating_years(finance)
        .map(|year| finance.tax_rate * depreciation_fraction(finance, year) * discount_factor(r, year))
        .sum();

    outlay - tax_shield
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn annuity_matches_explicit_sum() {
        let finance = FinanceCoefficients::default();
        let r = finance.interest_rate;
        let expected: f64 = (2..=21).map(|j| (1.0 + r).powi(-j)).sum();
        assert_approx_eq!(f64, annuity_factor(&finance), expected, epsilon = 1e-12);
    }

    #[test]
    fn capital_charge_matches_explicit_sum() {
        let finance = FinanceCoefficients::default();
        let r = finance.interest_rate;
        let t = finance.tax_rate;
        let d = finance.depreciation_rate;
        let shield: f64 = (0..20)
            .map(|j| t * d * (1.0 - d).powi(j) * (1.0 + r).powi(-j - 2))
            .sum();
        let expected = 0.3 + 0.7 / (1.0 + r) - shield;
        assert_approx_eq!(
            f64,
            capital_charge_factor(&finance),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn depreciation_only_in_operating_years() {
        let finance = FinanceCoefficients::default();
        let toc = Money(1000.0);
        assert_eq!(depreciation(&finance, toc, 0), Money(0.0));
        assert_eq!(depreciation(&finance, toc, 1), Money(0.0));
        assert_approx_eq!(Money, depreciation(&finance, toc, 2), Money(75.0), epsilon = 1e-9);
        assert_approx_eq!(
            Money,
            depreciation(&finance, toc, 3),
            Money(75.0 * 0.925),
            epsilon = 1e-9
        );
        assert_eq!(depreciation(&finance, toc, 22), Money(0.0));
    }

    #[test]
    fn no_interest_annuity() {
        let finance = FinanceCoefficients {
            interest_rate: 0.0,
            ..FinanceCoefficients::default()
        };
        assert_approx_eq!(f64, annuity_factor(&finance), 20.0, epsilon = 1e-12);
    }
}
