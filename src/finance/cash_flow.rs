//! The project cash-flow table for a scenario, with NPV and IRR.
use super::{depreciation, discount_factor};
use crate::coefficients::FinanceCoefficients;
use crate::units::Money;
use serde::Serialize;

/// Bracket searched for the internal rate of return
const IRR_BRACKET: (f64, f64) = (-0.99, 10.0);

/// Tolerance on the IRR
const IRR_TOLERANCE: f64 = 1e-10;

/// Maximum number of bisection steps when searching for the IRR
const IRR_MAX_ITERATIONS: usize = 200;

/// Annual revenue and costs of operating the plant in one scenario
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProfitCost {
    /// Sales of net power
    pub power_revenue: Money,
    /// Credit earned on net captured CO2
    pub co2_credit: Money,
    /// Natural gas outside startups
    pub fuel_cost: Money,
    /// CO2 transport and storage
    pub transport_storage_cost: Money,
    /// Fuel and CO2 of startups
    pub startup_cost: Money,
    /// Variable O&M
    pub variable_om: Money,
    /// Fixed O&M
    pub fixed_om: Money,
}

impl ProfitCost {
    /// Total annual revenue
    pub fn revenue(&self) -> Money {
        self.power_revenue + self.co2_credit
    }

    /// Total annual cost excluding depreciation
    pub fn cost(&self) -> Money {
        self.fuel_cost
            + self.transport_storage_cost
            + self.startup_cost
            + self.variable_om
            + self.fixed_om
    }

    /// Annual profit before depreciation and tax
    pub fn profit(&self) -> Money {
        self.revenue() - self.cost()
    }
}

/// One year of the cash-flow table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashFlowRow {
    /// Index of the year, starting from 0 at the start of construction
    pub year: u32,
    /// Calendar year
    pub calendar_year: i32,
    /// Capital spent on construction (negative)
    pub capital_outlay: Money,
    /// Working capital
    pub working_capital: Money,
    /// Depreciation
    pub depreciation: Money,
    /// Operating cost excluding depreciation
    pub operating_cost: Money,
    /// Revenue
    pub revenue: Money,
    /// Net earnings after tax
    pub net_earnings: Money,
    /// Cash flow
    pub cash_flow: Money,
    /// Cash flow discounted to year 0
    pub present_value: Money,
    /// Running total of present value
    pub cumulative_present_value: Money,
}

/// The cash-flow table of a project
#[derive(Debug, Clone, PartialEq)]
pub struct CashFlowTable {
    rows: Vec<CashFlowRow>,
}

impl CashFlowTable {
    /// Build the table for a project.
    ///
    /// # Arguments
    ///
    /// * `finance` - Financial assumptions
    /// * `total_overnight_cost` - Capital cost including owner's costs
    /// * `annual` - Revenue and costs in each operating year
    pub fn new(
        finance: &FinanceCoefficients,
        total_overnight_cost: Money,
        annual: &ProfitCost,
    ) -> Self {
        let first_operating = finance.first_operating_year();
        let mut cumulative = Money(0.0);
        let rows = (0..finance.project_years())
            .map(|year| {
                let operating = year >= first_operating;
                let capital_outlay = finance
                    .construction_split
                    .get(year as usize)
                    .map_or(Money(0.0), |fraction| -total_overnight_cost * *fraction);
                let depreciation = depreciation(finance, total_overnight_cost, year);
                let (revenue, operating_cost, net_earnings) = if operating {
                    let revenue = annual.revenue();
                    let cost = annual.cost();
                    let net = (revenue - cost - depreciation) * (1.0 - finance.tax_rate);
                    (revenue, cost, net)
                } else {
                    (Money(0.0), Money(0.0), Money(0.0))
                };

                let working_capital = Money(0.0);
                let cash_flow = capital_outlay + working_capital + depreciation + net_earnings;
                let present_value = cash_flow * discount_factor(finance.interest_rate, year);
                cumulative += present_value;

                CashFlowRow {
                    year,
                    calendar_year: finance.start_year + year as i32,
                    capital_outlay,
                    working_capital,
                    depreciation,
                    operating_cost,
                    revenue,
                    net_earnings,
                    cash_flow,
                    present_value,
                    cumulative_present_value: cumulative,
                }
            })
            .collect();

        Self { rows }
    }

    /// Iterate over the rows
    pub fn iter(&self) -> std::slice::Iter<'_, CashFlowRow> {
        self.rows.iter()
    }

    /// Net present value, i.e. the final cumulative present value
    pub fn npv(&self) -> Money {
        self.rows
            .last()
            .map_or(Money(0.0), |row| row.cumulative_present_value)
    }

    /// NPV of the cash flows at the given discount rate
    fn npv_at(&self, rate: f64) -> f64 {
        self.rows
            .iter()
            .map(|row| row.cash_flow.value() * discount_factor(rate, row.year))
            .sum()
    }

    /// The internal rate of return.
    ///
    /// Found by bisection. Returns `None` if the NPV does not change sign over the bracket.
    pub fn irr(&self) -> Option<f64> {
        let (mut low, mut high) = IRR_BRACKET;
        let mut npv_low = self.npv_at(low);
        let npv_high = self.npv_at(high);
        if !(npv_low.is_finite() && npv_high.is_finite()) || npv_low * npv_high > 0.0 {
            return None;
        }
        if npv_low == 0.0 {
            return Some(low);
        }

        for _ in 0..IRR_MAX_ITERATIONS {
            let mid = 0.5 * (low + high);
            let npv_mid = self.npv_at(mid);
            if npv_mid == 0.0 || high - low < IRR_TOLERANCE {
                return Some(mid);
            }
            if npv_low * npv_mid < 0.0 {
                high = mid;
            } else {
                low = mid;
                npv_low = npv_mid;
            }
        }

        Some(0.5 * (low + high))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::{annuity_factor, capital_charge_factor};
    use float_cmp::assert_approx_eq;

    fn annual(revenue: f64, cost: f64) -> ProfitCost {
        ProfitCost {
            power_revenue: Money(revenue),
            fuel_cost: Money(cost),
            ..ProfitCost::default()
        }
    }

    #[test]
    fn table_shape() {
        let finance = FinanceCoefficients::default();
        let table = CashFlowTable::new(&finance, Money(1000.0), &annual(500.0, 200.0));
        let rows: Vec<_> = table.iter().collect();
        assert_eq!(rows.len(), 22);
        assert_eq!(rows[0].calendar_year, 2021);
        assert_eq!(rows[21].calendar_year, 2042);
        assert_approx_eq!(Money, rows[0].capital_outlay, Money(-300.0));
        assert_approx_eq!(Money, rows[1].capital_outlay, Money(-700.0));
        assert_eq!(rows[1].revenue, Money(0.0));
        assert_eq!(rows[2].capital_outlay, Money(0.0));
        assert_eq!(rows[2].revenue, Money(500.0));
        assert_approx_eq!(
            Money,
            rows[2].net_earnings,
            Money((300.0 - 75.0) * (1.0 - finance.tax_rate)),
            epsilon = 1e-9
        );
    }

    #[test]
    fn npv_matches_closed_form() {
        let finance = FinanceCoefficients::default();
        let toc = 2.5e6;
        let profit = 4.0e5;
        let table = CashFlowTable::new(&finance, Money(toc), &annual(profit, 0.0));
        let expected = profit * (1.0 - finance.tax_rate) * annuity_factor(&finance)
            - toc * capital_charge_factor(&finance);
        assert_approx_eq!(f64, table.npv().value(), expected, epsilon = 1e-6);
    }

    #[test]
    fn irr_zeroes_npv() {
        let finance = FinanceCoefficients::default();
        let table = CashFlowTable::new(&finance, Money(1.0e6), &annual(2.0e5, 0.0));
        let irr = table.irr().unwrap();
        assert!(irr > finance.interest_rate);
        assert_approx_eq!(f64, table.npv_at(irr), 0.0, epsilon = 1.0);
    }

    #[test]
    fn irr_none_without_sign_change() {
        let finance = FinanceCoefficients::default();
        let table = CashFlowTable::new(&finance, Money(0.0), &annual(1.0, 0.0));
        assert_eq!(table.irr(), None);
    }
}
