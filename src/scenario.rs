//! Generation of the scenario set.
//!
//! A scenario pairs a CO2 credit price tier with a window of the historical electricity price
//! series. The scenario set is the cross product of all tiers and all windows, each with equal
//! probability.
use crate::coefficients::ModeCoefficients;
use crate::model::ModelParameters;
use crate::time::Horizon;
use crate::units::{Money, MoneyPerMMBtu, MoneyPerMWh, MoneyPerTonne};
use anyhow::{Result, ensure};
use derive_more::Display;
use itertools::iproduct;
use serde::Serialize;

/// Hours in a week
const HOURS_PER_WEEK: usize = 7 * 24;

/// Identifies a scenario by its position in the scenario set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize)]
#[display("s{_0}")]
pub struct ScenarioID(pub usize);

/// A realisation of the uncertain prices
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Position in the scenario set
    pub id: ScenarioID,
    /// CO2 credit price
    pub co2_price: MoneyPerTonne,
    /// Index of the price window drawn from the series
    pub window: u32,
    /// Electricity price in each operating hour, starting with hour 1
    pub electricity_prices: Vec<MoneyPerMWh>,
    /// Probability of this scenario
    pub probability: f64,
    /// Cost of a single startup, covering its fuel and the CO2 emitted
    pub startup_cost: Money,
}

impl Scenario {
    /// The electricity price in an operating hour (1-based)
    pub fn electricity_price(&self, hour: usize) -> MoneyPerMWh {
        assert!(hour >= 1, "Hour 0 has no electricity price");
        self.electricity_prices[hour - 1]
    }

    /// A short, human-readable description used in output files
    pub fn label(&self) -> String {
        format!("co2_{}_window_{}", self.co2_price, self.window)
    }
}

/// Calculate the cost of one startup for a given CO2 price
pub fn startup_cost(
    modes: &ModeCoefficients,
    co2_price: MoneyPerTonne,
    natural_gas_price: MoneyPerMMBtu,
) -> Money {
    Money(modes.startup_co2 * co2_price.value() + modes.startup_fuel * natural_gas_price.value())
}

/// The set of scenarios for a model
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSet(Vec<Scenario>);

impl ScenarioSet {
    /// Create a scenario set, checking that scenarios are numbered in order and that their
    /// probabilities sum to one
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self> {
        ensure!(!scenarios.is_empty(), "The scenario set is empty");
        ensure!(
            scenarios.iter().enumerate().all(|(idx, s)| s.id.0 == idx),
            "Scenarios must be numbered consecutively from zero"
        );
        ensure!(
            scenarios.iter().all(|s| s.probability >= 0.0),
            "Scenario probabilities cannot be negative"
        );
        let total: f64 = scenarios.iter().map(|s| s.probability).sum();
        ensure!(
            (total - 1.0).abs() < 1e-9,
            "Scenario probabilities must sum to one (got {total})"
        );

        Ok(Self(scenarios))
    }

    /// Iterate over the scenarios
    pub fn iter(&self) -> std::slice::Iter<'_, Scenario> {
        self.0.iter()
    }

    /// Number of scenarios
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no scenarios (never true for a validated set)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get a scenario by ID
    pub fn get(&self, id: ScenarioID) -> &Scenario {
        &self.0[id.0]
    }

    /// The scenarios as a slice
    pub fn as_slice(&self) -> &[Scenario] {
        &self.0
    }
}

/// Cut the price windows for each scenario out of the price series.
///
/// Window `w` starts `w · week_diff` weeks into the series and covers the operating hours of the
/// horizon.
fn price_windows(
    series: &[MoneyPerMWh],
    horizon: &Horizon,
    week_diff: u32,
    window_count: u32,
) -> Result<Vec<Vec<MoneyPerMWh>>> {
    let n_hour = horizon.n_hour();
    (0..window_count as usize)
        .map(|window| {
            let start = window * week_diff as usize * HOURS_PER_WEEK;
            let end = start + n_hour;
            ensure!(
                end <= series.len(),
                "Price window {window} (hours {start} to {end}) runs past the end of the price \
                series ({} hours)",
                series.len()
            );
            Ok(series[start..end].to_vec())
        })
        .collect()
}

/// Generate the scenario set as the cross product of CO2 price tiers and price windows.
///
/// # Arguments
///
/// * `parameters` - Model parameters, giving price tiers and window spacing
/// * `modes` - Startup fuel and CO2 for the startup cost
/// * `horizon` - The planning horizon
/// * `series` - Hourly electricity prices
pub fn generate_scenarios(
    parameters: &ModelParameters,
    modes: &ModeCoefficients,
    horizon: &Horizon,
    series: &[MoneyPerMWh],
) -> Result<ScenarioSet> {
    let windows = price_windows(
        series,
        horizon,
        parameters.week_diff,
        parameters.window_count(),
    )?;

    let count = parameters.co2_prices.len() * windows.len();
    let probability = 1.0 / count as f64;
    let scenarios = iproduct!(parameters.co2_prices.iter(), windows.iter().enumerate())
        .enumerate()
        .map(|(idx, (&co2_price, (window, prices)))| Scenario {
            id: ScenarioID(idx),
            co2_price,
            window: window as u32,
            electricity_prices: prices.clone(),
            probability,
            startup_cost: startup_cost(modes, co2_price, parameters.natural_gas_price),
        })
        .collect();

    ScenarioSet::new(scenarios)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, model_parameters};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn ramp_series(len: usize) -> Vec<MoneyPerMWh> {
        (0..len).map(|i| MoneyPerMWh(i as f64)).collect()
    }

    #[rstest]
    fn generate_cross_product(mut model_parameters: ModelParameters) {
        model_parameters.window_count = Some(3);
        let horizon = Horizon::from_days(model_parameters.n_day);
        let scenarios = generate_scenarios(
            &model_parameters,
            &ModeCoefficients::default(),
            &horizon,
            &ramp_series(3 * HOURS_PER_WEEK),
        )
        .unwrap();

        assert_eq!(scenarios.len(), 6);
        for scenario in scenarios.iter() {
            assert_approx_eq!(f64, scenario.probability, 1.0 / 6.0);
            assert_eq!(scenario.electricity_prices.len(), 48);
        }

        // CO2 tiers vary slowest
        let first = scenarios.get(ScenarioID(0));
        let fourth = scenarios.get(ScenarioID(3));
        assert_eq!(first.co2_price, MoneyPerTonne(150.0));
        assert_eq!(fourth.co2_price, MoneyPerTonne(300.0));
        assert_eq!(fourth.window, 0);

        // Hour 1 uses the first price of the window
        let second_window = scenarios.get(ScenarioID(1));
        assert_eq!(second_window.window, 1);
        assert_eq!(
            second_window.electricity_price(1),
            MoneyPerMWh(HOURS_PER_WEEK as f64)
        );
        assert_eq!(
            second_window.electricity_price(48),
            MoneyPerMWh((HOURS_PER_WEEK + 47) as f64)
        );
    }

    #[rstest]
    fn generate_window_past_end(mut model_parameters: ModelParameters) {
        model_parameters.window_count = Some(2);
        let horizon = Horizon::from_days(model_parameters.n_day);
        assert_error!(
            generate_scenarios(
                &model_parameters,
                &ModeCoefficients::default(),
                &horizon,
                &ramp_series(HOURS_PER_WEEK + 10),
            ),
            "Price window 1 (hours 168 to 216) runs past the end of the price series (178 hours)"
        );
    }

    #[test]
    fn startup_cost_formula() {
        let cost = startup_cost(
            &ModeCoefficients::default(),
            MoneyPerTonne(150.0),
            MoneyPerMMBtu(3.83),
        );
        assert_approx_eq!(Money, cost, Money(100.45 * 150.0 + 16_958.58 * 3.83));
    }

    #[test]
    fn scenario_set_rejects_bad_probabilities() {
        let scenario = Scenario {
            id: ScenarioID(0),
            co2_price: MoneyPerTonne(150.0),
            window: 0,
            electricity_prices: vec![MoneyPerMWh(40.0)],
            probability: 0.5,
            startup_cost: Money(0.0),
        };
        assert!(ScenarioSet::new(vec![scenario]).is_err());
        assert!(ScenarioSet::new(Vec::new()).is_err());
    }
}
