//! Access to the values of a solved model.
use super::problem::{LinearExpr, Variable, Violation};
use super::solver::{OptimalityGap, SolveOutcome};
use super::stochastic::StochasticModel;
use super::variables::{
    Commitment, HourlyQuantity, OperatingMode, ScenarioVariables, SliceQuantity, SorbentPool,
};
use crate::finance::cash_flow::{CashFlowTable, ProfitCost};
use crate::model::Model;
use crate::scenario::{Scenario, ScenarioID};
use crate::time::{HourSlice, SLICES_PER_HOUR};
use crate::units::Money;
use std::time::Duration;

/// The solution to the stochastic model
pub struct Solution<'a> {
    model: &'a Model,
    stochastic: &'a StochasticModel,
    outcome: SolveOutcome,
}

impl<'a> Solution<'a> {
    /// Wrap the solver's output for a model
    pub fn new(model: &'a Model, stochastic: &'a StochasticModel, outcome: SolveOutcome) -> Self {
        assert_eq!(
            outcome.values.len(),
            stochastic.problem().num_variables(),
            "Solution has the wrong number of values"
        );

        Self {
            model,
            stochastic,
            outcome,
        }
    }

    /// The model that was solved
    pub fn model(&self) -> &'a Model {
        self.model
    }

    /// The objective value, including its constant term
    pub fn objective_value(&self) -> Money {
        self.outcome.objective_value
    }

    /// Upper bound on the objective value, if known
    pub fn bound(&self) -> Option<Money> {
        self.outcome.bound
    }

    /// Gap between the objective value and its bound
    pub fn gap(&self) -> Option<OptimalityGap> {
        self.outcome.gap()
    }

    /// Termination status reported by the solver
    pub fn status(&self) -> String {
        format!("{:?}", self.outcome.status)
    }

    /// Wall-clock time taken by the solver
    pub fn solve_time(&self) -> Duration {
        self.outcome.solve_time
    }

    /// Get the value of a variable
    pub fn value(&self, var: Variable) -> f64 {
        self.outcome.values[var.index()]
    }

    fn evaluate(&self, expr: &LinearExpr) -> f64 {
        expr.evaluate(&self.outcome.values)
    }

    /// Constraints and bounds violated by the solution
    pub fn violations(&self, tolerance: f64) -> Vec<Violation> {
        self.stochastic
            .problem()
            .violations(&self.outcome.values, tolerance)
    }

    /// Installed sorbent mass (t)
    pub fn sorbent_mass(&self) -> f64 {
        self.value(self.stochastic.variables().first_stage.sorbent_mass)
    }

    /// Installed blower capacity (m³/s)
    pub fn blower_capacity(&self) -> f64 {
        self.value(self.stochastic.variables().first_stage.blower_capacity)
    }

    /// Capital cost of the DAC equipment, before owner's costs
    pub fn capital_cost(&self) -> Money {
        Money(self.evaluate(&self.stochastic.capital().capital_cost))
    }

    /// Total overnight cost, including the existing plant if given
    pub fn total_overnight_cost(&self) -> Money {
        let finance = &self.model.coefficients.finance;
        self.capital_cost() * finance.owner_cost_multiplier + finance.baseline_overnight_cost
    }

    /// Annual fixed O&M, including the existing plant if given
    pub fn fixed_om(&self) -> Money {
        Money(self.evaluate(&self.stochastic.capital().fixed_om))
            + self.model.coefficients.finance.baseline_fixed_cost
    }

    /// Annual revenue and costs in a scenario
    pub fn profit_cost(&self, id: ScenarioID) -> ProfitCost {
        let margin = self.stochastic.margin(id);
        let factor = self
            .model
            .horizon
            .annualisation_factor(self.model.coefficients.finance.operating_hours_per_year);
        let annual = |expr: &LinearExpr| Money(self.evaluate(expr) * factor);

        ProfitCost {
            power_revenue: annual(&margin.power_revenue),
            co2_credit: annual(&margin.co2_credit),
            fuel_cost: annual(&margin.fuel_cost),
            transport_storage_cost: annual(&margin.transport_storage_cost),
            startup_cost: annual(&margin.startup_cost),
            variable_om: annual(&margin.variable_om),
            fixed_om: self.fixed_om(),
        }
    }

    /// The cash-flow table of a scenario
    pub fn cash_flow(&self, id: ScenarioID) -> CashFlowTable {
        CashFlowTable::new(
            &self.model.coefficients.finance,
            self.total_overnight_cost(),
            &self.profit_cost(id),
        )
    }

    /// Probability-weighted NPV over all scenarios
    pub fn expected_npv(&self) -> Money {
        self.model
            .iter_scenarios()
            .map(|scenario| self.cash_flow(scenario.id).npv() * scenario.probability)
            .sum()
    }

    /// Iterate over the scenarios with their solved values
    pub fn iter_scenarios(&self) -> impl Iterator<Item = ScenarioSolution<'_>> {
        self.model.iter_scenarios().map(|scenario| ScenarioSolution {
            solution: self,
            scenario,
            variables: self.stochastic.scenario_variables(scenario.id),
        })
    }
}

/// The solved values of one scenario
pub struct ScenarioSolution<'s> {
    solution: &'s Solution<'s>,
    /// The scenario
    pub scenario: &'s Scenario,
    variables: &'s ScenarioVariables,
}

impl ScenarioSolution<'_> {
    /// The model that was solved
    pub fn model(&self) -> &Model {
        self.solution.model
    }

    /// A commitment binary, rounded to 0 or 1
    pub fn commitment(&self, kind: Commitment, hour: usize) -> f64 {
        self.solution
            .value(self.variables.commitment(kind, hour))
            .round()
    }

    /// The operating mode in an hour
    pub fn mode(&self, hour: usize) -> OperatingMode {
        OperatingMode::classify(
            self.commitment(Commitment::On, hour),
            self.commitment(Commitment::StartingUp, hour),
        )
    }

    /// An hourly quantity
    pub fn hourly(&self, quantity: HourlyQuantity, hour: usize) -> f64 {
        self.solution.value(self.variables.hourly(quantity, hour))
    }

    /// A sorbent pool at a slice boundary
    pub fn pool(&self, pool: SorbentPool, boundary: HourSlice) -> f64 {
        self.solution.value(self.variables.pool(pool, boundary))
    }

    /// A slice quantity
    pub fn slice(&self, quantity: SliceQuantity, slice: HourSlice) -> f64 {
        self.solution.value(self.variables.slice(quantity, slice))
    }

    /// A slice quantity summed over the slices of an hour
    pub fn hour_total(&self, quantity: SliceQuantity, hour: usize) -> f64 {
        (0..SLICES_PER_HOUR)
            .map(|slice| self.slice(quantity, HourSlice::new(hour, slice)))
            .sum()
    }

    /// Net captured CO2 over the operating hours (t)
    pub fn net_captured_co2(&self) -> f64 {
        self.solution
            .model
            .horizon
            .operating_hours()
            .map(|hour| self.hourly(HourlyQuantity::NetCapturedCo2, hour))
            .sum()
    }

    /// Number of startups over the horizon
    pub fn startup_count(&self) -> u32 {
        self.solution
            .model
            .horizon
            .hours()
            .map(|hour| self.commitment(Commitment::StartupEvent, hour) as u32)
            .sum()
    }
}
