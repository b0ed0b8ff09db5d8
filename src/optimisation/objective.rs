//! Code for assembling the objective: expected discounted cash flow of the retrofit.
//!
//! Each scenario contributes its annualised operating margin, taxed and discounted over the
//! operating years and weighted by its probability. The first stage contributes fixed O&M and the
//! discounted capital outlay net of the depreciation tax shield.
use super::problem::LinearExpr;
use super::variables::{Commitment, FirstStageVariables, HourlyQuantity, ScenarioVariables};
use crate::finance::{annuity_factor, capital_charge_factor};
use crate::model::Model;
use crate::scenario::Scenario;

/// Hourly sums of the terms of a scenario's operating margin.
///
/// Sums run over the operating hours only. Multiply by the horizon's annualisation factor to get
/// annual amounts.
#[derive(Debug, Clone)]
pub struct MarginTerms {
    /// Sales of net power
    pub power_revenue: LinearExpr,
    /// Credit earned on net captured CO2
    pub co2_credit: LinearExpr,
    /// Natural gas burnt outside startups
    pub fuel_cost: LinearExpr,
    /// CO2 transport and storage
    pub transport_storage_cost: LinearExpr,
    /// Fuel and CO2 of startups
    pub startup_cost: LinearExpr,
    /// Variable O&M
    pub variable_om: LinearExpr,
}

impl MarginTerms {
    /// Build the margin terms for a scenario
    pub fn new(model: &Model, scenario: &Scenario, variables: &ScenarioVariables) -> Self {
        let gas_price = model.parameters.natural_gas_price.value();
        let transport = model.coefficients.costs.transport_storage.value();
        let mut terms = Self {
            power_revenue: LinearExpr::default(),
            co2_credit: LinearExpr::default(),
            fuel_cost: LinearExpr::default(),
            transport_storage_cost: LinearExpr::default(),
            startup_cost: LinearExpr::default(),
            variable_om: LinearExpr::default(),
        };

        for hour in model.horizon.operating_hours() {
            let var = |quantity| variables.hourly(quantity, hour);
            terms.power_revenue.add_term(
                var(HourlyQuantity::NetPower),
                scenario.electricity_price(hour).value(),
            );
            terms
                .co2_credit
                .add_term(var(HourlyQuantity::NetCapturedCo2), scenario.co2_price.value());
            terms.fuel_cost.add_term(var(HourlyQuantity::Fuel), gas_price);
            terms
                .transport_storage_cost
                .add_term(var(HourlyQuantity::CompressedCo2), transport);
            terms.startup_cost.add_term(
                variables.commitment(Commitment::StartupEvent, hour),
                scenario.startup_cost.value(),
            );
            for vom in HourlyQuantity::vom() {
                terms.variable_om.add_term(var(vom), 1.0);
            }
        }

        terms
    }

    /// Revenue minus costs, summed over the operating hours
    pub fn margin(&self) -> LinearExpr {
        let mut margin = LinearExpr::default();
        margin.add_scaled(&self.power_revenue, 1.0);
        margin.add_scaled(&self.co2_credit, 1.0);
        for cost in [
            &self.fuel_cost,
            &self.transport_storage_cost,
            &self.startup_cost,
            &self.variable_om,
        ] {
            margin.add_scaled(cost, -1.0);
        }

        margin
    }
}

/// Capital and fixed costs of the installed DAC equipment
#[derive(Debug, Clone)]
pub struct CapitalTerms {
    /// Capital cost of sorbent and blowers, before owner's costs
    pub capital_cost: LinearExpr,
    /// Annual fixed O&M, including labour
    pub fixed_om: LinearExpr,
}

impl CapitalTerms {
    /// Build the capital terms from the sizing variables
    pub fn new(model: &Model, first_stage: &FirstStageVariables) -> Self {
        let dac = &model.coefficients.dac;
        let mut capital_cost = LinearExpr::default();
        capital_cost.add_term(first_stage.sorbent_mass, dac.sorbent_cost_coefficient());
        capital_cost.add_term(first_stage.blower_capacity, dac.blower_cost_coefficient());

        let mut fixed_om = capital_cost.scaled(dac.fixed_cost_fraction);
        fixed_om.add_constant(dac.labour_cost.value());

        Self {
            capital_cost,
            fixed_om,
        }
    }
}

/// The contribution of a scenario to the objective
pub fn scenario_objective(model: &Model, scenario: &Scenario, margin: &MarginTerms) -> LinearExpr {
    let finance = &model.coefficients.finance;
    let scale = scenario.probability
        * (1.0 - finance.tax_rate)
        * annuity_factor(finance)
        * model
            .horizon
            .annualisation_factor(finance.operating_hours_per_year);

    margin.margin().scaled(scale)
}

/// The contribution of the sizing decisions to the objective
pub fn first_stage_objective(model: &Model, capital: &CapitalTerms) -> LinearExpr {
    let finance = &model.coefficients.finance;
    let mut objective = capital
        .fixed_om
        .scaled(-(1.0 - finance.tax_rate) * annuity_factor(finance));
    objective.add_scaled(
        &capital.capital_cost,
        -finance.owner_cost_multiplier * capital_charge_factor(finance),
    );

    objective
}
