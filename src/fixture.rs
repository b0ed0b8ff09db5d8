//! Fixtures for tests
use crate::coefficients::Coefficients;
use crate::model::{Model, ModelParameters};
use crate::optimisation::constraints::add_scenario_constraints;
use crate::optimisation::problem::{Problem, Variable};
use crate::optimisation::variables::{
    Commitment, HourlyQuantity, ModeQuantity, OperatingMode, SorbentPool, VariableMap,
};
use crate::scenario::{Scenario, ScenarioID, generate_scenarios};
use crate::time::Horizon;
use crate::units::{Money, MoneyPerMWh, MoneyPerTonne};
use rstest::fixture;
use std::path::PathBuf;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Flat electricity price used by the test models
const FLAT_PRICE: MoneyPerMWh = MoneyPerMWh(40.0);

/// Sorbent installed in the hand-built operating point (t)
const OPERATING_POINT_SORBENT: f64 = 10.0;

#[fixture]
pub fn model_parameters() -> ModelParameters {
    toml::from_str(
        r#"
        n_day = 2
        price_signal = "flat_40"
        co2_prices = [150.0, 300.0]
        "#,
    )
    .unwrap()
}

#[fixture]
pub fn scenario() -> Scenario {
    Scenario {
        id: ScenarioID(0),
        co2_price: MoneyPerTonne(150.0),
        window: 0,
        electricity_prices: vec![FLAT_PRICE; 24],
        probability: 1.0,
        startup_cost: Money(10_000.0),
    }
}

/// A one-day model with two scenarios, differing only in CO2 price
#[fixture]
pub fn model(mut model_parameters: ModelParameters) -> Model {
    model_parameters.n_day = 1;
    model_parameters.window_count = Some(1);

    let coefficients = Coefficients::default();
    let horizon = Horizon::from_days(model_parameters.n_day);
    let series = vec![FLAT_PRICE; horizon.n_hour()];
    let scenarios =
        generate_scenarios(&model_parameters, &coefficients.modes, &horizon, &series).unwrap();

    Model {
        model_path: PathBuf::from("test_model"),
        parameters: model_parameters,
        coefficients,
        horizon,
        scenarios,
    }
}

/// A fully constrained problem together with a point which satisfies every constraint
pub struct OperatingPoint {
    pub problem: Problem,
    pub variables: VariableMap,
    pub values: Vec<f64>,
}

/// Build every constraint for a model, with a point that satisfies them all.
///
/// In each scenario the plant is off in hour 0, starts up in hour 1 and shuts down again as soon
/// as the startup is over. All sorbent stays fresh and no blower capacity is installed.
pub fn operating_point(model: &Model) -> OperatingPoint {
    let mut problem = Problem::default();
    let map = VariableMap::declare(
        &mut problem,
        &model.horizon,
        model.coefficients.modes.load_points.len(),
        model.iter_scenarios(),
    );
    for variables in map.iter_scenarios() {
        problem.extend_constraints(add_scenario_constraints(model, &map.first_stage, variables));
    }

    let coefficients = &model.coefficients;
    let trajectory = &coefficients.modes.startup_trajectory;
    let gas_turbine = coefficients.regression.gas_turbine_power;
    let costs = &coefficients.costs;

    let mut values = vec![0.0; problem.num_variables()];
    values[map.first_stage.sorbent_mass.index()] = OPERATING_POINT_SORBENT;
    for variables in map.iter_scenarios() {
        for boundary in model.horizon.iter_boundaries() {
            values[variables.pool(SorbentPool::Fresh, boundary).index()] =
                OPERATING_POINT_SORBENT;
        }

        values[variables.commitment(Commitment::StartupEvent, 1).index()] = 1.0;
        for (offset, &load) in trajectory.iter().enumerate() {
            let hour = offset + 1;
            let mut set = |var: Variable, value| {
                values[var.index()] = value;
            };
            set(variables.commitment(Commitment::On, hour), 1.0);
            set(variables.commitment(Commitment::StartingUp, hour), 1.0);
            set(
                variables.mode(OperatingMode::StartingUp, ModeQuantity::Load, hour),
                load,
            );
            set(variables.hourly(HourlyQuantity::Load, hour), load);

            let power = gas_turbine.a * load + gas_turbine.b;
            for quantity in [
                HourlyQuantity::GasTurbinePower,
                HourlyQuantity::TotalPower,
                HourlyQuantity::NetPower,
            ] {
                set(variables.hourly(quantity, hour), power);
            }
            set(
                variables.hourly(HourlyQuantity::NgccVom, hour),
                costs.ngcc_vom * load,
            );
            set(
                variables.hourly(HourlyQuantity::PccVom, hour),
                costs.pcc_vom * load,
            );
            set(
                variables.hourly(HourlyQuantity::PccCompressionVom, hour),
                costs.pcc_compression_vom * load,
            );
        }
    }

    OperatingPoint {
        problem,
        variables: map,
        values,
    }
}
