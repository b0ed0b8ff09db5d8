//! Constraints for unit commitment, startup dynamics and part-load operation.
use crate::coefficients::ModeCoefficients;
use crate::model::Model;
use crate::optimisation::problem::{ConstraintFamily, ConstraintSet, RowBounds, Variable};
use crate::optimisation::variables::{Commitment, ModeQuantity, OperatingMode, ScenarioVariables};
use strum::IntoEnumIterator;

/// Maximum load factor (%)
const MAX_LOAD: f64 = 100.0;

/// Add all mode logic and part-load constraints for a scenario
pub fn add_mode_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
) {
    let modes = &model.coefficients.modes;
    add_convex_combination_constraints(constraints, model, variables);
    add_dispatch_load_constraints(constraints, model, variables);
    add_startup_load_constraints(constraints, model, variables);
    add_mode_load_limit_constraints(constraints, model, variables);
    add_dispatch_response_constraints(constraints, model, variables);
    add_startup_response_constraints(constraints, model, variables);
    add_mode_aggregation_constraints(constraints, model, variables);
    add_startup_transition_constraints(constraints, model, variables);
    constraints.add(
        ConstraintFamily::NoInitialStartup,
        RowBounds::Equal(0.0),
        [(variables.commitment(Commitment::StartupEvent, 0), 1.0)],
    );
    add_startup_window_constraints(constraints, model, modes, variables);
    if let Some(cap) = model.parameters.start_up_cap() {
        add_startup_limit_constraint(constraints, model, variables, cap);
    }
}

/// Startup events whose window covers `hour`, with the position of `hour` in each window.
///
/// A startup beginning in hour `e` covers hours `e` to `e + K − 1` where `K` is the length of the
/// startup trajectory.
fn startup_events_covering(
    modes: &ModeCoefficients,
    variables: &ScenarioVariables,
    hour: usize,
) -> impl Iterator<Item = (Variable, usize)> {
    (0..modes.startup_hours())
        .filter(move |&offset| offset <= hour)
        .map(move |offset| {
            (
                variables.commitment(Commitment::StartupEvent, hour - offset),
                offset,
            )
        })
}

/// Dispatch weights sum to `y − z`
fn add_convex_combination_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
) {
    let n_points = model.coefficients.modes.load_points.len();
    for hour in model.horizon.hours() {
        let weights = (0..n_points).map(|point| (variables.weight(hour, point), 1.0));
        let commitment = [
            (variables.commitment(Commitment::On, hour), -1.0),
            (variables.commitment(Commitment::StartingUp, hour), 1.0),
        ];
        constraints.add(
            ConstraintFamily::ConvexCombination,
            RowBounds::Equal(0.0),
            weights.chain(commitment),
        );
    }
}

/// Dispatch load is the weighted sum of the load points
fn add_dispatch_load_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
) {
    let load_points = &model.coefficients.modes.load_points;
    for hour in model.horizon.hours() {
        let load = variables.mode(OperatingMode::Dispatching, ModeQuantity::Load, hour);
        let weights = load_points
            .iter()
            .enumerate()
            .map(|(point, &x)| (variables.weight(hour, point), -x));
        constraints.add(
            ConstraintFamily::DispatchLoad,
            RowBounds::Equal(0.0),
            [(load, 1.0)].into_iter().chain(weights),
        );
    }
}

/// Startup load follows the trajectory from the hour the startup began
fn add_startup_load_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
) {
    let modes = &model.coefficients.modes;
    for hour in model.horizon.hours() {
        let load = variables.mode(OperatingMode::StartingUp, ModeQuantity::Load, hour);
        let events = startup_events_covering(modes, variables, hour)
            .map(|(event, offset)| (event, -modes.startup_trajectory[offset]));
        constraints.add(
            ConstraintFamily::StartupLoad,
            RowBounds::Equal(0.0),
            [(load, 1.0)].into_iter().chain(events),
        );
    }
}

/// Load in each mode is zero while the unit is off
fn add_mode_load_limit_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
) {
    for hour in model.horizon.hours() {
        let on = variables.commitment(Commitment::On, hour);
        for mode in OperatingMode::active() {
            constraints.add(
                ConstraintFamily::OffModeLoad,
                RowBounds::AtMost(0.0),
                [
                    (variables.mode(mode, ModeQuantity::Load, hour), 1.0),
                    (on, -MAX_LOAD),
                ],
            );
        }
    }
}

/// `Q = a · load + b · (y − z)` while dispatching
fn add_dispatch_response_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
) {
    let regression = &model.coefficients.regression;
    for hour in model.horizon.hours() {
        let load = variables.mode(OperatingMode::Dispatching, ModeQuantity::Load, hour);
        let on = variables.commitment(Commitment::On, hour);
        let starting_up = variables.commitment(Commitment::StartingUp, hour);
        for quantity in ModeQuantity::iter() {
            let Some(response) = quantity.response() else {
                continue;
            };
            let coeffs = regression.get(response);
            constraints.add(
                ConstraintFamily::DispatchResponse,
                RowBounds::Equal(0.0),
                [
                    (
                        variables.mode(OperatingMode::Dispatching, quantity, hour),
                        1.0,
                    ),
                    (load, -coeffs.a),
                    (on, -coeffs.b),
                    (starting_up, coeffs.b),
                ],
            );
        }
    }
}

/// Fuel, emissions, steam and turbine stage power during startup are accounted for in the
/// startup cost, not hour by hour
fn add_startup_response_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
) {
    for hour in model.horizon.hours() {
        for quantity in ModeQuantity::iter().filter(|q| q.response().is_some()) {
            constraints.add(
                ConstraintFamily::StartupResponse,
                RowBounds::Equal(0.0),
                [(
                    variables.mode(OperatingMode::StartingUp, quantity, hour),
                    1.0,
                )],
            );
        }
    }
}

fn add_mode_aggregation_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
) {
    for hour in model.horizon.hours() {
        for quantity in ModeQuantity::iter() {
            let parts = OperatingMode::active()
                .into_iter()
                .map(|mode| (variables.mode(mode, quantity, hour), -1.0));
            constraints.add(
                ConstraintFamily::ModeAggregation,
                RowBounds::Equal(0.0),
                [(variables.hourly(quantity.aggregate(), hour), 1.0)]
                    .into_iter()
                    .chain(parts),
            );
        }
    }
}

/// `z0[i] ≥ y[i] − y[i−1]`
fn add_startup_transition_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
) {
    for hour in model.horizon.operating_hours() {
        constraints.add(
            ConstraintFamily::StartupTransition,
            RowBounds::AtLeast(0.0),
            [
                (variables.commitment(Commitment::StartupEvent, hour), 1.0),
                (variables.commitment(Commitment::On, hour), -1.0),
                (variables.commitment(Commitment::On, hour - 1), 1.0),
            ],
        );
    }
}

/// The unit is on, and flagged as starting up, for the whole of each startup window
fn add_startup_window_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    modes: &ModeCoefficients,
    variables: &ScenarioVariables,
) {
    for hour in model.horizon.hours() {
        let events: Vec<_> = startup_events_covering(modes, variables, hour)
            .map(|(event, _)| (event, -1.0))
            .collect();
        constraints.add(
            ConstraintFamily::StartupMinimumOn,
            RowBounds::AtLeast(0.0),
            [(variables.commitment(Commitment::On, hour), 1.0)]
                .into_iter()
                .chain(events.iter().copied()),
        );
        constraints.add(
            ConstraintFamily::StartupWindow,
            RowBounds::Equal(0.0),
            [(variables.commitment(Commitment::StartingUp, hour), 1.0)]
                .into_iter()
                .chain(events),
        );
    }
}

fn add_startup_limit_constraint(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
    cap: u32,
) {
    constraints.add(
        ConstraintFamily::StartupLimit,
        RowBounds::AtMost(f64::from(cap)),
        model
            .horizon
            .hours()
            .map(|hour| (variables.commitment(Commitment::StartupEvent, hour), 1.0)),
    );
}
