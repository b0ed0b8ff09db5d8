//! Constraints for the DAC sorbent inventory, its utility demands and the installed equipment.
//!
//! Sorbent moves from fresh to adsorbing for two slices, then to saturated, and back to fresh
//! once regenerated. Fresh, saturated and second-slice adsorbing sorbent are stocks at slice
//! boundaries; sorbent starting adsorption and sorbent being regenerated are drawn from those
//! stocks within a slice.
use crate::model::Model;
use crate::optimisation::problem::{ConstraintFamily, ConstraintSet, RowBounds};
use crate::optimisation::variables::{
    FirstStageVariables, ScenarioVariables, SliceQuantity, SorbentPool,
};
use crate::time::{HourSlice, SLICES_PER_HOUR};
use strum::IntoEnumIterator;

/// Add all DAC constraints for a scenario
pub fn add_dac_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    first_stage: &FirstStageVariables,
    variables: &ScenarioVariables,
) {
    add_adsorption_shift_constraints(constraints, model, variables);
    add_fresh_balance_constraints(constraints, model, variables);
    add_saturated_balance_constraints(constraints, model, variables);
    add_continuity_constraints(constraints, model, variables);
    add_boundary_constraints(
        constraints,
        ConstraintFamily::SorbentInitial,
        model.horizon.initial_boundary(),
        first_stage,
        variables,
    );
    add_boundary_constraints(
        constraints,
        ConstraintFamily::SorbentTerminal,
        model.horizon.terminal_boundary(),
        first_stage,
        variables,
    );
    add_adsorption_limit_constraints(constraints, model, variables);
    add_regeneration_limit_constraints(constraints, model, variables);
    add_capture_constraints(constraints, model, variables);
    add_steam_constraints(constraints, model, variables);
    add_power_constraints(constraints, model, variables);
    add_air_constraints(constraints, model, variables);
    add_blower_capacity_constraints(constraints, model, first_stage, variables);
}

/// `A1[i, j+1] = A0[i, j]`
fn add_adsorption_shift_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
) {
    for slice in model.horizon.iter_slices() {
        constraints.add(
            ConstraintFamily::SorbentAdsorptionShift,
            RowBounds::Equal(0.0),
            [
                (variables.pool(SorbentPool::AdsorbingPrevious, slice.next()), 1.0),
                (variables.slice(SliceQuantity::Adsorbing, slice), -1.0),
            ],
        );
    }
}

/// `F[i, j+1] = F[i, j] − A0[i, j] + R[i, j]`
fn add_fresh_balance_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
) {
    for slice in model.horizon.iter_slices() {
        constraints.add(
            ConstraintFamily::SorbentFreshBalance,
            RowBounds::Equal(0.0),
            [
                (variables.pool(SorbentPool::Fresh, slice.next()), 1.0),
                (variables.pool(SorbentPool::Fresh, slice), -1.0),
                (variables.slice(SliceQuantity::Adsorbing, slice), 1.0),
                (variables.slice(SliceQuantity::Regenerating, slice), -1.0),
            ],
        );
    }
}

/// `S[i, j+1] = S[i, j] − R[i, j] + A1[i, j]`
fn add_saturated_balance_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
) {
    for slice in model.horizon.iter_slices() {
        constraints.add(
            ConstraintFamily::SorbentSaturatedBalance,
            RowBounds::Equal(0.0),
            [
                (variables.pool(SorbentPool::Saturated, slice.next()), 1.0),
                (variables.pool(SorbentPool::Saturated, slice), -1.0),
                (variables.slice(SliceQuantity::Regenerating, slice), 1.0),
                (variables.pool(SorbentPool::AdsorbingPrevious, slice), -1.0),
            ],
        );
    }
}

/// The closing boundary of hour `i − 1` is the opening boundary of hour `i`
fn add_continuity_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
) {
    for hour in model.horizon.operating_hours() {
        let opening = HourSlice::new(hour, 0);
        let closing = HourSlice::new(hour - 1, SLICES_PER_HOUR);
        for pool in SorbentPool::iter() {
            constraints.add(
                ConstraintFamily::SorbentContinuity,
                RowBounds::Equal(0.0),
                [
                    (variables.pool(pool, opening), 1.0),
                    (variables.pool(pool, closing), -1.0),
                ],
            );
        }
    }
}

/// All sorbent is fresh at the given boundary
fn add_boundary_constraints(
    constraints: &mut ConstraintSet,
    family: ConstraintFamily,
    boundary: HourSlice,
    first_stage: &FirstStageVariables,
    variables: &ScenarioVariables,
) {
    constraints.add(
        family,
        RowBounds::Equal(0.0),
        [
            (variables.pool(SorbentPool::Fresh, boundary), 1.0),
            (first_stage.sorbent_mass, -1.0),
        ],
    );
    for pool in [SorbentPool::Saturated, SorbentPool::AdsorbingPrevious] {
        constraints.add(
            family,
            RowBounds::Equal(0.0),
            [(variables.pool(pool, boundary), 1.0)],
        );
    }
}

/// `A0[i, j] ≤ F[i, j]`
fn add_adsorption_limit_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
) {
    for slice in model.horizon.iter_slices() {
        constraints.add(
            ConstraintFamily::AdsorptionLimit,
            RowBounds::AtLeast(0.0),
            [
                (variables.pool(SorbentPool::Fresh, slice), 1.0),
                (variables.slice(SliceQuantity::Adsorbing, slice), -1.0),
            ],
        );
    }
}

/// `R[i, j] ≤ S[i, j]`
fn add_regeneration_limit_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
) {
    for slice in model.horizon.iter_slices() {
        constraints.add(
            ConstraintFamily::RegenerationLimit,
            RowBounds::AtLeast(0.0),
            [
                (variables.pool(SorbentPool::Saturated, slice), 1.0),
                (variables.slice(SliceQuantity::Regenerating, slice), -1.0),
            ],
        );
    }
}

fn add_capture_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
) {
    let capacity = model.coefficients.dac.sorbent_co2_capacity;
    for slice in model.horizon.iter_slices() {
        constraints.add(
            ConstraintFamily::DacCapture,
            RowBounds::Equal(0.0),
            [
                (variables.slice(SliceQuantity::DacCo2, slice), 1.0),
                (variables.slice(SliceQuantity::Regenerating, slice), -capacity),
            ],
        );
    }
}

fn add_steam_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
) {
    let dac = &model.coefficients.dac;
    let coeff = dac.steam_per_co2 * dac.sorbent_co2_capacity;
    for slice in model.horizon.iter_slices() {
        constraints.add(
            ConstraintFamily::DacSteam,
            RowBounds::Equal(0.0),
            [
                (variables.slice(SliceQuantity::DacSteam, slice), 1.0),
                (variables.slice(SliceQuantity::Regenerating, slice), -coeff),
            ],
        );
    }
}

/// Power is drawn by both adsorbing cohorts
fn add_power_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
) {
    let dac = &model.coefficients.dac;
    let coeff = 0.5 * dac.power_per_co2 * dac.sorbent_co2_capacity;
    for slice in model.horizon.iter_slices() {
        constraints.add(
            ConstraintFamily::DacPower,
            RowBounds::Equal(0.0),
            [
                (variables.slice(SliceQuantity::DacPower, slice), 1.0),
                (variables.slice(SliceQuantity::Adsorbing, slice), -coeff),
                (variables.pool(SorbentPool::AdsorbingPrevious, slice), -coeff),
            ],
        );
    }
}

fn add_air_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
) {
    let dac = &model.coefficients.dac;
    let coeff = 0.5 * dac.sorbent_co2_capacity * dac.air_per_co2;
    for slice in model.horizon.iter_slices() {
        constraints.add(
            ConstraintFamily::AirProcessed,
            RowBounds::AtLeast(0.0),
            [
                (variables.slice(SliceQuantity::AirProcessed, slice), 1.0),
                (variables.slice(SliceQuantity::Adsorbing, slice), -coeff),
                (variables.pool(SorbentPool::AdsorbingPrevious, slice), -coeff),
            ],
        );
    }
}

/// Blower capacity covers the air rate of every slice in every scenario
fn add_blower_capacity_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    first_stage: &FirstStageVariables,
    variables: &ScenarioVariables,
) {
    let rate = 1.0 / model.coefficients.dac.slice_seconds;
    for slice in model.horizon.iter_slices() {
        constraints.add(
            ConstraintFamily::BlowerCapacity,
            RowBounds::AtLeast(0.0),
            [
                (first_stage.blower_capacity, 1.0),
                (variables.slice(SliceQuantity::AirProcessed, slice), -rate),
            ],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::model;
    use crate::optimisation::problem::Problem;
    use crate::optimisation::variables::VariableMap;
    use rstest::rstest;

    #[rstest]
    fn row_counts(model: Model) {
        let mut problem = Problem::default();
        let map = VariableMap::declare(&mut problem, &model.horizon, 2, model.iter_scenarios());
        let mut constraints = ConstraintSet::default();
        let variables = map.iter_scenarios().next().unwrap();
        add_dac_constraints(&mut constraints, &model, &map.first_stage, variables);
        problem.extend_constraints(constraints);

        let n_slices = model.horizon.iter_slices().count();
        let counts = problem.family_counts();
        assert_eq!(counts[&ConstraintFamily::SorbentFreshBalance], n_slices);
        assert_eq!(counts[&ConstraintFamily::BlowerCapacity], n_slices);
        assert_eq!(
            counts[&ConstraintFamily::SorbentContinuity],
            3 * model.horizon.n_hour()
        );
        assert_eq!(counts[&ConstraintFamily::SorbentInitial], 3);
        assert_eq!(counts[&ConstraintFamily::SorbentTerminal], 3);
    }
}
