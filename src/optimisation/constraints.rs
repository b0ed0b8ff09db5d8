//! Code for adding the constraints of one scenario to the problem.
use super::problem::ConstraintSet;
use super::variables::{FirstStageVariables, ScenarioVariables};
use crate::model::Model;

mod dac;
mod modes;
mod plant;

/// Build every constraint for one scenario.
///
/// Constraints are added family by family, so the row order is fixed for a given model.
///
/// # Arguments
///
/// * `model` - The model
/// * `first_stage` - Sizing variables shared between scenarios
/// * `variables` - The scenario's own variables
pub fn add_scenario_constraints(
    model: &Model,
    first_stage: &FirstStageVariables,
    variables: &ScenarioVariables,
) -> ConstraintSet {
    let mut constraints = ConstraintSet::for_scenario(variables.scenario);
    dac::add_dac_constraints(&mut constraints, model, first_stage, variables);
    modes::add_mode_constraints(&mut constraints, model, variables);
    plant::add_plant_constraints(&mut constraints, model, variables);

    constraints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{OperatingPoint, model, operating_point};
    use crate::optimisation::problem::{ConstraintFamily, Problem};
    use crate::optimisation::variables::{Commitment, SliceQuantity, SorbentPool, VariableMap};
    use crate::time::HourSlice;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    /// Perturb the first scenario of the operating point and return the violated families
    fn violated_families<F>(model: &Model, perturb: F) -> Vec<ConstraintFamily>
    where
        F: FnOnce(&ScenarioVariables, &mut [f64]),
    {
        let OperatingPoint {
            problem,
            variables,
            mut values,
        } = operating_point(model);
        let scenario = variables.iter_scenarios().next().unwrap();
        perturb(scenario, &mut values);

        problem
            .violations(&values, 1e-6)
            .into_iter()
            .inspect(|violation| assert_eq!(violation.scenario, Some(scenario.scenario)))
            .filter_map(|violation| violation.family)
            .collect()
    }

    #[rstest]
    fn every_family_present(model: Model) {
        let mut problem = Problem::default();
        let map = VariableMap::declare(
            &mut problem,
            &model.horizon,
            model.coefficients.modes.load_points.len(),
            model.iter_scenarios(),
        );
        for scenario in map.iter_scenarios() {
            problem.extend_constraints(add_scenario_constraints(
                &model,
                &map.first_stage,
                scenario,
            ));
        }

        let counts = problem.family_counts();
        for family in ConstraintFamily::iter() {
            assert!(counts.contains_key(&family), "No constraints for {family}");
        }
    }

    #[rstest]
    fn feasible_point_satisfies_all(model: Model) {
        let OperatingPoint {
            problem,
            variables,
            values,
        } = operating_point(&model);
        let violations = problem.violations(&values, 1e-6);
        assert!(violations.is_empty(), "{violations:?}");

        // The point exercises a startup in every scenario
        for scenario in variables.iter_scenarios() {
            let startup = scenario.commitment(Commitment::StartupEvent, 1);
            assert_eq!(values[startup.index()], 1.0);
        }
    }

    #[rstest]
    fn shutdown_during_startup_rejected(model: Model) {
        let families = violated_families(&model, |variables, values| {
            values[variables.commitment(Commitment::On, 5).index()] = 0.0;
        });
        assert!(
            families.contains(&ConstraintFamily::StartupMinimumOn),
            "{families:?}"
        );
    }

    #[rstest]
    fn leaving_startup_early_rejected(model: Model) {
        let families = violated_families(&model, |variables, values| {
            values[variables.commitment(Commitment::StartingUp, 5).index()] = 0.0;
        });
        assert!(
            families.contains(&ConstraintFamily::StartupWindow),
            "{families:?}"
        );
    }

    #[rstest]
    fn too_many_startups_rejected(model: Model) {
        let cap = model.parameters.start_up_cap().unwrap();
        assert_eq!(cap, 5);
        let families = violated_families(&model, |variables, values| {
            // The operating point already starts up in hour 1
            for hour in [3, 5, 7, 9, 11] {
                values[variables.commitment(Commitment::StartupEvent, hour).index()] = 1.0;
            }
        });
        assert!(
            families.contains(&ConstraintFamily::StartupLimit),
            "{families:?}"
        );
    }

    #[rstest]
    fn turning_on_without_startup_rejected(model: Model) {
        let families = violated_families(&model, |variables, values| {
            values[variables.commitment(Commitment::On, 15).index()] = 1.0;
        });
        assert!(
            families.contains(&ConstraintFamily::StartupTransition),
            "{families:?}"
        );
    }

    #[rstest]
    fn adsorbing_more_than_fresh_rejected(model: Model) {
        let families = violated_families(&model, |variables, values| {
            let slice = HourSlice::new(3, 0);
            let fresh = values[variables.pool(SorbentPool::Fresh, slice).index()];
            values[variables.slice(SliceQuantity::Adsorbing, slice).index()] = fresh + 1.0;
        });
        assert!(
            families.contains(&ConstraintFamily::AdsorptionLimit),
            "{families:?}"
        );
    }
}
