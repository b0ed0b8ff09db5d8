//! End-to-end tests which build and solve the two-day demo model.
use dacplan::input::load_model;
use dacplan::model::Model;
use dacplan::optimisation::solution::Solution;
use dacplan::optimisation::solver::{SolveOutcome, SolverConfig, solve};
use dacplan::optimisation::stochastic::StochasticModel;
use dacplan::optimisation::variables::{Commitment, SorbentPool};
use dacplan::time::{HourSlice, SLICES_PER_HOUR};
use dacplan::units::Money;
use float_cmp::assert_approx_eq;
use highs::HighsModelStatus;
use itertools::iproduct;
use std::sync::LazyLock;
use std::time::Duration;

mod common;
use common::DEMO_MODEL_DIR;

/// Tolerance for checking constraints on solved values
const TOLERANCE: f64 = 1e-5;

/// The demo model, built and solved once for all tests
struct Solved {
    model: Model,
    stochastic: StochasticModel,
    outcome: SolveOutcome,
}

static SOLVED: LazyLock<Solved> = LazyLock::new(|| {
    let model = load_model(DEMO_MODEL_DIR).unwrap();
    let stochastic = StochasticModel::build(&model);
    let config = SolverConfig {
        time_limit: 300.0,
        mip_gap: 1e-6,
        relaxation_bound: true,
    };
    let outcome = solve(stochastic.problem(), &config).unwrap();

    Solved {
        model,
        stochastic,
        outcome,
    }
});

fn solution() -> Solution<'static> {
    let solved = &*SOLVED;
    Solution::new(&solved.model, &solved.stochastic, solved.outcome.clone())
}

#[test]
fn solution_is_feasible() {
    let solution = solution();
    let violations = solution.violations(TOLERANCE);
    assert!(violations.is_empty(), "{violations:?}");
    assert_eq!(solution.model().scenarios.len(), 2);
}

#[test]
fn sorbent_mass_conserved() {
    let solution = solution();
    let model = solution.model();
    let mass = solution.sorbent_mass();
    for scenario in solution.iter_scenarios() {
        for (hour, slice) in iproduct!(model.horizon.hours(), 0..SLICES_PER_HOUR) {
            let slice = HourSlice::new(hour, slice);
            let total = scenario.pool(SorbentPool::Fresh, slice)
                + scenario.pool(SorbentPool::Saturated, slice)
                + scenario.pool(SorbentPool::AdsorbingPrevious, slice);
            assert_approx_eq!(f64, total, mass, epsilon = 1e-4 * mass.max(1.0));
        }
    }
}

#[test]
fn sorbent_cycle_closes() {
    let solution = solution();
    let horizon = &solution.model().horizon;
    let mass = solution.sorbent_mass();
    for scenario in solution.iter_scenarios() {
        for boundary in [horizon.initial_boundary(), horizon.terminal_boundary()] {
            assert_approx_eq!(
                f64,
                scenario.pool(SorbentPool::Fresh, boundary),
                mass,
                epsilon = TOLERANCE * mass.max(1.0)
            );
            assert!(scenario.pool(SorbentPool::Saturated, boundary) < TOLERANCE);
            assert!(scenario.pool(SorbentPool::AdsorbingPrevious, boundary) < TOLERANCE);
        }
    }
}

#[test]
fn startups_hold_unit_on() {
    let solution = solution();
    let model = solution.model();
    let startup_hours = model.coefficients.modes.startup_hours();
    let last_hour = model.horizon.last_hour();
    for scenario in solution.iter_scenarios() {
        for hour in model.horizon.hours() {
            let on = scenario.commitment(Commitment::On, hour);
            assert!(scenario.commitment(Commitment::StartingUp, hour) <= on);

            if scenario.commitment(Commitment::StartupEvent, hour) == 1.0 {
                let end = (hour + startup_hours - 1).min(last_hour);
                for covered in hour..=end {
                    assert_eq!(scenario.commitment(Commitment::On, covered), 1.0);
                    assert_eq!(scenario.commitment(Commitment::StartingUp, covered), 1.0);
                }
            }
        }
    }
}

/// Startup flags fall exactly on the hours where the unit turns on.
///
/// Under a flat price the optimum may stay committed from hour 0 without ever starting up, so the
/// startup window itself is covered by the constraint tests on a hand-built schedule.
#[test]
fn startups_only_on_rising_edges() {
    let solution = solution();
    let model = solution.model();
    for scenario in solution.iter_scenarios() {
        assert_eq!(scenario.commitment(Commitment::StartupEvent, 0), 0.0);
        for hour in model.horizon.operating_hours() {
            let rising = scenario.commitment(Commitment::On, hour) == 1.0
                && scenario.commitment(Commitment::On, hour - 1) == 0.0;
            let startup = scenario.commitment(Commitment::StartupEvent, hour) == 1.0;
            assert_eq!(startup, rising, "{} hour {hour}", scenario.scenario.id);
        }
    }
}

#[test]
fn dispatch_weights_match_commitment() {
    let solution = solution();
    let model = solution.model();
    let n_points = model.coefficients.modes.load_points.len();
    for scenario in solution.iter_scenarios() {
        let variables = SOLVED.stochastic.scenario_variables(scenario.scenario.id);
        for hour in model.horizon.hours() {
            let weights: Vec<f64> = (0..n_points)
                .map(|point| solution.value(variables.weight(hour, point)))
                .collect();
            assert!(weights.iter().all(|&w| w >= -TOLERANCE));
            let expected = scenario.commitment(Commitment::On, hour)
                - scenario.commitment(Commitment::StartingUp, hour);
            assert_approx_eq!(
                f64,
                weights.iter().sum::<f64>(),
                expected,
                epsilon = TOLERANCE
            );
        }
    }
}

#[test]
fn startup_cap_respected() {
    let solution = solution();
    let cap = solution.model().parameters.start_up_cap().unwrap();
    for scenario in solution.iter_scenarios() {
        assert!(scenario.startup_count() <= cap);
    }
}

#[test]
fn capture_increases_with_co2_price() {
    let solution = solution();
    let captured: Vec<_> = solution
        .iter_scenarios()
        .map(|s| (s.scenario.co2_price, s.net_captured_co2()))
        .collect();
    assert!(captured[0].0 < captured[1].0);
    assert!(
        captured[1].1 >= captured[0].1 - 1e-2 * captured[0].1.abs().max(1.0),
        "Captured CO2 fell as the CO2 price rose: {captured:?}"
    );
}

#[test]
fn objective_matches_expected_npv() {
    let solution = solution();
    assert_approx_eq!(
        Money,
        solution.objective_value(),
        solution.expected_npv(),
        epsilon = 1e-6 * solution.objective_value().value().abs().max(1.0)
    );

    let bound = solution.bound().unwrap();
    assert!(bound.value() >= solution.objective_value().value() - 1e-6);
}

/// The cash-flow tables reproduce the objective for any point, not just the optimum
#[test]
fn objective_reconciles_with_cash_flow_at_any_point() {
    let model = load_model(DEMO_MODEL_DIR).unwrap();
    let stochastic = StochasticModel::build(&model);
    let problem = stochastic.problem();
    let values: Vec<f64> = (0..problem.num_variables())
        .map(|i| ((i * 37) % 11) as f64 * 0.5)
        .collect();
    let objective = problem.objective().evaluate(&values);

    let outcome = SolveOutcome {
        values,
        objective_value: Money(objective),
        bound: None,
        status: HighsModelStatus::Optimal,
        solve_time: Duration::ZERO,
    };
    let solution = Solution::new(&model, &stochastic, outcome);
    assert_approx_eq!(
        f64,
        solution.expected_npv().value(),
        objective,
        epsilon = 1e-6 * objective.abs().max(1.0)
    );
}
