//! Functionality for running a planning study: build the stochastic model, solve it and write the
//! results.
use crate::model::Model;
use crate::optimisation::problem::{Problem, Violation};
use crate::optimisation::solution::Solution;
use crate::optimisation::solver::{SolverConfig, solve};
use crate::optimisation::stochastic::StochasticModel;
use crate::output::DataWriter;
use anyhow::{Context, Result};
use itertools::Itertools;
use log::{info, warn};
use std::path::Path;

/// Violations of constraints and bounds smaller than this are ignored
const VIOLATION_TOLERANCE: f64 = 1e-5;

/// Log the size of a problem, broken down by constraint family
fn log_problem_size(problem: &Problem) {
    for (family, count) in problem.family_counts() {
        info!("  {family}: {count} constraints");
    }
}

/// Warn about any constraints the solution violates, with the worst violation per family
fn warn_violations(violations: Vec<Violation>) {
    if violations.is_empty() {
        return;
    }

    warn!(
        "Solution violates {} constraints or bounds by more than {VIOLATION_TOLERANCE:e}",
        violations.len()
    );
    let worst = violations
        .into_iter()
        .into_group_map_by(|violation| violation.family)
        .into_iter()
        .sorted_by_key(|(family, _)| *family)
        .filter_map(|(_, group)| {
            group
                .into_iter()
                .max_by(|a, b| a.amount.total_cmp(&b.amount))
        });
    for violation in worst {
        warn!("  worst violation: {violation}");
    }
}

/// Build the stochastic model and report its size without solving it.
///
/// # Arguments:
///
/// * `model` - The model to build
pub fn build(model: &Model) -> StochasticModel {
    let stochastic = StochasticModel::build(model);
    log_problem_size(stochastic.problem());

    stochastic
}

/// Run the planning study.
///
/// # Arguments:
///
/// * `model` - The model to run
/// * `output_path` - The folder to which output files will be written
/// * `debug_model` - Whether to write additional information (e.g. constraint counts) to output
///   files
pub fn run(model: &Model, output_path: &Path, debug_model: bool) -> Result<()> {
    let writer = DataWriter::create(output_path, &model.model_path, debug_model)?;

    info!(
        "Building model for {} scenarios over {} hours",
        model.scenarios.len(),
        model.horizon.n_hour()
    );
    let stochastic = build(model);
    writer.write_constraint_families(stochastic.problem())?;

    let config = SolverConfig::from(&model.parameters);
    let outcome = solve(stochastic.problem(), &config).context("Failed to solve model")?;
    let solution = Solution::new(model, &stochastic, outcome);

    if let Some(gap) = solution.gap() {
        match gap.relative {
            Some(relative) => info!(
                "Objective bound {} (gap {:.3}%)",
                solution.bound().unwrap_or_default(),
                relative * 100.0
            ),
            None => info!("Absolute gap to objective bound: {:.3}", gap.absolute),
        }
    }
    warn_violations(solution.violations(VIOLATION_TOLERANCE));

    info!(
        "Installed {:.3} t sorbent and {:.3} m3/s blower capacity",
        solution.sorbent_mass(),
        solution.blower_capacity()
    );
    info!("Expected NPV: {}", solution.expected_npv());

    writer.write_solution(&solution)?;
    info!("Results written to {}", output_path.display());

    Ok(())
}
