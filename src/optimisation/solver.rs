//! The HiGHS solver backend.
use super::problem::{Problem, RowBounds, VariableDefinition};
use crate::model::ModelParameters;
use crate::units::Money;
use highs::{HighsModelStatus, HighsStatus, RowProblem, Sense};
use log::{info, warn};
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};

/// Smallest magnitude of the incumbent for which a relative gap is reported
const GAP_ZERO_THRESHOLD: f64 = 1e-9;

/// Defines the possible errors that can occur when running the solver
#[derive(Debug, Clone)]
pub enum ModelError {
    /// The model definition is incoherent.
    ///
    /// Users should not be able to trigger this error.
    Incoherent(HighsStatus),
    /// An optimal solution could not be found
    NonOptimal(HighsModelStatus),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Incoherent(status) => write!(f, "Incoherent model: {status:?}"),
            ModelError::NonOptimal(status) => {
                write!(f, "Could not find optimal result: {status:?}")
            }
        }
    }
}

impl Error for ModelError {}

/// Solver settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Wall-clock limit on the solve (seconds)
    pub time_limit: f64,
    /// Relative MIP gap at which to stop
    pub mip_gap: f64,
    /// Whether to solve the LP relaxation to obtain an objective bound
    pub relaxation_bound: bool,
}

impl From<&ModelParameters> for SolverConfig {
    fn from(parameters: &ModelParameters) -> Self {
        Self {
            time_limit: parameters.time_limit,
            mip_gap: parameters.mip_gap,
            relaxation_bound: parameters.relaxation_bound,
        }
    }
}

/// The gap between the best solution found and the bound on the objective
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimalityGap {
    /// Bound minus incumbent
    pub absolute: f64,
    /// Absolute gap relative to the incumbent. Undefined when the incumbent is zero.
    pub relative: Option<f64>,
}

impl OptimalityGap {
    /// Calculate the gap for a maximisation problem
    ///
    /// # Arguments
    ///
    /// * `lower` - Objective value of the best solution found
    /// * `upper` - Bound on the objective value
    pub fn new(lower: f64, upper: f64) -> Self {
        let absolute = upper - lower;
        let relative = (lower.abs() > GAP_ZERO_THRESHOLD).then(|| absolute / lower.abs());

        Self { absolute, relative }
    }
}

/// The result of a successful solve
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// Value of each variable, in column order
    pub values: Vec<f64>,
    /// Objective value, including the constant term
    pub objective_value: Money,
    /// Upper bound on the objective value, including the constant term
    pub bound: Option<Money>,
    /// Termination status
    pub status: HighsModelStatus,
    /// Wall-clock time taken by the solver
    pub solve_time: Duration,
}

impl SolveOutcome {
    /// The gap between the solution and the bound, if a bound is available
    pub fn gap(&self) -> Option<OptimalityGap> {
        self.bound
            .map(|bound| OptimalityGap::new(self.objective_value.value(), bound.value()))
    }
}

/// Translate the problem definition into a HiGHS problem
///
/// # Arguments
///
/// * `problem` - The problem definition
/// * `relax` - Whether to relax integer variables to continuous ones
fn to_highs(problem: &Problem, relax: bool) -> RowProblem {
    let mut highs_problem = RowProblem::default();
    let coefficients = problem.objective_coefficients();
    let cols: Vec<highs::Col> = problem
        .iter_variables()
        .zip(coefficients)
        .map(|(definition, coeff)| add_column(&mut highs_problem, definition, coeff, relax))
        .collect();

    for constraint in problem.iter_constraints() {
        let terms = constraint
            .terms
            .iter()
            .map(|(var, coeff)| (cols[var.index()], *coeff));
        match constraint.bounds {
            RowBounds::Equal(rhs) => highs_problem.add_row(rhs..=rhs, terms),
            RowBounds::AtLeast(rhs) => highs_problem.add_row(rhs.., terms),
            RowBounds::AtMost(rhs) => highs_problem.add_row(..=rhs, terms),
        }
    }

    highs_problem
}

fn add_column(
    problem: &mut RowProblem,
    definition: &VariableDefinition,
    coeff: f64,
    relax: bool,
) -> highs::Col {
    let bounds = definition.lower..=definition.upper;
    if definition.is_integer() && !relax {
        problem.add_integer_column(coeff, bounds)
    } else {
        problem.add_column(coeff, bounds)
    }
}

/// Try to solve the model, returning an error if the model is incoherent or result is non-optimal
fn solve_optimal(model: highs::Model) -> Result<highs::SolvedModel, ModelError> {
    let solved = model.try_solve().map_err(ModelError::Incoherent)?;

    match solved.status() {
        HighsModelStatus::Optimal => Ok(solved),
        status => Err(ModelError::NonOptimal(status)),
    }
}

/// Solve the LP relaxation for a bound on the objective
fn relaxation_bound(problem: &Problem, config: &SolverConfig) -> Option<Money> {
    let mut model = to_highs(problem, true).optimise(Sense::Maximise);
    model.set_option("output_flag", false);
    model.set_option("time_limit", config.time_limit);
    match solve_optimal(model) {
        Ok(solved) => Some(Money(
            solved.objective_value() + problem.objective().constant(),
        )),
        Err(err) => {
            warn!("Could not obtain objective bound from LP relaxation: {err}");
            None
        }
    }
}

/// Solve a problem.
///
/// The objective is maximised. A single attempt is made; any status other than optimal is
/// returned as an error.
pub fn solve(problem: &Problem, config: &SolverConfig) -> Result<SolveOutcome, ModelError> {
    let bound = if config.relaxation_bound {
        relaxation_bound(problem, config)
    } else {
        None
    };

    let mut model = to_highs(problem, false).optimise(Sense::Maximise);
    model.set_option("output_flag", false);
    model.set_option("time_limit", config.time_limit);
    model.set_option("mip_rel_gap", config.mip_gap);

    info!(
        "Solving model (time limit {}s, MIP gap {})",
        config.time_limit, config.mip_gap
    );
    let start = Instant::now();
    let solved = solve_optimal(model)?;
    let solve_time = start.elapsed();
    let objective_value = Money(solved.objective_value() + problem.objective().constant());
    info!(
        "Solved in {:.2}s with objective value {objective_value}",
        solve_time.as_secs_f64()
    );

    Ok(SolveOutcome {
        values: solved.get_solution().columns().to_vec(),
        objective_value,
        bound,
        status: solved.status(),
        solve_time,
    })
}
