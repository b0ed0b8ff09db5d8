//! A solver-independent definition of the optimisation problem.
//!
//! Constraint builders append tagged records to a [`ConstraintSet`]; the solver backend then
//! translates the whole [`Problem`] in one go. Keeping the definition separate from the solver
//! lets scenario blocks be built on different threads and lets the same problem be checked
//! against a candidate point without a solver.
use crate::scenario::ScenarioID;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use strum::{Display, EnumIter};

/// A decision variable in the optimisation
///
/// Note that this type does **not** include the value of the variable; it just refers to a
/// particular column of the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(usize);

impl Variable {
    /// The column index of the variable
    pub fn index(self) -> usize {
        self.0
    }
}

/// The domain of a decision variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableDomain {
    /// A non-negative continuous variable
    Continuous,
    /// A 0-1 variable
    Binary,
    /// A non-negative weight in a convex combination
    ConvexWeight,
}

/// Which stage of the stochastic programme a variable belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Decided before the uncertainty is resolved and shared by all scenarios
    First,
    /// Decided separately for each scenario
    Second(ScenarioID),
}

/// Declaration of a decision variable
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDefinition {
    /// A readable name, used in diagnostics
    pub label: String,
    /// The variable's domain
    pub domain: VariableDomain,
    /// Lower bound
    pub lower: f64,
    /// Upper bound (may be infinite)
    pub upper: f64,
    /// The stage of the variable
    pub stage: Stage,
}

impl VariableDefinition {
    /// A variable with the default bounds for its domain
    pub fn new(label: String, domain: VariableDomain, stage: Stage) -> Self {
        let upper = match domain {
            VariableDomain::Binary => 1.0,
            VariableDomain::Continuous | VariableDomain::ConvexWeight => f64::INFINITY,
        };

        Self {
            label,
            domain,
            lower: 0.0,
            upper,
            stage,
        }
    }

    /// Whether the variable must take an integer value
    pub fn is_integer(&self) -> bool {
        self.domain == VariableDomain::Binary
    }
}

/// The bound applied to the linear expression of a constraint
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowBounds {
    /// Expression equals the value
    Equal(f64),
    /// Expression is at least the value
    AtLeast(f64),
    /// Expression is at most the value
    AtMost(f64),
}

impl RowBounds {
    /// How far a value of the expression lies outside the bound (zero if satisfied)
    pub fn violation(self, value: f64) -> f64 {
        match self {
            Self::Equal(rhs) => (value - rhs).abs(),
            Self::AtLeast(rhs) => (rhs - value).max(0.0),
            Self::AtMost(rhs) => (value - rhs).max(0.0),
        }
    }
}

/// The families of constraints in the model, used to tag each constraint record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConstraintFamily {
    /// Sorbent adsorbing in one slice is in its second adsorption slice in the next
    SorbentAdsorptionShift,
    /// Fresh sorbent balance across a slice
    SorbentFreshBalance,
    /// Saturated sorbent balance across a slice
    SorbentSaturatedBalance,
    /// The closing boundary of an hour is the opening boundary of the next
    SorbentContinuity,
    /// Sorbent inventory at the start of the horizon
    SorbentInitial,
    /// Sorbent inventory at the end of the horizon
    SorbentTerminal,
    /// Adsorbing sorbent is drawn from fresh sorbent
    AdsorptionLimit,
    /// Regenerating sorbent is drawn from saturated sorbent
    RegenerationLimit,
    /// CO2 released by regenerating sorbent
    DacCapture,
    /// Steam used to regenerate sorbent
    DacSteam,
    /// Power used by adsorbing sorbent
    DacPower,
    /// Air contacted by adsorbing sorbent
    AirProcessed,
    /// Installed blower capacity covers the air rate in every slice
    BlowerCapacity,
    /// Dispatch weights sum to the dispatch indicator
    ConvexCombination,
    /// Load when dispatching is a combination of the load points
    DispatchLoad,
    /// Load when starting up follows the startup trajectory
    StartupLoad,
    /// No load in any mode while off
    OffModeLoad,
    /// Part-load responses when dispatching
    DispatchResponse,
    /// No fuel, emissions or steam attributed to startup mode
    StartupResponse,
    /// Aggregate quantities are the sum over modes
    ModeAggregation,
    /// A startup begins whenever the unit turns on
    StartupTransition,
    /// No startup can begin in the initial hour
    NoInitialStartup,
    /// The unit stays on for the whole startup
    StartupMinimumOn,
    /// The startup indicator covers the startup window
    StartupWindow,
    /// Cap on the number of startups over the horizon
    StartupLimit,
    /// PCC captures a fixed fraction of flue gas CO2
    PccCapture,
    /// Flue gas CO2 not captured by PCC is vented
    PccVent,
    /// PCC reboiler steam
    PccSteam,
    /// PCC power
    PccPower,
    /// CO2 sent to compression
    Compression,
    /// Compression power
    CompressionPower,
    /// Creditable CO2 capture
    NetCapture,
    /// LP turbine power from the steam it receives
    LpPower,
    /// Steam turbine power is the sum of its stages
    SteamTurbinePower,
    /// Total generation
    TotalPower,
    /// Gas turbine power
    GasTurbinePower,
    /// Net power exported
    NetPower,
    /// Allocable steam is split between DAC and the LP turbine
    SteamAllocation,
    /// Total steam available to DAC
    DacSteamTotal,
    /// DAC steam covers regeneration over the hour
    DacSteamSupply,
    /// DAC steam covers regeneration in each slice
    DacSteamRate,
    /// Variable operating and maintenance costs
    VariableCost,
}

/// A linear constraint
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Which family the constraint belongs to
    pub family: ConstraintFamily,
    /// The scenario the constraint belongs to, if any
    pub scenario: Option<ScenarioID>,
    /// Coefficients of the linear expression
    pub terms: Vec<(Variable, f64)>,
    /// Bound on the linear expression
    pub bounds: RowBounds,
}

impl Constraint {
    /// Evaluate the linear expression at a point
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(var, coeff)| coeff * values[var.index()])
            .sum()
    }
}

/// An accumulator for the constraints of one scenario (or the first stage)
#[derive(Debug, Default)]
pub struct ConstraintSet {
    scenario: Option<ScenarioID>,
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    /// Create an empty set for the given scenario
    pub fn for_scenario(scenario: ScenarioID) -> Self {
        Self {
            scenario: Some(scenario),
            constraints: Vec::new(),
        }
    }

    /// Add a constraint
    pub fn add<I>(&mut self, family: ConstraintFamily, bounds: RowBounds, terms: I)
    where
        I: IntoIterator<Item = (Variable, f64)>,
    {
        self.constraints.push(Constraint {
            family,
            scenario: self.scenario,
            terms: terms.into_iter().collect(),
            bounds,
        });
    }

    /// Number of constraints in the set
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Iterate over the constraints
    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }
}

/// A linear expression with a constant term
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(Variable, f64)>,
    constant: f64,
}

impl LinearExpr {
    /// Add `coeff · var` to the expression
    pub fn add_term(&mut self, var: Variable, coeff: f64) {
        self.terms.push((var, coeff));
    }

    /// Add a constant to the expression
    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// Add `scale · other` to the expression
    pub fn add_scaled(&mut self, other: &LinearExpr, scale: f64) {
        self.terms
            .extend(other.terms.iter().map(|(var, coeff)| (*var, coeff * scale)));
        self.constant += other.constant * scale;
    }

    /// A copy of the expression multiplied by `scale`
    pub fn scaled(&self, scale: f64) -> LinearExpr {
        let mut expr = LinearExpr::default();
        expr.add_scaled(self, scale);
        expr
    }

    /// The terms of the expression. A variable may appear more than once.
    pub fn terms(&self) -> &[(Variable, f64)] {
        &self.terms
    }

    /// The constant term
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Evaluate the expression at a point
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|(var, coeff)| coeff * values[var.index()])
                .sum::<f64>()
    }
}

/// A constraint or bound which a point violates
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// The constraint family, or `None` for a variable bound or integrality
    pub family: Option<ConstraintFamily>,
    /// The scenario, if any
    pub scenario: Option<ScenarioID>,
    /// How far outside the bound the point lies
    pub amount: f64,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let family = self
            .family
            .map_or_else(|| "variable bounds".to_string(), |family| family.to_string());
        match self.scenario {
            Some(scenario) => write!(f, "{family} ({scenario}): {:.3e}", self.amount),
            None => write!(f, "{family}: {:.3e}", self.amount),
        }
    }
}

/// The complete optimisation problem.
///
/// The objective is always maximised.
#[derive(Debug, Default)]
pub struct Problem {
    variables: Vec<VariableDefinition>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
}

impl Problem {
    /// Declare a new variable
    pub fn add_variable(&mut self, definition: VariableDefinition) -> Variable {
        self.variables.push(definition);
        Variable(self.variables.len() - 1)
    }

    /// Append a set of constraints
    pub fn extend_constraints(&mut self, set: ConstraintSet) {
        self.constraints.extend(set.constraints);
    }

    /// Set the objective to maximise
    pub fn set_objective(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    /// Number of variables
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Number of constraints
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Number of integer variables
    pub fn num_integer_variables(&self) -> usize {
        self.variables.iter().filter(|v| v.is_integer()).count()
    }

    /// Iterate over variable definitions
    pub fn iter_variables(&self) -> std::slice::Iter<'_, VariableDefinition> {
        self.variables.iter()
    }

    /// Get a variable's definition
    pub fn variable(&self, var: Variable) -> &VariableDefinition {
        &self.variables[var.index()]
    }

    /// Iterate over constraints
    pub fn iter_constraints(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }

    /// The objective expression
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    /// Objective coefficient of each variable, merging repeated terms
    pub fn objective_coefficients(&self) -> Vec<f64> {
        let mut coefficients = vec![0.0; self.variables.len()];
        for (var, coeff) in self.objective.terms() {
            coefficients[var.index()] += coeff;
        }

        coefficients
    }

    /// Number of constraints in each family, in family order
    pub fn family_counts(&self) -> IndexMap<ConstraintFamily, usize> {
        let mut counts = IndexMap::new();
        for constraint in &self.constraints {
            *counts.entry(constraint.family).or_insert(0) += 1;
        }
        counts.sort_keys();

        counts
    }

    /// Find constraints and bounds which the given point violates by more than `tolerance`.
    ///
    /// Integrality is checked for binary variables.
    pub fn violations(&self, values: &[f64], tolerance: f64) -> Vec<Violation> {
        assert_eq!(
            values.len(),
            self.variables.len(),
            "Point has the wrong number of values"
        );

        let bound_violations = self.variables.iter().zip(values).filter_map(|(def, &value)| {
            let mut amount = (def.lower - value).max(value - def.upper).max(0.0);
            if def.is_integer() {
                amount = amount.max((value - value.round()).abs());
            }
            let scenario = match def.stage {
                Stage::First => None,
                Stage::Second(scenario) => Some(scenario),
            };
            (amount > tolerance).then_some(Violation {
                family: None,
                scenario,
                amount,
            })
        });

        let row_violations = self.constraints.iter().filter_map(|constraint| {
            let amount = constraint.bounds.violation(constraint.evaluate(values));
            (amount > tolerance).then_some(Violation {
                family: Some(constraint.family),
                scenario: constraint.scenario,
                amount,
            })
        });

        bound_violations.chain(row_violations).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn continuous(problem: &mut Problem, label: &str) -> Variable {
        problem.add_variable(VariableDefinition::new(
            label.to_string(),
            VariableDomain::Continuous,
            Stage::First,
        ))
    }

    #[rstest]
    #[case(RowBounds::Equal(1.0), 1.0, 0.0)]
    #[case(RowBounds::Equal(1.0), 0.5, 0.5)]
    #[case(RowBounds::AtLeast(1.0), 2.0, 0.0)]
    #[case(RowBounds::AtLeast(1.0), 0.25, 0.75)]
    #[case(RowBounds::AtMost(1.0), 0.0, 0.0)]
    #[case(RowBounds::AtMost(1.0), 3.0, 2.0)]
    fn row_bounds_violation(#[case] bounds: RowBounds, #[case] value: f64, #[case] expected: f64) {
        assert_approx_eq!(f64, bounds.violation(value), expected);
    }

    #[test]
    fn linear_expr_evaluate() {
        let mut problem = Problem::default();
        let x = continuous(&mut problem, "x");
        let y = continuous(&mut problem, "y");

        let mut expr = LinearExpr::default();
        expr.add_term(x, 2.0);
        expr.add_term(y, -1.0);
        expr.add_term(x, 1.0);
        expr.add_constant(5.0);
        assert_approx_eq!(f64, expr.evaluate(&[1.0, 4.0]), 4.0);
        assert_approx_eq!(f64, expr.scaled(2.0).evaluate(&[1.0, 4.0]), 8.0);

        problem.set_objective(expr);
        assert_eq!(problem.objective_coefficients(), [3.0, -1.0]);
    }

    #[test]
    fn violations_found() {
        let mut problem = Problem::default();
        let x = continuous(&mut problem, "x");
        let b = problem.add_variable(VariableDefinition::new(
            "b".to_string(),
            VariableDomain::Binary,
            Stage::Second(ScenarioID(0)),
        ));

        let mut set = ConstraintSet::for_scenario(ScenarioID(0));
        set.add(
            ConstraintFamily::PccCapture,
            RowBounds::Equal(0.0),
            [(x, 1.0), (b, -2.0)],
        );
        problem.extend_constraints(set);

        assert!(problem.violations(&[2.0, 1.0], 1e-9).is_empty());

        let violations = problem.violations(&[1.0, 0.5], 1e-9);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].family, None);
        assert_approx_eq!(f64, violations[0].amount, 0.5);

        let violations = problem.violations(&[-1.0, 0.0], 1e-9);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[1].family, Some(ConstraintFamily::PccCapture));
        assert_eq!(violations[1].scenario, Some(ScenarioID(0)));
    }

    #[test]
    fn family_counts_sorted() {
        let mut problem = Problem::default();
        let x = continuous(&mut problem, "x");
        let mut set = ConstraintSet::default();
        set.add(ConstraintFamily::NetPower, RowBounds::AtLeast(0.0), [(x, 1.0)]);
        set.add(ConstraintFamily::DacCapture, RowBounds::AtLeast(0.0), [(x, 1.0)]);
        set.add(ConstraintFamily::NetPower, RowBounds::AtLeast(0.0), [(x, 1.0)]);
        problem.extend_constraints(set);

        let counts = problem.family_counts();
        assert_eq!(
            counts.into_iter().collect::<Vec<_>>(),
            [(ConstraintFamily::DacCapture, 1), (ConstraintFamily::NetPower, 2)]
        );
        assert_eq!(ConstraintFamily::DacSteamRate.to_string(), "dac_steam_rate");
    }
}
