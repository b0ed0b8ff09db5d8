//! The two-stage stochastic model: shared sizing decisions and one operating block per scenario.
use super::constraints::add_scenario_constraints;
use super::objective::{CapitalTerms, MarginTerms, first_stage_objective, scenario_objective};
use super::problem::{ConstraintSet, LinearExpr, Problem, Variable};
use super::variables::{ScenarioVariables, VariableMap};
use crate::model::Model;
use crate::scenario::ScenarioID;
use log::{debug, info};
use rayon::prelude::*;

/// The blocks built independently for each scenario
struct ScenarioBlock {
    constraints: ConstraintSet,
    margin: MarginTerms,
    objective: LinearExpr,
}

/// A fully-built stochastic model, ready to be handed to a solver
pub struct StochasticModel {
    problem: Problem,
    variables: VariableMap,
    capital: CapitalTerms,
    first_stage_objective: LinearExpr,
    margins: Vec<MarginTerms>,
    scenario_objectives: Vec<LinearExpr>,
}

impl StochasticModel {
    /// Build the stochastic model.
    ///
    /// Variables are declared first, in scenario order. The constraint block and objective
    /// contribution of each scenario are then built in parallel and merged in scenario order, so
    /// the resulting problem does not depend on how work was scheduled.
    pub fn build(model: &Model) -> Self {
        let mut problem = Problem::default();
        let variables = VariableMap::declare(
            &mut problem,
            &model.horizon,
            model.coefficients.modes.load_points.len(),
            model.iter_scenarios(),
        );
        let capital = CapitalTerms::new(model, &variables.first_stage);
        let first_stage_objective = first_stage_objective(model, &capital);

        let blocks: Vec<ScenarioBlock> = model
            .scenarios
            .as_slice()
            .par_iter()
            .map(|scenario| {
                let scenario_variables = variables.scenario(scenario.id);
                let constraints =
                    add_scenario_constraints(model, &variables.first_stage, scenario_variables);
                let margin = MarginTerms::new(model, scenario, scenario_variables);
                let objective = scenario_objective(model, scenario, &margin);
                debug!(
                    "Built block for scenario {} ({}) with {} constraints",
                    scenario.id,
                    scenario.label(),
                    constraints.len()
                );

                ScenarioBlock {
                    constraints,
                    margin,
                    objective,
                }
            })
            .collect();

        let mut objective = first_stage_objective.clone();
        let mut margins = Vec::with_capacity(blocks.len());
        let mut scenario_objectives = Vec::with_capacity(blocks.len());
        for block in blocks {
            problem.extend_constraints(block.constraints);
            objective.add_scaled(&block.objective, 1.0);
            margins.push(block.margin);
            scenario_objectives.push(block.objective);
        }
        problem.set_objective(objective);

        info!(
            "Built model with {} scenarios: {} variables ({} binary), {} constraints",
            model.scenarios.len(),
            problem.num_variables(),
            problem.num_integer_variables(),
            problem.num_constraints()
        );

        Self {
            problem,
            variables,
            capital,
            first_stage_objective,
            margins,
            scenario_objectives,
        }
    }

    /// The problem definition
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// The map of variables
    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }

    /// The first-stage variables
    pub fn first_stage_variables(&self) -> Vec<Variable> {
        self.variables.first_stage.iter().collect()
    }

    /// The second-stage variables of a scenario
    pub fn scenario_variables(&self, id: ScenarioID) -> &ScenarioVariables {
        self.variables.scenario(id)
    }

    /// Capital and fixed cost terms
    pub fn capital(&self) -> &CapitalTerms {
        &self.capital
    }

    /// The first-stage part of the objective
    pub fn first_stage_objective(&self) -> &LinearExpr {
        &self.first_stage_objective
    }

    /// The margin terms of a scenario
    pub fn margin(&self, id: ScenarioID) -> &MarginTerms {
        &self.margins[id.0]
    }

    /// The objective contribution of a scenario
    pub fn scenario_objective(&self, id: ScenarioID) -> &LinearExpr {
        &self.scenario_objectives[id.0]
    }
}
