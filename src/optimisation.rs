//! The two-stage stochastic optimisation problem.
//!
//! The problem is first assembled in a solver-independent form ([`problem::Problem`]): typed
//! variables, constraint records tagged with their family and scenario, and a linear objective.
//! It is only translated into a HiGHS model by [`solver::solve`].
pub mod problem;
pub mod variables;
pub(crate) mod constraints;
pub mod objective;
pub mod stochastic;
pub mod solver;
pub mod solution;
