//! Sizing and dispatch of direct air capture retrofitted to a natural gas combined-cycle plant.
//!
//! The plant already has post-combustion capture. The planner chooses how much DAC sorbent and
//! blower capacity to install and, for each of a set of price scenarios, how to run the plant
//! hour by hour. Both are decided together in a single two-stage stochastic MILP which maximises
//! the expected discounted cash flow of the retrofit.
pub mod cli;
pub mod coefficients;
pub mod finance;
pub mod input;
pub mod log;
pub mod model;
pub mod optimisation;
pub mod output;
pub mod planning;
pub mod scenario;
pub mod settings;
pub mod time;
pub mod units;

#[cfg(test)]
mod fixture;
