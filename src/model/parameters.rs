//! Read and validate model parameters from `model.toml`.
//!
//! This module defines the `ModelParameters` struct and helpers for loading and validating the
//! `model.toml` configuration. Validation happens before any scenario or problem is built, so a
//! bad horizon or price tier is reported without doing any work.
use crate::input::{input_err_msg, read_toml};
use crate::units::{MoneyPerMMBtu, MoneyPerTonne};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

/// Number of weeks in the price-signal year
pub const WEEKS_PER_YEAR: u32 = 52;

macro_rules! define_unit_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            <$type>::new($value)
        }
    };
}

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_unit_param_default!(default_natural_gas_price, MoneyPerMMBtu, 3.83);
define_param_default!(default_week_diff, u32, 1);
define_param_default!(default_limit_start_up, bool, true);
define_param_default!(default_max_start_ups, u32, 5);
define_param_default!(default_time_limit, f64, 3600.0);
define_param_default!(default_mip_gap, f64, 0.01);
define_param_default!(default_relaxation_bound, bool, true);

/// Model parameters as defined in the `model.toml` file.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// Length of each scenario's horizon in days
    pub n_day: u32,
    /// Spacing between consecutive price windows in weeks
    #[serde(default = "default_week_diff")]
    pub week_diff: u32,
    /// Name of the price-signal column in `price_signals.csv`
    pub price_signal: String,
    /// CO2 credit price tiers. Each tier is combined with every price window.
    pub co2_prices: Vec<MoneyPerTonne>,
    /// Natural gas price
    #[serde(default = "default_natural_gas_price")]
    pub natural_gas_price: MoneyPerMMBtu,
    /// Whether to cap the number of startups over the horizon
    #[serde(default = "default_limit_start_up")]
    pub limit_start_up: bool,
    /// The maximum number of startups in each scenario, if capped
    #[serde(default = "default_max_start_ups")]
    pub max_start_ups: u32,
    /// Number of price windows to draw. Defaults to one per `week_diff` weeks of the year.
    #[serde(default)]
    pub window_count: Option<u32>,
    /// Solver wall-clock limit in seconds
    #[serde(default = "default_time_limit")]
    pub time_limit: f64,
    /// Relative MIP gap at which the solver stops
    #[serde(default = "default_mip_gap")]
    pub mip_gap: f64,
    /// Whether to solve the LP relaxation to report an objective bound
    #[serde(default = "default_relaxation_bound")]
    pub relaxation_bound: bool,
}

/// Check that the horizon and window spacing give non-overlapping price windows
fn check_horizon(n_day: u32, week_diff: u32) -> Result<()> {
    ensure!(
        week_diff >= 1,
        "The minimum interval difference should be 1 week. Provided argument: {week_diff} week."
    );
    ensure!(n_day > 0, "n_day cannot be zero");
    ensure!(
        n_day <= week_diff * 7,
        "Provided day number is larger than the interval difference. This would cause overlaps \
        of electricity signals in consecutive scenarios. day number: {n_day}; interval \
        difference: {}.",
        week_diff * 7
    );

    Ok(())
}

/// Check that the `co2_prices` parameter is valid
fn check_co2_prices(prices: &[MoneyPerTonne]) -> Result<()> {
    ensure!(!prices.is_empty(), "`co2_prices` is empty");
    ensure!(
        prices
            .iter()
            .all(|price| price.is_finite() && *price >= MoneyPerTonne(0.0)),
        "co2_prices must be finite numbers greater than or equal to zero"
    );

    Ok(())
}

/// Check that the `natural_gas_price` parameter is valid
fn check_natural_gas_price(value: MoneyPerMMBtu) -> Result<()> {
    ensure!(
        value.is_finite() && value >= MoneyPerMMBtu(0.0),
        "natural_gas_price must be a finite number greater than or equal to zero"
    );

    Ok(())
}

/// Check that the startup cap is usable
fn check_max_start_ups(limit_start_up: bool, value: u32) -> Result<()> {
    ensure!(
        !limit_start_up || value > 0,
        "max_start_ups cannot be zero when limit_start_up is enabled"
    );

    Ok(())
}

/// Check the `time_limit` parameter is valid
fn check_time_limit(value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value > 0.0,
        "time_limit must be a finite number greater than zero"
    );

    Ok(())
}

/// Check the `mip_gap` parameter is valid
fn check_mip_gap(value: f64) -> Result<()> {
    ensure!(
        (0.0..1.0).contains(&value),
        "mip_gap must be between zero (inclusive) and one (exclusive)"
    );

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Number of price windows to draw from the price series
    pub fn window_count(&self) -> u32 {
        self.window_count
            .unwrap_or(WEEKS_PER_YEAR / self.week_diff.max(1))
    }

    /// The startup cap, if enabled
    pub fn start_up_cap(&self) -> Option<u32> {
        self.limit_start_up.then_some(self.max_start_ups)
    }

    /// Override the solver settings, e.g. from command-line arguments
    pub fn override_solver_settings(
        &mut self,
        time_limit: Option<f64>,
        mip_gap: Option<f64>,
    ) -> Result<()> {
        if let Some(time_limit) = time_limit {
            check_time_limit(time_limit)?;
            self.time_limit = time_limit;
        }
        if let Some(mip_gap) = mip_gap {
            check_mip_gap(mip_gap)?;
            self.mip_gap = mip_gap;
        }

        Ok(())
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        // n_day and week_diff
        check_horizon(self.n_day, self.week_diff)?;

        // window_count
        ensure!(self.window_count() > 0, "No price windows to draw from");

        // co2_prices
        check_co2_prices(&self.co2_prices)?;

        // natural_gas_price
        check_natural_gas_price(self.natural_gas_price)?;

        // max_start_ups
        check_max_start_ups(self.limit_start_up, self.max_start_ups)?;

        // time_limit
        check_time_limit(self.time_limit)?;

        // mip_gap
        check_mip_gap(self.mip_gap)?;

        Ok(())
    }
}
