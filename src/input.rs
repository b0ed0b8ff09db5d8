//! Common routines for handling input data.
use crate::coefficients::Coefficients;
use crate::model::{Model, ModelParameters};
use crate::scenario::generate_scenarios;
use crate::time::Horizon;
use anyhow::{Context, Result, bail};
use itertools::Itertools;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

mod price_signal;
use price_signal::read_price_signal;
mod regression;
use regression::read_regression_coefficients;

const COEFFICIENTS_FILE_NAME: &str = "coefficients.toml";

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<'a, T: DeserializeOwned + 'a>(
    file_path: &'a Path,
) -> Result<impl Iterator<Item = T> + 'a> {
    let vec = read_csv_internal(file_path)?;
    if vec.is_empty() {
        bail!("CSV file {} cannot be empty", file_path.display());
    }

    Ok(vec.into_iter())
}

fn read_csv_internal<'a, T: DeserializeOwned + 'a>(file_path: &'a Path) -> Result<Vec<T>> {
    let vec = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?
        .into_deserialize()
        .process_results(|iter| iter.collect_vec())
        .with_context(|| input_err_msg(file_path))?;

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Read the coefficient store for a model.
///
/// Starts from the built-in defaults, applies `coefficients.toml` if present and then the
/// regression table if present.
fn read_coefficients(model_dir: &Path) -> Result<Coefficients> {
    let file_path = model_dir.join(COEFFICIENTS_FILE_NAME);
    let mut coefficients = if file_path.is_file() {
        read_toml(&file_path)?
    } else {
        Coefficients::default()
    };

    if let Some(regression) = read_regression_coefficients(model_dir, &coefficients.regression)? {
        coefficients.regression = regression;
    }

    coefficients
        .validate()
        .context("Invalid plant coefficients")?;

    Ok(coefficients)
}

/// Read a model from the specified directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The static model data ([`Model`]) or an error.
pub fn load_model<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
    let model_dir = model_dir.as_ref();
    let parameters = ModelParameters::from_path(model_dir)?;
    let coefficients = read_coefficients(model_dir)?;
    let horizon = Horizon::from_days(parameters.n_day);
    let series = read_price_signal(model_dir, &parameters.price_signal)?;
    let scenarios = generate_scenarios(&parameters, &coefficients.modes, &horizon, &series)
        .context("Failed to generate scenarios")?;

    Ok(Model {
        model_path: model_dir.to_path_buf(),
        parameters,
        coefficients,
        horizon,
        scenarios,
    })
}
