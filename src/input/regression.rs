//! Code for reading the regression coefficients CSV file.
use super::{input_err_msg, read_csv};
use crate::coefficients::{LinearResponse, RegressionCoefficients, ResponseSurface};
use anyhow::{Context, Result, ensure};
use indexmap::IndexSet;
use log::warn;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use strum::IntoEnumIterator;

const REGRESSION_FILE_NAME: &str = "regression_coefficients.csv";

/// Represents a row of the regression coefficients CSV file
#[derive(Deserialize)]
struct RegressionRaw {
    y: String,
    a: f64,
    b: f64,
}

/// Read the part-load response surfaces, if the model supplies them.
///
/// Every response surface must be present. Rows for responses the model does not use are
/// ignored with a warning.
///
/// # Returns
///
/// `None` if the file does not exist.
pub fn read_regression_coefficients(
    model_dir: &Path,
    defaults: &RegressionCoefficients,
) -> Result<Option<RegressionCoefficients>> {
    let file_path = model_dir.join(REGRESSION_FILE_NAME);
    if !file_path.is_file() {
        return Ok(None);
    }

    let iter = read_csv(&file_path)?;
    let regression = read_regression_coefficients_from_iter(iter, defaults)
        .with_context(|| input_err_msg(&file_path))?;

    Ok(Some(regression))
}

fn read_regression_coefficients_from_iter<I>(
    iter: I,
    defaults: &RegressionCoefficients,
) -> Result<RegressionCoefficients>
where
    I: Iterator<Item = RegressionRaw>,
{
    let mut regression = defaults.clone();
    let mut seen = IndexSet::new();
    for raw in iter {
        let Ok(response) = ResponseSurface::from_str(&raw.y) else {
            warn!("Ignoring unused regression response {}", raw.y);
            continue;
        };
        ensure!(
            raw.a.is_finite() && raw.b.is_finite(),
            "Non-finite coefficient for {response}"
        );
        ensure!(
            seen.insert(response),
            "Duplicate entry for regression response {response}"
        );

        regression.set_from_table(response, LinearResponse { a: raw.a, b: raw.b });
    }

    let missing: Vec<_> = ResponseSurface::iter()
        .filter(|response| !seen.contains(response))
        .map(|response| response.to_string())
        .collect();
    ensure!(
        missing.is_empty(),
        "Missing regression responses: {}",
        missing.join(", ")
    );

    Ok(regression)
}
