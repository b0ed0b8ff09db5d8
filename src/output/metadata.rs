//! Write run, program and solve metadata to a TOML file.
//!
//! The metadata is written as `metadata.toml` in the output directory when a run starts and is
//! rewritten with details of the solve once the model has been solved.
use crate::optimisation::solution::Solution;
use anyhow::Result;
use chrono::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// The output filename used for metadata.
const METADATA_FILE_NAME: &str = "metadata.toml";

/// Top-level metadata structure serialized to TOML.
#[derive(Serialize)]
struct Metadata<'a> {
    run: RunMetadata<'a>,
    program: ProgramMetadata<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    solve: Option<SolveMetadata>,
}

/// Information about the model run
#[derive(Serialize)]
struct RunMetadata<'a> {
    /// Path to the model which was run
    model_path: &'a Path,
    /// The date and time at which the metadata was written
    datetime: String,
}

impl<'a> RunMetadata<'a> {
    fn new(model_path: &'a Path) -> Self {
        let dt = Local::now();
        Self {
            model_path,
            datetime: dt.to_rfc2822(),
        }
    }
}

#[derive(Serialize)]
struct ProgramMetadata<'a> {
    /// The program name
    name: &'a str,
    /// The program version as specified in Cargo.toml
    version: &'a str,
    /// Whether it is a debug build
    is_debug: bool,
}

impl Default for ProgramMetadata<'_> {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            is_debug: cfg!(debug_assertions),
        }
    }
}

/// Summary of the solve
#[derive(Serialize)]
struct SolveMetadata {
    status: String,
    solve_time_seconds: f64,
    objective_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    bound: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    absolute_gap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    relative_gap: Option<f64>,
    expected_npv: f64,
    sorbent_mass: f64,
    blower_capacity: f64,
}

impl SolveMetadata {
    fn new(solution: &Solution) -> Self {
        let gap = solution.gap();
        Self {
            status: solution.status(),
            solve_time_seconds: solution.solve_time().as_secs_f64(),
            objective_value: solution.objective_value().value(),
            bound: solution.bound().map(|bound| bound.value()),
            absolute_gap: gap.map(|gap| gap.absolute),
            relative_gap: gap.and_then(|gap| gap.relative),
            expected_npv: solution.expected_npv().value(),
            sorbent_mass: solution.sorbent_mass(),
            blower_capacity: solution.blower_capacity(),
        }
    }
}

/// Write metadata to `metadata.toml` in the given output directory.
///
/// # Arguments
///
/// * `output_path` - Directory where `metadata.toml` will be written.
/// * `model_path` - Path to the model that was executed (recorded in the metadata).
/// * `solution` - The solution, if the model has been solved
pub fn write_metadata(
    output_path: &Path,
    model_path: &Path,
    solution: Option<&Solution>,
) -> Result<()> {
    let metadata = Metadata {
        run: RunMetadata::new(model_path),
        program: ProgramMetadata::default(),
        solve: solution.map(SolveMetadata::new),
    };
    let file_path = output_path.join(METADATA_FILE_NAME);
    fs::write(&file_path, toml::to_string(&metadata)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_metadata_without_solution() {
        let dir = tempdir().unwrap();
        write_metadata(dir.path(), Path::new("models/two_day"), None).unwrap();

        let contents = fs::read_to_string(dir.path().join(METADATA_FILE_NAME)).unwrap();
        assert!(contents.contains("[run]"));
        assert!(contents.contains("models/two_day"));
        assert!(contents.contains(&format!("name = \"{}\"", env!("CARGO_PKG_NAME"))));
        assert!(!contents.contains("[solve]"));
    }
}
