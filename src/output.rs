//! The module responsible for writing output data to disk.
use crate::finance::cash_flow::CashFlowRow;
use crate::optimisation::problem::{ConstraintFamily, Problem};
use crate::optimisation::solution::{ScenarioSolution, Solution};
use crate::optimisation::variables::{
    Commitment, HourlyQuantity, OperatingMode, SliceQuantity, SorbentPool,
};
use crate::scenario::ScenarioID;
use crate::time::{HourSlice, SLICES_PER_HOUR};
use crate::units::{Money, MoneyPerMWh, MoneyPerTonne};
use anyhow::{Context, Result, ensure};
use itertools::iproduct;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub mod metadata;
use metadata::write_metadata;

/// The output file name for hourly plant operation
const HOURLY_FILE_NAME: &str = "hourly.csv";

/// The output file name for the DAC sorbent inventory
const DAC_SLICES_FILE_NAME: &str = "dac_slices.csv";

/// The output file name for hourly operating costs
const OPERATING_COSTS_FILE_NAME: &str = "operating_costs.csv";

/// The output file name for the installed equipment
const SIZING_FILE_NAME: &str = "sizing.csv";

/// The output file name for cash-flow tables
const CASH_FLOW_FILE_NAME: &str = "cash_flow.csv";

/// The output file name for the annual profit and cost breakdown
const PROFIT_COST_FILE_NAME: &str = "profit_cost.csv";

/// The output file name for constraint counts (debug only)
const CONSTRAINT_FAMILIES_FILE_NAME: &str = "constraint_families.csv";

/// Get the default output directory for the model
pub fn get_output_dir(model_dir: &Path, results_root: PathBuf) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([results_root, model_name.into()].iter().collect())
}

/// Create a new output directory for the model, optionally overwriting existing data
///
/// # Arguments
///
/// * `output_dir` - The output directory to create/overwrite
/// * `allow_overwrite` - Whether to delete and recreate the folder if it is non-empty
///
/// # Returns
///
/// True if the output dir contained existing data that was deleted, false if not, or an error.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    // If the folder already exists, then delete it
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the hourly output CSV file
#[derive(Serialize, Debug, PartialEq)]
struct HourlyRow {
    scenario: ScenarioID,
    hour: usize,
    electricity_price: Option<MoneyPerMWh>,
    mode: OperatingMode,
    on: f64,
    starting_up: f64,
    startup_event: f64,
    load: f64,
    fuel: f64,
    flue_co2: f64,
    pcc_co2: f64,
    pcc_vent_co2: f64,
    dac_co2: f64,
    compressed_co2: f64,
    net_captured_co2: f64,
    gas_turbine_power: f64,
    steam_turbine_power: f64,
    total_power: f64,
    pcc_power: f64,
    dac_power: f64,
    compression_power: f64,
    auxiliary_power: f64,
    net_power: f64,
    dac_total_steam: f64,
    lp_steam: f64,
}

impl HourlyRow {
    fn new(solution: &ScenarioSolution, hour: usize) -> Self {
        let q = |quantity| solution.hourly(quantity, hour);
        Self {
            scenario: solution.scenario.id,
            hour,
            electricity_price: (hour > 0).then(|| solution.scenario.electricity_price(hour)),
            mode: solution.mode(hour),
            on: solution.commitment(Commitment::On, hour),
            starting_up: solution.commitment(Commitment::StartingUp, hour),
            startup_event: solution.commitment(Commitment::StartupEvent, hour),
            load: q(HourlyQuantity::Load),
            fuel: q(HourlyQuantity::Fuel),
            flue_co2: q(HourlyQuantity::FlueCo2),
            pcc_co2: q(HourlyQuantity::PccCo2),
            pcc_vent_co2: q(HourlyQuantity::PccVentCo2),
            dac_co2: solution.hour_total(SliceQuantity::DacCo2, hour),
            compressed_co2: q(HourlyQuantity::CompressedCo2),
            net_captured_co2: q(HourlyQuantity::NetCapturedCo2),
            gas_turbine_power: q(HourlyQuantity::GasTurbinePower),
            steam_turbine_power: q(HourlyQuantity::SteamTurbinePower),
            total_power: q(HourlyQuantity::TotalPower),
            pcc_power: q(HourlyQuantity::PccPower),
            dac_power: solution.hour_total(SliceQuantity::DacPower, hour),
            compression_power: q(HourlyQuantity::CompressionPower),
            auxiliary_power: q(HourlyQuantity::AuxiliaryPower),
            net_power: q(HourlyQuantity::NetPower),
            dac_total_steam: q(HourlyQuantity::DacTotalSteam),
            lp_steam: q(HourlyQuantity::LpSteam),
        }
    }
}

/// Represents a row in the DAC slices output CSV file.
///
/// Pools are reported at the opening boundary of the slice.
#[derive(Serialize, Debug, PartialEq)]
struct DacSliceRow {
    scenario: ScenarioID,
    hour: usize,
    slice: usize,
    fresh: f64,
    saturated: f64,
    adsorbing_previous: f64,
    adsorbing: f64,
    regenerating: f64,
    dac_co2: f64,
    dac_steam: f64,
    dac_power: f64,
    air_processed: f64,
}

impl DacSliceRow {
    fn new(solution: &ScenarioSolution, slice: HourSlice) -> Self {
        let pool = |pool| solution.pool(pool, slice);
        let q = |quantity| solution.slice(quantity, slice);
        Self {
            scenario: solution.scenario.id,
            hour: slice.hour,
            slice: slice.slice,
            fresh: pool(SorbentPool::Fresh),
            saturated: pool(SorbentPool::Saturated),
            adsorbing_previous: pool(SorbentPool::AdsorbingPrevious),
            adsorbing: q(SliceQuantity::Adsorbing),
            regenerating: q(SliceQuantity::Regenerating),
            dac_co2: q(SliceQuantity::DacCo2),
            dac_steam: q(SliceQuantity::DacSteam),
            dac_power: q(SliceQuantity::DacPower),
            air_processed: q(SliceQuantity::AirProcessed),
        }
    }
}

/// Represents a row in the operating costs output CSV file
#[derive(Serialize, Debug, PartialEq)]
struct OperatingCostRow {
    scenario: ScenarioID,
    hour: usize,
    fuel_cost: Money,
    transport_storage_cost: Money,
    startup_cost: Money,
    ngcc_vom: Money,
    pcc_vom: Money,
    dac_vom: Money,
    pcc_compression_vom: Money,
    dac_compression_vom: Money,
}

impl OperatingCostRow {
    fn new(solution: &ScenarioSolution, hour: usize) -> Self {
        let model = solution.model();
        let money = |quantity| Money(solution.hourly(quantity, hour));
        Self {
            scenario: solution.scenario.id,
            hour,
            fuel_cost: Money(
                solution.hourly(HourlyQuantity::Fuel, hour)
                    * model.parameters.natural_gas_price.value(),
            ),
            transport_storage_cost: Money(
                solution.hourly(HourlyQuantity::CompressedCo2, hour)
                    * model.coefficients.costs.transport_storage.value(),
            ),
            startup_cost: solution.scenario.startup_cost
                * solution.commitment(Commitment::StartupEvent, hour),
            ngcc_vom: money(HourlyQuantity::NgccVom),
            pcc_vom: money(HourlyQuantity::PccVom),
            dac_vom: money(HourlyQuantity::DacVom),
            pcc_compression_vom: money(HourlyQuantity::PccCompressionVom),
            dac_compression_vom: money(HourlyQuantity::DacCompressionVom),
        }
    }
}

/// Represents the row of the sizing output CSV file
#[derive(Serialize, Debug, PartialEq)]
struct SizingRow {
    sorbent_mass: f64,
    blower_capacity: f64,
    capital_cost: Money,
    total_overnight_cost: Money,
    fixed_om: Money,
}

/// Represents a row in the cash-flow output CSV file
#[derive(Serialize, Debug, PartialEq)]
struct CashFlowRecord {
    scenario: ScenarioID,
    year: u32,
    calendar_year: i32,
    capital_outlay: Money,
    working_capital: Money,
    depreciation: Money,
    operating_cost: Money,
    revenue: Money,
    net_earnings: Money,
    cash_flow: Money,
    present_value: Money,
    cumulative_present_value: Money,
}

impl CashFlowRecord {
    fn new(scenario: ScenarioID, row: &CashFlowRow) -> Self {
        Self {
            scenario,
            year: row.year,
            calendar_year: row.calendar_year,
            capital_outlay: row.capital_outlay,
            working_capital: row.working_capital,
            depreciation: row.depreciation,
            operating_cost: row.operating_cost,
            revenue: row.revenue,
            net_earnings: row.net_earnings,
            cash_flow: row.cash_flow,
            present_value: row.present_value,
            cumulative_present_value: row.cumulative_present_value,
        }
    }
}

/// Represents a row in the profit and cost output CSV file
#[derive(Serialize, Debug, PartialEq)]
struct ProfitCostRow {
    scenario: ScenarioID,
    co2_price: MoneyPerTonne,
    window: u32,
    probability: f64,
    power_revenue: Money,
    co2_credit: Money,
    fuel_cost: Money,
    transport_storage_cost: Money,
    startup_cost: Money,
    variable_om: Money,
    fixed_om: Money,
    profit: Money,
    net_captured_co2: f64,
    startups: u32,
    npv: Money,
    irr: Option<f64>,
}

/// Represents a row in the constraint families output CSV file
#[derive(Serialize, Debug, PartialEq)]
struct ConstraintFamilyRow {
    family: ConstraintFamily,
    count: usize,
}

/// Write an iterator of rows to a CSV file
fn write_csv<T, I>(file_path: &Path, rows: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut writer = csv::Writer::from_path(file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// An object for writing results to file
pub struct DataWriter {
    output_path: PathBuf,
    debug: bool,
}

impl DataWriter {
    /// Create a new [`DataWriter`], writing run metadata straight away
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    /// * `model_path` - Path to input model
    /// * `debug` - Whether to write debug information
    pub fn create(output_path: &Path, model_path: &Path, debug: bool) -> Result<Self> {
        write_metadata(output_path, model_path, None)?;

        Ok(Self {
            output_path: output_path.to_path_buf(),
            debug,
        })
    }

    /// Write the number of constraints in each family, if debugging is enabled
    pub fn write_constraint_families(&self, problem: &Problem) -> Result<()> {
        if !self.debug {
            return Ok(());
        }

        let rows = problem
            .family_counts()
            .into_iter()
            .map(|(family, count)| ConstraintFamilyRow { family, count });
        write_csv(&self.output_path.join(CONSTRAINT_FAMILIES_FILE_NAME), rows)
    }

    /// Write all results for a solution
    pub fn write_solution(&self, solution: &Solution) -> Result<()> {
        let model = solution.model();
        let hours = || model.horizon.hours();

        write_csv(
            &self.output_path.join(HOURLY_FILE_NAME),
            solution.iter_scenarios().flat_map(|scenario| {
                hours()
                    .map(|hour| HourlyRow::new(&scenario, hour))
                    .collect::<Vec<_>>()
            }),
        )?;
        write_csv(
            &self.output_path.join(DAC_SLICES_FILE_NAME),
            solution.iter_scenarios().flat_map(|scenario| {
                iproduct!(hours(), 0..SLICES_PER_HOUR)
                    .map(|(hour, slice)| DacSliceRow::new(&scenario, HourSlice::new(hour, slice)))
                    .collect::<Vec<_>>()
            }),
        )?;
        write_csv(
            &self.output_path.join(OPERATING_COSTS_FILE_NAME),
            solution.iter_scenarios().flat_map(|scenario| {
                model
                    .horizon
                    .operating_hours()
                    .map(|hour| OperatingCostRow::new(&scenario, hour))
                    .collect::<Vec<_>>()
            }),
        )?;
        write_csv(
            &self.output_path.join(SIZING_FILE_NAME),
            [SizingRow {
                sorbent_mass: solution.sorbent_mass(),
                blower_capacity: solution.blower_capacity(),
                capital_cost: solution.capital_cost(),
                total_overnight_cost: solution.total_overnight_cost(),
                fixed_om: solution.fixed_om(),
            }],
        )?;
        write_csv(
            &self.output_path.join(CASH_FLOW_FILE_NAME),
            model.iter_scenarios().flat_map(|scenario| {
                solution
                    .cash_flow(scenario.id)
                    .iter()
                    .map(|row| CashFlowRecord::new(scenario.id, row))
                    .collect::<Vec<_>>()
            }),
        )?;
        write_csv(
            &self.output_path.join(PROFIT_COST_FILE_NAME),
            solution.iter_scenarios().map(|scenario| {
                let id = scenario.scenario.id;
                let profit_cost = solution.profit_cost(id);
                let cash_flow = solution.cash_flow(id);
                ProfitCostRow {
                    scenario: id,
                    co2_price: scenario.scenario.co2_price,
                    window: scenario.scenario.window,
                    probability: scenario.scenario.probability,
                    power_revenue: profit_cost.power_revenue,
                    co2_credit: profit_cost.co2_credit,
                    fuel_cost: profit_cost.fuel_cost,
                    transport_storage_cost: profit_cost.transport_storage_cost,
                    startup_cost: profit_cost.startup_cost,
                    variable_om: profit_cost.variable_om,
                    fixed_om: profit_cost.fixed_om,
                    profit: profit_cost.profit(),
                    net_captured_co2: scenario.net_captured_co2(),
                    startups: scenario.startup_count(),
                    npv: cash_flow.npv(),
                    irr: cash_flow.irr(),
                }
            }),
        )?;

        write_metadata(&self.output_path, &model.model_path, Some(solution))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_output_directory_new_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("new_output");

        // Create a new directory
        let result = create_output_directory(&output_dir, false).unwrap();
        assert!(!result);
        assert!(output_dir.exists());
        assert!(output_dir.is_dir());
    }

    #[test]
    fn create_output_directory_existing_empty_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("empty_output");

        // Create the directory first
        fs::create_dir(&output_dir).unwrap();

        // Should succeed since directory is empty
        let result = create_output_directory(&output_dir, false).unwrap();
        assert!(!result);
        assert!(output_dir.exists());
    }

    #[test]
    fn create_output_directory_existing_with_files_no_overwrite() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("output_with_files");

        // Create directory with a file
        fs::create_dir(&output_dir).unwrap();
        fs::write(output_dir.join("existing_file.txt"), "some content").unwrap();

        // Should fail when allow_overwrite is false
        let result = create_output_directory(&output_dir, false);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Output folder already exists")
        );
    }

    #[test]
    fn create_output_directory_existing_with_files_allow_overwrite() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("output_with_files");

        // Create directory with a file
        fs::create_dir(&output_dir).unwrap();
        let file_path = output_dir.join("existing_file.txt");
        fs::write(&file_path, "some content").unwrap();

        // Should succeed when allow_overwrite is true
        let result = create_output_directory(&output_dir, true).unwrap();
        assert!(result);
        assert!(output_dir.exists());
        assert!(!file_path.exists()); // File should be gone
    }

    #[test]
    fn write_constraint_families_only_when_debugging() {
        let dir = tempdir().unwrap();
        let problem = Problem::default();

        let writer = DataWriter {
            output_path: dir.path().to_path_buf(),
            debug: false,
        };
        writer.write_constraint_families(&problem).unwrap();
        assert!(!dir.path().join(CONSTRAINT_FAMILIES_FILE_NAME).exists());

        let writer = DataWriter {
            output_path: dir.path().to_path_buf(),
            debug: true,
        };
        writer.write_constraint_families(&problem).unwrap();
        assert!(dir.path().join(CONSTRAINT_FAMILIES_FILE_NAME).exists());
    }

    #[test]
    fn get_output_dir_uses_model_name() {
        let dir = tempdir().unwrap();
        let model_dir = dir.path().join("two_day");
        fs::create_dir(&model_dir).unwrap();
        let output_dir = get_output_dir(&model_dir, PathBuf::from("results")).unwrap();
        assert_eq!(output_dir, PathBuf::from("results/two_day"));
    }
}
