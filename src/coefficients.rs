//! Engineering and economic coefficients for the plant.
//!
//! The defaults describe a retrofitted NGCC plant with amine post-combustion capture and a
//! temperature-swing direct air capture unit that takes low-pressure steam from the plant. Any
//! section can be overridden from `coefficients.toml` in the model directory and the part-load
//! response surfaces can be replaced with `regression_coefficients.csv`.
use crate::units::{Money, MoneyPerTonne};
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Molar mass of CO2 (g/mol)
const CO2_MOLAR_MASS: f64 = 44.0095;

/// Molar volume of an ideal gas at standard conditions (m³/mol)
const MOLAR_VOLUME: f64 = 0.0224;

/// Volume fraction of CO2 in ambient air
const CO2_AIR_VOLUME_FRACTION: f64 = 0.000_415;

/// Hours in a (non-leap) year, used to convert annual O&M costs to hourly rates
const HOURS_PER_YEAR: f64 = 24.0 * 365.0;

/// A part-load response of the form `a · load + b · on`.
///
/// `load` is the load factor in percent and `on` is the commitment (or dispatch) indicator, so
/// the intercept only applies while the unit is running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearResponse {
    /// Slope per percent of load
    pub a: f64,
    /// Intercept when running
    pub b: f64,
}

impl LinearResponse {
    /// Evaluate the response for the given load factor and on indicator
    pub fn evaluate(&self, load: f64, on: f64) -> f64 {
        self.a * load + self.b * on
    }

    fn divided_by(self, divisor: f64) -> Self {
        Self {
            a: self.a / divisor,
            b: self.b / divisor,
        }
    }
}

/// The response surfaces fitted against gas-turbine load factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum ResponseSurface {
    /// Gas turbine power (MW)
    #[strum(serialize = "GT_power")]
    GasTurbinePower,
    /// Natural gas consumption (MMBtu/h)
    #[strum(serialize = "fuel")]
    Fuel,
    /// CO2 in the flue gas (t/h)
    #[strum(serialize = "CO2_flue")]
    FlueCo2,
    /// High-pressure steam turbine power (MW)
    #[strum(serialize = "HP_power")]
    HpPower,
    /// Intermediate-pressure steam turbine power (MW)
    #[strum(serialize = "IP_power")]
    IpPower,
    /// Auxiliary power draw of the NGCC and PCC plant (MW)
    #[strum(serialize = "auxiliary_load")]
    AuxiliaryPower,
    /// Steam available to the DAC unit without reducing LP turbine output (MMBtu/h)
    #[strum(serialize = "DAC_base_steam")]
    DacBaseSteam,
    /// Steam that may go either to the LP turbine or to the DAC unit (MMBtu/h)
    #[strum(serialize = "allocable_steam")]
    AllocableSteam,
}

impl ResponseSurface {
    /// Divisor converting coefficients in the regression table to model units.
    ///
    /// Power responses are fitted in kW and used in MW.
    pub fn table_divisor(self) -> f64 {
        match self {
            Self::GasTurbinePower | Self::HpPower | Self::IpPower | Self::AuxiliaryPower => 1000.0,
            _ => 1.0,
        }
    }
}

/// Part-load response surfaces, in model units (MW, MMBtu/h, t/h)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionCoefficients {
    /// Gas turbine power
    pub gas_turbine_power: LinearResponse,
    /// Fuel consumption
    pub fuel: LinearResponse,
    /// Flue gas CO2
    pub flue_co2: LinearResponse,
    /// HP turbine power
    pub hp_power: LinearResponse,
    /// IP turbine power
    pub ip_power: LinearResponse,
    /// Auxiliary power
    pub auxiliary_power: LinearResponse,
    /// Base DAC steam
    pub dac_base_steam: LinearResponse,
    /// Allocable steam
    pub allocable_steam: LinearResponse,
}

impl Default for RegressionCoefficients {
    fn default() -> Self {
        Self {
            gas_turbine_power: LinearResponse { a: 4.0, b: 80.0 },
            fuel: LinearResponse { a: 38.0, b: 816.0 },
            flue_co2: LinearResponse { a: 2.0, b: 46.0 },
            hp_power: LinearResponse { a: 0.7, b: 10.0 },
            ip_power: LinearResponse { a: 0.8, b: 12.0 },
            auxiliary_power: LinearResponse { a: 0.15, b: 5.0 },
            dac_base_steam: LinearResponse { a: 1.5, b: 20.0 },
            allocable_steam: LinearResponse { a: 12.0, b: 240.0 },
        }
    }
}

impl RegressionCoefficients {
    /// Get the coefficients for a response surface
    pub fn get(&self, response: ResponseSurface) -> LinearResponse {
        match response {
            ResponseSurface::GasTurbinePower => self.gas_turbine_power,
            ResponseSurface::Fuel => self.fuel,
            ResponseSurface::FlueCo2 => self.flue_co2,
            ResponseSurface::HpPower => self.hp_power,
            ResponseSurface::IpPower => self.ip_power,
            ResponseSurface::AuxiliaryPower => self.auxiliary_power,
            ResponseSurface::DacBaseSteam => self.dac_base_steam,
            ResponseSurface::AllocableSteam => self.allocable_steam,
        }
    }

    /// Set the coefficients for a response surface from raw table values
    pub fn set_from_table(&mut self, response: ResponseSurface, raw: LinearResponse) {
        let value = raw.divided_by(response.table_divisor());
        let slot = match response {
            ResponseSurface::GasTurbinePower => &mut self.gas_turbine_power,
            ResponseSurface::Fuel => &mut self.fuel,
            ResponseSurface::FlueCo2 => &mut self.flue_co2,
            ResponseSurface::HpPower => &mut self.hp_power,
            ResponseSurface::IpPower => &mut self.ip_power,
            ResponseSurface::AuxiliaryPower => &mut self.auxiliary_power,
            ResponseSurface::DacBaseSteam => &mut self.dac_base_steam,
            ResponseSurface::AllocableSteam => &mut self.allocable_steam,
        };
        *slot = value;
    }
}

/// Steam cycle coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteamCoefficients {
    /// LP turbine power per unit of steam sent to it (MW per MMBtu/h)
    pub lp_power_per_steam: f64,
}

impl Default for SteamCoefficients {
    fn default() -> Self {
        Self {
            lp_power_per_steam: 0.090_62,
        }
    }
}

/// Direct air capture coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DacCoefficients {
    /// CO2 captured per cycle per tonne of sorbent (t/t)
    pub sorbent_co2_capacity: f64,
    /// Regeneration steam per tonne of CO2 (MMBtu/t)
    pub steam_per_co2: f64,
    /// Fan and vacuum power per tonne of CO2 (MWh/t)
    pub power_per_co2: f64,
    /// Volume of air contacted per tonne of CO2 adsorbed (m³/t)
    pub air_per_co2: f64,
    /// Length of a slice in seconds, converting slice air volume to a blower rate
    pub slice_seconds: f64,
    /// Capital cost of sorbent
    pub sorbent_capital_cost: MoneyPerTonne,
    /// Capital cost of air contactors and blowers ($ per m³/s)
    pub blower_capital_cost: f64,
    /// Multiplier on modelled sorbent mass in the capital and fixed costs.
    ///
    /// The modelled unit is a representative module; the installed fleet is this many times
    /// larger.
    pub sorbent_capital_scale: f64,
    /// Multiplier on modelled blower rate in the capital and fixed costs
    pub blower_capital_scale: f64,
    /// Annual fixed O&M as a fraction of capital cost
    pub fixed_cost_fraction: f64,
    /// Annual labour cost of operating the DAC unit
    pub labour_cost: Money,
}

impl Default for DacCoefficients {
    fn default() -> Self {
        Self {
            sorbent_co2_capacity: 0.8e-3 * CO2_MOLAR_MASS,
            steam_per_co2: 7.0 * 277.778 / 293.07,
            power_per_co2: 0.25,
            air_per_co2: 1e6 / CO2_MOLAR_MASS * MOLAR_VOLUME / CO2_AIR_VOLUME_FRACTION,
            slice_seconds: 900.0,
            sorbent_capital_cost: MoneyPerTonne(72_720.0),
            blower_capital_cost: 491.04,
            sorbent_capital_scale: 3000.0,
            blower_capital_scale: 48_000.0,
            fixed_cost_fraction: 0.05,
            labour_cost: Money(2.0 * 110_000.0),
        }
    }
}

impl DacCoefficients {
    /// Capital cost per tonne of installed sorbent, including the scale factor
    pub fn sorbent_cost_coefficient(&self) -> f64 {
        self.sorbent_capital_cost.value() * self.sorbent_capital_scale
    }

    /// Capital cost per m³/s of installed blower capacity, including the scale factor
    pub fn blower_cost_coefficient(&self) -> f64 {
        self.blower_capital_cost * self.blower_capital_scale
    }
}

/// Post-combustion capture coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PccCoefficients {
    /// Fraction of flue gas CO2 captured
    pub capture_fraction: f64,
    /// Reboiler steam per tonne of CO2 captured (MMBtu/t)
    pub steam_per_co2: f64,
    /// Power per tonne of CO2 captured (MWh/t)
    pub power_per_co2: f64,
}

impl Default for PccCoefficients {
    fn default() -> Self {
        Self {
            capture_fraction: 0.97,
            steam_per_co2: 2.69 + 0.0218 + 0.001_27,
            power_per_co2: 0.047,
        }
    }
}

/// CO2 compression and venting coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionCoefficients {
    /// Compression power per tonne of PCC CO2 (MWh/t)
    pub pcc_power_per_co2: f64,
    /// Compression power per tonne of DAC CO2 (MWh/t)
    pub dac_power_per_co2: f64,
    /// Fraction of DAC CO2 vented during compression
    pub dac_vent_fraction: f64,
}

impl Default for CompressionCoefficients {
    fn default() -> Self {
        Self {
            pcc_power_per_co2: 0.076,
            dac_power_per_co2: 0.138,
            dac_vent_fraction: 4.481 / 140.35,
        }
    }
}

/// Variable operating costs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatingCostCoefficients {
    /// CO2 transport and storage
    pub transport_storage: MoneyPerTonne,
    /// NGCC VOM per load-factor-percent hour
    pub ngcc_vom: f64,
    /// PCC VOM per load-factor-percent hour
    pub pcc_vom: f64,
    /// DAC VOM per tonne of CO2
    pub dac_vom: MoneyPerTonne,
    /// PCC compressor VOM per load-factor-percent hour
    pub pcc_compression_vom: f64,
    /// DAC compressor VOM per tonne of CO2
    pub dac_compression_vom: MoneyPerTonne,
}

impl Default for OperatingCostCoefficients {
    fn default() -> Self {
        Self {
            transport_storage: MoneyPerTonne(10.0),
            ngcc_vom: 8_751_461.0 / 0.85 / HOURS_PER_YEAR / 100.0,
            pcc_vom: 18_527_935.0 / HOURS_PER_YEAR / 100.0,
            dac_vom: MoneyPerTonne(9.0),
            pcc_compression_vom: 1_745_198.0 / HOURS_PER_YEAR / 100.0,
            dac_compression_vom: MoneyPerTonne(861_964.0 / HOURS_PER_YEAR / 140.0),
        }
    }
}

/// Part-load and startup behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeCoefficients {
    /// Load factors (%) spanning dispatchable operation
    pub load_points: Vec<f64>,
    /// Load factor (%) in each hour of a startup, starting with the hour the startup begins
    pub startup_trajectory: Vec<f64>,
    /// CO2 emitted per startup (t)
    pub startup_co2: f64,
    /// Fuel burnt per startup (MMBtu)
    pub startup_fuel: f64,
}

impl Default for ModeCoefficients {
    fn default() -> Self {
        Self {
            load_points: vec![50.0, 100.0],
            startup_trajectory: vec![0.0, 0.33, 9.37, 9.98, 14.27, 27.92, 50.40, 59.91, 84.40],
            startup_co2: 100.45,
            startup_fuel: 16_958.58,
        }
    }
}

impl ModeCoefficients {
    /// Number of hours a startup lasts
    pub fn startup_hours(&self) -> usize {
        self.startup_trajectory.len()
    }
}

/// Financial assumptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinanceCoefficients {
    /// Discount rate
    pub interest_rate: f64,
    /// Declining-balance depreciation rate
    pub depreciation_rate: f64,
    /// Tax rate
    pub tax_rate: f64,
    /// Multiplier converting capital cost to total overnight cost
    pub owner_cost_multiplier: f64,
    /// Fraction of overnight cost spent in each construction year
    pub construction_split: Vec<f64>,
    /// Number of operating years
    pub operating_years: u32,
    /// Hours of operation per year, used to annualise the horizon
    pub operating_hours_per_year: f64,
    /// Calendar year of the first construction year
    pub start_year: i32,
    /// Overnight cost of the existing plant, added to reported cash flows only.
    ///
    /// Zero by default, so reports cover the DAC retrofit alone. Set it to `1_142_222_643` (with
    /// `baseline_fixed_cost = 47_965_372`) to report the whole NGCC-PCC-DAC plant.
    pub baseline_overnight_cost: Money,
    /// Annual fixed O&M of the existing plant, added to reported cash flows only
    pub baseline_fixed_cost: Money,
}

impl Default for FinanceCoefficients {
    fn default() -> Self {
        Self {
            interest_rate: 0.0294,
            depreciation_rate: 0.075,
            tax_rate: 0.2574,
            owner_cost_multiplier: 1.0 + 0.0311 + 0.0066 + 0.1779,
            construction_split: vec![0.3, 0.7],
            operating_years: 20,
            operating_hours_per_year: 364.0 * 24.0,
            start_year: 2021,
            baseline_overnight_cost: Money(0.0),
            baseline_fixed_cost: Money(0.0),
        }
    }
}

impl FinanceCoefficients {
    /// Index of the first operating year (after construction)
    pub fn first_operating_year(&self) -> u32 {
        self.construction_split.len() as u32
    }

    /// Number of rows in a cash-flow table
    pub fn project_years(&self) -> u32 {
        self.first_operating_year() + self.operating_years
    }
}

/// All coefficients used to build the model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coefficients {
    /// Part-load response surfaces
    pub regression: RegressionCoefficients,
    /// Steam cycle
    pub steam: SteamCoefficients,
    /// Direct air capture
    pub dac: DacCoefficients,
    /// Post-combustion capture
    pub pcc: PccCoefficients,
    /// Compression and venting
    pub compression: CompressionCoefficients,
    /// Variable operating costs
    pub costs: OperatingCostCoefficients,
    /// Part-load and startup behaviour
    pub modes: ModeCoefficients,
    /// Financial assumptions
    pub finance: FinanceCoefficients,
}

/// Check that a value is a finite number greater than or equal to zero
fn check_non_negative(value: f64, name: &str) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "{name} must be a finite number greater than or equal to zero"
    );

    Ok(())
}

/// Check that a rate lies in `[0, 1)`
fn check_rate(value: f64, name: &str) -> Result<()> {
    ensure!(
        (0.0..1.0).contains(&value),
        "{name} must be between zero (inclusive) and one (exclusive)"
    );

    Ok(())
}

fn check_load_points(points: &[f64]) -> Result<()> {
    ensure!(points.len() >= 2, "At least two load points are required");
    ensure!(
        points.iter().all(|p| (0.0..=100.0).contains(p)),
        "Load points must be between 0 and 100"
    );
    ensure!(
        points.windows(2).all(|w| w[0] < w[1]),
        "Load points must be strictly ascending"
    );

    Ok(())
}

fn check_startup_trajectory(trajectory: &[f64]) -> Result<()> {
    ensure!(!trajectory.is_empty(), "Startup trajectory is empty");
    ensure!(
        trajectory.iter().all(|p| (0.0..=100.0).contains(p)),
        "Startup trajectory values must be between 0 and 100"
    );

    Ok(())
}

fn check_construction_split(split: &[f64]) -> Result<()> {
    ensure!(!split.is_empty(), "construction_split is empty");
    let total: f64 = split.iter().sum();
    ensure!(
        split.iter().all(|f| *f >= 0.0) && (total - 1.0).abs() < 1e-9,
        "construction_split must be non-negative fractions summing to one"
    );

    Ok(())
}

impl Coefficients {
    /// Check that the coefficients describe a sensible plant
    pub fn validate(&self) -> Result<()> {
        check_rate(self.pcc.capture_fraction, "pcc.capture_fraction")?;
        check_rate(
            self.compression.dac_vent_fraction,
            "compression.dac_vent_fraction",
        )?;
        check_rate(self.finance.interest_rate, "finance.interest_rate")?;
        check_rate(self.finance.tax_rate, "finance.tax_rate")?;
        check_rate(self.finance.depreciation_rate, "finance.depreciation_rate")?;
        check_rate(self.dac.fixed_cost_fraction, "dac.fixed_cost_fraction")?;

        for (value, name) in [
            (self.steam.lp_power_per_steam, "steam.lp_power_per_steam"),
            (self.dac.sorbent_co2_capacity, "dac.sorbent_co2_capacity"),
            (self.dac.steam_per_co2, "dac.steam_per_co2"),
            (self.dac.power_per_co2, "dac.power_per_co2"),
            (self.dac.air_per_co2, "dac.air_per_co2"),
            (self.dac.sorbent_capital_cost.value(), "dac.sorbent_capital_cost"),
            (self.dac.blower_capital_cost, "dac.blower_capital_cost"),
            (self.dac.sorbent_capital_scale, "dac.sorbent_capital_scale"),
            (self.dac.blower_capital_scale, "dac.blower_capital_scale"),
            (self.dac.labour_cost.value(), "dac.labour_cost"),
            (self.pcc.steam_per_co2, "pcc.steam_per_co2"),
            (self.pcc.power_per_co2, "pcc.power_per_co2"),
            (self.compression.pcc_power_per_co2, "compression.pcc_power_per_co2"),
            (self.compression.dac_power_per_co2, "compression.dac_power_per_co2"),
            (self.costs.transport_storage.value(), "costs.transport_storage"),
            (self.costs.ngcc_vom, "costs.ngcc_vom"),
            (self.costs.pcc_vom, "costs.pcc_vom"),
            (self.costs.dac_vom.value(), "costs.dac_vom"),
            (self.costs.pcc_compression_vom, "costs.pcc_compression_vom"),
            (self.costs.dac_compression_vom.value(), "costs.dac_compression_vom"),
            (self.modes.startup_co2, "modes.startup_co2"),
            (self.modes.startup_fuel, "modes.startup_fuel"),
            (self.finance.owner_cost_multiplier, "finance.owner_cost_multiplier"),
            (
                self.finance.baseline_overnight_cost.value(),
                "finance.baseline_overnight_cost",
            ),
            (
                self.finance.baseline_fixed_cost.value(),
                "finance.baseline_fixed_cost",
            ),
        ] {
            check_non_negative(value, name)?;
        }

        ensure!(
            self.dac.slice_seconds > 0.0,
            "dac.slice_seconds must be greater than zero"
        );
        ensure!(
            self.finance.operating_years > 0,
            "finance.operating_years cannot be zero"
        );
        ensure!(
            self.finance.operating_hours_per_year > 0.0,
            "finance.operating_hours_per_year must be greater than zero"
        );

        check_load_points(&self.modes.load_points).context("Invalid modes.load_points")?;
        check_startup_trajectory(&self.modes.startup_trajectory)
            .context("Invalid modes.startup_trajectory")?;
        check_construction_split(&self.finance.construction_split)
            .context("Invalid finance.construction_split")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;
    use std::str::FromStr;

    #[test]
    fn defaults_are_valid() {
        Coefficients::default().validate().unwrap();
    }

    #[test]
    fn default_constants() {
        let coefficients = Coefficients::default();
        assert_approx_eq!(f64, coefficients.dac.sorbent_co2_capacity, 0.035_207_6);
        assert_approx_eq!(
            f64,
            coefficients.dac.air_per_co2,
            1_226_460.28,
            epsilon = 0.1
        );
        assert_eq!(coefficients.modes.startup_hours(), 9);
        assert_eq!(coefficients.finance.first_operating_year(), 2);
        assert_eq!(coefficients.finance.project_years(), 22);
    }

    #[test]
    fn response_surface_names() {
        assert_eq!(
            ResponseSurface::from_str("GT_power").unwrap(),
            ResponseSurface::GasTurbinePower
        );
        assert_eq!(ResponseSurface::AllocableSteam.to_string(), "allocable_steam");
        assert!(ResponseSurface::from_str("LP_power").is_err());
    }

    #[test]
    fn set_from_table_scales_power() {
        let mut regression = RegressionCoefficients::default();
        regression.set_from_table(
            ResponseSurface::HpPower,
            LinearResponse { a: 500.0, b: 9000.0 },
        );
        regression.set_from_table(ResponseSurface::Fuel, LinearResponse { a: 40.0, b: 700.0 });
        assert_eq!(
            regression.get(ResponseSurface::HpPower),
            LinearResponse { a: 0.5, b: 9.0 }
        );
        assert_eq!(
            regression.get(ResponseSurface::Fuel),
            LinearResponse { a: 40.0, b: 700.0 }
        );
    }

    #[test]
    fn linear_response_evaluate() {
        let response = LinearResponse { a: 2.0, b: 10.0 };
        assert_approx_eq!(f64, response.evaluate(50.0, 1.0), 110.0);
        assert_approx_eq!(f64, response.evaluate(0.0, 0.0), 0.0);
    }

    #[rstest]
    #[case(&[50.0, 100.0], true)]
    #[case(&[30.0, 60.0, 100.0], true)]
    #[case(&[100.0], false)]
    #[case(&[100.0, 50.0], false)]
    #[case(&[50.0, 50.0], false)]
    #[case(&[50.0, 120.0], false)]
    fn check_load_points_works(#[case] points: &[f64], #[case] expected_valid: bool) {
        assert_eq!(check_load_points(points).is_ok(), expected_valid);
    }

    #[rstest]
    #[case(&[0.3, 0.7], true)]
    #[case(&[1.0], true)]
    #[case(&[0.5, 0.6], false)]
    #[case(&[-0.5, 1.5], false)]
    #[case(&[], false)]
    fn check_construction_split_works(#[case] split: &[f64], #[case] expected_valid: bool) {
        assert_eq!(check_construction_split(split).is_ok(), expected_valid);
    }

    #[test]
    fn invalid_rate_rejected() {
        let mut coefficients = Coefficients::default();
        coefficients.pcc.capture_fraction = 1.0;
        let err = coefficients.validate().unwrap_err();
        assert!(err.to_string().contains("pcc.capture_fraction"));
    }

    #[test]
    fn partial_toml_override() {
        let coefficients: Coefficients = toml::from_str(
            "[dac]\npower_per_co2 = 0.3\n\n[regression.fuel]\na = 1.0\nb = 2.0\n",
        )
        .unwrap();
        assert_approx_eq!(f64, coefficients.dac.power_per_co2, 0.3);
        assert_approx_eq!(
            f64,
            coefficients.dac.steam_per_co2,
            DacCoefficients::default().steam_per_co2
        );
        assert_eq!(coefficients.regression.fuel, LinearResponse { a: 1.0, b: 2.0 });
        assert_eq!(
            coefficients.regression.hp_power,
            RegressionCoefficients::default().hp_power
        );
    }

    #[test]
    fn full_plant_baseline_override() {
        let coefficients: Coefficients = toml::from_str(
            "[finance]\nbaseline_overnight_cost = 1142222643.0\nbaseline_fixed_cost = 47965372.0\n",
        )
        .unwrap();
        coefficients.validate().unwrap();
        assert_eq!(
            coefficients.finance.baseline_overnight_cost,
            Money(1_142_222_643.0)
        );
        assert_eq!(coefficients.finance.baseline_fixed_cost, Money(47_965_372.0));

        // Reports cover the retrofit alone unless the baseline is set
        let finance = FinanceCoefficients::default();
        assert_eq!(finance.baseline_overnight_cost, Money(0.0));
        assert_eq!(finance.baseline_fixed_cost, Money(0.0));
    }
}
