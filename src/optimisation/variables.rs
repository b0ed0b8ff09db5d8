//! The decision variables of the model, keyed by what they represent.
use super::problem::{Problem, Stage, Variable, VariableDefinition, VariableDomain};
use crate::coefficients::ResponseSurface;
use crate::scenario::{Scenario, ScenarioID};
use crate::time::{HourSlice, Horizon};
use indexmap::IndexMap;
use itertools::iproduct;
use serde::Serialize;
use std::ops::Range;
use strum::{Display, EnumIter, IntoEnumIterator};

/// Commitment binaries for each hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Commitment {
    /// The unit is committed (`y`)
    #[strum(serialize = "y")]
    On,
    /// The unit is within a startup window (`z`)
    #[strum(serialize = "z")]
    StartingUp,
    /// A startup begins in this hour (`z0`)
    #[strum(serialize = "z0")]
    StartupEvent,
}

/// The operating mode of the plant in an hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    /// The unit is off
    Off,
    /// The unit is following its startup trajectory
    StartingUp,
    /// The unit is dispatching between its load points
    Dispatching,
}

impl OperatingMode {
    /// Classify an hour from its commitment values
    pub fn classify(on: f64, starting_up: f64) -> Self {
        if on < 0.5 {
            Self::Off
        } else if starting_up > 0.5 {
            Self::StartingUp
        } else {
            Self::Dispatching
        }
    }

    /// The modes with their own disaggregated quantities
    pub fn active() -> [Self; 2] {
        [Self::StartingUp, Self::Dispatching]
    }
}

/// Quantities which are disaggregated by operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ModeQuantity {
    /// Gas turbine load factor (%)
    Load,
    /// Fuel consumption
    Fuel,
    /// Flue gas CO2
    FlueCo2,
    /// HP turbine power
    HpPower,
    /// IP turbine power
    IpPower,
    /// Auxiliary power
    AuxiliaryPower,
    /// Base DAC steam
    DacBaseSteam,
    /// Allocable steam
    AllocableSteam,
}

impl ModeQuantity {
    /// The response surface giving this quantity as a function of load
    pub fn response(self) -> Option<ResponseSurface> {
        match self {
            Self::Load => None,
            Self::Fuel => Some(ResponseSurface::Fuel),
            Self::FlueCo2 => Some(ResponseSurface::FlueCo2),
            Self::HpPower => Some(ResponseSurface::HpPower),
            Self::IpPower => Some(ResponseSurface::IpPower),
            Self::AuxiliaryPower => Some(ResponseSurface::AuxiliaryPower),
            Self::DacBaseSteam => Some(ResponseSurface::DacBaseSteam),
            Self::AllocableSteam => Some(ResponseSurface::AllocableSteam),
        }
    }

    /// The hourly quantity which is the sum of this quantity over modes
    pub fn aggregate(self) -> HourlyQuantity {
        match self {
            Self::Load => HourlyQuantity::Load,
            Self::Fuel => HourlyQuantity::Fuel,
            Self::FlueCo2 => HourlyQuantity::FlueCo2,
            Self::HpPower => HourlyQuantity::HpPower,
            Self::IpPower => HourlyQuantity::IpPower,
            Self::AuxiliaryPower => HourlyQuantity::AuxiliaryPower,
            Self::DacBaseSteam => HourlyQuantity::DacBaseSteam,
            Self::AllocableSteam => HourlyQuantity::AllocableSteam,
        }
    }
}

/// Continuous quantities defined once per hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum HourlyQuantity {
    /// Gas turbine load factor (%)
    Load,
    /// Fuel consumption (MMBtu/h)
    Fuel,
    /// Flue gas CO2 (t/h)
    FlueCo2,
    /// HP turbine power (MW)
    HpPower,
    /// IP turbine power (MW)
    IpPower,
    /// Auxiliary power (MW)
    AuxiliaryPower,
    /// Base DAC steam (MMBtu/h)
    DacBaseSteam,
    /// Allocable steam (MMBtu/h)
    AllocableSteam,
    /// CO2 captured by PCC (t/h)
    PccCo2,
    /// CO2 vented by PCC (t/h)
    PccVentCo2,
    /// PCC reboiler steam (MMBtu/h)
    PccSteam,
    /// PCC power (MW)
    PccPower,
    /// CO2 sent to compression (t/h)
    CompressedCo2,
    /// Compression power (MW)
    CompressionPower,
    /// Creditable CO2 capture (t/h)
    NetCapturedCo2,
    /// LP turbine power (MW)
    LpPower,
    /// Steam turbine power (MW)
    SteamTurbinePower,
    /// Gas turbine power (MW)
    GasTurbinePower,
    /// Total generation (MW)
    TotalPower,
    /// Net power exported (MW)
    NetPower,
    /// Allocable steam sent to DAC (MMBtu/h)
    DacExtraSteam,
    /// Allocable steam sent to the LP turbine (MMBtu/h)
    LpSteam,
    /// Total steam available to DAC (MMBtu/h)
    DacTotalSteam,
    /// NGCC VOM ($/h)
    NgccVom,
    /// PCC VOM ($/h)
    PccVom,
    /// DAC VOM ($/h)
    DacVom,
    /// PCC compression VOM ($/h)
    PccCompressionVom,
    /// DAC compression VOM ($/h)
    DacCompressionVom,
}

impl HourlyQuantity {
    /// The variable O&M quantities
    pub fn vom() -> [Self; 5] {
        [
            Self::NgccVom,
            Self::PccVom,
            Self::DacVom,
            Self::PccCompressionVom,
            Self::DacCompressionVom,
        ]
    }
}

/// Sorbent stocks carried across slice boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum SorbentPool {
    /// Fresh sorbent (`F`)
    Fresh,
    /// Saturated sorbent (`S`)
    Saturated,
    /// Sorbent in its second adsorption slice (`A1`)
    AdsorbingPrevious,
}

/// Continuous quantities defined for each slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum SliceQuantity {
    /// Sorbent starting adsorption in this slice (`A0`, t)
    Adsorbing,
    /// Sorbent being regenerated in this slice (`R`, t)
    Regenerating,
    /// CO2 released by regeneration (t)
    DacCo2,
    /// Regeneration steam (MMBtu)
    DacSteam,
    /// Adsorption power (MW)
    DacPower,
    /// Air contacted (m³)
    AirProcessed,
}

/// Variables shared by all scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirstStageVariables {
    /// Installed sorbent mass (t)
    pub sorbent_mass: Variable,
    /// Installed blower capacity (m³/s)
    pub blower_capacity: Variable,
}

impl FirstStageVariables {
    /// Declare the first-stage variables
    pub fn declare(problem: &mut Problem) -> Self {
        let mut add = |label: &str| {
            problem.add_variable(VariableDefinition::new(
                label.to_string(),
                VariableDomain::Continuous,
                Stage::First,
            ))
        };

        Self {
            sorbent_mass: add("sorbent_mass"),
            blower_capacity: add("blower_capacity"),
        }
    }

    /// Iterate over the first-stage variables
    pub fn iter(&self) -> impl Iterator<Item = Variable> + use<> {
        [self.sorbent_mass, self.blower_capacity].into_iter()
    }
}

/// The second-stage variables of one scenario
pub struct ScenarioVariables {
    /// The scenario the variables belong to
    pub scenario: ScenarioID,
    commitment: IndexMap<(Commitment, usize), Variable>,
    weights: IndexMap<(usize, usize), Variable>,
    modes: IndexMap<(OperatingMode, ModeQuantity, usize), Variable>,
    hourly: IndexMap<(HourlyQuantity, usize), Variable>,
    pools: IndexMap<(SorbentPool, HourSlice), Variable>,
    slices: IndexMap<(SliceQuantity, HourSlice), Variable>,
    columns: Range<usize>,
}

impl ScenarioVariables {
    /// Declare every second-stage variable for a scenario
    ///
    /// # Arguments
    ///
    /// * `problem` - The problem to add the variables to
    /// * `horizon` - The planning horizon
    /// * `n_load_points` - Number of load points spanning dispatchable operation
    /// * `scenario` - The scenario
    pub fn declare(
        problem: &mut Problem,
        horizon: &Horizon,
        n_load_points: usize,
        scenario: &Scenario,
    ) -> Self {
        // This line **must** come before we add more variables
        let start = problem.num_variables();
        let id = scenario.id;
        let mut add = |label: String, domain: VariableDomain| {
            problem.add_variable(VariableDefinition::new(
                format!("{id}/{label}"),
                domain,
                Stage::Second(id),
            ))
        };

        let commitment = iproduct!(Commitment::iter(), horizon.hours())
            .map(|(kind, hour)| {
                let var = add(format!("{kind}[{hour}]"), VariableDomain::Binary);
                ((kind, hour), var)
            })
            .collect();
        let weights = iproduct!(horizon.hours(), 0..n_load_points)
            .map(|(hour, point)| {
                let var = add(
                    format!("lambda[{hour},{point}]"),
                    VariableDomain::ConvexWeight,
                );
                ((hour, point), var)
            })
            .collect();
        let modes = iproduct!(
            OperatingMode::active(),
            ModeQuantity::iter(),
            horizon.hours()
        )
        .map(|(mode, quantity, hour)| {
            let var = add(
                format!("{quantity}_{mode}[{hour}]"),
                VariableDomain::Continuous,
            );
            ((mode, quantity, hour), var)
        })
        .collect();
        let hourly = iproduct!(HourlyQuantity::iter(), horizon.hours())
            .map(|(quantity, hour)| {
                let var = add(format!("{quantity}[{hour}]"), VariableDomain::Continuous);
                ((quantity, hour), var)
            })
            .collect();
        let pools = iproduct!(SorbentPool::iter(), horizon.iter_boundaries())
            .map(|(pool, boundary)| {
                let var = add(format!("{pool}[{boundary}]"), VariableDomain::Continuous);
                ((pool, boundary), var)
            })
            .collect();
        let slices = iproduct!(SliceQuantity::iter(), horizon.iter_slices())
            .map(|(quantity, slice)| {
                let var = add(format!("{quantity}[{slice}]"), VariableDomain::Continuous);
                ((quantity, slice), var)
            })
            .collect();

        Self {
            scenario: id,
            commitment,
            weights,
            modes,
            hourly,
            pools,
            slices,
            columns: start..problem.num_variables(),
        }
    }

    /// Get a commitment binary
    pub fn commitment(&self, kind: Commitment, hour: usize) -> Variable {
        *self
            .commitment
            .get(&(kind, hour))
            .expect("No commitment variable for given params")
    }

    /// Get the weight on a load point in the dispatch convex combination
    pub fn weight(&self, hour: usize, point: usize) -> Variable {
        *self
            .weights
            .get(&(hour, point))
            .expect("No convex weight variable for given params")
    }

    /// Get a quantity for an active mode
    pub fn mode(&self, mode: OperatingMode, quantity: ModeQuantity, hour: usize) -> Variable {
        *self
            .modes
            .get(&(mode, quantity, hour))
            .expect("No mode variable for given params")
    }

    /// Get an hourly quantity
    pub fn hourly(&self, quantity: HourlyQuantity, hour: usize) -> Variable {
        *self
            .hourly
            .get(&(quantity, hour))
            .expect("No hourly variable for given params")
    }

    /// Get a sorbent pool at a slice boundary
    pub fn pool(&self, pool: SorbentPool, boundary: HourSlice) -> Variable {
        *self
            .pools
            .get(&(pool, boundary))
            .expect("No sorbent pool variable for given params")
    }

    /// Get a slice quantity
    pub fn slice(&self, quantity: SliceQuantity, slice: HourSlice) -> Variable {
        *self
            .slices
            .get(&(quantity, slice))
            .expect("No slice variable for given params")
    }

    /// The range of columns occupied by this scenario's variables
    pub fn columns(&self) -> Range<usize> {
        self.columns.clone()
    }

    /// Iterate over the scenario's variables
    pub fn iter(&self) -> impl Iterator<Item = Variable> + '_ {
        self.commitment
            .values()
            .chain(self.weights.values())
            .chain(self.modes.values())
            .chain(self.hourly.values())
            .chain(self.pools.values())
            .chain(self.slices.values())
            .copied()
    }
}

/// A map for easy lookup of variables in the problem.
///
/// First-stage variables are declared first, followed by one contiguous block per scenario in
/// scenario order.
pub struct VariableMap {
    /// Sizing variables
    pub first_stage: FirstStageVariables,
    scenarios: Vec<ScenarioVariables>,
}

impl VariableMap {
    /// Declare all variables for the given scenarios
    pub fn declare<'a, I>(
        problem: &mut Problem,
        horizon: &Horizon,
        n_load_points: usize,
        scenarios: I,
    ) -> Self
    where
        I: IntoIterator<Item = &'a Scenario>,
    {
        let first_stage = FirstStageVariables::declare(problem);
        let scenarios = scenarios
            .into_iter()
            .map(|scenario| ScenarioVariables::declare(problem, horizon, n_load_points, scenario))
            .collect();

        Self {
            first_stage,
            scenarios,
        }
    }

    /// Get the variables for a scenario
    pub fn scenario(&self, id: ScenarioID) -> &ScenarioVariables {
        &self.scenarios[id.0]
    }

    /// Iterate over the per-scenario variable groups
    pub fn iter_scenarios(&self) -> std::slice::Iter<'_, ScenarioVariables> {
        self.scenarios.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::scenario;
    use crate::time::SLICES_PER_HOUR;
    use rstest::rstest;

    #[rstest]
    fn declare_counts(scenario: Scenario) {
        let horizon = Horizon::new(2);
        let mut problem = Problem::default();
        let map = VariableMap::declare(&mut problem, &horizon, 2, [&scenario]);
        let vars = map.scenario(scenario.id);

        let hours = 3;
        let expected = 3 * hours
            + 2 * hours
            + 2 * ModeQuantity::iter().count() * hours
            + HourlyQuantity::iter().count() * hours
            + 3 * hours * (SLICES_PER_HOUR + 1)
            + SliceQuantity::iter().count() * hours * SLICES_PER_HOUR;
        assert_eq!(vars.columns(), 2..2 + expected);
        assert_eq!(vars.iter().count(), expected);
        assert_eq!(problem.num_variables(), 2 + expected);
        assert_eq!(problem.num_integer_variables(), 3 * hours);

        // Variables are declared in column order
        assert!(
            vars.iter()
                .zip(vars.columns())
                .all(|(var, col)| var.index() == col)
        );
    }

    #[rstest]
    fn labels_and_stages(scenario: Scenario) {
        let horizon = Horizon::new(1);
        let mut problem = Problem::default();
        let map = VariableMap::declare(&mut problem, &horizon, 2, [&scenario]);
        let vars = map.scenario(scenario.id);

        let y = problem.variable(vars.commitment(Commitment::On, 1));
        assert_eq!(y.label, "s0/y[1]");
        assert_eq!(y.domain, VariableDomain::Binary);
        assert_eq!(y.stage, Stage::Second(scenario.id));

        let fresh = problem.variable(vars.pool(SorbentPool::Fresh, HourSlice::new(1, 4)));
        assert_eq!(fresh.label, "s0/fresh[1.4]");
        assert_eq!(
            problem.variable(map.first_stage.sorbent_mass).stage,
            Stage::First
        );
    }

    #[rstest]
    #[case(0.0, 0.0, OperatingMode::Off)]
    #[case(1.0, 1.0, OperatingMode::StartingUp)]
    #[case(1.0, 0.0, OperatingMode::Dispatching)]
    #[case(0.999_999, 1e-7, OperatingMode::Dispatching)]
    fn classify_mode(#[case] on: f64, #[case] starting_up: f64, #[case] expected: OperatingMode) {
        assert_eq!(OperatingMode::classify(on, starting_up), expected);
    }
}
