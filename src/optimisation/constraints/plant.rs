//! Constraints linking capture, compression, steam and power across the plant in each hour.
use crate::model::Model;
use crate::optimisation::problem::{ConstraintFamily, ConstraintSet, RowBounds, Variable};
use crate::optimisation::variables::{Commitment, HourlyQuantity, ScenarioVariables, SliceQuantity};
use crate::time::{HourSlice, SLICES_PER_HOUR};

/// Add the plant-wide balance constraints for a scenario
pub fn add_plant_constraints(
    constraints: &mut ConstraintSet,
    model: &Model,
    variables: &ScenarioVariables,
) {
    for hour in model.horizon.hours() {
        let builder = HourBuilder {
            model,
            variables,
            hour,
        };
        builder.add_pcc_constraints(constraints);
        builder.add_compression_constraints(constraints);
        builder.add_power_constraints(constraints);
        builder.add_steam_constraints(constraints);
        builder.add_variable_cost_constraints(constraints);
    }
}

/// Builds the constraints for a single hour
struct HourBuilder<'a> {
    model: &'a Model,
    variables: &'a ScenarioVariables,
    hour: usize,
}

impl HourBuilder<'_> {
    fn var(&self, quantity: HourlyQuantity) -> Variable {
        self.variables.hourly(quantity, self.hour)
    }

    /// `Σ_j coeff · Q[i, j]` as terms
    fn slice_sum(
        &self,
        quantity: SliceQuantity,
        coeff: f64,
    ) -> impl Iterator<Item = (Variable, f64)> + '_ {
        (0..SLICES_PER_HOUR).map(move |slice| {
            (
                self.variables
                    .slice(quantity, HourSlice::new(self.hour, slice)),
                coeff,
            )
        })
    }

    /// Add `lhs − coeff · rhs = 0` for a proportional relation
    fn add_proportional(
        &self,
        constraints: &mut ConstraintSet,
        family: ConstraintFamily,
        lhs: HourlyQuantity,
        coeff: f64,
        rhs: HourlyQuantity,
    ) {
        constraints.add(
            family,
            RowBounds::Equal(0.0),
            [(self.var(lhs), 1.0), (self.var(rhs), -coeff)],
        );
    }

    fn add_pcc_constraints(&self, constraints: &mut ConstraintSet) {
        let pcc = &self.model.coefficients.pcc;
        self.add_proportional(
            constraints,
            ConstraintFamily::PccCapture,
            HourlyQuantity::PccCo2,
            pcc.capture_fraction,
            HourlyQuantity::FlueCo2,
        );
        constraints.add(
            ConstraintFamily::PccVent,
            RowBounds::Equal(0.0),
            [
                (self.var(HourlyQuantity::PccVentCo2), 1.0),
                (self.var(HourlyQuantity::FlueCo2), -1.0),
                (self.var(HourlyQuantity::PccCo2), 1.0),
            ],
        );
        self.add_proportional(
            constraints,
            ConstraintFamily::PccSteam,
            HourlyQuantity::PccSteam,
            pcc.steam_per_co2,
            HourlyQuantity::PccCo2,
        );
        self.add_proportional(
            constraints,
            ConstraintFamily::PccPower,
            HourlyQuantity::PccPower,
            pcc.power_per_co2,
            HourlyQuantity::PccCo2,
        );
    }

    fn add_compression_constraints(&self, constraints: &mut ConstraintSet) {
        let compression = &self.model.coefficients.compression;
        constraints.add(
            ConstraintFamily::Compression,
            RowBounds::Equal(0.0),
            [
                (self.var(HourlyQuantity::CompressedCo2), 1.0),
                (self.var(HourlyQuantity::PccCo2), -1.0),
            ]
            .into_iter()
            .chain(self.slice_sum(SliceQuantity::DacCo2, -1.0)),
        );
        constraints.add(
            ConstraintFamily::CompressionPower,
            RowBounds::Equal(0.0),
            [
                (self.var(HourlyQuantity::CompressionPower), 1.0),
                (
                    self.var(HourlyQuantity::PccCo2),
                    -compression.pcc_power_per_co2,
                ),
            ]
            .into_iter()
            .chain(self.slice_sum(SliceQuantity::DacCo2, -compression.dac_power_per_co2)),
        );

        // Vented PCC CO2 counts against the credit earned by DAC
        constraints.add(
            ConstraintFamily::NetCapture,
            RowBounds::Equal(0.0),
            [
                (self.var(HourlyQuantity::NetCapturedCo2), 1.0),
                (self.var(HourlyQuantity::PccVentCo2), 1.0),
            ]
            .into_iter()
            .chain(self.slice_sum(
                SliceQuantity::DacCo2,
                -(1.0 - compression.dac_vent_fraction),
            )),
        );
    }

    fn add_power_constraints(&self, constraints: &mut ConstraintSet) {
        let coefficients = &self.model.coefficients;
        self.add_proportional(
            constraints,
            ConstraintFamily::LpPower,
            HourlyQuantity::LpPower,
            coefficients.steam.lp_power_per_steam,
            HourlyQuantity::LpSteam,
        );
        constraints.add(
            ConstraintFamily::SteamTurbinePower,
            RowBounds::Equal(0.0),
            [
                (self.var(HourlyQuantity::SteamTurbinePower), 1.0),
                (self.var(HourlyQuantity::HpPower), -1.0),
                (self.var(HourlyQuantity::IpPower), -1.0),
                (self.var(HourlyQuantity::LpPower), -1.0),
            ],
        );
        constraints.add(
            ConstraintFamily::TotalPower,
            RowBounds::Equal(0.0),
            [
                (self.var(HourlyQuantity::TotalPower), 1.0),
                (self.var(HourlyQuantity::GasTurbinePower), -1.0),
                (self.var(HourlyQuantity::SteamTurbinePower), -1.0),
            ],
        );

        // The gas turbine intercept applies whenever the unit is committed, including startup
        let gas_turbine = coefficients.regression.gas_turbine_power;
        constraints.add(
            ConstraintFamily::GasTurbinePower,
            RowBounds::Equal(0.0),
            [
                (self.var(HourlyQuantity::GasTurbinePower), 1.0),
                (self.var(HourlyQuantity::Load), -gas_turbine.a),
                (
                    self.variables.commitment(Commitment::On, self.hour),
                    -gas_turbine.b,
                ),
            ],
        );

        constraints.add(
            ConstraintFamily::NetPower,
            RowBounds::Equal(0.0),
            [
                (self.var(HourlyQuantity::NetPower), 1.0),
                (self.var(HourlyQuantity::TotalPower), -1.0),
                (self.var(HourlyQuantity::PccPower), 1.0),
                (self.var(HourlyQuantity::CompressionPower), 1.0),
                (self.var(HourlyQuantity::AuxiliaryPower), 1.0),
            ]
            .into_iter()
            .chain(self.slice_sum(SliceQuantity::DacPower, 1.0)),
        );
    }

    fn add_steam_constraints(&self, constraints: &mut ConstraintSet) {
        constraints.add(
            ConstraintFamily::SteamAllocation,
            RowBounds::Equal(0.0),
            [
                (self.var(HourlyQuantity::AllocableSteam), 1.0),
                (self.var(HourlyQuantity::DacExtraSteam), -1.0),
                (self.var(HourlyQuantity::LpSteam), -1.0),
            ],
        );
        constraints.add(
            ConstraintFamily::DacSteamTotal,
            RowBounds::Equal(0.0),
            [
                (self.var(HourlyQuantity::DacTotalSteam), 1.0),
                (self.var(HourlyQuantity::DacBaseSteam), -1.0),
                (self.var(HourlyQuantity::DacExtraSteam), -1.0),
            ],
        );
        constraints.add(
            ConstraintFamily::DacSteamSupply,
            RowBounds::AtLeast(0.0),
            [(self.var(HourlyQuantity::DacTotalSteam), 1.0)]
                .into_iter()
                .chain(self.slice_sum(SliceQuantity::DacSteam, -1.0)),
        );

        // Steam is supplied at a steady rate through the hour
        let per_slice = 1.0 / SLICES_PER_HOUR as f64;
        for slice in 0..SLICES_PER_HOUR {
            constraints.add(
                ConstraintFamily::DacSteamRate,
                RowBounds::AtLeast(0.0),
                [
                    (self.var(HourlyQuantity::DacTotalSteam), per_slice),
                    (
                        self.variables
                            .slice(SliceQuantity::DacSteam, HourSlice::new(self.hour, slice)),
                        -1.0,
                    ),
                ],
            );
        }
    }

    fn add_variable_cost_constraints(&self, constraints: &mut ConstraintSet) {
        let costs = &self.model.coefficients.costs;
        for (vom, coeff) in [
            (HourlyQuantity::NgccVom, costs.ngcc_vom),
            (HourlyQuantity::PccVom, costs.pcc_vom),
            (HourlyQuantity::PccCompressionVom, costs.pcc_compression_vom),
        ] {
            self.add_proportional(
                constraints,
                ConstraintFamily::VariableCost,
                vom,
                coeff,
                HourlyQuantity::Load,
            );
        }

        for (vom, coeff) in [
            (HourlyQuantity::DacVom, costs.dac_vom.value()),
            (
                HourlyQuantity::DacCompressionVom,
                costs.dac_compression_vom.value(),
            ),
        ] {
            constraints.add(
                ConstraintFamily::VariableCost,
                RowBounds::Equal(0.0),
                [(self.var(vom), 1.0)]
                    .into_iter()
                    .chain(self.slice_sum(SliceQuantity::DacCo2, -coeff)),
            );
        }
    }
}
