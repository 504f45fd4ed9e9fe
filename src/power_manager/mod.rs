// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Conversion of power commands into a torque ceiling, a preferred below rated torque and a
//! minimum pitch angle.

pub mod builder;

use serde::{Deserialize, Serialize};

use stormath::type_aliases::Float;

use crate::common_utils::{limit_change, SPEED_EPSILON};
use crate::filters::FilterChain;
use crate::signals::{leaf_lookup, signal_names, SignalError, SignalSource};
use crate::tables::LookupTable1D;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// How the maximum torque is computed
pub enum PowerCeiling {
    /// `(1 - derating ratio) · rated power / maximum speed / efficiency`, with power in kW
    RatedPower {
        rated_power: Float,
        efficiency: Float,
    },
    /// `(maximum power - reserve power) / maximum speed`, or zero when the maximum speed is not
    /// positive
    PowerCommand,
}

impl Default for PowerCeiling {
    fn default() -> Self {
        PowerCeiling::RatedPower {
            rated_power: 0.0,
            efficiency: 1.0,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PowerManagerInput {
    /// Fraction of the producible power to withhold
    pub derating_ratio: Float,
    /// Generator speed setpoint, in rad/s
    pub maximum_speed: Float,
    /// Measured generator speed, in rad/s
    pub measured_speed: Float,
    /// Power command, in kW. Only used with [`PowerCeiling::PowerCommand`]
    pub maximum_power: Float,
    /// Power to keep in reserve, in kW. Only used with [`PowerCeiling::PowerCommand`]
    pub reserve_power: Float,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PowerManagerOutput {
    /// Upper torque limit, in kNm
    pub maximum_torque: Float,
    /// Preferred torque below rated wind speed, in kNm
    pub below_rated_torque: Float,
    /// Lower pitch limit, in degrees. Negative infinity when no minimum pitch table is configured.
    pub minimum_pitch: Float,
}

signal_names! {
    pub enum PowerManagerSignal {
        DeratingRatio => "derating ratio",
        MaximumSpeed => "maximum speed",
        MeasuredSpeed => "measured speed",
        MaximumTorque => "maximum torque",
        BelowRatedTorque => "below rated torque",
        MinimumPitch => "minimum pitch",
        MinimumPitchFromDerating => "minimum pitch from derating",
        MinimumPitchFromGeneratorSpeed => "minimum pitch from generator speed",
        FilteredGeneratorSpeed => "filtered generator speed",
        PowerLimit => "power limit",
        MaximumPower => "maximum power",
        ReservePower => "reserve power",
    }
}

#[derive(Debug, Clone)]
pub struct PowerManager {
    ceiling: PowerCeiling,
    below_rated_torque_gain: Option<LookupTable1D>,
    minimum_pitch_from_derating: Option<LookupTable1D>,
    minimum_pitch_from_generator_speed: Option<LookupTable1D>,
    generator_speed_filter: FilterChain,
    /// Limits on the change of the generator speed minimum pitch per step, in degrees
    pitch_change_limits: (Float, Float),
    input: PowerManagerInput,
    output: PowerManagerOutput,
    power_limit: Float,
    pitch_from_derating: Float,
    pitch_from_generator_speed: Float,
    filtered_generator_speed: Float,
}

impl PowerManager {
    pub fn step(&mut self, input: &PowerManagerInput) -> PowerManagerOutput {
        self.input = *input;

        let maximum_torque = match self.ceiling {
            PowerCeiling::RatedPower { rated_power, efficiency } => {
                self.power_limit = (1.0 - input.derating_ratio) * rated_power;

                self.power_limit / input.maximum_speed.max(SPEED_EPSILON) / efficiency
            },
            PowerCeiling::PowerCommand => {
                self.power_limit = input.maximum_power - input.reserve_power;

                if input.maximum_speed > 0.0 {
                    self.power_limit / input.maximum_speed
                } else {
                    0.0
                }
            },
        };

        let below_rated_torque = match &self.below_rated_torque_gain {
            Some(table) => table.eval(input.derating_ratio) * input.measured_speed * input.measured_speed,
            None => 0.0,
        };

        self.pitch_from_derating = match &self.minimum_pitch_from_derating {
            Some(table) => table.eval(input.derating_ratio),
            None => Float::NEG_INFINITY,
        };

        self.filtered_generator_speed = self.generator_speed_filter.step(input.measured_speed);

        if let Some(table) = &self.minimum_pitch_from_generator_speed {
            let target = table.eval(self.filtered_generator_speed);

            self.pitch_from_generator_speed = limit_change(
                self.pitch_from_generator_speed,
                target,
                self.pitch_change_limits.0,
                self.pitch_change_limits.1,
            );
        }

        let minimum_pitch = self.pitch_from_derating.max(self.pitch_from_generator_speed);

        self.output = PowerManagerOutput {
            maximum_torque,
            below_rated_torque,
            minimum_pitch,
        };

        self.output
    }

    pub fn output(&self) -> PowerManagerOutput {
        self.output
    }

    pub fn signal_value(&self, signal: PowerManagerSignal) -> Float {
        match signal {
            PowerManagerSignal::DeratingRatio => self.input.derating_ratio,
            PowerManagerSignal::MaximumSpeed => self.input.maximum_speed,
            PowerManagerSignal::MeasuredSpeed => self.input.measured_speed,
            PowerManagerSignal::MaximumTorque => self.output.maximum_torque,
            PowerManagerSignal::BelowRatedTorque => self.output.below_rated_torque,
            PowerManagerSignal::MinimumPitch => self.output.minimum_pitch,
            PowerManagerSignal::MinimumPitchFromDerating => self.pitch_from_derating,
            PowerManagerSignal::MinimumPitchFromGeneratorSpeed => self.pitch_from_generator_speed,
            PowerManagerSignal::FilteredGeneratorSpeed => self.filtered_generator_speed,
            PowerManagerSignal::PowerLimit => self.power_limit,
            PowerManagerSignal::MaximumPower => self.input.maximum_power,
            PowerManagerSignal::ReservePower => self.input.reserve_power,
        }
    }
}

impl SignalSource for PowerManager {
    fn get_output(&self, name: &str) -> Result<Float, SignalError> {
        leaf_lookup(name, PowerManagerSignal::from_name, |signal| self.signal_value(signal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::tables::LookupTableData;

    use super::builder::PowerManagerBuilder;

    const SAMPLING_INTERVAL: Float = 0.0125;

    #[test]
    fn rated_power_ceiling() {
        let mut power_manager = PowerManagerBuilder {
            ceiling: PowerCeiling::RatedPower { rated_power: 5000.0, efficiency: 0.944 },
            below_rated_torque_gain: Some(LookupTableData::new(&[0.0, 1.0], &[2.0, 1.0])),
            ..Default::default()
        }.build(SAMPLING_INTERVAL).unwrap();

        let output = power_manager.step(&PowerManagerInput {
            derating_ratio: 0.2,
            maximum_speed: 120.0,
            measured_speed: 100.0,
            ..Default::default()
        });

        let expected_torque = 0.8 * 5000.0 / 120.0 / 0.944;

        assert!((output.maximum_torque - expected_torque).abs() < 1e-9);
        assert!((output.below_rated_torque - 1.8 * 100.0 * 100.0).abs() < 1e-6);
        assert_eq!(output.minimum_pitch, Float::NEG_INFINITY);
    }

    #[test]
    fn zero_speed_does_not_divide_by_zero() {
        let mut power_manager = PowerManagerBuilder {
            ceiling: PowerCeiling::RatedPower { rated_power: 5000.0, efficiency: 1.0 },
            ..Default::default()
        }.build(SAMPLING_INTERVAL).unwrap();

        let output = power_manager.step(&PowerManagerInput::default());

        assert!(output.maximum_torque.is_finite());

        let mut power_manager = PowerManagerBuilder {
            ceiling: PowerCeiling::PowerCommand,
            ..Default::default()
        }.build(SAMPLING_INTERVAL).unwrap();

        let output = power_manager.step(&PowerManagerInput {
            maximum_power: 3000.0,
            reserve_power: 500.0,
            ..Default::default()
        });

        assert_eq!(output.maximum_torque, 0.0);
        assert_eq!(power_manager.get_output("power limit"), Ok(2500.0));

        let output = power_manager.step(&PowerManagerInput {
            maximum_power: 3000.0,
            reserve_power: 500.0,
            maximum_speed: 100.0,
            ..Default::default()
        });

        assert_eq!(output.maximum_torque, 25.0);
    }

    #[test]
    fn generator_speed_pitch_is_slew_limited() {
        let max_rate = 2.0;

        let mut power_manager = PowerManagerBuilder {
            minimum_pitch_from_derating: Some(LookupTableData::constant(-5.0)),
            minimum_pitch_from_generator_speed: Some(
                LookupTableData::new(&[100.0, 110.0], &[0.0, 4.0])
            ),
            generator_speed_pitch_min_rate: Some(-1.0),
            generator_speed_pitch_max_rate: Some(max_rate),
            ..Default::default()
        }.build(SAMPLING_INTERVAL).unwrap();

        let step_input = PowerManagerInput {
            measured_speed: 110.0,
            ..Default::default()
        };

        let mut previous = 0.0;
        let mut nr_steps = 0;

        loop {
            power_manager.step(&step_input);

            let current = power_manager.get_output("minimum pitch from generator speed").unwrap();

            assert!(current - previous <= max_rate * SAMPLING_INTERVAL + 1e-12);

            previous = current;
            nr_steps += 1;

            if (current - 4.0).abs() < 1e-12 {
                break;
            }

            assert!(nr_steps < 1000);
        }

        assert_eq!(nr_steps, 160);
        assert!((power_manager.output().minimum_pitch - 4.0).abs() < 1e-12);
    }

    #[test]
    fn absent_generator_speed_table_imposes_no_floor() {
        let mut power_manager = PowerManagerBuilder {
            minimum_pitch_from_derating: Some(LookupTableData::constant(-5.0)),
            ..Default::default()
        }.build(SAMPLING_INTERVAL).unwrap();

        for name in ["minimum pitch from generator speed", "minimum pitch from derating"] {
            let before = power_manager.get_output(name).unwrap();

            assert!(before.is_infinite() && before < 0.0, "{}: {}", name, before);
        }

        let output = power_manager.step(&PowerManagerInput {
            measured_speed: 110.0,
            ..Default::default()
        });

        assert_eq!(
            power_manager.get_output("minimum pitch from generator speed"),
            Ok(Float::NEG_INFINITY)
        );
        assert_eq!(output.minimum_pitch, -5.0);
    }

    #[test]
    fn unknown_names() {
        let power_manager = PowerManagerBuilder::default().build(SAMPLING_INTERVAL).unwrap();

        assert_eq!(power_manager.get_output("maximum pitch"), Err(SignalError::InvalidSignal));
        assert_eq!(power_manager.get_output("filter>output"), Err(SignalError::InvalidBlock));
    }
}
