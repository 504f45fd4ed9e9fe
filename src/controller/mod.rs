// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Complete wind turbine controller, running the power manager, the torque-pitch manager and the
//! speed control loops once per sampling interval.
//!
//! The order of the components in [`Controller::step`] matters: the later components use the
//! outputs of the earlier ones as limits. The torque-pitch manager and the gain schedules use the
//! control loop outputs from the previous cycle.

pub mod builder;
pub mod input;
pub mod output;
pub mod prelude;

use input::ControllerInput;
use output::ControllerOutput;

use stormath::type_aliases::Float;

use crate::common_utils::saturate;
use crate::control_loop::{ControlLoop, ControlLoopInput, SchedulingSignal};
use crate::estimators::prelude::*;
use crate::filters::FilterChain;
use crate::power_manager::{PowerManager, PowerManagerInput};
use crate::signals::{signal_names, split_block, SignalError, SignalSource};
use crate::torque_pitch_manager::{TorquePitchManager, TorquePitchManagerInput};

/// Largest torque from the nacelle pitch compensation, as a fraction of the torque control output
pub const NACELLE_PITCH_TORQUE_FRACTION: Float = 0.6;

signal_names! {
    pub enum ControllerSignal {
        TorqueFromTorqueControl => "torque demand from torque control",
        TorqueFromDrivetrainDamper => "torque demand from drivetrain damper",
        MinimumPitch => "minimum pitch",
        MaximumPitch => "maximum pitch",
        MaximumTorque => "maximum torque",
        MinimumTorque => "minimum torque",
        MaximumTorqueFromPowerManager => "maximum torque from power manager",
        MinimumPitchFromPowerManager => "minimum pitch from power manager",
        TorqueFromNacellePitch => "torque from nacelle pitch",
        ThrustLimit => "thrust limit",
        CollectivePitchDemand => "collective pitch demand",
        BelowRatedTorque => "below rated torque",
        TipSpeedRatio => "tip-speed ratio",
        MinimumPitchFromThrustLimiter => "minimum pitch from thrust limiter",
    }
}

signal_names! {
    /// Sub-components reachable with `"<block>><signal>"`
    pub enum ControllerBlock {
        PowerManager => "power manager",
        TorquePitchManager => "torque-pitch manager",
        DrivetrainDamper => "drivetrain damper",
        TorqueControl => "torque control",
        CollectivePitchControl => "collective pitch control",
        TipSpeedRatioEstimator => "tip-speed ratio estimator",
        ThrustLimiter => "thrust limiter",
        ThrustLimitEstimator => "thrust limit estimator",
    }
}

#[derive(Debug, Clone)]
/// Estimators and limiter that turn the turret displacement into a minimum pitch
pub struct ThrustLimitation {
    pub tip_speed_ratio_estimator: TipSpeedRatioEstimator,
    pub thrust_limit_estimator: ThrustLimitEstimator,
    pub thrust_limiter: ThrustLimiter,
}

#[derive(Debug, Default, Clone, Copy)]
/// Intermediate values of the last cycle
struct ControllerValues {
    torque_from_torque_control: Float,
    torque_from_drivetrain_damper: Float,
    torque_from_nacelle_pitch: Float,
    minimum_pitch: Float,
    maximum_pitch: Float,
    minimum_torque: Float,
    maximum_torque: Float,
    maximum_torque_from_power_manager: Float,
    minimum_pitch_from_power_manager: Float,
    minimum_pitch_from_thrust_limiter: Float,
    below_rated_torque: Float,
    thrust_limit: Float,
    tip_speed_ratio: Float,
    torque_demand: Float,
    collective_pitch_demand: Float,
}

#[derive(Debug, Clone)]
pub struct Controller {
    pub(crate) power_manager: PowerManager,
    pub(crate) torque_pitch_manager: TorquePitchManager,
    pub(crate) drivetrain_damper: Option<ControlLoop>,
    pub(crate) torque_control: ControlLoop,
    pub(crate) collective_pitch_control: ControlLoop,
    /// Transfer function from nacelle pitch, in rad, to a torque correction, in kNm
    pub(crate) nacelle_pitch_compensation: Option<FilterChain>,
    pub(crate) thrust_limitation: Option<ThrustLimitation>,
    values: ControllerValues,
}

impl Controller {
    pub(crate) fn new(
        power_manager: PowerManager,
        torque_pitch_manager: TorquePitchManager,
        drivetrain_damper: Option<ControlLoop>,
        torque_control: ControlLoop,
        collective_pitch_control: ControlLoop,
        nacelle_pitch_compensation: Option<FilterChain>,
        thrust_limitation: Option<ThrustLimitation>,
    ) -> Self {
        Self {
            power_manager,
            torque_pitch_manager,
            drivetrain_damper,
            torque_control,
            collective_pitch_control,
            nacelle_pitch_compensation,
            thrust_limitation,
            values: ControllerValues::default(),
        }
    }

    /// Value of a scheduling signal at the start of the cycle
    fn scheduling_value(&self, signal: SchedulingSignal, input: &ControllerInput) -> Float {
        match signal {
            SchedulingSignal::CollectivePitchDemand => self.values.collective_pitch_demand,
            SchedulingSignal::TorqueFromTorqueControl => self.values.torque_from_torque_control,
            SchedulingSignal::GeneratorSpeed => input.generator_speed,
        }
    }

    /// Runs one control cycle
    pub fn step(&mut self, input: &ControllerInput) -> ControllerOutput {
        // Scheduling signals are taken before any loop runs, so that all loops see the same cycle
        let torque_control_schedule = self.scheduling_value(
            self.torque_control.scheduling_signal(), input
        );
        let pitch_control_schedule = self.scheduling_value(
            self.collective_pitch_control.scheduling_signal(), input
        );
        let damper_schedule = match &self.drivetrain_damper {
            Some(damper) => self.scheduling_value(damper.scheduling_signal(), input),
            None => 0.0,
        };

        let previous_torque = self.values.torque_from_torque_control;
        let previous_pitch = self.values.collective_pitch_demand;

        let mut values = self.values;

        // Thrust limitation
        match &mut self.thrust_limitation {
            Some(limitation) => {
                values.tip_speed_ratio = limitation.tip_speed_ratio_estimator.step(
                    input.generator_speed,
                    input.generator_torque,
                    input.collective_pitch_angle,
                );

                let estimated_limit = limitation.thrust_limit_estimator.step(&ThrustLimitEstimatorInput {
                    turret_x: input.turret_x,
                    turret_y: input.turret_y,
                    nacelle_yaw: input.nacelle_yaw,
                    thrust: input.thrust,
                });

                values.thrust_limit = estimated_limit.min(input.external_maximum_thrust);

                values.minimum_pitch_from_thrust_limiter = limitation.thrust_limiter.step(
                    values.tip_speed_ratio,
                    limitation.tip_speed_ratio_estimator.rotor_speed(),
                    values.thrust_limit,
                );
            },
            None => {
                values.tip_speed_ratio = 0.0;
                values.thrust_limit = input.external_maximum_thrust;
                values.minimum_pitch_from_thrust_limiter = Float::NEG_INFINITY;
            }
        }

        // Power manager
        let power = self.power_manager.step(&PowerManagerInput {
            derating_ratio: input.derating_ratio,
            maximum_speed: input.maximum_speed,
            measured_speed: input.generator_speed,
            maximum_power: input.maximum_power,
            reserve_power: input.reserve_power,
        });

        values.maximum_torque_from_power_manager = power.maximum_torque;
        values.minimum_pitch_from_power_manager = power.minimum_pitch;
        values.below_rated_torque = power.below_rated_torque;

        let merged_minimum_pitch = power.minimum_pitch
            .max(input.external_minimum_pitch)
            .max(values.minimum_pitch_from_thrust_limiter);

        values.maximum_torque = power.maximum_torque.min(input.external_maximum_torque);

        // Torque-pitch manager, with the loop outputs of the previous cycle
        let limits = self.torque_pitch_manager.step(&TorquePitchManagerInput {
            torque: previous_torque,
            maximum_torque: values.maximum_torque,
            external_minimum_torque: input.external_minimum_torque,
            pitch_from_speed: previous_pitch,
            pitch_from_platform: 0.0,
            external_maximum_pitch: input.external_maximum_pitch,
            external_minimum_pitch: merged_minimum_pitch,
        });

        values.minimum_pitch = limits.minimum_pitch;
        values.maximum_pitch = limits.maximum_pitch;
        values.minimum_torque = limits.minimum_torque;

        // Drivetrain damper
        values.torque_from_drivetrain_damper = match &mut self.drivetrain_damper {
            Some(damper) => damper.step(&ControlLoopInput {
                setpoint: 0.0,
                measurement: input.generator_speed,
                minimum_output: -input.external_maximum_torque,
                maximum_output: input.external_maximum_torque,
                scheduling_signal: damper_schedule,
                post_gain_limits: None,
            }),
            None => 0.0,
        };

        // Torque control
        values.torque_from_torque_control = self.torque_control.step(&ControlLoopInput {
            setpoint: input.maximum_speed,
            measurement: input.generator_speed,
            minimum_output: values.minimum_torque,
            maximum_output: values.maximum_torque,
            scheduling_signal: torque_control_schedule,
            post_gain_limits: None,
        });

        // Nacelle pitch compensation
        values.torque_from_nacelle_pitch = match &mut self.nacelle_pitch_compensation {
            Some(filter) => {
                let limit = NACELLE_PITCH_TORQUE_FRACTION * values.torque_from_torque_control.abs();

                saturate(filter.step(input.nacelle_pitch), -limit, limit)
            },
            None => 0.0,
        };

        values.torque_demand = values.torque_from_drivetrain_damper
            + values.torque_from_torque_control
            - values.torque_from_nacelle_pitch;

        // Collective pitch control
        values.collective_pitch_demand = self.collective_pitch_control.step(&ControlLoopInput {
            setpoint: input.maximum_speed,
            measurement: input.generator_speed,
            minimum_output: values.minimum_pitch,
            maximum_output: values.maximum_pitch,
            scheduling_signal: pitch_control_schedule,
            post_gain_limits: Some((
                input.external_minimum_pitch_rate,
                input.external_maximum_pitch_rate
            )),
        });

        self.values = values;

        ControllerOutput {
            torque_demand: values.torque_demand,
            collective_pitch_demand: values.collective_pitch_demand,
            state: limits.state,
        }
    }

    pub fn signal_value(&self, signal: ControllerSignal) -> Float {
        let values = &self.values;

        match signal {
            ControllerSignal::TorqueFromTorqueControl => values.torque_from_torque_control,
            ControllerSignal::TorqueFromDrivetrainDamper => values.torque_from_drivetrain_damper,
            ControllerSignal::MinimumPitch => values.minimum_pitch,
            ControllerSignal::MaximumPitch => values.maximum_pitch,
            ControllerSignal::MaximumTorque => values.maximum_torque,
            ControllerSignal::MinimumTorque => values.minimum_torque,
            ControllerSignal::MaximumTorqueFromPowerManager => values.maximum_torque_from_power_manager,
            ControllerSignal::MinimumPitchFromPowerManager => values.minimum_pitch_from_power_manager,
            ControllerSignal::TorqueFromNacellePitch => values.torque_from_nacelle_pitch,
            ControllerSignal::ThrustLimit => values.thrust_limit,
            ControllerSignal::CollectivePitchDemand => values.collective_pitch_demand,
            ControllerSignal::BelowRatedTorque => values.below_rated_torque,
            ControllerSignal::TipSpeedRatio => values.tip_speed_ratio,
            ControllerSignal::MinimumPitchFromThrustLimiter => values.minimum_pitch_from_thrust_limiter,
        }
    }

    /// The sub-component behind a block name, if it is configured
    fn block(&self, block: ControllerBlock) -> Option<&dyn SignalSource> {
        let limitation = self.thrust_limitation.as_ref();

        match block {
            ControllerBlock::PowerManager => Some(&self.power_manager),
            ControllerBlock::TorquePitchManager => Some(&self.torque_pitch_manager),
            ControllerBlock::DrivetrainDamper => {
                self.drivetrain_damper.as_ref().map(|damper| damper as &dyn SignalSource)
            },
            ControllerBlock::TorqueControl => Some(&self.torque_control),
            ControllerBlock::CollectivePitchControl => Some(&self.collective_pitch_control),
            ControllerBlock::TipSpeedRatioEstimator => {
                limitation.map(|l| &l.tip_speed_ratio_estimator as &dyn SignalSource)
            },
            ControllerBlock::ThrustLimiter => {
                limitation.map(|l| &l.thrust_limiter as &dyn SignalSource)
            },
            ControllerBlock::ThrustLimitEstimator => {
                limitation.map(|l| &l.thrust_limit_estimator as &dyn SignalSource)
            },
        }
    }
}

impl SignalSource for Controller {
    fn get_output(&self, name: &str) -> Result<Float, SignalError> {
        if let Some(signal) = ControllerSignal::from_name(name) {
            return Ok(self.signal_value(signal));
        }

        let (block_name, signal_name) = split_block(name).ok_or(SignalError::InvalidSignal)?;

        let block = ControllerBlock::from_name(block_name)
            .and_then(|block| self.block(block))
            .ok_or(SignalError::InvalidBlock)?;

        block.get_output(signal_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::control_loop::builder::ControlLoopBuilder;
    use crate::filters::builder::{FilterChainBuilder, SectionShape};
    use crate::power_manager::{builder::PowerManagerBuilder, PowerCeiling};
    use crate::tables::{LookupTable1D, LookupTableData};

    use super::builder::ControllerBuilder;

    fn simple_controller() -> Controller {
        simple_builder().build().unwrap()
    }

    fn simple_builder() -> ControllerBuilder {
        ControllerBuilder {
            sampling_interval: 0.0125,
            power_manager: PowerManagerBuilder {
                ceiling: PowerCeiling::RatedPower { rated_power: 5000.0, efficiency: 1.0 },
                ..Default::default()
            },
            torque_control: ControlLoopBuilder {
                error_filter: FilterChainBuilder::from_shapes(&[
                    SectionShape::ProportionalIntegral { kp: -6.0, ki: -4.0 }
                ]),
                post_gain_filter: FilterChainBuilder::from_shapes(&[SectionShape::Accumulator]),
                ..Default::default()
            },
            collective_pitch_control: ControlLoopBuilder {
                error_filter: FilterChainBuilder::from_shapes(&[
                    SectionShape::ProportionalIntegralRate { kp: -0.5, ki: -0.2 }
                ]),
                post_gain_filter: FilterChainBuilder::from_shapes(&[SectionShape::Integrator]),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn above_rated() -> ControllerInput {
        ControllerInput {
            generator_speed: 110.0,
            maximum_speed: 100.0,
            ..Default::default()
        }
    }

    #[test]
    fn torque_saturates_at_power_ceiling_before_pitching() {
        let mut controller = simple_controller();

        let input = ControllerInput {
            generator_speed: 110.0,
            maximum_speed: 100.0,
            ..Default::default()
        };

        let mut output = ControllerOutput::default();

        for _ in 0..20 {
            output = controller.step(&input);

            assert!(output.torque_demand >= 0.0);
            assert!(output.torque_demand <= 50.0 + 1e-9);
        }

        assert_eq!(controller.get_output("maximum torque"), Ok(50.0));
        assert_eq!(output.torque_demand, 50.0);
        assert!(output.collective_pitch_demand > 0.0);
    }

    #[test]
    fn pitch_stays_at_minimum_below_rated() {
        let mut controller = simple_controller();

        let input = ControllerInput {
            generator_speed: 90.0,
            maximum_speed: 100.0,
            external_minimum_pitch: 1.5,
            ..Default::default()
        };

        for _ in 0..50 {
            let output = controller.step(&input);

            assert_eq!(output.collective_pitch_demand, 1.5);
        }

        assert_eq!(controller.get_output("minimum pitch"), Ok(1.5));
    }

    #[test]
    fn block_routing() {
        let mut controller = simple_controller();

        controller.step(&ControllerInput {
            generator_speed: 90.0,
            maximum_speed: 100.0,
            ..Default::default()
        });

        assert_eq!(controller.get_output("torque control>setpoint"), Ok(100.0));
        assert_eq!(controller.get_output("power manager>maximum torque"), Ok(50.0));
        assert_eq!(controller.get_output("torque-pitch manager>state"), Ok(0.0));
        assert_eq!(controller.get_output("torque control>nothing"), Err(SignalError::InvalidSignal));
        assert_eq!(controller.get_output("gearbox>ratio"), Err(SignalError::InvalidBlock));
        assert_eq!(controller.get_output("drivetrain damper>gain"), Err(SignalError::InvalidBlock));
        assert_eq!(controller.get_output("thrust limiter>minimum pitch"), Err(SignalError::InvalidBlock));
        assert_eq!(controller.get_output("rotor speed"), Err(SignalError::InvalidSignal));
    }

    #[test]
    fn nacelle_pitch_torque_is_limited() {
        let mut controller = ControllerBuilder {
            nacelle_pitch_compensation: Some(FilterChainBuilder::from_shapes(&[
                SectionShape::Gain { value: 1000.0 }
            ])),
            ..Default::default()
        }.build().unwrap();

        let input = ControllerInput {
            generator_speed: 0.0,
            maximum_speed: 1.0,
            external_minimum_torque: 10.0,
            nacelle_pitch: 0.1,
            ..Default::default()
        };

        let output = controller.step(&input);

        // Zero rated power, so torque control is pinned at the external minimum torque
        assert_eq!(controller.get_output("torque demand from torque control"), Ok(10.0));
        assert_eq!(controller.get_output("torque from nacelle pitch"), Ok(6.0));
        assert_eq!(output.torque_demand, 4.0);
    }

    #[test]
    fn pitch_gain_is_scheduled_on_previous_pitch_demand() {
        let schedule = LookupTableData::new(&[0.0, 10.0], &[1.0, 0.5]);

        let mut builder = simple_builder();
        builder.collective_pitch_control.gain_schedule = Some(schedule.clone());
        builder.collective_pitch_control.scheduling_signal = SchedulingSignal::CollectivePitchDemand;

        let mut controller = builder.build().unwrap();
        let table = schedule.build().unwrap();

        let mut largest_previous_pitch: Float = 0.0;

        for _ in 0..60 {
            let previous_pitch = controller.get_output("collective pitch demand").unwrap();

            controller.step(&above_rated());

            assert_eq!(
                controller.get_output("collective pitch control>gain"),
                Ok(table.eval(previous_pitch))
            );

            largest_previous_pitch = largest_previous_pitch.max(previous_pitch);
        }

        assert!(largest_previous_pitch > 0.0);
    }

    #[test]
    fn torque_gain_is_scheduled_on_previous_torque() {
        let table = LookupTable1D::new(&[0.0, 100.0], &[1.0, 2.0]).unwrap();

        let mut builder = simple_builder();
        builder.torque_control.gain_schedule = Some(LookupTableData::new(&[0.0, 100.0], &[1.0, 2.0]));
        builder.torque_control.scheduling_signal = SchedulingSignal::TorqueFromTorqueControl;

        let mut controller = builder.build().unwrap();

        let mut largest_previous_torque: Float = 0.0;

        for _ in 0..20 {
            let previous_torque = controller.get_output("torque demand from torque control").unwrap();

            controller.step(&above_rated());

            assert_eq!(
                controller.get_output("torque control>gain"),
                Ok(table.eval(previous_torque))
            );

            largest_previous_torque = largest_previous_torque.max(previous_torque);
        }

        assert_eq!(largest_previous_torque, 50.0);
    }

    #[test]
    fn nan_generator_speed_does_not_panic() {
        let mut builder = simple_builder();
        builder.collective_pitch_control.gain_schedule = Some(
            LookupTableData::new(&[90.0, 100.0, 110.0], &[1.0, 0.8, 0.6])
        );
        builder.collective_pitch_control.scheduling_signal = SchedulingSignal::GeneratorSpeed;
        builder.power_manager.minimum_pitch_from_generator_speed = Some(
            LookupTableData::new(&[90.0, 100.0, 110.0], &[0.0, 1.0, 2.0])
        );

        let mut controller = builder.build().unwrap();

        controller.step(&ControllerInput {
            generator_speed: Float::NAN,
            ..above_rated()
        });

        let gain = controller.get_output("collective pitch control>gain").unwrap();

        assert!(gain.is_nan());
    }
}
