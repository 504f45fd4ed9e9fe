// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Generic error-feedback block used for the drivetrain damper, the torque controller and the
//! collective pitch controller.
//!
//! The signal path is:
//!
//! ```text
//! measurement -> [measurement filter] -+
//!                                      v
//! setpoint --------------------------> (-) -> [error filter] -> (x gain) -> [post-gain filter] -> clamp
//! ```
//!
//! The clamp to the dynamic output bounds is the anti-windup mechanism. The clamped output is
//! written back into the last post-gain section, so an integrator there never runs beyond the
//! bounds.

pub mod builder;

use serde::{Deserialize, Serialize};

use stormath::type_aliases::Float;

use crate::common_utils::saturate;
use crate::filters::FilterChain;
use crate::signals::{leaf_lookup, signal_names, SignalError, SignalSource};
use crate::tables::LookupTable1D;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Controller signal that drives the gain schedule of a control loop. The controller supplies
/// the value every cycle.
pub enum SchedulingSignal {
    /// Collective pitch demand from the previous cycle
    #[default]
    CollectivePitchDemand,
    /// Output of the torque control loop from the previous cycle
    TorqueFromTorqueControl,
    /// Measured generator speed of the current cycle
    GeneratorSpeed,
}

#[derive(Debug, Default, Clone, Copy)]
/// Input to a single step of a control loop
pub struct ControlLoopInput {
    pub setpoint: Float,
    pub measurement: Float,
    pub minimum_output: Float,
    pub maximum_output: Float,
    /// Value used to look up the gain in the gain schedule. Ignored without a schedule.
    pub scheduling_signal: Float,
    /// Optional lower and upper limits on the value entering the post-gain filter, e.g. rate
    /// limits in front of an integrator.
    pub post_gain_limits: Option<(Float, Float)>,
}

signal_names! {
    pub enum ControlLoopSignal {
        Setpoint => "setpoint",
        Measurement => "measurement",
        FilteredMeasurement => "filtered measurement",
        Error => "error",
        FilteredError => "filtered error",
        Gain => "gain",
        PostGainValue => "post-gain value",
        ControlAction => "control action",
        MinimumControlAction => "minimum control action",
        MaximumControlAction => "maximum control action",
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct ControlLoopValues {
    setpoint: Float,
    measurement: Float,
    filtered_measurement: Float,
    error: Float,
    filtered_error: Float,
    gain: Float,
    post_gain_value: Float,
    control_action: Float,
    minimum_control_action: Float,
    maximum_control_action: Float,
}

#[derive(Debug, Clone)]
pub struct ControlLoop {
    measurement_filter: FilterChain,
    error_filter: FilterChain,
    post_gain_filter: FilterChain,
    gain_schedule: Option<LookupTable1D>,
    scheduling_signal: SchedulingSignal,
    values: ControlLoopValues,
}

impl ControlLoop {
    pub fn new(
        measurement_filter: FilterChain,
        error_filter: FilterChain,
        post_gain_filter: FilterChain,
        gain_schedule: Option<LookupTable1D>,
        scheduling_signal: SchedulingSignal,
    ) -> Self {
        Self {
            measurement_filter,
            error_filter,
            post_gain_filter,
            gain_schedule,
            scheduling_signal,
            values: ControlLoopValues::default(),
        }
    }

    /// The controller signal this loop expects in [`ControlLoopInput::scheduling_signal`]
    pub fn scheduling_signal(&self) -> SchedulingSignal {
        self.scheduling_signal
    }

    pub fn has_gain_schedule(&self) -> bool {
        self.gain_schedule.is_some()
    }

    /// Output of the last step
    pub fn control_action(&self) -> Float {
        self.values.control_action
    }

    pub fn step(&mut self, input: &ControlLoopInput) -> Float {
        let filtered_measurement = self.measurement_filter.step(input.measurement);

        let error = input.setpoint - filtered_measurement;

        let filtered_error = self.error_filter.step(error);

        let gain = match &self.gain_schedule {
            Some(schedule) => schedule.eval(input.scheduling_signal),
            None => 1.0,
        };

        let mut post_gain_value = gain * filtered_error;

        if let Some((lower, upper)) = input.post_gain_limits {
            post_gain_value = saturate(post_gain_value, lower, upper);
        }

        let unlimited_action = self.post_gain_filter.step(post_gain_value);

        let control_action = saturate(unlimited_action, input.minimum_output, input.maximum_output);

        if control_action != unlimited_action {
            self.post_gain_filter.override_output(control_action);
        }

        self.values = ControlLoopValues {
            setpoint: input.setpoint,
            measurement: input.measurement,
            filtered_measurement,
            error,
            filtered_error,
            gain,
            post_gain_value,
            control_action,
            minimum_control_action: input.minimum_output,
            maximum_control_action: input.maximum_output,
        };

        control_action
    }

    pub fn reset(&mut self) {
        self.measurement_filter.reset();
        self.error_filter.reset();
        self.post_gain_filter.reset();
        self.values = ControlLoopValues::default();
    }

    pub fn signal_value(&self, signal: ControlLoopSignal) -> Float {
        let values = &self.values;

        match signal {
            ControlLoopSignal::Setpoint => values.setpoint,
            ControlLoopSignal::Measurement => values.measurement,
            ControlLoopSignal::FilteredMeasurement => values.filtered_measurement,
            ControlLoopSignal::Error => values.error,
            ControlLoopSignal::FilteredError => values.filtered_error,
            ControlLoopSignal::Gain => values.gain,
            ControlLoopSignal::PostGainValue => values.post_gain_value,
            ControlLoopSignal::ControlAction => values.control_action,
            ControlLoopSignal::MinimumControlAction => values.minimum_control_action,
            ControlLoopSignal::MaximumControlAction => values.maximum_control_action,
        }
    }
}

impl SignalSource for ControlLoop {
    fn get_output(&self, name: &str) -> Result<Float, SignalError> {
        leaf_lookup(name, ControlLoopSignal::from_name, |signal| self.signal_value(signal))
    }
}
