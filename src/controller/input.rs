// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

use serde::{Deserialize, Serialize};

use stormath::type_aliases::Float;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
/// Measurements and external commands for one controller cycle. Torques are in kNm, pitch angles
/// in degrees, speeds in rad/s, powers in kW and thrusts in kN.
pub struct ControllerInput {
    /// Measured generator speed
    pub generator_speed: Float,
    /// Generator speed setpoint
    pub maximum_speed: Float,
    /// Fraction of the producible power to withhold
    pub derating_ratio: Float,
    /// Power command, used when the power manager works from a power command
    pub maximum_power: Float,
    pub reserve_power: Float,
    pub external_maximum_torque: Float,
    pub external_minimum_torque: Float,
    pub external_maximum_pitch: Float,
    pub external_minimum_pitch: Float,
    /// Lowest allowed pitch rate, in deg/s. Normally negative.
    pub external_minimum_pitch_rate: Float,
    /// Highest allowed pitch rate, in deg/s
    pub external_maximum_pitch_rate: Float,
    /// Measured generator torque
    pub generator_torque: Float,
    /// Measured collective pitch angle
    pub collective_pitch_angle: Float,
    /// Nacelle pitch angle, in rad
    pub nacelle_pitch: Float,
    /// Turret position, in m
    pub turret_x: Float,
    pub turret_y: Float,
    /// Absolute nacelle yaw angle, in rad
    pub nacelle_yaw: Float,
    /// Observed rotor thrust
    pub thrust: Float,
    pub external_maximum_thrust: Float,
}

impl Default for ControllerInput {
    /// No external restrictions on torque, pitch, pitch rate and thrust. All measurements zero.
    fn default() -> Self {
        Self {
            generator_speed: 0.0,
            maximum_speed: 0.0,
            derating_ratio: 0.0,
            maximum_power: 0.0,
            reserve_power: 0.0,
            external_maximum_torque: Float::MAX,
            external_minimum_torque: 0.0,
            external_maximum_pitch: 90.0,
            external_minimum_pitch: 0.0,
            external_minimum_pitch_rate: -Float::MAX,
            external_maximum_pitch_rate: Float::MAX,
            generator_torque: 0.0,
            collective_pitch_angle: 0.0,
            nacelle_pitch: 0.0,
            turret_x: 0.0,
            turret_y: 0.0,
            nacelle_yaw: 0.0,
            thrust: 0.0,
            external_maximum_thrust: Float::MAX,
        }
    }
}
