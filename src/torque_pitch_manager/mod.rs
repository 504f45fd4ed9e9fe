// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Arbitration between the torque and the pitch speed controllers.
//!
//! Below rated, the torque controller regulates the speed and the pitch controller is pinned at
//! its current value from above. Above rated, the pitch controller regulates the speed and the
//! torque controller is pinned at its current value from below. The manager expresses this only
//! through the output limits given to the two control loops.

pub mod builder;

use serde::{Deserialize, Serialize};
use tracing::debug;

use stormath::type_aliases::Float;

use crate::common_utils::saturate;
use crate::signals::{leaf_lookup, signal_names, SignalError, SignalSource};
use crate::tables::LookupTable1D;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatingState {
    #[default]
    BelowRated,
    AboveRated,
}

impl OperatingState {
    /// Integer representation used in outputs and logs: 0 below rated, 1 above rated
    pub fn index(&self) -> i32 {
        match self {
            OperatingState::BelowRated => 0,
            OperatingState::AboveRated => 1,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TorquePitchManagerInput {
    /// Current torque demand from the torque controller, in kNm
    pub torque: Float,
    /// Maximum torque, in kNm
    pub maximum_torque: Float,
    /// External minimum torque, in kNm
    pub external_minimum_torque: Float,
    /// Pitch demand from the speed controller, in degrees
    pub pitch_from_speed: Float,
    /// Pitch demand from a platform stabilisation controller, in degrees. Zero when not used.
    pub pitch_from_platform: Float,
    pub external_maximum_pitch: Float,
    pub external_minimum_pitch: Float,
}

impl TorquePitchManagerInput {
    /// Total pitch demand
    pub fn pitch(&self) -> Float {
        self.pitch_from_speed + self.pitch_from_platform
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
/// Limits for the torque and pitch control loops
pub struct TorquePitchLimits {
    pub minimum_torque: Float,
    pub maximum_torque: Float,
    pub minimum_pitch: Float,
    pub maximum_pitch: Float,
    pub state: OperatingState,
}

signal_names! {
    pub enum TorquePitchManagerSignal {
        MinimumPitch => "minimum pitch",
        MaximumPitch => "maximum pitch",
        MinimumTorque => "minimum torque",
        ExternalMaximumPitch => "external maximum pitch",
        ExternalMinimumPitch => "external minimum pitch",
        Torque => "torque",
        Pitch => "pitch",
        PitchFromSpeed => "pitch from speed",
        PitchFromPlatform => "pitch from platform",
        ExternalMinimumTorque => "external minimum torque",
        MaximumTorque => "maximum torque",
        MinimumPitchFromPlatform => "minimum pitch from platform",
        MaximumPitchFromPlatform => "maximum pitch from platform",
        State => "state",
    }
}

#[derive(Debug, Clone, Default)]
pub struct TorquePitchManager {
    /// Minimum pitch as a function of the torque
    minimum_pitch_table: Option<LookupTable1D>,
    state: OperatingState,
    input: TorquePitchManagerInput,
    limits: TorquePitchLimits,
}

impl TorquePitchManager {
    pub fn new(minimum_pitch_table: Option<LookupTable1D>) -> Self {
        Self {
            minimum_pitch_table,
            ..Default::default()
        }
    }

    pub fn state(&self) -> OperatingState {
        self.state
    }

    pub fn limits(&self) -> TorquePitchLimits {
        self.limits
    }

    pub fn step(&mut self, input: &TorquePitchManagerInput) -> TorquePitchLimits {
        self.input = *input;

        let torque = input.torque;
        let pitch = input.pitch();

        let minimum_pitch = match &self.minimum_pitch_table {
            Some(table) => table.eval(torque).max(input.external_minimum_pitch),
            None => input.external_minimum_pitch,
        };

        let next_state = match self.state {
            OperatingState::BelowRated => {
                if torque >= input.maximum_torque || pitch > minimum_pitch {
                    OperatingState::AboveRated
                } else {
                    OperatingState::BelowRated
                }
            },
            OperatingState::AboveRated => {
                if pitch <= minimum_pitch {
                    OperatingState::BelowRated
                } else {
                    OperatingState::AboveRated
                }
            },
        };

        if next_state != self.state {
            debug!(
                from = self.state.index(),
                to = next_state.index(),
                torque,
                pitch,
                minimum_pitch,
                "torque-pitch manager state change"
            );

            self.state = next_state;
        }

        let (minimum_torque, maximum_pitch) = match self.state {
            OperatingState::BelowRated => (
                input.external_minimum_torque,
                saturate(pitch, minimum_pitch, input.external_maximum_pitch),
            ),
            OperatingState::AboveRated => (
                saturate(torque, input.external_minimum_torque, input.maximum_torque),
                input.external_maximum_pitch,
            ),
        };

        self.limits = TorquePitchLimits {
            minimum_torque,
            maximum_torque: input.maximum_torque,
            minimum_pitch,
            maximum_pitch,
            state: self.state,
        };

        self.limits
    }

    pub fn signal_value(&self, signal: TorquePitchManagerSignal) -> Float {
        let input = &self.input;
        let limits = &self.limits;

        match signal {
            TorquePitchManagerSignal::MinimumPitch => limits.minimum_pitch,
            TorquePitchManagerSignal::MaximumPitch => limits.maximum_pitch,
            TorquePitchManagerSignal::MinimumTorque => limits.minimum_torque,
            TorquePitchManagerSignal::ExternalMaximumPitch => input.external_maximum_pitch,
            TorquePitchManagerSignal::ExternalMinimumPitch => input.external_minimum_pitch,
            TorquePitchManagerSignal::Torque => input.torque,
            TorquePitchManagerSignal::Pitch => input.pitch(),
            TorquePitchManagerSignal::PitchFromSpeed => input.pitch_from_speed,
            TorquePitchManagerSignal::PitchFromPlatform => input.pitch_from_platform,
            TorquePitchManagerSignal::ExternalMinimumTorque => input.external_minimum_torque,
            TorquePitchManagerSignal::MaximumTorque => input.maximum_torque,
            TorquePitchManagerSignal::MinimumPitchFromPlatform => {
                limits.minimum_pitch - input.pitch_from_speed
            },
            TorquePitchManagerSignal::MaximumPitchFromPlatform => {
                limits.maximum_pitch - input.pitch_from_speed
            },
            TorquePitchManagerSignal::State => limits.state.index() as Float,
        }
    }
}

impl SignalSource for TorquePitchManager {
    fn get_output(&self, name: &str) -> Result<Float, SignalError> {
        leaf_lookup(name, TorquePitchManagerSignal::from_name, |signal| self.signal_value(signal))
    }
}
