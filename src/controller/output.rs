// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

use serde::{Deserialize, Serialize};

use stormath::type_aliases::Float;

use crate::torque_pitch_manager::OperatingState;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ControllerOutput {
    /// Generator torque demand, in kNm
    pub torque_demand: Float,
    /// Collective pitch demand, in degrees
    pub collective_pitch_demand: Float,
    /// State of the torque-pitch manager after the cycle
    pub state: OperatingState,
}
