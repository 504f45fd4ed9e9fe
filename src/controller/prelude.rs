// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)


pub use super::{
    Controller,
    ControllerBlock,
    ControllerSignal,
    ThrustLimitation,
    builder::{ControllerBuilder, ThrustLimitationBuilder},
    input::ControllerInput,
    output::ControllerOutput,
};

pub use crate::signals::{SignalError, SignalSource};
pub use crate::torque_pitch_manager::OperatingState;
