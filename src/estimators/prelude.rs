// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

pub use super::{
    RotorProperties,
    tip_speed_ratio::{TipSpeedRatioEstimator, TipSpeedRatioEstimatorBuilder},
    thrust_limit::{ThrustLimitEstimator, ThrustLimitEstimatorBuilder, ThrustLimitEstimatorInput},
    thrust_limiter::{ThrustLimiter, ThrustLimiterBuilder},
};
