// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Maximum allowed rotor thrust as a function of the turret displacement of a moored floating
//! turbine.

use serde::{Deserialize, Serialize};

use stormath::type_aliases::Float;

use crate::error::{ComponentContext, Error};
use crate::signals::{leaf_lookup, signal_names, SignalError, SignalSource};
use crate::tables::{LookupTable2D, SurfaceSource};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThrustLimitEstimatorBuilder {
    /// Maximum thrust, in N, over the turret displacement rotated into the nacelle frame
    pub maximum_thrust_surface: SurfaceSource,
    /// Conversion from the surface unit to kN
    #[serde(default = "ThrustLimitEstimatorBuilder::default_scale_factor")]
    pub scale_factor: Float,
    #[serde(default = "ThrustLimitEstimatorBuilder::default_safety_margin")]
    pub safety_margin: Float,
}

impl ThrustLimitEstimatorBuilder {
    pub fn default_scale_factor() -> Float {1.0e-3}
    pub fn default_safety_margin() -> Float {1.1}

    pub fn new(maximum_thrust_surface: SurfaceSource) -> Self {
        Self {
            maximum_thrust_surface,
            scale_factor: Self::default_scale_factor(),
            safety_margin: Self::default_safety_margin(),
        }
    }

    pub fn build(&self) -> Result<ThrustLimitEstimator, Error> {
        let surface = self.maximum_thrust_surface
            .build()
            .component("max thrust surface")?;

        Ok(ThrustLimitEstimator {
            surface,
            factor: self.scale_factor * self.safety_margin,
            thrust: 0.0,
            maximum_thrust: 0.0,
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThrustLimitEstimatorInput {
    /// Turret position, in m
    pub turret_x: Float,
    pub turret_y: Float,
    /// Absolute nacelle yaw angle, in rad
    pub nacelle_yaw: Float,
    /// Observed rotor thrust, in kN
    pub thrust: Float,
}

signal_names! {
    pub enum ThrustLimitEstimatorSignal {
        MaximumThrust => "maximum thrust",
        Thrust => "thrust",
    }
}

#[derive(Debug, Clone)]
pub struct ThrustLimitEstimator {
    surface: LookupTable2D,
    /// Scale factor and safety margin combined
    factor: Float,
    thrust: Float,
    maximum_thrust: Float,
}

impl ThrustLimitEstimator {
    /// Returns the maximum thrust, in kN
    pub fn step(&mut self, input: &ThrustLimitEstimatorInput) -> Float {
        self.thrust = input.thrust;

        let displacement = input.turret_x.hypot(input.turret_y);

        let (sin_yaw, cos_yaw) = input.nacelle_yaw.sin_cos();

        self.maximum_thrust = self.surface.eval(displacement * cos_yaw, displacement * sin_yaw)
            * self.factor;

        self.maximum_thrust
    }

    pub fn maximum_thrust(&self) -> Float {
        self.maximum_thrust
    }
}

impl SignalSource for ThrustLimitEstimator {
    fn get_output(&self, name: &str) -> Result<Float, SignalError> {
        leaf_lookup(name, ThrustLimitEstimatorSignal::from_name, |signal| match signal {
            ThrustLimitEstimatorSignal::MaximumThrust => self.maximum_thrust,
            ThrustLimitEstimatorSignal::Thrust => self.thrust,
        })
    }
}
