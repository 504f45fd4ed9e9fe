// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Estimators used to limit the rotor thrust on floating turbines.
//!
//! The tip-speed ratio estimator and the thrust limit estimator run first. The thrust limiter
//! then converts the thrust ceiling into a minimum pitch angle, which is merged with the other
//! minimum pitch limits in the controller.

pub mod tip_speed_ratio;
pub mod thrust_limit;
pub mod thrust_limiter;

pub mod prelude;

use serde::{Deserialize, Serialize};

use stormath::consts::PI;
use stormath::type_aliases::Float;

use crate::error::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// Rotor properties used to make power and thrust non-dimensional
pub struct RotorProperties {
    /// Rotor radius, in m
    pub radius: Float,
    /// Air density, in kg/m³
    #[serde(default = "RotorProperties::default_air_density")]
    pub air_density: Float,
}

impl RotorProperties {
    pub fn default_air_density() -> Float {1.225}

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.radius > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "rotor radius must be positive, got {}", self.radius
            )));
        }

        if !(self.air_density > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "air density must be positive, got {}", self.air_density
            )));
        }

        Ok(())
    }

    pub fn swept_area(&self) -> Float {
        PI * self.radius * self.radius
    }

    /// `½·ρ·A·(ω·R)^exponent`, with `ω` in rad/s. Used as the reference for the power
    /// coefficient (exponent 3) and the thrust coefficient (exponent 2).
    pub fn dynamic_reference(&self, rotor_speed: Float, exponent: i32) -> Float {
        0.5 * self.air_density * self.swept_area() * (rotor_speed * self.radius).powi(exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_reference() {
        let rotor = RotorProperties { radius: 2.0, air_density: 1.0 };

        // (ω·R)³ = 6³
        let expected = 0.5 * PI * 4.0 * 216.0;

        assert!((rotor.dynamic_reference(3.0, 3) - expected).abs() < 1e-9);
        assert!(RotorProperties { radius: 0.0, air_density: 1.0 }.validate().is_err());
    }
}
