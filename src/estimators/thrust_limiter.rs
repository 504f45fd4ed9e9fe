// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Converts a thrust ceiling into a minimum pitch angle.

use serde::{Deserialize, Serialize};

use stormath::type_aliases::Float;

use crate::error::{ComponentContext, Error};
use crate::signals::{leaf_lookup, signal_names, SignalError, SignalSource};
use crate::tables::{LookupTable2D, SurfaceSource};

use super::RotorProperties;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThrustLimiterBuilder {
    pub rotor: RotorProperties,
    /// Pitch angle, in degrees, with the tip-speed ratio on the x axis and `Ct/λ²` on the y axis
    pub minimum_pitch_surface: SurfaceSource,
}

impl ThrustLimiterBuilder {
    pub fn build(&self) -> Result<ThrustLimiter, Error> {
        self.rotor.validate()?;

        Ok(ThrustLimiter {
            rotor: self.rotor,
            surface: self.minimum_pitch_surface
                .build()
                .component("minimum pitch surface")?,
            maximum_thrust: 0.0,
            thrust_coefficient_ratio: 0.0,
            minimum_pitch: Float::NEG_INFINITY,
        })
    }
}

signal_names! {
    pub enum ThrustLimiterSignal {
        MinimumPitch => "minimum pitch",
        ThrustCoefficientRatio => "thrust coefficient ratio",
        MaximumThrust => "maximum thrust",
    }
}

#[derive(Debug, Clone)]
pub struct ThrustLimiter {
    rotor: RotorProperties,
    surface: LookupTable2D,
    maximum_thrust: Float,
    thrust_coefficient_ratio: Float,
    minimum_pitch: Float,
}

impl ThrustLimiter {
    /// Returns the minimum pitch, in degrees, that keeps the thrust below `maximum_thrust`.
    ///
    /// # Arguments
    /// * `tip_speed_ratio` - estimated tip-speed ratio
    /// * `rotor_speed` - filtered rotor speed, in rad/s
    /// * `maximum_thrust` - thrust ceiling, in kN
    pub fn step(&mut self, tip_speed_ratio: Float, rotor_speed: Float, maximum_thrust: Float) -> Float {
        self.maximum_thrust = maximum_thrust;

        if rotor_speed > 0.0 {
            self.thrust_coefficient_ratio = maximum_thrust * 1000.0
                / self.rotor.dynamic_reference(rotor_speed, 2);

            self.minimum_pitch = self.surface.eval(tip_speed_ratio, self.thrust_coefficient_ratio);
        } else {
            self.minimum_pitch = Float::NEG_INFINITY;
        }

        self.minimum_pitch
    }

    pub fn minimum_pitch(&self) -> Float {
        self.minimum_pitch
    }
}

impl SignalSource for ThrustLimiter {
    fn get_output(&self, name: &str) -> Result<Float, SignalError> {
        leaf_lookup(name, ThrustLimiterSignal::from_name, |signal| match signal {
            ThrustLimiterSignal::MinimumPitch => self.minimum_pitch,
            ThrustLimiterSignal::ThrustCoefficientRatio => self.thrust_coefficient_ratio,
            ThrustLimiterSignal::MaximumThrust => self.maximum_thrust,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pitch of `20 - 100·Ct/λ²`, independent of the tip-speed ratio
    fn limiter() -> ThrustLimiter {
        ThrustLimiterBuilder {
            rotor: RotorProperties { radius: 10.0, air_density: 1.0 },
            minimum_pitch_surface: SurfaceSource::Inline {
                x: vec![0.0, 15.0],
                y: vec![0.0, 0.2],
                z: vec![20.0, 20.0, 0.0, 0.0],
            },
        }.build().unwrap()
    }

    #[test]
    fn lower_thrust_ceiling_gives_higher_pitch() {
        let mut limiter = limiter();

        let relaxed = limiter.step(8.0, 1.0, 0.5);
        let strict = limiter.step(8.0, 1.0, 0.1);

        assert!(strict > relaxed);

        // ½·ρ·π·R²·(ω·R)² = 5000·π
        let ratio = 0.1 * 1000.0 / (5000.0 * stormath::consts::PI);

        assert!((limiter.get_output("thrust coefficient ratio").unwrap() - ratio).abs() < 1e-9);
        assert!((strict - (20.0 - 100.0 * ratio)).abs() < 1e-9);
    }

    #[test]
    fn no_limit_at_standstill() {
        let mut limiter = limiter();

        assert_eq!(limiter.step(8.0, 0.0, 0.1), Float::NEG_INFINITY);
    }
}
