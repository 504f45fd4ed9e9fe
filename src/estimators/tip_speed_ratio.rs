// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Tip-speed ratio estimation from drivetrain measurements.
//!
//! The aerodynamic power is approximated from the filtered generator torque and speed. Dividing
//! by the dynamic reference power gives `Cp/λ³`, which together with the pitch angle identifies the
//! operating point on the rotor's power coefficient surface.

use serde::{Deserialize, Serialize};

use stormath::type_aliases::Float;

use crate::error::{ComponentContext, Error};
use crate::filters::{builder::FilterChainBuilder, FilterChain};
use crate::signals::{leaf_lookup, signal_names, SignalError, SignalSource};
use crate::tables::{LookupTable2D, SurfaceSource};

use super::RotorProperties;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TipSpeedRatioEstimatorBuilder {
    pub rotor: RotorProperties,
    /// Generator speed divided by rotor speed
    #[serde(default = "TipSpeedRatioEstimatorBuilder::default_gearbox_ratio")]
    pub gearbox_ratio: Float,
    /// Drivetrain and generator efficiency
    #[serde(default = "TipSpeedRatioEstimatorBuilder::default_efficiency")]
    pub efficiency: Float,
    #[serde(default)]
    pub generator_speed_filter: FilterChainBuilder,
    #[serde(default)]
    pub generator_torque_filter: FilterChainBuilder,
    /// Tip-speed ratio as a function of the pitch angle, in degrees, on the x axis and `Cp/λ³` on
    /// the y axis
    pub tip_speed_ratio_surface: SurfaceSource,
}

impl TipSpeedRatioEstimatorBuilder {
    pub fn default_gearbox_ratio() -> Float {1.0}
    pub fn default_efficiency() -> Float {1.0}

    pub fn new(rotor: RotorProperties, tip_speed_ratio_surface: SurfaceSource) -> Self {
        Self {
            rotor,
            gearbox_ratio: Self::default_gearbox_ratio(),
            efficiency: Self::default_efficiency(),
            generator_speed_filter: FilterChainBuilder::default(),
            generator_torque_filter: FilterChainBuilder::default(),
            tip_speed_ratio_surface,
        }
    }

    pub fn build(&self, sampling_interval: Float) -> Result<TipSpeedRatioEstimator, Error> {
        self.rotor.validate()?;

        if self.gearbox_ratio == 0.0 {
            return Err(Error::InvalidParameter("gearbox ratio must be non-zero".to_string()));
        }

        if self.efficiency == 0.0 {
            return Err(Error::InvalidParameter("efficiency must be non-zero".to_string()));
        }

        Ok(TipSpeedRatioEstimator {
            rotor: self.rotor,
            gearbox_ratio: self.gearbox_ratio,
            efficiency: self.efficiency,
            generator_speed_filter: self.generator_speed_filter
                .build(sampling_interval)
                .component("generator speed filter")?,
            generator_torque_filter: self.generator_torque_filter
                .build(sampling_interval)
                .component("generator torque filter")?,
            surface: self.tip_speed_ratio_surface
                .build()
                .component("tip-speed ratio surface")?,
            tip_speed_ratio: 0.0,
            rotor_speed: 0.0,
            filtered_generator_speed: 0.0,
            filtered_generator_torque: 0.0,
            power_coefficient_ratio: 0.0,
        })
    }
}

signal_names! {
    pub enum TipSpeedRatioSignal {
        TipSpeedRatio => "tip-speed ratio",
        RotorSpeed => "rotor speed",
        FilteredGeneratorSpeed => "filtered generator speed",
        FilteredGeneratorTorque => "filtered generator torque",
        PowerCoefficientRatio => "power coefficient ratio",
    }
}

#[derive(Debug, Clone)]
pub struct TipSpeedRatioEstimator {
    rotor: RotorProperties,
    gearbox_ratio: Float,
    efficiency: Float,
    generator_speed_filter: FilterChain,
    generator_torque_filter: FilterChain,
    surface: LookupTable2D,
    tip_speed_ratio: Float,
    rotor_speed: Float,
    filtered_generator_speed: Float,
    filtered_generator_torque: Float,
    power_coefficient_ratio: Float,
}

impl TipSpeedRatioEstimator {
    /// Updates the estimate.
    ///
    /// # Arguments
    /// * `generator_speed` - in rad/s
    /// * `generator_torque` - in kNm
    /// * `pitch` - collective pitch angle, in degrees
    pub fn step(&mut self, generator_speed: Float, generator_torque: Float, pitch: Float) -> Float {
        self.filtered_generator_speed = self.generator_speed_filter.step(generator_speed);
        self.filtered_generator_torque = self.generator_torque_filter.step(generator_torque);

        self.rotor_speed = self.filtered_generator_speed / self.gearbox_ratio;

        if self.rotor_speed > 0.0 {
            let aerodynamic_power = self.filtered_generator_torque * self.filtered_generator_speed
                / self.efficiency;

            self.power_coefficient_ratio = aerodynamic_power * 1000.0
                / self.rotor.dynamic_reference(self.rotor_speed, 3);

            self.tip_speed_ratio = self.surface.eval(pitch, self.power_coefficient_ratio);
        }

        self.tip_speed_ratio
    }

    pub fn tip_speed_ratio(&self) -> Float {
        self.tip_speed_ratio
    }

    /// Filtered rotor speed, in rad/s
    pub fn rotor_speed(&self) -> Float {
        self.rotor_speed
    }

    pub fn signal_value(&self, signal: TipSpeedRatioSignal) -> Float {
        match signal {
            TipSpeedRatioSignal::TipSpeedRatio => self.tip_speed_ratio,
            TipSpeedRatioSignal::RotorSpeed => self.rotor_speed,
            TipSpeedRatioSignal::FilteredGeneratorSpeed => self.filtered_generator_speed,
            TipSpeedRatioSignal::FilteredGeneratorTorque => self.filtered_generator_torque,
            TipSpeedRatioSignal::PowerCoefficientRatio => self.power_coefficient_ratio,
        }
    }
}

impl SignalSource for TipSpeedRatioEstimator {
    fn get_output(&self, name: &str) -> Result<Float, SignalError> {
        leaf_lookup(name, TipSpeedRatioSignal::from_name, |signal| self.signal_value(signal))
    }
}
