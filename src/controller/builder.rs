// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use stormath::type_aliases::Float;

use crate::control_loop::builder::ControlLoopBuilder;
use crate::error::{ComponentContext, Error};
use crate::estimators::prelude::*;
use crate::filters::builder::FilterChainBuilder;
use crate::power_manager::builder::PowerManagerBuilder;
use crate::torque_pitch_manager::builder::TorquePitchManagerBuilder;

use super::{Controller, ThrustLimitation};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// Estimators for floating turbines. They are either all present or all absent.
pub struct ThrustLimitationBuilder {
    pub tip_speed_ratio_estimator: TipSpeedRatioEstimatorBuilder,
    pub thrust_limit_estimator: ThrustLimitEstimatorBuilder,
    pub thrust_limiter: ThrustLimiterBuilder,
}

impl ThrustLimitationBuilder {
    pub fn build(&self, sampling_interval: Float) -> Result<ThrustLimitation, Error> {
        Ok(ThrustLimitation {
            tip_speed_ratio_estimator: self.tip_speed_ratio_estimator
                .build(sampling_interval)
                .component("tip-speed ratio estimator")?,
            thrust_limit_estimator: self.thrust_limit_estimator
                .build()
                .component("thrust limit estimator")?,
            thrust_limiter: self.thrust_limiter
                .build()
                .component("thrust limiter")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerBuilder {
    /// Time between two calls to the controller, in s
    #[serde(default = "ControllerBuilder::default_sampling_interval")]
    pub sampling_interval: Float,
    #[serde(default)]
    pub power_manager: PowerManagerBuilder,
    #[serde(default)]
    pub torque_pitch_manager: TorquePitchManagerBuilder,
    #[serde(default)]
    pub drivetrain_damper: Option<ControlLoopBuilder>,
    #[serde(default)]
    pub torque_control: ControlLoopBuilder,
    #[serde(default)]
    pub collective_pitch_control: ControlLoopBuilder,
    /// Filter from nacelle pitch, in rad, to a torque correction, in kNm
    #[serde(default)]
    pub nacelle_pitch_compensation: Option<FilterChainBuilder>,
    #[serde(default)]
    pub thrust_limitation: Option<ThrustLimitationBuilder>,
}

impl Default for ControllerBuilder {
    fn default() -> Self {
        Self {
            sampling_interval: Self::default_sampling_interval(),
            power_manager: PowerManagerBuilder::default(),
            torque_pitch_manager: TorquePitchManagerBuilder::default(),
            drivetrain_damper: None,
            torque_control: ControlLoopBuilder::default(),
            collective_pitch_control: ControlLoopBuilder::default(),
            nacelle_pitch_compensation: None,
            thrust_limitation: None,
        }
    }
}

impl ControllerBuilder {
    pub fn default_sampling_interval() -> Float {0.01}

    pub fn from_json_string(json_string: &str) -> Result<Self, Error> {
        let serde_res = serde_json::from_str(json_string)?;

        Ok(serde_res)
    }

    pub fn from_json_file<P: AsRef<Path>>(file_path: P) -> Result<Self, Error> {
        let json_string = std::fs::read_to_string(file_path)?;

        Self::from_json_string(&json_string)
    }

    /// Validates the configuration and builds all the components. The error names the component
    /// that failed.
    pub fn build(&self) -> Result<Controller, Error> {
        let sampling_interval = self.sampling_interval;

        if !(sampling_interval > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "sampling interval must be positive, got {}", sampling_interval
            )));
        }

        let collective_pitch_control = self.collective_pitch_control
            .build(sampling_interval)
            .component("collective pitch control")?;

        let drivetrain_damper = match &self.drivetrain_damper {
            Some(builder) => Some(builder.build(sampling_interval).component("drivetrain damper")?),
            None => None,
        };

        let torque_control = self.torque_control
            .build(sampling_interval)
            .component("torque control")?;

        let torque_pitch_manager = self.torque_pitch_manager
            .build()
            .component("torque-pitch manager")?;

        let power_manager = self.power_manager
            .build(sampling_interval)
            .component("power manager")?;

        let nacelle_pitch_compensation = match &self.nacelle_pitch_compensation {
            Some(builder) => Some(builder.build(sampling_interval).component("torque from nacelle pitch filter")?),
            None => None,
        };

        let thrust_limitation = match &self.thrust_limitation {
            Some(builder) => Some(builder.build(sampling_interval)?),
            None => None,
        };

        info!(
            sampling_interval,
            drivetrain_damper = drivetrain_damper.is_some(),
            nacelle_pitch_compensation = nacelle_pitch_compensation.is_some(),
            thrust_limitation = thrust_limitation.is_some(),
            "controller built"
        );

        Ok(Controller::new(
            power_manager,
            torque_pitch_manager,
            drivetrain_damper,
            torque_control,
            collective_pitch_control,
            nacelle_pitch_compensation,
            thrust_limitation,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_configuration_uses_defaults() {
        let builder = ControllerBuilder::from_json_string("{}").unwrap();

        assert_eq!(builder.sampling_interval, 0.01);
        assert!(builder.build().is_ok());
    }

    #[test]
    fn unknown_component_is_rejected() {
        assert!(ControllerBuilder::from_json_string(r#"{"yaw_control": {}}"#).is_err());
    }

    #[test]
    fn error_names_the_component_chain() {
        let json = r#"{
            "power_manager": {
                "below_rated_torque_gain": {"x": [0.0, 0.5, 0.4], "y": [1.0, 1.0, 1.0]}
            }
        }"#;

        let message = ControllerBuilder::from_json_string(json)
            .unwrap()
            .build()
            .unwrap_err()
            .to_string();

        assert_eq!(
            message,
            "error initializing power manager: error initializing below rated torque gain table: \
             bad table data: x values not ascending"
        );
    }

    #[test]
    fn thrust_limitation_errors_name_the_estimator() {
        let json = r#"{
            "thrust_limitation": {
                "tip_speed_ratio_estimator": {
                    "rotor": {"radius": 63.0},
                    "tip_speed_ratio_surface": {"Inline": {"x": [0.0, 1.0], "y": [0.0, 1.0], "z": [1.0, 1.0, 1.0, 1.0]}}
                },
                "thrust_limit_estimator": {
                    "maximum_thrust_surface": {"File": "missing_thrust_surface.bin"}
                },
                "thrust_limiter": {
                    "rotor": {"radius": 63.0},
                    "minimum_pitch_surface": {"Inline": {"x": [0.0, 1.0], "y": [0.0, 1.0], "z": [0.0, 0.0, 0.0, 0.0]}}
                }
            }
        }"#;

        let message = ControllerBuilder::from_json_string(json)
            .unwrap()
            .build()
            .unwrap_err()
            .to_string();

        assert!(
            message.starts_with("error initializing thrust limit estimator: error initializing max thrust surface"),
            "{}", message
        );
    }
}
