// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

use serde::{Deserialize, Serialize};

use stormath::type_aliases::Float;

use crate::error::{ComponentContext, Error};
use crate::filters::builder::FilterChainBuilder;
use crate::tables::{LookupTable1D, LookupTableData};

use super::{PowerCeiling, PowerManager, PowerManagerInput, PowerManagerOutput};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PowerManagerBuilder {
    #[serde(default)]
    pub ceiling: PowerCeiling,
    /// Optimum torque gain as a function of the derating ratio, in kNm·s²/rad²
    #[serde(default)]
    pub below_rated_torque_gain: Option<LookupTableData>,
    /// Minimum pitch, in degrees, as a function of the derating ratio
    #[serde(default)]
    pub minimum_pitch_from_derating: Option<LookupTableData>,
    /// Minimum pitch, in degrees, as a function of the generator speed
    #[serde(default)]
    pub minimum_pitch_from_generator_speed: Option<LookupTableData>,
    /// Lowest allowed rate of change of the generator speed minimum pitch, in deg/s. Normally
    /// negative. No limit when not given.
    #[serde(default)]
    pub generator_speed_pitch_min_rate: Option<Float>,
    /// Highest allowed rate of change of the generator speed minimum pitch, in deg/s
    #[serde(default)]
    pub generator_speed_pitch_max_rate: Option<Float>,
    /// Filter applied to the generator speed before the minimum pitch lookup
    #[serde(default)]
    pub generator_speed_filter: FilterChainBuilder,
}

impl PowerManagerBuilder {
    fn build_table(
        data: &Option<LookupTableData>,
        component: &'static str,
    ) -> Result<Option<LookupTable1D>, Error> {
        match data {
            Some(data) => Ok(Some(data.build().component(component)?)),
            None => Ok(None),
        }
    }

    pub fn build(&self, sampling_interval: Float) -> Result<PowerManager, Error> {
        if let PowerCeiling::RatedPower { efficiency, .. } = self.ceiling {
            if efficiency == 0.0 {
                return Err(Error::InvalidParameter("efficiency must be non-zero".to_string()));
            }
        }

        let min_change = self.generator_speed_pitch_min_rate
            .map_or(Float::NEG_INFINITY, |rate| rate * sampling_interval);

        let max_change = self.generator_speed_pitch_max_rate
            .map_or(Float::INFINITY, |rate| rate * sampling_interval);

        if min_change > max_change {
            return Err(Error::InvalidParameter(
                "minimum pitch rate is larger than maximum pitch rate".to_string()
            ));
        }

        let generator_speed_filter = self.generator_speed_filter
            .build(sampling_interval)
            .component("generator speed filter")?;

        let minimum_pitch_from_generator_speed = Self::build_table(
            &self.minimum_pitch_from_generator_speed, "generator speed - minimum pitch table"
        )?;

        // The slew limited floor starts from zero. Without a table the stage imposes no floor.
        let pitch_from_generator_speed = if minimum_pitch_from_generator_speed.is_some() {
            0.0
        } else {
            Float::NEG_INFINITY
        };

        Ok(PowerManager {
            ceiling: self.ceiling,
            below_rated_torque_gain: Self::build_table(
                &self.below_rated_torque_gain, "below rated torque gain table"
            )?,
            minimum_pitch_from_derating: Self::build_table(
                &self.minimum_pitch_from_derating, "derating ratio - minimum pitch table"
            )?,
            minimum_pitch_from_generator_speed,
            generator_speed_filter,
            pitch_change_limits: (min_change, max_change),
            input: PowerManagerInput::default(),
            output: PowerManagerOutput::default(),
            power_limit: 0.0,
            pitch_from_derating: Float::NEG_INFINITY,
            pitch_from_generator_speed,
            filtered_generator_speed: 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_efficiency_is_rejected() {
        let builder = PowerManagerBuilder {
            ceiling: PowerCeiling::RatedPower { rated_power: 5000.0, efficiency: 0.0 },
            ..Default::default()
        };

        assert!(builder.build(0.0125).is_err());
    }

    #[test]
    fn table_errors_name_the_table() {
        let builder = PowerManagerBuilder {
            minimum_pitch_from_derating: Some(LookupTableData::new(&[0.5, 0.1], &[0.0, 1.0])),
            ..Default::default()
        };

        let message = builder.build(0.0125).unwrap_err().to_string();

        assert!(message.starts_with("error initializing derating ratio - minimum pitch table"));
    }

    #[test]
    fn from_json() {
        let json = r#"{
            "ceiling": {"RatedPower": {"rated_power": 5000.0, "efficiency": 0.944}},
            "below_rated_torque_gain": {"x": [0.0], "y": [2.1]},
            "generator_speed_pitch_max_rate": 0.5
        }"#;

        let builder: PowerManagerBuilder = serde_json::from_str(json).unwrap();

        assert!(builder.build(0.0125).is_ok());
    }
}
