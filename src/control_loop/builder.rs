// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

use serde::{Deserialize, Serialize};

use stormath::type_aliases::Float;

use crate::error::{ComponentContext, Error};
use crate::filters::builder::FilterChainBuilder;
use crate::tables::LookupTableData;

use super::{ControlLoop, SchedulingSignal};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// Configuration of a control loop. All filters default to empty chains, which pass their input
/// through, and the gain defaults to one.
pub struct ControlLoopBuilder {
    #[serde(default)]
    pub measurement_filter: FilterChainBuilder,
    #[serde(default)]
    pub error_filter: FilterChainBuilder,
    #[serde(default)]
    pub post_gain_filter: FilterChainBuilder,
    #[serde(default)]
    pub gain_schedule: Option<LookupTableData>,
    #[serde(default)]
    pub scheduling_signal: SchedulingSignal,
}

impl ControlLoopBuilder {
    pub fn build(&self, sampling_interval: Float) -> Result<ControlLoop, Error> {
        let measurement_filter = self.measurement_filter
            .build(sampling_interval)
            .component("measurement filter")?;

        let error_filter = self.error_filter
            .build(sampling_interval)
            .component("error filter")?;

        let post_gain_filter = self.post_gain_filter
            .build(sampling_interval)
            .component("post-gain filter")?;

        let gain_schedule = match &self.gain_schedule {
            Some(data) => Some(data.build().component("gain schedule")?),
            None => None,
        };

        Ok(ControlLoop::new(
            measurement_filter,
            error_filter,
            post_gain_filter,
            gain_schedule,
            self.scheduling_signal,
        ))
    }
}
