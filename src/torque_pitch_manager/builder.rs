// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

use serde::{Deserialize, Serialize};

use crate::error::{ComponentContext, Error};
use crate::tables::LookupTableData;

use super::TorquePitchManager;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TorquePitchManagerBuilder {
    /// Minimum pitch, in degrees, as a function of the torque demand, in kNm
    #[serde(default)]
    pub minimum_pitch_table: Option<LookupTableData>,
}

impl TorquePitchManagerBuilder {
    pub fn build(&self) -> Result<TorquePitchManager, Error> {
        let minimum_pitch_table = match &self.minimum_pitch_table {
            Some(data) => Some(data.build().component("minimum pitch table")?),
            None => None,
        };

        Ok(TorquePitchManager::new(minimum_pitch_table))
    }
}
