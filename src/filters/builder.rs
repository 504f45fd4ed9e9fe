// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

use serde::{Deserialize, Serialize};

use stormath::type_aliases::Float;

use crate::error::Error;

use super::{tuning, FilterChain, SecondOrderSection, SectionCoefficients};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// The continuous or discrete shape of a single filter section. Continuous shapes are converted
/// with the Tustin transform when the chain is built. Frequencies are in rad/s.
pub enum SectionShape {
    LowPass {
        frequency: Float,
        damping: Float,
    },
    Notch {
        frequency: Float,
        damping_numerator: Float,
        damping_denominator: Float,
    },
    BandPass {
        gain: Float,
        frequency: Float,
        damping: Float,
    },
    ProportionalIntegral {
        kp: Float,
        ki: Float,
    },
    ProportionalIntegralRate {
        kp: Float,
        ki: Float,
    },
    Integrator,
    Accumulator,
    Gain {
        value: Float,
    },
    /// Discrete coefficients given directly
    Raw(SectionCoefficients),
}

impl SectionShape {
    pub fn coefficients(&self, sampling_interval: Float) -> Result<SectionCoefficients, Error> {
        let coefficients = match self {
            SectionShape::LowPass { frequency, damping } => {
                Self::check_frequency(*frequency)?;

                tuning::low_pass(*frequency, *damping, sampling_interval)
            },
            SectionShape::Notch { frequency, damping_numerator, damping_denominator } => {
                Self::check_frequency(*frequency)?;

                tuning::notch(*frequency, *damping_numerator, *damping_denominator, sampling_interval)
            },
            SectionShape::BandPass { gain, frequency, damping } => {
                Self::check_frequency(*frequency)?;

                tuning::band_pass(*gain, *frequency, *damping, sampling_interval)
            },
            SectionShape::ProportionalIntegral { kp, ki } => {
                tuning::proportional_integral(*kp, *ki, sampling_interval)
            },
            SectionShape::ProportionalIntegralRate { kp, ki } => {
                tuning::proportional_integral_rate(*kp, *ki, sampling_interval)
            },
            SectionShape::Integrator => tuning::integrator(sampling_interval),
            SectionShape::Accumulator => tuning::accumulator(),
            SectionShape::Gain { value } => SectionCoefficients::gain(*value),
            SectionShape::Raw(coefficients) => *coefficients,
        };

        coefficients.validate()?;

        Ok(coefficients)
    }

    fn check_frequency(frequency: Float) -> Result<(), Error> {
        if frequency > 0.0 {
            Ok(())
        } else {
            Err(Error::InvalidParameter(format!(
                "filter frequency must be positive, got {}", frequency
            )))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionBuilder {
    pub shape: SectionShape,
    #[serde(default = "SectionBuilder::default_enabled")]
    pub enabled: bool,
}

impl SectionBuilder {
    pub fn default_enabled() -> bool {true}

    pub fn new(shape: SectionShape) -> Self {
        Self {
            shape,
            enabled: Self::default_enabled(),
        }
    }

    pub fn disabled(shape: SectionShape) -> Self {
        Self {
            shape,
            enabled: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// Configuration of a filter chain. An empty list gives a chain that passes its input through.
pub struct FilterChainBuilder {
    #[serde(default)]
    pub sections: Vec<SectionBuilder>,
}

impl FilterChainBuilder {
    pub fn new(sections: Vec<SectionBuilder>) -> Self {
        Self { sections }
    }

    pub fn from_shapes(shapes: &[SectionShape]) -> Self {
        Self {
            sections: shapes.iter().cloned().map(SectionBuilder::new).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn build(&self, sampling_interval: Float) -> Result<FilterChain, Error> {
        if !(sampling_interval > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "sampling interval must be positive, got {}", sampling_interval
            )));
        }

        let mut sections = Vec::with_capacity(self.sections.len());

        for section in self.sections.iter() {
            sections.push(
                SecondOrderSection::new(section.shape.coefficients(sampling_interval)?, section.enabled)?
            );
        }

        Ok(FilterChain::new(sections))
    }
}
