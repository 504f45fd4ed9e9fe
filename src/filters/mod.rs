// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Discrete time filters built as a cascade of second-order sections (biquads).
//!
//! The same building block is used for lowpass filters, notch filters, PI controllers realised as
//! z-domain transfer functions and pure integrators.

pub mod builder;
pub mod tuning;

use serde::{Deserialize, Serialize};

use stormath::type_aliases::Float;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// Numerator and denominator coefficients of a second-order section:
///
/// ```text
///        b0 + b1·z⁻¹ + b2·z⁻²
/// H(z) = --------------------
///        a0 + a1·z⁻¹ + a2·z⁻²
/// ```
pub struct SectionCoefficients {
    pub b: [Float; 3],
    pub a: [Float; 3],
}

impl Default for SectionCoefficients {
    fn default() -> Self {
        Self::passthrough()
    }
}

impl SectionCoefficients {
    pub fn new(b: [Float; 3], a: [Float; 3]) -> Self {
        Self { b, a }
    }

    /// Unit gain, no dynamics
    pub fn passthrough() -> Self {
        Self::gain(1.0)
    }

    pub fn gain(value: Float) -> Self {
        Self {
            b: [value, 0.0, 0.0],
            a: [1.0, 0.0, 0.0],
        }
    }

    /// Gain of the section at zero frequency (z = 1)
    pub fn dc_gain(&self) -> Float {
        (self.b[0] + self.b[1] + self.b[2]) / (self.a[0] + self.a[1] + self.a[2])
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.a[0] == 0.0 {
            return Err(Error::InvalidParameter(
                "leading denominator coefficient a0 is zero".to_string()
            ));
        }

        if self.b.iter().chain(self.a.iter()).any(|value| !value.is_finite()) {
            return Err(Error::InvalidParameter(
                "filter coefficients must be finite".to_string()
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
/// A single second-order section in direct form I, with its own delay line.
pub struct SecondOrderSection {
    coefficients: SectionCoefficients,
    enabled: bool,
    /// Previous inputs, `[x[n-1], x[n-2]]`
    x: [Float; 2],
    /// Previous outputs, `[y[n-1], y[n-2]]`
    y: [Float; 2],
}

impl SecondOrderSection {
    pub fn new(coefficients: SectionCoefficients, enabled: bool) -> Result<Self, Error> {
        coefficients.validate()?;

        Ok(Self {
            coefficients,
            enabled,
            x: [0.0; 2],
            y: [0.0; 2],
        })
    }

    pub fn coefficients(&self) -> SectionCoefficients {
        self.coefficients
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Advances the section by one sample. Disabled sections return the input unchanged.
    #[inline]
    pub fn step(&mut self, input: Float) -> Float {
        if !self.enabled {
            return input;
        }

        let b = &self.coefficients.b;
        let a = &self.coefficients.a;

        let output = (
            b[0] * input + b[1] * self.x[0] + b[2] * self.x[1]
            - a[1] * self.y[0] - a[2] * self.y[1]
        ) / a[0];

        self.x = [input, self.x[0]];
        self.y = [output, self.y[0]];

        output
    }

    /// Overwrites the most recent output, `y[n-1]`, so that the next step continues from `value`.
    pub fn set_previous_output(&mut self, value: Float) {
        self.y[0] = value;
    }

    pub fn reset(&mut self) {
        self.x = [0.0; 2];
        self.y = [0.0; 2];
    }
}

#[derive(Debug, Clone, Default)]
/// Ordered cascade of second-order sections. The output of each enabled section is the input to
/// the next one.
pub struct FilterChain {
    sections: Vec<SecondOrderSection>,
}

impl FilterChain {
    pub fn new(sections: Vec<SecondOrderSection>) -> Self {
        Self { sections }
    }

    /// Chain with no sections, which returns its input
    pub fn passthrough() -> Self {
        Self::default()
    }

    pub fn sections(&self) -> &[SecondOrderSection] {
        &self.sections
    }

    pub fn nr_enabled_sections(&self) -> usize {
        self.sections.iter().filter(|section| section.is_enabled()).count()
    }

    #[inline]
    pub fn step(&mut self, input: Float) -> Float {
        let mut value = input;

        for section in self.sections.iter_mut() {
            value = section.step(value);
        }

        value
    }

    /// Replaces the previous output of the last enabled section. Used for anti-windup, where the
    /// output of an integrator must restart from a saturated value. Chains without enabled sections
    /// have no memory and are left untouched.
    pub fn override_output(&mut self, value: Float) {
        if let Some(section) = self.sections.iter_mut().rev().find(|section| section.is_enabled()) {
            section.set_previous_output(value);
        }
    }

    pub fn reset(&mut self) {
        for section in self.sections.iter_mut() {
            section.reset();
        }
    }

    /// Product of the zero-frequency gains of the enabled sections
    pub fn dc_gain(&self) -> Float {
        self.sections
            .iter()
            .filter(|section| section.is_enabled())
            .map(|section| section.coefficients().dc_gain())
            .product()
    }
}
