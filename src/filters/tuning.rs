// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Discretisation of the continuous transfer functions used in the controller, using the Tustin
//! (bilinear) transform `s = 2/T · (1 - z⁻¹) / (1 + z⁻¹)`.
//!
//! All the functions return coefficients normalised so that `a0 = 1`.

use stormath::type_aliases::Float;

use super::SectionCoefficients;

/// Common denominator of the second-order shapes, `s² + 2·d·w·s + w²`, before normalisation
fn second_order_denominator(frequency: Float, damping: Float, sampling_interval: Float) -> [Float; 3] {
    let wt = frequency * sampling_interval;
    let q = 0.25 * wt * wt;

    [
        1.0 + damping * wt + q,
        -2.0 + 2.0 * q,
        1.0 - damping * wt + q,
    ]
}

fn normalised(b: [Float; 3], a: [Float; 3]) -> SectionCoefficients {
    let a0 = a[0];

    SectionCoefficients {
        b: [b[0] / a0, b[1] / a0, b[2] / a0],
        a: [1.0, a[1] / a0, a[2] / a0],
    }
}

/// Second-order lowpass filter, `w² / (s² + 2·d·w·s + w²)`, with `frequency` in rad/s.
pub fn low_pass(frequency: Float, damping: Float, sampling_interval: Float) -> SectionCoefficients {
    let wt = frequency * sampling_interval;
    let q = 0.25 * wt * wt;

    normalised(
        [q, 2.0 * q, q],
        second_order_denominator(frequency, damping, sampling_interval)
    )
}

/// Notch filter, `(s² + 2·dn·w·s + w²) / (s² + 2·dd·w·s + w²)`. The gain is one far from the
/// center frequency and `dn / dd` at it.
pub fn notch(
    frequency: Float,
    damping_numerator: Float,
    damping_denominator: Float,
    sampling_interval: Float,
) -> SectionCoefficients {
    normalised(
        second_order_denominator(frequency, damping_numerator, sampling_interval),
        second_order_denominator(frequency, damping_denominator, sampling_interval)
    )
}

/// Band-pass filter used by the drivetrain damper, `G·w²·s / (s² + 2·d·w·s + w²)`
pub fn band_pass(
    gain: Float,
    frequency: Float,
    damping: Float,
    sampling_interval: Float,
) -> SectionCoefficients {
    let k = 0.5 * gain * frequency * frequency * sampling_interval;

    normalised(
        [k, 0.0, -k],
        second_order_denominator(frequency, damping, sampling_interval)
    )
}

/// Error side of a PI controller `(Kp·s + Ki) / s`. Must be followed by [`accumulator`] in the
/// post-gain chain.
pub fn proportional_integral(kp: Float, ki: Float, sampling_interval: Float) -> SectionCoefficients {
    let half_step = 0.5 * ki * sampling_interval;

    SectionCoefficients {
        b: [kp + half_step, -(kp - half_step), 0.0],
        a: [1.0, 0.0, 0.0],
    }
}

/// Error side of a PI controller that outputs a rate. Must be followed by [`integrator`], which
/// lets the rate be limited before it is integrated.
pub fn proportional_integral_rate(kp: Float, ki: Float, sampling_interval: Float) -> SectionCoefficients {
    let pi = proportional_integral(kp, ki, sampling_interval);

    SectionCoefficients {
        b: [pi.b[0] / sampling_interval, pi.b[1] / sampling_interval, 0.0],
        a: pi.a,
    }
}

/// Discrete integrator, `y[n] = y[n-1] + T·x[n]`
pub fn integrator(sampling_interval: Float) -> SectionCoefficients {
    SectionCoefficients {
        b: [sampling_interval, 0.0, 0.0],
        a: [1.0, -1.0, 0.0],
    }
}

/// Running sum, `y[n] = y[n-1] + x[n]`
pub fn accumulator() -> SectionCoefficients {
    SectionCoefficients {
        b: [1.0, 0.0, 0.0],
        a: [1.0, -1.0, 0.0],
    }
}
