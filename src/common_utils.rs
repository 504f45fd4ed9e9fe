// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Small numeric helpers used across the control components.

use stormath::type_aliases::Float;

/// Limits a value to the range `[lower, upper]`.
///
/// Unlike `Float::clamp` this never panics when the limits cross. The upper limit is applied first,
/// so the lower limit wins when `lower > upper`.
#[inline(always)]
pub fn saturate(value: Float, lower: Float, upper: Float) -> Float {
    let capped = if value > upper { upper } else { value };

    if capped < lower { lower } else { capped }
}

/// Moves from `old_value` towards `raw_new_value`, with the change per call limited to the range
/// `[min_change, max_change]`. `min_change` is normally negative.
#[inline(always)]
pub fn limit_change(
    old_value: Float,
    raw_new_value: Float,
    min_change: Float,
    max_change: Float,
) -> Float {
    let raw_difference = raw_new_value - old_value;

    if raw_difference > max_change {
        old_value + max_change
    } else if raw_difference < min_change {
        old_value + min_change
    } else {
        raw_new_value
    }
}

/// Denominator used where a division by a measured speed must stay finite
pub const SPEED_EPSILON: Float = 1.0e-6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturate_with_crossed_limits() {
        assert_eq!(saturate(5.0, 0.0, 10.0), 5.0);
        assert_eq!(saturate(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(saturate(11.0, 0.0, 10.0), 10.0);
        assert_eq!(saturate(3.0, 4.0, 2.0), 4.0);
    }

    #[test]
    fn change_is_limited_both_ways() {
        assert_eq!(limit_change(1.0, 5.0, -0.5, 0.25), 1.25);
        assert_eq!(limit_change(1.0, -5.0, -0.5, 0.25), 0.5);
        assert_eq!(limit_change(1.0, 1.1, -0.5, 0.25), 1.1);
    }
}
