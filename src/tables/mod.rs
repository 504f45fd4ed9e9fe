// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Monotonic lookup tables used for all the static nonlinear maps in the controller, such as
//! optimum torque curves, gain schedules and thrust surfaces.

pub mod linear;
pub mod surface;

pub use linear::{LookupTable1D, LookupTableData};
pub use surface::{LookupTable2D, SurfaceSource};

use stormath::type_aliases::Float;

use crate::error::Error;

/// Linear interpolation written so that `t == 0` returns `y0` and `t == 1` returns `y1` exactly.
/// Values of `t` outside `[0, 1]` extrapolate along the same line.
#[inline(always)]
pub(crate) fn lerp(y0: Float, y1: Float, t: Float) -> Float {
    (1.0 - t) * y0 + t * y1
}

/// Upper index of the segment `(values[k-1], values[k])` to use for `query`, for ascending
/// `values` with at least two points. Queries at or beyond the first or last coordinate use the
/// boundary segment, so the evaluation extrapolates linearly. A NaN query also lands on the first
/// segment and evaluates to NaN.
#[inline]
pub(crate) fn segment_index(values: &[Float], query: Float) -> usize {
    values
        .partition_point(|&value| value <= query)
        .clamp(1, values.len() - 1)
}

/// Checks that the coordinate values are strictly ascending
pub(crate) fn check_ascending(values: &[Float], axis: &str) -> Result<(), Error> {
    for i in 1..values.len() {
        if !(values[i] > values[i - 1]) {
            return Err(Error::Table(format!("{} values not ascending", axis)));
        }
    }

    Ok(())
}
