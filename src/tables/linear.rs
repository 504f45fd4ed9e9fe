// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

use serde::{Deserialize, Serialize};

use stormath::type_aliases::Float;

use crate::error::Error;

use super::{check_ascending, lerp, segment_index};

/// Raw table data, as given in a configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LookupTableData {
    pub x: Vec<Float>,
    pub y: Vec<Float>,
}

impl LookupTableData {
    pub fn new(x: &[Float], y: &[Float]) -> Self {
        Self {
            x: x.to_vec(),
            y: y.to_vec(),
        }
    }

    /// Single point table, which evaluates to `value` everywhere
    pub fn constant(value: Float) -> Self {
        Self {
            x: vec![0.0],
            y: vec![value],
        }
    }

    pub fn build(&self) -> Result<LookupTable1D, Error> {
        LookupTable1D::new(&self.x, &self.y)
    }
}

#[derive(Debug, Clone)]
/// Piecewise linear function defined by an ordered set of points. Values outside the range of
/// the table are extrapolated with the slope of the nearest segment.
pub struct LookupTable1D {
    x: Vec<Float>,
    y: Vec<Float>,
}

impl LookupTable1D {
    /// Maximum number of points in a table
    pub const MAX_POINTS: usize = 100;

    pub fn new(x: &[Float], y: &[Float]) -> Result<Self, Error> {
        if x.is_empty() {
            return Err(Error::Table("no points in table".to_string()));
        }

        if x.len() > Self::MAX_POINTS {
            return Err(Error::Table(format!(
                "too many points in table: {} (maximum {})", x.len(), Self::MAX_POINTS
            )));
        }

        if x.len() != y.len() {
            return Err(Error::Table(format!(
                "number of x values ({}) differs from number of y values ({})", x.len(), y.len()
            )));
        }

        check_ascending(x, "x")?;

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
        })
    }

    pub fn eval(&self, x: Float) -> Float {
        let n = self.x.len();

        if n == 1 {
            return self.y[0];
        }

        let upper = segment_index(&self.x, x);

        let x0 = self.x[upper - 1];
        let x1 = self.x[upper];

        let t = (x - x0) / (x1 - x0);

        lerp(self.y[upper - 1], self.y[upper], t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::Rng;

    fn random_table(rng: &mut impl Rng, n: usize) -> (Vec<Float>, Vec<Float>) {
        let mut x = Vec::with_capacity(n);
        let mut current: Float = rng.random_range(-10.0..10.0);

        for _ in 0..n {
            x.push(current);
            current += rng.random_range(0.01..5.0);
        }

        let y = (0..n).map(|_| rng.random_range(-100.0..100.0)).collect();

        (x, y)
    }

    #[test]
    fn stored_points_are_returned_exactly() {
        let mut rng = rand::rng();

        for n in 1..20 {
            let (x, y) = random_table(&mut rng, n);
            let table = LookupTable1D::new(&x, &y).unwrap();

            for i in 0..n {
                assert_eq!(table.eval(x[i]), y[i]);
            }
        }
    }

    #[test]
    fn monotone_between_points() {
        let mut rng = rand::rng();
        let (x, y) = random_table(&mut rng, 12);
        let table = LookupTable1D::new(&x, &y).unwrap();

        for i in 1..x.len() {
            let increasing = y[i] >= y[i - 1];
            let mut previous = table.eval(x[i - 1]);

            for k in 1..=10 {
                let value = table.eval(x[i - 1] + (x[i] - x[i - 1]) * k as Float / 10.0);

                if increasing {
                    assert!(value >= previous - 1e-9);
                } else {
                    assert!(value <= previous + 1e-9);
                }

                previous = value;
            }
        }
    }

    #[test]
    fn extrapolation_follows_end_segments() {
        let table = LookupTable1D::new(&[0.0, 1.0, 2.0], &[0.0, 2.0, 3.0]).unwrap();

        assert!((table.eval(4.0) - 5.0).abs() < 1e-12);
        assert!((table.eval(-1.0) + 2.0).abs() < 1e-12);
        assert!((table.eval(1.5) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn non_finite_queries_do_not_panic() {
        let table = LookupTable1D::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0]).unwrap();

        assert!(table.eval(Float::NAN).is_nan());
        assert!(!table.eval(Float::INFINITY).is_finite());
        assert!(!table.eval(Float::NEG_INFINITY).is_finite());
    }

    #[test]
    fn single_point_is_constant() {
        let table = LookupTableData::constant(0.103).build().unwrap();

        assert_eq!(table.eval(-1e3), 0.103);
        assert_eq!(table.eval(1e3), 0.103);
    }

    #[test]
    fn malformed_tables_are_rejected() {
        assert!(LookupTable1D::new(&[], &[]).is_err());
        assert!(LookupTable1D::new(&[0.0, 1.0], &[0.0]).is_err());
        assert!(LookupTable1D::new(&[0.0, 2.0, 1.0], &[0.0, 1.0, 2.0]).is_err());

        let too_many: Vec<Float> = (0..LookupTable1D::MAX_POINTS + 1).map(|i| i as Float).collect();

        assert!(LookupTable1D::new(&too_many, &too_many).is_err());
    }
}
