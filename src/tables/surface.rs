// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

use std::path::Path;

use serde::{Deserialize, Serialize};

use stormath::type_aliases::Float;

use crate::error::Error;

use super::{check_ascending, lerp, segment_index};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// Where the data for a surface comes from.
pub enum SurfaceSource {
    /// Data given directly in the configuration. `z` is stored row by row, with one row per y
    /// value, i.e. `z[j * x.len() + i]` is the value at `(x[i], y[j])`.
    Inline {
        x: Vec<Float>,
        y: Vec<Float>,
        z: Vec<Float>,
    },
    /// Path to a binary table file, see [`LookupTable2D::from_bytes`]
    File(String),
}

impl SurfaceSource {
    pub fn build(&self) -> Result<LookupTable2D, Error> {
        match self {
            SurfaceSource::Inline { x, y, z } => LookupTable2D::new(x, y, z),
            SurfaceSource::File(path) => LookupTable2D::from_file(path),
        }
    }
}

#[derive(Debug, Clone)]
/// Surface defined on an ascending rectangular grid. Values are found with bilinear interpolation
/// inside the grid and bilinear extrapolation outside it, using the nearest cell.
pub struct LookupTable2D {
    x: Vec<Float>,
    y: Vec<Float>,
    z: Vec<Float>,
}

impl LookupTable2D {
    /// Number of dimensions written in the header of a surface file: two inputs and one output
    const FILE_DIMENSIONS: i32 = 3;
    /// Size of the three `i32` header fields, and of each `f64` value, in a surface file
    const HEADER_BYTES: usize = 12;
    const VALUE_BYTES: usize = 8;

    pub fn new(x: &[Float], y: &[Float], z: &[Float]) -> Result<Self, Error> {
        if x.len() < 2 || y.len() < 2 {
            return Err(Error::Table(format!(
                "surface needs at least two points per axis, got {} x {}", x.len(), y.len()
            )));
        }

        if z.len() != x.len() * y.len() {
            return Err(Error::Table(format!(
                "expected {} surface values, got {}", x.len() * y.len(), z.len()
            )));
        }

        check_ascending(x, "x")?;
        check_ascending(y, "y")?;

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            z: z.to_vec(),
        })
    }

    /// Builds a surface from a flat buffer containing `{xcount, ycount, x values..., y values...,
    /// z values...}`, with the z values stored row by row, one row per y value.
    pub fn from_flat(data: &[Float]) -> Result<Self, Error> {
        if data.len() < 2 {
            return Err(Error::Table("buffer too short for the point counts".to_string()));
        }

        let values = &data[2..];

        let nx = Self::count_from_float(data[0], values.len())?;
        let ny = Self::count_from_float(data[1], values.len())?;

        let total = Self::nr_values(nx, ny)?;

        if values.len() != total {
            return Err(Error::Table(format!(
                "expected {} values after the point counts, got {}", total, values.len()
            )));
        }

        Self::new(&values[..nx], &values[nx..nx + ny], &values[nx + ny..])
    }

    /// Builds a surface from the contents of a binary table file. The layout is, in native byte
    /// order:
    /// - `i32` number of dimensions, which must be 3
    /// - `i32` number of x points and `i32` number of y points
    /// - `f64` x values, then `f64` y values, then `f64` z values row by row
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut reader = ByteReader { bytes, position: 0 };

        let dims = reader.read_i32()?;

        if dims != Self::FILE_DIMENSIONS {
            return Err(Error::Table("bad dims: expecting 2D table".to_string()));
        }

        let nx = reader.read_i32()?;
        let ny = reader.read_i32()?;

        if nx < 1 || ny < 1 {
            return Err(Error::Table("bad ndata".to_string()));
        }

        let (nx, ny) = (nx as usize, ny as usize);

        let total = Self::nr_values(nx, ny)?;

        let expected_bytes = total
            .checked_mul(Self::VALUE_BYTES)
            .and_then(|value_bytes| value_bytes.checked_add(Self::HEADER_BYTES))
            .ok_or_else(|| Error::Table("bad ndata".to_string()))?;

        if bytes.len() != expected_bytes {
            return Err(Error::Table(format!(
                "expected {} bytes of surface data, got {}", expected_bytes, bytes.len()
            )));
        }

        let mut values: Vec<Float> = Vec::with_capacity(total);

        for _ in 0..total {
            values.push(reader.read_f64()? as Float);
        }

        Self::new(&values[..nx], &values[nx..nx + ny], &values[nx + ny..])
    }

    pub fn from_file<P: AsRef<Path>>(file_path: P) -> Result<Self, Error> {
        let bytes = std::fs::read(file_path)?;

        Self::from_bytes(&bytes)
    }

    /// Serializes the surface to the binary file layout read by [`Self::from_bytes`]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            Self::HEADER_BYTES + Self::VALUE_BYTES * (self.x.len() + self.y.len() + self.z.len())
        );

        out.extend_from_slice(&Self::FILE_DIMENSIONS.to_ne_bytes());
        out.extend_from_slice(&(self.x.len() as i32).to_ne_bytes());
        out.extend_from_slice(&(self.y.len() as i32).to_ne_bytes());

        for value in self.x.iter().chain(self.y.iter()).chain(self.z.iter()) {
            out.extend_from_slice(&(*value as f64).to_ne_bytes());
        }

        out
    }

    pub fn x_values(&self) -> &[Float] {
        &self.x
    }

    pub fn y_values(&self) -> &[Float] {
        &self.y
    }

    /// Value stored at grid point `(x[i], y[j])`
    pub fn value_at(&self, i: usize, j: usize) -> Float {
        self.z[j * self.x.len() + i]
    }

    pub fn eval(&self, ix: Float, iy: Float) -> Float {
        let i = segment_index(&self.x, ix);
        let j = segment_index(&self.y, iy);

        let nx = self.x.len();

        let row0 = &self.z[(j - 1) * nx..j * nx];
        let row1 = &self.z[j * nx..(j + 1) * nx];

        let tx = (ix - self.x[i - 1]) / (self.x[i] - self.x[i - 1]);
        let ty = (iy - self.y[j - 1]) / (self.y[j] - self.y[j - 1]);

        let o0 = lerp(row0[i - 1], row0[i], tx);
        let o1 = lerp(row1[i - 1], row1[i], tx);

        lerp(o0, o1, ty)
    }

    /// Number of values after the header: x, y and then z values
    fn nr_values(nx: usize, ny: usize) -> Result<usize, Error> {
        nx.checked_mul(ny)
            .and_then(|nz| nz.checked_add(nx))
            .and_then(|partial| partial.checked_add(ny))
            .ok_or_else(|| Error::Table(format!("point counts too large: {} x {}", nx, ny)))
    }

    /// Point count stored as a float. A count can never exceed the number of values that follow.
    fn count_from_float(value: Float, nr_available: usize) -> Result<usize, Error> {
        if value.is_finite() && value >= 1.0 && value.fract() == 0.0 && value <= nr_available as Float {
            Ok(value as usize)
        } else {
            Err(Error::Table(format!("bad point count: {}", value)))
        }
    }
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let end = self.position + N;

        let slice = self.bytes.get(self.position..end).ok_or_else(|| {
            Error::Table("unexpected end of surface data".to_string())
        })?;

        let mut out = [0u8; N];
        out.copy_from_slice(slice);

        self.position = end;

        Ok(out)
    }

    fn read_i32(&mut self) -> Result<i32, Error> {
        Ok(i32::from_ne_bytes(self.take::<4>()?))
    }

    fn read_f64(&mut self) -> Result<f64, Error> {
        Ok(f64::from_ne_bytes(self.take::<8>()?))
    }
}
