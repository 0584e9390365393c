//! Dense input grids and the filtration convention applied to them.
//!
//! Purpose
//! - Own the numeric array a complex is built from, validated once: rank in
//!   `[1, 4]`, no empty axis, every value finite.
//! - Keep values in one row-major buffer (last axis fastest) so lookups by
//!   coordinate are a dot product with precomputed strides.
//!
//! `Grid` converts to and from `ndarray::ArrayD<f64>`; file readers and the
//! Python bindings go through those conversions.

use std::fmt;
use std::str::FromStr;

use ndarray::{ArrayD, IxDyn};

use crate::error::PersistenceError;

/// Largest supported grid rank.
pub const MAX_RANK: usize = 4;

/// Which cells receive the grid values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Construction {
    /// Grid values label vertices; a cell takes the max over its vertices.
    #[default]
    V,
    /// Grid values label top cells; a cell takes the min over incident top cells.
    T,
}

impl FromStr for Construction {
    type Err = PersistenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "V" | "v" => Ok(Self::V),
            "T" | "t" => Ok(Self::T),
            other => Err(PersistenceError::unsupported(format!(
                "construction must be \"V\" or \"T\", got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Construction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V => f.write_str("V"),
            Self::T => f.write_str("T"),
        }
    }
}

/// Validated dense grid of rank 1 to 4.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    shape: Vec<usize>,
    strides: Vec<usize>,
    values: Vec<f64>,
}

impl Grid {
    /// Build from a shape and row-major values.
    pub fn from_shape_vec(shape: &[usize], mut values: Vec<f64>) -> Result<Self, PersistenceError> {
        let rank = shape.len();
        if rank == 0 || rank > MAX_RANK {
            return Err(PersistenceError::invalid(format!(
                "grid rank must be in [1, {MAX_RANK}], got {rank}"
            )));
        }
        if let Some(axis) = shape.iter().position(|&n| n == 0) {
            return Err(PersistenceError::invalid(format!("axis {axis} is empty")));
        }
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(PersistenceError::invalid(format!(
                "shape {shape:?} needs {expected} values, got {}",
                values.len()
            )));
        }
        if let Some(at) = values.iter().position(|v| !v.is_finite()) {
            return Err(PersistenceError::invalid(format!(
                "non-finite value {} at flat index {at}",
                values[at]
            )));
        }
        // -0.0 would sort before 0.0 under total_cmp and break face <= coface.
        for v in values.iter_mut() {
            *v += 0.0;
        }
        Ok(Self {
            shape: shape.to_vec(),
            strides: row_major_strides(shape),
            values,
        })
    }

    /// Build from an `ndarray` array of any memory layout.
    pub fn from_array(array: &ArrayD<f64>) -> Result<Self, PersistenceError> {
        let values = array.iter().copied().collect();
        Self::from_shape_vec(array.shape(), values)
    }

    /// Copy into an `ndarray` array in standard layout.
    pub fn to_array(&self) -> ArrayD<f64> {
        // Shape and length were checked at construction.
        ArrayD::from_shape_vec(IxDyn(&self.shape), self.values.clone())
            .unwrap_or_else(|_| ArrayD::zeros(IxDyn(&self.shape)))
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Row-major values, last axis fastest.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at `coord`, or `None` when any component is out of range or the
    /// coordinate has the wrong length.
    pub fn get(&self, coord: &[usize]) -> Option<f64> {
        if coord.len() != self.rank() {
            return None;
        }
        let mut flat = 0;
        for ((&c, &n), &s) in coord.iter().zip(&self.shape).zip(&self.strides) {
            if c >= n {
                return None;
            }
            flat += c * s;
        }
        Some(self.values[flat])
    }

    /// Unchecked lookup for in-range coordinates; components past `rank` are ignored.
    #[inline]
    pub(crate) fn at(&self, coord: &[usize; MAX_RANK]) -> f64 {
        let mut flat = 0;
        for (c, s) in coord.iter().zip(&self.strides) {
            flat += c * s;
        }
        self.values[flat]
    }

    pub fn min_value(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

pub(crate) fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}
