//! Synthetic grids for tests, benches, and the `sample` command.
//!
//! - `sphere_shell`: value 0 on a thin spherical shell, 1 elsewhere. Under
//!   both constructions it carries one class in dimension `rank - 1`.
//! - `random_grid` / `random_levels`: seeded uniform noise, continuous or with
//!   few distinct values (many ties).

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::PersistenceError;
use crate::grid::Grid;

/// Default shell half-thickness; keeps the shell closed on a 5-wide grid.
pub const SHELL_THICKNESS: f64 = 0.85;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleKind {
    Sphere,
    Random,
    Levels,
}

impl FromStr for SampleKind {
    type Err = PersistenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sphere" | "shell" => Ok(Self::Sphere),
            "random" => Ok(Self::Random),
            "levels" => Ok(Self::Levels),
            other => Err(PersistenceError::unsupported(format!(
                "unknown sample kind {other:?}"
            ))),
        }
    }
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sphere => f.write_str("sphere"),
            Self::Random => f.write_str("random"),
            Self::Levels => f.write_str("levels"),
        }
    }
}

/// Cube grid of side `n` and the given rank: 0 where `|dist(center) - radius| <=
/// thickness`, 1 elsewhere. `radius` defaults to `(n - 1) / 2`.
pub fn sphere_shell(
    rank: usize,
    n: usize,
    radius: Option<f64>,
    thickness: f64,
) -> Result<Grid, PersistenceError> {
    let shape = vec![n; rank];
    let center = (n as f64 - 1.0) / 2.0;
    let radius = radius.unwrap_or(center);
    let total = n.checked_pow(rank as u32).unwrap_or(0);
    let values = (0..total)
        .map(|flat| {
            let mut rest = flat;
            let mut sq = 0.0;
            for _ in 0..rank {
                let x = (rest % n) as f64;
                rest /= n.max(1);
                sq += (x - center) * (x - center);
            }
            if (sq.sqrt() - radius).abs() <= thickness {
                0.0
            } else {
                1.0
            }
        })
        .collect();
    Grid::from_shape_vec(&shape, values)
}

/// Uniform values in `[0, 1)`.
pub fn random_grid(shape: &[usize], seed: u64) -> Result<Grid, PersistenceError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let total: usize = shape.iter().product();
    let values = (0..total).map(|_| rng.gen::<f64>()).collect();
    Grid::from_shape_vec(shape, values)
}

/// Integers in `[0, levels)`, as floats; lots of equal values.
pub fn random_levels(shape: &[usize], levels: u32, seed: u64) -> Result<Grid, PersistenceError> {
    if levels == 0 {
        return Err(PersistenceError::invalid("levels must be positive"));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let total: usize = shape.iter().product();
    let values = (0..total)
        .map(|_| f64::from(rng.gen_range(0..levels)))
        .collect();
    Grid::from_shape_vec(shape, values)
}
