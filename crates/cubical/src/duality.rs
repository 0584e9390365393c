//! Alexander duality for the embedded mode.
//!
//! `embed` pads every axis with one layer of `-f64::MAX` and negates the
//! interior. Persistence of the padded grid lives on the dual side: a class of
//! dimension `i` with interval `(b, d)` corresponds to a primal class of
//! dimension `D - 1 - i` with interval `(-d, -b)`. `to_primal` applies that
//! remap as a pure transform over finished results.
//!
//! Dual classes born on the padding (`b = -f64::MAX`) come back as primal
//! essential classes. The dual's essential class in dimension 0 is the extra
//! generator of unreduced homology and has no primal counterpart.

use ndarray::{ArrayD, Dimension, IxDyn};

use crate::error::PersistenceError;
use crate::grid::Grid;
use crate::pairing::PersistencePair;
use crate::result::{PersistenceRecord, ESSENTIAL_DEATH};

/// Value of the padding layer.
pub const EMBED_FILL: f64 = -f64::MAX;

/// Padding width per side and axis; embedded coordinates shift back by this.
pub const EMBED_PAD: usize = 1;

/// Padded, negated copy of `grid`.
pub fn embed(grid: &Grid) -> Result<Grid, PersistenceError> {
    let padded_shape: Vec<usize> = grid.shape().iter().map(|n| n + 2 * EMBED_PAD).collect();
    let mut padded = ArrayD::from_elem(IxDyn(&padded_shape), EMBED_FILL);
    for (index, &v) in grid.to_array().indexed_iter() {
        let shifted: Vec<usize> = index.slice().iter().map(|i| i + EMBED_PAD).collect();
        padded[&shifted[..]] = -v;
    }
    Grid::from_array(&padded)
}

fn flip(value: f64) -> f64 {
    -value + 0.0
}

/// Remap dual pairs of a rank-`rank` embedding to primal pairs.
pub fn to_primal(pairs: &[PersistencePair], rank: usize) -> Vec<PersistencePair> {
    pairs
        .iter()
        .filter(|p| !p.is_essential() && p.dim < rank)
        .map(|p| {
            let dim = rank - 1 - p.dim;
            match p.death_cell {
                Some(death_cell) if p.birth > EMBED_FILL => PersistencePair {
                    dim,
                    birth: flip(p.death),
                    death: flip(p.birth),
                    birth_cell: death_cell,
                    death_cell: Some(p.birth_cell),
                },
                _ => PersistencePair {
                    dim,
                    birth: flip(p.death),
                    death: f64::INFINITY,
                    birth_cell: p.death_cell.unwrap_or(p.birth_cell),
                    death_cell: None,
                },
            }
        })
        .collect()
}

/// Same remap on assembled records, keeping the essential sentinel.
pub fn records_to_primal(records: &[PersistenceRecord], rank: usize) -> Vec<PersistenceRecord> {
    records
        .iter()
        .filter(|r| !r.is_essential() && r.dim < rank)
        .map(|r| {
            let death = if r.birth > EMBED_FILL {
                flip(r.birth)
            } else {
                ESSENTIAL_DEATH
            };
            let death_coord = if death == ESSENTIAL_DEATH {
                [0; 3]
            } else {
                r.birth_coord
            };
            PersistenceRecord {
                dim: rank - 1 - r.dim,
                birth: flip(r.death),
                death,
                birth_coord: r.death_coord,
                death_coord,
            }
        })
        .collect()
}
