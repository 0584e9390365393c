//! Persistence pairing: union-find for dimension 0 and the top dimension,
//! coboundary column reduction for everything in between.
//!
//! Purpose
//! - Turn a filtered complex into `(dim, birth, death)` intervals with the
//!   cells that realize them.
//!
//! Why this design
//! - Dimension 0 is a greedy elder-rule sweep over edges; it is exact and
//!   near-linear. Its merge edges are exactly the columns that the dimension-1
//!   reduction may skip (clearing).
//! - Dimensions >= 1 reduce coboundary columns in decreasing filtration order.
//! - `PairingStrategy::LinkFind` is the union-find sweep in dimension 0 plus the
//!   apparent-pair shortcut above it. `ComputePairs` runs the plain reduction
//!   in every dimension, dimension 0 included. Both must agree on every
//!   interval, which is what `verify` checks.
//! - The top dimension `D - 1` alone can be read off a union-find on the dual
//!   graph of top cells (Alexander duality), which is what `top_dim` uses.
//!
//! All working state (disjoint sets, pivot maps, stored columns) lives inside
//! one call.

mod reduce;
mod union_find;

pub use reduce::ColumnReducer;
pub use union_find::{pair_dim0, pair_top_dim, DisjointSets};

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::complex::CellId;
use crate::error::PersistenceError;
use crate::filtration::FiltrationKey;

/// How intervals are paired.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PairingStrategy {
    /// Union-find in dimension 0. Above it, a column is paired with its
    /// minimal coface directly when both share a value and that pivot is
    /// free; such columns are regenerated on demand instead of stored.
    #[default]
    LinkFind,
    /// Column reduction in every dimension, storing every reduced column.
    ComputePairs,
}

impl FromStr for PairingStrategy {
    type Err = PersistenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "link-find" | "linkfind" => Ok(Self::LinkFind),
            "compute-pairs" | "computepairs" => Ok(Self::ComputePairs),
            other => Err(PersistenceError::unsupported(format!(
                "unknown pairing strategy {other:?}"
            ))),
        }
    }
}

impl fmt::Display for PairingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinkFind => f.write_str("link-find"),
            Self::ComputePairs => f.write_str("compute-pairs"),
        }
    }
}

/// One interval together with the cells that create and destroy it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PersistencePair {
    pub dim: usize,
    pub birth: f64,
    /// `f64::INFINITY` for essential classes.
    pub death: f64,
    pub birth_cell: CellId,
    pub death_cell: Option<CellId>,
}

impl PersistencePair {
    pub(crate) fn finite(dim: usize, birth: FiltrationKey, death: FiltrationKey) -> Self {
        Self {
            dim,
            birth: birth.value,
            death: death.value,
            birth_cell: birth.id,
            death_cell: Some(death.id),
        }
    }

    pub(crate) fn essential(dim: usize, birth: FiltrationKey) -> Self {
        Self {
            dim,
            birth: birth.value,
            death: f64::INFINITY,
            birth_cell: birth.id,
            death_cell: None,
        }
    }

    pub fn is_essential(&self) -> bool {
        self.death_cell.is_none()
    }

    pub fn persistence(&self) -> f64 {
        self.death - self.birth
    }
}

/// Intervals of one dimension plus the cells that died in it.
#[derive(Clone, Debug, Default)]
pub struct DimensionPairs {
    pub dim: usize,
    pub pairs: Vec<PersistencePair>,
    /// Every death cell, zero-length pairs included; these columns are
    /// skipped when reducing the next dimension.
    pub deaths: HashSet<CellId>,
}

impl DimensionPairs {
    pub(crate) fn new(dim: usize) -> Self {
        Self {
            dim,
            ..Self::default()
        }
    }

    /// Record a merge or reduction event; zero-length intervals only clear.
    pub(crate) fn record(
        &mut self,
        birth: FiltrationKey,
        death: FiltrationKey,
    ) -> Result<(), PersistenceError> {
        if death.value < birth.value {
            return Err(PersistenceError::inconsistent(format!(
                "dimension {} pair dies at {} before its birth at {}",
                self.dim, death.value, birth.value
            )));
        }
        self.deaths.insert(death.id);
        if death.value > birth.value {
            self.pairs.push(PersistencePair::finite(self.dim, birth, death));
        }
        Ok(())
    }

    pub fn essential_count(&self) -> usize {
        self.pairs.iter().filter(|p| p.is_essential()).count()
    }
}

#[cfg(test)]
mod tests_reference;
