//! Engine entry points: validate, build the complex, pair, assemble.
//!
//! Purpose
//! - One call turns a grid plus a `PhConfig` into a `Diagram`. V and T are
//!   also reachable through their own entry points (`compute_v`, `compute_t`).
//!
//! Pipeline
//! - `embedded` swaps the grid for its padded, negated dual first.
//! - `top_dim` pairs dimension `D - 1` only, on the dual graph of top cells.
//! - Otherwise dimension 0 (union-find under `LinkFind`, column reduction
//!   under `ComputePairs`), then `1..=maxdim` by column reduction, each
//!   dimension clearing the death cells of the previous one.
//! - `verify` reruns every dimension with the other strategy and fails with
//!   `InternalConsistency` if the intervals differ.
//!
//! Every call owns its working state; independent calls may run on separate
//! threads.

use std::collections::HashSet;
use std::time::Instant;

use tracing::debug;

use crate::complex::CubicalComplex;
use crate::duality::{embed, EMBED_PAD};
use crate::error::PersistenceError;
use crate::grid::{Construction, Grid};
use crate::pairing::{pair_dim0, pair_top_dim, ColumnReducer, DimensionPairs, PairingStrategy};
use crate::result::{assemble, Diagram, Location};

/// Engine options; `Default` matches the command-line defaults.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhConfig {
    /// Highest dimension to compute, at most `rank - 1`.
    pub maxdim: usize,
    pub top_dim: bool,
    pub embedded: bool,
    pub location: Location,
    pub construction: Construction,
    pub strategy: PairingStrategy,
    /// Cells valued at or above this are left out of the complex.
    pub threshold: Option<f64>,
    pub verify: bool,
}

impl Default for PhConfig {
    fn default() -> Self {
        Self {
            maxdim: 2,
            top_dim: false,
            embedded: false,
            location: Location::Yes,
            construction: Construction::V,
            strategy: PairingStrategy::LinkFind,
            threshold: None,
            verify: false,
        }
    }
}

impl PhConfig {
    pub fn with_maxdim(mut self, maxdim: usize) -> Self {
        self.maxdim = maxdim;
        self
    }

    pub fn with_top_dim(mut self, top_dim: bool) -> Self {
        self.top_dim = top_dim;
        self
    }

    pub fn with_embedded(mut self, embedded: bool) -> Self {
        self.embedded = embedded;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn with_construction(mut self, construction: Construction) -> Self {
        self.construction = construction;
        self
    }

    pub fn with_strategy(mut self, strategy: PairingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_threshold(mut self, threshold: Option<f64>) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// `maxdim` lowered to what a grid of `rank` supports.
    pub fn clamped_to(mut self, rank: usize) -> Self {
        self.maxdim = self.maxdim.min(rank.saturating_sub(1));
        self
    }

    /// Checks that need the grid; runs before any cell is enumerated.
    pub fn validate(&self, grid: &Grid) -> Result<(), PersistenceError> {
        let rank = grid.rank();
        if self.maxdim + 1 > rank {
            return Err(PersistenceError::invalid(format!(
                "maxdim must be in [0, {}] for a rank-{rank} grid, got {}",
                rank - 1,
                self.maxdim
            )));
        }
        if let Some(t) = self.threshold {
            if t.is_nan() {
                return Err(PersistenceError::invalid("threshold is NaN"));
            }
        }
        Ok(())
    }
}

/// Positional entry point with the default strategy and no threshold.
pub fn compute_persistence(
    grid: &Grid,
    maxdim: usize,
    top_dim: bool,
    embedded: bool,
    location: Location,
    construction: Construction,
) -> Result<Diagram, PersistenceError> {
    let config = PhConfig {
        maxdim,
        top_dim,
        embedded,
        location,
        construction,
        ..PhConfig::default()
    };
    compute_with_config(grid, &config)
}

/// V-construction, whatever `config.construction` says.
pub fn compute_v(grid: &Grid, config: &PhConfig) -> Result<Diagram, PersistenceError> {
    compute_with_config(grid, &config.with_construction(Construction::V))
}

/// T-construction, whatever `config.construction` says.
pub fn compute_t(grid: &Grid, config: &PhConfig) -> Result<Diagram, PersistenceError> {
    compute_with_config(grid, &config.with_construction(Construction::T))
}

pub fn compute_with_config(grid: &Grid, config: &PhConfig) -> Result<Diagram, PersistenceError> {
    config.validate(grid)?;
    let started = Instant::now();

    let dual;
    let (work, pad) = if config.embedded {
        dual = embed(grid)?;
        (&dual, EMBED_PAD)
    } else {
        (grid, 0)
    };
    let complex = CubicalComplex::new(work, config.construction, config.threshold);
    debug!(
        shape = ?work.shape(),
        construction = %config.construction,
        embedded = config.embedded,
        top_dim = config.top_dim,
        maxdim = config.maxdim,
        "complex ready"
    );

    let dims = pair_dimensions(&complex, config.maxdim, config.top_dim, config.strategy)?;
    if config.verify && !config.top_dim {
        let other = match config.strategy {
            PairingStrategy::LinkFind => PairingStrategy::ComputePairs,
            PairingStrategy::ComputePairs => PairingStrategy::LinkFind,
        };
        let check = pair_dimensions(&complex, config.maxdim, false, other)?;
        ensure_same_intervals(&dims, &check)?;
    }

    let diagram = assemble(&complex, &dims, config.location, pad, config.embedded);
    debug!(
        records = diagram.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "persistence done"
    );
    Ok(diagram)
}

/// Per-dimension intervals of an already built complex.
pub fn pair_dimensions(
    complex: &CubicalComplex<'_>,
    maxdim: usize,
    top_dim: bool,
    strategy: PairingStrategy,
) -> Result<Vec<DimensionPairs>, PersistenceError> {
    if top_dim {
        return Ok(vec![pair_top_dim(complex)?]);
    }
    let reducer = ColumnReducer::new(complex, strategy);
    let first = match strategy {
        PairingStrategy::LinkFind => pair_dim0(complex)?,
        PairingStrategy::ComputePairs => reducer.reduce(0, &HashSet::new())?,
    };
    let mut dims = vec![first];
    for dim in 1..=maxdim.min(complex.rank().saturating_sub(1)) {
        let next = reducer.reduce(dim, &dims[dim - 1].deaths)?;
        dims.push(next);
    }
    Ok(dims)
}

fn interval_multiset(dims: &[DimensionPairs]) -> Vec<(usize, u64, u64)> {
    let mut out: Vec<(usize, u64, u64)> = dims
        .iter()
        .flat_map(|d| d.pairs.iter())
        .map(|p| (p.dim, p.birth.to_bits(), p.death.to_bits()))
        .collect();
    out.sort_unstable();
    out
}

fn ensure_same_intervals(
    a: &[DimensionPairs],
    b: &[DimensionPairs],
) -> Result<(), PersistenceError> {
    let (ia, ib) = (interval_multiset(a), interval_multiset(b));
    if ia != ib {
        let first = ia
            .iter()
            .zip(&ib)
            .position(|(x, y)| x != y)
            .unwrap_or(ia.len().min(ib.len()));
        return Err(PersistenceError::inconsistent(format!(
            "pairing strategies disagree: {} vs {} intervals, first difference at sorted index {first}",
            ia.len(),
            ib.len()
        )));
    }
    Ok(())
}
