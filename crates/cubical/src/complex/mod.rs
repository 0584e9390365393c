//! Filtered cubical complex over a grid, with implicit adjacency.
//!
//! Purpose
//! - Assign a filtration value to every cell of the vertex lattice under the
//!   V- or T-construction, and list facets/cofacets of a cell on demand.
//!
//! Why this design
//! - Nothing is materialized: a cell is `(coordinate, mask)`, its neighbours
//!   come from collapsing or extending one axis, and its value is recomputed
//!   from at most 16 grid entries. Memory stays proportional to the grid.
//!
//! Conventions
//! - V-construction: the lattice is the grid itself; a cell takes the max of
//!   its `2^dim` vertices (lower-star filtration).
//! - T-construction: the lattice has one more point per axis (voxel corners);
//!   a cell takes the min over the voxels it bounds (upper-star dual).
//! - With a threshold `t`, cells valued `>= t` are absent; without one the
//!   limit is `f64::MAX`, so voxels read as missing never enter. Faces never
//!   exceed their cofaces, so what remains is a subcomplex.

mod cell;

pub use cell::{Cell, CellId, Lattice, Neighbors};

use crate::filtration::FiltrationKey;
use crate::grid::{Construction, Grid, MAX_RANK};

/// Read-only view of a grid as a filtered cubical complex.
#[derive(Clone, Debug)]
pub struct CubicalComplex<'g> {
    grid: &'g Grid,
    construction: Construction,
    threshold: Option<f64>,
    lattice: Lattice,
}

impl<'g> CubicalComplex<'g> {
    pub fn new(grid: &'g Grid, construction: Construction, threshold: Option<f64>) -> Self {
        let lattice = match construction {
            Construction::V => Lattice::new(grid.shape()),
            Construction::T => {
                let corners: Vec<usize> = grid.shape().iter().map(|n| n + 1).collect();
                Lattice::new(&corners)
            }
        };
        Self {
            grid,
            construction,
            threshold,
            lattice,
        }
    }

    pub fn grid(&self) -> &'g Grid {
        self.grid
    }

    pub fn construction(&self) -> Construction {
        self.construction
    }

    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    pub fn rank(&self) -> usize {
        self.lattice.rank()
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn id(&self, cell: &Cell) -> CellId {
        self.lattice.id(cell)
    }

    pub fn cell(&self, id: CellId) -> Cell {
        self.lattice.cell(id)
    }

    /// Filtration value, or `None` if the cell is off the lattice or above the threshold.
    pub fn value(&self, cell: &Cell) -> Option<f64> {
        if !self.lattice.contains(cell) {
            return None;
        }
        self.admit(self.raw_value(cell))
    }

    pub fn key(&self, cell: &Cell) -> Option<FiltrationKey> {
        self.value(cell)
            .map(|value| FiltrationKey::new(value, self.lattice.id(cell)))
    }

    #[inline]
    fn admit(&self, value: f64) -> Option<f64> {
        if value >= self.threshold.unwrap_or(f64::MAX) {
            None
        } else {
            Some(value)
        }
    }

    /// Value of a lattice cell ignoring the threshold.
    pub(crate) fn raw_value(&self, cell: &Cell) -> f64 {
        match self.construction {
            Construction::V => self
                .vertices(cell)
                .map(|v| self.grid.at(&v))
                .fold(f64::NEG_INFINITY, f64::max),
            Construction::T => self
                .incident_voxels(cell)
                .map(|v| self.grid.at(&v))
                .fold(f64::INFINITY, f64::min),
        }
    }

    /// Lattice vertices of a cell, by ascending subset of its mask.
    fn vertices(&self, cell: &Cell) -> impl Iterator<Item = [usize; MAX_RANK]> {
        let cell = *cell;
        (0..=cell.mask)
            .filter(move |sub| sub & !cell.mask == 0)
            .map(move |sub| {
                let mut v = cell.coord;
                for (axis, x) in v.iter_mut().enumerate() {
                    if sub & (1 << axis) != 0 {
                        *x += 1;
                    }
                }
                v
            })
    }

    /// Grid voxels incident to a T-construction cell.
    ///
    /// Along spanned axes the voxel index equals the cell's; along the others
    /// it is `x_i - 1` or `x_i`, whichever lie inside the grid.
    fn incident_voxels(&self, cell: &Cell) -> impl Iterator<Item = [usize; MAX_RANK]> + '_ {
        let cell = *cell;
        let free = self.lattice.full_mask() & !cell.mask;
        let shape = self.grid.shape();
        (0..=free)
            .filter(move |sub| sub & !free == 0)
            .filter_map(move |sub| {
                let mut v = cell.coord;
                for axis in 0..shape.len() {
                    if sub & (1 << axis) != 0 {
                        v[axis] = v[axis].checked_sub(1)?;
                    } else if v[axis] >= shape[axis] {
                        return None;
                    }
                }
                Some(v)
            })
    }

    /// Cells one dimension lower, two per spanned axis.
    pub fn facets(&self, cell: &Cell) -> Neighbors {
        let mut out = Neighbors::default();
        for axis in 0..self.rank() {
            if !cell.spans(axis) {
                continue;
            }
            let mask = cell.mask & !(1 << axis);
            let lower = Cell::new(cell.coord, mask);
            let mut upper = lower;
            upper.coord[axis] += 1;
            for face in [lower, upper] {
                if let Some(key) = self.key(&face) {
                    out.push(key);
                }
            }
        }
        out
    }

    /// Cells one dimension higher, up to two per unspanned axis.
    pub fn cofacets(&self, cell: &Cell) -> Neighbors {
        let mut out = Neighbors::default();
        for axis in 0..self.rank() {
            if cell.spans(axis) {
                continue;
            }
            let mask = cell.mask | (1 << axis);
            let upper = Cell::new(cell.coord, mask);
            if cell.coord[axis] > 0 {
                let mut lower = upper;
                lower.coord[axis] -= 1;
                if let Some(key) = self.key(&lower) {
                    out.push(key);
                }
            }
            if let Some(key) = self.key(&upper) {
                out.push(key);
            }
        }
        out
    }

    /// Present cells of one dimension, unsorted.
    pub fn cells(&self, dim: usize) -> impl Iterator<Item = FiltrationKey> + '_ {
        self.lattice
            .cells(dim)
            .filter_map(move |cell| self.key(&cell))
    }

    /// Every lattice cell of one dimension, including thresholded ones.
    pub fn lattice_cells(&self, dim: usize) -> impl Iterator<Item = Cell> + '_ {
        self.lattice.cells(dim)
    }

    /// Grid coordinate whose value the cell inherits: the first vertex attaining
    /// the max (V) or the first incident voxel attaining the min (T).
    pub fn representative_voxel(&self, cell: &Cell) -> [usize; MAX_RANK] {
        let mut best: Option<([usize; MAX_RANK], f64)> = None;
        let mut consider = |v: [usize; MAX_RANK], better: fn(f64, f64) -> bool| {
            let value = self.grid.at(&v);
            match best {
                Some((_, b)) if !better(value, b) => {}
                _ => best = Some((v, value)),
            }
        };
        match self.construction {
            Construction::V => self.vertices(cell).for_each(|v| consider(v, |a, b| a > b)),
            Construction::T => self
                .incident_voxels(cell)
                .for_each(|v| consider(v, |a, b| a < b)),
        }
        best.map(|(v, _)| v).unwrap_or(cell.coord)
    }
}

#[cfg(test)]
mod tests;
