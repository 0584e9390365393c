//! Cell addressing on the vertex lattice.
//!
//! A cell is a base coordinate plus an axis bit-mask; bit `i` set means the
//! cell spans `[x_i, x_i + 1]` along axis `i`. Cells pack into a `CellId`
//! as `(row-major lattice index << 4) | mask`.

use crate::filtration::FiltrationKey;
use crate::grid::{row_major_strides, MAX_RANK};

const MASK_BITS: u32 = 4;
const MASK_LOW: u64 = (1 << MASK_BITS) - 1;

/// Packed cell identifier; the deterministic tie-break among equal values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(pub u64);

impl CellId {
    pub fn mask(self) -> u8 {
        (self.0 & MASK_LOW) as u8
    }

    pub fn dim(self) -> usize {
        self.mask().count_ones() as usize
    }

    /// Row-major index of the base coordinate on the vertex lattice.
    pub fn linear(self) -> usize {
        (self.0 >> MASK_BITS) as usize
    }
}

/// Cell given by its base coordinate (unused axes are zero) and axis mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    pub coord: [usize; MAX_RANK],
    pub mask: u8,
}

impl Cell {
    pub fn new(coord: [usize; MAX_RANK], mask: u8) -> Self {
        Self { coord, mask }
    }

    pub fn vertex(coord: [usize; MAX_RANK]) -> Self {
        Self { coord, mask: 0 }
    }

    pub fn dim(&self) -> usize {
        self.mask.count_ones() as usize
    }

    #[inline]
    pub fn spans(&self, axis: usize) -> bool {
        self.mask & (1 << axis) != 0
    }
}

/// Facets or cofacets of one cell; at most two per axis.
#[derive(Clone, Copy, Debug, Default)]
pub struct Neighbors {
    keys: [FiltrationKey; 2 * MAX_RANK],
    len: usize,
}

impl Neighbors {
    #[inline]
    pub(crate) fn push(&mut self, key: FiltrationKey) {
        self.keys[self.len] = key;
        self.len += 1;
    }

    pub fn as_slice(&self) -> &[FiltrationKey] {
        &self.keys[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Smallest key in filtration order.
    pub fn min(&self) -> Option<FiltrationKey> {
        self.as_slice().iter().copied().min()
    }

    /// Keys in ascending filtration order.
    pub fn sorted(mut self) -> Self {
        self.keys[..self.len].sort_unstable();
        self
    }
}

impl<'a> IntoIterator for &'a Neighbors {
    type Item = &'a FiltrationKey;
    type IntoIter = std::slice::Iter<'a, FiltrationKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

/// Vertex lattice of a complex: `L_i` lattice points along axis `i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lattice {
    rank: usize,
    shape: [usize; MAX_RANK],
    strides: [usize; MAX_RANK],
}

impl Lattice {
    pub fn new(shape: &[usize]) -> Self {
        let rank = shape.len().min(MAX_RANK);
        let mut padded = [1; MAX_RANK];
        padded[..rank].copy_from_slice(&shape[..rank]);
        let mut strides = [0; MAX_RANK];
        strides[..rank].copy_from_slice(&row_major_strides(&shape[..rank]));
        Self {
            rank,
            shape: padded,
            strides,
        }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape[..self.rank]
    }

    /// Number of lattice points (vertices).
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn full_mask(&self) -> u8 {
        ((1u16 << self.rank) - 1) as u8
    }

    pub fn contains(&self, cell: &Cell) -> bool {
        if cell.mask & !self.full_mask() != 0 {
            return false;
        }
        (0..MAX_RANK).all(|axis| {
            let x = cell.coord[axis];
            if axis >= self.rank {
                x == 0
            } else if cell.spans(axis) {
                x + 1 < self.shape[axis]
            } else {
                x < self.shape[axis]
            }
        })
    }

    #[inline]
    pub fn id(&self, cell: &Cell) -> CellId {
        let linear: usize = (0..self.rank)
            .map(|axis| cell.coord[axis] * self.strides[axis])
            .sum();
        CellId(((linear as u64) << MASK_BITS) | u64::from(cell.mask))
    }

    pub fn cell(&self, id: CellId) -> Cell {
        let mut rest = id.linear();
        let mut coord = [0; MAX_RANK];
        for axis in 0..self.rank {
            coord[axis] = rest / self.strides[axis];
            rest %= self.strides[axis];
        }
        Cell::new(coord, id.mask())
    }

    /// Masks of the given dimension, ascending.
    pub fn masks(&self, dim: usize) -> impl Iterator<Item = u8> {
        let full = self.full_mask();
        (0..=full).filter(move |m| m.count_ones() as usize == dim)
    }

    /// Number of lattice cells of one dimension (ignoring any threshold).
    pub fn count(&self, dim: usize) -> usize {
        self.masks(dim)
            .map(|mask| {
                (0..self.rank)
                    .map(|axis| self.extent(axis, mask))
                    .product::<usize>()
            })
            .sum()
    }

    fn extent(&self, axis: usize, mask: u8) -> usize {
        if mask & (1 << axis) != 0 {
            self.shape[axis] - 1
        } else {
            self.shape[axis]
        }
    }

    /// Every lattice cell of one dimension, grouped by mask, coordinates row-major.
    pub fn cells(&self, dim: usize) -> impl Iterator<Item = Cell> + '_ {
        self.masks(dim).flat_map(move |mask| {
            let mut bounds = [1; MAX_RANK];
            for (axis, bound) in bounds.iter_mut().enumerate().take(self.rank) {
                *bound = self.extent(axis, mask);
            }
            Odometer::new(bounds).map(move |coord| Cell::new(coord, mask))
        })
    }
}

/// Row-major walk over `[0, bounds_0) x ... x [0, bounds_3)`.
struct Odometer {
    bounds: [usize; MAX_RANK],
    next: Option<[usize; MAX_RANK]>,
}

impl Odometer {
    fn new(bounds: [usize; MAX_RANK]) -> Self {
        let next = if bounds.iter().all(|&b| b > 0) {
            Some([0; MAX_RANK])
        } else {
            None
        };
        Self { bounds, next }
    }
}

impl Iterator for Odometer {
    type Item = [usize; MAX_RANK];

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let mut succ = current;
        let mut axis = MAX_RANK;
        self.next = loop {
            if axis == 0 {
                break None;
            }
            axis -= 1;
            succ[axis] += 1;
            if succ[axis] < self.bounds[axis] {
                break Some(succ);
            }
            succ[axis] = 0;
        };
        Some(current)
    }
}
