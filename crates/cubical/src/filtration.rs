//! Total order over cells.
//!
//! Cells of one dimension are ordered by value, then by `CellId`. Across
//! dimensions, equal values put faces before cofaces; the pairers never compare
//! keys of different dimensions, so that rule is realized by processing one
//! dimension at a time.

use std::cmp::Ordering;

use crate::complex::{CellId, CubicalComplex};

/// Filtration value plus the tie-break id.
#[derive(Clone, Copy, Debug, Default)]
pub struct FiltrationKey {
    pub value: f64,
    pub id: CellId,
}

impl FiltrationKey {
    pub fn new(value: f64, id: CellId) -> Self {
        Self { value, id }
    }

    pub fn dim(&self) -> usize {
        self.id.dim()
    }
}

impl PartialEq for FiltrationKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FiltrationKey {}

impl PartialOrd for FiltrationKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FiltrationKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then(self.id.cmp(&other.id))
    }
}

/// Present cells of one dimension in ascending filtration order.
pub fn sorted_cells(complex: &CubicalComplex<'_>, dim: usize) -> Vec<FiltrationKey> {
    let mut keys: Vec<FiltrationKey> = complex.cells(dim).collect();
    keys.sort_unstable();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Construction, Grid};

    #[test]
    fn ties_break_by_id() {
        let a = FiltrationKey::new(1.0, CellId(7));
        let b = FiltrationKey::new(1.0, CellId(3));
        let c = FiltrationKey::new(0.5, CellId(9));
        let mut keys = vec![a, b, c];
        keys.sort();
        assert_eq!(keys, vec![c, b, a]);
    }

    #[test]
    fn sorted_edges_are_monotone_and_complete() {
        let grid = Grid::from_shape_vec(&[3, 3], vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0])
            .unwrap();
        let complex = CubicalComplex::new(&grid, Construction::V, None);
        let edges = sorted_cells(&complex, 1);
        assert_eq!(edges.len(), 12);
        assert!(edges.windows(2).all(|w| w[0] < w[1]));
        assert!(edges.iter().all(|k| k.dim() == 1));
    }

    #[test]
    fn order_is_reproducible() {
        let grid = Grid::from_shape_vec(&[4, 4], vec![0.0; 16]).unwrap();
        let complex = CubicalComplex::new(&grid, Construction::T, None);
        assert_eq!(sorted_cells(&complex, 1), sorted_cells(&complex, 1));
        let squares = sorted_cells(&complex, 2);
        assert!(squares.windows(2).all(|w| w[0].id < w[1].id));
    }
}
