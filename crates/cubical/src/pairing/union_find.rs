//! Disjoint-set pairers: dimension 0 on vertices, dimension `D - 1` on the
//! dual graph of top cells.

use std::cmp::{Ordering, Reverse};

use tracing::debug;

use super::{DimensionPairs, PersistencePair};
use crate::complex::{Cell, CubicalComplex, Lattice};
use crate::error::PersistenceError;
use crate::filtration::{sorted_cells, FiltrationKey};

/// Union by rank with path compression.
#[derive(Clone, Debug)]
pub struct DisjointSets {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSets {
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Merge two roots; returns the surviving root.
    pub fn union_roots(&mut self, a: usize, b: usize) -> usize {
        if a == b {
            return a;
        }
        match self.rank[a].cmp(&self.rank[b]) {
            Ordering::Less => {
                self.parent[a] = b;
                b
            }
            Ordering::Greater => {
                self.parent[b] = a;
                a
            }
            Ordering::Equal => {
                self.parent[b] = a;
                self.rank[a] += 1;
                a
            }
        }
    }
}

/// Dimension-0 intervals by the elder rule over edges in increasing order.
///
/// Every merging edge lands in `deaths`, including merges at equal values, so
/// the dimension-1 reduction can clear those columns.
pub fn pair_dim0(complex: &CubicalComplex<'_>) -> Result<DimensionPairs, PersistenceError> {
    let lattice = complex.lattice();
    let mut sets = DisjointSets::new(lattice.len());
    let mut elder = vec![FiltrationKey::default(); lattice.len()];
    let mut present = Vec::new();
    for key in complex.cells(0) {
        elder[key.id.linear()] = key;
        present.push(key.id.linear());
    }

    let mut out = DimensionPairs::new(0);
    let edges = sorted_cells(complex, 1);
    let mut merges = 0usize;
    for edge in &edges {
        let ends = complex.facets(&complex.cell(edge.id));
        let [a, b] = match ends.as_slice() {
            [a, b] => [a.id.linear(), b.id.linear()],
            other => {
                return Err(PersistenceError::inconsistent(format!(
                    "edge {:?} has {} endpoints",
                    edge.id,
                    other.len()
                )))
            }
        };
        let (ra, rb) = (sets.find(a), sets.find(b));
        if ra == rb {
            continue;
        }
        let (young, old) = if elder[ra] > elder[rb] {
            (elder[ra], elder[rb])
        } else {
            (elder[rb], elder[ra])
        };
        out.record(young, *edge)?;
        let root = sets.union_roots(ra, rb);
        elder[root] = old;
        merges += 1;
    }

    let mut essential: Vec<FiltrationKey> = present
        .into_iter()
        .filter(|&v| sets.find(v) == v)
        .map(|v| elder[v])
        .collect();
    essential.sort_unstable();
    out.pairs
        .extend(essential.iter().map(|&k| PersistencePair::essential(0, k)));

    debug!(
        vertices = elder.len(),
        edges = edges.len(),
        merges,
        pairs = out.pairs.len(),
        essential = essential.len(),
        "dim0 union-find"
    );
    Ok(out)
}

/// Age of a dual component; the larger value is the elder.
///
/// Finite components are as old as their largest top cell. The outside and
/// thresholded top cells never enter the complex and outrank every finite
/// component; among them the outside is the eldest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Age {
    Finite(FiltrationKey),
    Unbounded(Reverse<usize>),
}

/// Dual node of the top cell cofacing `cell` from below (`lower`) or above.
fn dual_node(lattice: &Lattice, cell: &Cell, axis: usize, lower: bool, outside: usize) -> usize {
    let mut top = Cell::new(cell.coord, lattice.full_mask());
    if lower {
        match top.coord[axis].checked_sub(1) {
            Some(x) => top.coord[axis] = x,
            None => return outside,
        }
    }
    if lattice.contains(&top) {
        lattice.id(&top).linear()
    } else {
        outside
    }
}

/// Intervals of dimension `D - 1` only, from the dual graph.
///
/// Nodes are the top cells plus one outside node; a `(D-1)`-cell joins the
/// two top cells it separates. Sweeping `(D-1)`-cells from high to low values,
/// a merge means the cell closes off a cavity: the younger component dies,
/// giving the interval `(value(cell), max value of that cavity)`.
pub fn pair_top_dim(complex: &CubicalComplex<'_>) -> Result<DimensionPairs, PersistenceError> {
    let rank = complex.rank();
    if rank == 1 {
        return pair_dim0(complex);
    }
    let dim = rank - 1;
    let lattice = complex.lattice();
    let outside = lattice.len();
    let mut sets = DisjointSets::new(outside + 1);
    let mut age: Vec<Age> = (0..=outside)
        .map(|node| Age::Unbounded(Reverse(node + 1)))
        .collect();
    age[outside] = Age::Unbounded(Reverse(0));
    for key in complex.cells(rank) {
        age[key.id.linear()] = Age::Finite(key);
    }

    let ends = |cell: &Cell| {
        let axis = (0..rank).find(|&a| !cell.spans(a)).unwrap_or(0);
        [
            dual_node(lattice, cell, axis, true, outside),
            dual_node(lattice, cell, axis, false, outside),
        ]
    };

    // Thresholded walls never appear, so their sides are joined from the start.
    for cell in complex.lattice_cells(dim) {
        if complex.value(&cell).is_none() {
            let [p, q] = ends(&cell);
            let (rp, rq) = (sets.find(p), sets.find(q));
            let older = age[rp].max(age[rq]);
            let root = sets.union_roots(rp, rq);
            age[root] = older;
        }
    }

    let mut out = DimensionPairs::new(dim);
    let walls = sorted_cells(complex, dim);
    for wall in walls.iter().rev() {
        let [p, q] = ends(&complex.cell(wall.id));
        let (rp, rq) = (sets.find(p), sets.find(q));
        if rp == rq {
            continue;
        }
        let (young, old) = if age[rp] < age[rq] {
            (age[rp], age[rq])
        } else {
            (age[rq], age[rp])
        };
        match young {
            Age::Finite(cavity) => out.record(*wall, cavity)?,
            Age::Unbounded(_) => out.pairs.push(PersistencePair::essential(dim, *wall)),
        }
        let root = sets.union_roots(rp, rq);
        age[root] = old;
    }
    out.pairs.reverse();

    debug!(
        dim,
        walls = walls.len(),
        pairs = out.pairs.len(),
        essential = out.essential_count(),
        "top-dim dual union-find"
    );
    Ok(out)
}
