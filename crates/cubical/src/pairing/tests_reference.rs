//! Cross-check against a plain boundary-matrix reduction.
//!
//! The reference builds every cell explicitly, sorts by `(value, dim, index)`
//! and reduces columns left to right with `low = max row`. It shares nothing
//! with the engine beyond `Grid`.

use std::collections::{BTreeSet, HashMap};

use super::*;
use crate::complex::CubicalComplex;
use crate::grid::{Construction, Grid};
use crate::samples::{random_grid, random_levels};
use proptest::prelude::*;

struct RefCube {
    coord: Vec<usize>,
    mask: u32,
    value: f64,
}

impl RefCube {
    fn dim(&self) -> usize {
        self.mask.count_ones() as usize
    }
}

fn grid_value(grid: &Grid, coord: &[usize]) -> f64 {
    grid.get(coord).unwrap()
}

/// All index vectors `v` with `v[i] < ext[i]`.
fn product(ext: &[usize]) -> Vec<Vec<usize>> {
    let mut out = vec![Vec::new()];
    for &n in ext {
        out = out
            .into_iter()
            .flat_map(|prefix| {
                (0..n).map(move |x| {
                    let mut p = prefix.clone();
                    p.push(x);
                    p
                })
            })
            .collect();
    }
    out
}

fn cell_value(grid: &Grid, construction: Construction, coord: &[usize], mask: u32) -> f64 {
    let shape = grid.shape();
    match construction {
        Construction::V => {
            let corners: Vec<usize> = (0..shape.len())
                .map(|a| if mask & (1 << a) != 0 { 2 } else { 1 })
                .collect();
            product(&corners)
                .into_iter()
                .map(|off| {
                    let v: Vec<usize> = coord.iter().zip(&off).map(|(c, o)| c + o).collect();
                    grid_value(grid, &v)
                })
                .fold(f64::NEG_INFINITY, f64::max)
        }
        Construction::T => {
            let mut choices: Vec<Vec<usize>> = Vec::new();
            for (a, &x) in coord.iter().enumerate() {
                if mask & (1 << a) != 0 {
                    choices.push(vec![x]);
                } else {
                    let mut c = Vec::new();
                    if x >= 1 {
                        c.push(x - 1);
                    }
                    if x < shape[a] {
                        c.push(x);
                    }
                    choices.push(c);
                }
            }
            let ext: Vec<usize> = choices.iter().map(Vec::len).collect();
            product(&ext)
                .into_iter()
                .map(|pick| {
                    let v: Vec<usize> = pick.iter().enumerate().map(|(a, &i)| choices[a][i]).collect();
                    grid_value(grid, &v)
                })
                .fold(f64::INFINITY, f64::min)
        }
    }
}

/// `(dim, birth, death)` for every nonzero interval in dimensions below the rank.
fn reference_intervals(
    grid: &Grid,
    construction: Construction,
    threshold: Option<f64>,
) -> Vec<(usize, f64, f64)> {
    let rank = grid.rank();
    let lattice: Vec<usize> = match construction {
        Construction::V => grid.shape().to_vec(),
        Construction::T => grid.shape().iter().map(|n| n + 1).collect(),
    };

    let mut cells = Vec::new();
    for mask in 0u32..(1 << rank) {
        let ext: Vec<usize> = (0..rank)
            .map(|a| lattice[a].saturating_sub(((mask >> a) & 1) as usize))
            .collect();
        for coord in product(&ext) {
            let value = cell_value(grid, construction, &coord, mask);
            if threshold.map_or(true, |t| value < t) {
                cells.push(RefCube { coord, mask, value });
            }
        }
    }
    cells.sort_by(|a, b| a.value.total_cmp(&b.value).then(a.dim().cmp(&b.dim())));

    let index: HashMap<(Vec<usize>, u32), usize> = cells
        .iter()
        .enumerate()
        .map(|(i, c)| ((c.coord.clone(), c.mask), i))
        .collect();

    let mut columns: Vec<BTreeSet<usize>> = Vec::with_capacity(cells.len());
    let mut low_to_col: HashMap<usize, usize> = HashMap::new();
    for (j, cell) in cells.iter().enumerate() {
        let mut col = BTreeSet::new();
        for a in 0..rank {
            if cell.mask & (1 << a) == 0 {
                continue;
            }
            let mask = cell.mask & !(1 << a);
            let mut upper = cell.coord.clone();
            upper[a] += 1;
            for face in [cell.coord.clone(), upper] {
                let i = index[&(face, mask)];
                if !col.remove(&i) {
                    col.insert(i);
                }
            }
        }
        while let Some(&low) = col.iter().next_back() {
            match low_to_col.get(&low) {
                Some(&k) => {
                    for &r in &columns[k] {
                        if !col.remove(&r) {
                            col.insert(r);
                        }
                    }
                }
                None => break,
            }
        }
        if let Some(&low) = col.iter().next_back() {
            low_to_col.insert(low, j);
        }
        columns.push(col);
    }

    let mut out = Vec::new();
    for (j, col) in columns.iter().enumerate() {
        if let Some(&low) = col.iter().next_back() {
            let (b, d) = (cells[low].value, cells[j].value);
            if d > b {
                out.push((cells[low].dim(), b, d));
            }
        } else if !low_to_col.contains_key(&j) && cells[j].dim() < rank {
            out.push((cells[j].dim(), cells[j].value, f64::INFINITY));
        }
    }
    sort_triples(out)
}

fn sort_triples(mut t: Vec<(usize, f64, f64)>) -> Vec<(usize, f64, f64)> {
    t.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(a.1.total_cmp(&b.1))
            .then(a.2.total_cmp(&b.2))
    });
    t
}

fn engine_intervals(
    grid: &Grid,
    construction: Construction,
    threshold: Option<f64>,
    strategy: PairingStrategy,
) -> Vec<(usize, f64, f64)> {
    let k = CubicalComplex::new(grid, construction, threshold);
    let mut dims = vec![pair_dim0(&k).unwrap()];
    let reducer = ColumnReducer::new(&k, strategy);
    for dim in 1..grid.rank() {
        let next = reducer.reduce(dim, &dims[dim - 1].deaths).unwrap();
        dims.push(next);
    }
    sort_triples(
        dims.iter()
            .flat_map(|d| d.pairs.iter())
            .map(|p| (p.dim, p.birth, p.death))
            .collect(),
    )
}

fn check(grid: &Grid, threshold: Option<f64>) {
    for construction in [Construction::V, Construction::T] {
        let expected = reference_intervals(grid, construction, threshold);
        for strategy in [PairingStrategy::LinkFind, PairingStrategy::ComputePairs] {
            assert_eq!(
                engine_intervals(grid, construction, threshold, strategy),
                expected,
                "{construction} {strategy} shape {:?} threshold {threshold:?}",
                grid.shape()
            );
        }
    }
}

#[test]
fn reference_sees_the_ring() {
    let mut vals = vec![0.0; 9];
    vals[4] = 1.0;
    let g = Grid::from_shape_vec(&[3, 3], vals).unwrap();
    let r = reference_intervals(&g, Construction::V, None);
    assert_eq!(r, vec![(0, 0.0, f64::INFINITY), (1, 0.0, 1.0)]);
}

#[test]
fn agrees_on_small_random_grids() {
    let shapes: [&[usize]; 6] = [&[7], &[4, 5], &[3, 3, 3], &[2, 4, 3], &[2, 2, 2, 2], &[3, 2, 2, 2]];
    for (i, shape) in shapes.iter().enumerate() {
        let seed = 11 + i as u64;
        check(&random_grid(shape, seed).unwrap(), None);
        check(&random_levels(shape, 3, seed).unwrap(), None);
        check(&random_levels(shape, 4, seed).unwrap(), Some(3.0));
    }
}

fn small_grid() -> impl Strategy<Value = Grid> {
    (1usize..=3, 1usize..=4, 1usize..=4, 1usize..=3).prop_flat_map(|(rank, a, b, c)| {
        let shape: Vec<usize> = [a, b, c].into_iter().take(rank).collect();
        let total: usize = shape.iter().product();
        prop::collection::vec(0i32..4, total).prop_map(move |vals| {
            Grid::from_shape_vec(&shape, vals.into_iter().map(f64::from).collect()).unwrap()
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn agrees_with_reference(grid in small_grid(), cut in prop::option::of(1i32..4)) {
        check(&grid, cut.map(f64::from));
    }
}
