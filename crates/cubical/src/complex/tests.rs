use super::*;
use crate::grid::{Construction, Grid};
use proptest::prelude::*;

fn grid2(rows: &[[f64; 2]; 2]) -> Grid {
    Grid::from_shape_vec(&[2, 2], rows.iter().flatten().copied().collect()).unwrap()
}

fn c(coord: [usize; 2], mask: u8) -> Cell {
    Cell::new([coord[0], coord[1], 0, 0], mask)
}

#[test]
fn lattice_cell_counts() {
    let g = Grid::from_shape_vec(&[3, 3], vec![0.0; 9]).unwrap();
    let v = CubicalComplex::new(&g, Construction::V, None);
    assert_eq!(
        (0..=2).map(|d| v.cells(d).count()).collect::<Vec<_>>(),
        vec![9, 12, 4]
    );
    let t = CubicalComplex::new(&g, Construction::T, None);
    assert_eq!(
        (0..=2).map(|d| t.cells(d).count()).collect::<Vec<_>>(),
        vec![16, 24, 9]
    );
    assert_eq!(t.lattice().count(1), 24);

    let g4 = Grid::from_shape_vec(&[2, 2, 2, 2], vec![0.0; 16]).unwrap();
    let v4 = CubicalComplex::new(&g4, Construction::V, None);
    let counts: Vec<usize> = (0..=4).map(|d| v4.cells(d).count()).collect();
    assert_eq!(counts, vec![16, 32, 24, 8, 1]);
}

#[test]
fn v_construction_takes_vertex_max() {
    let g = grid2(&[[1.0, 2.0], [3.0, 4.0]]);
    let k = CubicalComplex::new(&g, Construction::V, None);
    assert_eq!(k.value(&c([0, 0], 0)), Some(1.0));
    assert_eq!(k.value(&c([0, 0], 0b10)), Some(2.0));
    assert_eq!(k.value(&c([0, 0], 0b01)), Some(3.0));
    assert_eq!(k.value(&c([0, 0], 0b11)), Some(4.0));
    // Off-lattice: an edge leaving the grid.
    assert_eq!(k.value(&c([0, 1], 0b10)), None);
}

#[test]
fn t_construction_takes_incident_voxel_min() {
    let g = grid2(&[[1.0, 2.0], [3.0, 4.0]]);
    let k = CubicalComplex::new(&g, Construction::T, None);
    assert_eq!(k.lattice().shape(), &[3, 3]);
    assert_eq!(k.value(&c([1, 1], 0)), Some(1.0));
    assert_eq!(k.value(&c([0, 2], 0)), Some(2.0));
    assert_eq!(k.value(&c([2, 2], 0)), Some(4.0));
    assert_eq!(k.value(&c([1, 0], 0b10)), Some(1.0));
    assert_eq!(k.value(&c([2, 1], 0b10)), Some(4.0));
    assert_eq!(k.value(&c([1, 1], 0b11)), Some(4.0));
}

#[test]
fn neighbour_counts() {
    let g = Grid::from_shape_vec(&[3, 3], vec![0.0; 9]).unwrap();
    let k = CubicalComplex::new(&g, Construction::V, None);
    assert_eq!(k.cofacets(&c([0, 0], 0)).len(), 2);
    assert_eq!(k.cofacets(&c([1, 1], 0)).len(), 4);
    assert_eq!(k.cofacets(&c([1, 0], 0b10)).len(), 2);
    assert_eq!(k.cofacets(&c([0, 0], 0b10)).len(), 1);
    assert_eq!(k.facets(&c([0, 0], 0b11)).len(), 4);
    assert_eq!(k.facets(&c([0, 0], 0)).len(), 0);
    assert_eq!(k.cofacets(&c([0, 0], 0b11)).len(), 0);
}

#[test]
fn ids_round_trip() {
    let g = Grid::from_shape_vec(&[3, 4, 2], vec![0.0; 24]).unwrap();
    let k = CubicalComplex::new(&g, Construction::T, None);
    for dim in 0..=3 {
        for key in k.cells(dim) {
            let cell = k.cell(key.id);
            assert_eq!(cell.dim(), dim);
            assert_eq!(k.id(&cell), key.id);
        }
    }
}

#[test]
fn threshold_drops_high_cells() {
    let g = grid2(&[[1.0, 2.0], [3.0, 4.0]]);
    let k = CubicalComplex::new(&g, Construction::V, Some(3.0));
    assert_eq!(k.cells(0).count(), 2);
    assert_eq!(k.cells(1).count(), 1);
    assert_eq!(k.cells(2).count(), 0);
    assert_eq!(k.value(&c([1, 0], 0)), None);
    // The square's facets include thresholded edges, which are skipped.
    assert_eq!(k.facets(&c([0, 0], 0b11)).len(), 1);
}

#[test]
fn max_valued_voxels_are_absent_without_threshold() {
    let g = grid2(&[[1.0, f64::MAX], [3.0, 4.0]]);
    let k = CubicalComplex::new(&g, Construction::V, None);
    assert_eq!(k.cells(0).count(), 3);
    assert_eq!(k.cells(1).count(), 2);
    assert_eq!(k.value(&c([0, 1], 0)), None);
    let capped = CubicalComplex::new(&g, Construction::V, Some(f64::MAX));
    assert_eq!(k.cells(1).collect::<Vec<_>>(), capped.cells(1).collect::<Vec<_>>());
}

#[test]
fn representative_voxels() {
    let g = grid2(&[[1.0, 2.0], [3.0, 4.0]]);
    let v = CubicalComplex::new(&g, Construction::V, None);
    assert_eq!(v.representative_voxel(&c([0, 0], 0b10)), [0, 1, 0, 0]);
    assert_eq!(v.representative_voxel(&c([0, 0], 0b11)), [1, 1, 0, 0]);
    let t = CubicalComplex::new(&g, Construction::T, None);
    assert_eq!(t.representative_voxel(&c([1, 1], 0)), [0, 0, 0, 0]);
    assert_eq!(t.representative_voxel(&c([2, 1], 0b10)), [1, 1, 0, 0]);
}

fn small_grid() -> impl Strategy<Value = Grid> {
    (1usize..=3, 1usize..=3, 1usize..=3).prop_flat_map(|(a, b, c)| {
        prop::collection::vec(-5i32..5, a * b * c).prop_map(move |vals| {
            let vals = vals.into_iter().map(f64::from).collect();
            Grid::from_shape_vec(&[a, b, c], vals).unwrap()
        })
    })
}

proptest! {
    #[test]
    fn faces_never_exceed_cofaces(grid in small_grid(), t_mode in any::<bool>()) {
        let construction = if t_mode { Construction::T } else { Construction::V };
        let k = CubicalComplex::new(&grid, construction, None);
        for dim in 1..=3 {
            for key in k.cells(dim) {
                let cell = k.cell(key.id);
                for face in &k.facets(&cell) {
                    prop_assert!(face.value <= key.value);
                    let face_cell = k.cell(face.id);
                    prop_assert!(k.cofacets(&face_cell).as_slice().contains(&key));
                }
            }
        }
    }

    #[test]
    fn representative_carries_the_value(grid in small_grid(), t_mode in any::<bool>()) {
        let construction = if t_mode { Construction::T } else { Construction::V };
        let k = CubicalComplex::new(&grid, construction, None);
        for dim in 0..=3 {
            for key in k.cells(dim) {
                let v = k.representative_voxel(&k.cell(key.id));
                prop_assert_eq!(grid.at(&v), key.value);
            }
        }
    }
}
