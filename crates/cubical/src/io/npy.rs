//! NumPy `.npy` grids and diagrams.

use std::path::Path;

use ndarray::{Array2, ArrayD};
use ndarray_npy::{read_npy, write_npy, ReadNpyError};

use super::FormatError;
use crate::grid::Grid;
use crate::result::{Diagram, ROW_WIDTH};

fn npy_err(err: impl std::fmt::Display) -> FormatError {
    FormatError::Npy {
        reason: err.to_string(),
    }
}

/// Read a grid; float64 first, then the other common image dtypes.
pub fn read_grid(path: &Path) -> Result<Grid, FormatError> {
    let array = match read_npy::<_, ArrayD<f64>>(path) {
        Ok(a) => a,
        Err(ReadNpyError::WrongDescriptor(_)) => read_converted(path)?,
        Err(err) => return Err(npy_err(err)),
    };
    Ok(Grid::from_array(&array)?)
}

fn read_converted(path: &Path) -> Result<ArrayD<f64>, FormatError> {
    if let Ok(a) = read_npy::<_, ArrayD<f32>>(path) {
        return Ok(a.mapv(f64::from));
    }
    if let Ok(a) = read_npy::<_, ArrayD<i64>>(path) {
        return Ok(a.mapv(|v| v as f64));
    }
    if let Ok(a) = read_npy::<_, ArrayD<i32>>(path) {
        return Ok(a.mapv(f64::from));
    }
    if let Ok(a) = read_npy::<_, ArrayD<u16>>(path) {
        return Ok(a.mapv(f64::from));
    }
    read_npy::<_, ArrayD<u8>>(path)
        .map(|a| a.mapv(f64::from))
        .map_err(|_| FormatError::malformed("npy dtype must be float or integer"))
}

pub fn write_grid(path: &Path, grid: &Grid) -> Result<(), FormatError> {
    write_npy(path, &grid.to_array()).map_err(npy_err)
}

/// `(n, 9)` float64 rows, as produced by `Diagram::to_rows`.
pub fn write_diagram(path: &Path, diagram: &Diagram) -> Result<(), FormatError> {
    let flat: Vec<f64> = diagram.to_rows().into_iter().flatten().collect();
    let rows = Array2::from_shape_vec((diagram.len(), ROW_WIDTH), flat).map_err(npy_err)?;
    write_npy(path, &rows).map_err(npy_err)
}

pub fn read_diagram_rows(path: &Path) -> Result<Vec<[f64; ROW_WIDTH]>, FormatError> {
    let rows: Array2<f64> = read_npy(path).map_err(npy_err)?;
    if rows.ncols() != ROW_WIDTH {
        return Err(FormatError::malformed(format!(
            "diagram array needs {ROW_WIDTH} columns, got {}",
            rows.ncols()
        )));
    }
    Ok(rows
        .rows()
        .into_iter()
        .map(|r| {
            let mut row = [0.0; ROW_WIDTH];
            for (slot, v) in row.iter_mut().zip(r.iter()) {
                *slot = *v;
            }
            row
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{PersistenceRecord, ESSENTIAL_DEATH};
    use tempfile::tempdir;

    #[test]
    fn grid_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("g.npy");
        let grid = Grid::from_shape_vec(&[2, 3, 2], (0..12).map(f64::from).collect()).unwrap();
        write_grid(&path, &grid).unwrap();
        assert_eq!(read_grid(&path).unwrap(), grid);
    }

    #[test]
    fn integer_arrays_are_converted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("u8.npy");
        let a = ndarray::arr2(&[[1u8, 2], [3, 4]]);
        write_npy(&path, &a).unwrap();
        let grid = read_grid(&path).unwrap();
        assert_eq!(grid.values(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn diagram_rows_have_nine_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pd.npy");
        let d = Diagram::new(
            vec![PersistenceRecord {
                dim: 0,
                birth: 0.0,
                death: ESSENTIAL_DEATH,
                birth_coord: [1, 0, 0],
                death_coord: [0, 0, 0],
            }],
            2,
            false,
        );
        write_diagram(&path, &d).unwrap();
        let rows = read_diagram_rows(&path).unwrap();
        assert_eq!(rows, d.to_rows());
    }
}
