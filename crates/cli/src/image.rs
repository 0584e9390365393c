//! Input loading: the engine's grid formats plus 2D CSV images.

use anyhow::{bail, Context, Result};
use cubical::api::{read_grid, Grid};
use polars::prelude::*;
use std::path::Path;

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// Load a grid by extension: `.csv` through polars, everything else through
/// `cubical::io`.
pub fn load(path: &Path, threshold: Option<f64>) -> Result<Grid> {
    if is_csv(path) {
        return read_csv_image(path);
    }
    read_grid(path, threshold).with_context(|| format!("reading {}", path.display()))
}

/// Headerless numeric CSV; rows become axis 0, columns axis 1.
pub fn read_csv_image(path: &Path) -> Result<Grid> {
    let df = LazyCsvReader::new(path)
        .with_has_header(false)
        .with_infer_schema_length(Some(100))
        .finish()?
        .collect()
        .with_context(|| format!("reading {}", path.display()))?;
    let (rows, cols) = df.shape();
    tracing::debug!(rows, cols, "csv_image_shape");
    if rows == 0 || cols == 0 {
        bail!("{} holds no values", path.display());
    }

    let mut values = vec![0.0; rows * cols];
    for (c, column) in df.get_columns().iter().enumerate() {
        let column = column.cast(&DataType::Float64)?;
        for (r, v) in column.f64()?.into_iter().enumerate() {
            match v {
                Some(v) => values[r * cols + c] = v,
                None => bail!("{}: empty cell at row {r}, column {c}", path.display()),
            }
        }
    }
    Ok(Grid::from_shape_vec(&[rows, cols], values)?)
}
