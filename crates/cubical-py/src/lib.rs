//! PyO3 bindings for the `cubical` engine.
//!
//! Notes
//! - Inputs arrive as a flat row-major list plus a shape; a thin Python
//!   wrapper does `arr.ravel().tolist(), arr.shape`.
//! - Each call returns `n x 9` rows `dim, birth, death, x1, y1, z1, x2, y2, z2`
//!   with `f64::MAX` as the death of essential classes.
//! - `maxdim` is lowered to `rank - 1` rather than rejected.

mod common;

use common::{grid_from_py, map_persistence_err, parse_location};
use cubical::api::{compute_with_config, Construction, PhConfig, ROW_WIDTH};
use pyo3::prelude::*;

#[allow(clippy::too_many_arguments)]
fn compute_rows(
    py: Python<'_>,
    construction: Construction,
    arr: Vec<f64>,
    shape: Vec<usize>,
    maxdim: usize,
    top_dim: bool,
    embedded: bool,
    location: &str,
) -> PyResult<Vec<[f64; ROW_WIDTH]>> {
    let grid = grid_from_py(arr, shape)?;
    let config = PhConfig::default()
        .with_maxdim(maxdim)
        .with_top_dim(top_dim)
        .with_embedded(embedded)
        .with_location(parse_location(location)?)
        .with_construction(construction)
        .clamped_to(grid.rank());
    let diagram = py
        .allow_threads(|| compute_with_config(&grid, &config))
        .map_err(map_persistence_err)?;
    Ok(diagram.to_rows())
}

/// Persistence diagram under the V-construction.
#[pyfunction]
#[pyo3(name = "computePH")]
#[pyo3(signature = (arr, shape, maxdim=2, top_dim=false, embedded=false, location="yes"))]
fn compute_ph(
    py: Python<'_>,
    arr: Vec<f64>,
    shape: Vec<usize>,
    maxdim: usize,
    top_dim: bool,
    embedded: bool,
    location: &str,
) -> PyResult<Vec<[f64; ROW_WIDTH]>> {
    compute_rows(py, Construction::V, arr, shape, maxdim, top_dim, embedded, location)
}

/// Persistence diagram under the T-construction.
#[pyfunction]
#[pyo3(name = "computePH_T")]
#[pyo3(signature = (arr, shape, maxdim=2, top_dim=false, embedded=false, location="yes"))]
fn compute_ph_t(
    py: Python<'_>,
    arr: Vec<f64>,
    shape: Vec<usize>,
    maxdim: usize,
    top_dim: bool,
    embedded: bool,
    location: &str,
) -> PyResult<Vec<[f64; ROW_WIDTH]>> {
    compute_rows(py, Construction::T, arr, shape, maxdim, top_dim, embedded, location)
}

#[pymodule]
fn cubical_native(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compute_ph, m)?)?;
    m.add_function(wrap_pyfunction!(compute_ph_t, m)?)?;
    m.add("__version__", cubical::VERSION)?;
    Ok(())
}
