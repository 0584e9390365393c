use cubical::api::{Grid, Location, PersistenceError};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Row-major values plus shape, as produced by `ndarray.ravel()` / `.shape`.
pub fn grid_from_py(values: Vec<f64>, shape: Vec<usize>) -> PyResult<Grid> {
    Grid::from_shape_vec(&shape, values).map_err(map_persistence_err)
}

pub fn parse_location(location: &str) -> PyResult<Location> {
    location.parse().map_err(map_persistence_err)
}

pub fn map_persistence_err(err: PersistenceError) -> PyErr {
    PyValueError::new_err(err.to_string())
}
