//! Grid and diagram file formats.
//!
//! - `.npy`: NumPy arrays via `ndarray-npy`; grids are float64 arrays of rank
//!   1 to 4, diagrams are `(n, 9)` float64 arrays.
//! - `.complex`: DIPHA binary (image in, persistence diagram out).
//! - `.txt`: PERSEUS dense cubical text.
//! - `.csv`: diagram rows `dim,birth,death[,x1,y1,z1,x2,y2,z2]`.
//!
//! The format is picked from the file extension.

pub mod csv;
pub mod dipha;
pub mod npy;
pub mod perseus;

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::PersistenceError;
use crate::grid::Grid;
use crate::result::{Diagram, Location};

#[derive(Debug)]
pub enum FormatError {
    Io(std::io::Error),
    Malformed { reason: String },
    Grid(PersistenceError),
    Npy { reason: String },
}

impl FormatError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "i/o error: {err}"),
            Self::Malformed { reason } => write!(f, "malformed file: {reason}"),
            Self::Grid(err) => write!(f, "{err}"),
            Self::Npy { reason } => write!(f, "npy error: {reason}"),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Grid(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FormatError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<PersistenceError> for FormatError {
    fn from(err: PersistenceError) -> Self {
        Self::Grid(err)
    }
}

/// Upper bound on buffers preallocated from a header's claimed size.
const PREALLOC_LIMIT: usize = 1 << 20;

/// Element count of a header's shape, `Malformed` on overflow.
pub(crate) fn checked_len(shape: &[usize]) -> Result<usize, FormatError> {
    shape
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .ok_or_else(|| FormatError::malformed(format!("shape {shape:?} is too large")))
}

pub(crate) fn initial_capacity(claimed: usize) -> usize {
    claimed.min(PREALLOC_LIMIT)
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Grid file formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridFormat {
    Npy,
    Dipha,
    Perseus,
}

impl GridFormat {
    pub fn from_path(path: &Path) -> Result<Self, FormatError> {
        match extension(path).as_str() {
            "npy" => Ok(Self::Npy),
            "complex" => Ok(Self::Dipha),
            "txt" => Ok(Self::Perseus),
            other => Err(FormatError::malformed(format!(
                "unknown grid extension {other:?} (expected npy, complex, txt)"
            ))),
        }
    }
}

/// Diagram file formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagramFormat {
    Csv,
    Npy,
    Dipha,
}

impl DiagramFormat {
    pub fn from_path(path: &Path) -> Result<Self, FormatError> {
        match extension(path).as_str() {
            "csv" => Ok(Self::Csv),
            "npy" => Ok(Self::Npy),
            "complex" | "dipha" => Ok(Self::Dipha),
            other => Err(FormatError::malformed(format!(
                "unknown diagram extension {other:?} (expected csv, npy, complex)"
            ))),
        }
    }
}

/// Read a grid, choosing the format by extension. PERSEUS `-1` entries become
/// `threshold`, or `f64::MAX` without one.
pub fn read_grid(path: &Path, threshold: Option<f64>) -> Result<Grid, FormatError> {
    match GridFormat::from_path(path)? {
        GridFormat::Npy => npy::read_grid(path),
        GridFormat::Dipha => dipha::read_image(&mut BufReader::new(File::open(path)?)),
        GridFormat::Perseus => perseus::read_grid(BufReader::new(File::open(path)?), threshold),
    }
}

pub fn write_grid(path: &Path, grid: &Grid) -> Result<(), FormatError> {
    match GridFormat::from_path(path)? {
        GridFormat::Npy => npy::write_grid(path, grid),
        GridFormat::Dipha => {
            let mut w = BufWriter::new(File::create(path)?);
            dipha::write_image(&mut w, grid)?;
            w.flush()?;
            Ok(())
        }
        GridFormat::Perseus => {
            let mut w = BufWriter::new(File::create(path)?);
            perseus::write_grid(&mut w, grid)?;
            w.flush()?;
            Ok(())
        }
    }
}

/// Write a diagram, choosing the format by extension.
pub fn write_diagram(path: &Path, diagram: &Diagram, location: Location) -> Result<(), FormatError> {
    let format = DiagramFormat::from_path(path)?;
    if format == DiagramFormat::Npy {
        return npy::write_diagram(path, diagram);
    }
    let mut w = BufWriter::new(File::create(path)?);
    match format {
        DiagramFormat::Csv => csv::write_diagram(&mut w, diagram, location)?,
        DiagramFormat::Dipha => dipha::write_diagram(&mut w, diagram)?,
        DiagramFormat::Npy => {}
    }
    w.flush()?;
    Ok(())
}
