//! PERSEUS dense cubical text: rank, one line per axis length, then one
//! value per line with the first axis fastest. `-1` marks a missing voxel.

use std::io::{BufRead, Write};

use super::{checked_len, initial_capacity, FormatError};
use crate::grid::{Grid, MAX_RANK};

/// Value PERSEUS uses for voxels outside the complex.
pub const PERSEUS_MISSING: f64 = -1.0;

fn tokens<R: BufRead>(reader: R) -> impl Iterator<Item = Result<String, FormatError>> {
    reader.lines().flat_map(|line| -> Vec<Result<String, FormatError>> {
        match line {
            Ok(line) => line.split_whitespace().map(|t| Ok(t.to_string())).collect(),
            Err(err) => vec![Err(err.into())],
        }
    })
}

fn next_token<I>(it: &mut I, what: &str) -> Result<String, FormatError>
where
    I: Iterator<Item = Result<String, FormatError>>,
{
    it.next()
        .unwrap_or_else(|| Err(FormatError::malformed(format!("missing {what}"))))
}

fn parse_usize(token: &str, what: &str) -> Result<usize, FormatError> {
    token
        .parse()
        .map_err(|_| FormatError::malformed(format!("{what} {token:?} is not a count")))
}

/// Missing voxels become `threshold`, or `f64::MAX` without one.
pub fn read_grid<R: BufRead>(reader: R, threshold: Option<f64>) -> Result<Grid, FormatError> {
    let mut it = tokens(reader);
    let rank = parse_usize(&next_token(&mut it, "rank")?, "rank")?;
    if rank == 0 || rank > MAX_RANK {
        return Err(FormatError::malformed(format!("PERSEUS rank {rank}")));
    }
    let mut shape = Vec::with_capacity(rank);
    for axis in 0..rank {
        shape.push(parse_usize(&next_token(&mut it, "axis length")?, &format!("axis {axis}"))?);
    }
    let total = checked_len(&shape)?;
    let missing = threshold.unwrap_or(f64::MAX);
    let mut file_order = Vec::with_capacity(initial_capacity(total));
    for _ in 0..total {
        let token = next_token(&mut it, "value")?;
        let v: f64 = token
            .parse()
            .map_err(|_| FormatError::malformed(format!("value {token:?} is not a number")))?;
        file_order.push(if v == PERSEUS_MISSING { missing } else { v });
    }

    let strides = crate::grid::row_major_strides(&shape);
    let mut values = vec![0.0; total];
    let mut coord = vec![0usize; rank];
    for v in file_order {
        let slot: usize = coord.iter().zip(&strides).map(|(c, s)| c * s).sum();
        values[slot] = v;
        for axis in 0..rank {
            coord[axis] += 1;
            if coord[axis] < shape[axis] {
                break;
            }
            coord[axis] = 0;
        }
    }
    Ok(Grid::from_shape_vec(&shape, values)?)
}

pub fn write_grid<W: Write>(w: &mut W, grid: &Grid) -> Result<(), FormatError> {
    writeln!(w, "{}", grid.rank())?;
    for n in grid.shape() {
        writeln!(w, "{n}")?;
    }
    let shape = grid.shape();
    let mut coord = vec![0usize; shape.len()];
    for _ in 0..grid.len() {
        let v = grid.get(&coord).unwrap_or(PERSEUS_MISSING);
        writeln!(w, "{v}")?;
        for axis in 0..shape.len() {
            coord[axis] += 1;
            if coord[axis] < shape[axis] {
                break;
            }
            coord[axis] = 0;
        }
    }
    Ok(())
}
