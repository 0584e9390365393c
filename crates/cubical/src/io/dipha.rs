//! DIPHA binary files.
//!
//! All words are little-endian 8-byte integers or doubles.
//! - Image: magic, type `1`, element count, rank, shape (rank words), values.
//!   Values run with the first axis fastest, the reverse of `Grid`'s order.
//! - Persistence diagram: magic, type `2`, pair count, then per pair
//!   `(i64 dim, f64 birth, f64 death)`.

use std::io::{Read, Write};

use super::{checked_len, initial_capacity, FormatError};
use crate::grid::{Grid, MAX_RANK};
use crate::result::{Diagram, PersistenceRecord};

pub const DIPHA_MAGIC: i64 = 8_067_171_840;
pub const DIPHA_IMAGE: i64 = 1;
pub const DIPHA_DIAGRAM: i64 = 2;

fn read_i64<R: Read>(r: &mut R) -> Result<i64, FormatError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

fn read_f64<R: Read>(r: &mut R) -> Result<f64, FormatError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

fn expect_header<R: Read>(r: &mut R, kind: i64) -> Result<(), FormatError> {
    let magic = read_i64(r)?;
    if magic != DIPHA_MAGIC {
        return Err(FormatError::malformed(format!("bad DIPHA magic {magic}")));
    }
    let found = read_i64(r)?;
    if found != kind {
        return Err(FormatError::malformed(format!(
            "DIPHA type {found}, expected {kind}"
        )));
    }
    Ok(())
}

/// Index permutation between first-axis-fastest and row-major order.
fn fortran_to_row_major(shape: &[usize]) -> Vec<usize> {
    let rank = shape.len();
    let total: usize = shape.iter().product();
    let mut map = Vec::with_capacity(total);
    let mut coord = vec![0usize; rank];
    let row_strides = crate::grid::row_major_strides(shape);
    for _ in 0..total {
        map.push(coord.iter().zip(&row_strides).map(|(c, s)| c * s).sum());
        for axis in 0..rank {
            coord[axis] += 1;
            if coord[axis] < shape[axis] {
                break;
            }
            coord[axis] = 0;
        }
    }
    map
}

pub fn read_image<R: Read>(r: &mut R) -> Result<Grid, FormatError> {
    expect_header(r, DIPHA_IMAGE)?;
    let count = read_i64(r)?;
    let rank = read_i64(r)?;
    if !(1..=MAX_RANK as i64).contains(&rank) {
        return Err(FormatError::malformed(format!("DIPHA rank {rank}")));
    }
    let mut shape = Vec::with_capacity(rank as usize);
    for _ in 0..rank {
        let n = read_i64(r)?;
        if n <= 0 {
            return Err(FormatError::malformed(format!("DIPHA axis length {n}")));
        }
        shape.push(n as usize);
    }
    let total = checked_len(&shape)?;
    if usize::try_from(count).ok() != Some(total) {
        return Err(FormatError::malformed(format!(
            "DIPHA header counts {count} values for shape {shape:?}"
        )));
    }
    let mut file_order = Vec::with_capacity(initial_capacity(total));
    for _ in 0..total {
        file_order.push(read_f64(r)?);
    }
    let mut values = vec![0.0; total];
    for (v, slot) in file_order.into_iter().zip(fortran_to_row_major(&shape)) {
        values[slot] = v;
    }
    Ok(Grid::from_shape_vec(&shape, values)?)
}

pub fn write_image<W: Write>(w: &mut W, grid: &Grid) -> Result<(), FormatError> {
    w.write_all(&DIPHA_MAGIC.to_le_bytes())?;
    w.write_all(&DIPHA_IMAGE.to_le_bytes())?;
    w.write_all(&(grid.len() as i64).to_le_bytes())?;
    w.write_all(&(grid.rank() as i64).to_le_bytes())?;
    for &n in grid.shape() {
        w.write_all(&(n as i64).to_le_bytes())?;
    }
    let values = grid.values();
    for slot in fortran_to_row_major(grid.shape()) {
        w.write_all(&values[slot].to_le_bytes())?;
    }
    Ok(())
}

pub fn write_diagram<W: Write>(w: &mut W, diagram: &Diagram) -> Result<(), FormatError> {
    w.write_all(&DIPHA_MAGIC.to_le_bytes())?;
    w.write_all(&DIPHA_DIAGRAM.to_le_bytes())?;
    w.write_all(&(diagram.len() as i64).to_le_bytes())?;
    for r in diagram {
        w.write_all(&(r.dim as i64).to_le_bytes())?;
        w.write_all(&r.birth.to_le_bytes())?;
        w.write_all(&r.death.to_le_bytes())?;
    }
    Ok(())
}

/// Records without coordinates; DIPHA diagrams do not carry them.
pub fn read_diagram<R: Read>(r: &mut R) -> Result<Vec<PersistenceRecord>, FormatError> {
    expect_header(r, DIPHA_DIAGRAM)?;
    let count = read_i64(r)?;
    if count < 0 {
        return Err(FormatError::malformed(format!("DIPHA pair count {count}")));
    }
    let mut out = Vec::with_capacity(initial_capacity(count as usize));
    for _ in 0..count {
        let dim = read_i64(r)?;
        let birth = read_f64(r)?;
        let death = read_f64(r)?;
        out.push(PersistenceRecord {
            dim: usize::try_from(dim)
                .map_err(|_| FormatError::malformed(format!("negative dimension {dim}")))?,
            birth,
            death,
            birth_coord: [0; 3],
            death_coord: [0; 3],
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn image_round_trip_and_axis_order() {
        let grid = Grid::from_shape_vec(&[2, 3], vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let mut bytes = Vec::new();
        write_image(&mut bytes, &grid).unwrap();
        assert_eq!(bytes.len(), 8 * (4 + 2 + 6));
        // First value after the header is (0,0); second is (1,0) = 3.0.
        let second = f64::from_le_bytes(bytes[8 * 7..8 * 8].try_into().unwrap());
        assert_eq!(second, 3.0);
        let back = read_image(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&42i64.to_le_bytes());
        bytes.extend_from_slice(&DIPHA_IMAGE.to_le_bytes());
        assert!(matches!(
            read_image(&mut Cursor::new(bytes)),
            Err(FormatError::Malformed { .. })
        ));
    }

    fn header(words: &[i64]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    #[test]
    fn oversized_headers_are_malformed() {
        let overflow = header(&[DIPHA_MAGIC, DIPHA_IMAGE, 4, 2, 1 << 40, 1 << 40]);
        assert!(matches!(
            read_image(&mut Cursor::new(overflow)),
            Err(FormatError::Malformed { .. })
        ));

        // A plausible shape with no values behind it runs out of input.
        let short = header(&[DIPHA_MAGIC, DIPHA_IMAGE, 1 << 30, 2, 1 << 15, 1 << 15]);
        assert!(matches!(read_image(&mut Cursor::new(short)), Err(FormatError::Io(_))));

        let huge = header(&[DIPHA_MAGIC, DIPHA_DIAGRAM, i64::MAX]);
        assert!(matches!(read_diagram(&mut Cursor::new(huge)), Err(FormatError::Io(_))));
        let negative = header(&[DIPHA_MAGIC, DIPHA_DIAGRAM, -3]);
        assert!(matches!(
            read_diagram(&mut Cursor::new(negative)),
            Err(FormatError::Malformed { .. })
        ));
    }

    #[test]
    fn diagram_round_trip() {
        let d = Diagram::new(
            vec![
                PersistenceRecord {
                    dim: 0,
                    birth: 0.0,
                    death: f64::MAX,
                    birth_coord: [0; 3],
                    death_coord: [0; 3],
                },
                PersistenceRecord {
                    dim: 1,
                    birth: 0.5,
                    death: 2.0,
                    birth_coord: [0; 3],
                    death_coord: [0; 3],
                },
            ],
            2,
            false,
        );
        let mut bytes = Vec::new();
        write_diagram(&mut bytes, &d).unwrap();
        let back = read_diagram(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(back, d.records());
    }
}
