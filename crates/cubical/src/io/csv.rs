//! CSV diagrams: `dim,birth,death` and, with location tracking,
//! `x1,y1,z1,x2,y2,z2`. Floats are right-aligned in 18 columns with ten
//! decimals; the reader trims the padding.

use std::io::{BufRead, Write};

use super::FormatError;
use crate::result::{Diagram, Location, PersistenceRecord, COORD_WIDTH};

pub fn format_record(r: &PersistenceRecord, location: Location) -> String {
    let mut line = format!("{},{:18.10},{:18.10}", r.dim, r.birth, r.death);
    if location == Location::Yes {
        for c in r.birth_coord.iter().chain(&r.death_coord) {
            line.push(',');
            line.push_str(&c.to_string());
        }
    }
    line
}

pub fn write_diagram<W: Write>(
    w: &mut W,
    diagram: &Diagram,
    location: Location,
) -> Result<(), FormatError> {
    for r in diagram {
        writeln!(w, "{}", format_record(r, location))?;
    }
    Ok(())
}

/// Parse rows written by `write_diagram`; missing coordinates read as zero.
pub fn read_diagram<R: BufRead>(reader: R) -> Result<Vec<PersistenceRecord>, FormatError> {
    let mut out = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 3 && fields.len() != 3 + 2 * COORD_WIDTH {
            return Err(FormatError::malformed(format!(
                "line {}: expected 3 or 9 fields, got {}",
                lineno + 1,
                fields.len()
            )));
        }
        let bad = |what: &str| FormatError::malformed(format!("line {}: bad {what}", lineno + 1));
        let dim: usize = fields[0].parse().map_err(|_| bad("dim"))?;
        let birth: f64 = fields[1].parse().map_err(|_| bad("birth"))?;
        let death: f64 = fields[2].parse().map_err(|_| bad("death"))?;
        let mut coords = [0i64; 2 * COORD_WIDTH];
        for (slot, field) in coords.iter_mut().zip(fields.iter().skip(3)) {
            *slot = field.parse().map_err(|_| bad("coordinate"))?;
        }
        out.push(PersistenceRecord {
            dim,
            birth,
            death,
            birth_coord: [coords[0], coords[1], coords[2]],
            death_coord: [coords[3], coords[4], coords[5]],
        });
    }
    Ok(out)
}
