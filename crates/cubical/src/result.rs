//! Fixed-width output records and their assembly from per-dimension pairs.

use crate::complex::{CellId, CubicalComplex};
use crate::duality::records_to_primal;
use crate::grid::MAX_RANK;
use crate::pairing::DimensionPairs;

/// Death value written for essential classes.
pub const ESSENTIAL_DEATH: f64 = f64::MAX;

/// Coordinate slots per record; extra axes are dropped, missing ones are zero.
pub const COORD_WIDTH: usize = 3;

/// Columns of a record laid out as a row: dim, birth, death, birth xyz, death xyz.
pub const ROW_WIDTH: usize = 3 + 2 * COORD_WIDTH;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PersistenceRecord {
    pub dim: usize,
    pub birth: f64,
    pub death: f64,
    pub birth_coord: [i64; COORD_WIDTH],
    pub death_coord: [i64; COORD_WIDTH],
}

impl PersistenceRecord {
    pub fn is_essential(&self) -> bool {
        self.death == ESSENTIAL_DEATH
    }

    pub fn to_row(&self) -> [f64; ROW_WIDTH] {
        let mut row = [0.0; ROW_WIDTH];
        row[0] = self.dim as f64;
        row[1] = self.birth;
        row[2] = self.death;
        for i in 0..COORD_WIDTH {
            row[3 + i] = self.birth_coord[i] as f64;
            row[3 + COORD_WIDTH + i] = self.death_coord[i] as f64;
        }
        row
    }

    /// Inverse of `to_row`; coordinates are rounded.
    pub fn from_row(row: &[f64; ROW_WIDTH]) -> Self {
        let mut birth_coord = [0; COORD_WIDTH];
        let mut death_coord = [0; COORD_WIDTH];
        for i in 0..COORD_WIDTH {
            birth_coord[i] = row[3 + i].round() as i64;
            death_coord[i] = row[3 + COORD_WIDTH + i].round() as i64;
        }
        Self {
            dim: row[0].round() as usize,
            birth: row[1],
            death: row[2],
            birth_coord,
            death_coord,
        }
    }
}

/// Ordered persistence output of one computation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Diagram {
    records: Vec<PersistenceRecord>,
    rank: usize,
    embedded: bool,
}

impl Diagram {
    pub fn new(records: Vec<PersistenceRecord>, rank: usize, embedded: bool) -> Self {
        Self {
            records,
            rank,
            embedded,
        }
    }

    pub fn records(&self) -> &[PersistenceRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PersistenceRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// True when the records are in the dual numbering of the embedded mode.
    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PersistenceRecord> {
        self.records.iter()
    }

    pub fn dim(&self, dim: usize) -> impl Iterator<Item = &PersistenceRecord> + '_ {
        self.records.iter().filter(move |r| r.dim == dim)
    }

    /// Record count per dimension `0..rank`.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.rank.max(1)];
        for r in &self.records {
            if r.dim < counts.len() {
                counts[r.dim] += 1;
            }
        }
        counts
    }

    /// Essential classes per dimension: the Betti numbers at the last level.
    pub fn betti_numbers(&self) -> Vec<usize> {
        let mut betti = vec![0; self.rank.max(1)];
        for r in self.records.iter().filter(|r| r.is_essential()) {
            if r.dim < betti.len() {
                betti[r.dim] += 1;
            }
        }
        betti
    }

    /// `(dim, birth, death)` sorted lexicographically.
    pub fn triples(&self) -> Vec<(usize, f64, f64)> {
        let mut t: Vec<(usize, f64, f64)> =
            self.records.iter().map(|r| (r.dim, r.birth, r.death)).collect();
        t.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then(a.1.total_cmp(&b.1))
                .then(a.2.total_cmp(&b.2))
        });
        t
    }

    pub fn to_rows(&self) -> Vec<[f64; ROW_WIDTH]> {
        self.records.iter().map(PersistenceRecord::to_row).collect()
    }

    /// Primal-numbered view of an embedded diagram; a copy otherwise.
    pub fn to_primal(&self) -> Diagram {
        if !self.embedded {
            return self.clone();
        }
        Diagram::new(records_to_primal(&self.records, self.rank), self.rank, false)
    }
}

impl<'a> IntoIterator for &'a Diagram {
    type Item = &'a PersistenceRecord;
    type IntoIter = std::slice::Iter<'a, PersistenceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Whether records carry representative coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Location {
    #[default]
    Yes,
    No,
}

impl From<bool> for Location {
    fn from(track: bool) -> Self {
        if track {
            Self::Yes
        } else {
            Self::No
        }
    }
}

impl std::str::FromStr for Location {
    type Err = crate::error::PersistenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" | "birth" | "death" => Ok(Self::Yes),
            "no" | "false" | "none" => Ok(Self::No),
            other => Err(crate::error::PersistenceError::unsupported(format!(
                "location must be \"yes\" or \"no\", got {other:?}"
            ))),
        }
    }
}

/// Flatten per-dimension pairs into records, dimension by dimension.
///
/// `pad` is subtracted from every tracked coordinate along the grid's axes so
/// that embedded results point back into the caller's grid.
pub fn assemble(
    complex: &CubicalComplex<'_>,
    dims: &[DimensionPairs],
    location: Location,
    pad: usize,
    embedded: bool,
) -> Diagram {
    let rank = complex.rank();
    let coord = |id: CellId| -> [i64; COORD_WIDTH] {
        let voxel = complex.representative_voxel(&complex.cell(id));
        let mut out = [0; COORD_WIDTH];
        for (axis, slot) in out.iter_mut().enumerate().take(rank.min(MAX_RANK)) {
            *slot = voxel[axis] as i64 - pad as i64;
        }
        out
    };

    let mut ordered: Vec<&DimensionPairs> = dims.iter().collect();
    ordered.sort_by_key(|d| d.dim);
    let records = ordered
        .into_iter()
        .flat_map(|d| d.pairs.iter())
        .map(|p| {
            let (birth_coord, death_coord) = match location {
                Location::No => ([0; COORD_WIDTH], [0; COORD_WIDTH]),
                Location::Yes => (
                    coord(p.birth_cell),
                    p.death_cell.map(&coord).unwrap_or([0; COORD_WIDTH]),
                ),
            };
            PersistenceRecord {
                dim: p.dim,
                birth: p.birth,
                death: if p.is_essential() {
                    ESSENTIAL_DEATH
                } else {
                    p.death
                },
                birth_coord,
                death_coord,
            }
        })
        .collect();
    Diagram::new(records, rank, embedded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_keep_fixed_width() {
        let r = PersistenceRecord {
            dim: 1,
            birth: 0.5,
            death: ESSENTIAL_DEATH,
            birth_coord: [1, 2, 3],
            death_coord: [0, 0, 0],
        };
        let row = r.to_row();
        assert_eq!(row.len(), 9);
        assert_eq!(row[2], f64::MAX);
        assert_eq!(PersistenceRecord::from_row(&row), r);
        assert!(r.is_essential());
    }

    #[test]
    fn location_parses() {
        assert_eq!("yes".parse::<Location>().unwrap(), Location::Yes);
        assert_eq!("No".parse::<Location>().unwrap(), Location::No);
        assert_eq!(Location::from(false), Location::No);
        assert!("maybe".parse::<Location>().is_err());
    }
}
