//! Coboundary column reduction over Z/2.
//!
//! Columns are the cells of one dimension, visited from the last to the first
//! in filtration order. A column holds the cell's cofaces sorted ascending;
//! its pivot is the first entry. Adding the column that already owns the
//! pivot (symmetric difference) repeats until the pivot is new, giving a
//! finite interval, or the column empties, giving an essential class.
//!
//! Under `LinkFind`, a column whose smallest coface has the same value and
//! no owner yet is paired on the spot as an apparent pair, and its column is
//! rebuilt from the coboundary if a later reduction needs it.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::{DimensionPairs, PairingStrategy, PersistencePair};
use crate::complex::{CellId, CubicalComplex};
use crate::error::PersistenceError;
use crate::filtration::{sorted_cells, FiltrationKey};

/// Where the reduced column owning a pivot can be found.
#[derive(Clone, Copy, Debug)]
enum Owner {
    /// Unreduced: the column equals the cell's coboundary and is rebuilt on demand.
    Coboundary(FiltrationKey),
    /// Index into the stored reduced columns.
    Stored(usize),
}

/// Reducer bound to one complex and strategy.
#[derive(Clone, Copy, Debug)]
pub struct ColumnReducer<'c, 'g> {
    complex: &'c CubicalComplex<'g>,
    strategy: PairingStrategy,
}

impl<'c, 'g> ColumnReducer<'c, 'g> {
    pub fn new(complex: &'c CubicalComplex<'g>, strategy: PairingStrategy) -> Self {
        Self { complex, strategy }
    }

    pub fn strategy(&self) -> PairingStrategy {
        self.strategy
    }

    /// Intervals of dimension `dim`, skipping the columns in `cleared` (the
    /// death cells of dimension `dim - 1`).
    pub fn reduce(
        &self,
        dim: usize,
        cleared: &HashSet<CellId>,
    ) -> Result<DimensionPairs, PersistenceError> {
        let mut columns = sorted_cells(self.complex, dim);
        let total = columns.len();
        columns.retain(|k| !cleared.contains(&k.id));

        let mut out = DimensionPairs::new(dim);
        let mut pivots: HashMap<CellId, Owner> = HashMap::new();
        let mut stored: Vec<Vec<FiltrationKey>> = Vec::new();
        let mut apparent = 0usize;
        let mut additions = 0usize;

        for &sigma in columns.iter().rev() {
            if self.strategy == PairingStrategy::LinkFind {
                match self.complex.cofacets(&self.complex.cell(sigma.id)).min() {
                    None => {
                        out.pairs.push(PersistencePair::essential(dim, sigma));
                        continue;
                    }
                    Some(pivot)
                        if pivot.value == sigma.value && !pivots.contains_key(&pivot.id) =>
                    {
                        pivots.insert(pivot.id, Owner::Coboundary(sigma));
                        out.record(sigma, pivot)?;
                        apparent += 1;
                        continue;
                    }
                    Some(_) => {}
                }
            }

            let mut working = self.coboundary(sigma);
            loop {
                let Some(&pivot) = working.first() else {
                    out.pairs.push(PersistencePair::essential(dim, sigma));
                    break;
                };
                match pivots.get(&pivot.id).copied() {
                    None => {
                        pivots.insert(pivot.id, Owner::Stored(stored.len()));
                        out.record(sigma, pivot)?;
                        stored.push(working);
                        break;
                    }
                    Some(owner) => {
                        let other = self.column(owner, &stored);
                        working = add_columns(&working, &other);
                        additions += 1;
                    }
                }
            }
        }
        out.pairs.reverse();

        debug!(
            dim,
            strategy = %self.strategy,
            cells = total,
            cleared = total - columns.len(),
            pairs = out.pairs.len(),
            essential = out.essential_count(),
            apparent,
            additions,
            stored = stored.len(),
            "column reduction"
        );
        Ok(out)
    }

    fn coboundary(&self, sigma: FiltrationKey) -> Vec<FiltrationKey> {
        self.complex
            .cofacets(&self.complex.cell(sigma.id))
            .sorted()
            .as_slice()
            .to_vec()
    }

    fn column<'s>(&self, owner: Owner, stored: &'s [Vec<FiltrationKey>]) -> Cow<'s, [FiltrationKey]> {
        match owner {
            Owner::Coboundary(sigma) => Cow::Owned(self.coboundary(sigma)),
            Owner::Stored(i) => Cow::Borrowed(&stored[i]),
        }
    }
}

/// Sum of two sorted columns over Z/2.
fn add_columns(a: &[FiltrationKey], b: &[FiltrationKey]) -> Vec<FiltrationKey> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}
