//! Curated API for the CLI, the Python bindings, and benches.
//!
//! Prefer these re-exports over reaching into submodules.

// Grids and configuration
pub use crate::engine::{
    compute_persistence, compute_t, compute_v, compute_with_config, pair_dimensions, PhConfig,
};
pub use crate::error::PersistenceError;
pub use crate::grid::{Construction, Grid, MAX_RANK};
// Complex and pairing internals, for diagnostics
pub use crate::complex::{Cell, CellId, CubicalComplex};
pub use crate::filtration::{sorted_cells, FiltrationKey};
pub use crate::pairing::{DimensionPairs, PairingStrategy, PersistencePair};
// Embedded mode
pub use crate::duality::{embed, records_to_primal, to_primal, EMBED_FILL};
// Output
pub use crate::result::{Diagram, Location, PersistenceRecord, ESSENTIAL_DEATH, ROW_WIDTH};
// File formats
pub use crate::io::{read_grid, write_diagram, write_grid, DiagramFormat, FormatError, GridFormat};
// Synthetic inputs
pub use crate::samples::{random_grid, random_levels, sphere_shell, SampleKind, SHELL_THICKNESS};
