//! Persistent homology of cubical complexes built from dense grids.
//!
//! Pipeline: `grid` → `complex` → `filtration` → `pairing` → (`duality`) →
//! `result`; `engine` strings the stages together and `io` reads and writes
//! the grid and diagram file formats.
//!
//! API Policy
//! - `api` lists the curated surface used by the CLI and the Python
//!   bindings. Internals may change shape freely.

pub mod api;
pub mod complex;
pub mod duality;
pub mod engine;
pub mod error;
pub mod filtration;
pub mod grid;
pub mod io;
pub mod pairing;
pub mod result;
pub mod samples;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use engine::{compute_persistence, compute_t, compute_v, compute_with_config, PhConfig};
pub use error::PersistenceError;
pub use grid::{Construction, Grid};
pub use result::{Diagram, Location, PersistenceRecord, ESSENTIAL_DEATH};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::engine::{compute_persistence, compute_with_config, PhConfig};
    pub use crate::error::PersistenceError;
    pub use crate::grid::{Construction, Grid};
    pub use crate::pairing::PairingStrategy;
    pub use crate::result::{Diagram, Location, PersistenceRecord, ESSENTIAL_DEATH};
}
