//! Print pair counts and the longest intervals for the sphere-shell samples.
//!
//! Usage:
//!   cargo run -p cubical --example shell_diagrams -- 3
//!   cargo run -p cubical --example shell_diagrams -- 4
//!
//! Each shell should show one essential class in dimension 0 and one cavity
//! `(0, 1)` in dimension `rank - 1`, under both constructions.

use cubical::api::{compute_with_config, sphere_shell, Construction, PhConfig, SHELL_THICKNESS};

fn main() {
    let rank: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(3);
    if !(1..=4).contains(&rank) {
        eprintln!("usage: shell_diagrams [1|2|3|4]");
        return;
    }
    let grid = match sphere_shell(rank, 5, None, SHELL_THICKNESS) {
        Ok(g) => g,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };
    for construction in [Construction::V, Construction::T] {
        let config = PhConfig::default()
            .with_maxdim(rank - 1)
            .with_construction(construction);
        match compute_with_config(&grid, &config) {
            Ok(d) => {
                println!("{construction}: pairs per dim {:?}", d.counts());
                for (dim, birth, death) in d.triples().into_iter().rev().take(4) {
                    println!("  dim {dim}: [{birth}, {death})");
                }
            }
            Err(err) => eprintln!("{construction}: {err}"),
        }
    }
}
