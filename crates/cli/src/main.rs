use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use cubical::api::{
    compute_with_config, random_grid, random_levels, sphere_shell, write_diagram, write_grid,
    Construction, Diagram, Grid, Location, PairingStrategy, PhConfig, SampleKind,
    SHELL_THICKNESS,
};
use cubical::io::csv::format_record;
use rayon::prelude::*;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

mod image;
mod provenance;

use provenance::{write_sidecar, Payload, Summary};

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Persistent homology of cubical grids")]
struct Cmd {
    /// Debug-level logs (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Compute the persistence diagram of one grid
    Compute {
        input: PathBuf,
        /// Diagram path (.csv, .npy, .complex) or "none"
        #[arg(long, short, default_value = "output.csv")]
        output: String,
        /// Print every record to stdout as CSV
        #[arg(long)]
        print: bool,
        #[command(flatten)]
        opts: PhOpts,
    },
    /// Compute many grids in parallel
    Batch {
        inputs: Vec<PathBuf>,
        #[arg(long)]
        out_dir: PathBuf,
        /// Diagram extension for every output
        #[arg(long, default_value = "csv")]
        format: String,
        /// Worker threads; 0 picks one per core
        #[arg(long, default_value_t = 0)]
        jobs: usize,
        #[command(flatten)]
        opts: PhOpts,
    },
    /// Rewrite a grid in another format (.npy, .complex, .txt)
    Convert { input: PathBuf, output: PathBuf },
    /// Write a synthetic grid
    Sample {
        output: PathBuf,
        #[arg(long, default_value = "sphere")]
        kind: SampleKind,
        #[arg(long, default_value_t = 3)]
        rank: usize,
        #[arg(long, default_value_t = 5)]
        size: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Distinct values for `levels`
        #[arg(long, default_value_t = 4)]
        levels: u32,
        /// Shell radius; defaults to (size - 1) / 2
        #[arg(long)]
        radius: Option<f64>,
        #[arg(long, default_value_t = SHELL_THICKNESS)]
        thickness: f64,
    },
    /// Print a small provenance JSON block
    Report,
}

/// Engine options shared by `compute` and `batch`.
#[derive(Args, Clone, Debug)]
struct PhOpts {
    /// Highest dimension; lowered to rank - 1 when larger
    #[arg(long, default_value_t = 2)]
    maxdim: usize,
    #[arg(long, default_value = "V")]
    construction: Construction,
    #[arg(long, default_value = "link-find")]
    algorithm: PairingStrategy,
    /// Leave out cells valued at or above this
    #[arg(long)]
    threshold: Option<f64>,
    /// Only dimension rank - 1
    #[arg(long)]
    top_dim: bool,
    /// Alexander-dual mode
    #[arg(long)]
    embedded: bool,
    /// Report embedded results in primal dimensions and values
    #[arg(long, requires = "embedded")]
    primal: bool,
    #[arg(long, default_value = "yes")]
    location: Location,
    /// Rerun with the other pairing strategy and compare
    #[arg(long)]
    verify: bool,
}

impl PhOpts {
    fn config(&self, rank: usize) -> PhConfig {
        PhConfig::default()
            .with_maxdim(self.maxdim)
            .with_construction(self.construction)
            .with_strategy(self.algorithm)
            .with_threshold(self.threshold)
            .with_top_dim(self.top_dim)
            .with_embedded(self.embedded)
            .with_location(self.location)
            .with_verify(self.verify)
            .clamped_to(rank)
    }

    fn params(&self) -> serde_json::Value {
        json!({
            "maxdim": self.maxdim,
            "construction": self.construction.to_string(),
            "algorithm": self.algorithm.to_string(),
            "threshold": self.threshold,
            "top_dim": self.top_dim,
            "embedded": self.embedded,
            "primal": self.primal,
            "location": self.location == Location::Yes,
            "verify": self.verify,
        })
    }
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    init_tracing(cmd.verbose);
    match cmd.action {
        Action::Compute {
            input,
            output,
            print,
            opts,
        } => compute(&input, &output, print, &opts),
        Action::Batch {
            inputs,
            out_dir,
            format,
            jobs,
            opts,
        } => batch(&inputs, &out_dir, &format, jobs, &opts),
        Action::Convert { input, output } => convert(&input, &output),
        Action::Sample {
            output,
            kind,
            rank,
            size,
            seed,
            levels,
            radius,
            thickness,
        } => sample(&output, kind, rank, size, seed, levels, radius, thickness),
        Action::Report => report(),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    SubscriberBuilder::default()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

struct Outcome {
    diagram: Diagram,
    summary: Summary,
}

/// Load, compute, and optionally write one diagram with its sidecar.
fn run_one(input: &Path, output: Option<&Path>, opts: &PhOpts) -> Result<Outcome> {
    let grid = image::load(input, opts.threshold)?;
    let config = opts.config(grid.rank());
    if config.maxdim < opts.maxdim && !opts.top_dim {
        tracing::info!(
            requested = opts.maxdim,
            used = config.maxdim,
            "maxdim_clamped"
        );
    }

    let started = Instant::now();
    let mut diagram = compute_with_config(&grid, &config)
        .with_context(|| format!("computing {}", input.display()))?;
    if opts.primal {
        diagram = diagram.to_primal();
    }
    let summary = Summary {
        shape: grid.shape().to_vec(),
        pairs_per_dim: diagram.counts(),
        essential_per_dim: diagram.betti_numbers(),
        elapsed_ms: started.elapsed().as_millis() as u64,
    };
    tracing::info!(
        input = %input.display(),
        shape = ?summary.shape,
        pairs = diagram.len(),
        elapsed_ms = summary.elapsed_ms,
        "computed"
    );

    if let Some(out) = output {
        ensure_parent(out)?;
        write_diagram(out, &diagram, config.location)
            .with_context(|| format!("writing {}", out.display()))?;
        let payload = Payload::new(opts.params())
            .with_input(input)
            .with_summary(summary.clone());
        write_sidecar(out, payload)?;
    }
    Ok(Outcome { diagram, summary })
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    Ok(())
}

fn compute(input: &Path, output: &str, print: bool, opts: &PhOpts) -> Result<()> {
    let out = (output != "none").then(|| Path::new(output));
    let outcome = run_one(input, out, opts)?;
    for (dim, n) in outcome.summary.pairs_per_dim.iter().enumerate() {
        println!("the number of pairs in dim {dim}: {n}");
    }
    println!("the number of total pairs : {}", outcome.diagram.len());
    if print {
        for r in &outcome.diagram {
            println!("{}", format_record(r, opts.location));
        }
    }
    Ok(())
}

fn batch_output(input: &Path, out_dir: &Path, format: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "grid".to_string());
    out_dir.join(format!("{stem}.{format}"))
}

fn batch(inputs: &[PathBuf], out_dir: &Path, format: &str, jobs: usize, opts: &PhOpts) -> Result<()> {
    if inputs.is_empty() {
        bail!("batch needs at least one input");
    }
    std::fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
    tracing::info!(inputs = inputs.len(), threads = pool.current_num_threads(), "batch");

    let results: Vec<(PathBuf, Result<Outcome>)> = pool.install(|| {
        inputs
            .par_iter()
            .map(|input| {
                let out = batch_output(input, out_dir, format);
                (input.clone(), run_one(input, Some(&out), opts))
            })
            .collect()
    });

    let mut failed = 0usize;
    for (input, result) in &results {
        match result {
            Ok(outcome) => println!(
                "{}: {} pairs {:?}",
                input.display(),
                outcome.diagram.len(),
                outcome.summary.pairs_per_dim
            ),
            Err(err) => {
                failed += 1;
                let error = format!("{err:#}");
                tracing::error!(input = %input.display(), error, "batch_item_failed");
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} inputs failed", results.len());
    }
    Ok(())
}

fn convert(input: &Path, output: &Path) -> Result<()> {
    let grid = image::load(input, None)?;
    ensure_parent(output)?;
    write_grid(output, &grid).with_context(|| format!("writing {}", output.display()))?;
    tracing::info!(input = %input.display(), output = %output.display(), shape = ?grid.shape(), "convert");
    write_sidecar(output, Payload::new(json!({"command": "convert"})).with_input(input))?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn sample(
    output: &Path,
    kind: SampleKind,
    rank: usize,
    size: usize,
    seed: u64,
    levels: u32,
    radius: Option<f64>,
    thickness: f64,
) -> Result<()> {
    let shape = vec![size; rank];
    let grid: Grid = match kind {
        SampleKind::Sphere => sphere_shell(rank, size, radius, thickness)?,
        SampleKind::Random => random_grid(&shape, seed)?,
        SampleKind::Levels => random_levels(&shape, levels, seed)?,
    };
    ensure_parent(output)?;
    write_grid(output, &grid).with_context(|| format!("writing {}", output.display()))?;
    tracing::info!(%kind, rank, size, seed, output = %output.display(), "sample");
    let params = json!({
        "kind": kind.to_string(),
        "rank": rank,
        "size": size,
        "seed": seed,
        "levels": levels,
        "radius": radius,
        "thickness": thickness,
    });
    write_sidecar(output, Payload::new(params))?;
    Ok(())
}

fn report() -> Result<()> {
    let obj = json!({
        "code_rev": provenance::current_git_rev(),
        "engine_version": cubical::VERSION,
        "params": {},
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn opts(maxdim: usize) -> PhOpts {
        PhOpts {
            maxdim,
            construction: Construction::V,
            algorithm: PairingStrategy::LinkFind,
            threshold: None,
            top_dim: false,
            embedded: false,
            primal: false,
            location: Location::Yes,
            verify: false,
        }
    }

    fn ring_npy(dir: &Path) -> PathBuf {
        let mut vals = vec![0.0; 9];
        vals[4] = 1.0;
        let path = dir.join("ring.npy");
        write_grid(&path, &Grid::from_shape_vec(&[3, 3], vals).unwrap()).unwrap();
        path
    }

    #[test]
    fn compute_clamps_maxdim_and_writes_sidecar() {
        let dir = tempdir().unwrap();
        let input = ring_npy(dir.path());
        let out = dir.path().join("out/pd.csv");
        let outcome = run_one(&input, Some(&out), &opts(5)).unwrap();
        assert_eq!(outcome.summary.pairs_per_dim, vec![1, 1]);
        let text = fs::read_to_string(&out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().nth(1).unwrap().starts_with("1,      0.0000000000,      1.0000000000"));
        assert!(dir.path().join("out/pd.provenance.json").exists());
    }

    #[test]
    fn embedded_primal_matches_t() {
        let dir = tempdir().unwrap();
        let input = ring_npy(dir.path());
        let mut o = opts(1);
        o.construction = Construction::T;
        let t = run_one(&input, None, &o).unwrap().diagram;
        let mut e = opts(1);
        e.embedded = true;
        e.primal = true;
        let primal = run_one(&input, None, &e).unwrap().diagram;
        assert_eq!(primal.triples(), t.triples());
    }

    #[test]
    fn batch_writes_one_diagram_per_input() {
        let dir = tempdir().unwrap();
        let a = ring_npy(dir.path());
        let b = dir.path().join("shell.npy");
        write_grid(&b, &sphere_shell(3, 5, None, SHELL_THICKNESS).unwrap()).unwrap();
        let out_dir = dir.path().join("diagrams");
        batch(&[a, b], &out_dir, "npy", 2, &opts(2)).unwrap();
        assert!(out_dir.join("ring.npy").exists());
        assert!(out_dir.join("shell.npy").exists());
        assert!(out_dir.join("shell.provenance.json").exists());
    }

    #[test]
    fn batch_reports_failures() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.npy");
        let err = batch(&[missing], &dir.path().join("o"), "csv", 1, &opts(1)).unwrap_err();
        assert!(err.to_string().contains("1 of 1"));
    }

    #[test]
    fn sample_then_convert_round_trips() {
        let dir = tempdir().unwrap();
        let npy = dir.path().join("s.npy");
        sample(&npy, SampleKind::Levels, 2, 4, 3, 3, None, SHELL_THICKNESS).unwrap();
        let txt = dir.path().join("s.txt");
        convert(&npy, &txt).unwrap();
        let dipha = dir.path().join("s.complex");
        convert(&txt, &dipha).unwrap();
        let a = image::load(&npy, None).unwrap();
        let b = image::load(&dipha, None).unwrap();
        assert_eq!(a, b);
        assert!(dir.path().join("s.provenance.json").exists());
    }
}
