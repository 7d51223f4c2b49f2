//! Sarcomere Sim - Entry point
//!
//! Runs a single half-sarcomere lattice and prints a summary.
//!
//! CLI Usage:
//!   cargo run -- -n 500 --pca 5.5 --seed 7
//!   cargo run -- --csv --checkpoint          # Write metrics and final state
//!   cargo run -- --resume exports/checkpoint_X.json -n 100

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use sarcomere_sim::{
    config::{LatticeConfig, Parameters},
    export::{export_checkpoint_json, load_checkpoint_json, CsvExporter},
    lattice::Lattice,
};

struct Args {
    steps: usize,
    pca: f64,
    seed: Option<u64>,
    csv: bool,
    checkpoint: bool,
    resume: Option<PathBuf>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        steps: 100,
        pca: 4.0,
        seed: None,
        csv: false,
        checkpoint: false,
        resume: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-n" | "--steps" => {
                i += 1;
                if i < args.len() {
                    parsed.steps = args[i].parse().unwrap_or(100);
                }
            }
            "--pca" => {
                i += 1;
                if i < args.len() {
                    parsed.pca = args[i].parse().unwrap_or(4.0);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    parsed.seed = args[i].parse().ok();
                }
            }
            "--csv" => parsed.csv = true,
            "--checkpoint" => parsed.checkpoint = true,
            "--resume" => {
                i += 1;
                if i < args.len() {
                    parsed.resume = Some(PathBuf::from(&args[i]));
                }
            }
            "--help" | "-h" => {
                println!("Sarcomere Sim");
                println!();
                println!("Usage: sarcomere-sim [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --steps N      Number of timesteps (default: 100)");
                println!("  --pca P            Calcium as pCa (default: 4.0)");
                println!("  --seed S           RNG seed (default: from entropy)");
                println!("  --csv              Write per-timestep metrics to exports/");
                println!("  --checkpoint       Write the final state to exports/");
                println!("  --resume FILE      Continue from a checkpoint file");
                println!("  --help, -h         Show this help");
                std::process::exit(0);
            }
            other => log::warn!("Ignoring unknown argument {}", other),
        }
        i += 1;
    }

    parsed
}

fn main() -> Result<()> {
    env_logger::init();

    let args = parse_args();

    let mut lattice = match &args.resume {
        Some(path) => Lattice::from_record(load_checkpoint_json(path)?)?,
        None => {
            let params = Parameters::load_or_default();
            let config = LatticeConfig {
                pCa: args.pca,
                seed: args.seed,
                ..Default::default()
            };
            Lattice::new(config, params)?
        }
    };

    println!("=== Sarcomere Sim ===\n");
    println!(
        "Lattice: {} thick, {} thin, {} cross-bridges",
        lattice.thick().len(),
        lattice.thin().len(),
        lattice.crossbridges().count()
    );
    println!(
        "pCa {:.2}, z-line {:.1} nm, spacing {:.1} nm, seed {:?}",
        lattice.pCa(),
        lattice.z_line_nm(),
        lattice.lattice_spacing_nm(),
        lattice.config().seed
    );
    println!("\n--- Running {} timesteps ---\n", args.steps);

    let mut csv = if args.csv {
        Some(CsvExporter::new(1)?)
    } else {
        None
    };

    let start_time = Instant::now();
    let report_every = (args.steps / 10).max(1);
    let mut last = None;
    for step in 0..args.steps {
        lattice.advance_timestep()?;
        let metrics = lattice.collect_metrics();
        if let Some(exporter) = csv.as_mut() {
            exporter.maybe_record(&metrics)?;
        }
        if step % report_every == 0 {
            println!(
                "  step {:5}: force={:8.2} pN, free/loose/tight={:.3}/{:.3}/{:.3}, tm active={:.3}",
                metrics.timestep,
                metrics.axial_force_pN,
                metrics.xb_fraction_free,
                metrics.xb_fraction_loose,
                metrics.xb_fraction_tight,
                metrics.tm_fraction_active
            );
        }
        last = Some(metrics);
    }
    let elapsed = start_time.elapsed();

    println!("\n=== Results ===");
    println!("Elapsed time: {:.2?}", elapsed);
    if args.steps > 0 {
        println!(
            "Timesteps per second: {:.1}",
            args.steps as f64 / elapsed.as_secs_f64()
        );
    }
    println!("Simulated time: {:.1} ms", lattice.elapsed_ms());
    if let Some(m) = last {
        println!("Axial force: {:.2} pN", m.axial_force_pN);
        println!("Radial tension: {:.2} pN", m.radial_tension_pN);
        println!("Bound heads: {}", lattice.bound_count());
        println!(
            "Thick displacement: mean {:.3} nm, max {:.3} nm",
            m.thick_displacement.mean, m.thick_displacement.max
        );
    }

    if let Some(exporter) = csv {
        let path = exporter.finish()?;
        println!("Metrics written to {}", path.display());
    }
    if args.checkpoint {
        let path = export_checkpoint_json(&lattice.to_record())?;
        println!("Checkpoint written to {}", path.display());
    }

    Ok(())
}
