//! Cablepath CLI
//!
//! Traces signal paths over a topology snapshot (YAML or JSON).
//!
//! # Usage
//!
//! ```bash
//! # Trace a single origin
//! cargo run --bin cablepath -- trace --topology site.yaml --origin 1
//!
//! # Trace every cabled endpoint and print the resulting paths
//! cargo run --bin cablepath -- rebuild --topology site.yaml --json
//!
//! # Verify that a full trace is self-consistent
//! cargo run --bin cablepath -- check --topology site.yaml
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use cablepath_engine::{
    CablePath, ConsistencyController, EngineConfig, PathNode, PathTracer, TerminationGraph,
    TerminationId, Topology, TopologySnapshot, TracedPath,
};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cablepath")]
#[command(about = "Cable path tracing over topology snapshots", long_about = None)]
struct Cli {
    /// Engine configuration file (YAML, version 1)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace the path starting at one endpoint
    Trace {
        /// Topology snapshot (.json, otherwise YAML)
        #[arg(short, long)]
        topology: PathBuf,

        /// Origin termination id
        #[arg(short, long)]
        origin: u64,

        /// Print the traced path as JSON
        #[arg(long)]
        json: bool,
    },

    /// Trace every cabled endpoint
    Rebuild {
        /// Topology snapshot (.json, otherwise YAML)
        #[arg(short, long)]
        topology: PathBuf,

        /// Print all paths as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rebuild, then verify the index and retrace idempotence
    Check {
        /// Topology snapshot (.json, otherwise YAML)
        #[arg(short, long)]
        topology: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("cablepath_engine={},cablepath={},warn", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Trace {
            topology,
            origin,
            json,
        } => trace(&config, &topology, TerminationId(origin), json),
        Commands::Rebuild { topology, json } => rebuild(config, &topology, json),
        Commands::Check { topology } => check(config, &topology),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_yaml(path)
            .with_context(|| format!("loading configuration {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn load_topology(path: &Path) -> Result<Topology> {
    let snapshot = TopologySnapshot::from_path(path)
        .with_context(|| format!("reading topology {}", path.display()))?;
    let topology = snapshot
        .into_topology()
        .with_context(|| format!("loading topology {}", path.display()))?;
    info!(
        "loaded {}: {} terminations, {} cables",
        path.display(),
        topology.termination_count(),
        topology.cable_count()
    );
    Ok(topology)
}

fn trace(config: &EngineConfig, topology: &Path, origin: TerminationId, json: bool) -> Result<bool> {
    let topology = load_topology(topology)?;
    let tracer = PathTracer::new(&topology).with_max_hops(config.max_hops);

    let Some(path) = tracer.trace(&[origin])? else {
        println!("{origin}: not cabled, no path");
        return Ok(true);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&path)?);
    } else {
        print_trace(&topology, &path);
    }
    Ok(true)
}

fn rebuild(config: EngineConfig, topology: &Path, json: bool) -> Result<bool> {
    let topology = load_topology(topology)?;
    let controller = ConsistencyController::new(config);
    controller.rebuild_all(&topology)?;

    let paths = controller.paths();
    if json {
        println!("{}", serde_json::to_string_pretty(&paths)?);
    } else {
        for path in &paths {
            print_summary(&topology, path);
        }
        let stats = controller.stats();
        println!(
            "\n{} paths: {} active, {} complete, {} split",
            stats.paths, stats.active, stats.complete, stats.split
        );
    }
    Ok(true)
}

fn check(config: EngineConfig, topology: &Path) -> Result<bool> {
    let topology = load_topology(topology)?;
    let max_hops = config.max_hops;
    let controller = ConsistencyController::new(config);
    controller.rebuild_all(&topology)?;

    let mut ok = true;
    if let Err(problems) = controller.index().check_consistency() {
        println!("❌ reverse index: {problems}");
        ok = false;
    }

    let tracer = PathTracer::new(&topology).with_max_hops(max_hops);
    for path in controller.paths() {
        let retraced = tracer.trace(path.origins())?;
        if retraced.as_ref() != Some(&path.trace) {
            println!("❌ {} changes when retraced", path.id);
            ok = false;
        }
    }

    let stats = controller.stats();
    if ok {
        println!(
            "✅ {} paths consistent ({} reverse entries over {} nodes)",
            stats.paths, stats.reverse_entries, stats.indexed_nodes
        );
    }
    Ok(ok)
}

fn print_trace(topology: &Topology, path: &TracedPath) {
    for (i, hop) in path.hops.iter().enumerate() {
        let names: Vec<String> = hop.iter().map(|node| node_name(topology, *node)).collect();
        println!("{:>3}  {}", i, names.join(", "));
    }
    println!(
        "\nactive={} complete={} split={}",
        path.is_active, path.is_complete, path.is_split
    );
}

fn print_summary(topology: &Topology, path: &CablePath) {
    let names = |ids: &[TerminationId]| {
        ids.iter()
            .map(|id| node_name(topology, PathNode::Termination(*id)))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let state = if path.is_active() {
        "active"
    } else if path.is_split() {
        "split"
    } else {
        "inactive"
    };
    let destinations = if path.destinations().is_empty() {
        "-".to_string()
    } else {
        names(path.destinations())
    };
    println!(
        "{:<10} {:<24} → {:<24} {} hops, {}",
        path.id.to_string(),
        names(path.origins()),
        destinations,
        path.trace.hops.len(),
        state
    );
}

fn node_name(topology: &Topology, node: PathNode) -> String {
    match node {
        PathNode::Termination(id) => match topology.termination(id) {
            Some(t) if !t.name.is_empty() => format!("{} ({})", t.name, t.class()),
            _ => id.to_string(),
        },
        PathNode::Cable(id) => match topology.cable(id).and_then(|c| c.label.clone()) {
            Some(label) => format!("{id} [{label}]"),
            None => id.to_string(),
        },
    }
}
