//! Command-line front end.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use flipsym::decompose::{build_jobs, DecomposeConfig, ModelSpec};
use flipsym::models::{load_model, preset, PRESETS};
use flipsym::simplify::Strategy;
use flipsym::{decompose_key, default_output_path, generate, GenerateOptions};

#[derive(Parser, Debug)]
#[command(name = "flipsym", version, about = "Symbolic M/N term generation for covariance models")]
struct Cli {
    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decompose a model and write the Python module
    Generate {
        #[command(flatten)]
        model: ModelArgs,
        /// Output file [default: ./<model>/flip_terms.py]
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Worker threads [default: available parallelism]
        #[arg(short = 'j', long)]
        workers: Option<usize>,
        #[command(flatten)]
        tuning: TuningArgs,
    },
    /// List the built-in models
    Models,
    /// Decompose one job and print its M and N terms
    Show {
        #[command(flatten)]
        model: ModelArgs,
        /// Job key, e.g. gg_1_2 or vv_0_2_1_1
        #[arg(short, long)]
        key: String,
        #[command(flatten)]
        tuning: TuningArgs,
    },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct ModelArgs {
    /// Built-in model name (see `flipsym models`)
    #[arg(short, long)]
    model: Option<String>,
    /// JSON model description
    #[arg(long)]
    model_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TuningArgs {
    /// JSON decomposition config (simplifier and symbol names)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Simplifier iteration budget
    #[arg(long)]
    max_iterations: Option<usize>,
    /// Simplification strategy for M terms (direct, trig-first)
    #[arg(long)]
    m_strategy: Option<Strategy>,
    /// Simplification strategy for N terms (direct, trig-first)
    #[arg(long)]
    n_strategy: Option<Strategy>,
}

impl ModelArgs {
    fn load(&self) -> Result<ModelSpec> {
        match (&self.model, &self.model_file) {
            (Some(name), _) => preset(name).with_context(|| format!("loading preset `{name}`")),
            (None, Some(path)) => {
                load_model(path).with_context(|| format!("loading model file {}", path.display()))
            }
            (None, None) => anyhow::bail!("one of --model or --model-file is required"),
        }
    }
}

impl TuningArgs {
    fn config(&self) -> Result<DecomposeConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&json).with_context(|| format!("parsing config {}", path.display()))?
            }
            None => DecomposeConfig::default(),
        };
        if let Some(n) = self.max_iterations {
            config.simplifier.max_iterations = n;
        }
        if let Some(s) = self.m_strategy {
            config.simplifier.m_strategy = s;
        }
        if let Some(s) = self.n_strategy {
            config.simplifier.n_strategy = s;
        }
        Ok(config)
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            model,
            output,
            workers,
            tuning,
        } => {
            let model = model.load()?;
            let mut options = GenerateOptions {
                config: tuning.config()?,
                ..GenerateOptions::default()
            };
            if let Some(workers) = workers {
                options.workers = workers;
            }
            let path = output.unwrap_or_else(|| default_output_path(&model));
            let start = Instant::now();
            let generated = generate(&model, &path, &options)
                .with_context(|| format!("generating model `{}`", model.name))?;
            info!(
                path = %path.display(),
                jobs = generated.grid.len(),
                functions = generated.non_empty(),
                elapsed_s = start.elapsed().as_secs_f64(),
                "done"
            );
        }
        Commands::Models => {
            let mut out = io::stdout().lock();
            for name in PRESETS {
                let model = preset(name)?;
                let jobs = build_jobs(&model).with_context(|| format!("building grid of `{name}`"))?.len();
                writeln!(out, "{name:<16} {:<15} {jobs:>6} jobs", model.geometry.to_string())?;
            }
        }
        Commands::Show { model, key, tuning } => {
            let model = model.load()?;
            let pair = decompose_key(&model, &key, &tuning.config()?)
                .with_context(|| format!("decomposing {key}"))?;
            let mut out = io::stdout().lock();
            writeln!(out, "M = {}", pair.m)?;
            writeln!(out, "N = {}", pair.n)?;
        }
    }
    Ok(())
}
