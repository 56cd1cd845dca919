use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;
use dotenv::dotenv;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use navfield::domain::{DomainModel, JsonDomain};
use navfield::grid::{BoundingBox, Grid};
use navfield::plot::{FigureOptions, build_figure, run_viewer};
use navfield::policy::{self, BurnPolicy, InferenceBackend};
use navfield::sampler::{StateSample, parse_npoints};
use navfield::settings::Settings;

/// Plot the action field of a trained navigation policy
#[derive(Debug, Parser)]
#[command(name = "navfield", version, about)]
struct Cli {
    /// Domain id (resolved in NAVFIELD_DOMAIN_DIR) or path to a domain JSON file
    domain: String,
    /// Policy architecture (JSON)
    config: PathBuf,
    /// Checkpoint to restore; the recorder adds its own extension
    checkpoint: PathBuf,
    /// Sampled region as xmin,xmax,ymin,ymax
    #[arg(allow_hyphen_values = true)]
    size: BoundingBox,
    /// Samples per axis
    #[arg(value_parser = parse_npoints)]
    npoints: NonZeroUsize,
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("navfield=debug,info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {err}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let settings = Settings::from_env();
    tracing::debug!("{:?}", settings);

    let domain = JsonDomain::resolve(&cli.domain, &settings.domain_dir)?;
    tracing::info!("Domain '{}' from {}", domain.name(), domain.source().display());
    let grid = Grid::from_domain(&domain, cli.size)?;

    let mut network =
        BurnPolicy::<InferenceBackend>::from_config_file(Default::default(), &cli.config)?;

    let states = StateSample::generate(&grid.size, cli.npoints);
    tracing::info!(
        "Sampled {} states ({}x{}) over {}",
        states.len(),
        cli.npoints,
        cli.npoints,
        grid.size
    );

    let actions = policy::evaluate(&mut network, &states, &cli.checkpoint)?;
    let figure = build_figure(&grid, &states, &actions, FigureOptions::from(&settings))?;

    if settings.visualizer {
        run_viewer(figure, &format!("navfield - {}", domain.name()));
    } else {
        for line in figure.summary().lines() {
            tracing::info!("{}", line);
        }
    }

    Ok(())
}
