//! ---
//! herd_section: "01-core-functionality"
//! herd_subsection: "binary"
//! herd_type: "source"
//! herd_scope: "code"
//! herd_description: "Binary entrypoint for the herd emulator."
//! herd_version: "v0.1.0"
//! herd_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use herd_common::{
    init_tracing, AppConfig, Coordinate, HerdConfig, LoadedAppConfig, ScheduleMode,
};
use herd_core::SimulationDriver;
use herd_net::{HttpSink, StdoutSink, TelemetrySink};
use herd_rt::StopSignal;
use herd_sim::{
    herd_bounds, spawn_herd, BehaviorState, EntitySimulator, SeededRandom, TelemetryRecord,
};
use tokio::signal;
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "herd-emu";

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    about = "GPS herd emulator feeding a livestock tracking API",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(long, env = "HERD_API_URL", help = "Override the tracking API base URL")]
    api_url: Option<String>,

    #[arg(long, env = "HERD_ENTITIES", help = "Override the number of simulated animals")]
    entities: Option<usize>,

    #[arg(
        long,
        env = "HERD_CENTER_LAT",
        allow_hyphen_values = true,
        help = "Override the base latitude"
    )]
    center_lat: Option<f64>,

    #[arg(
        long,
        env = "HERD_CENTER_LNG",
        allow_hyphen_values = true,
        help = "Override the base longitude"
    )]
    center_lng: Option<f64>,

    #[arg(long, env = "HERD_RADIUS_DEG", help = "Override the containment radius in degrees")]
    radius_deg: Option<f64>,

    #[arg(long, env = "HERD_DURATION_SECS", help = "Stop after this many seconds")]
    duration_secs: Option<u64>,

    #[arg(long, env = "HERD_SEED", help = "Seed for reproducible runs")]
    seed: Option<u64>,

    #[arg(long, value_enum, help = "Override the scheduling mode")]
    mode: Option<CliMode>,

    #[arg(long, help = "Print telemetry to stdout instead of posting it")]
    dry_run: bool,

    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print version information and exit"
    )]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliMode {
    Sequential,
    Concurrent,
}

impl From<CliMode> for ScheduleMode {
    fn from(value: CliMode) -> Self {
        match value {
            CliMode::Sequential => ScheduleMode::Sequential,
            CliMode::Concurrent => ScheduleMode::Concurrent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum Commands {
    #[command(about = "Run the herd simulation")]
    Run,
    #[command(about = "Print the geofence bounds enclosing the configured herd")]
    Bounds,
    #[command(about = "Send one fixed telemetry record and report the outcome")]
    Probe,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("{} {}", SERVICE_NAME, env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let loaded = load_config(&cli)?;
    let mut config = loaded.config;
    apply_overrides(&cli, &mut config);
    init_tracing(SERVICE_NAME, &config.logging)?;
    if let Err(err) = config.validate() {
        error!(error = %err, "configuration rejected");
        return Err(err.context("invalid configuration"));
    }
    match &loaded.source {
        Some(path) => info!(config_path = %path.display(), "configuration loaded"),
        None => info!("no configuration file found; running on defaults"),
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_emulator(config, cli.dry_run).await,
        Commands::Bounds => {
            let bounds = herd_bounds(&config.herd);
            println!("{}", serde_json::to_string_pretty(&bounds)?);
            Ok(())
        }
        Commands::Probe => probe(&config, cli.dry_run).await,
    }
}

/// An explicit `--config` must exist; otherwise the usual candidates apply.
fn load_config(cli: &Cli) -> Result<LoadedAppConfig> {
    match &cli.config {
        Some(path) => AppConfig::load_from_path(path)
            .with_context(|| format!("unable to load --config {}", path.display())),
        None => AppConfig::load_with_source(&[
            PathBuf::from("configs/herd-emu.toml"),
            PathBuf::from("configs/example.toml"),
        ]),
    }
}

/// Fold command-line and environment overrides into the loaded file values.
fn apply_overrides(cli: &Cli, config: &mut AppConfig) {
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(count) = cli.entities {
        config.herd.count = count;
    }
    if let Some(latitude) = cli.center_lat {
        config.herd.base.latitude = latitude;
    }
    if let Some(longitude) = cli.center_lng {
        config.herd.base.longitude = longitude;
    }
    if let Some(radius) = cli.radius_deg {
        config.herd.containment_radius_deg = radius;
    }
    if let Some(secs) = cli.duration_secs {
        config.schedule.duration = Some(Duration::from_secs(secs));
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(mode) = cli.mode {
        config.schedule.mode = mode.into();
    }
}

async fn run_emulator(config: AppConfig, dry_run: bool) -> Result<()> {
    let mut root = SeededRandom::from_optional_seed(config.seed);
    let entities = spawn_herd(&config, &mut root);
    let interval_source = root.fork();
    info!(
        entities = entities.len(),
        base_lat = config.herd.base.latitude,
        base_lng = config.herd.base.longitude,
        radius_deg = config.herd.containment_radius_deg,
        pattern = ?config.herd.spread.pattern,
        seed = config.seed,
        "herd created"
    );

    if dry_run {
        drive(config, StdoutSink, entities, interval_source).await
    } else {
        let sink = HttpSink::from_config(&config.api)?;
        drive(config, sink, entities, interval_source).await
    }
}

async fn drive<S: TelemetrySink>(
    config: AppConfig,
    sink: S,
    entities: Vec<EntitySimulator>,
    interval_source: SeededRandom,
) -> Result<()> {
    let stop = StopSignal::new();
    let listener = stop.subscribe();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("ctrl-c received; stopping after in-flight ticks");
                stop.trigger();
            }
            Err(err) => {
                warn!(error = %err, "unable to listen for ctrl-c");
                // Dropping the signal would read as a stop request.
                std::future::pending::<()>().await;
            }
        }
    });

    let driver = SimulationDriver::new(config.schedule, sink, entities)
        .with_interval_source(interval_source);
    let summary = driver.run(listener).await;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Fixed record for the first device at the herd base, used to check that
/// the tracking API knows the device before a full run.
fn probe_record(herd: &HerdConfig) -> TelemetryRecord {
    let Coordinate {
        latitude,
        longitude,
    } = herd.base;
    TelemetryRecord {
        device_id: format!("{}01", herd.device_id_prefix),
        latitude,
        longitude,
        altitude: 20.0,
        speed: 0.0,
        activity_level: 5,
        temperature: 38.5,
        battery_level: 100,
        signal_strength: 90,
        timestamp: Utc::now(),
        tag: format!("{}001", herd.tag_prefix),
        behavior: BehaviorState::Resting,
    }
}

async fn probe(config: &AppConfig, dry_run: bool) -> Result<()> {
    let record = probe_record(&config.herd);
    let outcome = if dry_run {
        StdoutSink.deliver(&record).await
    } else {
        let sink = HttpSink::from_config(&config.api)?;
        info!(endpoint = %sink.endpoint(), device_id = %record.device_id, "probing tracking api");
        sink.deliver(&record).await
    };
    match outcome {
        Ok(()) => {
            info!(device_id = %record.device_id, "probe accepted");
            println!("probe accepted for {}", record.device_id);
            Ok(())
        }
        Err(err) => {
            error!(device_id = %record.device_id, error = %err, "probe failed");
            Err(err).with_context(|| format!("probe failed for {}", record.device_id))
        }
    }
}
