//! Terrain scene builder.
//!
//! Loads a scene configuration, assembles the DEM and vector layers into
//! one local frame and writes the result as JSON.

mod config_loader;

use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use scene::{assemble_scene, SourceFetcher};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "scene-builder")]
#[command(about = "Assemble terrain and vector layers into a local 3D scene")]
struct Args {
    /// Scene configuration file path
    #[arg(short, long, default_value = "scene.yaml", env = "SCENE_CONFIG")]
    config: String,

    /// Output file (stdout when absent)
    #[arg(short, long)]
    output: Option<String>,

    /// Emit the full scene geometry instead of the summary
    #[arg(long)]
    geometry: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so stdout stays clean for the JSON result.
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    info!(config = %args.config, "Starting scene builder");

    let config = config_loader::load_scene_config(&args.config)?;
    info!(
        target_crs = %config.target_crs,
        layers = config.layers.len(),
        dem = config.dem.as_ref().map(|d| d.url.as_str()).unwrap_or("none"),
        "Loaded configuration"
    );

    let fetcher = SourceFetcher::new(Duration::from_secs(config.fetch_timeout_secs))
        .context("Failed to create source fetcher")?;
    let scene = assemble_scene(&config, &fetcher, &fetcher)
        .await
        .context("Failed to assemble scene")?;

    for failure in &scene.failures {
        warn!(asset = %failure.id, code = %failure.code, error = %failure.error, "Asset excluded");
    }

    let json = if args.geometry {
        serde_json::to_string_pretty(&scene)?
    } else {
        serde_json::to_string_pretty(&scene.summary())?
    };

    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path))?;
            info!(path = %path, "Wrote scene");
        }
        None => println!("{}", json),
    }

    Ok(())
}
