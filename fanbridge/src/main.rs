/*!
# Fan Bridge

Bridges Smart Wi-Fi ventilation fan controllers, spoken to over their UDP
protocol, to a status/command model for a home-automation bus.

## Features

- Broadcast discovery of controllers and their device identifiers
- Periodic status polling with JSON snapshots on stdout
- Boost mode control
- TOML configuration with command-line overrides

## Usage

### Poll and publish status (default)
```bash
fanbridge --config fanbridge.toml
```

### Find controllers on the local network
```bash
fanbridge discover --port 4000
```

### One-off read or command
```bash
fanbridge read
fanbridge boost on
```
*/

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod bridge;
mod config;
mod discovery;
mod resolve;
mod session;

use bridge::{Bridge, Command, JsonLineSink};
use config::AppConfig;
use discovery::Discovery;
use session::DeviceSession;

#[derive(Parser)]
#[command(name = "fanbridge")]
#[command(about = "UDP bridge for Smart Wi-Fi ventilation fans")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, default_value = "fanbridge.toml")]
    config: PathBuf,

    /// Controller hostname, overrides the config file
    #[arg(long)]
    host: Option<String>,

    /// Controller device id, overrides the config file
    #[arg(long)]
    device_id: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the controller and publish status snapshots
    Run {
        /// Skip discovery even if the config enables it
        #[arg(long)]
        no_discovery: bool,
    },

    /// Broadcast discovery probes and list answering controllers
    Discover {
        /// UDP port to probe
        #[arg(short, long)]
        port: Option<u16>,

        /// Number of probes
        #[arg(short = 'n', long)]
        probes: Option<usize>,

        /// Print the address to device id map as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read all known parameters once
    Read,

    /// Switch boost mode
    Boost {
        #[arg(value_enum)]
        state: OnOff,
    },

    /// Generate configuration file
    Config {
        /// Output path for configuration file
        #[arg(short, long, default_value = "fanbridge.toml")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OnOff {
    On,
    Off,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging goes to stderr so stdout carries only status JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Some(Commands::Config { output }) = &cli.command {
        return generate_config_file(output);
    }

    let mut config = AppConfig::load_or_default(&cli.config)?;
    if let Some(host) = cli.host {
        config.fan.hostname = host;
    }
    if let Some(device_id) = cli.device_id {
        config.fan.device_id = device_id;
    }

    match cli.command {
        Some(Commands::Run { no_discovery }) => run_bridge(config, !no_discovery),
        None => run_bridge(config, true),
        Some(Commands::Discover { port, probes, json }) => run_discovery(
            port.unwrap_or(config.bridge.discovery_port),
            probes.unwrap_or(config.bridge.discovery_probes),
            json,
        ),
        Some(Commands::Read) => run_read(config),
        Some(Commands::Boost { state }) => run_boost(config, matches!(state, OnOff::On)),
        Some(Commands::Config { .. }) => Ok(()),
    }
}

/// Discover (if enabled), then poll until Ctrl+C
fn run_bridge(mut config: AppConfig, allow_discovery: bool) -> Result<()> {
    if allow_discovery && config.bridge.discover_on_start {
        let rt = Runtime::new()?;
        let devices = rt.block_on(
            Discovery::new(config.bridge.discovery_port)
                .with_max_probes(config.bridge.discovery_probes)
                .discover(),
        );
        resolve::resolve_endpoint(&mut config.fan, &devices);
    }

    info!(
        "🚀 Starting bridge for {} ({}:{})",
        config.fan.device_id, config.fan.hostname, config.fan.port
    );

    let bridge = Bridge::new(
        DeviceSession::new(&config.fan),
        Duration::from_secs(config.bridge.poll_interval_secs),
        config.bridge.channel_buffer_size,
    );

    let running = bridge.get_running_flag();
    ctrlc::set_handler(move || {
        info!("🛑 Received Ctrl+C, shutting down gracefully...");
        running.store(false, std::sync::atomic::Ordering::SeqCst);
    })?;

    bridge
        .start(Box::new(JsonLineSink::new(std::io::stdout())))
        .context("Bridge failed")?;

    info!("✅ Bridge stopped");
    Ok(())
}

fn run_discovery(port: u16, probes: usize, json: bool) -> Result<()> {
    let rt = Runtime::new()?;
    let devices = rt.block_on(discovery::discover(port, probes));

    if json {
        println!("{}", serde_json::to_string_pretty(&devices.to_map())?);
        return Ok(());
    }
    if devices.is_empty() {
        println!("No devices found");
    }
    for device in devices.iter() {
        println!("{}\t{}", device.address, device.device_id);
    }

    Ok(())
}

fn run_read(config: AppConfig) -> Result<()> {
    let rt = Runtime::new()?;
    let session = DeviceSession::new(&config.fan);
    let parameters = rt.block_on(session.read_all())?;

    if parameters.is_empty() {
        println!("No answer from {}", session.endpoint());
    }
    for parameter in &parameters {
        println!("{}", parameter);
    }

    Ok(())
}

fn run_boost(config: AppConfig, on: bool) -> Result<()> {
    let command = Command::SetBoost(on);

    let rt = Runtime::new()?;
    let session = DeviceSession::new(&config.fan);
    let confirmed = rt.block_on(command.apply(&session))?;

    match confirmed.first() {
        Some(value) => println!("Boost mode is now {}", if value.as_bool() { "ON" } else { "OFF" }),
        None => println!("No confirmation from {}", session.endpoint()),
    }

    Ok(())
}

/// Generate a default configuration file
fn generate_config_file(output_path: &Path) -> Result<()> {
    let config = AppConfig::new();
    config.save_to_file(output_path)?;

    println!("✅ Generated configuration file: {}", output_path.display());
    println!("📝 Edit the file to customize settings, then run:");
    println!("   fanbridge --config {}", output_path.display());

    Ok(())
}
