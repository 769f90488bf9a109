// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/guardiao-rs

//! Guardião Natural - Environmental Hazard Monitoring Pipeline
//!
//! Subscribes to environmental sensor readings over MQTT and persists every
//! transmission to an append-only event log. Each arrival runs the external
//! flood and fire risk models; classifications are published as JSON
//! assessments and surfaced as population-facing alerts.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use guardiao::{
    demo, Config, EventStore, Hazard, IngestController, MqttIngest, RiskAnalyzer, ScriptAnalyzer,
    VERSION,
};

/// Guardião Natural - Environmental Hazard Monitoring Pipeline
#[derive(Parser, Debug)]
#[command(name = "guardiao")]
#[command(author = "Guardião Natural Project")]
#[command(version = VERSION)]
#[command(about = "Sensor ingestion, risk analysis and alerting for flood and fire")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// MQTT broker address
    #[arg(long)]
    broker: Option<String>,

    /// MQTT broker port
    #[arg(long)]
    port: Option<u16>,

    /// MQTT topic carrying sensor payloads
    #[arg(long)]
    topic: Option<String>,

    /// Data output directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Demo mode with a simulated sensor publisher
    #[arg(long)]
    demo: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.trace {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("🌊🔥 Guardião Natural v{} - Environmental Hazard Monitoring", VERSION);

    // Load or create configuration
    let config_path = args.config.unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;

    // Override with command line args
    if args.demo {
        config.demo_mode = true;
    }
    if let Some(broker) = args.broker {
        config.mqtt.broker = broker;
    }
    if let Some(port) = args.port {
        config.mqtt.port = port;
    }
    if let Some(topic) = args.topic {
        config.mqtt.topic = topic;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    info!("Configuration loaded from {:?}", config_path);
    info!("Demo mode: {}", config.demo_mode);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(config))
}

/// Wire the pipeline together and pump payloads until shutdown.
async fn run(config: Config) -> Result<()> {
    std::fs::create_dir_all(&config.data_dir)?;

    let store = Arc::new(EventStore::new(config.events_path()));
    info!("Event log at {:?}", store.path());

    let flood = analyzer_for(&config, Hazard::Flood);
    let fire = analyzer_for(&config, Hazard::Fire);
    let controller = IngestController::new(store, flood, fire);

    // A broker we cannot reach at startup is fatal; afterwards the transport
    // rides out disconnects on its own.
    let mut ingest = MqttIngest::connect(&config.mqtt).await?;

    if config.demo_mode {
        let interval = Duration::from_secs(config.demo.interval_secs);
        tokio::spawn(demo::run_publisher(
            ingest.client(),
            config.mqtt.topic.clone(),
            interval,
        ));
    }

    info!("🚀 Pipeline running, waiting for sensor data");
    info!("   Press Ctrl+C to shutdown");

    loop {
        tokio::select! {
            payload = ingest.recv() => {
                match payload {
                    Some(payload) => {
                        let outcome = controller.handle_payload(&payload).await;
                        debug!("Cycle finished: {:?}", outcome);
                    }
                    None => {
                        info!("Inbound channel closed, stopping");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, cleaning up...");
                break;
            }
        }
    }

    let _ = ingest.disconnect().await;
    info!("Guardião shutdown complete");

    Ok(())
}

fn analyzer_for(config: &Config, hazard: Hazard) -> Arc<dyn RiskAnalyzer> {
    Arc::new(ScriptAnalyzer::new(
        config.analysis.program.clone(),
        config.analysis.script_for(hazard),
        config.features_path(hazard),
        config.assessment_path(hazard),
        config.analysis.timeout(),
    ))
}
