// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/guardiao-rs

//! Configuration module

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::hazard::Hazard;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,

    /// Data directory for the event log, feature files and assessments
    pub data_dir: PathBuf,

    /// Log level
    pub log_level: String,

    /// Enable demo mode (simulated sensor publisher)
    pub demo_mode: bool,

    /// MQTT configuration
    pub mqtt: MqttConfig,

    /// Analysis configuration
    pub analysis: AnalysisConfig,

    /// Demo publisher configuration
    pub demo: DemoConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Guardião Natural".to_string(),
            data_dir: PathBuf::from("./data"),
            log_level: "info".to_string(),
            demo_mode: false,
            mqtt: MqttConfig::default(),
            analysis: AnalysisConfig::default(),
            demo: DemoConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            // Create parent directories
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("guardiao"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Path of the append-only event log.
    pub fn events_path(&self) -> PathBuf {
        self.data_dir.join("all_sensor_data.json")
    }

    /// Path of the feature table handed to a hazard's analysis program.
    pub fn features_path(&self, hazard: Hazard) -> PathBuf {
        self.data_dir.join(format!("{}_features.csv", hazard.name()))
    }

    /// Path where a hazard's latest assessment is published.
    pub fn assessment_path(&self, hazard: Hazard) -> PathBuf {
        self.data_dir
            .join(format!("{}_risk_output.json", hazard.name()))
    }
}

/// MQTT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    /// Broker hostname
    pub broker: String,

    /// Broker port
    pub port: u16,

    /// Client identifier
    pub client_id: String,

    /// Topic carrying sensor payloads
    pub topic: String,

    /// Optional username
    pub username: Option<String>,

    /// Optional password
    pub password: Option<String>,

    /// Keep-alive interval in seconds
    pub keep_alive_secs: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker: "broker.hivemq.com".to_string(),
            port: 1883,
            client_id: "guardiao-ingest".to_string(),
            topic: "guardiao_natural/sensor_data".to_string(),
            username: None,
            password: None,
            keep_alive_secs: 60,
        }
    }
}

/// Analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Interpreter that runs the analysis scripts
    pub program: String,

    /// Flood risk model script
    pub flood_script: PathBuf,

    /// Fire risk model script
    pub fire_script: PathBuf,

    /// Wall-clock limit per run, in seconds
    pub timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            program: "Rscript".to_string(),
            flood_script: PathBuf::from("./analysis/flood_analysis.R"),
            fire_script: PathBuf::from("./analysis/fire_analysis.R"),
            timeout_secs: 60,
        }
    }
}

impl AnalysisConfig {
    /// Script for the given hazard's risk model.
    pub fn script_for(&self, hazard: Hazard) -> &Path {
        match hazard {
            Hazard::Flood => &self.flood_script,
            Hazard::Fire => &self.fire_script,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Demo publisher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Seconds between simulated transmissions
    pub interval_secs: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self { interval_secs: 10 }
    }
}
