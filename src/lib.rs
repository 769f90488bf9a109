// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/guardiao-rs

//! Guardião Natural - Environmental Hazard Monitoring Pipeline
//!
//! Ingests environmental sensor readings over MQTT into an append-only
//! event log. Each arrival drives an external statistical risk model per
//! hazard class (flood and fire); the model's classification is published
//! as a JSON assessment and turned into a population-facing alert.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   Ingestion Controller                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────┐   ┌───────────┐   ┌───────────┐   ┌──────────┐  │
//! │  │  MQTT  │ → │   Event   │ → │  Feature  │ → │ Analysis │  │
//! │  │ Ingest │   │   Store   │   │ Extractor │   │ Invoker  │  │
//! │  └────────┘   └───────────┘   └───────────┘   └──────────┘  │
//! │                                                    ↓         │
//! │                               ┌───────────┐   ┌──────────┐  │
//! │                               │   Alert   │ ← │   Risk   │  │
//! │                               │ Synthesis │   │ Models   │  │
//! │                               └───────────┘   └──────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![allow(dead_code)]

pub mod alert;
pub mod analysis;
pub mod config;
pub mod demo;
pub mod event;
pub mod extract;
pub mod hazard;
pub mod ingest;
pub mod store;

// Re-exports for convenience
pub use alert::{Alert, Severity};
pub use analysis::{AnalysisError, RiskAnalyzer, RiskAssessment, ScriptAnalyzer};
pub use config::Config;
pub use event::{EventLog, SensorEvent};
pub use extract::HazardFeatureSet;
pub use hazard::{Hazard, RiskLevel};
pub use ingest::{CycleOutcome, HazardOutcome, IngestController, MqttIngest};
pub use store::EventStore;

/// Guardião version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Guardião name
pub const NAME: &str = "Guardião Natural";
