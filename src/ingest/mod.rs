//! Ingestion controller - drives the pipeline one inbound payload at a time

mod mqtt;

pub use mqtt::MqttIngest;

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::alert::{self, Alert};
use crate::analysis::RiskAnalyzer;
use crate::event::SensorEvent;
use crate::extract;
use crate::hazard::Hazard;
use crate::store::EventStore;

/// Terminal state of one hazard's sub-pipeline within a cycle.
#[derive(Debug)]
pub enum HazardOutcome {
    /// No qualifying events for this hazard yet.
    Skipped,
    /// Analysis produced no assessment; the previous one stands.
    Failed,
    /// Fresh assessment produced and its alert surfaced.
    Alerted(Alert),
}

/// Result of handling one inbound payload.
#[derive(Debug)]
pub enum CycleOutcome {
    /// Payload was not a JSON object; dropped before persistence.
    Rejected,
    /// Event could not be persisted; the hazard pipelines did not run.
    StoreFailed,
    /// Event persisted, both hazard pipelines driven to a terminal state.
    Processed {
        flood: HazardOutcome,
        fire: HazardOutcome,
    },
}

/// Message-driven orchestrator: stamp, persist, then run both hazard
/// pipelines off one consistent snapshot of the log.
///
/// Collaborators are injected, so tests run the full cycle against a
/// temporary store and stub analyzers.
pub struct IngestController {
    store: Arc<EventStore>,
    flood: Arc<dyn RiskAnalyzer>,
    fire: Arc<dyn RiskAnalyzer>,
}

impl IngestController {
    pub fn new(
        store: Arc<EventStore>,
        flood: Arc<dyn RiskAnalyzer>,
        fire: Arc<dyn RiskAnalyzer>,
    ) -> Self {
        Self { store, flood, fire }
    }

    /// Handle one raw payload to completion.
    ///
    /// Never propagates: every failure mode maps to an outcome plus a log
    /// line, so one bad payload or wedged script cannot take the worker
    /// down with it.
    pub async fn handle_payload(&self, payload: &[u8]) -> CycleOutcome {
        let fields: Map<String, Value> = match serde_json::from_slice(payload) {
            Ok(fields) => fields,
            Err(e) => {
                warn!("Dropping malformed payload: {}", e);
                return CycleOutcome::Rejected;
            }
        };

        let event = SensorEvent::stamp_now(fields);
        info!("Sensor event received at {}", event.timestamp);

        if let Err(e) = self.store.append(&event) {
            error!("Failed to persist sensor event: {:#}", e);
            return CycleOutcome::StoreFailed;
        }

        // One snapshot feeds both hazards, so a cycle cannot disagree with
        // itself about what the log contained.
        let log = self.store.read_all();
        let (flood, fire) = tokio::join!(
            self.run_hazard(Hazard::Flood, &log),
            self.run_hazard(Hazard::Fire, &log),
        );

        CycleOutcome::Processed { flood, fire }
    }

    async fn run_hazard(&self, hazard: Hazard, log: &[SensorEvent]) -> HazardOutcome {
        let features = extract::extract(log, hazard);
        if features.is_empty() {
            info!("No complete {} readings yet, skipping analysis", hazard);
            return HazardOutcome::Skipped;
        }

        let analyzer = match hazard {
            Hazard::Flood => &self.flood,
            Hazard::Fire => &self.fire,
        };

        match analyzer.run(&features).await {
            Ok(assessment) => {
                let alert = alert::synthesize(hazard, &assessment);
                alert.emit();
                HazardOutcome::Alerted(alert)
            }
            Err(e) => {
                error!("{} analysis failed: {}", hazard, e);
                HazardOutcome::Failed
            }
        }
    }
}
