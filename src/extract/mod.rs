//! Per-hazard feature extraction from the event log

use std::path::Path;

use anyhow::{Context, Result};

use crate::event::SensorEvent;
use crate::hazard::Hazard;

/// One qualifying event projected down to a hazard's metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    /// Receipt time copied from the source event.
    pub timestamp: String,
    /// Metric values in `Hazard::required_fields` order.
    pub values: Vec<f64>,
}

/// Ordered, hazard-specific projection of the event log.
#[derive(Debug, Clone)]
pub struct HazardFeatureSet {
    pub hazard: Hazard,
    pub records: Vec<FeatureRecord>,
}

/// Project the log down to events carrying every metric `hazard` requires,
/// preserving arrival order.
///
/// An event missing a required metric, or carrying it non-numerically, is
/// excluded outright. No padding or interpolation: mixed fleets routinely
/// produce events that qualify for one hazard and not the other.
pub fn extract(log: &[SensorEvent], hazard: Hazard) -> HazardFeatureSet {
    let fields = hazard.required_fields();
    let records = log
        .iter()
        .filter(|event| event.has_metrics(fields))
        .map(|event| FeatureRecord {
            timestamp: event.timestamp.clone(),
            values: fields.iter().filter_map(|f| event.metric(f)).collect(),
        })
        .collect();
    HazardFeatureSet { hazard, records }
}

impl HazardFeatureSet {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Write the tabular exchange file the analysis program reads: a
    /// `timestamp,<metric...>` header row followed by one row per record.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("failed to create feature file {}", path.display()))?;

        let mut header = vec!["timestamp".to_string()];
        header.extend(self.hazard.required_fields().iter().map(|f| f.to_string()));
        writer
            .write_record(&header)
            .context("failed to write feature header")?;

        for record in &self.records {
            let mut row = vec![record.timestamp.clone()];
            row.extend(record.values.iter().map(|v| v.to_string()));
            writer
                .write_record(&row)
                .context("failed to write feature row")?;
        }

        writer
            .flush()
            .with_context(|| format!("failed to flush feature file {}", path.display()))?;
        Ok(())
    }
}
