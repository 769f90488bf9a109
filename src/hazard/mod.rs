// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/guardiao-rs

//! Hazard classes and the risk vocabulary shared across the pipeline

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Natural disaster classes the pipeline monitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hazard {
    Flood,
    Fire,
}

impl Hazard {
    /// Every hazard, in the order the pipelines run.
    pub const ALL: [Hazard; 2] = [Hazard::Flood, Hazard::Fire];

    /// Metrics an event must carry, all numeric, to qualify for this
    /// hazard's feature set.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Hazard::Flood => &["water_level", "rainfall_intensity"],
            Hazard::Fire => &["temperature", "humidity", "smoke_concentration"],
        }
    }

    /// Stable lowercase name used in file names and log output.
    pub fn name(&self) -> &'static str {
        match self {
            Hazard::Flood => "flood",
            Hazard::Fire => "fire",
        }
    }

    /// Portuguese noun used in population-facing alert copy.
    pub fn label_pt(&self) -> &'static str {
        match self {
            Hazard::Flood => "enchente",
            Hazard::Fire => "incêndio",
        }
    }
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordinal risk classification assigned by the external analysis programs.
///
/// The wire form is the Portuguese label; any string the analysis emits
/// outside the known set becomes `Desconhecido` instead of failing the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    Baixo,
    Moderado,
    Alto,
    MuitoAlto,
    Desconhecido,
}

impl RiskLevel {
    /// Label as it appears in analysis output and published assessments.
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Baixo => "Baixo",
            RiskLevel::Moderado => "Moderado",
            RiskLevel::Alto => "Alto",
            RiskLevel::MuitoAlto => "Muito Alto",
            RiskLevel::Desconhecido => "Desconhecido",
        }
    }

    /// Parse an analysis label, mapping anything unrecognized to
    /// `Desconhecido`.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Baixo" => RiskLevel::Baixo,
            "Moderado" => RiskLevel::Moderado,
            "Alto" => RiskLevel::Alto,
            "Muito Alto" => RiskLevel::MuitoAlto,
            _ => RiskLevel::Desconhecido,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for RiskLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(RiskLevel::from_label(&label))
    }
}
