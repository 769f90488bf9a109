//! Alert synthesis from risk assessments

use serde::Serialize;
use tracing::{error, info, warn};

use crate::analysis::RiskAssessment;
use crate::hazard::{Hazard, RiskLevel};

/// Alert severity tiers, in increasing order of urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl From<RiskLevel> for Severity {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::MuitoAlto => Severity::Critical,
            RiskLevel::Alto => Severity::High,
            RiskLevel::Moderado => Severity::Medium,
            // An unknown classification must not trigger evacuation copy.
            RiskLevel::Baixo | RiskLevel::Desconhecido => Severity::Low,
        }
    }
}

/// Population-facing alert derived from one assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub hazard: Hazard,
    pub risk_level: RiskLevel,
    pub severity: Severity,
    pub message: &'static str,
}

/// Map an assessment to its alert through the fixed per-hazard decision
/// table.
///
/// Deterministic and fully offline: the guidance text is canned copy chosen
/// by (hazard, severity) alone, never composed from sensor values.
pub fn synthesize(hazard: Hazard, assessment: &RiskAssessment) -> Alert {
    let severity = Severity::from(assessment.risk_level);
    Alert {
        hazard,
        risk_level: assessment.risk_level,
        severity,
        message: message_for(hazard, severity),
    }
}

fn message_for(hazard: Hazard, severity: Severity) -> &'static str {
    match (hazard, severity) {
        (Hazard::Flood, Severity::Critical) => {
            "🚨 ALERTA MÁXIMO! Risco de enchente iminente. Busque abrigo seguro imediatamente e siga as instruções das autoridades."
        }
        (Hazard::Flood, Severity::High) => {
            "🟠 ALERTA: Risco ALTO de enchente. Prepare-se para evacuação e monitore a situação de perto."
        }
        (Hazard::Flood, Severity::Medium) => {
            "🟡 ATENÇÃO: Risco MODERADO de enchente. Monitore o nível da água e as condições climáticas."
        }
        (Hazard::Flood, Severity::Low) => {
            "🟢 Risco de enchente baixo. Situação sob controle."
        }
        (Hazard::Fire, Severity::Critical) => {
            "🚨 ALERTA MÁXIMO! Risco de incêndio iminente. Evacue a área imediatamente e chame os bombeiros."
        }
        (Hazard::Fire, Severity::High) => {
            "🟠 ALERTA: Risco ALTO de incêndio. Fique atento a sinais de fumaça e prepare-se para evacuar."
        }
        (Hazard::Fire, Severity::Medium) => {
            "🟡 ATENÇÃO: Risco MODERADO de incêndio. Evite atividades com fogo e monitore a umidade do ar."
        }
        (Hazard::Fire, Severity::Low) => {
            "🟢 Risco de incêndio baixo. Situação sob controle."
        }
    }
}

impl Alert {
    /// Surface the alert on the log, at a level matching its severity.
    pub fn emit(&self) {
        match self.severity {
            Severity::Critical => error!("[{}] {} -> {}", self.hazard, self.risk_level, self.message),
            Severity::High => warn!("[{}] {} -> {}", self.hazard, self.risk_level, self.message),
            Severity::Medium | Severity::Low => {
                info!("[{}] {} -> {}", self.hazard, self.risk_level, self.message)
            }
        }
    }
}
