//! External risk analysis invocation
//!
//! The statistical risk models live outside this process as standalone
//! scripts, exchanged with through files: we hand them a feature table, they
//! hand back one assessment object. This module owns that handoff, including
//! the hard timeout that keeps a wedged model from stalling ingestion.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::process::Command;
use tokio::time;
use tracing::debug;

use crate::extract::HazardFeatureSet;
use crate::hazard::RiskLevel;

/// Assessment produced by one analysis run.
///
/// `risk_level` is the only field the pipeline interprets. Predicted metrics
/// (`predicted_water_level`, `predicted_smoke`, ..., numeric or `"N/A"`) and
/// anything else the program chooses to emit ride along untouched for
/// downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    /// When the analysis itself ran, as reported by the program.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_analysis: Option<String>,
    /// Predicted metrics and any extra fields, verbatim.
    #[serde(flatten)]
    pub predictions: Map<String, Value>,
}

/// Why an analysis run produced no assessment.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to write feature file {path:?}: {cause}")]
    Exchange { path: PathBuf, cause: anyhow::Error },
    #[error("could not start analysis program '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("analysis process I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("analysis did not finish within {0:?} and was killed")]
    Timeout(Duration),
    #[error("analysis exited with {status}\nstdout: {stdout}\nstderr: {stderr}")]
    Failed {
        status: std::process::ExitStatus,
        stdout: String,
        stderr: String,
    },
    #[error("analysis exited cleanly but wrote no output at {0:?}")]
    MissingOutput(PathBuf),
    #[error("analysis output at {path:?} is not an assessment: {source}")]
    InvalidOutput {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to publish assessment to {path:?}: {source}")]
    Publish {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Seam between the pipeline and the risk models.
///
/// The controller only ever sees this trait, so tests swap in canned
/// analyzers without touching a real interpreter.
#[async_trait]
pub trait RiskAnalyzer: Send + Sync {
    /// Run one analysis over `features`, returning the assessment or the
    /// reason there is none.
    async fn run(&self, features: &HazardFeatureSet) -> Result<RiskAssessment, AnalysisError>;
}

/// Production analyzer: one external script per hazard, invoked as
/// `program script input output` with a hard wall-clock timeout.
pub struct ScriptAnalyzer {
    program: String,
    script: PathBuf,
    input_path: PathBuf,
    output_path: PathBuf,
    timeout: Duration,
}

impl ScriptAnalyzer {
    pub fn new(
        program: impl Into<String>,
        script: impl Into<PathBuf>,
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            script: script.into(),
            input_path: input_path.into(),
            output_path: output_path.into(),
            timeout,
        }
    }

    /// Where validated assessments are published.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

#[async_trait]
impl RiskAnalyzer for ScriptAnalyzer {
    async fn run(&self, features: &HazardFeatureSet) -> Result<RiskAssessment, AnalysisError> {
        features
            .write_csv(&self.input_path)
            .map_err(|cause| AnalysisError::Exchange {
                path: self.input_path.clone(),
                cause,
            })?;

        // The program writes to a scratch path; only a validated assessment
        // is renamed onto the published path, so a failed run of any kind
        // leaves the previous assessment in place.
        let scratch = self.output_path.with_extension("json.tmp");
        let _ = std::fs::remove_file(&scratch);

        debug!(
            "Running {} {} ({} feature rows)",
            self.program,
            self.script.display(),
            features.len()
        );

        let child = Command::new(&self.program)
            .arg(&self.script)
            .arg(&self.input_path)
            .arg(&scratch)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AnalysisError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // kill_on_drop tears the child down when the elapsed branch drops
        // the wait future.
        let output = match time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(waited) => waited?,
            Err(_) => return Err(AnalysisError::Timeout(self.timeout)),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            let _ = std::fs::remove_file(&scratch);
            return Err(AnalysisError::Failed {
                status: output.status,
                stdout,
                stderr,
            });
        }
        if !stdout.is_empty() {
            debug!("Analysis stdout: {}", stdout);
        }
        if !stderr.is_empty() {
            debug!("Analysis stderr: {}", stderr);
        }

        let raw = std::fs::read(&scratch)
            .map_err(|_| AnalysisError::MissingOutput(scratch.clone()))?;
        let assessment: RiskAssessment = serde_json::from_slice(&raw).map_err(|source| {
            let _ = std::fs::remove_file(&scratch);
            AnalysisError::InvalidOutput {
                path: scratch.clone(),
                source,
            }
        })?;

        std::fs::rename(&scratch, &self.output_path).map_err(|source| AnalysisError::Publish {
            path: self.output_path.clone(),
            source,
        })?;

        Ok(assessment)
    }
}

/// Read the most recently published assessment, if any.
pub fn latest_assessment(path: &Path) -> Option<RiskAssessment> {
    let bytes = std::fs::read(path).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract;
    use crate::hazard::Hazard;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    const ASSESSMENT_JSON: &str = "{\"risk_level\": \"Alto\", \"predicted_water_level\": 85.5, \"predicted_rainfall\": 70.0, \"timestamp_analysis\": \"2026-08-26 12:00:00\"}";

    fn features() -> HazardFeatureSet {
        let mut fields = serde_json::Map::new();
        fields.insert("water_level".into(), json!(60.0));
        fields.insert("rainfall_intensity".into(), json!(30.0));
        let event = crate::event::SensorEvent::with_timestamp("2026-08-26T11:59:00+00:00", fields);
        extract::extract(&[event], Hazard::Flood)
    }

    fn analyzer(dir: &TempDir, script_body: &str, timeout: Duration) -> ScriptAnalyzer {
        let script = dir.path().join("stub.sh");
        fs::write(&script, script_body).unwrap();
        ScriptAnalyzer::new(
            "sh",
            script,
            dir.path().join("flood_features.csv"),
            dir.path().join("flood_risk_output.json"),
            timeout,
        )
    }

    #[tokio::test]
    async fn test_successful_run_publishes_assessment() {
        let dir = TempDir::new().unwrap();
        let script = format!("#!/bin/sh\nprintf '%s' '{}' > \"$2\"\n", ASSESSMENT_JSON);
        let analyzer = analyzer(&dir, &script, Duration::from_secs(10));

        let assessment = analyzer.run(&features()).await.unwrap();
        assert_eq!(assessment.risk_level, RiskLevel::Alto);
        assert_eq!(assessment.predictions["predicted_water_level"], json!(85.5));
        assert_eq!(
            assessment.timestamp_analysis.as_deref(),
            Some("2026-08-26 12:00:00")
        );

        // Published to the real path, scratch cleaned up.
        let published = latest_assessment(analyzer.output_path()).unwrap();
        assert_eq!(published, assessment);
        assert!(!analyzer.output_path().with_extension("json.tmp").exists());

        // The feature file the script read had the expected shape.
        let csv = fs::read_to_string(dir.path().join("flood_features.csv")).unwrap();
        assert!(csv.starts_with("timestamp,water_level,rainfall_intensity"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_keeps_previous_assessment() {
        let dir = TempDir::new().unwrap();
        // Writes an assessment, then fails anyway.
        let analyzer = analyzer(
            &dir,
            "#!/bin/sh\nprintf '{\"risk_level\": \"Muito Alto\"}' > \"$2\"\necho 'model blew up' >&2\nexit 3\n",
            Duration::from_secs(10),
        );
        fs::write(analyzer.output_path(), ASSESSMENT_JSON).unwrap();

        let err = analyzer.run(&features()).await.unwrap_err();
        match err {
            AnalysisError::Failed { stderr, .. } => assert!(stderr.contains("model blew up")),
            other => panic!("expected Failed, got {:?}", other),
        }

        // The partial output is discarded, the published assessment untouched.
        let kept = latest_assessment(analyzer.output_path()).unwrap();
        assert_eq!(kept.risk_level, RiskLevel::Alto);
        assert!(!analyzer.output_path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_timeout_kills_child_and_keeps_previous_assessment() {
        let dir = TempDir::new().unwrap();
        // Sleeps well past the deadline, then writes its assessment.
        let analyzer = analyzer(
            &dir,
            "#!/bin/sh\nsleep 1\nprintf '{\"risk_level\": \"Alto\"}' > \"$2\"\n",
            Duration::from_millis(200),
        );
        fs::write(analyzer.output_path(), "{\"risk_level\": \"Moderado\"}").unwrap();

        let started = std::time::Instant::now();
        let err = analyzer.run(&features()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Timeout(_)));
        // The runner must come back at the deadline, not at the child's pace.
        assert!(started.elapsed() < Duration::from_secs(5));

        // By now a surviving child would have written the scratch file.
        time::sleep(Duration::from_millis(1500)).await;
        let kept = latest_assessment(analyzer.output_path()).unwrap();
        assert_eq!(kept.risk_level, RiskLevel::Moderado);
        assert!(!analyzer.output_path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_clean_exit_without_output_is_an_error() {
        let dir = TempDir::new().unwrap();
        let analyzer = analyzer(&dir, "#!/bin/sh\nexit 0\n", Duration::from_secs(10));

        let err = analyzer.run(&features()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::MissingOutput(_)));
        assert!(!analyzer.output_path().exists());
    }

    #[tokio::test]
    async fn test_garbage_output_does_not_publish() {
        let dir = TempDir::new().unwrap();
        let analyzer = analyzer(
            &dir,
            "#!/bin/sh\necho 'this is not json' > \"$2\"\n",
            Duration::from_secs(10),
        );

        let err = analyzer.run(&features()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidOutput { .. }));
        assert!(!analyzer.output_path().exists());
        assert!(!analyzer.output_path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_unknown_risk_label_becomes_desconhecido() {
        let dir = TempDir::new().unwrap();
        let analyzer = analyzer(
            &dir,
            "#!/bin/sh\nprintf '{\"risk_level\": \"Extremo\"}' > \"$2\"\n",
            Duration::from_secs(10),
        );

        let assessment = analyzer.run(&features()).await.unwrap();
        assert_eq!(assessment.risk_level, RiskLevel::Desconhecido);
    }

    #[test]
    fn test_assessment_round_trip_preserves_predictions() {
        let assessment: RiskAssessment = serde_json::from_str(ASSESSMENT_JSON).unwrap();
        let encoded = serde_json::to_string(&assessment).unwrap();
        let decoded: RiskAssessment = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, assessment);
        assert_eq!(decoded.predictions["predicted_rainfall"], json!(70.0));
    }

    #[test]
    fn test_missing_risk_level_fails_to_parse() {
        let result: Result<RiskAssessment, _> =
            serde_json::from_str("{\"predicted_water_level\": 10.0}");
        assert!(result.is_err());
    }
}
