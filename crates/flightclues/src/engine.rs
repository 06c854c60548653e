//! The scan engine: detectors, aggregation and token assembly in one pass.

use tracing::info;

use crate::aggregate::{aggregate, Aggregation};
use crate::detect::{DetectorConfig, FieldDetector};
use crate::finding::AnomalyFinding;
use crate::record::RecordSet;
use crate::token::CandidateToken;

/// Structured result of scanning a record set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// Findings in canonical order.
    pub findings: Vec<AnomalyFinding>,
    /// Concatenation of the findings' characters.
    pub token: CandidateToken,
    /// Number of records scanned.
    pub records_scanned: usize,
    /// Number of records sorted at the earliest key.
    pub unscheduled_records: usize,
}

/// Runs the fixed rule set over record sets.
#[derive(Debug, Default)]
pub struct ScanEngine {
    detector: FieldDetector,
}

impl ScanEngine {
    /// Create an engine with the default detector configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom detector configuration.
    #[must_use]
    pub fn with_config(config: DetectorConfig) -> Self {
        Self {
            detector: FieldDetector::with_config(config),
        }
    }

    /// The underlying field detector.
    #[must_use]
    pub fn detector(&self) -> &FieldDetector {
        &self.detector
    }

    /// Scan every record and assemble the candidate token.
    #[must_use]
    pub fn scan(&self, records: &RecordSet) -> Analysis {
        info!("Analyzing {} records", records.len());

        let Aggregation {
            findings,
            unscheduled_records,
        } = aggregate(records, &self.detector);
        let token = CandidateToken::assemble(&findings);

        if token.is_formed() {
            info!(
                findings = findings.len(),
                "Candidate token formed ({} characters)",
                token.char_count()
            );
        } else {
            info!("No anomalies matched the rule set");
        }

        Analysis {
            findings,
            token,
            records_scanned: records.len(),
            unscheduled_records,
        }
    }
}
