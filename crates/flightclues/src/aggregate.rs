//! Finding aggregation and canonical ordering.
//!
//! Findings are ordered by the record's chronological key, then by detector
//! category precedence. The sort is stable, so findings that tie on both keep
//! the order they were emitted in: records in input order, and left-to-right
//! scan order within a detector.

use tracing::{debug, trace};

use crate::detect::FieldDetector;
use crate::finding::AnomalyFinding;
use crate::record::RecordSet;

/// Ordered findings of one pass over a record set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    /// Findings in canonical order.
    pub findings: Vec<AnomalyFinding>,
    /// Records that sorted at the earliest key.
    pub unscheduled_records: usize,
}

/// Run every detector over every record and return the ordered findings.
///
/// Records whose schedule cannot be parsed are kept and sort first.
#[must_use]
pub fn aggregate(records: &RecordSet, detector: &FieldDetector) -> Aggregation {
    let mut findings = Vec::new();
    let mut unscheduled = 0usize;

    for record in records {
        let key = record.chrono_key();
        if key.is_earliest() {
            unscheduled += 1;
        }

        let record_id = record.record_id();
        findings.extend(
            detector
                .detect_record(record)
                .into_iter()
                .map(|raw| AnomalyFinding::new(key, record_id.as_str(), raw)),
        );
    }

    if unscheduled > 0 {
        debug!(
            unscheduled,
            "Records without a parseable schedule sort at the earliest key"
        );
    }

    order_findings(&mut findings);

    debug!(
        records = records.len(),
        findings = findings.len(),
        "Aggregated findings"
    );
    for finding in &findings {
        trace!(
            timestamp = %finding.timestamp_key(),
            character = %finding.character(),
            source = finding.source_label(),
            record = finding.record_id(),
            "Finding"
        );
    }

    Aggregation {
        findings,
        unscheduled_records: unscheduled,
    }
}

/// Impose the canonical order on a sequence of findings.
pub fn order_findings(findings: &mut [AnomalyFinding]) {
    findings.sort_by_key(AnomalyFinding::order_key);
}
