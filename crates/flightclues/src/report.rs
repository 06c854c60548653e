//! Report rendering for scan results.
//!
//! The plain report lists every finding in canonical order followed by the
//! candidate token, or an explicit notice when no token was formed. The JSON
//! report carries the same content for scripting.

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use crate::download::{DownloadResult, DownloadStatus};
use crate::finding::{AnomalyFinding, DetectorCategory};
use crate::pipeline::RunReport;
use crate::verify::VerificationOutcome;
use crate::visual::RouteMap;

/// Segment length used when suggesting hyphenated token variations.
const HINT_SEGMENT_LEN: usize = 4;

/// One finding as it appears in the JSON report.
#[derive(Debug, Serialize)]
struct FindingRow<'a> {
    timestamp: String,
    character: char,
    category: DetectorCategory,
    source: &'a str,
    record_id: &'a str,
}

impl<'a> From<&'a AnomalyFinding> for FindingRow<'a> {
    fn from(finding: &'a AnomalyFinding) -> Self {
        Self {
            timestamp: finding.timestamp_key().to_string(),
            character: finding.character(),
            category: finding.rule().category(),
            source: finding.source_label(),
            record_id: finding.record_id(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RouteMapSummary<'a> {
    plotted: usize,
    skipped: usize,
    unresolved_codes: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    records_scanned: usize,
    skipped_entries: usize,
    unscheduled_records: usize,
    findings: Vec<FindingRow<'a>>,
    token: Option<&'a str>,
    verification_enabled: bool,
    verification: Option<&'a VerificationOutcome>,
    route_map: Option<RouteMapSummary<'a>>,
}

/// Render the run as JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(report: &RunReport) -> serde_json::Result<String> {
    let analysis = &report.analysis;
    let document = ReportDocument {
        records_scanned: analysis.records_scanned,
        skipped_entries: report.skipped_entries,
        unscheduled_records: analysis.unscheduled_records,
        findings: analysis.findings.iter().map(FindingRow::from).collect(),
        token: analysis.token.formed(),
        verification_enabled: report.verification_enabled,
        verification: report.verification.as_ref(),
        route_map: report.route_map.as_ref().map(|map| RouteMapSummary {
            plotted: map.segments.len(),
            skipped: map.skipped_routes,
            unresolved_codes: map.unresolved_codes.iter().map(String::as_str).collect(),
        }),
    };
    serde_json::to_string_pretty(&document)
}

/// Render the run as a human-readable report.
#[must_use]
pub fn render_plain(report: &RunReport) -> String {
    let analysis = &report.analysis;
    let mut out = String::new();

    let _ = writeln!(out, "Scanned {} records", analysis.records_scanned);
    if report.skipped_entries > 0 {
        let _ = writeln!(out, "Skipped {} non-object entries", report.skipped_entries);
    }
    if analysis.unscheduled_records > 0 {
        let _ = writeln!(
            out,
            "{} records have no parseable schedule and sort first",
            analysis.unscheduled_records
        );
    }
    out.push('\n');

    match analysis.token.formed() {
        Some(token) => {
            out.push_str(&render_findings(&analysis.findings));
            let _ = writeln!(out, "\nCandidate token: {token}");
        }
        None => out.push_str("No token formed: no anomalies matched the rule set.\n"),
    }

    if analysis.token.is_formed() {
        out.push('\n');
        match &report.verification {
            Some(outcome) => out.push_str(&render_verification(outcome, analysis.token.as_str())),
            None if !report.verification_enabled => out.push_str("Verification: disabled\n"),
            None => {}
        }
    }

    if let Some(map) = &report.route_map {
        out.push('\n');
        out.push_str(&render_route_map(map));
    }

    out
}

/// The findings table.
#[must_use]
pub fn render_findings(findings: &[AnomalyFinding]) -> String {
    let rows: Vec<(String, &AnomalyFinding)> = findings
        .iter()
        .map(|f| (f.timestamp_key().to_string(), f))
        .collect();
    let time_width = rows
        .iter()
        .map(|(ts, _)| ts.chars().count())
        .chain(std::iter::once("TIMESTAMP".len()))
        .max()
        .unwrap_or_default();
    let source_width = findings
        .iter()
        .map(|f| f.source_label().chars().count())
        .chain(std::iter::once("SOURCE".len()))
        .max()
        .unwrap_or_default();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<time_width$} | CHAR | {:<source_width$} | RECORD",
        "TIMESTAMP", "SOURCE"
    );
    let _ = writeln!(
        out,
        "{}-+------+-{}-+-------",
        "-".repeat(time_width),
        "-".repeat(source_width)
    );
    for (timestamp, finding) in rows {
        let _ = writeln!(
            out,
            "{timestamp:<time_width$} | {:<4} | {:<source_width$} | {}",
            finding.character(),
            finding.source_label(),
            finding.record_id()
        );
    }
    out
}

/// The verification section, with hints when the token was rejected.
#[must_use]
pub fn render_verification(outcome: &VerificationOutcome, token: &str) -> String {
    let mut out = String::new();
    match outcome {
        VerificationOutcome::Granted {
            url,
            status,
            body_preview,
        } => {
            let _ = writeln!(out, "Verification: ACCESS GRANTED ({status}) at {url}");
            if !body_preview.is_empty() {
                let _ = writeln!(out, "Response preview:\n{body_preview}");
            }
        }
        VerificationOutcome::Rejected { url, status } => {
            let _ = writeln!(out, "Verification: rejected ({status}) at {url}");
            out.push_str("Hints:\n");
            let _ = writeln!(out, "  - the token was sent as the last path segment of {url}");
            let _ = writeln!(
                out,
                "  - try variations such as hyphen-separated segments: {}",
                hyphenated(token)
            );
        }
        VerificationOutcome::Unreachable { url, reason } => {
            let _ = writeln!(out, "Verification: unreachable at {url}: {reason}");
        }
    }
    out
}

/// The route map summary.
#[must_use]
pub fn render_route_map(map: &RouteMap) -> String {
    let mut out = format!(
        "Route map: {} of {} routes plotted, {} skipped\n",
        map.segments.len(),
        map.total_records,
        map.skipped_routes
    );
    if !map.unresolved_codes.is_empty() {
        let codes: Vec<&str> = map.unresolved_codes.iter().map(String::as_str).collect();
        let _ = writeln!(out, "Unresolved airport codes: {}", codes.join(", "));
    }
    out
}

/// One line per requested document and a saved count.
#[must_use]
pub fn render_downloads(results: &[DownloadResult], output_dir: &Path) -> String {
    let mut out = String::new();
    for result in results {
        let target = result.url.as_deref().unwrap_or(&result.file);
        match &result.status {
            DownloadStatus::Saved { path, bytes } => {
                let _ = writeln!(out, "saved   {} ({bytes} bytes)", path.display());
            }
            DownloadStatus::Status { status } => {
                let _ = writeln!(out, "refused {target} ({status})");
            }
            DownloadStatus::Failed { reason } => {
                let _ = writeln!(out, "failed  {target}: {reason}");
            }
        }
    }
    let saved = results.iter().filter(|r| r.is_saved()).count();
    let _ = writeln!(
        out,
        "Downloaded {saved} of {} documents into {}",
        results.len(),
        output_dir.display()
    );
    out
}

fn hyphenated(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    chars
        .chunks(HINT_SEGMENT_LEN)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}
