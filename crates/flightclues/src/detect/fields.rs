//! Per-field anomaly detectors.
//!
//! Every detector is a pure function of one field value. Missing values and
//! values of the wrong type produce no findings.

use super::exemptions::LeadingAnomalyTable;
use super::patterns::{AnomalyPattern, PatternSet};
use crate::finding::{DetectorCategory, RawFinding, Rule};
use crate::record::FlightRecord;

/// Expected length of an airport code.
pub const IATA_CODE_LEN: usize = 3;

/// Marker substring of country fields that are known noise.
pub const DEFAULT_BENIGN_MARKER: &str = "LatAm";

/// Configuration for the field detectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Whether country text containing a benign marker is skipped.
    pub benign_markers_enabled: bool,

    /// Substrings that mark country text as noise.
    pub benign_markers: Vec<String>,

    /// Literal country names with a hidden leading character.
    pub leading_anomalies: LeadingAnomalyTable,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            benign_markers_enabled: true,
            benign_markers: vec![DEFAULT_BENIGN_MARKER.to_string()],
            leading_anomalies: LeadingAnomalyTable::builtin(),
        }
    }
}

/// The fixed rule set, applied field by field.
#[derive(Debug)]
pub struct FieldDetector {
    config: DetectorConfig,
    patterns: PatternSet,
}

impl FieldDetector {
    /// Create a detector with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DetectorConfig::default())
    }

    /// Create a detector with a custom configuration.
    #[must_use]
    pub fn with_config(config: DetectorConfig) -> Self {
        Self {
            config,
            patterns: PatternSet::builtin(),
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Check if country text is excluded by a benign marker.
    #[must_use]
    pub fn is_benign(&self, text: &str) -> bool {
        self.config.benign_markers_enabled
            && self
                .config
                .benign_markers
                .iter()
                .any(|marker| text.contains(marker.as_str()))
    }

    /// IATA length and alphabet rules for one airport code.
    ///
    /// Length findings come first, then alphabet findings.
    #[must_use]
    pub fn detect_iata(&self, code: Option<&str>) -> Vec<RawFinding> {
        let Some(code) = code.filter(|c| !c.is_empty()) else {
            return Vec::new();
        };

        let mut findings: Vec<RawFinding> = code
            .chars()
            .skip(IATA_CODE_LEN)
            .map(|c| RawFinding::new(c, Rule::IataLength, code))
            .collect();
        findings.extend(flag(&self.patterns.non_uppercase, code, Rule::IataAlphabet));
        findings
    }

    /// Letters in the textual form of the price.
    #[must_use]
    pub fn detect_price(&self, text: Option<&str>) -> Vec<RawFinding> {
        text.map_or_else(Vec::new, |t| flag(&self.patterns.letter, t, Rule::PriceLetter))
    }

    /// Letters in the textual form of the duration.
    #[must_use]
    pub fn detect_duration(&self, text: Option<&str>) -> Vec<RawFinding> {
        text.map_or_else(Vec::new, |t| {
            flag(&self.patterns.letter, t, Rule::DurationLetter)
        })
    }

    /// Camel-case, digit and leading-anomaly rules for one country name.
    #[must_use]
    pub fn detect_country(&self, text: Option<&str>) -> Vec<RawFinding> {
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            return Vec::new();
        };
        if self.is_benign(text) {
            return Vec::new();
        }

        let mut findings = flag(&self.patterns.camel_case, text, Rule::CountryCamelCase);
        findings.extend(flag(&self.patterns.digit, text, Rule::CountryDigit));
        if let Some(c) = self.config.leading_anomalies.lookup(text) {
            findings.push(RawFinding::new(c, Rule::CountryLeading, text));
        }
        findings
    }

    /// Camel-case and digit rules for the airline name.
    #[must_use]
    pub fn detect_airline(&self, text: Option<&str>) -> Vec<RawFinding> {
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            return Vec::new();
        };

        let mut findings = flag(&self.patterns.camel_case, text, Rule::AirlineCamelCase);
        findings.extend(flag(&self.patterns.digit, text, Rule::AirlineDigit));
        findings
    }

    /// Letters in the concatenated departure date and time.
    #[must_use]
    pub fn detect_schedule(&self, text: &str) -> Vec<RawFinding> {
        flag(&self.patterns.letter, text, Rule::ScheduleLetter)
    }

    /// Run the detectors of one category over a record.
    ///
    /// Two-field categories scan the origin before the destination.
    #[must_use]
    pub fn detect_category(
        &self,
        record: &FlightRecord,
        category: DetectorCategory,
    ) -> Vec<RawFinding> {
        match category {
            DetectorCategory::Iata => {
                let mut findings = self.detect_iata(record.origin_iata());
                findings.extend(self.detect_iata(record.destination_iata()));
                findings
            }
            DetectorCategory::Price => self.detect_price(record.price_text().as_deref()),
            DetectorCategory::Duration => self.detect_duration(record.duration_text().as_deref()),
            DetectorCategory::Country => {
                let mut findings = self.detect_country(record.origin_country());
                findings.extend(self.detect_country(record.destination_country()));
                findings
            }
            DetectorCategory::Airline => self.detect_airline(record.airline()),
            DetectorCategory::Schedule => self.detect_schedule(&record.schedule_text()),
        }
    }

    /// Run every detector over a record, in category precedence order.
    #[must_use]
    pub fn detect_record(&self, record: &FlightRecord) -> Vec<RawFinding> {
        DetectorCategory::PRECEDENCE
            .iter()
            .flat_map(|&category| self.detect_category(record, category))
            .collect()
    }
}

impl Default for FieldDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn flag(pattern: &AnomalyPattern, text: &str, rule: Rule) -> Vec<RawFinding> {
    pattern
        .flagged_chars(text)
        .into_iter()
        .map(|c| RawFinding::new(c, rule, text))
        .collect()
}
