//! Findings: single anomalous characters and where they came from.

use std::fmt;

use serde::Serialize;

use crate::record::ChronoKey;

/// Field category a detector monitors.
///
/// The variant order is the tie-break order for findings that share a
/// chronological key. See [`DetectorCategory::PRECEDENCE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorCategory {
    /// Origin and destination airport codes.
    Iata,
    /// Ticket price.
    Price,
    /// Flight duration.
    Duration,
    /// Origin and destination country names.
    Country,
    /// Airline name.
    Airline,
    /// Departure date and time.
    Schedule,
}

impl DetectorCategory {
    /// Categories in the order detectors fire for a single record.
    pub const PRECEDENCE: [Self; 6] = [
        Self::Iata,
        Self::Price,
        Self::Duration,
        Self::Country,
        Self::Airline,
        Self::Schedule,
    ];

    /// Rank of this category; lower ranks sort first.
    #[must_use]
    pub fn priority(self) -> u8 {
        match self {
            Self::Iata => 0,
            Self::Price => 1,
            Self::Duration => 2,
            Self::Country => 3,
            Self::Airline => 4,
            Self::Schedule => 5,
        }
    }
}

impl fmt::Display for DetectorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iata => write!(f, "iata"),
            Self::Price => write!(f, "price"),
            Self::Duration => write!(f, "duration"),
            Self::Country => write!(f, "country"),
            Self::Airline => write!(f, "airline"),
            Self::Schedule => write!(f, "schedule"),
        }
    }
}

/// The rule that produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Characters past the third in an airport code.
    IataLength,
    /// Characters outside `A-Z` in an airport code.
    IataAlphabet,
    /// Letters in the price.
    PriceLetter,
    /// Letters in the duration.
    DurationLetter,
    /// Uppercase letter right after a lowercase one in a country name.
    CountryCamelCase,
    /// Digit in a country name.
    CountryDigit,
    /// Country name listed in the leading-anomaly table.
    CountryLeading,
    /// Uppercase letter right after a lowercase one in an airline name.
    AirlineCamelCase,
    /// Digit in an airline name.
    AirlineDigit,
    /// Letter in the departure date or time.
    ScheduleLetter,
}

impl Rule {
    /// The field category this rule belongs to.
    #[must_use]
    pub fn category(self) -> DetectorCategory {
        match self {
            Self::IataLength | Self::IataAlphabet => DetectorCategory::Iata,
            Self::PriceLetter => DetectorCategory::Price,
            Self::DurationLetter => DetectorCategory::Duration,
            Self::CountryCamelCase | Self::CountryDigit | Self::CountryLeading => {
                DetectorCategory::Country
            }
            Self::AirlineCamelCase | Self::AirlineDigit => DetectorCategory::Airline,
            Self::ScheduleLetter => DetectorCategory::Schedule,
        }
    }

    /// Human-readable rule description used in source labels.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::IataLength => "IATA length > 3",
            Self::IataAlphabet => "IATA format",
            Self::PriceLetter => "Hidden in price",
            Self::DurationLetter => "Hidden in duration",
            Self::CountryCamelCase => "Country typo",
            Self::CountryDigit => "Number in country",
            Self::CountryLeading => "Initial typo",
            Self::AirlineCamelCase => "Airline typo",
            Self::AirlineDigit => "Number in airline",
            Self::ScheduleLetter => "Hidden in date",
        }
    }

    /// Source label for a finding of this rule on the given raw value.
    #[must_use]
    pub fn label(self, raw_value: &str) -> String {
        format!("{} ({raw_value})", self.description())
    }
}

/// A character flagged by a detector, before it is tied to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFinding {
    /// The extracted character.
    pub character: char,
    /// The rule that flagged it.
    pub rule: Rule,
    /// The full field value the character was found in.
    pub raw_value: String,
}

impl RawFinding {
    /// Create a raw finding.
    #[must_use]
    pub fn new(character: char, rule: Rule, raw_value: impl Into<String>) -> Self {
        Self {
            character,
            rule,
            raw_value: raw_value.into(),
        }
    }
}

/// One anomalous character with its provenance.
///
/// Findings are read-only once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnomalyFinding {
    timestamp_key: ChronoKey,
    character: char,
    rule: Rule,
    source_label: String,
    record_id: String,
}

impl AnomalyFinding {
    /// Attach a raw finding to the record it came from.
    #[must_use]
    pub fn new(timestamp_key: ChronoKey, record_id: impl Into<String>, raw: RawFinding) -> Self {
        Self {
            timestamp_key,
            character: raw.character,
            rule: raw.rule,
            source_label: raw.rule.label(&raw.raw_value),
            record_id: record_id.into(),
        }
    }

    /// Chronological key of the originating record.
    #[must_use]
    pub fn timestamp_key(&self) -> ChronoKey {
        self.timestamp_key
    }

    /// The extracted character.
    #[must_use]
    pub fn character(&self) -> char {
        self.character
    }

    /// The rule that produced this finding.
    #[must_use]
    pub fn rule(&self) -> Rule {
        self.rule
    }

    /// Rule description plus the offending raw value.
    #[must_use]
    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    /// Identifier of the originating record.
    #[must_use]
    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    /// Sort key: chronological key, then category precedence.
    #[must_use]
    pub fn order_key(&self) -> (ChronoKey, u8) {
        (self.timestamp_key, self.rule.category().priority())
    }
}
