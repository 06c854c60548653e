//! Field detectors for formatting anomalies in flight records.
//!
//! The rule set is fixed:
//!
//! - **Airport codes**: characters past the third, and any character outside `A-Z`.
//! - **Price and duration**: any letter in the textual form of the value.
//! - **Country names**: an uppercase letter right after a lowercase one, any
//!   digit, and literal entries of the leading-anomaly table. Text containing a
//!   benign marker (by default `LatAm`) is skipped.
//! - **Airline name**: the camel-case and digit rules, without marker exclusion.
//! - **Departure date and time**: any letter in the two values concatenated.
//!
//! # Example
//!
//! ```
//! use flightclues::detect::FieldDetector;
//!
//! let detector = FieldDetector::new();
//! let findings = detector.detect_iata(Some("MIAX"));
//! assert_eq!(findings.len(), 1);
//! assert_eq!(findings[0].character, 'X');
//! ```

mod exemptions;
mod fields;
mod patterns;

pub use exemptions::{default_leading_anomalies, LeadingAnomalyTable};
pub use fields::{DetectorConfig, FieldDetector, DEFAULT_BENIGN_MARKER, IATA_CODE_LEN};
pub use patterns::{AnomalyPattern, PatternSet};
