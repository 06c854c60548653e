//! `flightclues` - Recovers a message hidden as formatting anomalies in flight records
//!
//! Field detectors flag characters that do not belong in airport codes,
//! prices, durations, country and airline names, and schedules. Findings are
//! ordered by departure time and detector precedence and concatenated into a
//! candidate token, which can then be verified against a remote endpoint. When
//! verification does not succeed, a route map can be rendered for inspection.
//!
//! # Example
//!
//! ```
//! use flightclues::{RecordSet, ScanEngine};
//! use serde_json::json;
//!
//! let records = RecordSet::from_json(json!([
//!     {"flight_id": 2, "departure_date": "2024-05-02", "departure_time": "09:00:00",
//!      "origin_iata": "BOGK"},
//!     {"flight_id": 1, "departure_date": "2024-05-01", "departure_time": "09:00:00",
//!      "price_usd": "120O"},
//! ]))
//! .unwrap();
//!
//! let analysis = ScanEngine::new().scan(&records);
//! assert_eq!(analysis.token.as_str(), "OK");
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod detect;
pub mod download;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod finding;
pub mod logging;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod token;
pub mod verify;
pub mod visual;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use engine::{Analysis, ScanEngine};
pub use error::{Error, Result};
pub use finding::{AnomalyFinding, DetectorCategory, Rule};
pub use logging::init_logging;
pub use record::{ChronoKey, FlightRecord, RecordSet};
pub use token::CandidateToken;
pub use verify::{HttpGateway, VerificationGateway, VerificationOutcome};
