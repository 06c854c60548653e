//! Flight records and the record store loader.
//!
//! Every attribute of a record comes from an untrusted external feed, so each
//! one is kept as a raw JSON value and only interpreted on access. Accessors
//! return `None` for anything that is missing or has the wrong shape; they
//! never fail.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Format of `departure_date` and `departure_time` joined by a single space.
pub const SCHEDULE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Identifier shown for records without a usable `flight_id`.
pub const UNKNOWN_RECORD_ID: &str = "N/A";

/// One flight record as delivered by the listing feed.
///
/// Fields are private: a record is immutable once loaded and detectors only
/// see it through the read-only accessors below.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FlightRecord {
    #[serde(default)]
    flight_id: Option<Value>,
    #[serde(default)]
    departure_date: Option<Value>,
    #[serde(default)]
    departure_time: Option<Value>,
    #[serde(default)]
    origin_iata: Option<Value>,
    #[serde(default)]
    destination_iata: Option<Value>,
    #[serde(default)]
    price_usd: Option<Value>,
    #[serde(default)]
    duration_hours: Option<Value>,
    #[serde(default)]
    origin_country: Option<Value>,
    #[serde(default)]
    destination_country: Option<Value>,
    #[serde(default)]
    airline: Option<Value>,
}

impl FlightRecord {
    /// Build a record from a JSON value.
    ///
    /// Returns `None` unless the value is a JSON object. Unknown keys are
    /// ignored and known keys of any type are accepted.
    #[must_use]
    pub fn from_json(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// Identifier used for traceability in reports.
    #[must_use]
    pub fn record_id(&self) -> String {
        field_text(self.flight_id.as_ref())
            .map_or_else(|| UNKNOWN_RECORD_ID.to_string(), Cow::into_owned)
    }

    /// Origin airport code, when it is a string.
    #[must_use]
    pub fn origin_iata(&self) -> Option<&str> {
        field_str(self.origin_iata.as_ref())
    }

    /// Destination airport code, when it is a string.
    #[must_use]
    pub fn destination_iata(&self) -> Option<&str> {
        field_str(self.destination_iata.as_ref())
    }

    /// Textual form of the price, for strings and numbers.
    #[must_use]
    pub fn price_text(&self) -> Option<Cow<'_, str>> {
        field_text(self.price_usd.as_ref())
    }

    /// Textual form of the duration, for strings and numbers.
    #[must_use]
    pub fn duration_text(&self) -> Option<Cow<'_, str>> {
        field_text(self.duration_hours.as_ref())
    }

    /// Origin country name, when it is a string.
    #[must_use]
    pub fn origin_country(&self) -> Option<&str> {
        field_str(self.origin_country.as_ref())
    }

    /// Destination country name, when it is a string.
    #[must_use]
    pub fn destination_country(&self) -> Option<&str> {
        field_str(self.destination_country.as_ref())
    }

    /// Airline name, when it is a string.
    #[must_use]
    pub fn airline(&self) -> Option<&str> {
        field_str(self.airline.as_ref())
    }

    /// Raw departure date as text.
    #[must_use]
    pub fn departure_date_text(&self) -> Option<Cow<'_, str>> {
        field_text(self.departure_date.as_ref())
    }

    /// Raw departure time as text.
    #[must_use]
    pub fn departure_time_text(&self) -> Option<Cow<'_, str>> {
        field_text(self.departure_time.as_ref())
    }

    /// Departure date and time concatenated with no separator.
    ///
    /// Missing parts contribute nothing.
    #[must_use]
    pub fn schedule_text(&self) -> String {
        let mut text = String::new();
        if let Some(date) = self.departure_date_text() {
            text.push_str(&date);
        }
        if let Some(time) = self.departure_time_text() {
            text.push_str(&time);
        }
        text
    }

    /// Chronological key of this record.
    ///
    /// Falls back to [`ChronoKey::EARLIEST`] when either part is missing or
    /// does not match [`SCHEDULE_FORMAT`].
    #[must_use]
    pub fn chrono_key(&self) -> ChronoKey {
        match (self.departure_date_text(), self.departure_time_text()) {
            (Some(date), Some(time)) => {
                ChronoKey::parse(&date, &time).unwrap_or(ChronoKey::EARLIEST)
            }
            _ => ChronoKey::EARLIEST,
        }
    }
}

/// String-only view of a field.
fn field_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str)
}

/// Text coercion of a field: strings as-is, numbers in their JSON form.
fn field_text(value: Option<&Value>) -> Option<Cow<'_, str>> {
    match value? {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        _ => None,
    }
}

/// Sortable departure timestamp of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChronoKey(NaiveDateTime);

impl ChronoKey {
    /// Sentinel for records whose schedule cannot be parsed; sorts first.
    pub const EARLIEST: Self = Self(NaiveDateTime::MIN);

    /// Parse a key from separate date and time strings.
    #[must_use]
    pub fn parse(date: &str, time: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), SCHEDULE_FORMAT)
            .ok()
            .map(Self)
    }

    /// Whether this is the unparseable-schedule sentinel.
    #[must_use]
    pub fn is_earliest(self) -> bool {
        self == Self::EARLIEST
    }

    /// The timestamp, or `None` for the sentinel.
    #[must_use]
    pub fn timestamp(self) -> Option<NaiveDateTime> {
        if self.is_earliest() {
            None
        } else {
            Some(self.0)
        }
    }
}

impl fmt::Display for ChronoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.timestamp() {
            Some(ts) => write!(f, "{}", ts.format(SCHEDULE_FORMAT)),
            None => write!(f, "unscheduled"),
        }
    }
}

/// The full collection of records analyzed in one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<FlightRecord>,
    skipped_entries: usize,
}

impl RecordSet {
    /// Build a record set from already-parsed records.
    #[must_use]
    pub fn new(records: Vec<FlightRecord>) -> Self {
        Self {
            records,
            skipped_entries: 0,
        }
    }

    /// Load a record set from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputMissing`] if the file does not exist,
    /// [`Error::InputRead`] if it cannot be read, and [`Error::InputFormat`]
    /// if its top level is not a JSON array.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::InputMissing {
                path: path.to_path_buf(),
            });
        }

        debug!("Loading records from {}", path.display());
        let raw = std::fs::read_to_string(path).map_err(|source| Error::InputRead {
            path: path.to_path_buf(),
            source,
        })?;

        let value: Value =
            serde_json::from_str(&raw).map_err(|e| Error::input_format(path, e.to_string()))?;

        let set = Self::from_json(value)
            .ok_or_else(|| Error::input_format(path, "expected a JSON array of flight records"))?;

        debug!(
            records = set.len(),
            skipped = set.skipped_entries,
            "Record store loaded"
        );
        Ok(set)
    }

    /// Build a record set from a JSON array.
    ///
    /// Array entries that are not objects are skipped and counted. Returns
    /// `None` if the value is not an array.
    #[must_use]
    pub fn from_json(value: Value) -> Option<Self> {
        let Value::Array(entries) = value else {
            return None;
        };

        let mut records = Vec::with_capacity(entries.len());
        let mut skipped_entries = 0;
        for (index, entry) in entries.into_iter().enumerate() {
            match FlightRecord::from_json(entry) {
                Some(record) => records.push(record),
                None => {
                    warn!(index, "Skipping record store entry that is not an object");
                    skipped_entries += 1;
                }
            }
        }

        Some(Self {
            records,
            skipped_entries,
        })
    }

    /// The records, in input order.
    #[must_use]
    pub fn records(&self) -> &[FlightRecord] {
        &self.records
    }

    /// Iterate over the records in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, FlightRecord> {
        self.records.iter()
    }

    /// Number of usable records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of input entries dropped because they were not objects.
    #[must_use]
    pub fn skipped_entries(&self) -> usize {
        self.skipped_entries
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a FlightRecord;
    type IntoIter = std::slice::Iter<'a, FlightRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Resolve the record store path, preferring an explicit override.
#[must_use]
pub fn resolve_store_path(explicit: Option<PathBuf>, configured: &Path) -> PathBuf {
    explicit.unwrap_or_else(|| configured.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> FlightRecord {
        FlightRecord::from_json(value).unwrap()
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(FlightRecord::from_json(json!(null)).is_none());
        assert!(FlightRecord::from_json(json!([1, 2])).is_none());
        assert!(FlightRecord::from_json(json!("MIA")).is_none());
    }

    #[test]
    fn test_from_json_ignores_unknown_keys() {
        let r = record(json!({"origin_iata": "MIA", "gate": "B12"}));
        assert_eq!(r.origin_iata(), Some("MIA"));
    }

    #[test]
    fn test_string_accessors_ignore_other_types() {
        let r = record(json!({
            "origin_iata": 123,
            "destination_iata": null,
            "origin_country": ["Peru"],
            "airline": true
        }));
        assert_eq!(r.origin_iata(), None);
        assert_eq!(r.destination_iata(), None);
        assert_eq!(r.origin_country(), None);
        assert_eq!(r.airline(), None);
    }

    #[test]
    fn test_price_text_coerces_numbers() {
        let r = record(json!({"price_usd": 450, "duration_hours": 2.5}));
        assert_eq!(r.price_text().as_deref(), Some("450"));
        assert_eq!(r.duration_text().as_deref(), Some("2.5"));

        let r = record(json!({"price_usd": "450usd"}));
        assert_eq!(r.price_text().as_deref(), Some("450usd"));

        let r = record(json!({"price_usd": null}));
        assert_eq!(r.price_text(), None);
    }

    #[test]
    fn test_record_id() {
        assert_eq!(record(json!({"flight_id": 42})).record_id(), "42");
        assert_eq!(record(json!({"flight_id": "AV-7"})).record_id(), "AV-7");
        assert_eq!(record(json!({})).record_id(), UNKNOWN_RECORD_ID);
    }

    #[test]
    fn test_schedule_text_concatenates() {
        let r = record(json!({"departure_date": "2024-03-01", "departure_time": "10:15:00"}));
        assert_eq!(r.schedule_text(), "2024-03-0110:15:00");

        let r = record(json!({"departure_time": "10:15:00"}));
        assert_eq!(r.schedule_text(), "10:15:00");
    }

    #[test]
    fn test_chrono_key_parses() {
        let r = record(json!({"departure_date": "2024-03-01", "departure_time": "10:15:00"}));
        let key = r.chrono_key();
        assert!(!key.is_earliest());
        assert_eq!(key.to_string(), "2024-03-01 10:15:00");
    }

    #[test]
    fn test_chrono_key_falls_back_to_earliest() {
        let missing = record(json!({"departure_date": "2024-03-01"}));
        assert!(missing.chrono_key().is_earliest());

        let garbled = record(json!({"departure_date": "2024-03-0X", "departure_time": "10:15:00"}));
        assert!(garbled.chrono_key().is_earliest());

        let numeric = record(json!({"departure_date": 20_240_301, "departure_time": 1015}));
        assert!(numeric.chrono_key().is_earliest());
    }

    #[test]
    fn test_earliest_sorts_first() {
        let key = ChronoKey::parse("1900-01-01", "00:00:00").unwrap();
        assert!(ChronoKey::EARLIEST < key);
        assert_eq!(ChronoKey::EARLIEST.to_string(), "unscheduled");
        assert!(ChronoKey::EARLIEST.timestamp().is_none());
    }

    #[test]
    fn test_record_set_from_json_skips_non_objects() {
        let set = RecordSet::from_json(json!([{"flight_id": 1}, 7, null, {"flight_id": 2}]))
            .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.skipped_entries(), 2);
        assert_eq!(set.records()[1].record_id(), "2");
    }

    #[test]
    fn test_record_set_from_json_requires_array() {
        assert!(RecordSet::from_json(json!({"items": []})).is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let err = RecordSet::load("/nonexistent/flights_db.json").unwrap_err();
        assert!(err.is_input_missing());
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flights.json");
        std::fs::write(&path, r#"{"items": []}"#).unwrap();

        let err = RecordSet::load(&path).unwrap_err();
        assert!(matches!(err, Error::InputFormat { .. }));
    }

    #[test]
    fn test_load_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flights.json");
        std::fs::write(&path, r#"[{"flight_id": 1, "origin_iata": "LIM"}]"#).unwrap();

        let set = RecordSet::load(&path).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.records()[0].origin_iata(), Some("LIM"));
    }

    #[test]
    fn test_load_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flights.json");
        std::fs::write(&path, "[]").unwrap();

        let set = RecordSet::load(&path).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_resolve_store_path() {
        let configured = Path::new("flights_db.json");
        assert_eq!(resolve_store_path(None, configured), configured);
        assert_eq!(
            resolve_store_path(Some(PathBuf::from("/tmp/other.json")), configured),
            PathBuf::from("/tmp/other.json")
        );
    }
}
