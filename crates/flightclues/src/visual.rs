//! Route map rendering for manual inspection.
//!
//! Each record's origin and destination codes are resolved against an
//! airport table and drawn as a straight segment on an equirectangular
//! projection. Unresolvable routes are skipped and counted. Nothing here
//! feeds back into the token.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::fetch::ensure_parent_dir;
use crate::record::RecordSet;

/// Airport locations bundled with the binary.
const BUILTIN_AIRPORTS: &str = include_str!("../data/airports.json");

const MAP_WIDTH: f64 = 1200.0;
const MAP_HEIGHT: f64 = 600.0;
const BACKGROUND: &str = "#0f0f0f";
const ROUTE_COLOR: &str = "#00ff00";
const ROUTE_OPACITY: f64 = 0.15;

/// One known airport location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    /// Three-letter airport code.
    pub iata: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

/// Airport locations keyed by code. Lookups are exact.
#[derive(Debug, Clone, Default)]
pub struct AirportTable {
    airports: BTreeMap<String, Airport>,
}

impl AirportTable {
    /// The bundled table of major hubs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the bundled data is malformed.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_AIRPORTS)
    }

    /// Parse a JSON array of airport objects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the text is not an array of airports.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let airports: Vec<Airport> = serde_json::from_str(json)?;
        let mut table = Self::default();
        for airport in airports {
            table.insert(airport);
        }
        Ok(table)
    }

    /// Load an airport file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputMissing`] if the file does not exist, or an
    /// I/O or JSON error if it cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::InputMissing {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path)?;
        let table = Self::from_json_str(&raw)?;
        debug!(airports = table.len(), "Loaded airports from {}", path.display());
        Ok(table)
    }

    /// Add or replace one airport.
    pub fn insert(&mut self, airport: Airport) {
        self.airports.insert(airport.iata.clone(), airport);
    }

    /// Merge another table into this one; its entries win.
    pub fn extend(&mut self, other: AirportTable) {
        self.airports.extend(other.airports);
    }

    /// Find an airport by exact code.
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<&Airport> {
        self.airports.get(code)
    }

    /// Number of known airports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.airports.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }
}

/// A resolved origin to destination line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSegment {
    /// Origin code.
    pub origin: String,
    /// Destination code.
    pub destination: String,
    /// Origin `(lon, lat)`.
    pub from: (f64, f64),
    /// Destination `(lon, lat)`.
    pub to: (f64, f64),
}

/// Routes plotted from one record set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteMap {
    /// Resolved segments, in record order.
    pub segments: Vec<RouteSegment>,
    /// Records whose route could not be resolved.
    pub skipped_routes: usize,
    /// Codes that were present but not in the airport table.
    pub unresolved_codes: BTreeSet<String>,
    /// Records considered.
    pub total_records: usize,
}

/// Resolve every record's route against the airport table.
#[must_use]
pub fn plot_routes(records: &RecordSet, airports: &AirportTable) -> RouteMap {
    let mut map = RouteMap {
        total_records: records.len(),
        ..RouteMap::default()
    };

    for record in records {
        let origin = resolve(record.origin_iata(), airports, &mut map.unresolved_codes);
        let destination = resolve(record.destination_iata(), airports, &mut map.unresolved_codes);
        match (origin, destination) {
            (Some(from), Some(to)) => map.segments.push(RouteSegment {
                origin: from.iata.clone(),
                destination: to.iata.clone(),
                from: (from.lon, from.lat),
                to: (to.lon, to.lat),
            }),
            _ => map.skipped_routes += 1,
        }
    }

    info!(
        plotted = map.segments.len(),
        skipped = map.skipped_routes,
        "Plotted routes"
    );
    map
}

fn resolve<'a>(
    code: Option<&str>,
    airports: &'a AirportTable,
    unresolved: &mut BTreeSet<String>,
) -> Option<&'a Airport> {
    let code = code?;
    let airport = airports.lookup(code);
    if airport.is_none() {
        unresolved.insert(code.to_string());
    }
    airport
}

/// Equirectangular projection onto the map canvas.
fn project(lon: f64, lat: f64) -> (f64, f64) {
    let x = (lon + 180.0) / 360.0 * MAP_WIDTH;
    let y = (90.0 - lat) / 180.0 * MAP_HEIGHT;
    (x, y)
}

impl RouteMap {
    /// Render the map as an SVG document.
    #[must_use]
    pub fn render_svg(&self) -> String {
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{MAP_WIDTH}" height="{MAP_HEIGHT}" viewBox="0 0 {MAP_WIDTH} {MAP_HEIGHT}">"#
        );
        let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="{BACKGROUND}"/>"#);
        let _ = writeln!(
            svg,
            r#"  <text x="{}" y="30" fill="{ROUTE_COLOR}" font-family="monospace" font-size="18" text-anchor="middle">Flight trail ({} flights)</text>"#,
            MAP_WIDTH / 2.0,
            self.total_records
        );

        let _ = writeln!(
            svg,
            r#"  <g stroke="{ROUTE_COLOR}" stroke-opacity="{ROUTE_OPACITY}" stroke-width="0.8" fill="none">"#
        );
        for segment in &self.segments {
            let (x1, y1) = project(segment.from.0, segment.from.1);
            let (x2, y2) = project(segment.to.0, segment.to.1);
            let _ = writeln!(
                svg,
                r#"    <line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}"/>"#
            );
        }
        svg.push_str("  </g>\n</svg>\n");
        svg
    }

    /// Write the SVG to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectoryCreate`] or [`Error::Io`] on write failure.
    pub fn write_svg(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;
        std::fs::write(path, self.render_svg())?;
        info!("Route map written to {}", path.display());
        Ok(())
    }
}
