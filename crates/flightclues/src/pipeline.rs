//! One full run: scan, verify once, and plot routes when verification did not succeed.

use tracing::{debug, info};

use crate::engine::{Analysis, ScanEngine};
use crate::record::RecordSet;
use crate::verify::{VerificationGateway, VerificationOutcome};
use crate::visual::{plot_routes, AirportTable, RouteMap};

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Findings and token.
    pub analysis: Analysis,
    /// Number of store entries that were not objects.
    pub skipped_entries: usize,
    /// Whether a gateway was available for this run.
    pub verification_enabled: bool,
    /// Verification outcome, if a request was made.
    pub verification: Option<VerificationOutcome>,
    /// Route map, if visual corroboration ran.
    pub route_map: Option<RouteMap>,
}

impl RunReport {
    /// Whether verification granted access.
    #[must_use]
    pub fn granted(&self) -> bool {
        self.verification
            .as_ref()
            .is_some_and(VerificationOutcome::is_granted)
    }
}

/// Run the engine, then the collaborators.
///
/// `gateway` is `None` when verification is disabled and `airports` is
/// `None` when visual corroboration is off. The gateway is called at most
/// once and never with an empty token. The route map is plotted only for a
/// formed token whose verification was disabled or did not grant access.
pub async fn run(
    records: &RecordSet,
    engine: &ScanEngine,
    gateway: Option<&dyn VerificationGateway>,
    airports: Option<&AirportTable>,
) -> RunReport {
    let analysis = engine.scan(records);

    let verification = match (analysis.token.formed(), gateway) {
        (Some(token), Some(gateway)) => Some(gateway.verify(token).await),
        (None, _) => {
            debug!("No token formed, skipping verification");
            None
        }
        (Some(_), None) => {
            info!("Verification disabled");
            None
        }
    };

    let granted = verification
        .as_ref()
        .is_some_and(VerificationOutcome::is_granted);
    let route_map = match airports {
        Some(airports) if analysis.token.is_formed() && !granted => {
            Some(plot_routes(records, airports))
        }
        _ => None,
    };

    RunReport {
        analysis,
        skipped_entries: records.skipped_entries(),
        verification_enabled: gateway.is_some(),
        verification,
        route_map,
    }
}
