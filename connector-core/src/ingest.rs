use crate::data::EntityStore;
use connector_fetch::{Location, Router, RouterLocationData};
use tracing::{error, info};

/// Counts from loading a payload into the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub routers: usize,
    pub locations: usize,
    pub failed: usize,
}

/// Store every router and location in the payload.
///
/// A record that fails to store is logged and counted, the rest still load.
pub fn ingest<S: EntityStore>(store: &S, data: &RouterLocationData) -> IngestSummary {
    let (routers, router_failures) = save_routers(store, &data.routers);
    let (locations, location_failures) = save_locations(store, &data.locations);

    let summary = IngestSummary {
        routers,
        locations,
        failed: router_failures + location_failures,
    };
    info!(
        "Ingested {} routers and {} locations ({} failed)",
        summary.routers, summary.locations, summary.failed
    );
    summary
}

pub fn save_routers<S: EntityStore>(store: &S, routers: &[Router]) -> (usize, usize) {
    let mut failed = 0;
    for router in routers {
        if let Err(e) = store.put(router) {
            error!("Failed to store router {}: {}", router.id, e);
            failed += 1;
        }
    }
    (routers.len() - failed, failed)
}

pub fn save_locations<S: EntityStore>(store: &S, locations: &[Location]) -> (usize, usize) {
    let mut failed = 0;
    for location in locations {
        if let Err(e) = store.put(location) {
            error!("Failed to store location {}: {}", location.id, e);
            failed += 1;
        }
    }
    (locations.len() - failed, failed)
}
