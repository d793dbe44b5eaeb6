use serde::{Deserialize, Serialize};

pub type RouterId = i64;
pub type LocationId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Router {
    pub id: RouterId,
    pub name: String,
    pub location_id: LocationId,
    /// Linked router ids in source order. Self-links and duplicates are kept.
    #[serde(default)]
    pub router_links: Vec<RouterId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub postcode: String,
    pub name: String,
}

/// Payload returned by the router location data API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterLocationData {
    #[serde(default)]
    pub routers: Vec<Router>,
    #[serde(default)]
    pub locations: Vec<Location>,
}

impl RouterLocationData {
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }
}
