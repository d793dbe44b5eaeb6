use connector_fetch::Location;
use serde::{Deserialize, Serialize};

/// A confirmed connection between two locations.
///
/// `unique_id` is the same whichever side was discovered first, `connection`
/// keeps the order in which the pair was confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationLink {
    pub unique_id: String,
    pub connection: String,
}

impl LocationLink {
    pub fn between(source: &Location, destination: &Location) -> Self {
        Self {
            unique_id: link_identity(&source.name, &destination.name),
            connection: describe_connection(&source.name, &destination.name),
        }
    }
}

/// Canonical identifier for an unordered pair of location names.
///
/// Names are compared as given, with no case or whitespace folding.
pub fn link_identity(a: &str, b: &str) -> String {
    if a < b {
        format!("{}:{}", a, b)
    } else {
        format!("{}:{}", b, a)
    }
}

pub fn describe_connection(source: &str, destination: &str) -> String {
    format!("[{}] <-> [{}]", source, destination)
}
