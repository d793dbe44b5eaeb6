pub mod data;
pub mod error;
pub mod ingest;
pub mod link;
pub mod resolve;
pub mod sink;

pub use data::{Database, Entity, EntityKind, EntityStore};
pub use error::StoreError;
pub use ingest::{IngestSummary, ingest};
pub use link::{LocationLink, link_identity};
pub use resolve::{LinkResolver, Resolution};
pub use sink::{LinkSink, StdoutSink};
