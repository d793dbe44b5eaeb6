pub mod client;
pub mod error;
pub mod model;

pub use client::Client;
pub use error::FetchError;
pub use model::{Location, LocationId, Router, RouterId, RouterLocationData};
