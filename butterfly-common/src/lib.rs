//! Shared error type and name suggestions for butterfly-osm crates

pub mod error;

pub use error::{suggest_correction, Error, Result};
