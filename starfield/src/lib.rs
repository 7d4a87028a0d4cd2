//! Sky coordinates and star catalog access
//!
//! This crate provides the equatorial coordinate primitive shared by the
//! simulator along with catalog providers that answer cone searches around
//! a pointing: an in-memory catalog, a CSV file catalog and a TAP client
//! for remote astrometric archives.

pub mod catalogs;
pub mod coordinates;

pub use catalogs::{CatalogProvider, CatalogQuery, CatalogSource};
pub use coordinates::Equatorial;

use thiserror::Error;

/// Errors raised while validating coordinates or talking to a catalog
#[derive(Error, Debug)]
pub enum StarfieldError {
    /// Coordinate outside the valid RA/Dec domain
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Catalog query parameters rejected before any request is made
    #[error("invalid catalog query: {0}")]
    InvalidQuery(String),

    /// Transport level failure reaching the catalog service
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog service answered with a non-success status
    #[error("catalog server error (status {status}): {message}")]
    ServerError { status: u16, message: String },

    /// Catalog payload could not be decoded
    #[error("catalog parse error: {0}")]
    Parse(String),

    /// Local catalog file could not be read
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<csv::Error> for StarfieldError {
    fn from(err: csv::Error) -> Self {
        StarfieldError::Parse(err.to_string())
    }
}

/// Result type for starfield operations
pub type Result<T> = std::result::Result<T, StarfieldError>;
