//! Star catalogs module
//!
//! A catalog answers a cone search around a pointing with a list of point
//! sources. The simulator only sees the [`CatalogProvider`] trait, so the
//! remote TAP client, a CSV file and an in-memory list are interchangeable.

mod csv_file;
mod tap;

pub use csv_file::{parse_source_csv, CsvCatalog};
pub use tap::{TapCatalogClient, GAIA_TAP_URL};

use serde::{Deserialize, Serialize};

use crate::{Equatorial, Result, StarfieldError};

/// A single point source returned by a catalog
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatalogSource {
    /// Sky position of the source
    pub position: Equatorial,
    /// Apparent magnitude in the catalog band
    pub magnitude: f64,
}

impl CatalogSource {
    pub fn new(position: Equatorial, magnitude: f64) -> Self {
        Self {
            position,
            magnitude,
        }
    }
}

/// Cone search parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogQuery {
    /// Center of the search cone
    pub center: Equatorial,
    /// Cone radius in degrees
    pub radius_deg: f64,
    /// Maximum number of sources to return (brightest first)
    pub max_results: usize,
    /// Sources fainter than this magnitude are excluded
    pub faint_limit_mag: f64,
}

impl CatalogQuery {
    /// Create a validated query
    pub fn new(
        center: Equatorial,
        radius_deg: f64,
        max_results: usize,
        faint_limit_mag: f64,
    ) -> Result<Self> {
        if !(radius_deg > 0.0 && radius_deg <= 90.0) {
            return Err(StarfieldError::InvalidQuery(format!(
                "search radius {radius_deg} must be in (0, 90] degrees"
            )));
        }
        if max_results == 0 {
            return Err(StarfieldError::InvalidQuery(
                "max_results must be at least 1".to_string(),
            ));
        }
        if !faint_limit_mag.is_finite() {
            return Err(StarfieldError::InvalidQuery(
                "faint magnitude limit must be finite".to_string(),
            ));
        }
        Ok(Self {
            center,
            radius_deg,
            max_results,
            faint_limit_mag,
        })
    }

    /// Whether a source satisfies the cone and magnitude constraints
    pub fn matches(&self, source: &CatalogSource) -> bool {
        source.magnitude.is_finite()
            && source.magnitude <= self.faint_limit_mag
            && self.center.angular_separation_deg(&source.position) <= self.radius_deg
    }
}

/// Anything able to answer a cone search
///
/// Failures are returned to the caller unchanged; an empty field is a valid
/// answer and is left for the caller to judge.
pub trait CatalogProvider {
    fn query(&self, query: &CatalogQuery) -> Result<Vec<CatalogSource>>;
}

/// Sort bright-first and keep at most `max_results`
pub(crate) fn brightest_first(
    mut sources: Vec<CatalogSource>,
    max_results: usize,
) -> Vec<CatalogSource> {
    sources.sort_by(|a, b| a.magnitude.total_cmp(&b.magnitude));
    sources.truncate(max_results);
    sources
}

/// Catalog backed by a list of sources held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    sources: Vec<CatalogSource>,
}

impl StaticCatalog {
    pub fn new(sources: Vec<CatalogSource>) -> Self {
        Self { sources }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn sources(&self) -> &[CatalogSource] {
        &self.sources
    }
}

impl CatalogProvider for StaticCatalog {
    fn query(&self, query: &CatalogQuery) -> Result<Vec<CatalogSource>> {
        let selected = self
            .sources
            .iter()
            .filter(|source| query.matches(source))
            .copied()
            .collect();
        Ok(brightest_first(selected, query.max_results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(ra: f64, dec: f64, mag: f64) -> CatalogSource {
        CatalogSource::new(Equatorial::new(ra, dec).unwrap(), mag)
    }

    fn test_catalog() -> StaticCatalog {
        StaticCatalog::new(vec![
            source(100.0, 45.0, 8.0),  // Center
            source(100.1, 45.0, 12.0), // Near center, faint
            source(101.0, 45.0, 5.0),  // ~0.7 degrees away in RA
            source(100.0, 46.0, 9.0),  // 1 degree away in Dec
            source(105.0, 45.0, 3.0),  // Far away
        ])
    }

    #[test]
    fn test_query_validation() {
        let center = Equatorial::new(100.0, 45.0).unwrap();
        assert!(CatalogQuery::new(center, 0.0, 10, 12.0).is_err());
        assert!(CatalogQuery::new(center, 91.0, 10, 12.0).is_err());
        assert!(CatalogQuery::new(center, 1.0, 0, 12.0).is_err());
        assert!(CatalogQuery::new(center, 1.0, 10, f64::NAN).is_err());
        assert!(CatalogQuery::new(center, 1.0, 10, 12.0).is_ok());
    }

    #[test]
    fn test_static_cone_search() {
        let catalog = test_catalog();
        let center = Equatorial::new(100.0, 45.0).unwrap();

        let query = CatalogQuery::new(center, 0.5, 100, 20.0).unwrap();
        let found = catalog.query(&query).unwrap();
        assert_eq!(found.len(), 2);

        let query = CatalogQuery::new(center, 1.01, 100, 20.0).unwrap();
        let found = catalog.query(&query).unwrap();
        assert_eq!(found.len(), 4);
        // Bright first
        assert_eq!(found[0].magnitude, 5.0);
    }

    #[test]
    fn test_static_magnitude_and_count_limits() {
        let catalog = test_catalog();
        let center = Equatorial::new(100.0, 45.0).unwrap();

        let query = CatalogQuery::new(center, 1.01, 100, 10.0).unwrap();
        let found = catalog.query(&query).unwrap();
        assert!(found.iter().all(|s| s.magnitude <= 10.0));
        assert_eq!(found.len(), 3);

        let query = CatalogQuery::new(center, 1.01, 2, 20.0).unwrap();
        let found = catalog.query(&query).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].magnitude, 8.0);
    }

    #[test]
    fn test_empty_field_is_not_an_error() {
        let catalog = test_catalog();
        let center = Equatorial::new(250.0, -30.0).unwrap();
        let query = CatalogQuery::new(center, 1.0, 100, 20.0).unwrap();
        assert!(catalog.query(&query).unwrap().is_empty());
    }
}
