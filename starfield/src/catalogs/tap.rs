//! Blocking TAP client for remote astrometric archives
//!
//! Issues a synchronous ADQL cone search and parses the CSV answer. The
//! defaults target the Gaia DR3 source table at the ESA archive.

use std::time::Duration;

use super::{brightest_first, parse_source_csv, CatalogProvider, CatalogQuery, CatalogSource};
use crate::{Result, StarfieldError};

/// ESA Gaia archive TAP endpoint
pub const GAIA_TAP_URL: &str = "https://gea.esac.esa.int/tap-server/tap";

const DEFAULT_TABLE: &str = "gaiadr3.gaia_source";
const DEFAULT_MAG_COLUMN: &str = "phot_g_mean_mag";

/// Client for a TAP service exposing an `ra, dec, <mag>` table
#[derive(Debug, Clone)]
pub struct TapCatalogClient {
    base_url: String,
    table: String,
    magnitude_column: String,
    timeout: Duration,
}

impl Default for TapCatalogClient {
    fn default() -> Self {
        Self::new(GAIA_TAP_URL)
    }
}

impl TapCatalogClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            table: DEFAULT_TABLE.to_string(),
            magnitude_column: DEFAULT_MAG_COLUMN.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Query a different table / magnitude column on the same service
    pub fn with_table(mut self, table: &str, magnitude_column: &str) -> Self {
        self.table = table.to_string();
        self.magnitude_column = magnitude_column.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Render the ADQL cone search for a query
    pub fn adql(&self, query: &CatalogQuery) -> String {
        format!(
            "SELECT TOP {top} ra, dec, {mag} AS mag FROM {table} \
             WHERE 1 = CONTAINS(POINT('ICRS', ra, dec), \
             CIRCLE('ICRS', {ra:.8}, {dec:.8}, {radius:.8})) \
             AND {mag} <= {faint:.3} ORDER BY {mag} ASC",
            top = query.max_results,
            mag = self.magnitude_column,
            table = self.table,
            ra = query.center.ra_deg,
            dec = query.center.dec_deg,
            radius = query.radius_deg,
            faint = query.faint_limit_mag,
        )
    }
}

impl CatalogProvider for TapCatalogClient {
    fn query(&self, query: &CatalogQuery) -> Result<Vec<CatalogSource>> {
        let adql = self.adql(query);
        log::debug!("TAP query to {}: {}", self.base_url, adql);

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;

        let url = format!("{}/sync", self.base_url);
        let response = client
            .post(&url)
            .form(&[
                ("REQUEST", "doQuery"),
                ("LANG", "ADQL"),
                ("FORMAT", "csv"),
                ("QUERY", adql.as_str()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(StarfieldError::ServerError {
                status: status.as_u16(),
                message: response
                    .text()
                    .unwrap_or_else(|_| "Unknown error".to_string()),
            });
        }

        let body = response.text()?;
        let sources = parse_source_csv(body.as_bytes())?;
        log::info!(
            "TAP returned {} sources within {:.3}° of {}",
            sources.len(),
            query.radius_deg,
            query.center
        );

        // The server already filters, but keep the contract explicit
        let sources = sources.into_iter().filter(|s| query.matches(s)).collect();
        Ok(brightest_first(sources, query.max_results))
    }
}
