//! CSV backed catalog
//!
//! Accepts any CSV with a header containing `ra`, `dec` and one magnitude
//! column (`mag`, `magnitude` or `phot_g_mean_mag`). This is also the format
//! TAP services return with `FORMAT=csv`.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::{CatalogProvider, CatalogQuery, CatalogSource, StaticCatalog};
use crate::{Equatorial, Result, StarfieldError};

const MAGNITUDE_COLUMNS: [&str; 3] = ["mag", "magnitude", "phot_g_mean_mag"];

fn column_index(headers: &csv::StringRecord, names: &[&str]) -> Result<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        .ok_or_else(|| {
            StarfieldError::Parse(format!("missing column, expected one of {names:?}"))
        })
}

fn parse_field(record: &csv::StringRecord, idx: usize) -> Option<f64> {
    record.get(idx).and_then(|v| v.trim().parse::<f64>().ok())
}

/// Parse `ra,dec,mag` rows from any reader
///
/// Rows with a blank magnitude (common for faint archive entries) are
/// skipped; rows with malformed or out-of-range positions are an error.
pub fn parse_source_csv<R: Read>(reader: R) -> Result<Vec<CatalogSource>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let ra_idx = column_index(&headers, &["ra"])?;
    let dec_idx = column_index(&headers, &["dec"])?;
    let mag_idx = column_index(&headers, &MAGNITUDE_COLUMNS)?;

    let mut sources = Vec::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record?;
        let (ra, dec) = match (parse_field(&record, ra_idx), parse_field(&record, dec_idx)) {
            (Some(ra), Some(dec)) => (ra, dec),
            _ => {
                return Err(StarfieldError::Parse(format!(
                    "row {}: unreadable position",
                    line + 1
                )))
            }
        };
        let Some(magnitude) = parse_field(&record, mag_idx) else {
            log::debug!("row {}: no magnitude, skipping", line + 1);
            continue;
        };
        sources.push(CatalogSource::new(Equatorial::new(ra, dec)?, magnitude));
    }

    Ok(sources)
}

/// Catalog loaded once from a CSV file
#[derive(Debug, Clone)]
pub struct CsvCatalog {
    inner: StaticCatalog,
}

impl CsvCatalog {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let sources = parse_source_csv(BufReader::new(file))?;
        log::info!(
            "Loaded {} catalog sources from {}",
            sources.len(),
            path.as_ref().display()
        );
        Ok(Self {
            inner: StaticCatalog::new(sources),
        })
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl CatalogProvider for CsvCatalog {
    fn query(&self, query: &CatalogQuery) -> Result<Vec<CatalogSource>> {
        self.inner.query(query)
    }
}
