use super::{DataError, PriceRecord, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

const REQUIRED_COLUMNS: [&str; 3] = ["date", "open_price", "predicted_price"];
const CSV_HEADER: [&str; 7] = [
    "date",
    "token",
    "symbol",
    "open_price",
    "predicted_price",
    "prediction_lb",
    "prediction_ub",
];

pub struct DataLoader;

impl DataLoader {
    fn verify_required_columns(headers: &[String]) -> Result<()> {
        let headers_set: HashSet<_> = headers.iter().map(|s| s.to_lowercase()).collect();

        for column in REQUIRED_COLUMNS {
            if !headers_set.contains(column) {
                return Err(DataError::MissingColumn(column.to_string()));
            }
        }
        Ok(())
    }

    /// Number of positions where the date does not strictly increase.
    fn count_ordering_violations(records: &[PriceRecord]) -> usize {
        records
            .windows(2)
            .filter(|pair| pair[1].date <= pair[0].date)
            .count()
    }

    /// Write price rows as CSV with a header row, in the given order.
    pub fn write_records<P: AsRef<Path>>(path: P, records: &[PriceRecord]) -> Result<()> {
        let mut wtr = WriterBuilder::new()
            .has_headers(true)
            .from_path(&path)?;

        // Serialized rows only emit the header alongside the first record
        if records.is_empty() {
            wtr.write_record(CSV_HEADER)?;
        }
        for record in records {
            wtr.serialize(record)?;
        }
        wtr.flush().map_err(|source| DataError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })?;

        info!(
            path = %path.as_ref().display(),
            rows = records.len(),
            "wrote cleaned price data"
        );
        Ok(())
    }

    pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<PriceRecord>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&path)?;

        let headers: Vec<String> = rdr.headers()?.iter().map(|s| s.to_string()).collect();
        Self::verify_required_columns(&headers)?;

        let mut records = Vec::new();
        for result in rdr.deserialize() {
            let record: PriceRecord = result?;
            records.push(record);
        }

        let violations = Self::count_ordering_violations(&records);
        if violations > 0 {
            warn!(violations, "price dates are not strictly increasing");
        }

        info!(
            path = %path.as_ref().display(),
            rows = records.len(),
            "loaded price series"
        );
        Ok(records)
    }

    /// Load the `open_price` column in file order.
    pub fn load_open_prices<P: AsRef<Path>>(path: P) -> Result<Vec<f64>> {
        let records = Self::load_records(path)?;
        if records.is_empty() {
            return Err(DataError::MissingData);
        }
        Ok(records.iter().map(|r| r.open_price).collect())
    }
}
