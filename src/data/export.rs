use super::{DataError, PriceRecord, RawExport, RawRecord, Result};
use chrono::NaiveDate;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// Read the raw JSON export from disk.
pub fn load_export<P: AsRef<Path>>(path: P) -> Result<RawExport> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let export: RawExport = serde_json::from_reader(BufReader::new(file))?;
    info!(path = %path.display(), records = export.data.len(), "loaded raw export");
    Ok(export)
}

/// Flatten raw records into price rows, preserving input order.
pub fn flatten(export: &RawExport) -> Result<Vec<PriceRecord>> {
    export
        .data
        .iter()
        .enumerate()
        .map(|(index, record)| flatten_record(index, record))
        .collect()
}

fn flatten_record(index: usize, record: &RawRecord) -> Result<PriceRecord> {
    let date = parse_block_date(&record.block_date).ok_or_else(|| DataError::InvalidDate {
        index,
        value: record.block_date.clone(),
    })?;

    Ok(PriceRecord {
        date,
        token: record.token.clone(),
        symbol: record.token_symbol.clone(),
        open_price: record.open,
        predicted_price: record.prediction,
        prediction_lb: record.prediction_lb,
        prediction_ub: record.prediction_ub,
    })
}

/// Parse the leading `YYYY-MM-DD` of a block date, ignoring any time suffix
/// such as `2024-01-01 00:00:00.000 UTC`.
pub fn parse_block_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    let parsed = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok();
    if parsed.is_none() {
        debug!(raw, "unparseable block date");
    }
    parsed
}
