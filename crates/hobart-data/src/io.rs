//! Delimited-file loading.

use crate::error::{DataError, Result};
use polars::prelude::*;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Read every row of a delimited file into typed records.
///
/// Headers are matched against the record's field names and aliases; fields
/// are trimmed. An input with a header but no rows is reported as
/// [`DataError::EmptyPanel`].
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let records = read_records_from(std::fs::File::open(path)?)?;
    if records.is_empty() {
        return Err(DataError::EmptyPanel(path.display().to_string()));
    }

    debug!(path = %path.display(), rows = records.len(), "loaded records");
    Ok(records)
}

fn read_records_from<T: DeserializeOwned, R: std::io::Read>(reader: R) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let records = rdr
        .deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()?;
    Ok(records)
}

/// Lazily scan a delimited file, parsing date-like columns.
///
/// Used for large daily panels, where the date filter can be pushed into the
/// scan instead of materializing every row as a record.
pub fn read_frame(path: &Path) -> Result<LazyFrame> {
    let lf = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_try_parse_dates(true)
        .finish()?;
    Ok(lf)
}

/// Check that `frame` carries every column in `required`.
pub fn require_columns(frame: &mut LazyFrame, required: &[&str], source_name: &str) -> Result<()> {
    let schema = frame.collect_schema()?;
    for column in required {
        if !schema.contains(column) {
            return Err(DataError::MissingColumn {
                column: (*column).to_string(),
                source_name: source_name.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::MarketObs;
    use std::io::Write;

    #[test]
    fn test_read_records_from_buffer() {
        let data = "date,vwretd,rf\n2020-01-31,0.01,0.001\n2020-02-29,-0.08,\n";
        let rows: Vec<MarketObs> = read_records_from(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].risk_free, None);
    }

    #[test]
    fn test_read_records_empty_file_is_error() {
        let path = std::env::temp_dir().join("hobart_empty_market.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "date,market_return").unwrap();
        drop(file);

        let result = read_records::<MarketObs>(&path);
        assert!(matches!(result, Err(DataError::EmptyPanel(_))));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_require_columns() {
        let path = std::env::temp_dir().join("hobart_frame_columns.csv");
        std::fs::write(&path, "symbol,date,returns\nA,2020-01-02,0.01\n").unwrap();

        let mut lf = read_frame(&path).unwrap();
        assert!(require_columns(&mut lf, &["symbol", "returns"], "daily").is_ok());
        let err = require_columns(&mut lf, &["volume"], "daily").unwrap_err();
        assert!(err.to_string().contains("volume"));
        std::fs::remove_file(path).ok();
    }
}
