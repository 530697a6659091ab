//! CSV input parser
//!
//! Expected header: `name,id,latitude,longitude,metadata`. Column order is
//! free, extra columns are ignored and `metadata` may be missing entirely.
//!
//! Only the header and the numeric cells are trimmed. Names are compared byte
//! for byte with the registry, so the `name` cell is kept as written.

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::ParseError;
use crate::types::DeviceRow;

const COL_NAME: &str = "name";
const COL_ID: &str = "id";
const COL_LATITUDE: &str = "latitude";
const COL_LONGITUDE: &str = "longitude";
const COL_METADATA: &str = "metadata";

/// Positions of the known columns in the header row
struct ColumnMap {
    name: usize,
    id: usize,
    latitude: usize,
    longitude: usize,
    metadata: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, ParseError> {
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(ParseError::MissingHeader);
        }

        let find = |column: &'static str| headers.iter().position(|h| h == column);
        let require = |column: &'static str| find(column).ok_or(ParseError::MissingColumn(column));

        Ok(Self {
            name: require(COL_NAME)?,
            id: require(COL_ID)?,
            latitude: require(COL_LATITUDE)?,
            longitude: require(COL_LONGITUDE)?,
            metadata: find(COL_METADATA),
        })
    }
}

/// Parse raw CSV bytes with the default `,` delimiter
#[cfg(test)]
pub fn parse_devices(content: &[u8]) -> Result<Vec<DeviceRow>, ParseError> {
    parse_devices_with_delimiter(content, b',')
}

/// Parse raw CSV bytes into device rows, in file order
pub fn parse_devices_with_delimiter(content: &[u8], delimiter: u8) -> Result<Vec<DeviceRow>, ParseError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(content);

    let headers = reader.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 1;
        let record = result.map_err(|source| ParseError::Record { line, source })?;

        // Blank lines come through as a single empty field
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        rows.push(parse_row(&record, &columns, line)?);
    }

    debug!("Parsed {} device rows from CSV", rows.len());
    Ok(rows)
}

fn parse_row(record: &StringRecord, columns: &ColumnMap, line: usize) -> Result<DeviceRow, ParseError> {
    let cell = |idx: usize| record.get(idx).unwrap_or("");

    let id_raw = cell(columns.id).trim();
    let id: i64 = id_raw.parse().map_err(|_| ParseError::InvalidField {
        line,
        column: COL_ID,
        value: id_raw.to_string(),
    })?;

    let latitude = parse_coordinate(cell(columns.latitude).trim(), COL_LATITUDE, line)?;
    let longitude = parse_coordinate(cell(columns.longitude).trim(), COL_LONGITUDE, line)?;

    let metadata = columns
        .metadata
        .map(cell)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string);

    Ok(DeviceRow {
        line,
        id,
        name: cell(columns.name).to_string(),
        latitude,
        longitude,
        metadata,
    })
}

fn parse_coordinate(raw: &str, column: &'static str, line: usize) -> Result<f64, ParseError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::InvalidField {
            line,
            column,
            value: raw.to_string(),
        })
}
