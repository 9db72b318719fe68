/// Schema-checked parsing of one export service response body.
///
/// The export service returns a tab-delimited table with a header row and
/// three columns. The schema is declared up front and any deviation is a
/// `StreamflowError::ChunkParse` for the chunk that produced the body. Values
/// are kept as text here; numeric coercion happens in `accumulate`.

use chrono::{NaiveDate, NaiveDateTime};

use crate::model::{QueryChunk, StreamflowError};

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Header of a discharge export, in column order: station abbreviation
/// (text), reading time (timestamp), discharge in cfs (float).
pub const DISCHARGE_HEADER: [&str; 3] = ["Station", "Date/Time", "DISCHRG"];

const TIMESTAMP_COLUMN: usize = 1;

pub const FIELD_DELIMITER: u8 = b'\t';

/// Date-time layouts seen in export bodies.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
];

/// Date-only layouts; these normalize to midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parses a timestamp cell in any of the layouts the export service emits.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

// ---------------------------------------------------------------------------
// Parsed table types
// ---------------------------------------------------------------------------

/// One data row, cell text as delivered (trimmed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub station_id: String,
    pub timestamp: String,
    pub discharge: String,
}

impl RawRow {
    pub fn new(station_id: &str, timestamp: &str, discharge: &str) -> Self {
        Self {
            station_id: station_id.to_string(),
            timestamp: timestamp.to_string(),
            discharge: discharge.to_string(),
        }
    }
}

/// The schema-valid contents of one chunk's response.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkTable {
    pub chunk: QueryChunk,
    pub rows: Vec<RawRow>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parses a response body for `chunk` against `DISCHARGE_HEADER`.
///
/// # Errors
/// `StreamflowError::ChunkParse` when:
/// - the body has no header row (first line is already data, or nothing at all),
/// - the header names differ from `DISCHARGE_HEADER` (case-insensitive),
/// - the header or any row does not have exactly three columns,
/// - the body cannot be read as delimited text.
pub fn parse_table(chunk: &QueryChunk, body: &str) -> Result<ChunkTable, StreamflowError> {
    let parse_error = |reason: String| StreamflowError::ChunkParse {
        range: chunk.range(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(FIELD_DELIMITER)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut records = reader.records().filter(|r| match r {
        // A line of spaces is not a row.
        Ok(record) => !record.iter().all(str::is_empty),
        Err(_) => true,
    });

    let header = match records.next() {
        Some(Ok(record)) => record,
        Some(Err(e)) => return Err(parse_error(format!("unreadable header: {}", e))),
        None => return Err(parse_error("empty table: no header row".to_string())),
    };

    if header.len() != DISCHARGE_HEADER.len() {
        return Err(parse_error(format!(
            "expected {} header columns ({}), found {}",
            DISCHARGE_HEADER.len(),
            DISCHARGE_HEADER.join(", "),
            header.len()
        )));
    }
    if parse_timestamp(&header[TIMESTAMP_COLUMN]).is_some() {
        return Err(parse_error(format!(
            "missing header row: first line is data ('{}')",
            &header[TIMESTAMP_COLUMN]
        )));
    }
    let names_match = header
        .iter()
        .zip(DISCHARGE_HEADER)
        .all(|(found, expected)| found.eq_ignore_ascii_case(expected));
    if !names_match {
        return Err(parse_error(format!(
            "unexpected header: expected '{}', found '{}'",
            DISCHARGE_HEADER.join(", "),
            header.iter().collect::<Vec<_>>().join(", ")
        )));
    }

    let mut rows = Vec::new();
    for result in records {
        let record = result.map_err(|e| parse_error(format!("unreadable row: {}", e)))?;
        if record.len() != DISCHARGE_HEADER.len() {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(parse_error(format!(
                "line {}: expected {} columns, found {}",
                line,
                DISCHARGE_HEADER.len(),
                record.len()
            )));
        }
        rows.push(RawRow::new(&record[0], &record[1], &record[2]));
    }

    Ok(ChunkTable {
        chunk: chunk.clone(),
        rows,
    })
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
