//! CSV decoding and schema validation for the message dataset.
//!
//! Header names are matched case-insensitively and extra columns are
//! ignored. Every required column is located before the first record is
//! read, so a missing column fails the whole load instead of surfacing later
//! during aggregation.

use cchc_core::{Dataset, MessageId, MessageRow};
use csv::{ReaderBuilder, StringRecord};

use crate::error::SourceError;

/// Columns the dashboard needs, in lower case.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "sender",
    "msg_id",
    "region",
    "comuna",
    "cat2",
    "cat3",
    "percentage",
];

/// Cell values read as "no value", matching the upstream export.
const NULL_MARKERS: &[&str] = &["", "NA", "N/A", "n/a", "NaN", "nan", "NULL", "null", "None", "<NA>"];

/// Positions of the required columns within a header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    sender: usize,
    msg_id: usize,
    region: usize,
    comuna: usize,
    cat2: usize,
    cat3: usize,
    percentage: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self, SourceError> {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |name: &str| -> Result<usize, SourceError> {
            normalized
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| SourceError::SchemaMismatch {
                    column: name.to_owned(),
                    reason: "column not found in header".to_owned(),
                })
        };

        Ok(Self {
            sender: find("sender")?,
            msg_id: find("msg_id")?,
            region: find("region")?,
            comuna: find("comuna")?,
            cat2: find("cat2")?,
            cat3: find("cat3")?,
            percentage: find("percentage")?,
        })
    }
}

/// Lower-cases a header name and strips a leading byte-order mark.
fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Decodes a comma-delimited document with a header row into a [`Dataset`].
///
/// # Errors
///
/// - [`SourceError::Parse`] if the bytes are not a well-formed CSV document.
/// - [`SourceError::SchemaMismatch`] if a required column is missing, or a
///   non-null `sender` is not boolean, or a non-null `percentage` is not
///   numeric. Null cells never fail the load.
pub fn parse_dataset(bytes: &[u8]) -> Result<Dataset, SourceError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| SourceError::Parse {
            context: "header row".to_owned(),
            source: e,
        })?
        .clone();
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| SourceError::Parse {
            context: e
                .position()
                .map_or_else(|| "record".to_owned(), |p| format!("line {}", p.line())),
            source: e,
        })?;
        let line = record.position().map_or(0, csv::Position::line);
        rows.push(parse_row(&record, columns, line)?);
    }

    Ok(Dataset::new(rows))
}

fn parse_row(record: &StringRecord, columns: ColumnIndex, line: u64) -> Result<MessageRow, SourceError> {
    let cell = |idx: usize| record.get(idx).unwrap_or("");

    let raw_sender = cell(columns.sender);
    let sender = if is_null(raw_sender) {
        None
    } else {
        Some(parse_bool(raw_sender).ok_or_else(|| SourceError::SchemaMismatch {
            column: "sender".to_owned(),
            reason: format!("line {line}: expected boolean, got '{raw_sender}'"),
        })?)
    };

    let percentage = parse_percentage(cell(columns.percentage)).ok_or_else(|| {
        SourceError::SchemaMismatch {
            column: "percentage".to_owned(),
            reason: format!(
                "line {line}: expected a number, got '{}'",
                cell(columns.percentage)
            ),
        }
    })?;

    Ok(MessageRow {
        sender,
        msg_id: nullable(cell(columns.msg_id)).map(MessageId),
        region: nullable(cell(columns.region)),
        comuna: nullable(cell(columns.comuna)),
        cat2: nullable(cell(columns.cat2)),
        cat3: nullable(cell(columns.cat3)),
        percentage,
    })
}

fn is_null(raw: &str) -> bool {
    NULL_MARKERS.contains(&raw.trim())
}

/// Cell text as published, or `None` for a null marker.
fn nullable(raw: &str) -> Option<String> {
    if is_null(raw) {
        None
    } else {
        Some(raw.to_owned())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" => Some(true),
        "false" | "f" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Missing shares count as zero so they contribute nothing to a group sum.
fn parse_percentage(raw: &str) -> Option<f64> {
    if is_null(raw) {
        return Some(0.0);
    }
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "sender,msg_id,region,comuna,cat2,cat3,percentage";

    #[test]
    fn parses_rows_with_mixed_case_headers_and_extra_columns() {
        let csv = "Sender,MSG_ID,Region,Comuna,extra,CAT2,Cat3,Percentage\n\
                   False,1,Metropolitana,Providencia,x,Vivienda,Arriendo,0.3\n\
                   True,2,Valparaíso,Viña del Mar,y,Empleo,Sueldos,0.1\n";
        let dataset = parse_dataset(csv.as_bytes()).expect("parse");
        assert_eq!(dataset.len(), 2);

        let first = &dataset.rows()[0];
        assert_eq!(first.sender, Some(false));
        assert_eq!(first.message_id(), Some("1"));
        assert_eq!(first.region(), Some("Metropolitana"));
        assert_eq!(first.comuna(), Some("Providencia"));
        assert_eq!(first.topic(), Some("Vivienda"));
        assert_eq!(first.subtopic(), Some("Arriendo"));
        assert!((first.percentage - 0.3).abs() < f64::EPSILON);

        assert_eq!(dataset.rows()[1].sender, Some(true));
        assert_eq!(dataset.rows()[1].comuna(), Some("Viña del Mar"));
    }

    #[test]
    fn missing_column_is_schema_mismatch() {
        let csv = "sender,msg_id,region,comuna,cat2,percentage\nfalse,1,A,X,T1,0.3\n";
        let err = parse_dataset(csv.as_bytes()).unwrap_err();
        assert!(
            matches!(err, SourceError::SchemaMismatch { ref column, .. } if column == "cat3"),
            "expected SchemaMismatch(cat3), got: {err:?}"
        );
        assert!(!err.is_unavailable());
    }

    #[test]
    fn header_only_document_yields_empty_dataset() {
        let dataset = parse_dataset(format!("{HEADER}\n").as_bytes()).expect("parse");
        assert!(dataset.is_empty());
    }

    #[test]
    fn blank_categories_become_null() {
        let csv = format!("{HEADER}\nfalse,1,A,X,,NaN,0.2\n");
        let dataset = parse_dataset(csv.as_bytes()).expect("parse");
        assert_eq!(dataset.rows()[0].cat2, None);
        assert_eq!(dataset.rows()[0].cat3, None);
    }

    #[test]
    fn blank_percentage_reads_as_zero() {
        let csv = format!("{HEADER}\nfalse,1,A,X,T1,S1,\n");
        let dataset = parse_dataset(csv.as_bytes()).expect("parse");
        assert!(dataset.rows()[0].percentage.abs() < f64::EPSILON);
    }

    #[test]
    fn non_numeric_percentage_is_schema_mismatch() {
        let csv = format!("{HEADER}\nfalse,1,A,X,T1,S1,lots\n");
        let err = parse_dataset(csv.as_bytes()).unwrap_err();
        assert!(
            matches!(err, SourceError::SchemaMismatch { ref column, ref reason } if column == "percentage" && reason.contains("line 2")),
            "expected SchemaMismatch(percentage) at line 2, got: {err:?}"
        );
    }

    #[test]
    fn non_boolean_sender_is_schema_mismatch() {
        let csv = format!("{HEADER}\nmaybe,1,A,X,T1,S1,0.1\n");
        let err = parse_dataset(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, SourceError::SchemaMismatch { ref column, .. } if column == "sender"));
    }

    #[test]
    fn blank_msg_id_keeps_row_without_id() {
        let csv = format!("{HEADER}\nfalse,1,A,X,T1,S1,0.1\nfalse, ,A,X,T1,S2,0.2\n");
        let dataset = parse_dataset(csv.as_bytes()).expect("null id does not fail the load");
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows()[1].msg_id, None);
        assert_eq!(dataset.rows()[1].subtopic(), Some("S2"));
    }

    #[test]
    fn blank_sender_keeps_row_as_non_public() {
        let csv = format!("{HEADER}\nfalse,1,A,X,T1,S1,0.1\n,2,A,X,T1,S1,0.1\nNA,3,A,X,T1,S1,0.1\n");
        let dataset = parse_dataset(csv.as_bytes()).expect("null sender does not fail the load");
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.rows()[1].sender, None);
        assert_eq!(dataset.rows()[2].sender, None);
        assert!(dataset.rows()[0].is_public());
        assert!(!dataset.rows()[1].is_public());
    }

    #[test]
    fn null_markers_in_location_become_null() {
        let csv = format!("{HEADER}\nfalse,1,NA,,T1,S1,0.1\nfalse,2,RM,Providencia,T1,S1,0.1\n");
        let dataset = parse_dataset(csv.as_bytes()).expect("parse");
        assert_eq!(dataset.rows()[0].region, None);
        assert_eq!(dataset.rows()[0].comuna, None);
        assert_eq!(dataset.rows()[1].region(), Some("RM"));
        assert_eq!(dataset.rows()[1].comuna(), Some("Providencia"));
    }

    #[test]
    fn ragged_record_is_parse_error() {
        let csv = format!("{HEADER}\nfalse,1,A\n");
        let err = parse_dataset(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }), "got: {err:?}");
        assert!(err.is_unavailable());
    }

    #[test]
    fn bom_is_stripped_from_first_header() {
        let csv = format!("\u{feff}{HEADER}\nfalse,1,A,X,T1,S1,0.1\n");
        let dataset = parse_dataset(csv.as_bytes()).expect("parse");
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("True"), Some(true));
        assert_eq!(parse_bool("FALSE"), Some(false));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool(""), None);
    }
}
