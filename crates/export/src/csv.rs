use csv::{Terminator, WriterBuilder};
use docsift_core::Table;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("CSV flush failed: {0}")]
    Flush(String),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

fn writer() -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, ExportError> {
    wtr.into_inner().map_err(|e| ExportError::Flush(e.error().to_string()))
}

/// Every table's rows as CSV records, each table followed by one blank line.
/// Rows keep their own lengths.
pub fn render_tables_csv(tables: &[Table]) -> Result<Vec<u8>, ExportError> {
    let mut out = Vec::new();
    for table in tables {
        let mut wtr = writer();
        for row in &table.rows {
            if row.is_empty() {
                // A zero-field record would be indistinguishable from the separator.
                wtr.write_record([""])?;
            } else {
                wtr.write_record(row)?;
            }
        }
        out.extend(finish(wtr)?);
        out.push(b'\n');
    }
    Ok(out)
}

/// A `text` header and one record holding the whole text.
pub fn render_text_csv(text: &str) -> Result<Vec<u8>, ExportError> {
    let mut wtr = writer();
    wtr.write_record(["text"])?;
    wtr.write_record([text])?;
    finish(wtr)
}
