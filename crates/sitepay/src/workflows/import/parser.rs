use super::mapping::{column_for_header, Column};
use super::ImportError;
use std::collections::HashMap;
use std::io::Read;

/// One CSV line keyed by canonical column, with its 1-based line number.
#[derive(Debug)]
pub(crate) struct Row {
    pub(crate) line: u64,
    values: HashMap<Column, String>,
}

impl Row {
    /// Non-empty value for `column`, if present.
    pub(crate) fn get(&self, column: Column) -> Option<&str> {
        self.values
            .get(&column)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub(crate) fn require(&self, column: Column) -> Result<&str, ImportError> {
        self.get(column).ok_or_else(|| ImportError::InvalidField {
            line: self.line,
            column: column.label(),
            value: String::new(),
            reason: "value is required".to_string(),
        })
    }

    pub(crate) fn invalid(&self, column: Column, value: &str, reason: &str) -> ImportError {
        ImportError::InvalidField {
            line: self.line,
            column: column.label(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Reads every non-blank row; unknown headers are ignored.
pub(crate) fn parse_rows<R: Read>(
    reader: R,
    required: &[Column],
) -> Result<(Vec<Column>, Vec<Row>), ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<Option<Column>> = csv_reader
        .headers()?
        .iter()
        .map(column_for_header)
        .collect();

    for column in required {
        if !columns.contains(&Some(*column)) {
            return Err(ImportError::MissingColumn(column.label()));
        }
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record.position().map(|position| position.line()).unwrap_or(0);
        let values = columns
            .iter()
            .zip(record.iter())
            .filter_map(|(column, value)| column.map(|column| (column, value.to_string())))
            .collect();
        rows.push(Row { line, values });
    }

    Ok((columns.into_iter().flatten().collect(), rows))
}
