// First-sheet reader for xls/xlsx/ods exports held in memory.
use crate::data::source::RowSource;
use crate::error::{EngineError, Result};
use calamine::{open_workbook_auto_from_rs, Data, DataType, Range, Reader};
use demandas_shared::{Cell, Table};
use std::io::Cursor;

pub struct SpreadsheetSource {
    name: String,
    bytes: Vec<u8>,
}

impl SpreadsheetSource {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub(crate) fn cell_from_data(data: &Data) -> Cell {
        match data {
            Data::Int(i) => Cell::Integer(*i),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) if s.is_empty() => Cell::Absent,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::DateTime(_) | Data::DateTimeIso(_) => {
                data.as_datetime().map(Cell::Timestamp).unwrap_or(Cell::Absent)
            }
            Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(_) | Data::Empty => Cell::Absent,
        }
    }
}

impl RowSource for SpreadsheetSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_table(&mut self) -> Result<Table> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(self.bytes.as_slice()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(EngineError::EmptyWorkbook)??;

        let table = table_from_range(&self.name, &range);
        tracing::info!(source = %self.name, rows = table.len(), "Read spreadsheet source");
        Ok(table)
    }
}

/// First row is the header (trimmed); rows with no value at all are skipped.
fn table_from_range(name: &str, range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        tracing::warn!(source = %name, "First sheet is empty");
        return Table::default();
    };
    let headers = header_row
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();
    let mut table = Table::new(headers);

    for row in rows {
        let cells: Vec<Cell> = row.iter().map(SpreadsheetSource::cell_from_data).collect();
        if cells.iter().all(Cell::is_absent) {
            continue;
        }
        table.push_row(cells);
    }
    table
}
