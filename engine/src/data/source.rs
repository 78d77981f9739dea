// Row-source abstraction shared by the delimited-text and spreadsheet readers.
use crate::error::Result;
use demandas_shared::Table;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Anything that can produce a header and an ordered sequence of rows.
pub trait RowSource {
    /// Short label used in log lines.
    fn name(&self) -> &str;

    fn read_table(&mut self) -> Result<Table>;
}

/// A table already in memory. Handy for callers that build rows themselves.
pub struct InMemorySource {
    name: String,
    table: Option<Table>,
}

impl InMemorySource {
    pub fn new(name: impl Into<String>, table: Table) -> Self {
        Self {
            name: name.into(),
            table: Some(table),
        }
    }
}

impl RowSource for InMemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_table(&mut self) -> Result<Table> {
        Ok(self.table.take().unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceFormat {
    /// Semicolon-delimited text export.
    Delimited,
    /// First sheet of an xls/xlsx/ods workbook.
    Spreadsheet,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "txt" => Some(SourceFormat::Delimited),
            "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => Some(SourceFormat::Spreadsheet),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            SourceFormat::Delimited => "delimited",
            SourceFormat::Spreadsheet => "spreadsheet",
        }
    }
}
