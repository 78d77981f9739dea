use crate::data::source::RowSource;
use crate::error::{EngineError, Result};
use csv::ReaderBuilder;
use demandas_shared::{Cell, Table};
use encoding_rs::{UTF_8, WINDOWS_1252};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Text encodings tried when decoding delimited exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Iso8859_1,
    Windows1252,
}

impl TextEncoding {
    pub const DEFAULT_ORDER: [TextEncoding; 4] = [
        TextEncoding::Utf8,
        TextEncoding::Latin1,
        TextEncoding::Iso8859_1,
        TextEncoding::Windows1252,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin1",
            TextEncoding::Iso8859_1 => "iso-8859-1",
            TextEncoding::Windows1252 => "windows-1252",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(TextEncoding::Utf8),
            "latin1" | "latin-1" => Some(TextEncoding::Latin1),
            "iso-8859-1" | "iso8859-1" | "iso_8859_1" => Some(TextEncoding::Iso8859_1),
            "windows-1252" | "cp1252" => Some(TextEncoding::Windows1252),
            _ => None,
        }
    }

    /// Strict decode: `None` when the bytes are not valid in this encoding.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self {
            TextEncoding::Utf8 => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                UTF_8.decode_without_bom_handling_and_without_replacement(body)
            }
            // Latin-1 maps every byte to the code point of the same value.
            TextEncoding::Latin1 | TextEncoding::Iso8859_1 => {
                Some(encoding_rs::mem::decode_latin1(bytes))
            }
            TextEncoding::Windows1252 => {
                WINDOWS_1252.decode_without_bom_handling_and_without_replacement(bytes)
            }
        }
    }
}

/// Decodes both exports with the first encoding under which both succeed.
pub fn decode_pair(
    open: &[u8],
    closed: &[u8],
    encodings: &[TextEncoding],
) -> Result<(TextEncoding, String, String)> {
    for encoding in encodings {
        match (encoding.decode(open), encoding.decode(closed)) {
            (Some(open_text), Some(closed_text)) => {
                tracing::info!(encoding = encoding.label(), "Decoded both sources");
                return Ok((*encoding, open_text.into_owned(), closed_text.into_owned()));
            }
            _ => {
                tracing::debug!(encoding = encoding.label(), "Encoding rejected, trying next");
            }
        }
    }
    Err(EngineError::Decoding {
        attempted: encodings.iter().map(|e| e.label().to_string()).collect(),
    })
}

/// Delimited-text export: header row first, blank lines skipped, lines with
/// more fields than the header logged and skipped.
pub struct DelimitedTextSource {
    name: String,
    text: String,
    delimiter: u8,
}

impl DelimitedTextSource {
    pub fn new(name: impl Into<String>, text: String, delimiter: u8) -> Self {
        Self {
            name: name.into(),
            text,
            delimiter,
        }
    }

    fn cell_from_field(field: &str) -> Cell {
        if field.is_empty() {
            Cell::Absent
        } else {
            Cell::Text(field.to_string())
        }
    }
}

impl RowSource for DelimitedTextSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_table(&mut self) -> Result<Table> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(self.text.as_bytes());

        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
        let width = headers.len();
        let mut table = Table::new(headers);
        let mut skipped = 0usize;

        for result in rdr.records() {
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(source = %self.name, error = %e, "Skipping unreadable line");
                    skipped += 1;
                    continue;
                }
            };
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            if record.len() == 1 && record[0].trim().is_empty() {
                continue;
            }
            if record.len() > width {
                tracing::warn!(
                    source = %self.name,
                    line,
                    expected = width,
                    found = record.len(),
                    "Skipping malformed line"
                );
                skipped += 1;
                continue;
            }

            table.push_row(record.iter().map(Self::cell_from_field).collect());
        }

        tracing::info!(source = %self.name, rows = table.len(), skipped, "Read delimited source");
        Ok(table)
    }
}
