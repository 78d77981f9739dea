// Entry points that read the two exports and run the normalizer over them.
use super::{normalize_tables, Normalized, NormalizerOptions};
use crate::config::Settings;
use crate::data::cache::NormalizationCache;
use crate::data::csv_parser::{decode_pair, DelimitedTextSource};
use crate::data::source::{RowSource, SourceFormat};
use crate::data::spreadsheet::SpreadsheetSource;
use crate::error::{EngineError, Result};
use std::path::Path;

/// Reads both sources and normalizes them. Returns the closed table first.
pub fn load_and_normalize<O, C>(
    open: &mut O,
    closed: &mut C,
    options: &NormalizerOptions,
) -> Result<Normalized>
where
    O: RowSource + ?Sized,
    C: RowSource + ?Sized,
{
    let open_table = open.read_table()?;
    let closed_table = closed.read_table()?;
    tracing::info!(
        open = open.name(),
        closed = closed.name(),
        open_rows = open_table.len(),
        closed_rows = closed_table.len(),
        "Loaded sources"
    );
    normalize_tables(open_table, closed_table, options)
}

/// Normalizes two raw exports of the same format. Delimited sources are
/// decoded with the first configured encoding that works for both.
pub fn load_and_normalize_bytes(
    format: SourceFormat,
    open: &[u8],
    closed: &[u8],
    settings: &Settings,
    cache: Option<&mut NormalizationCache>,
) -> Result<Normalized> {
    settings.validate()?;
    let options = settings.normalizer_options();
    let encodings = settings.text_encodings()?;

    let delimiter = settings.delimiter.to_string();
    let key = cache.as_ref().map(|_| {
        let mut read_params: Vec<&str> = encodings.iter().map(|e| e.label()).collect();
        read_params.push(&delimiter);
        NormalizationCache::key(format, open, closed, &options, &read_params)
    });
    if let (Some(cache), Some(key)) = (cache.as_deref(), key.as_deref()) {
        if let Some(hit) = cache.get(key) {
            tracing::debug!(format = format.tag(), "Reusing memoized normalization");
            return Ok(hit.clone());
        }
    }

    let normalized = match format {
        SourceFormat::Delimited => {
            let (encoding, open_text, closed_text) = decode_pair(open, closed, &encodings)?;
            let delimiter = settings.delimiter_byte();
            let mut open_source = DelimitedTextSource::new("open", open_text, delimiter);
            let mut closed_source = DelimitedTextSource::new("closed", closed_text, delimiter);
            let mut normalized = load_and_normalize(&mut open_source, &mut closed_source, &options)?;
            normalized.encoding = Some(encoding);
            normalized
        }
        SourceFormat::Spreadsheet => {
            let mut open_source = SpreadsheetSource::new("open", open.to_vec());
            let mut closed_source = SpreadsheetSource::new("closed", closed.to_vec());
            load_and_normalize(&mut open_source, &mut closed_source, &options)?
        }
    };

    if let (Some(cache), Some(key)) = (cache, key) {
        cache.insert(key, normalized.clone());
    }
    Ok(normalized)
}

/// Reads both files from disk. The format comes from `format` when given,
/// otherwise from the file extensions, which must agree.
pub fn load_and_normalize_files(
    open_path: &Path,
    closed_path: &Path,
    format: Option<SourceFormat>,
    settings: &Settings,
    cache: Option<&mut NormalizationCache>,
) -> Result<Normalized> {
    let format = match format {
        Some(f) => f,
        None => detect_format(open_path, closed_path)?,
    };
    tracing::info!(
        open = %open_path.display(),
        closed = %closed_path.display(),
        format = format.tag(),
        "Reading demand exports"
    );

    let open = std::fs::read(open_path)?;
    let closed = std::fs::read(closed_path)?;
    load_and_normalize_bytes(format, &open, &closed, settings, cache)
}

fn detect_format(open_path: &Path, closed_path: &Path) -> Result<SourceFormat> {
    match (
        SourceFormat::from_path(open_path),
        SourceFormat::from_path(closed_path),
    ) {
        (Some(a), Some(b)) if a == b => Ok(a),
        (Some(a), Some(b)) => Err(EngineError::ConfigError(format!(
            "sources must share a format, got {} and {}",
            a.tag(),
            b.tag()
        ))),
        _ => Err(EngineError::ConfigError(format!(
            "cannot tell the format of '{}' / '{}' from the extension",
            open_path.display(),
            closed_path.display()
        ))),
    }
}
