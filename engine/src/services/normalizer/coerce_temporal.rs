use super::helpers::informed;
use super::{CoercionIssue, NormalizerOptions};
use chrono::{Datelike, NaiveDateTime};
use demandas_shared::models::columns;
use demandas_shared::{Cell, Table, TableKind};

/// Parses the start and update columns into timestamps. The "not informed"
/// marker and any value that does not match the day-first format become
/// `Absent`; unparseable text is reported, never raised. Cells that already
/// hold a timestamp are kept, so running this twice changes nothing.
pub fn coerce_temporal_columns(
    table: &mut Table,
    kind: TableKind,
    options: &NormalizerOptions,
) -> Vec<CoercionIssue> {
    let mut issues = Vec::new();
    for column in columns::TEMPORAL {
        table.map_column(column, |row, cell| {
            match coerce_timestamp(cell, options) {
                Ok(Some(ts)) => Cell::Timestamp(ts),
                Ok(None) => Cell::Absent,
                Err(raw) => {
                    tracing::debug!(table = %kind, column, row, raw = %raw, "Unparseable timestamp");
                    issues.push(CoercionIssue {
                        table: kind,
                        column: column.to_string(),
                        row,
                        raw,
                    });
                    Cell::Absent
                }
            }
        });
    }
    issues
}

/// `Ok(None)` for missing values, `Err(raw)` for values that fail to parse.
/// `%Y` accepts any digit count, so years outside four digits ("24") are
/// rejected after parsing.
pub fn coerce_timestamp(
    cell: Cell,
    options: &NormalizerOptions,
) -> Result<Option<NaiveDateTime>, String> {
    match informed(cell, &options.not_informed) {
        None => Ok(None),
        Some(Cell::Timestamp(ts)) => Ok(Some(ts)),
        Some(Cell::Text(s)) => NaiveDateTime::parse_from_str(s.trim(), &options.datetime_format)
            .ok()
            .filter(|ts| (1000..=9999).contains(&ts.year()))
            .map(Some)
            .ok_or(s),
        Some(other) => Err(other.to_string()),
    }
}
