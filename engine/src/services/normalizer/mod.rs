// engine/src/services/normalizer/mod.rs
// The Demand Table Normalizer: turns the raw open and closed exports into
// cleaned tables. Each step lives in its own sibling module; this file holds
// the shared types and the step ordering.

use crate::data::csv_parser::TextEncoding;
use crate::error::Result;
use demandas_shared::models::columns;
use demandas_shared::{Table, TableKind, NOT_INFORMED, NULL_SENTINEL};
use serde::{Deserialize, Serialize};

pub mod coerce_cost;
pub mod coerce_temporal;
pub mod helpers;
pub mod load_and_normalize;
pub mod prune_columns;
pub mod substitute_null_sentinel;

pub use coerce_cost::{coerce_cost_column, CostOutcome};
pub use coerce_temporal::coerce_temporal_columns;
pub use load_and_normalize::{load_and_normalize, load_and_normalize_bytes, load_and_normalize_files};
pub use prune_columns::prune_columns;
pub use substitute_null_sentinel::substitute_null_sentinel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerOptions {
    pub null_sentinel: String,
    pub not_informed: String,
    pub datetime_format: String,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        NormalizerOptions {
            null_sentinel: NULL_SENTINEL.to_string(),
            not_informed: NOT_INFORMED.to_string(),
            datetime_format: "%d/%m/%Y %H:%M".to_string(),
        }
    }
}

/// A cell that could not be typed. Never an error: the cell ends up absent
/// (or its row dropped) and the issue is kept for the caller to surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoercionIssue {
    pub table: TableKind,
    pub column: String,
    /// Zero-based data row, counted before any rows were dropped.
    pub row: usize,
    pub raw: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableReport {
    pub pruned_columns: Vec<String>,
    pub sentinel_substitutions: usize,
    /// Absent cells per temporal column in the final table.
    pub absent_timestamps: Vec<(String, usize)>,
    pub dropped_rows: usize,
    pub issues: Vec<CoercionIssue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationReport {
    pub open: TableReport,
    pub closed: TableReport,
}

impl NormalizationReport {
    /// Cells that held a value which could not be typed.
    pub fn unusable_values(&self) -> usize {
        self.open.issues.len() + self.closed.issues.len()
    }

    pub fn dropped_rows(&self) -> usize {
        self.open.dropped_rows + self.closed.dropped_rows
    }

    pub fn is_clean(&self) -> bool {
        self.unusable_values() == 0 && self.dropped_rows() == 0
    }
}

/// Output of a normalization run. The closed table comes first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub closed: Table,
    pub open: Table,
    pub report: NormalizationReport,
    /// Encoding chosen for delimited sources; `None` for spreadsheets.
    pub encoding: Option<TextEncoding>,
}

impl Normalized {
    /// `(closed, open)`.
    pub fn into_tables(self) -> (Table, Table) {
        (self.closed, self.open)
    }
}

/// Runs every step over both tables. Pure: no I/O, no cache.
pub fn normalize_tables(open: Table, closed: Table, options: &NormalizerOptions) -> Result<Normalized> {
    helpers::require_column(&open, TableKind::Open, columns::DEMANDA)?;
    helpers::require_column(&closed, TableKind::Closed, columns::DEMANDA)?;
    helpers::require_column(&closed, TableKind::Closed, columns::VLR_TOTAL)?;

    let (open, open_report) = normalize_table(open, TableKind::Open, options)?;
    let (closed, closed_report) = normalize_table(closed, TableKind::Closed, options)?;

    tracing::info!(
        open_rows = open.len(),
        closed_rows = closed.len(),
        dropped = closed_report.dropped_rows,
        unusable = open_report.issues.len() + closed_report.issues.len(),
        "Normalization finished"
    );

    Ok(Normalized {
        closed,
        open,
        report: NormalizationReport {
            open: open_report,
            closed: closed_report,
        },
        encoding: None,
    })
}

fn normalize_table(
    mut table: Table,
    kind: TableKind,
    options: &NormalizerOptions,
) -> Result<(Table, TableReport)> {
    let mut report = TableReport {
        pruned_columns: prune_columns(&mut table),
        ..TableReport::default()
    };
    report.sentinel_substitutions = substitute_null_sentinel(
        &mut table,
        &columns::UPDATE,
        &options.null_sentinel,
        &options.not_informed,
    );
    report.issues = coerce_temporal_columns(&mut table, kind, options);

    if kind == TableKind::Closed {
        let outcome = coerce_cost_column(&mut table, options)?;
        report.dropped_rows = outcome.dropped;
        report.issues.extend(outcome.issues);
    }

    report.absent_timestamps = columns::TEMPORAL
        .iter()
        .filter_map(|name| {
            table
                .column(name)
                .map(|cells| (name.to_string(), cells.filter(|c| c.is_absent()).count()))
        })
        .collect();

    tracing::debug!(
        table = %kind,
        pruned = report.pruned_columns.len(),
        substitutions = report.sentinel_substitutions,
        "Table normalized"
    );
    Ok((table, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use demandas_shared::Cell;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn raw_open() -> Table {
        Table::from_rows(
            headers(&["DEMANDA", "COD_SITUACAO", "DES_EQUIPE_EXEC", "DAT_INICIO", "DAT_ATUALIZACAO"]),
            vec![
                vec![
                    Cell::text("1"),
                    Cell::text("7"),
                    Cell::text("<Null>"),
                    Cell::text("03/04/2024 14:30"),
                    Cell::text("<Null>"),
                ],
                vec![
                    Cell::text("2"),
                    Cell::text("7"),
                    Cell::text("EQUIPE B"),
                    Cell::text("sem data"),
                    Cell::text("05/04/2024 09:00"),
                ],
            ],
        )
    }

    fn raw_closed() -> Table {
        Table::from_rows(
            headers(&["DEMANDA", "FLG_CONFERIDA", "VLR_TOTAL", "DAT_INICIO"]),
            vec![
                vec![Cell::text("10"), Cell::text("S"), Cell::text("1.234,56"), Cell::text("01/02/2024 08:00")],
                vec![Cell::text("11"), Cell::text("N"), Cell::text("<Null>"), Cell::text("<Null>")],
                vec![Cell::text("12"), Cell::text("N"), Cell::text("x"), Cell::Absent],
            ],
        )
    }

    #[test]
    fn test_full_pipeline() {
        let normalized =
            normalize_tables(raw_open(), raw_closed(), &NormalizerOptions::default()).unwrap();

        let open = &normalized.open;
        assert!(!open.has_column("COD_SITUACAO"));
        assert_eq!(open.get(0, "DES_EQUIPE_EXEC"), Some(&Cell::text("NÃO INFORMADO")));
        assert!(open.get(0, "DAT_INICIO").unwrap().as_timestamp().is_some());
        assert_eq!(open.get(0, "DAT_ATUALIZACAO"), Some(&Cell::Absent));
        assert_eq!(open.get(1, "DAT_INICIO"), Some(&Cell::Absent));

        let closed = &normalized.closed;
        assert!(!closed.has_column("FLG_CONFERIDA"));
        assert_eq!(closed.len(), 1);
        assert_eq!(closed.get(0, "VLR_TOTAL"), Some(&Cell::Number(1234.56)));

        let report = &normalized.report;
        assert_eq!(report.open.pruned_columns, vec!["COD_SITUACAO".to_string()]);
        assert_eq!(report.open.sentinel_substitutions, 2);
        assert_eq!(report.open.issues.len(), 1);
        assert_eq!(
            report.open.absent_timestamps,
            vec![("DAT_INICIO".to_string(), 1), ("DAT_ATUALIZACAO".to_string(), 1)]
        );
        assert_eq!(report.closed.dropped_rows, 2);
        assert_eq!(report.closed.sentinel_substitutions, 2);
        assert_eq!(report.unusable_values(), 2);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_into_tables_is_closed_first() {
        let normalized =
            normalize_tables(raw_open(), raw_closed(), &NormalizerOptions::default()).unwrap();
        let (closed, open) = normalized.into_tables();
        assert!(closed.has_column("VLR_TOTAL"));
        assert!(!open.has_column("VLR_TOTAL"));
    }

    #[test]
    fn test_missing_identifier_is_malformed() {
        let open = Table::new(headers(&["DES_SOLICITACAO"]));
        let err = normalize_tables(open, raw_closed(), &NormalizerOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::MalformedSource { table: TableKind::Open, ref column } if column == "DEMANDA"
        ));
    }

    #[test]
    fn test_missing_cost_column_fails_instead_of_empty_table() {
        let closed = Table::from_rows(headers(&["DEMANDA"]), vec![vec![Cell::text("1")]]);
        let err = normalize_tables(raw_open(), closed, &NormalizerOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::MalformedSource { table: TableKind::Closed, ref column } if column == "VLR_TOTAL"
        ));
        assert!(!err.is_unreadable_source());
    }
}
