// Helpers shared by the normalizer steps
use crate::error::{EngineError, Result};
use demandas_shared::{Cell, Table, TableKind};

/// Boundary between marker-aware text and typed values: the "not informed"
/// marker and absent cells both collapse to `None`, everything else is
/// handed on for typing.
pub fn informed(cell: Cell, not_informed: &str) -> Option<Cell> {
    match cell {
        Cell::Absent => None,
        Cell::Text(ref s) if s == not_informed => None,
        other => Some(other),
    }
}

/// Index of a column the rest of the pipeline cannot do without.
pub fn require_column(table: &Table, kind: TableKind, column: &str) -> Result<usize> {
    table
        .column_index(column)
        .ok_or_else(|| EngineError::MalformedSource {
            table: kind,
            column: column.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use demandas_shared::NOT_INFORMED;

    #[test]
    fn test_informed_collapses_marker_and_absent() {
        assert_eq!(informed(Cell::text(NOT_INFORMED), NOT_INFORMED), None);
        assert_eq!(informed(Cell::Absent, NOT_INFORMED), None);
        assert_eq!(
            informed(Cell::text("10/01/2024 08:00"), NOT_INFORMED),
            Some(Cell::text("10/01/2024 08:00"))
        );
        assert_eq!(informed(Cell::Number(1.5), NOT_INFORMED), Some(Cell::Number(1.5)));
    }

    #[test]
    fn test_require_column() {
        let table = Table::new(vec!["DEMANDA".to_string()]);
        assert_eq!(require_column(&table, TableKind::Open, "DEMANDA").unwrap(), 0);
        let err = require_column(&table, TableKind::Closed, "VLR_TOTAL").unwrap_err();
        assert!(matches!(
            err,
            EngineError::MalformedSource { table: TableKind::Closed, ref column } if column == "VLR_TOTAL"
        ));
    }
}
