use super::helpers::{informed, require_column};
use super::{CoercionIssue, NormalizerOptions};
use crate::error::Result;
use demandas_shared::models::columns;
use demandas_shared::utils::brazilian_format;
use demandas_shared::{Cell, Table, TableKind};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostOutcome {
    /// Rows removed because their total cost was missing or unusable.
    pub dropped: usize,
    pub issues: Vec<CoercionIssue>,
}

/// Types the closed table's total cost and drops every row left without a
/// valid amount. A missing total is not a cost of zero.
pub fn coerce_cost_column(table: &mut Table, options: &NormalizerOptions) -> Result<CostOutcome> {
    let idx = require_column(table, TableKind::Closed, columns::VLR_TOTAL)?;

    let mut issues = Vec::new();
    table.map_column(columns::VLR_TOTAL, |row, cell| match coerce_amount(cell, options) {
        Ok(Some(value)) => Cell::Number(value),
        Ok(None) => Cell::Absent,
        Err(raw) => {
            tracing::debug!(column = columns::VLR_TOTAL, row, raw = %raw, "Unparseable total cost");
            issues.push(CoercionIssue {
                table: TableKind::Closed,
                column: columns::VLR_TOTAL.to_string(),
                row,
                raw,
            });
            Cell::Absent
        }
    });

    let dropped = table.retain_rows(|row| !row[idx].is_absent());
    if dropped > 0 {
        tracing::info!(dropped, "Dropped closed demands without a valid total cost");
    }

    Ok(CostOutcome { dropped, issues })
}

/// `Ok(None)` for missing values, `Err(raw)` for values that fail to parse.
pub fn coerce_amount(cell: Cell, options: &NormalizerOptions) -> std::result::Result<Option<f64>, String> {
    match informed(cell, &options.not_informed) {
        None => Ok(None),
        Some(Cell::Number(n)) if n.is_finite() => Ok(Some(n)),
        Some(Cell::Integer(i)) => Ok(Some(i as f64)),
        Some(Cell::Text(s)) => brazilian_format::parse_decimal(&s).map(Some).map_err(|_| s),
        Some(other) => Err(other.to_string()),
    }
}
