use demandas_shared::models::columns;
use demandas_shared::Table;

/// Drops the administrative columns wherever present and returns the names
/// actually removed. Other columns and row order are untouched.
pub fn prune_columns(table: &mut Table) -> Vec<String> {
    table.drop_columns(&columns::ADMINISTRATIVE)
}
