use demandas_shared::{Cell, Table};

/// Replaces cells exactly equal to `sentinel` with `replacement` in each of
/// `columns` that exists. Literal text comparison only, no typing. Returns
/// the number of cells replaced.
pub fn substitute_null_sentinel(
    table: &mut Table,
    columns: &[&str],
    sentinel: &str,
    replacement: &str,
) -> usize {
    let mut replaced = 0;
    for column in columns {
        table.map_column(column, |_, cell| {
            if cell.is_token(sentinel) {
                replaced += 1;
                Cell::text(replacement)
            } else {
                cell
            }
        });
    }
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use demandas_shared::models::columns;
    use demandas_shared::{NOT_INFORMED, NULL_SENTINEL};

    #[test]
    fn test_designated_columns_only() {
        let mut table = Table::from_rows(
            vec![
                "DEMANDA".to_string(),
                "DES_EQUIPE_EXEC".to_string(),
                "DES_SOLICITACAO".to_string(),
            ],
            vec![
                vec![Cell::text("1"), Cell::text(NULL_SENTINEL), Cell::text(NULL_SENTINEL)],
                vec![Cell::text("2"), Cell::text("EQUIPE A"), Cell::Absent],
            ],
        );
        let replaced =
            substitute_null_sentinel(&mut table, &columns::UPDATE, NULL_SENTINEL, NOT_INFORMED);
        assert_eq!(replaced, 1);
        assert_eq!(table.get(0, "DES_EQUIPE_EXEC"), Some(&Cell::text(NOT_INFORMED)));
        assert_eq!(table.get(0, "DES_SOLICITACAO"), Some(&Cell::text(NULL_SENTINEL)));
        assert_eq!(table.get(1, "DES_EQUIPE_EXEC"), Some(&Cell::text("EQUIPE A")));
        assert_eq!(table.get(1, "DES_SOLICITACAO"), Some(&Cell::Absent));
    }

    #[test]
    fn test_only_exact_token_matches() {
        let mut table = Table::from_rows(
            vec!["VLR_TOTAL".to_string()],
            vec![
                vec![Cell::text("<null>")],
                vec![Cell::text(" <Null>")],
                vec![Cell::text("<Null>")],
            ],
        );
        let replaced =
            substitute_null_sentinel(&mut table, &columns::UPDATE, NULL_SENTINEL, NOT_INFORMED);
        assert_eq!(replaced, 1);
        assert_eq!(table.get(0, "VLR_TOTAL"), Some(&Cell::text("<null>")));
        assert_eq!(table.get(2, "VLR_TOTAL"), Some(&Cell::text(NOT_INFORMED)));
    }

    #[test]
    fn test_missing_columns_are_skipped() {
        let mut table = Table::new(vec!["DEMANDA".to_string()]);
        assert_eq!(
            substitute_null_sentinel(&mut table, &columns::UPDATE, NULL_SENTINEL, NOT_INFORMED),
            0
        );
    }
}
