use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use demandas_shared::models::columns;
use demandas_shared::{Cell, Table};

/// Option value meaning "no restriction" in the exact-match selectors.
pub const ALL_OPTION: &str = "TODOS";

/// Row predicates combined with AND. `None` (or `ALL_OPTION`) leaves a
/// selector unrestricted; blank keywords are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemandFilter {
    pub scope: Option<String>,
    pub element: Option<String>,
    pub team: Option<String>,
    pub situation: Option<String>,
    pub instruction_keyword: Option<String>,
    pub back_office_keyword: Option<String>,
    pub start_date: Option<NaiveDate>,
    /// Inclusive day; rows are kept up to the start of the following day.
    pub end_date: Option<NaiveDate>,
}

impl DemandFilter {
    pub fn apply(&self, table: &Table) -> Table {
        let exact = [
            (columns::DES_ABRANGENCIA, &self.scope),
            (columns::DES_ELEMENTO, &self.element),
            (columns::DES_EQUIPE, &self.team),
            (columns::DES_SITUACAO, &self.situation),
        ];
        let exact: Vec<(Option<usize>, &str)> = exact
            .iter()
            .filter_map(|(column, value)| {
                value
                    .as_deref()
                    .filter(|v| *v != ALL_OPTION)
                    .map(|v| (table.column_index(column), v))
            })
            .collect();

        let keywords = [
            (columns::DES_INSTRUCAO, &self.instruction_keyword),
            (columns::DES_OBSERVACAO_RETAGUARDA, &self.back_office_keyword),
        ];
        let keywords: Vec<(Option<usize>, String)> = keywords
            .iter()
            .filter_map(|(column, value)| {
                value
                    .as_deref()
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| (table.column_index(column), v.to_lowercase()))
            })
            .collect();

        let (from, until) = self.bounds();
        let start_idx = table.column_index(columns::DAT_INICIO);

        table.filter(|row| {
            let exact_ok = exact.iter().all(|(idx, expected)| {
                idx.map_or(false, |i| !row[i].is_absent() && row[i].to_string() == *expected)
            });
            let keywords_ok = keywords.iter().all(|(idx, needle)| {
                idx.map_or(false, |i| contains_ignore_case(&row[i], needle))
            });
            let dates_ok = if from.is_none() && until.is_none() {
                true
            } else {
                match start_idx.and_then(|i| row[i].as_timestamp()) {
                    Some(ts) => from.map_or(true, |f| ts >= f) && until.map_or(true, |u| ts < u),
                    None => false,
                }
            };
            exact_ok && keywords_ok && dates_ok
        })
    }

    /// `[start 00:00, end + 1 day 00:00)`.
    fn bounds(&self) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
        let from = self.start_date.map(|d| d.and_time(NaiveTime::MIN));
        let until = self
            .end_date
            .and_then(|d| d.succ_opt())
            .map(|d| d.and_time(NaiveTime::MIN));
        (from, until)
    }
}

fn contains_ignore_case(cell: &Cell, needle_lower: &str) -> bool {
    match cell {
        Cell::Absent => false,
        other => other.to_string().to_lowercase().contains(needle_lower),
    }
}

/// Distinct present values of `column` in first-seen order, `ALL_OPTION` first.
pub fn filter_options(table: &Table, column: &str) -> Vec<String> {
    let mut options = vec![ALL_OPTION.to_string()];
    if let Some(cells) = table.column(column) {
        for cell in cells.filter(|c| !c.is_absent()) {
            let value = cell.to_string();
            if !options[1..].contains(&value) {
                options.push(value);
            }
        }
    }
    options
}

/// Terminal situations offered even when no row currently carries them.
pub const TERMINAL_SITUATIONS: [&str; 2] = ["CANCELADO", "CONCLUIDO"];

/// Options for the situation selector: `ALL_OPTION`, the terminal
/// situations, then the observed values not already listed.
pub fn situation_options(table: &Table) -> Vec<String> {
    let mut options = vec![ALL_OPTION.to_string()];
    options.extend(TERMINAL_SITUATIONS.iter().map(|s| s.to_string()));
    for value in filter_options(table, columns::DES_SITUACAO).into_iter().skip(1) {
        if !options.contains(&value) {
            options.push(value);
        }
    }
    options
}

/// Rows whose demand identifier equals `id`.
pub fn find_demand(table: &Table, id: i64) -> Table {
    match table.column_index(columns::DEMANDA) {
        Some(idx) => table.filter(|row| row[idx].as_integer() == Some(id)),
        None => table.filter(|_| false),
    }
}

/// Earliest and latest start dates, the default range for the date filter.
pub fn date_bounds(table: &Table) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = table
        .column(columns::DAT_INICIO)?
        .filter_map(Cell::as_timestamp)
        .map(|ts| ts.date());
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

/// Whole days from start to last update per row, floored like a timedelta's
/// day component. `None` when either timestamp is absent.
pub fn delay_days(table: &Table) -> Vec<Option<i64>> {
    let start = table.column_index(columns::DAT_INICIO);
    let update = table.column_index(columns::DAT_ATUALIZACAO);
    table
        .rows()
        .iter()
        .map(|row| {
            let s = row[start?].as_timestamp()?;
            let u = row[update?].as_timestamp()?;
            Some((u - s).num_seconds().div_euclid(86_400))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Cell {
        Cell::Timestamp(NaiveDateTime::parse_from_str(s, "%d/%m/%Y %H:%M").unwrap())
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%d/%m/%Y").unwrap()
    }

    fn demands() -> Table {
        Table::from_rows(
            vec![
                "DEMANDA".to_string(),
                "DES_EQUIPE".to_string(),
                "DES_ELEMENTO".to_string(),
                "DES_INSTRUCAO".to_string(),
                "DES_OBSERVACAO_RETAGUARDA".to_string(),
                "DAT_INICIO".to_string(),
                "DAT_ATUALIZACAO".to_string(),
            ],
            vec![
                vec![
                    Cell::text("1"),
                    Cell::text("EQUIPE A"),
                    Cell::text("BOMBA"),
                    Cell::text("Trocar rolamento do motor"),
                    Cell::text("NÃO INFORMADO"),
                    ts("01/03/2024 08:00"),
                    ts("03/03/2024 07:00"),
                ],
                vec![
                    Cell::Number(2.0),
                    Cell::text("EQUIPE B"),
                    Cell::text("VALVULA"),
                    Cell::Absent,
                    Cell::text("aguardando peça"),
                    ts("15/03/2024 23:59"),
                    Cell::Absent,
                ],
                vec![
                    Cell::Integer(3),
                    Cell::text("EQUIPE A"),
                    Cell::text("VALVULA"),
                    Cell::text("MOTOR queimado"),
                    Cell::Absent,
                    Cell::Absent,
                    ts("01/04/2024 10:00"),
                ],
            ],
        )
    }

    #[test]
    fn test_no_predicates_keeps_everything() {
        let table = demands();
        assert_eq!(DemandFilter::default().apply(&table), table);
    }

    #[test]
    fn test_exact_match_and_all_option() {
        let filter = DemandFilter {
            team: Some("EQUIPE A".to_string()),
            element: Some(ALL_OPTION.to_string()),
            ..DemandFilter::default()
        };
        let result = filter.apply(&demands());
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_keyword_is_case_insensitive_and_skips_absent() {
        let filter = DemandFilter {
            instruction_keyword: Some("motor".to_string()),
            ..DemandFilter::default()
        };
        let result = filter.apply(&demands());
        assert_eq!(result.len(), 2);

        let filter = DemandFilter {
            back_office_keyword: Some("PEÇA".to_string()),
            ..DemandFilter::default()
        };
        let result = filter.apply(&demands());
        assert_eq!(result.len(), 1);
        assert_eq!(result.get(0, "DES_EQUIPE"), Some(&Cell::text("EQUIPE B")));
    }

    #[test]
    fn test_end_date_includes_whole_day() {
        let filter = DemandFilter {
            start_date: Some(date("01/03/2024")),
            end_date: Some(date("15/03/2024")),
            ..DemandFilter::default()
        };
        assert_eq!(filter.apply(&demands()).len(), 2);

        let filter = DemandFilter {
            end_date: Some(date("14/03/2024")),
            ..DemandFilter::default()
        };
        assert_eq!(filter.apply(&demands()).len(), 1);
    }

    #[test]
    fn test_missing_filter_column_matches_nothing() {
        let filter = DemandFilter {
            scope: Some("CENTRO".to_string()),
            ..DemandFilter::default()
        };
        assert!(filter.apply(&demands()).is_empty());
    }

    #[test]
    fn test_filter_options() {
        assert_eq!(
            filter_options(&demands(), "DES_ELEMENTO"),
            vec!["TODOS", "BOMBA", "VALVULA"]
        );
        assert_eq!(filter_options(&demands(), "MISSING"), vec!["TODOS"]);
    }

    #[test]
    fn test_situation_options_include_terminal_states() {
        let table = Table::from_rows(
            vec!["DES_SITUACAO".to_string()],
            vec![
                vec![Cell::text("EM EXECUCAO")],
                vec![Cell::text("CONCLUIDO")],
                vec![Cell::Absent],
            ],
        );
        assert_eq!(
            situation_options(&table),
            vec!["TODOS", "CANCELADO", "CONCLUIDO", "EM EXECUCAO"]
        );
        assert_eq!(
            situation_options(&Table::default()),
            vec!["TODOS", "CANCELADO", "CONCLUIDO"]
        );
    }

    #[test]
    fn test_find_demand_across_cell_types() {
        let table = demands();
        assert_eq!(find_demand(&table, 1).len(), 1);
        assert_eq!(find_demand(&table, 2).len(), 1);
        assert_eq!(find_demand(&table, 3).len(), 1);
        assert!(find_demand(&table, 99).is_empty());
    }

    #[test]
    fn test_date_bounds() {
        assert_eq!(
            date_bounds(&demands()),
            Some((date("01/03/2024"), date("15/03/2024")))
        );
        let empty = Table::new(vec!["DAT_INICIO".to_string()]);
        assert_eq!(date_bounds(&empty), None);
    }

    #[test]
    fn test_delay_days_floors() {
        assert_eq!(delay_days(&demands()), vec![Some(1), None, None]);

        let backwards = Table::from_rows(
            vec!["DAT_INICIO".to_string(), "DAT_ATUALIZACAO".to_string()],
            vec![vec![ts("02/03/2024 12:00"), ts("02/03/2024 11:00")]],
        );
        assert_eq!(delay_days(&backwards), vec![Some(-1)]);
    }
}
