use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal placeholder the source system writes into unset fields.
pub const NULL_SENTINEL: &str = "<Null>";

/// Standardized "explicitly unknown" text that replaces the sentinel.
pub const NOT_INFORMED: &str = "NÃO INFORMADO";

/// Column names as exported by the work-order system.
pub mod columns {
    pub const DEMANDA: &str = "DEMANDA";
    pub const DES_SOLICITACAO: &str = "DES_SOLICITACAO";
    pub const DES_INSTRUCAO: &str = "DES_INSTRUCAO";
    pub const DES_OBSERVACAO_RETAGUARDA: &str = "DES_OBSERVACAO_RETAGUARDA";
    pub const DES_EQUIPE_EXEC: &str = "DES_EQUIPE_EXEC";
    pub const DES_ANDAMENTO_EXEC: &str = "DES_ANDAMENTO_EXEC";
    pub const DAT_INICIO: &str = "DAT_INICIO";
    pub const DAT_ATUALIZACAO: &str = "DAT_ATUALIZACAO";
    pub const VLR_TOTAL: &str = "VLR_TOTAL";
    pub const COD_EQUIPE: &str = "COD_EQUIPE";
    pub const DES_EQUIPE: &str = "DES_EQUIPE";
    pub const DES_ELEMENTO: &str = "DES_ELEMENTO";
    pub const DES_ABRANGENCIA: &str = "DES_ABRANGENCIA";
    pub const DES_SITUACAO: &str = "DES_SITUACAO";

    pub const COD_CONSUMIDOR: &str = "COD_CONSUMIDOR";
    pub const COD_SITUACAO: &str = "COD_SITUACAO";
    pub const COD_OCORRENCIA: &str = "COD_OCORRENCIA";
    pub const DES_OCORRENCIA: &str = "DES_OCORRENCIA";
    pub const DES_RISCO: &str = "DES_RISCO";
    pub const FLG_CONFERIDA: &str = "FLG_CONFERIDA";

    /// Administrative columns dropped from both tables whenever present.
    pub const ADMINISTRATIVE: [&str; 6] = [
        COD_CONSUMIDOR,
        COD_SITUACAO,
        COD_OCORRENCIA,
        DES_OCORRENCIA,
        DES_RISCO,
        FLG_CONFERIDA,
    ];

    /// Columns whose sentinel cells are replaced by the "not informed" marker.
    pub const UPDATE: [&str; 6] = [
        DES_EQUIPE_EXEC,
        DES_ANDAMENTO_EXEC,
        DES_OBSERVACAO_RETAGUARDA,
        VLR_TOTAL,
        DAT_INICIO,
        DAT_ATUALIZACAO,
    ];

    pub const TEMPORAL: [&str; 2] = [DAT_INICIO, DAT_ATUALIZACAO];
}

/// A single table cell. Cells start out as raw `Text` (or typed values when
/// the source is a spreadsheet) and are narrowed by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Number(f64),
    Timestamp(NaiveDateTime),
    Absent,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Cell::Absent)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// True when the cell is text exactly equal to `token`.
    pub fn is_token(&self, token: &str) -> bool {
        self.as_text() == Some(token)
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Integer view used for identifier lookups. Accepts integer cells,
    /// integral numbers (spreadsheets store ids as floats) and numeric text.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Cell::Integer(i) => Some(*i),
            Cell::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i64),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Timestamp(ts) => write!(f, "{}", ts.format("%d/%m/%Y %H:%M")),
            Cell::Absent => Ok(()),
        }
    }
}

/// Which of the two work-order exports a table came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TableKind {
    Open,
    Closed,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Open => write!(f, "open"),
            TableKind::Closed => write!(f, "closed"),
        }
    }
}

/// Column-named table, one row per work order. Every row is kept exactly as
/// wide as the header.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Table {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut table = Table::new(headers);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Appends a row, padding short rows with `Absent` and truncating long ones.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.headers.len(), Cell::Absent);
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Iterates the cells of one column, or `None` if the column is missing.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Removes every listed column that exists and returns the names removed.
    pub fn drop_columns(&mut self, names: &[&str]) -> Vec<String> {
        let drop: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| names.contains(&h.as_str()))
            .map(|(i, _)| i)
            .collect();
        if drop.is_empty() {
            return Vec::new();
        }

        let keep = |i: &usize| !drop.contains(i);
        let removed = drop.iter().map(|&i| self.headers[i].clone()).collect();
        self.headers = self
            .headers
            .drain(..)
            .enumerate()
            .filter(|(i, _)| keep(i))
            .map(|(_, h)| h)
            .collect();
        for row in &mut self.rows {
            *row = row
                .drain(..)
                .enumerate()
                .filter(|(i, _)| keep(i))
                .map(|(_, c)| c)
                .collect();
        }
        removed
    }

    /// Rewrites every cell of `column` through `f`. Returns false if the
    /// column does not exist.
    pub fn map_column<F>(&mut self, column: &str, mut f: F) -> bool
    where
        F: FnMut(usize, Cell) -> Cell,
    {
        let Some(idx) = self.column_index(column) else {
            return false;
        };
        for (row_idx, row) in self.rows.iter_mut().enumerate() {
            let cell = std::mem::replace(&mut row[idx], Cell::Absent);
            row[idx] = f(row_idx, cell);
        }
        true
    }

    /// Keeps the rows for which `keep` returns true; returns how many were dropped.
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&[Cell]) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row.as_slice()));
        before - self.rows.len()
    }

    /// New table with the same headers and only the rows matching `pred`.
    pub fn filter<F>(&self, mut pred: F) -> Table
    where
        F: FnMut(&[Cell]) -> bool,
    {
        Table {
            headers: self.headers.clone(),
            rows: self.rows.iter().filter(|r| pred(r.as_slice())).cloned().collect(),
        }
    }
}
