//! SELECT root.

use super::{Filterable, Joinable, Limitable, Orderable, QueryPart, SelectStage, Wrappable};
use crate::error::{StmtError, StmtResult};
use crate::paginate::Paginate;
use crate::value::Value;

/// `SELECT [DISTINCT] <columns> FROM <table>`, or `SELECT COUNT(*) FROM <table>`.
#[derive(Clone, Debug)]
pub struct Select {
    /// Table or FROM expression
    table: String,
    /// SELECT columns, in order
    columns: Vec<String>,
    distinct: bool,
    count: bool,
}

impl Select {
    pub(crate) fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            distinct: false,
            count: false,
        }
    }

    pub(crate) fn count(table: &str) -> Self {
        Self {
            count: true,
            ..Self::new(table)
        }
    }

    /// Add one column (or expression such as `t.col AS alias`).
    pub fn column(mut self, column: &str) -> Self {
        self.columns.push(column.to_string());
        self
    }

    /// Add several columns.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Emit `SELECT DISTINCT`.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }
}

impl QueryPart for Select {
    fn build(&self) -> StmtResult<(String, Vec<Value>)> {
        if self.table.trim().is_empty() {
            return Err(StmtError::validation("SELECT requires a table"));
        }

        let distinct = if self.distinct { "DISTINCT " } else { "" };
        if self.count {
            return Ok((
                format!("SELECT {distinct}COUNT(*) FROM {}", self.table),
                Vec::new(),
            ));
        }

        if self.columns.is_empty() {
            return Err(StmtError::validation(format!(
                "SELECT from '{}' requires at least one column",
                self.table
            )));
        }

        Ok((
            format!(
                "SELECT {distinct}{} FROM {}",
                self.columns.join(", "),
                self.table
            ),
            Vec::new(),
        ))
    }
}

impl SelectStage for Select {}
impl Filterable for Select {}
impl Joinable for Select {}
impl Orderable for Select {}
impl Limitable for Select {}
impl Wrappable for Select {}
impl Paginate for Select {}
