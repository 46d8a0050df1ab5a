//! UPDATE root.

use super::fields::{FieldList, FieldValue};
use super::{Filterable, QueryPart, Returnable};
use crate::error::{StmtError, StmtResult};
use crate::value::Value;

/// `UPDATE <table> SET <col> = <value>, ...`
#[derive(Clone, Debug)]
pub struct Update {
    table: String,
    fields: FieldList,
}

impl Update {
    pub(crate) fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            fields: FieldList::default(),
        }
    }

    /// Set a column to a bound value.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.fields.push(column, FieldValue::Bind(value.into()));
        self
    }

    /// Set an optional column value (None => skip).
    pub fn set_opt<T: Into<Value>>(self, column: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Set a raw SQL expression, e.g. `balance + 10`.
    pub fn set_raw(mut self, column: &str, sql: &str) -> Self {
        self.fields.push(column, FieldValue::Raw(sql.to_string()));
        self
    }
}

impl QueryPart for Update {
    fn build(&self) -> StmtResult<(String, Vec<Value>)> {
        if self.fields.is_empty() {
            return Err(StmtError::validation(format!(
                "UPDATE of '{}' requires at least one field",
                self.table
            )));
        }
        let (assignments, args) = self.fields.assignments(0);
        Ok((format!("UPDATE {} SET {assignments}", self.table), args))
    }
}

impl Filterable for Update {}
impl Returnable for Update {}
