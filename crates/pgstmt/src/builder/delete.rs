//! DELETE root.

use super::{Filterable, QueryPart, Returnable};
use crate::error::{StmtError, StmtResult};
use crate::value::Value;

/// `DELETE FROM <table>`
#[derive(Clone, Debug)]
pub struct Delete {
    table: String,
}

impl Delete {
    pub(crate) fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
        }
    }
}

impl QueryPart for Delete {
    fn build(&self) -> StmtResult<(String, Vec<Value>)> {
        if self.table.trim().is_empty() {
            return Err(StmtError::validation("DELETE requires a table"));
        }
        Ok((format!("DELETE FROM {}", self.table), Vec::new()))
    }
}

impl Filterable for Delete {}
impl Returnable for Delete {}
