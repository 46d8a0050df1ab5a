//! RETURNING modifier.

use super::{QueryPart, build_after};
use crate::error::{StmtError, StmtResult};
use crate::value::Value;

/// `RETURNING <columns>`
#[derive(Clone, Debug)]
pub struct Returning<P> {
    parent: P,
    columns: Vec<String>,
}

impl<P: QueryPart> Returning<P> {
    pub(crate) fn new<I, S>(parent: P, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parent,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl<P: QueryPart> QueryPart for Returning<P> {
    fn build(&self) -> StmtResult<(String, Vec<Value>)> {
        if self.columns.is_empty() {
            return Err(StmtError::validation("RETURNING requires at least one column"));
        }
        build_after(&self.parent, |_| {
            Ok((format!("RETURNING {}", self.columns.join(", ")), Vec::new()))
        })
    }
}
