//! LIMIT / OFFSET modifier.

use super::{QueryPart, Wrappable, build_after};
use crate::error::{StmtError, StmtResult};
use crate::value::Value;

/// `LIMIT $n` and/or `OFFSET $n`. Both bounds are bound parameters.
#[derive(Clone, Debug)]
pub struct Limit<P> {
    parent: P,
    max_count: Option<i64>,
    start_index: Option<i64>,
}

impl<P: QueryPart> Limit<P> {
    pub(crate) fn new(parent: P, max_count: Option<i64>, start_index: Option<i64>) -> Self {
        Self {
            parent,
            max_count,
            start_index,
        }
    }

    /// Set or replace the row cap.
    pub fn limit(mut self, max_count: i64) -> Self {
        self.max_count = Some(max_count);
        self
    }

    /// Set or replace the number of rows to skip.
    pub fn offset(mut self, start_index: i64) -> Self {
        self.start_index = Some(start_index);
        self
    }
}

impl<P: QueryPart> QueryPart for Limit<P> {
    fn build(&self) -> StmtResult<(String, Vec<Value>)> {
        if self.max_count.is_none() && self.start_index.is_none() {
            return Err(StmtError::validation(
                "LIMIT clause needs a max count, a start index, or both",
            ));
        }
        for (name, bound) in [("max count", self.max_count), ("start index", self.start_index)] {
            if let Some(n) = bound.filter(|n| *n < 0) {
                return Err(StmtError::validation(format!(
                    "LIMIT {name} must be >= 0, got {n}"
                )));
            }
        }

        build_after(&self.parent, |base_index| {
            let mut parts = Vec::with_capacity(2);
            let mut args = Vec::with_capacity(2);
            if let Some(n) = self.max_count {
                args.push(Value::Int(n));
                parts.push(format!("LIMIT ${}", base_index + args.len()));
            }
            if let Some(n) = self.start_index {
                args.push(Value::Int(n));
                parts.push(format!("OFFSET ${}", base_index + args.len()));
            }
            Ok((parts.join(" "), args))
        })
    }
}

impl<P: QueryPart> Wrappable for Limit<P> {}
