//! ORDER BY modifier.

use super::{Limitable, QueryPart, SelectStage, Wrappable, build_after};
use crate::error::StmtResult;
use crate::value::Value;

/// `ORDER BY <column> [DESC], ...`
#[derive(Clone, Debug)]
pub struct OrderBy<P> {
    parent: P,
    terms: Vec<(String, bool)>,
}

impl<P: SelectStage> OrderBy<P> {
    pub(crate) fn new(parent: P, column: &str, descending: bool) -> Self {
        Self {
            parent,
            terms: vec![(column.to_string(), descending)],
        }
    }

    /// Add a secondary ascending sort key.
    pub fn then_by(mut self, column: &str) -> Self {
        self.terms.push((column.to_string(), false));
        self
    }

    /// Add a secondary descending sort key.
    pub fn then_by_desc(mut self, column: &str) -> Self {
        self.terms.push((column.to_string(), true));
        self
    }
}

impl<P: SelectStage> QueryPart for OrderBy<P> {
    fn build(&self) -> StmtResult<(String, Vec<Value>)> {
        build_after(&self.parent, |_| {
            let terms: Vec<String> = self
                .terms
                .iter()
                .map(|(column, descending)| {
                    if *descending {
                        format!("{column} DESC")
                    } else {
                        column.clone()
                    }
                })
                .collect();
            Ok((format!("ORDER BY {}", terms.join(", ")), Vec::new()))
        })
    }
}

impl<P: SelectStage> Limitable for OrderBy<P> {}
impl<P: SelectStage> Wrappable for OrderBy<P> {}
