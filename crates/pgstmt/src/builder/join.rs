//! JOIN modifier.

use super::{
    Filterable, Joinable, Limitable, Orderable, QueryPart, SelectStage, Wrappable, build_after,
};
use crate::error::{StmtError, StmtResult};
use crate::paginate::Paginate;
use crate::value::Value;
use std::fmt;

/// Join flavor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Outer,
    FullOuter,
}

impl JoinKind {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
            JoinKind::Outer => "OUTER",
            JoinKind::FullOuter => "FULL OUTER",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// `<kind> JOIN <table> [AS <alias>] ON <left> = <right>`
#[derive(Clone, Debug)]
pub struct Join<P> {
    parent: P,
    kind: JoinKind,
    table: String,
    alias: Option<String>,
    left: String,
    right: String,
}

impl<P: QueryPart> Join<P> {
    pub(crate) fn new(parent: P, kind: JoinKind, table: &str, left: &str, right: &str) -> Self {
        Self {
            parent,
            kind,
            table: table.to_string(),
            alias: None,
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    /// Alias the joined table. Refer to it by the alias in `left`/`right`.
    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }
}

impl<P: QueryPart> QueryPart for Join<P> {
    fn build(&self) -> StmtResult<(String, Vec<Value>)> {
        if self.table.trim().is_empty() {
            return Err(StmtError::validation("JOIN requires a table"));
        }
        build_after(&self.parent, |_| {
            let alias = match &self.alias {
                Some(alias) => format!(" AS {alias}"),
                None => String::new(),
            };
            Ok((
                format!(
                    "{} JOIN {}{alias} ON {} = {}",
                    self.kind, self.table, self.left, self.right
                ),
                Vec::new(),
            ))
        })
    }
}

impl<P: Joinable> SelectStage for Join<P> {}
impl<P: Joinable> Filterable for Join<P> {}
impl<P: Joinable> Joinable for Join<P> {}
impl<P: Joinable> Orderable for Join<P> {}
impl<P: Joinable> Limitable for Join<P> {}
impl<P: Joinable> Wrappable for Join<P> {}
impl<P: Joinable> Paginate for Join<P> {}
