//! WHERE modifier.

use super::{
    Limitable, Orderable, QueryPart, Returnable, SelectStage, Wrappable, build_after,
};
use crate::constraint::{Comparison, Connector, Constraint};
use crate::error::StmtResult;
use crate::paginate::Paginate;
use crate::value::Value;

/// `WHERE <predicate>` over a parent step.
///
/// The predicate starts out as [`Constraint::Empty`] and must be set before
/// the chain builds. Two ways to grow it:
///
/// - `field` / `and_field` / `or_field` (and the `raw_` variants) add single
///   comparisons. Consecutive comparisons with the same connector share one
///   group, so `a.and_field(b).and_field(c)` renders `a AND b AND c`.
/// - `expression` / `and_expression` / `or_expression` take a whole
///   [`Constraint`] tree. The `and_`/`or_` forms always nest what was there
///   before as a single child, so grouping is exactly what the caller wrote.
///
/// The outermost group is printed without parentheses; every nested group keeps
/// its own.
#[derive(Clone, Debug)]
pub struct Where<P> {
    parent: P,
    root: Constraint,
}

impl<P: QueryPart> Where<P> {
    pub(crate) fn new(parent: P) -> Self {
        Self {
            parent,
            root: Constraint::Empty,
        }
    }

    /// The predicate assembled so far.
    pub fn constraint(&self) -> &Constraint {
        &self.root
    }

    // ==================== single comparisons ====================

    /// Set the first comparison. On a non-empty clause this behaves as `and_field`.
    pub fn field(self, column: &str, comparison: Comparison, value: impl Into<Value>) -> Self {
        self.and_field(column, comparison, value)
    }

    /// `... AND <column> <op> $n`
    pub fn and_field(self, column: &str, comparison: Comparison, value: impl Into<Value>) -> Self {
        self.push_flat(Connector::And, Constraint::field(column, comparison, value))
    }

    /// `... OR <column> <op> $n`
    pub fn or_field(self, column: &str, comparison: Comparison, value: impl Into<Value>) -> Self {
        self.push_flat(Connector::Or, Constraint::field(column, comparison, value))
    }

    /// Like `field`, with `sql` spliced verbatim instead of bound.
    pub fn raw_field(self, column: &str, comparison: Comparison, sql: &str) -> Self {
        self.and_raw_field(column, comparison, sql)
    }

    /// `... AND <column> <op> <sql>`
    pub fn and_raw_field(self, column: &str, comparison: Comparison, sql: &str) -> Self {
        self.push_flat(Connector::And, Constraint::raw(column, comparison, sql))
    }

    /// `... OR <column> <op> <sql>`
    pub fn or_raw_field(self, column: &str, comparison: Comparison, sql: &str) -> Self {
        self.push_flat(Connector::Or, Constraint::raw(column, comparison, sql))
    }

    /// One group of comparisons joined by `connector`.
    ///
    /// Shorthand for `expression(Constraint::logical(connector, ...))`. A group
    /// needs at least two comparisons.
    pub fn fields<I, C, V>(self, connector: Connector, comparisons: I) -> Self
    where
        I: IntoIterator<Item = (C, Comparison, V)>,
        C: Into<String>,
        V: Into<Value>,
    {
        let leaves = comparisons
            .into_iter()
            .map(|(column, comparison, value)| Constraint::field(column, comparison, value));
        self.expression(Constraint::logical(connector, leaves))
    }

    // ==================== expression trees ====================

    /// Set the predicate tree. On a non-empty clause this behaves as `and_expression`.
    pub fn expression(self, constraint: Constraint) -> Self {
        self.and_expression(constraint)
    }

    /// `(<previous>) AND <constraint>`
    pub fn and_expression(self, constraint: Constraint) -> Self {
        self.push_nested(Connector::And, constraint)
    }

    /// `(<previous>) OR <constraint>`
    pub fn or_expression(self, constraint: Constraint) -> Self {
        self.push_nested(Connector::Or, constraint)
    }

    fn push_flat(mut self, connector: Connector, leaf: Constraint) -> Self {
        self.root = match self.root {
            Constraint::Empty => leaf,
            Constraint::Logical(mut group) if group.connector == connector => {
                group.children.push(leaf);
                Constraint::Logical(group)
            }
            previous => Constraint::logical(connector, [previous, leaf]),
        };
        self
    }

    fn push_nested(mut self, connector: Connector, constraint: Constraint) -> Self {
        self.root = match self.root {
            Constraint::Empty => constraint,
            previous => Constraint::logical(connector, [previous, constraint]),
        };
        self
    }
}

impl<P: QueryPart> QueryPart for Where<P> {
    fn build(&self) -> StmtResult<(String, Vec<Value>)> {
        build_after(&self.parent, |base_index| {
            let (predicate, args) = match &self.root {
                Constraint::Logical(group) => group.build_inner(base_index)?,
                other => other.build(base_index)?,
            };
            Ok((format!("WHERE {predicate}"), args))
        })
    }
}

impl<P: SelectStage> SelectStage for Where<P> {}
impl<P: SelectStage> Orderable for Where<P> {}
impl<P: SelectStage> Limitable for Where<P> {}
impl<P: SelectStage> Wrappable for Where<P> {}
impl<P: SelectStage> Paginate for Where<P> {}
impl<P: Returnable> Returnable for Where<P> {}
