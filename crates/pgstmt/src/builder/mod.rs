//! Statement builder chains.
//!
//! A chain starts at a root ([`select`], [`select_count`], [`insert`],
//! [`update`], [`delete`]) and each modifier takes ownership of the builder
//! before it, so the finished value is a nested type such as
//! `Limit<OrderBy<Where<Select>>>`. Building walks that nesting from the
//! inside out: the parent renders first, then the modifier appends its clause
//! with placeholders numbered after the parent's arguments.
//!
//! Which modifier may follow which step is expressed with the stage traits
//! below, so an illegal chain such as a JOIN after a DELETE does not compile.
//!
//! # Example
//!
//! ```ignore
//! use pgstmt::prelude::*;
//!
//! let rules = select("command_rules")
//!     .columns(["rule_id", "group_id", "command_id"])
//!     .filter()
//!     .field("server_id", Comparison::EQUAL, server_id)
//!     .and_field("enabled", Comparison::EQUAL, true)
//!     .order_by("rule_id")
//!     .compile()?
//!     .fetch(&client)
//!     .await?;
//! ```

mod delete;
mod fields;
mod insert;
mod join;
mod limit;
mod order;
mod returning;
mod select;
mod update;
mod where_clause;
mod wrap;

#[cfg(test)]
mod tests;

pub use delete::Delete;
pub use fields::FieldValue;
pub use insert::{Insert, OnConflict, OnConflictDoNothing, OnConflictUpdate};
pub use join::{Join, JoinKind};
pub use limit::Limit;
pub use order::OrderBy;
pub use returning::Returning;
pub use select::Select;
pub use update::Update;
pub use where_clause::Where;
pub use wrap::{Exists, FunctionCall};

use crate::compiled::CompiledQuery;
use crate::error::StmtResult;
use crate::value::Value;

/// A node of a builder chain that can render itself.
///
/// `build` must render the parent first, number its own placeholders from
/// `parent_args.len() + 1`, and return the parent's SQL and arguments followed
/// by its own. Building does not consume or change the builder, so calling it
/// twice yields equal results.
pub trait QueryPart {
    /// Render SQL text and the positional arguments for its placeholders.
    fn build(&self) -> StmtResult<(String, Vec<Value>)>;
}

/// Turn a finished chain into an immutable, executable statement.
pub trait Compile {
    /// Build the chain and freeze the result.
    fn compile(self) -> StmtResult<CompiledQuery>;
}

impl<T: QueryPart> Compile for T {
    fn compile(self) -> StmtResult<CompiledQuery> {
        let (sql, args) = self.build()?;
        crate::sql_debug!(sql = %sql, param_count = args.len(), "compiled statement");
        Ok(CompiledQuery::new(sql, args))
    }
}

/// Build `parent`, then append the fragment `render` produces for the
/// parent's argument count.
pub(crate) fn build_after<P, F>(parent: &P, render: F) -> StmtResult<(String, Vec<Value>)>
where
    P: QueryPart + ?Sized,
    F: FnOnce(usize) -> StmtResult<(String, Vec<Value>)>,
{
    let (mut sql, mut args) = parent.build()?;
    let (own_sql, own_args) = render(args.len())?;
    sql.push(' ');
    sql.push_str(&own_sql);
    args.extend(own_args);
    Ok((sql, args))
}

// ==================== Stage traits ====================

/// Steps that accept a WHERE clause.
pub trait Filterable: QueryPart + Sized {
    /// Start a WHERE clause. It must receive a predicate before it can build.
    fn filter(self) -> Where<Self> {
        Where::new(self)
    }

    /// Start a WHERE clause and hand it to `strategy` to fill in.
    ///
    /// Lets repositories keep reusable filters as plain functions:
    ///
    /// ```ignore
    /// fn active(w: Where<Select>) -> Where<Select> {
    ///     w.field("archived", Comparison::EQUAL, false)
    /// }
    /// let q = select("reminders").column("*").filter_with(active);
    /// ```
    fn filter_with<F>(self, strategy: F) -> Where<Self>
    where
        F: FnOnce(Where<Self>) -> Where<Self>,
    {
        strategy(Where::new(self))
    }
}

/// Steps that accept another JOIN.
pub trait Joinable: QueryPart + Sized {
    /// `<kind> JOIN <table> ON <left> = <right>`
    fn join(self, kind: JoinKind, table: &str, left: &str, right: &str) -> Join<Self> {
        Join::new(self, kind, table, left, right)
    }

    /// `INNER JOIN <table> ON <left> = <right>`
    fn inner_join(self, table: &str, left: &str, right: &str) -> Join<Self> {
        self.join(JoinKind::Inner, table, left, right)
    }

    /// `LEFT JOIN <table> ON <left> = <right>`
    fn left_join(self, table: &str, left: &str, right: &str) -> Join<Self> {
        self.join(JoinKind::Left, table, left, right)
    }

    /// `RIGHT JOIN <table> ON <left> = <right>`
    fn right_join(self, table: &str, left: &str, right: &str) -> Join<Self> {
        self.join(JoinKind::Right, table, left, right)
    }

    /// `FULL OUTER JOIN <table> ON <left> = <right>`
    fn full_join(self, table: &str, left: &str, right: &str) -> Join<Self> {
        self.join(JoinKind::FullOuter, table, left, right)
    }
}

/// Row-producing SELECT steps before ordering: `Select`, `Join`, and a
/// `Where` over either.
pub trait SelectStage: QueryPart {}

/// Steps that accept ORDER BY.
pub trait Orderable: SelectStage + Sized {
    /// `ORDER BY <column>`
    fn order_by(self, column: &str) -> OrderBy<Self> {
        OrderBy::new(self, column, false)
    }

    /// `ORDER BY <column> DESC`
    fn order_by_desc(self, column: &str) -> OrderBy<Self> {
        OrderBy::new(self, column, true)
    }
}

/// Steps that accept LIMIT/OFFSET.
pub trait Limitable: QueryPart + Sized {
    /// `LIMIT $n`
    fn limit(self, max_count: i64) -> Limit<Self> {
        Limit::new(self, Some(max_count), None)
    }

    /// `OFFSET $n`
    fn offset(self, start_index: i64) -> Limit<Self> {
        Limit::new(self, None, Some(start_index))
    }

    /// LIMIT and/or OFFSET from optional bounds; at least one must be set.
    fn window(self, max_count: Option<i64>, start_index: Option<i64>) -> Limit<Self> {
        Limit::new(self, max_count, start_index)
    }
}

/// Steps whose whole statement can be wrapped in an outer SELECT.
pub trait Wrappable: QueryPart + Sized {
    /// `SELECT EXISTS (<statement>)`
    fn exists(self) -> Exists<Self> {
        Exists::new(self)
    }

    /// `SELECT <function>((<statement>))`
    fn call(self, function: &str) -> FunctionCall<Self> {
        FunctionCall::new(self, function)
    }
}

/// Steps that accept RETURNING.
pub trait Returnable: QueryPart + Sized {
    /// `RETURNING <columns>`
    fn returning<I, S>(self, columns: I) -> Returning<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Returning::new(self, columns)
    }
}

// ==================== Root constructors ====================

/// Start a SELECT over `table`. Add columns with `column`/`columns`.
pub fn select(table: &str) -> Select {
    Select::new(table)
}

/// Start a `SELECT COUNT(*)` over `table`.
pub fn select_count(table: &str) -> Select {
    Select::count(table)
}

/// Start an INSERT into `table`.
pub fn insert(table: &str) -> Insert {
    Insert::new(table)
}

/// Start an UPDATE of `table`.
pub fn update(table: &str) -> Update {
    Update::new(table)
}

/// Start a DELETE from `table`.
///
/// Without a WHERE clause this deletes every row; chain `filter()` to narrow it.
pub fn delete(table: &str) -> Delete {
    Delete::new(table)
}
