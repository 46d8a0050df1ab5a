//! Compiled statements and their execution.

use crate::client::GenericClient;
use crate::error::StmtResult;
use crate::row::{FromRow, RowExt};
use crate::value::Value;
use std::fmt;
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, ToSql};

/// Run a compiled statement through the plain or the tagged client method.
macro_rules! dispatch {
    ($query:ident, $conn:ident, $op:literal, $plain:ident, $tagged:ident) => {{
        let params = $query.params_ref();
        crate::sql_debug!(
            op = $op,
            tag = $query.tag.as_deref().unwrap_or("-"),
            param_count = params.len(),
            "executing statement"
        );
        match $query.tag.as_deref() {
            Some(tag) => $conn.$tagged(tag, &$query.sql, &params).await,
            None => $conn.$plain(&$query.sql, &params).await,
        }
    }};
}

/// An immutable SQL string with its positional arguments.
///
/// Produced by [`Compile::compile`](crate::Compile::compile). The `$n`
/// placeholders in `sql` are exactly `$1..$N` for `N = args.len()`.
///
/// Execution errors come from the client unchanged; with the provided
/// clients SQLSTATE 40001 arrives as
/// [`StmtError::Serialization`](crate::StmtError::Serialization) so callers
/// running under SERIALIZABLE isolation can retry.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledQuery {
    sql: String,
    args: Vec<Value>,
    tag: Option<String>,
}

impl CompiledQuery {
    pub(crate) fn new(sql: String, args: Vec<Value>) -> Self {
        Self {
            sql,
            args,
            tag: None,
        }
    }

    /// The rendered SQL.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Arguments for `$1..$N`, in order.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Monitoring tag, if any.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Attach a tag that is forwarded to the client's `*_tagged` methods.
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Split into SQL and arguments.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }

    pub(crate) fn args_mut(&mut self) -> &mut Vec<Value> {
        &mut self.args
    }

    /// Arguments as references compatible with tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.args
            .iter()
            .map(|v| v as &(dyn ToSql + Sync))
            .collect()
    }

    /// Run the statement and return the number of affected rows.
    pub async fn execute(&self, conn: &impl GenericClient) -> StmtResult<u64> {
        dispatch!(self, conn, "execute", execute, execute_tagged)
    }

    /// Run the statement and return all rows.
    pub async fn fetch(&self, conn: &impl GenericClient) -> StmtResult<Vec<Row>> {
        dispatch!(self, conn, "fetch", query, query_tagged)
    }

    /// Run the statement and map all rows to `T`.
    pub async fn fetch_as<T: FromRow>(&self, conn: &impl GenericClient) -> StmtResult<Vec<T>> {
        let rows = self.fetch(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Run the statement and return the first row, if any.
    pub async fn fetchrow(&self, conn: &impl GenericClient) -> StmtResult<Option<Row>> {
        dispatch!(self, conn, "fetchrow", query_opt, query_opt_tagged)
    }

    /// Run the statement and map the first row, if any, to `T`.
    pub async fn fetchrow_as<T: FromRow>(&self, conn: &impl GenericClient) -> StmtResult<Option<T>> {
        let row = self.fetchrow(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Run the statement and return the first column of the first row.
    ///
    /// `Ok(None)` when there are no rows. A NULL in that column decodes only
    /// if `T` is itself an `Option`.
    pub async fn fetchval<T>(&self, conn: &impl GenericClient) -> StmtResult<Option<T>>
    where
        T: for<'a> FromSql<'a>,
    {
        match self.fetchrow(conn).await? {
            Some(row) => row.try_get_index(0).map(Some),
            None => Ok(None),
        }
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
