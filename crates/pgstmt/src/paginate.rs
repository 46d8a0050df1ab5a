//! Pagination with a total count in one round trip.
//!
//! The inner statement becomes a CTE, a second CTE counts it, and the outer
//! SELECT cross joins the two before windowing:
//!
//! ```text
//! WITH Data_CTE AS (<inner>),
//!      Count_CTE AS (SELECT COUNT(*) AS _totalrows FROM Data_CTE)
//! SELECT * FROM Data_CTE CROSS JOIN Count_CTE
//! ORDER BY <ordering> OFFSET $k ROWS FETCH NEXT $k+1 ROWS ONLY
//! ```
//!
//! Every returned row carries the total match count in `_totalrows`, so a page
//! and the number of pages arrive together. The database evaluates the inner
//! statement twice. A page past the end returns no rows and therefore no
//! count; only then does fetching fall back to a count-only statement.

use crate::builder::{QueryPart, SelectStage};
use crate::client::GenericClient;
use crate::compiled::CompiledQuery;
use crate::error::{StmtError, StmtResult};
use crate::row::{FromRow, RowExt};
use crate::value::Value;
use serde::Serialize;
use tokio_postgres::Row;

/// Name of the CTE holding the inner statement.
pub const DATA_CTE: &str = "Data_CTE";
/// Name of the CTE holding the row count.
pub const COUNT_CTE: &str = "Count_CTE";
/// Column carrying the total row count on every returned row.
pub const TOTAL_ROWS_COLUMN: &str = "_totalrows";

/// SELECT steps that can be paginated.
pub trait Paginate: SelectStage + Sized {
    /// Window the statement to page `page_index` (0-based) of `page_size` rows.
    ///
    /// `ordering` entries are raw SQL (`"created_at DESC"`), since identifiers
    /// cannot be bound. Without ordering the page contents are unspecified.
    fn paginate<I, S>(self, page_index: i64, page_size: i64, ordering: I) -> Paginated<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Paginated {
            parent: self,
            page_index,
            page_size,
            ordering: ordering.into_iter().map(Into::into).collect(),
        }
    }
}

/// A SELECT wrapped for pagination. Nothing can be chained after it.
#[derive(Clone, Debug)]
pub struct Paginated<P> {
    parent: P,
    page_index: i64,
    page_size: i64,
    ordering: Vec<String>,
}

impl<P: SelectStage> Paginated<P> {
    /// Render the paginated statement.
    ///
    /// The inner arguments come first, then the row offset and the page size.
    pub fn build(&self) -> StmtResult<(String, Vec<Value>)> {
        let (inner, args) = self.build_inner()?;
        Ok(self.wrap_page(&inner, args))
    }

    /// Build and freeze the paginated statement.
    pub fn compile(self) -> StmtResult<CompiledPaginationQuery> {
        let (inner, inner_args) = self.build_inner()?;
        let count = CompiledQuery::new(
            format!(
                "WITH {DATA_CTE} AS ({inner}) \
                 SELECT COUNT(*) AS {TOTAL_ROWS_COLUMN} FROM {DATA_CTE}"
            ),
            inner_args.clone(),
        );
        let (sql, args) = self.wrap_page(&inner, inner_args);
        crate::sql_debug!(
            sql = %sql,
            param_count = args.len(),
            page_index = self.page_index,
            page_size = self.page_size,
            "compiled pagination statement"
        );
        Ok(CompiledPaginationQuery {
            query: CompiledQuery::new(sql, args),
            count,
            page_index: self.page_index,
            page_size: self.page_size,
        })
    }

    fn build_inner(&self) -> StmtResult<(String, Vec<Value>)> {
        if self.page_index < 0 {
            return Err(StmtError::validation(format!(
                "page index must be >= 0, got {}",
                self.page_index
            )));
        }
        if self.page_size < 1 {
            return Err(StmtError::validation(format!(
                "page size must be >= 1, got {}",
                self.page_size
            )));
        }
        if self.page_index.checked_mul(self.page_size).is_none() {
            return Err(StmtError::validation(format!(
                "page {} of size {} overflows the row offset",
                self.page_index, self.page_size
            )));
        }
        self.parent.build()
    }

    fn wrap_page(&self, inner: &str, mut args: Vec<Value>) -> (String, Vec<Value>) {
        let mut sql = format!(
            "WITH {DATA_CTE} AS ({inner}), \
             {COUNT_CTE} AS (SELECT COUNT(*) AS {TOTAL_ROWS_COLUMN} FROM {DATA_CTE}) \
             SELECT * FROM {DATA_CTE} CROSS JOIN {COUNT_CTE}"
        );
        if !self.ordering.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.ordering.join(", "));
        }

        // overflow was rejected in build_inner
        args.push(Value::Int(self.page_index.saturating_mul(self.page_size)));
        let offset_index = args.len();
        args.push(Value::Int(self.page_size));
        sql.push_str(&format!(
            " OFFSET ${offset_index} ROWS FETCH NEXT ${} ROWS ONLY",
            offset_index + 1
        ));
        (sql, args)
    }
}

/// A compiled paginated statement plus its page coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledPaginationQuery {
    query: CompiledQuery,
    /// Total-only statement over the same inner query, for pages past the end.
    count: CompiledQuery,
    page_index: i64,
    page_size: i64,
}

impl CompiledPaginationQuery {
    /// The underlying compiled statement.
    pub fn query(&self) -> &CompiledQuery {
        &self.query
    }

    pub fn page_index(&self) -> i64 {
        self.page_index
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Attach a monitoring tag.
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.count = self.count.tagged(format!("{tag}.count"));
        self.query = self.query.tagged(tag);
        self
    }

    /// The same statement aimed at page 0.
    pub fn first_page(&self) -> Self {
        let mut first = self.clone();
        let args = first.query.args_mut();
        // offset is always the second-to-last argument
        if let Some(offset_slot) = args.len().checked_sub(2) {
            args[offset_slot] = Value::Int(0);
        }
        first.page_index = 0;
        first
    }

    /// Run the statement and return the page with the total match count.
    ///
    /// A page past the end yields no items and the true `total_count`. Such a
    /// page carries no count column, so the total then takes a second,
    /// count-only round trip.
    pub async fn fetch(&self, conn: &impl GenericClient) -> StmtResult<PaginationResult<Row>> {
        let rows = self.query.fetch(conn).await?;
        let total_count = match rows.first() {
            Some(row) => row.try_get_column::<i64>(TOTAL_ROWS_COLUMN)?,
            // page 0 came back empty, so nothing matched
            None if self.page_index == 0 => 0,
            None => self.count.fetchval::<i64>(conn).await?.unwrap_or(0),
        };
        Ok(PaginationResult {
            page_index: self.page_index,
            page_size: self.page_size,
            total_count,
            items: rows,
        })
    }

    /// Like [`fetch`](Self::fetch), mapping each row to `T`.
    pub async fn fetch_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> StmtResult<PaginationResult<T>> {
        self.fetch(conn).await?.try_map(|row| T::from_row(&row))
    }

    /// Fetch the page; if it lies past the end, fetch page 0 instead.
    ///
    /// Useful when rows were deleted since the caller last saw the page count.
    /// The returned result reports the page that was actually fetched.
    pub async fn fetch_or_first_page(
        &self,
        conn: &impl GenericClient,
    ) -> StmtResult<PaginationResult<Row>> {
        let page = self.fetch(conn).await?;
        if page.is_past_end() && self.page_index > 0 {
            return self.first_page().fetch(conn).await;
        }
        Ok(page)
    }

    /// Like [`fetch_or_first_page`](Self::fetch_or_first_page), mapping each row to `T`.
    pub async fn fetch_or_first_page_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> StmtResult<PaginationResult<T>> {
        self.fetch_or_first_page(conn)
            .await?
            .try_map(|row| T::from_row(&row))
    }
}

/// One page of results.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PaginationResult<T> {
    pub page_index: i64,
    pub page_size: i64,
    /// Rows matching the inner statement, across all pages.
    pub total_count: i64,
    pub items: Vec<T>,
}

impl<T> PaginationResult<T> {
    /// Number of pages needed for `total_count` rows.
    pub fn page_count(&self) -> i64 {
        if self.page_size <= 0 {
            return 0;
        }
        self.total_count / self.page_size + i64::from(self.total_count % self.page_size != 0)
    }

    /// Whether the requested page is empty although matching rows exist.
    pub fn is_past_end(&self) -> bool {
        self.items.is_empty() && self.total_count > 0
    }

    /// Convert the items, keeping the page metadata.
    pub fn map<U, F>(self, f: F) -> PaginationResult<U>
    where
        F: FnMut(T) -> U,
    {
        PaginationResult {
            page_index: self.page_index,
            page_size: self.page_size,
            total_count: self.total_count,
            items: self.items.into_iter().map(f).collect(),
        }
    }

    fn try_map<U, F>(self, f: F) -> StmtResult<PaginationResult<U>>
    where
        F: FnMut(T) -> StmtResult<U>,
    {
        Ok(PaginationResult {
            page_index: self.page_index,
            page_size: self.page_size,
            total_count: self.total_count,
            items: self.items.into_iter().map(f).collect::<StmtResult<_>>()?,
        })
    }
}
