//! INSERT root and its ON CONFLICT modifiers.

use super::fields::{FieldList, FieldValue};
use super::{QueryPart, Returnable, build_after};
use crate::error::{StmtError, StmtResult};
use crate::value::Value;

/// `INSERT INTO <table> (<columns>) VALUES (<values>)`
#[derive(Clone, Debug)]
pub struct Insert {
    table: String,
    fields: FieldList,
}

impl Insert {
    pub(crate) fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            fields: FieldList::default(),
        }
    }

    /// Insert a bound value into `column`.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.fields.push(column, FieldValue::Bind(value.into()));
        self
    }

    /// Insert an optional value (None => column omitted, so its default applies).
    pub fn set_opt<T: Into<Value>>(self, column: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Insert a raw SQL expression, e.g. `NOW()`.
    pub fn set_raw(mut self, column: &str, sql: &str) -> Self {
        self.fields.push(column, FieldValue::Raw(sql.to_string()));
        self
    }

    /// Start `ON CONFLICT (<columns>)`. An empty target is only valid for `DO NOTHING`.
    pub fn on_conflict<I, S>(self, columns: I) -> OnConflict<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OnConflict {
            parent: self,
            target: columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl QueryPart for Insert {
    fn build(&self) -> StmtResult<(String, Vec<Value>)> {
        if self.fields.is_empty() {
            return Err(StmtError::validation(format!(
                "INSERT into '{}' requires at least one field",
                self.table
            )));
        }
        let (columns, values, args) = self.fields.columns_and_values(0);
        Ok((
            format!("INSERT INTO {} ({columns}) VALUES ({values})", self.table),
            args,
        ))
    }
}

impl Returnable for Insert {}

/// Pending `ON CONFLICT` clause; pick an action to continue.
#[derive(Clone, Debug)]
pub struct OnConflict<P> {
    parent: P,
    target: Vec<String>,
}

impl<P: QueryPart> OnConflict<P> {
    /// `ON CONFLICT [(<columns>)] DO NOTHING`
    pub fn do_nothing(self) -> OnConflictDoNothing<P> {
        OnConflictDoNothing {
            parent: self.parent,
            target: self.target,
        }
    }

    /// `ON CONFLICT (<columns>) DO UPDATE SET ...`
    pub fn do_update(self) -> OnConflictUpdate<P> {
        OnConflictUpdate {
            parent: self.parent,
            target: self.target,
            fields: FieldList::default(),
        }
    }
}

fn conflict_target(target: &[String]) -> String {
    if target.is_empty() {
        String::new()
    } else {
        format!(" ({})", target.join(", "))
    }
}

/// `ON CONFLICT [(<columns>)] DO NOTHING`
#[derive(Clone, Debug)]
pub struct OnConflictDoNothing<P> {
    parent: P,
    target: Vec<String>,
}

impl<P: QueryPart> QueryPart for OnConflictDoNothing<P> {
    fn build(&self) -> StmtResult<(String, Vec<Value>)> {
        build_after(&self.parent, |_| {
            Ok((
                format!("ON CONFLICT{} DO NOTHING", conflict_target(&self.target)),
                Vec::new(),
            ))
        })
    }
}

impl<P: QueryPart> Returnable for OnConflictDoNothing<P> {}

/// `ON CONFLICT (<columns>) DO UPDATE SET <col> = <value>, ...`
#[derive(Clone, Debug)]
pub struct OnConflictUpdate<P> {
    parent: P,
    target: Vec<String>,
    fields: FieldList,
}

impl<P: QueryPart> OnConflictUpdate<P> {
    /// Assign a bound value on conflict.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.fields.push(column, FieldValue::Bind(value.into()));
        self
    }

    /// Assign an optional value (None => skip).
    pub fn set_opt<T: Into<Value>>(self, column: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Assign a raw SQL expression on conflict.
    pub fn set_raw(mut self, column: &str, sql: &str) -> Self {
        self.fields.push(column, FieldValue::Raw(sql.to_string()));
        self
    }

    /// `<column> = EXCLUDED.<column>`: keep the value the INSERT proposed.
    pub fn set_excluded(self, column: &str) -> Self {
        let sql = format!("EXCLUDED.{column}");
        self.set_raw(column, &sql)
    }
}

impl<P: QueryPart> QueryPart for OnConflictUpdate<P> {
    fn build(&self) -> StmtResult<(String, Vec<Value>)> {
        if self.target.is_empty() {
            return Err(StmtError::validation(
                "ON CONFLICT DO UPDATE requires at least one conflict column",
            ));
        }
        if self.fields.is_empty() {
            return Err(StmtError::validation(
                "ON CONFLICT DO UPDATE requires at least one field",
            ));
        }
        build_after(&self.parent, |base_index| {
            let (assignments, args) = self.fields.assignments(base_index);
            Ok((
                format!(
                    "ON CONFLICT{} DO UPDATE SET {assignments}",
                    conflict_target(&self.target)
                ),
                args,
            ))
        })
    }
}

impl<P: QueryPart> Returnable for OnConflictUpdate<P> {}
