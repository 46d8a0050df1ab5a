//! Column/value lists shared by INSERT, UPDATE and ON CONFLICT DO UPDATE.

use crate::value::Value;

/// Value written to a column.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// Parameterized value
    Bind(Value),
    /// Raw SQL expression, spliced verbatim. Trusted callers only.
    Raw(String),
}

/// Ordered `(column, value)` pairs.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct FieldList {
    fields: Vec<(String, FieldValue)>,
}

impl FieldList {
    pub(crate) fn push(&mut self, column: &str, value: FieldValue) {
        self.fields.push((column.to_string(), value));
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `col = $n, col = <raw>, ...`
    pub(crate) fn assignments(&self, base_index: usize) -> (String, Vec<Value>) {
        let mut parts = Vec::with_capacity(self.fields.len());
        let mut args = Vec::new();
        for (column, value) in &self.fields {
            let rhs = self.render(value, base_index, &mut args);
            parts.push(format!("{column} = {rhs}"));
        }
        (parts.join(", "), args)
    }

    /// `(col, col, ...)` and `($n, <raw>, ...)` for an INSERT.
    pub(crate) fn columns_and_values(&self, base_index: usize) -> (String, String, Vec<Value>) {
        let mut columns = Vec::with_capacity(self.fields.len());
        let mut values = Vec::with_capacity(self.fields.len());
        let mut args = Vec::new();
        for (column, value) in &self.fields {
            columns.push(column.as_str());
            values.push(self.render(value, base_index, &mut args));
        }
        (columns.join(", "), values.join(", "), args)
    }

    fn render(&self, value: &FieldValue, base_index: usize, args: &mut Vec<Value>) -> String {
        match value {
            FieldValue::Raw(sql) => sql.clone(),
            FieldValue::Bind(v) => {
                args.push(v.clone());
                format!("${}", base_index + args.len())
            }
        }
    }
}
