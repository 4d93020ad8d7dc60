//! Table-scoped query descriptions shared by every store backend.

use serde_json::{Map, Value as JsonValue};

/// Equality filter `column = value`. A `null` value matches NULL columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: JsonValue,
}

impl Filter {
    /// PostgREST form of the filter value, e.g. `eq.42` or `is.null`.
    pub fn to_postgrest(&self) -> String {
        match &self.value {
            JsonValue::Null => "is.null".to_string(),
            JsonValue::String(s) => format!("eq.{}", s),
            other => format!("eq.{}", other),
        }
    }

    /// In-process comparison used by the memory store.
    pub fn matches(&self, row: &JsonValue) -> bool {
        let actual = row.get(&self.column).unwrap_or(&JsonValue::Null);
        match (&self.value, actual) {
            (JsonValue::Number(a), JsonValue::Number(b)) => a.as_f64() == b.as_f64(),
            (expected, actual) => expected == actual,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

impl OrderBy {
    pub fn to_postgrest(&self) -> String {
        let direction = if self.ascending { "asc" } else { "desc" };
        format!("{}.{}", self.column, direction)
    }
}

/// `select` against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub table: String,
    /// `None` selects every column.
    pub columns: Option<Vec<String>>,
    pub filters: Vec<Filter>,
    pub order: Option<OrderBy>,
}

impl SelectQuery {
    pub fn from(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: None,
            filters: Vec::new(),
            order: None,
        }
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<JsonValue>) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(OrderBy {
            column: column.to_string(),
            ascending,
        });
        self
    }

    /// `select=` parameter value.
    pub fn projection(&self) -> String {
        match &self.columns {
            Some(cols) => cols.join(","),
            None => "*".to_string(),
        }
    }
}

/// `update` of every row matching the filters.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    pub table: String,
    pub patch: Map<String, JsonValue>,
    pub filters: Vec<Filter>,
}

impl UpdateQuery {
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            patch: Map::new(),
            filters: Vec::new(),
        }
    }

    pub fn set(mut self, column: &str, value: impl Into<JsonValue>) -> Self {
        self.patch.insert(column.to_string(), value.into());
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<JsonValue>) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }
}
