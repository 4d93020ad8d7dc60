//! Domain model definitions for the grocery tables.

use serde_json::Value as JsonValue;

pub mod records;
pub mod registry;
pub mod tables;

pub use records::{reverse_name, GroceryItem, GroceryList, ListWithItems, NewItem, NewList};
pub use registry::ModelRegistry;
pub use tables::{GroceryItemModel, GroceryListModel, GROCERY_ITEMS, GROCERY_LISTS};

/// How a store fills a column the caller left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    /// Random UUID generated by the store.
    GeneratedUuid,
    /// Insertion timestamp.
    Now,
    /// Constant JSON boolean.
    Bool(bool),
}

/// Column metadata used for casting, defaults and validation.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub nullable: bool,
    pub default: Option<ColumnDefault>,
}

impl ColumnSpec {
    pub const fn new(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            nullable: false,
            default: None,
        }
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn with_default(mut self, default: ColumnDefault) -> Self {
        self.default = Some(default);
        self
    }
}

/// A foreign key from `column` to the primary key of `references`.
#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references: &'static str,
}

/// Contract for a table the stores know how to persist.
///
/// Backends that enforce the schema themselves (the in-memory store) and
/// backends that only need typing for SQL binds (Postgres) both read it
/// through this trait.
pub trait TableModel: Send + Sync {
    /// Returns the name of the database table for this model.
    fn table_name(&self) -> &str;

    /// Returns the name of the primary key field for this model.
    fn primary_key_field(&self) -> &str {
        "id"
    }

    /// Returns the SQL CREATE TABLE statement for this model.
    fn get_create_table_sql(&self) -> &str;

    /// All columns, primary key included.
    fn columns(&self) -> &[ColumnSpec];

    fn foreign_keys(&self) -> &[ForeignKey] {
        &[]
    }

    fn column(&self, column: &str) -> Option<&ColumnSpec> {
        self.columns().iter().find(|c| c.name == column)
    }

    /// SQL type of `column`, if the table has it.
    fn column_type(&self, column: &str) -> Option<&str> {
        self.column(column).map(|c| c.sql_type)
    }

    /// Validates one record before it is inserted.
    ///
    /// Default implementation does no validation.
    fn validate_create_payload(&self, _payload: &JsonValue) -> Result<(), String> {
        Ok(())
    }
}
