use super::{ColumnDefault, ColumnSpec, ForeignKey, TableModel};
use serde_json::Value as JsonValue;

pub const GROCERY_LISTS: &str = "grocery_lists";
pub const GROCERY_ITEMS: &str = "grocery_items";

const LIST_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("id", "uuid").with_default(ColumnDefault::GeneratedUuid),
    ColumnSpec::new("name", "text"),
    ColumnSpec::new("created_at", "timestamptz").with_default(ColumnDefault::Now),
    ColumnSpec::new("user_id", "uuid").nullable(),
    ColumnSpec::new("purchase_date", "date").nullable(),
    ColumnSpec::new("store", "text").nullable(),
];

const ITEM_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("id", "uuid").with_default(ColumnDefault::GeneratedUuid),
    ColumnSpec::new("list_id", "uuid"),
    ColumnSpec::new("name", "text"),
    ColumnSpec::new("quantity", "float8"),
    ColumnSpec::new("category", "text"),
    ColumnSpec::new("comment", "text").nullable(),
    ColumnSpec::new("purchased", "bool").with_default(ColumnDefault::Bool(false)),
    ColumnSpec::new("reply", "text").nullable(),
];

const ITEM_FOREIGN_KEYS: &[ForeignKey] = &[ForeignKey {
    column: "list_id",
    references: GROCERY_LISTS,
}];

/// `grocery_lists`: named lists, optionally owned by a user.
pub struct GroceryListModel;

impl TableModel for GroceryListModel {
    fn table_name(&self) -> &str {
        GROCERY_LISTS
    }

    fn get_create_table_sql(&self) -> &str {
        "CREATE TABLE IF NOT EXISTS grocery_lists (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name TEXT NOT NULL CHECK (name <> ''),
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            user_id UUID,
            purchase_date DATE,
            store TEXT
        )"
    }

    fn columns(&self) -> &[ColumnSpec] {
        LIST_COLUMNS
    }

    fn validate_create_payload(&self, payload: &JsonValue) -> Result<(), String> {
        match payload.get("name").and_then(|v| v.as_str()) {
            Some(name) if !name.is_empty() => Ok(()),
            Some(_) => Err("list name must not be empty".to_string()),
            None => Err("list must have a name".to_string()),
        }
    }
}

/// `grocery_items`: entries belonging to exactly one list.
pub struct GroceryItemModel;

impl TableModel for GroceryItemModel {
    fn table_name(&self) -> &str {
        GROCERY_ITEMS
    }

    fn get_create_table_sql(&self) -> &str {
        "CREATE TABLE IF NOT EXISTS grocery_items (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            list_id UUID NOT NULL REFERENCES grocery_lists(id),
            name TEXT NOT NULL,
            quantity DOUBLE PRECISION NOT NULL,
            category TEXT NOT NULL,
            comment TEXT,
            purchased BOOLEAN NOT NULL DEFAULT false,
            reply TEXT
        )"
    }

    fn columns(&self) -> &[ColumnSpec] {
        ITEM_COLUMNS
    }

    fn foreign_keys(&self) -> &[ForeignKey] {
        ITEM_FOREIGN_KEYS
    }

    fn validate_create_payload(&self, payload: &JsonValue) -> Result<(), String> {
        if !payload.get("quantity").map_or(false, |q| q.is_number()) {
            return Err("item quantity must be a number".to_string());
        }
        Ok(())
    }
}
