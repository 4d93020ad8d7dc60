//! ModelRegistry for mapping table names to TableModel implementations.

use crate::domain::model::{GroceryItemModel, GroceryListModel, TableModel};
use crate::error::StoreError;
use std::sync::Arc;

/// Registered tables, kept in registration order so that DDL runs parents first.
#[derive(Clone)]
pub struct ModelRegistry {
    models: Vec<Arc<dyn TableModel>>,
}

impl ModelRegistry {
    /// Creates a new empty ModelRegistry.
    pub fn new() -> Self {
        Self { models: Vec::new() }
    }

    /// Registry holding `grocery_lists` and `grocery_items`.
    pub fn grocery() -> Self {
        let mut reg = Self::new();
        reg.register(GroceryListModel);
        reg.register(GroceryItemModel);
        reg
    }

    /// Registers a model, replacing any model with the same table name.
    pub fn register<M: TableModel + 'static>(&mut self, model: M) {
        self.models.retain(|m| m.table_name() != model.table_name());
        self.models.push(Arc::new(model));
    }

    /// Retrieves a model implementation by table name.
    pub fn get(&self, table: &str) -> Option<Arc<dyn TableModel>> {
        self.models.iter().find(|m| m.table_name() == table).cloned()
    }

    /// Like [`ModelRegistry::get`], failing with `UnknownTable`.
    pub fn require(&self, table: &str) -> Result<Arc<dyn TableModel>, StoreError> {
        self.get(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))
    }

    /// Returns all registered table names.
    pub fn list_models(&self) -> Vec<String> {
        self.models.iter().map(|m| m.table_name().to_string()).collect()
    }

    /// Returns all CREATE TABLE SQL statements in registration order.
    pub fn get_all_create_table_sql(&self) -> Vec<&str> {
        self.models
            .iter()
            .map(|model| model.get_create_table_sql())
            .collect()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::grocery()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{GROCERY_ITEMS, GROCERY_LISTS};

    #[test]
    fn grocery_registry_creates_lists_before_items() {
        let reg = ModelRegistry::grocery();
        assert_eq!(reg.list_models(), vec![GROCERY_LISTS, GROCERY_ITEMS]);
        let ddl = reg.get_all_create_table_sql();
        assert!(ddl[0].contains("grocery_lists"));
        assert!(ddl[1].contains("REFERENCES grocery_lists"));
    }

    #[test]
    fn unknown_table_is_rejected() {
        let reg = ModelRegistry::grocery();
        assert!(matches!(
            reg.require("pantry"),
            Err(StoreError::UnknownTable(t)) if t == "pantry"
        ));
    }
}
