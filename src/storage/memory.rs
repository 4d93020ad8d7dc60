//! In-process table store.
//!
//! Enforces the same rules the hosted database does for the grocery tables
//! (generated keys, defaults, NOT NULL, CHECK, foreign keys) so the service
//! behaves identically against it. Each call holds the table lock for its
//! whole duration, which makes a batch insert all-or-nothing.

use crate::domain::model::{ColumnDefault, ModelRegistry, TableModel};
use crate::error::StoreError;
use crate::storage::query::{Filter, SelectQuery, UpdateQuery};
use crate::storage::TableStore;
use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{Map, Value as JsonValue};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

// Postgres SQLSTATE codes, reported the way PostgREST reports them.
const NOT_NULL_VIOLATION: &str = "23502";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const UNIQUE_VIOLATION: &str = "23505";
const CHECK_VIOLATION: &str = "23514";

pub struct MemoryStore {
    registry: ModelRegistry,
    tables: RwLock<HashMap<String, Vec<JsonValue>>>,
    last_timestamp: Mutex<Option<DateTime<Utc>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_registry(ModelRegistry::grocery())
    }

    pub fn with_registry(registry: ModelRegistry) -> Self {
        let tables = registry
            .list_models()
            .into_iter()
            .map(|name| (name, Vec::new()))
            .collect();
        Self {
            registry,
            tables: RwLock::new(tables),
            last_timestamp: Mutex::new(None),
        }
    }

    /// Snapshot of every row currently in `table`.
    pub async fn rows(&self, table: &str) -> Vec<JsonValue> {
        let tables = self.tables.read().await;
        tables.get(table).cloned().unwrap_or_default()
    }

    /// Strictly increasing insertion timestamps, so `created_at` ordering is total.
    async fn next_timestamp(&self) -> String {
        let mut last = self.last_timestamp.lock().await;
        let mut now = Utc::now();
        if let Some(prev) = *last {
            if now <= prev {
                now = prev + Duration::microseconds(1);
            }
        }
        *last = Some(now);
        now.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    async fn prepare_row(
        &self,
        model: &dyn TableModel,
        record: JsonValue,
        tables: &HashMap<String, Vec<JsonValue>>,
    ) -> Result<JsonValue, StoreError> {
        let table = model.table_name();
        let mut fields = match record {
            JsonValue::Object(map) => map,
            _ => return Err(StoreError::rejected(400, "Record must be a JSON object")),
        };
        model
            .validate_create_payload(&JsonValue::Object(fields.clone()))
            .map_err(|e| violation(CHECK_VIOLATION, e))?;

        check_columns(model, fields.keys())?;

        let mut row = Map::new();
        for col in model.columns() {
            let value = match fields.remove(col.name) {
                Some(v) => v,
                None => match col.default {
                    Some(ColumnDefault::GeneratedUuid) => {
                        JsonValue::String(Uuid::new_v4().to_string())
                    }
                    Some(ColumnDefault::Now) => JsonValue::String(self.next_timestamp().await),
                    Some(ColumnDefault::Bool(b)) => JsonValue::Bool(b),
                    None => JsonValue::Null,
                },
            };
            if value.is_null() && !col.nullable {
                return Err(violation(
                    NOT_NULL_VIOLATION,
                    format!(
                        "null value in column \"{}\" of relation \"{}\" violates not-null constraint",
                        col.name, table
                    ),
                ));
            }
            row.insert(col.name.to_string(), value);
        }

        let pk = model.primary_key_field();
        if let Some(existing) = tables.get(table) {
            if existing.iter().any(|r| r.get(pk) == row.get(pk)) {
                return Err(violation(
                    UNIQUE_VIOLATION,
                    format!("duplicate key value violates unique constraint \"{}_pkey\"", table),
                ));
            }
        }

        for fk in model.foreign_keys() {
            let value = row.get(fk.column).cloned().unwrap_or(JsonValue::Null);
            if value.is_null() {
                continue;
            }
            let parent = self.registry.require(fk.references)?;
            let parent_pk = parent.primary_key_field();
            let found = tables
                .get(fk.references)
                .map_or(false, |rows| rows.iter().any(|r| r.get(parent_pk) == Some(&value)));
            if !found {
                return Err(violation(
                    FOREIGN_KEY_VIOLATION,
                    format!(
                        "insert or update on table \"{}\" violates foreign key constraint \"{}_{}_fkey\"",
                        table, table, fk.column
                    ),
                ));
            }
        }

        Ok(JsonValue::Object(row))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn violation(code: &str, message: impl Into<String>) -> StoreError {
    StoreError::Rejected {
        status: 400,
        code: Some(code.to_string()),
        message: message.into(),
    }
}

fn check_columns<'a>(
    model: &dyn TableModel,
    columns: impl IntoIterator<Item = &'a String>,
) -> Result<(), StoreError> {
    for column in columns {
        if model.column(column).is_none() {
            return Err(StoreError::UnknownColumn {
                table: model.table_name().to_string(),
                column: column.clone(),
            });
        }
    }
    Ok(())
}

fn check_filters(model: &dyn TableModel, filters: &[Filter]) -> Result<(), StoreError> {
    check_columns(model, filters.iter().map(|f| &f.column))
}

/// Postgres ordering: NULL sorts after every value.
fn compare_json(a: &JsonValue, b: &JsonValue) -> Ordering {
    match (a, b) {
        (JsonValue::Null, JsonValue::Null) => Ordering::Equal,
        (JsonValue::Null, _) => Ordering::Greater,
        (_, JsonValue::Null) => Ordering::Less,
        (JsonValue::Number(x), JsonValue::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (JsonValue::String(x), JsonValue::String(y)) => x.cmp(y),
        (JsonValue::Bool(x), JsonValue::Bool(y)) => x.cmp(y),
        (x, y) => x.to_string().cmp(&y.to_string()),
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn insert(&self, table: &str, records: Vec<JsonValue>) -> Result<Vec<JsonValue>, StoreError> {
        let model = self.registry.require(table)?;
        let mut tables = self.tables.write().await;

        let mut staged = Vec::with_capacity(records.len());
        for record in records {
            let row = self.prepare_row(model.as_ref(), record, &tables).await?;
            let pk = model.primary_key_field();
            if staged.iter().any(|r: &JsonValue| r.get(pk) == row.get(pk)) {
                return Err(violation(
                    UNIQUE_VIOLATION,
                    format!("duplicate key value violates unique constraint \"{}_pkey\"", table),
                ));
            }
            staged.push(row);
        }

        debug!(table, rows = staged.len(), "memory insert");
        tables
            .entry(table.to_string())
            .or_default()
            .extend(staged.iter().cloned());
        Ok(staged)
    }

    async fn select(&self, query: &SelectQuery) -> Result<Vec<JsonValue>, StoreError> {
        let model = self.registry.require(&query.table)?;
        check_filters(model.as_ref(), &query.filters)?;
        if let Some(cols) = &query.columns {
            check_columns(model.as_ref(), cols)?;
        }
        if let Some(order) = &query.order {
            check_columns(model.as_ref(), std::iter::once(&order.column))?;
        }

        let tables = self.tables.read().await;
        let mut rows: Vec<JsonValue> = tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| query.filters.iter().all(|f| f.matches(r)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare_json(
                    a.get(&order.column).unwrap_or(&JsonValue::Null),
                    b.get(&order.column).unwrap_or(&JsonValue::Null),
                );
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }

        if let Some(cols) = &query.columns {
            rows = rows
                .into_iter()
                .map(|row| {
                    let projected: Map<String, JsonValue> = cols
                        .iter()
                        .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(JsonValue::Null)))
                        .collect();
                    JsonValue::Object(projected)
                })
                .collect();
        }

        debug!(table = %query.table, rows = rows.len(), "memory select");
        Ok(rows)
    }

    async fn update(&self, query: &UpdateQuery) -> Result<Vec<JsonValue>, StoreError> {
        let model = self.registry.require(&query.table)?;
        check_filters(model.as_ref(), &query.filters)?;
        check_columns(model.as_ref(), query.patch.keys())?;
        for (column, value) in &query.patch {
            let nullable = model.column(column).map_or(false, |c| c.nullable);
            if value.is_null() && !nullable {
                return Err(violation(
                    NOT_NULL_VIOLATION,
                    format!(
                        "null value in column \"{}\" of relation \"{}\" violates not-null constraint",
                        column, query.table
                    ),
                ));
            }
        }

        let mut tables = self.tables.write().await;
        let mut updated = Vec::new();
        if let Some(rows) = tables.get_mut(&query.table) {
            for row in rows.iter_mut() {
                if !query.filters.iter().all(|f| f.matches(row)) {
                    continue;
                }
                if let Some(fields) = row.as_object_mut() {
                    for (column, value) in &query.patch {
                        fields.insert(column.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }

        debug!(table = %query.table, rows = updated.len(), "memory update");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{GROCERY_ITEMS, GROCERY_LISTS};
    use serde_json::json;

    #[tokio::test]
    async fn insert_fills_generated_columns() {
        let store = MemoryStore::new();
        let rows = store
            .insert(GROCERY_LISTS, vec![json!({ "name": "Weekly" })])
            .await
            .unwrap();
        let row = &rows[0];
        assert!(Uuid::parse_str(row["id"].as_str().unwrap()).is_ok());
        assert!(row["created_at"].as_str().unwrap().ends_with('Z'));
        assert!(row["user_id"].is_null());
    }

    #[tokio::test]
    async fn timestamps_are_strictly_increasing() {
        let store = MemoryStore::new();
        let mut stamps = Vec::new();
        for i in 0..20 {
            let rows = store
                .insert(GROCERY_LISTS, vec![json!({ "name": format!("l{}", i) })])
                .await
                .unwrap();
            stamps.push(rows[0]["created_at"].as_str().unwrap().to_string());
        }
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn foreign_key_violation_rejects_whole_batch() {
        let store = MemoryStore::new();
        let list = store
            .insert(GROCERY_LISTS, vec![json!({ "name": "Weekly" })])
            .await
            .unwrap()
            .remove(0);
        let err = store
            .insert(
                GROCERY_ITEMS,
                vec![
                    json!({ "list_id": list["id"], "name": "a", "quantity": 1, "category": "x" }),
                    json!({ "list_id": Uuid::new_v4().to_string(), "name": "b", "quantity": 1, "category": "x" }),
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected { code: Some(ref c), .. } if c == FOREIGN_KEY_VIOLATION));
        assert!(store.rows(GROCERY_ITEMS).await.is_empty());
    }

    #[tokio::test]
    async fn missing_required_column_is_rejected() {
        let store = MemoryStore::new();
        let list = store
            .insert(GROCERY_LISTS, vec![json!({ "name": "Weekly" })])
            .await
            .unwrap()
            .remove(0);
        let err = store
            .insert(
                GROCERY_ITEMS,
                vec![json!({ "list_id": list["id"], "name": "a", "quantity": 1 })],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected { code: Some(ref c), .. } if c == NOT_NULL_VIOLATION));
    }

    #[tokio::test]
    async fn unknown_columns_are_rejected() {
        let store = MemoryStore::new();
        let err = store
            .insert(GROCERY_LISTS, vec![json!({ "name": "x", "colour": "red" })])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownColumn { ref column, .. } if column == "colour"));

        let err = store
            .select(&SelectQuery::from(GROCERY_LISTS).eq("colour", "red"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownColumn { .. }));
    }

    #[tokio::test]
    async fn select_filters_orders_and_projects() {
        let store = MemoryStore::new();
        for (name, owner) in [("a", "u1"), ("b", "u2"), ("c", "u1")] {
            store
                .insert(GROCERY_LISTS, vec![json!({ "name": name, "user_id": owner })])
                .await
                .unwrap();
        }
        let rows = store
            .select(
                &SelectQuery::from(GROCERY_LISTS)
                    .columns(&["name"])
                    .eq("user_id", "u1")
                    .order("created_at", false),
            )
            .await
            .unwrap();
        assert_eq!(rows, vec![json!({ "name": "c" }), json!({ "name": "a" })]);
    }

    #[tokio::test]
    async fn select_single_reports_row_count() {
        let store = MemoryStore::new();
        let err = store
            .select_single(&SelectQuery::from(GROCERY_LISTS).eq("name", "none"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NoRows { .. }));

        for _ in 0..2 {
            store
                .insert(GROCERY_LISTS, vec![json!({ "name": "dup" })])
                .await
                .unwrap();
        }
        let err = store
            .select_single(&SelectQuery::from(GROCERY_LISTS).eq("name", "dup"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MultipleRows { count: 2, .. }));
    }

    #[tokio::test]
    async fn update_touches_only_matching_rows() {
        let store = MemoryStore::new();
        let rows = store
            .insert(
                GROCERY_LISTS,
                vec![json!({ "name": "a" }), json!({ "name": "b" })],
            )
            .await
            .unwrap();
        let updated = store
            .update(&UpdateQuery::table(GROCERY_LISTS).set("store", "Aldi").eq("id", rows[0]["id"].clone()))
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
        let all = store.rows(GROCERY_LISTS).await;
        assert_eq!(all[0]["store"], json!("Aldi"));
        assert!(all[1]["store"].is_null());

        let err = store
            .update(&UpdateQuery::table(GROCERY_LISTS).set("name", JsonValue::Null))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }));
    }
}
