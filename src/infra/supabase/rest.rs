//! PostgREST data API.

use super::client::{check, SupabaseClient};
use crate::error::StoreError;
use crate::storage::query::{Filter, SelectQuery, UpdateQuery};
use crate::storage::TableStore;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value as JsonValue;
use tracing::debug;

fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| (f.column.clone(), f.to_postgrest()))
        .collect()
}

/// Union of the records' keys in first-seen order, for the `columns` parameter.
///
/// PostgREST requires every object of a bulk body to have the same keys unless
/// `columns` names them; keys a record lacks are then stored as NULL.
fn column_union(records: &[JsonValue]) -> String {
    let mut columns: Vec<&str> = Vec::new();
    for key in records.iter().filter_map(JsonValue::as_object).flat_map(|o| o.keys()) {
        if !columns.contains(&key.as_str()) {
            columns.push(key.as_str());
        }
    }
    columns.join(",")
}

#[async_trait]
impl TableStore for SupabaseClient {
    async fn insert(&self, table: &str, records: Vec<JsonValue>) -> Result<Vec<JsonValue>, StoreError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let columns = column_union(&records);
        let bearer = self.bearer().await;
        let resp = self
            .request(Method::POST, &self.rest_url(table), &bearer)
            .header("Prefer", "return=representation")
            .query(&[("columns", columns.as_str()), ("select", "*")])
            .json(&records)
            .send()
            .await?;
        let rows: Vec<JsonValue> = check(resp).await?.json().await?;
        debug!(table, rows = rows.len(), "rest insert");
        Ok(rows)
    }

    async fn select(&self, query: &SelectQuery) -> Result<Vec<JsonValue>, StoreError> {
        let bearer = self.bearer().await;
        let mut params = vec![("select".to_string(), query.projection())];
        params.extend(filter_params(&query.filters));
        if let Some(order) = &query.order {
            params.push(("order".to_string(), order.to_postgrest()));
        }
        let resp = self
            .request(Method::GET, &self.rest_url(&query.table), &bearer)
            .query(&params)
            .send()
            .await?;
        let rows: Vec<JsonValue> = check(resp).await?.json().await?;
        debug!(table = %query.table, rows = rows.len(), "rest select");
        Ok(rows)
    }

    async fn update(&self, query: &UpdateQuery) -> Result<Vec<JsonValue>, StoreError> {
        let bearer = self.bearer().await;
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(filter_params(&query.filters));
        let resp = self
            .request(Method::PATCH, &self.rest_url(&query.table), &bearer)
            .header("Prefer", "return=representation")
            .query(&params)
            .json(&query.patch)
            .send()
            .await?;
        let rows: Vec<JsonValue> = check(resp).await?.json().await?;
        debug!(table = %query.table, rows = rows.len(), "rest update");
        Ok(rows)
    }
}
