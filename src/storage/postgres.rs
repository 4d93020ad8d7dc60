//! Table store backed by a self-hosted PostgreSQL database.

use crate::domain::model::{ModelRegistry, TableModel};
use crate::error::StoreError;
use crate::storage::query::{Filter, SelectQuery, UpdateQuery};
use crate::storage::TableStore;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::{debug, info};

// Reported for payloads the model rejects before they reach the database.
const CHECK_VIOLATION: &str = "23514";

/// A table store that uses a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
    registry: ModelRegistry,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            registry: ModelRegistry::grocery(),
        }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the grocery tables if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for sql in self.registry.get_all_create_table_sql() {
            sqlx::query(sql).execute(&self.pool).await.map_err(map_sqlx)?;
        }
        info!(tables = ?self.registry.list_models(), "grocery tables ready");
        Ok(())
    }

    fn model(&self, table: &str) -> Result<std::sync::Arc<dyn TableModel>, StoreError> {
        self.registry.require(table)
    }
}

/// Database-side rejections keep their SQLSTATE; everything else is a transport failure.
fn map_sqlx(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) => StoreError::Rejected {
            status: 400,
            code: db.code().map(|c| c.to_string()),
            message: db.message().to_string(),
        },
        _ => StoreError::Database(e),
    }
}

/// Values travel as text and are cast to the column type server-side.
fn bind_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn column_type<'m>(model: &'m dyn TableModel, column: &str) -> Result<&'m str, StoreError> {
    model
        .column_type(column)
        .ok_or_else(|| StoreError::UnknownColumn {
            table: model.table_name().to_string(),
            column: column.to_string(),
        })
}

fn push_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    model: &dyn TableModel,
    filters: &[Filter],
) -> Result<(), StoreError> {
    for (idx, filter) in filters.iter().enumerate() {
        let sql_type = column_type(model, &filter.column)?;
        qb.push(if idx == 0 { " WHERE " } else { " AND " });
        qb.push(&filter.column);
        if filter.value.is_null() {
            qb.push(" IS NULL");
        } else {
            qb.push(" = ")
                .push_bind(bind_text(&filter.value))
                .push("::")
                .push(sql_type);
        }
    }
    Ok(())
}

#[async_trait]
impl TableStore for PostgresStore {
    async fn insert(&self, table: &str, records: Vec<JsonValue>) -> Result<Vec<JsonValue>, StoreError> {
        let model = self.model(table)?;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        for record in &records {
            model
                .validate_create_payload(record)
                .map_err(|message| StoreError::Rejected {
                    status: 400,
                    code: Some(CHECK_VIOLATION.to_string()),
                    message,
                })?;
        }

        let mut inserted: Vec<JsonValue> = Vec::with_capacity(records.len());
        let mut transaction = self.pool.begin().await.map_err(map_sqlx)?;

        for record in &records {
            let record_obj = record
                .as_object()
                .ok_or_else(|| StoreError::rejected(400, "Record must be a JSON object"))?;

            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("INSERT INTO ");
            qb.push(table);
            if record_obj.is_empty() {
                qb.push(" DEFAULT VALUES");
            } else {
                let columns: Vec<&str> = record_obj.keys().map(|s| s.as_str()).collect();
                qb.push(" (").push(columns.join(", ")).push(") VALUES (");
                for (idx, (col, value)) in record_obj.iter().enumerate() {
                    let sql_type = column_type(model.as_ref(), col)?;
                    if idx > 0 {
                        qb.push(", ");
                    }
                    qb.push_bind(bind_text(value)).push("::").push(sql_type);
                }
                qb.push(")");
            }
            qb.push(" RETURNING row_to_json(")
                .push(table)
                .push(".*) AS record");

            let row = qb
                .build()
                .fetch_one(&mut *transaction)
                .await
                .map_err(map_sqlx)?;
            inserted.push(row.try_get("record")?);
        }

        transaction.commit().await.map_err(map_sqlx)?;
        debug!(table, rows = inserted.len(), "postgres insert");
        Ok(inserted)
    }

    async fn select(&self, query: &SelectQuery) -> Result<Vec<JsonValue>, StoreError> {
        let model = self.model(&query.table)?;
        let table = query.table.as_str();

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
        match &query.columns {
            Some(cols) => {
                qb.push("json_build_object(");
                for (idx, col) in cols.iter().enumerate() {
                    column_type(model.as_ref(), col)?;
                    if idx > 0 {
                        qb.push(", ");
                    }
                    qb.push("'").push(col).push("', ").push(col);
                }
                qb.push(")");
            }
            None => {
                qb.push("row_to_json(").push(table).push(".*)");
            }
        }
        qb.push(" AS record FROM ").push(table);

        push_filters(&mut qb, model.as_ref(), &query.filters)?;

        if let Some(order) = &query.order {
            column_type(model.as_ref(), &order.column)?;
            let direction = if order.ascending { "ASC" } else { "DESC" };
            qb.push(" ORDER BY ")
                .push(&order.column)
                .push(" ")
                .push(direction);
        }

        let rows = qb.build().fetch_all(&self.pool).await.map_err(map_sqlx)?;
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(row.try_get::<JsonValue, _>("record")?);
        }
        debug!(table, rows = records.len(), "postgres select");
        Ok(records)
    }

    async fn update(&self, query: &UpdateQuery) -> Result<Vec<JsonValue>, StoreError> {
        let model = self.model(&query.table)?;
        let table = query.table.as_str();
        if query.patch.is_empty() {
            return Err(StoreError::rejected(400, "Update requires at least one column"));
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE ");
        qb.push(table).push(" SET ");
        for (idx, (col, value)) in query.patch.iter().enumerate() {
            let sql_type = column_type(model.as_ref(), col)?;
            if idx > 0 {
                qb.push(", ");
            }
            qb.push(col)
                .push(" = ")
                .push_bind(bind_text(value))
                .push("::")
                .push(sql_type);
        }
        push_filters(&mut qb, model.as_ref(), &query.filters)?;
        qb.push(" RETURNING row_to_json(")
            .push(table)
            .push(".*) AS record");

        let rows = qb.build().fetch_all(&self.pool).await.map_err(map_sqlx)?;
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(row.try_get::<JsonValue, _>("record")?);
        }
        debug!(table, rows = records.len(), "postgres update");
        Ok(records)
    }
}
