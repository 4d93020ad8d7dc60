//! The grocery data service.
//!
//! Sits between the views and the remote store. It is responsible for:
//! 1.  Building list/item records and writing them to `grocery_lists` and
//!     `grocery_items`.
//! 2.  Enforcing list ownership before items are added.
//! 3.  Decoding store rows into typed lists and items.
//!
//! Authentication is optional for everything except [`GroceryService::get_all_lists`].

use crate::domain::auth::User;
use crate::domain::model::{
    GroceryItem, GroceryList, ListWithItems, NewItem, NewList, GROCERY_ITEMS, GROCERY_LISTS,
};
use crate::error::{GroceryError, StoreError};
use crate::storage::{AuthProvider, SelectQuery, TableStore, UpdateQuery};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The service the views call. Cheap to clone; clones share the same store client.
#[derive(Clone)]
pub struct GroceryService {
    tables: Arc<dyn TableStore>,
    auth: Arc<dyn AuthProvider>,
}

fn decode<T: DeserializeOwned>(row: JsonValue) -> Result<T, GroceryError> {
    serde_json::from_value(row).map_err(|e| GroceryError::Store(StoreError::Decode(e)))
}

fn decode_all<T: DeserializeOwned>(rows: Vec<JsonValue>) -> Result<Vec<T>, GroceryError> {
    rows.into_iter().map(decode).collect()
}

/// Unwraps the one row a single-record write returns.
fn single_row(table: &str, mut rows: Vec<JsonValue>) -> Result<JsonValue, StoreError> {
    match rows.len() {
        1 => Ok(rows.remove(0)),
        0 => Err(StoreError::NoRows {
            table: table.to_string(),
        }),
        count => Err(StoreError::MultipleRows {
            table: table.to_string(),
            count,
        }),
    }
}

impl GroceryService {
    pub fn new(tables: Arc<dyn TableStore>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { tables, auth }
    }

    /// Service over a client that is both the table store and the auth provider.
    pub fn from_client<C>(client: Arc<C>) -> Self
    where
        C: TableStore + AuthProvider + 'static,
    {
        Self {
            tables: client.clone(),
            auth: client,
        }
    }

    pub fn auth(&self) -> &Arc<dyn AuthProvider> {
        &self.auth
    }

    /// Current user, treating a failed lookup as "nobody signed in".
    async fn resolve_user_lenient(&self) -> Option<User> {
        match self.auth.current_user().await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "could not resolve current user; continuing anonymously");
                None
            }
        }
    }

    /// Creates a list, owned by the current user when one is signed in.
    pub async fn create_list(
        &self,
        name: &str,
        purchase_date: Option<NaiveDate>,
        store: Option<&str>,
    ) -> Result<GroceryList, GroceryError> {
        let mut new_list = NewList::new(name);
        new_list.purchase_date = purchase_date;
        new_list.store = store.map(str::to_string);
        self.create(&new_list).await
    }

    /// Like [`GroceryService::create_list`], from a prepared [`NewList`].
    pub async fn create(&self, new_list: &NewList) -> Result<GroceryList, GroceryError> {
        let owner = self.resolve_user_lenient().await.map(|u| u.id);
        let record = new_list.to_record(owner);

        let rows = self.tables.insert(GROCERY_LISTS, vec![record]).await?;
        let list: GroceryList = decode(single_row(GROCERY_LISTS, rows)?)?;
        info!(list_id = %list.id, owned = owner.is_some(), "list created");
        Ok(list)
    }

    /// Adds a batch of items to a list.
    ///
    /// A signed-in user may only add to anonymous lists or lists they own.
    /// Item names are stored character-reversed.
    pub async fn add_items(
        &self,
        list_id: Uuid,
        items: &[NewItem],
    ) -> Result<Vec<GroceryItem>, GroceryError> {
        if let Some(user) = self.resolve_user_lenient().await {
            let query = SelectQuery::from(GROCERY_LISTS)
                .columns(&["id", "user_id"])
                .eq("id", list_id.to_string());
            let row = self.fetch_single(&query, list_id).await?;
            if let Some(owner) = row.get("user_id").and_then(JsonValue::as_str) {
                let owned_by_user = Uuid::parse_str(owner).map_or(false, |id| id == user.id);
                if !owned_by_user {
                    warn!(list_id = %list_id, user_id = %user.id, "refusing to add items to a list owned by someone else");
                    return Err(GroceryError::Unauthorized {
                        list_id: list_id.to_string(),
                    });
                }
            }
        }

        let records: Vec<JsonValue> = items.iter().map(|item| item.to_record(list_id)).collect();
        let rows = self.tables.insert(GROCERY_ITEMS, records).await?;
        let added: Vec<GroceryItem> = decode_all(rows)?;
        info!(list_id = %list_id, count = added.len(), "items added");
        Ok(added)
    }

    /// Reads a list and all of its items. Anyone holding the id may read it.
    pub async fn get_list(&self, list_id: Uuid) -> Result<ListWithItems, GroceryError> {
        let list_query = SelectQuery::from(GROCERY_LISTS).eq("id", list_id.to_string());
        let list: GroceryList = decode(self.fetch_single(&list_query, list_id).await?)?;

        let items_query = SelectQuery::from(GROCERY_ITEMS).eq("list_id", list_id.to_string());
        let items: Vec<GroceryItem> = decode_all(self.tables.select(&items_query).await?)?;

        debug!(list_id = %list_id, items = items.len(), "list loaded");
        Ok(ListWithItems { list, items })
    }

    /// Sets an item's purchased flag. No ownership check.
    pub async fn update_item_purchased(&self, item_id: Uuid, purchased: bool) -> Result<(), GroceryError> {
        let query = UpdateQuery::table(GROCERY_ITEMS)
            .set("purchased", purchased)
            .eq("id", item_id.to_string());
        self.update_one(&query).await?;
        info!(item_id = %item_id, purchased, "item purchase state updated");
        Ok(())
    }

    /// Sets an item's reply. No ownership check.
    pub async fn add_item_reply(&self, item_id: Uuid, reply: &str) -> Result<(), GroceryError> {
        let query = UpdateQuery::table(GROCERY_ITEMS)
            .set("reply", reply)
            .eq("id", item_id.to_string());
        self.update_one(&query).await?;
        info!(item_id = %item_id, "item reply added");
        Ok(())
    }

    /// All lists owned by the signed-in user, most recent first.
    pub async fn get_all_lists(&self) -> Result<Vec<GroceryList>, GroceryError> {
        let user = self
            .auth
            .current_user()
            .await?
            .ok_or(GroceryError::AuthRequired)?;

        let query = SelectQuery::from(GROCERY_LISTS)
            .eq("user_id", user.id.to_string())
            .order("created_at", false);
        let lists: Vec<GroceryList> = decode_all(self.tables.select(&query).await?)?;
        debug!(user_id = %user.id, lists = lists.len(), "lists loaded");
        Ok(lists)
    }

    /// `select_single`, with "no such row" reported as a lookup failure.
    async fn fetch_single(&self, query: &SelectQuery, id: Uuid) -> Result<JsonValue, GroceryError> {
        match self.tables.select_single(query).await {
            Ok(row) => Ok(row),
            Err(StoreError::NoRows { table }) => Err(GroceryError::Lookup {
                table,
                id: id.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_one(&self, query: &UpdateQuery) -> Result<(), GroceryError> {
        let rows = self.tables.update(query).await?;
        if rows.is_empty() {
            return Err(StoreError::NoRows {
                table: query.table.clone(),
            }
            .into());
        }
        Ok(())
    }
}
