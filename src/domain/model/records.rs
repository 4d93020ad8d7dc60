//! Typed rows of `grocery_lists` and `grocery_items`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};
use uuid::Uuid;

/// A row of `grocery_lists`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroceryList {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Owner; `None` for anonymous lists.
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub store: Option<String>,
}

impl GroceryList {
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }
}

/// A row of `grocery_items`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroceryItem {
    pub id: Uuid,
    pub list_id: Uuid,
    /// Stored name, character-reversed relative to what the caller supplied.
    pub name: String,
    pub quantity: f64,
    pub category: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub purchased: bool,
    #[serde(default)]
    pub reply: Option<String>,
}

/// Fields a caller supplies when creating a list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewList {
    pub name: String,
    pub purchase_date: Option<NaiveDate>,
    pub store: Option<String>,
}

impl NewList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn purchase_date(mut self, date: NaiveDate) -> Self {
        self.purchase_date = Some(date);
        self
    }

    pub fn store(mut self, store: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self
    }

    /// Insert payload: `name`, the optional fields that carry a value, and the owner if any.
    pub fn to_record(&self, owner: Option<Uuid>) -> JsonValue {
        let mut record = Map::new();
        record.insert("name".into(), json!(self.name));
        if let Some(date) = self.purchase_date {
            record.insert("purchase_date".into(), json!(date));
        }
        if let Some(store) = self.store.as_deref().filter(|s| !s.is_empty()) {
            record.insert("store".into(), json!(store));
        }
        if let Some(user_id) = owner {
            record.insert("user_id".into(), json!(user_id));
        }
        JsonValue::Object(record)
    }
}

/// Fields a caller supplies for each item added to a list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub quantity: f64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl NewItem {
    pub fn new(name: impl Into<String>, quantity: f64, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            category: category.into(),
            comment: None,
        }
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Insert payload tagged with `list_id`. The name is stored reversed.
    pub fn to_record(&self, list_id: Uuid) -> JsonValue {
        let mut record = Map::new();
        record.insert("name".into(), json!(reverse_name(&self.name)));
        record.insert("quantity".into(), json!(self.quantity));
        record.insert("category".into(), json!(self.category));
        if let Some(comment) = &self.comment {
            record.insert("comment".into(), json!(comment));
        }
        record.insert("list_id".into(), json!(list_id));
        JsonValue::Object(record)
    }
}

/// A list together with all of its items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListWithItems {
    pub list: GroceryList,
    pub items: Vec<GroceryItem>,
}

/// Full reversal of `name` by Unicode scalar value.
///
/// Existing rows were written this way, so every insert must keep doing it.
pub fn reverse_name(name: &str) -> String {
    name.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_name_is_full_reversal() {
        assert_eq!(reverse_name("Milk"), "kliM");
        assert_eq!(reverse_name(""), "");
        assert_eq!(reverse_name("a"), "a");
        assert_eq!(reverse_name("Crème brûlée"), "eélûrb emèrC");
    }

    #[test]
    fn reverse_name_twice_is_identity() {
        for s in ["Bananas", "2 x Eggs", "ÄÖÜ", "  padded  ", "日本酒"] {
            assert_eq!(reverse_name(&reverse_name(s)), s);
        }
    }

    #[test]
    fn new_list_record_skips_absent_fields() {
        let record = NewList::new("Weekly").to_record(None);
        assert_eq!(record, json!({ "name": "Weekly" }));

        let owner = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        let record = NewList::new("Party")
            .purchase_date(date)
            .store("Lidl")
            .to_record(Some(owner));
        assert_eq!(record["purchase_date"], json!("2024-05-17"));
        assert_eq!(record["store"], json!("Lidl"));
        assert_eq!(record["user_id"], json!(owner.to_string()));
    }

    #[test]
    fn empty_store_is_treated_as_absent() {
        let record = NewList::new("Weekly").store("").to_record(None);
        assert!(record.get("store").is_none());
    }

    #[test]
    fn new_item_record_reverses_name_and_tags_list() {
        let list_id = Uuid::new_v4();
        let record = NewItem::new("Bread", 2.0, "Bakery")
            .comment("sliced")
            .to_record(list_id);
        assert_eq!(record["name"], json!("daerB"));
        assert_eq!(record["list_id"], json!(list_id.to_string()));
        assert_eq!(record["comment"], json!("sliced"));
        assert!(record.get("purchased").is_none());
    }

    #[test]
    fn list_row_decodes_with_missing_optionals() {
        let row = json!({
            "id": "6f1c1f8e-8f7a-4a53-9d2a-0d0b7b6c1a11",
            "name": "Weekly",
            "created_at": "2024-05-17T09:30:00.123456+00:00",
            "user_id": null
        });
        let list: GroceryList = serde_json::from_value(row).unwrap();
        assert!(list.is_anonymous());
        assert_eq!(list.store, None);
    }
}
