//! Service over a real PostgreSQL database.
//!
//! Needs `DATABASE_URL` (read from `.env` too); the test is skipped when it is unset.
//! Tables are created if missing and every run works on freshly created lists.

use grocery_share::{GroceryError, GroceryService, LocalAuth, NewItem, PostgresStore, StoreError, User};
use std::env;
use std::sync::Arc;
use uuid::Uuid;

async fn connect() -> Result<Option<PostgresStore>, Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let Ok(url) = env::var("DATABASE_URL") else {
        println!("DATABASE_URL not set; skipping");
        return Ok(None);
    };
    let store = PostgresStore::connect(&url).await?;
    store.migrate().await?;
    Ok(Some(store))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_postgres_store() -> Result<(), Box<dyn std::error::Error>> {
    let Some(store) = connect().await? else {
        return Ok(());
    };
    let store = Arc::new(store);
    let auth = Arc::new(LocalAuth::anonymous());
    let service = GroceryService::new(store.clone(), auth.clone());

    println!("--- test_postgres_store ---");

    // Anonymous list, open to anyone.
    let shared = service.create_list("Shared (pg test)", None, Some("Rewe")).await?;
    assert!(shared.is_anonymous());
    let added = service
        .add_items(
            shared.id,
            &[
                NewItem::new("Milk", 2.0, "Dairy"),
                NewItem::new("Rye bread", 0.5, "Bakery").comment("half loaf"),
            ],
        )
        .await?;
    assert_eq!(added[0].name, "kliM");
    assert_eq!(added[1].quantity, 0.5);

    service.update_item_purchased(added[0].id, true).await?;
    service.add_item_reply(added[1].id, "sold out").await?;
    let loaded = service.get_list(shared.id).await?;
    assert_eq!(loaded.items.len(), 2);
    for item in &loaded.items {
        assert_eq!(item.purchased, item.id == added[0].id);
    }

    // Owned lists.
    let alice = User::new(Uuid::new_v4());
    auth.sign_in_as(alice.clone()).await;
    let first = service.create_list("Alice 1", None, None).await?;
    let second = service.create_list("Alice 2", None, None).await?;
    assert_eq!(first.user_id, Some(alice.id));

    let lists = service.get_all_lists().await?;
    let ids: Vec<Uuid> = lists.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    // Someone else cannot add to Alice's list.
    auth.sign_in_as(User::new(Uuid::new_v4())).await;
    let err = service
        .add_items(first.id, &[NewItem::new("Intruder", 1.0, "None")])
        .await
        .unwrap_err();
    assert!(matches!(err, GroceryError::Unauthorized { .. }));
    assert!(service.get_list(first.id).await?.items.is_empty());

    // Database-side rejections.
    let err = service.create_list("", None, None).await.unwrap_err();
    assert!(matches!(err, GroceryError::Store(StoreError::Rejected { code: Some(ref c), .. }) if c == "23514"));

    auth.sign_out().await;
    let err = service
        .add_items(Uuid::new_v4(), &[NewItem::new("Ghost", 1.0, "None")])
        .await
        .unwrap_err();
    assert!(matches!(err, GroceryError::Store(StoreError::Rejected { code: Some(ref c), .. }) if c == "23503"));

    let err = service.update_item_purchased(Uuid::new_v4(), true).await.unwrap_err();
    assert!(matches!(err, GroceryError::Store(StoreError::NoRows { .. })));

    println!("--- test_postgres_store OK ---");
    Ok(())
}
