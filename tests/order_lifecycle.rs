//! End-to-end tests against a real Postgres instance.
//!
//! Ignored by default; point TEST_DATABASE_URL at a disposable database and
//! run `cargo test -- --ignored` to exercise them.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use shopapp_backend::database::run_migrations;
use shopapp_backend::entities::{
    OrderStatus, order_entity as orders, product_entity as products, user_entity as users,
};
use shopapp_backend::error::{AppError, AppResult};
use shopapp_backend::models::{CartItem, CreateOrderRequest};
use shopapp_backend::services::{CatalogLookup, CatalogService, OrderService, ResolvedProduct};

async fn connect() -> DatabaseConnection {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let db = Database::connect(url).await.expect("connect to database");
    run_migrations(&db).await.expect("run migrations");
    db
}

async fn seed_user(db: &DatabaseConnection) -> i64 {
    users::ActiveModel {
        full_name: Set("Integration Buyer".to_string()),
        phone_number: Set("0123456789".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed user")
    .id
}

async fn seed_product(db: &DatabaseConnection, name: &str, price: i64) -> i64 {
    products::ActiveModel {
        name: Set(name.to_string()),
        price: Set(price),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed product")
    .id
}

fn request_for(user_id: i64, cart_items: Vec<CartItem>) -> CreateOrderRequest {
    CreateOrderRequest {
        user_id,
        full_name: Some("Integration Buyer".to_string()),
        email: None,
        phone_number: "0123456789".to_string(),
        address: "1 Test Lane".to_string(),
        note: None,
        total_money: None,
        shipping_method: None,
        shipping_address: None,
        shipping_date: None,
        payment_method: None,
        cart_items,
    }
}

#[tokio::test]
#[ignore = "requires a Postgres database (set TEST_DATABASE_URL)"]
async fn create_cancel_then_reject_reactivation() {
    let db = connect().await;
    let user_id = seed_user(&db).await;
    let product_a = seed_product(&db, "ice cream", 1000).await;
    let product_b = seed_product(&db, "topping", 500).await;
    let service = OrderService::new(db.clone(), CatalogService::new(db.clone()));

    let created = service
        .create_order(&request_for(
            user_id,
            vec![
                CartItem {
                    product_id: product_a,
                    quantity: 2,
                    color: None,
                },
                CartItem {
                    product_id: product_b,
                    quantity: 1,
                    color: None,
                },
            ],
        ))
        .await
        .expect("create order");

    assert_eq!(created.total_money, 2500);
    assert_eq!(created.status, OrderStatus::Pending);
    assert_eq!(created.order_details.len(), 2);
    assert_eq!(
        created.total_money,
        created
            .order_details
            .iter()
            .map(|d| d.price * d.number_of_products as i64)
            .sum::<i64>()
    );

    let cancelled = service
        .update_order_status(created.id, "CANCELLED")
        .await
        .expect("cancel pending order");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    let err = service
        .update_order_status(created.id, "PENDING")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
}

/// Claims every product exists, including ones the store has never seen.
/// Lets a detail row fail its foreign key mid-batch.
#[derive(Clone)]
struct PhantomCatalog;

impl CatalogLookup for PhantomCatalog {
    async fn resolve_user(&self, _user_id: i64) -> AppResult<bool> {
        Ok(true)
    }

    async fn resolve_product(&self, product_id: i64) -> AppResult<Option<ResolvedProduct>> {
        Ok(Some(ResolvedProduct {
            id: product_id,
            price: 1000,
        }))
    }
}

#[tokio::test]
#[ignore = "requires a Postgres database (set TEST_DATABASE_URL)"]
async fn failed_detail_insert_rolls_back_the_whole_order() {
    let db = connect().await;
    let user_id = seed_user(&db).await;
    let real_product = seed_product(&db, "ice cream", 1000).await;
    let service = OrderService::new(db.clone(), PhantomCatalog);

    let result = service
        .create_order(&request_for(
            user_id,
            vec![
                CartItem {
                    product_id: real_product,
                    quantity: 1,
                    color: None,
                },
                CartItem {
                    product_id: i64::MAX - 1,
                    quantity: 1,
                    color: None,
                },
            ],
        ))
        .await;
    assert!(result.is_err());

    let remaining = orders::Entity::find()
        .filter(orders::Column::UserId.eq(user_id))
        .count(&db)
        .await
        .expect("count orders");
    assert_eq!(remaining, 0);
}
