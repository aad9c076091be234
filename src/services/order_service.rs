use crate::entities::{
    OrderStatus, order_detail_entity as order_details, order_entity as orders,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    CartItem, CreateOrderRequest, OrderDetailResponse, OrderListResponse, OrderResponse,
    UpdateOrderRequest,
};
use crate::services::{CatalogLookup, CatalogService};
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, IsolationLevel, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

/// Attempts for a status transition that loses a serialization race before
/// the conflict is surfaced to the caller.
const STATUS_UPDATE_ATTEMPTS: u32 = 3;

pub type AppOrderService = OrderService<CatalogService>;

#[derive(Clone)]
pub struct OrderService<C: CatalogLookup> {
    pool: DatabaseConnection,
    catalog: C,
}

impl<C: CatalogLookup> OrderService<C> {
    pub fn new(pool: DatabaseConnection, catalog: C) -> Self {
        Self { pool, catalog }
    }

    /// Converts a submitted cart into a durable order.
    ///
    /// All references are resolved and every line priced before the write
    /// transaction begins; the order row and its detail rows then commit as
    /// one unit or not at all. The total is recomputed server-side from the
    /// snapshotted line prices, never taken from the client.
    pub async fn create_order(&self, request: &CreateOrderRequest) -> AppResult<OrderResponse> {
        if !self.catalog.resolve_user(request.user_id).await? {
            return Err(AppError::NotFound(format!(
                "Cannot find user with id: {}",
                request.user_id
            )));
        }

        let shipping_date =
            resolve_shipping_date(request.shipping_date, Utc::now().date_naive())?;
        let (lines, total_money) = price_cart_lines(&self.catalog, &request.cart_items).await?;
        verify_client_total(request.total_money, total_money)?;

        let txn = self.pool.begin().await?;

        let order = orders::ActiveModel {
            user_id: Set(request.user_id),
            full_name: Set(non_blank(&request.full_name).unwrap_or_default()),
            email: Set(non_blank(&request.email)),
            phone_number: Set(request.phone_number.trim().to_string()),
            address: Set(request.address.trim().to_string()),
            note: Set(non_blank(&request.note)),
            order_date: Set(Utc::now()),
            status: Set(OrderStatus::Pending),
            total_money: Set(total_money),
            shipping_method: Set(non_blank(&request.shipping_method)),
            shipping_address: Set(non_blank(&request.shipping_address)),
            shipping_date: Set(shipping_date),
            payment_method: Set(non_blank(&request.payment_method)),
            active: Set(true),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if !lines.is_empty() {
            let detail_models: Vec<order_details::ActiveModel> = lines
                .into_iter()
                .map(|line| order_details::ActiveModel {
                    order_id: Set(order.id),
                    product_id: Set(line.product_id),
                    price: Set(line.price),
                    number_of_products: Set(line.number_of_products),
                    total_money: Set(line.total_money),
                    color: Set(line.color),
                    ..Default::default()
                })
                .collect();
            order_details::Entity::insert_many(detail_models)
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        let details = self.load_details(order.id).await?;
        Ok(OrderResponse::with_details(order, details))
    }

    pub async fn get_order(&self, id: i64) -> AppResult<OrderResponse> {
        let order = orders::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Cannot find order with id: {id}")))?;
        let details = self.load_details(order.id).await?;
        Ok(OrderResponse::with_details(order, details))
    }

    pub async fn get_orders_by_user(&self, user_id: i64) -> AppResult<Vec<OrderResponse>> {
        let models = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .order_by_asc(orders::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    /// Keyword + pagination search over full_name, phone_number, address and
    /// note. An empty keyword matches everything; an out-of-range page index
    /// yields an empty page.
    pub async fn search_orders(
        &self,
        keyword: &str,
        page: u64,
        limit: u64,
    ) -> AppResult<OrderListResponse> {
        let limit = limit.max(1);
        let mut query = orders::Entity::find();

        let keyword = keyword.trim();
        if !keyword.is_empty() {
            use sea_orm::sea_query::extension::postgres::PgExpr;
            let pattern = format!("%{keyword}%");
            query = query.filter(
                Condition::any()
                    .add(Expr::col(orders::Column::FullName).ilike(pattern.as_str()))
                    .add(Expr::col(orders::Column::PhoneNumber).ilike(pattern.as_str()))
                    .add(Expr::col(orders::Column::Address).ilike(pattern.as_str()))
                    .add(Expr::col(orders::Column::Note).ilike(pattern.as_str())),
            );
        }

        // id-ascending keeps page boundaries stable between identical calls
        let paginator = query
            .order_by_asc(orders::Column::Id)
            .paginate(&self.pool, limit);
        let total_pages = paginator.num_pages().await?;
        let models = paginator.fetch_page(page).await?;

        Ok(OrderListResponse {
            orders: models.into_iter().map(Into::into).collect(),
            total_pages,
            current_page: page,
        })
    }

    /// Sparse field update. Status and the active flag are deliberately not
    /// reachable from here; they have their own operations.
    pub async fn update_order(
        &self,
        id: i64,
        request: &UpdateOrderRequest,
    ) -> AppResult<OrderResponse> {
        let order = orders::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .filter(|o| o.active)
            .ok_or_else(|| AppError::NotFound(format!("Cannot find order with id: {id}")))?;

        if let Some(user_id) = request.user_id {
            if !self.catalog.resolve_user(user_id).await? {
                return Err(AppError::NotFound(format!(
                    "Cannot find user with id: {user_id}"
                )));
            }
        }

        let changes = order_update_active_model(order.clone(), request);
        let updated = if changes.is_changed() {
            changes.update(&self.pool).await?
        } else {
            order
        };

        let details = self.load_details(updated.id).await?;
        Ok(OrderResponse::with_details(updated, details))
    }

    /// Applies a status transition through the state machine.
    ///
    /// Read-validate-write runs in one SERIALIZABLE transaction so two
    /// concurrent transitions cannot both validate against the same stale
    /// status. The loser of the race is retried a few times against the
    /// committed state before the conflict is reported.
    pub async fn update_order_status(
        &self,
        id: i64,
        requested_status: &str,
    ) -> AppResult<OrderResponse> {
        let requested: OrderStatus = requested_status.parse()?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.apply_status_transition(id, requested.clone()).await {
                Err(AppError::DatabaseError(err)) if is_serialization_conflict(&err) => {
                    if attempt >= STATUS_UPDATE_ATTEMPTS {
                        return Err(AppError::Conflict(format!(
                            "Concurrent status change on order {id}"
                        )));
                    }
                    log::warn!(
                        "Serialization conflict on order {id} status update, retrying (attempt {attempt})"
                    );
                }
                other => return other,
            }
        }
    }

    async fn apply_status_transition(
        &self,
        id: i64,
        requested: OrderStatus,
    ) -> AppResult<OrderResponse> {
        let txn = self
            .pool
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?;

        let order = orders::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .filter(|o| o.active)
            .ok_or_else(|| AppError::NotFound(format!("Cannot find order with id: {id}")))?;

        order.status.validate_transition(&requested)?;

        let mut changes = order.into_active_model();
        changes.status = Set(requested);
        let updated = changes.update(&txn).await?;

        txn.commit().await?;
        Ok(updated.into())
    }

    /// Soft delete: flips the active flag and nothing else. Idempotent; a
    /// missing or already-inactive order is a no-op.
    pub async fn delete_order(&self, id: i64) -> AppResult<()> {
        let Some(order) = orders::Entity::find_by_id(id).one(&self.pool).await? else {
            return Ok(());
        };
        if !order.active {
            return Ok(());
        }

        let mut changes = order.into_active_model();
        changes.active = Set(false);
        changes.update(&self.pool).await?;
        Ok(())
    }

    async fn load_details(&self, order_id: i64) -> AppResult<Vec<OrderDetailResponse>> {
        let details = order_details::Entity::find()
            .filter(order_details::Column::OrderId.eq(order_id))
            .order_by_asc(order_details::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(details.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug)]
pub(crate) struct PricedLine {
    pub product_id: i64,
    pub number_of_products: i32,
    pub price: i64,
    pub total_money: i64,
    pub color: Option<String>,
}

/// Resolves and prices every cart line against the catalog. Prices are
/// snapshots taken here; the resulting total is the authoritative one.
pub(crate) async fn price_cart_lines<C: CatalogLookup>(
    catalog: &C,
    items: &[CartItem],
) -> AppResult<(Vec<PricedLine>, i64)> {
    let mut lines = Vec::with_capacity(items.len());
    let mut total_money = 0i64;

    for item in items {
        if item.quantity <= 0 {
            return Err(AppError::ValidationError(format!(
                "Quantity must be positive for product {}",
                item.product_id
            )));
        }
        let product = catalog
            .resolve_product(item.product_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Cannot find product with id: {}", item.product_id))
            })?;

        let line_total = line_total(product.price, item.quantity, item.product_id)?;
        total_money = total_money.checked_add(line_total).ok_or_else(|| {
            AppError::ValidationError("Order total exceeds the representable amount".to_string())
        })?;
        lines.push(PricedLine {
            product_id: item.product_id,
            number_of_products: item.quantity,
            price: product.price,
            total_money: line_total,
            color: item.color.clone(),
        });
    }

    Ok((lines, total_money))
}

/// Line total in cents; absurd quantities must fail loudly instead of
/// wrapping.
pub(crate) fn line_total(price: i64, quantity: i32, product_id: i64) -> AppResult<i64> {
    price.checked_mul(quantity as i64).ok_or_else(|| {
        AppError::ValidationError(format!(
            "Line total exceeds the representable amount for product {product_id}"
        ))
    })
}

pub(crate) fn resolve_shipping_date(
    requested: Option<NaiveDate>,
    today: NaiveDate,
) -> AppResult<NaiveDate> {
    let shipping_date = requested.unwrap_or(today);
    if shipping_date < today {
        return Err(AppError::ValidationError(
            "Shipping date must be today or later".to_string(),
        ));
    }
    Ok(shipping_date)
}

/// A client-supplied total is only an echo of what it expects; the computed
/// total wins, and a disagreement means the cart changed underneath it.
pub(crate) fn verify_client_total(echo: Option<i64>, computed: i64) -> AppResult<()> {
    match echo {
        Some(total) if total != computed => Err(AppError::ValidationError(format!(
            "Total money mismatch: expected {computed}, got {total}"
        ))),
        _ => Ok(()),
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Field-by-field sparse merge of an update request onto the stored order.
/// Blank strings and absent fields leave the stored value untouched; status
/// and active are never assigned here.
pub(crate) fn order_update_active_model(
    order: orders::Model,
    request: &UpdateOrderRequest,
) -> orders::ActiveModel {
    let mut changes = order.into_active_model();

    if let Some(user_id) = request.user_id {
        changes.user_id = Set(user_id);
    }
    if let Some(v) = non_blank(&request.full_name) {
        changes.full_name = Set(v);
    }
    if let Some(v) = non_blank(&request.email) {
        changes.email = Set(Some(v));
    }
    if let Some(v) = non_blank(&request.phone_number) {
        changes.phone_number = Set(v);
    }
    if let Some(v) = non_blank(&request.address) {
        changes.address = Set(v);
    }
    if let Some(v) = non_blank(&request.note) {
        changes.note = Set(Some(v));
    }
    if let Some(total) = request.total_money {
        changes.total_money = Set(total);
    }
    if let Some(v) = non_blank(&request.shipping_method) {
        changes.shipping_method = Set(Some(v));
    }
    if let Some(v) = non_blank(&request.shipping_address) {
        changes.shipping_address = Set(Some(v));
    }
    if let Some(date) = request.shipping_date {
        changes.shipping_date = Set(date);
    }
    if let Some(v) = non_blank(&request.payment_method) {
        changes.payment_method = Set(Some(v));
    }

    changes
}

fn is_serialization_conflict(err: &DbErr) -> bool {
    // Postgres reports serialization failures as SQLSTATE 40001
    let text = err.to_string();
    text.contains("40001") || text.to_ascii_lowercase().contains("could not serialize")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ResolvedProduct;
    use sea_orm::{ActiveValue, DatabaseBackend, MockDatabase};
    use std::collections::{BTreeMap, HashMap};

    #[derive(Clone, Default)]
    struct FakeCatalog {
        users: Vec<i64>,
        products: HashMap<i64, i64>,
    }

    impl CatalogLookup for FakeCatalog {
        async fn resolve_user(&self, user_id: i64) -> AppResult<bool> {
            Ok(self.users.contains(&user_id))
        }

        async fn resolve_product(&self, product_id: i64) -> AppResult<Option<ResolvedProduct>> {
            Ok(self.products.get(&product_id).map(|price| ResolvedProduct {
                id: product_id,
                price: *price,
            }))
        }
    }

    fn catalog() -> FakeCatalog {
        FakeCatalog {
            users: vec![7],
            products: HashMap::from([(1, 1000), (2, 500)]),
        }
    }

    fn sample_order() -> orders::Model {
        orders::Model {
            id: 1,
            user_id: 7,
            full_name: "Alice Tran".to_string(),
            email: Some("alice@example.com".to_string()),
            phone_number: "0123456789".to_string(),
            address: "12 High Street".to_string(),
            note: Some("leave at door".to_string()),
            order_date: Utc::now(),
            status: OrderStatus::Pending,
            total_money: 2500,
            shipping_method: None,
            shipping_address: None,
            shipping_date: Utc::now().date_naive(),
            payment_method: Some("cod".to_string()),
            active: true,
        }
    }

    #[tokio::test]
    async fn test_price_cart_lines_totals_reconcile() {
        let items = vec![
            CartItem {
                product_id: 1,
                quantity: 2,
                color: None,
            },
            CartItem {
                product_id: 2,
                quantity: 1,
                color: Some("red".to_string()),
            },
        ];

        let (lines, total) = price_cart_lines(&catalog(), &items).await.unwrap();

        assert_eq!(total, 2500);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].price, 1000);
        assert_eq!(lines[0].total_money, 2000);
        assert_eq!(lines[1].total_money, 500);
        assert_eq!(
            total,
            lines
                .iter()
                .map(|l| l.price * l.number_of_products as i64)
                .sum::<i64>()
        );
    }

    #[tokio::test]
    async fn test_price_cart_lines_rejects_unknown_product() {
        let items = vec![CartItem {
            product_id: 99,
            quantity: 1,
            color: None,
        }];
        let err = price_cart_lines(&catalog(), &items).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_price_cart_lines_rejects_non_positive_quantity() {
        for quantity in [0, -3] {
            let items = vec![CartItem {
                product_id: 1,
                quantity,
                color: None,
            }];
            let err = price_cart_lines(&catalog(), &items).await.unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }
    }

    #[test]
    fn test_resolve_shipping_date() {
        let today = Utc::now().date_naive();
        let yesterday = today.pred_opt().unwrap();
        let tomorrow = today.succ_opt().unwrap();

        assert_eq!(resolve_shipping_date(None, today).unwrap(), today);
        assert_eq!(resolve_shipping_date(Some(today), today).unwrap(), today);
        assert_eq!(
            resolve_shipping_date(Some(tomorrow), today).unwrap(),
            tomorrow
        );
        assert!(matches!(
            resolve_shipping_date(Some(yesterday), today),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_verify_client_total() {
        assert!(verify_client_total(None, 2500).is_ok());
        assert!(verify_client_total(Some(2500), 2500).is_ok());
        assert!(matches!(
            verify_client_total(Some(2400), 2500),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_update_skips_blank_and_absent_fields() {
        let request = UpdateOrderRequest {
            note: Some("   ".to_string()),
            ..Default::default()
        };
        let changes = order_update_active_model(sample_order(), &request);

        assert!(matches!(changes.note, ActiveValue::Unchanged(_)));
        assert!(matches!(changes.full_name, ActiveValue::Unchanged(_)));
        assert!(!changes.is_changed());
    }

    #[test]
    fn test_update_overwrites_present_fields_trimmed() {
        let request = UpdateOrderRequest {
            note: Some("  ring the bell  ".to_string()),
            full_name: Some("Bob Le".to_string()),
            total_money: Some(3000),
            ..Default::default()
        };
        let changes = order_update_active_model(sample_order(), &request);

        assert_eq!(
            changes.note,
            ActiveValue::Set(Some("ring the bell".to_string()))
        );
        assert_eq!(changes.full_name, ActiveValue::Set("Bob Le".to_string()));
        assert_eq!(changes.total_money, ActiveValue::Set(3000));
    }

    #[test]
    fn test_update_never_touches_status_or_active() {
        let request = UpdateOrderRequest {
            full_name: Some("Bob Le".to_string()),
            ..Default::default()
        };
        let changes = order_update_active_model(sample_order(), &request);

        assert!(matches!(changes.status, ActiveValue::Unchanged(_)));
        assert!(matches!(changes.active, ActiveValue::Unchanged(_)));
    }

    #[tokio::test]
    async fn test_price_cart_lines_rejects_overflowing_line_total() {
        let catalog = FakeCatalog {
            users: vec![7],
            products: HashMap::from([(1, i64::MAX / 2)]),
        };
        let items = vec![CartItem {
            product_id: 1,
            quantity: 3,
            color: None,
        }];
        let err = price_cart_lines(&catalog, &items).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_price_cart_lines_rejects_overflowing_order_total() {
        let catalog = FakeCatalog {
            users: vec![7],
            products: HashMap::from([(1, i64::MAX / 2 + 1), (2, i64::MAX / 2 + 1)]),
        };
        let items = vec![
            CartItem {
                product_id: 1,
                quantity: 1,
                color: None,
            },
            CartItem {
                product_id: 2,
                quantity: 1,
                color: None,
            },
        ];
        let err = price_cart_lines(&catalog, &items).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_delete_order_is_idempotent() {
        let active = sample_order();
        let mut inactive = sample_order();
        inactive.active = false;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![active],           // lookup before the first delete
                vec![inactive.clone()], // update returning the deactivated row
                vec![inactive],         // lookup before the second delete
            ])
            .into_connection();

        let service = OrderService::new(db.clone(), catalog());
        service.delete_order(1).await.unwrap();
        service.delete_order(1).await.unwrap();

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 3);
        assert!(format!("{:?}", log[1]).contains("UPDATE"));
        // already inactive: the second call only reads
        assert!(!format!("{:?}", log[2]).contains("UPDATE"));
    }

    #[tokio::test]
    async fn test_delete_missing_order_is_a_noop() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<orders::Model>::new()])
            .into_connection();

        let service = OrderService::new(db.clone(), catalog());
        service.delete_order(42).await.unwrap();

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        assert!(!format!("{:?}", log[0]).contains("UPDATE"));
    }

    #[tokio::test]
    async fn test_search_orders_empty_keyword_pages_by_ascending_id() {
        let first = sample_order();
        let mut second = sample_order();
        second.id = 2;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([(
                "num_items",
                sea_orm::Value::BigInt(Some(12)),
            )])]])
            .append_query_results([vec![first, second]])
            .into_connection();

        let service = OrderService::new(db.clone(), catalog());
        let page = service.search_orders("", 0, 10).await.unwrap();

        assert_eq!(page.total_pages, 2);
        assert_eq!(page.current_page, 0);
        assert_eq!(
            page.orders.iter().map(|o| o.id).collect::<Vec<_>>(),
            vec![1, 2]
        );

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains(r#"ORDER BY "orders"."id" ASC"#));
        // empty keyword matches everything, no ILIKE filter
        assert!(!log.contains("ILIKE"));
    }

    #[tokio::test]
    async fn test_search_orders_keyword_filters_contact_fields() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([(
                "num_items",
                sea_orm::Value::BigInt(Some(1)),
            )])]])
            .append_query_results([vec![sample_order()]])
            .into_connection();

        let service = OrderService::new(db.clone(), catalog());
        let page = service.search_orders("alice", 0, 10).await.unwrap();

        assert_eq!(page.total_pages, 1);
        assert_eq!(page.orders.len(), 1);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("ILIKE"));
    }
}
