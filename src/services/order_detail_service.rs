use crate::entities::{order_detail_entity as order_details, order_entity as orders};
use crate::error::{AppError, AppResult};
use crate::models::{OrderDetailRequest, OrderDetailResponse};
use crate::services::order_service::line_total;
use crate::services::{CatalogLookup, CatalogService, ResolvedProduct};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

pub type AppOrderDetailService = OrderDetailService<CatalogService>;

/// Management of individual line items after their order has been created.
/// These operations are independent of the parent order's status; the price
/// is always re-snapshotted from the catalog and the line total recomputed.
#[derive(Clone)]
pub struct OrderDetailService<C: CatalogLookup> {
    pool: DatabaseConnection,
    catalog: C,
}

impl<C: CatalogLookup> OrderDetailService<C> {
    pub fn new(pool: DatabaseConnection, catalog: C) -> Self {
        Self { pool, catalog }
    }

    pub async fn create_order_detail(
        &self,
        request: &OrderDetailRequest,
    ) -> AppResult<OrderDetailResponse> {
        let order = orders::Entity::find_by_id(request.order_id)
            .one(&self.pool)
            .await?
            .filter(|o| o.active)
            .ok_or_else(|| {
                AppError::NotFound(format!("Cannot find order with id: {}", request.order_id))
            })?;
        let product = self.resolve_product(request.product_id).await?;
        let quantity = positive_quantity(request.number_of_products, request.product_id)?;

        let detail = order_details::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(product.id),
            price: Set(product.price),
            number_of_products: Set(quantity),
            total_money: Set(line_total(product.price, quantity, product.id)?),
            color: Set(request.color.clone()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(detail.into())
    }

    pub async fn get_order_detail(&self, id: i64) -> AppResult<OrderDetailResponse> {
        let detail = order_details::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Cannot find order detail with id: {id}")))?;
        Ok(detail.into())
    }

    pub async fn get_order_details_by_order(
        &self,
        order_id: i64,
    ) -> AppResult<Vec<OrderDetailResponse>> {
        let details = order_details::Entity::find()
            .filter(order_details::Column::OrderId.eq(order_id))
            .order_by_asc(order_details::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(details.into_iter().map(Into::into).collect())
    }

    pub async fn update_order_detail(
        &self,
        id: i64,
        request: &OrderDetailRequest,
    ) -> AppResult<OrderDetailResponse> {
        let detail = order_details::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Cannot find order detail with id: {id}")))?;

        let order = orders::Entity::find_by_id(request.order_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Cannot find order with id: {}", request.order_id))
            })?;
        let product = self.resolve_product(request.product_id).await?;
        let quantity = positive_quantity(request.number_of_products, request.product_id)?;

        let mut changes = detail.into_active_model();
        changes.order_id = Set(order.id);
        changes.product_id = Set(product.id);
        changes.price = Set(product.price);
        changes.number_of_products = Set(quantity);
        changes.total_money = Set(line_total(product.price, quantity, product.id)?);
        changes.color = Set(request.color.clone());
        let updated = changes.update(&self.pool).await?;

        Ok(updated.into())
    }

    /// Details are hard-deleted; soft delete only applies to orders.
    pub async fn delete_order_detail(&self, id: i64) -> AppResult<()> {
        order_details::Entity::delete_by_id(id)
            .exec(&self.pool)
            .await?;
        Ok(())
    }

    async fn resolve_product(&self, product_id: i64) -> AppResult<ResolvedProduct> {
        self.catalog
            .resolve_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Cannot find product with id: {product_id}")))
    }
}

fn positive_quantity(quantity: i32, product_id: i64) -> AppResult<i32> {
    if quantity <= 0 {
        return Err(AppError::ValidationError(format!(
            "Quantity must be positive for product {product_id}"
        )));
    }
    Ok(quantity)
}
