use crate::entities::{product_entity as products, user_entity as users};
use crate::error::AppResult;
use sea_orm::{DatabaseConnection, EntityTrait};

/// Existence and current price of a catalog product at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProduct {
    pub id: i64,
    /// Current catalog price in cents.
    pub price: i64,
}

/// Read-only view of the catalog consumed by the order services. User and
/// product management live outside this subsystem; everything here is a
/// lookup against state owned elsewhere.
#[allow(async_fn_in_trait)]
pub trait CatalogLookup: Clone {
    async fn resolve_user(&self, user_id: i64) -> AppResult<bool>;

    async fn resolve_product(&self, product_id: i64) -> AppResult<Option<ResolvedProduct>>;
}

#[derive(Clone)]
pub struct CatalogService {
    pool: DatabaseConnection,
}

impl CatalogService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }
}

impl CatalogLookup for CatalogService {
    async fn resolve_user(&self, user_id: i64) -> AppResult<bool> {
        let user = users::Entity::find_by_id(user_id).one(&self.pool).await?;
        Ok(user.is_some())
    }

    async fn resolve_product(&self, product_id: i64) -> AppResult<Option<ResolvedProduct>> {
        let product = products::Entity::find_by_id(product_id)
            .one(&self.pool)
            .await?;
        Ok(product.map(|p| ResolvedProduct {
            id: p.id,
            price: p.price,
        }))
    }
}
