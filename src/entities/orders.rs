use crate::error::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Closed set of order states. The boundary may carry the status as free
/// text; it is parsed into this enum before it reaches any business logic.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "order_status")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "shipped")]
    Shipped,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Processing => write!(f, "processing"),
            OrderStatus::Shipped => write!(f, "shipped"),
            OrderStatus::Delivered => write!(f, "delivered"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "" => Err(AppError::ValidationError(
                "Status cannot be blank".to_string(),
            )),
            other => Err(AppError::ValidationError(format!(
                "Invalid status: {other}"
            ))),
        }
    }
}

impl OrderStatus {
    /// Checks whether the transition from `self` to `requested` is legal.
    ///
    /// DELIVERED is terminal except for a late cancellation; CANCELLED is
    /// strictly terminal; cancellation is only reachable from PENDING.
    pub fn validate_transition(&self, requested: &OrderStatus) -> Result<(), AppError> {
        let rejected = match self {
            OrderStatus::Delivered => *requested != OrderStatus::Cancelled,
            OrderStatus::Cancelled => true,
            current => *requested == OrderStatus::Cancelled && *current != OrderStatus::Pending,
        };

        if rejected {
            return Err(AppError::InvalidTransition {
                current: self.clone(),
                requested: requested.clone(),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub email: Option<String>,
    pub phone_number: String,
    pub address: String,
    pub note: Option<String>,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub total_money: i64,
    pub shipping_method: Option<String>,
    pub shipping_address: Option<String>,
    pub shipping_date: NaiveDate,
    pub payment_method: Option<String>,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
