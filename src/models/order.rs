use crate::entities::{OrderStatus, order_entity};
use crate::models::OrderDetailResponse;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub product_id: i64,
    pub quantity: i32,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: i64,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: String,
    pub address: String,
    pub note: Option<String>,
    /// Optional client echo of the expected total (cents). The server
    /// recomputes the total from the cart lines and rejects a mismatch.
    pub total_money: Option<i64>,
    pub shipping_method: Option<String>,
    pub shipping_address: Option<String>,
    pub shipping_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub cart_items: Vec<CartItem>,
}

/// Sparse field update: a string field is applied only when present and
/// non-blank after trimming; other fields are applied when present. Status
/// and the active flag are never touched by this request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub user_id: Option<i64>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub note: Option<String>,
    pub total_money: Option<i64>,
    pub shipping_method: Option<String>,
    pub shipping_address: Option<String>,
    pub shipping_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
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
    #[serde(default)]
    pub order_details: Vec<OrderDetailResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderSearchQuery {
    pub keyword: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total_pages: u64,
    pub current_page: u64,
}

impl From<order_entity::Model> for OrderResponse {
    fn from(m: order_entity::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            full_name: m.full_name,
            email: m.email,
            phone_number: m.phone_number,
            address: m.address,
            note: m.note,
            order_date: m.order_date,
            status: m.status,
            total_money: m.total_money,
            shipping_method: m.shipping_method,
            shipping_address: m.shipping_address,
            shipping_date: m.shipping_date,
            payment_method: m.payment_method,
            active: m.active,
            order_details: Vec::new(),
        }
    }
}

impl OrderResponse {
    pub fn with_details(
        order: order_entity::Model,
        details: Vec<OrderDetailResponse>,
    ) -> Self {
        let mut response = Self::from(order);
        response.order_details = details;
        response
    }
}
