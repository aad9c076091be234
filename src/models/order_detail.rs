use crate::entities::order_detail_entity;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDetailRequest {
    pub order_id: i64,
    pub product_id: i64,
    pub number_of_products: i32,
    pub color: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderDetailResponse {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub price: i64,
    pub number_of_products: i32,
    pub total_money: i64,
    pub color: Option<String>,
}

impl From<order_detail_entity::Model> for OrderDetailResponse {
    fn from(m: order_detail_entity::Model) -> Self {
        Self {
            id: m.id,
            order_id: m.order_id,
            product_id: m.product_id,
            price: m.price,
            number_of_products: m.number_of_products,
            total_money: m.total_money,
            color: m.color,
        }
    }
}
