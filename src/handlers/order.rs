use crate::models::*;
use crate::services::AppOrderService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/orders",
    tag = "order",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created"),
        (status = 400, description = "Invalid cart line, shipping date or total"),
        (status = 404, description = "User or product not found")
    )
)]
pub async fn create_order(
    order_service: web::Data<AppOrderService>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    match order_service.create_order(&body).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "order",
    params(
        ("id" = i64, Path, description = "Order id")
    ),
    responses(
        (status = 200, description = "Order with its details"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    order_service: web::Data<AppOrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match order_service.get_order(path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/user/{user_id}",
    tag = "order",
    params(
        ("user_id" = i64, Path, description = "Owning user id")
    ),
    responses(
        (status = 200, description = "Orders of the user, id ascending")
    )
)]
pub async fn get_orders_by_user(
    order_service: web::Data<AppOrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match order_service.get_orders_by_user(path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/get-orders-by-keyword",
    tag = "order",
    params(
        ("keyword" = Option<String>, Query, description = "Case-insensitive keyword, empty matches all"),
        ("page" = Option<u64>, Query, description = "Zero-based page index"),
        ("limit" = Option<u64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Page of matching orders plus total page count")
    )
)]
pub async fn get_orders_by_keyword(
    order_service: web::Data<AppOrderService>,
    query: web::Query<OrderSearchQuery>,
) -> Result<HttpResponse> {
    let keyword = query.keyword.clone().unwrap_or_default();
    let page = query.page.unwrap_or(0);
    let limit = query.limit.unwrap_or(10);

    match order_service.search_orders(&keyword, page, limit).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/orders/{id}",
    tag = "order",
    params(
        ("id" = i64, Path, description = "Order id")
    ),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated"),
        (status = 404, description = "Order or supplied user not found")
    )
)]
pub async fn update_order(
    order_service: web::Data<AppOrderService>,
    path: web::Path<i64>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse> {
    match order_service.update_order(path.into_inner(), &body).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/orders/{id}/status",
    tag = "order",
    params(
        ("id" = i64, Path, description = "Order id")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status transition applied"),
        (status = 400, description = "Unknown status or illegal transition"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Concurrent status change, retry")
    )
)]
pub async fn update_order_status(
    order_service: web::Data<AppOrderService>,
    path: web::Path<i64>,
    body: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse> {
    match order_service
        .update_order_status(path.into_inner(), &body.status)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/orders/{id}",
    tag = "order",
    params(
        ("id" = i64, Path, description = "Order id")
    ),
    responses(
        (status = 200, description = "Order marked inactive (idempotent)")
    )
)]
pub async fn delete_order(
    order_service: web::Data<AppOrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    match order_service.delete_order(id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": format!("Order {id} deleted")
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::post().to(create_order))
            .route("/get-orders-by-keyword", web::get().to(get_orders_by_keyword))
            .route("/user/{user_id}", web::get().to(get_orders_by_user))
            .route("/{id}/status", web::put().to(update_order_status))
            .route("/{id}", web::get().to(get_order))
            .route("/{id}", web::put().to(update_order))
            .route("/{id}", web::delete().to(delete_order)),
    );
}
