use crate::models::*;
use crate::services::AppOrderDetailService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/order_details",
    tag = "order_detail",
    request_body = OrderDetailRequest,
    responses(
        (status = 200, description = "Order detail created"),
        (status = 400, description = "Non-positive quantity"),
        (status = 404, description = "Order or product not found")
    )
)]
pub async fn create_order_detail(
    order_detail_service: web::Data<AppOrderDetailService>,
    body: web::Json<OrderDetailRequest>,
) -> Result<HttpResponse> {
    match order_detail_service.create_order_detail(&body).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/order_details/{id}",
    tag = "order_detail",
    params(
        ("id" = i64, Path, description = "Order detail id")
    ),
    responses(
        (status = 200, description = "Order detail"),
        (status = 404, description = "Order detail not found")
    )
)]
pub async fn get_order_detail(
    order_detail_service: web::Data<AppOrderDetailService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match order_detail_service.get_order_detail(path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/order_details/order/{order_id}",
    tag = "order_detail",
    params(
        ("order_id" = i64, Path, description = "Parent order id")
    ),
    responses(
        (status = 200, description = "Details of the order, id ascending")
    )
)]
pub async fn get_order_details_by_order(
    order_detail_service: web::Data<AppOrderDetailService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match order_detail_service
        .get_order_details_by_order(path.into_inner())
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
    put,
    path = "/order_details/{id}",
    tag = "order_detail",
    params(
        ("id" = i64, Path, description = "Order detail id")
    ),
    request_body = OrderDetailRequest,
    responses(
        (status = 200, description = "Order detail updated"),
        (status = 404, description = "Detail, order or product not found")
    )
)]
pub async fn update_order_detail(
    order_detail_service: web::Data<AppOrderDetailService>,
    path: web::Path<i64>,
    body: web::Json<OrderDetailRequest>,
) -> Result<HttpResponse> {
    match order_detail_service
        .update_order_detail(path.into_inner(), &body)
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
    path = "/order_details/{id}",
    tag = "order_detail",
    params(
        ("id" = i64, Path, description = "Order detail id")
    ),
    responses(
        (status = 200, description = "Order detail removed")
    )
)]
pub async fn delete_order_detail(
    order_detail_service: web::Data<AppOrderDetailService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    match order_detail_service.delete_order_detail(id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": format!("Order detail {id} deleted")
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_detail_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/order_details")
            .route("", web::post().to(create_order_detail))
            .route("/order/{order_id}", web::get().to(get_order_details_by_order))
            .route("/{id}", web::get().to(get_order_detail))
            .route("/{id}", web::put().to(update_order_detail))
            .route("/{id}", web::delete().to(delete_order_detail)),
    );
}
