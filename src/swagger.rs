use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::OrderStatus;
use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::order::create_order,
        handlers::order::get_order,
        handlers::order::get_orders_by_user,
        handlers::order::get_orders_by_keyword,
        handlers::order::update_order,
        handlers::order::update_order_status,
        handlers::order::delete_order,
        handlers::order_detail::create_order_detail,
        handlers::order_detail::get_order_detail,
        handlers::order_detail::get_order_details_by_order,
        handlers::order_detail::update_order_detail,
        handlers::order_detail::delete_order_detail,
    ),
    components(
        schemas(
            OrderStatus,
            CartItem,
            CreateOrderRequest,
            UpdateOrderRequest,
            UpdateOrderStatusRequest,
            OrderResponse,
            OrderSearchQuery,
            OrderListResponse,
            OrderDetailRequest,
            OrderDetailResponse,
        )
    ),
    tags(
        (name = "order", description = "Order lifecycle API"),
        (name = "order_detail", description = "Order line item API"),
    ),
    info(
        title = "ShopApp Order API",
        version = "1.0.0",
        description = "Order lifecycle subsystem REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
