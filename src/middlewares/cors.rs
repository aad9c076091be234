use actix_cors::Cors;

pub fn create_cors() -> Cors {
    // Allowed origins should be restricted in production
    Cors::default()
        .allowed_origin_fn(|_, _req_head| true)
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_any_header()
        .max_age(3600)
}
