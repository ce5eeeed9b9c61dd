use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// Open CORS policy for the JSON API: any origin, the verbs the router serves.
pub fn permissive_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(Any)
}
