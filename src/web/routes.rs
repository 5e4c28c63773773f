use actix_web::web;
use crate::web::error::ApiError;
use crate::web::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/recommend_policy", web::post().to(handlers::recommend_policy))
        .route("/chat", web::post().to(handlers::chat))
        .route("/evaluate", web::post().to(handlers::evaluate))
        .route("/health", web::get().to(handlers::health_check));
}

/// Caps request bodies and reports malformed JSON as `{"detail": ...}`.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| ApiError::Validation(err.to_string()).into())
}
