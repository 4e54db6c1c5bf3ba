use actix_web::{error, web, HttpResponse};
use crate::web::handlers;
use crate::web::models::ErrorResponse;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(
            web::scope("/api")
                .route("/chat", web::post().to(handlers::chat))
                .route("/reset", web::post().to(handlers::reset)),
        )
        .route("/", web::get().to(handlers::index))
        .route("/health", web::get().to(handlers::health_check));
}

// Malformed chat bodies get the same JSON error shape as everything else
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let body = HttpResponse::BadRequest().json(ErrorResponse {
            error: format!("Invalid request body: {err}"),
        });
        error::InternalError::from_response(err, body).into()
    })
}
