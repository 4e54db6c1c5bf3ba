use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use log::{error, info, warn};
use serde_json::json;
use tera::Context;

use crate::error::{ChatError, ClientError};
use crate::web::models::{ChatRequest, ChatResponse, ErrorResponse, ResetResponse};
use crate::web::AppState;

// Index page handler
pub async fn index(data: web::Data<AppState>) -> impl Responder {
    let mut context = Context::new();
    let model = data.session.as_ref().map(|s| s.config().model.as_str());
    context.insert("model", &model.unwrap_or("unavailable"));
    context.insert("init_error", &data.init_error);
    match data.tera.render("index.html", &context) {
        Ok(html) => HttpResponse::Ok().content_type("text/html").body(html),
        Err(e) => {
            error!("Template error: {}", e);
            HttpResponse::InternalServerError().body("Template error")
        }
    }
}

// Health check endpoint
pub async fn health_check(data: web::Data<AppState>) -> impl Responder {
    let agent = if data.session.is_some() { "ready" } else { "unavailable" };
    HttpResponse::Ok().json(json!({ "status": "ok", "agent": agent }))
}

// Chat API endpoint
pub async fn chat(data: web::Data<AppState>, req: web::Json<ChatRequest>) -> impl Responder {
    let Some(session) = data.session.as_ref() else {
        return not_initialized(&data);
    };

    info!("Chat request: {} characters", req.message.len());

    match session.submit(&req.message).await {
        Ok(response) => HttpResponse::Ok().json(ChatResponse { response }),
        Err(e) => {
            warn!("Chat request failed: {}", e);
            error_response(status_for(&e), e.to_string())
        }
    }
}

// Reset API endpoint
pub async fn reset(data: web::Data<AppState>) -> impl Responder {
    let Some(session) = data.session.as_ref() else {
        return not_initialized(&data);
    };

    session.reset().await;
    HttpResponse::Ok().json(ResetResponse {
        status: "ok".into(),
        message: "Conversation reset".into(),
    })
}

/// Maps a failed turn to the status code the client sees.
pub fn status_for(e: &ChatError) -> StatusCode {
    match e {
        ChatError::EmptyMessage => StatusCode::BAD_REQUEST,
        ChatError::Client(ClientError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
        ChatError::Client(_) => StatusCode::BAD_GATEWAY,
    }
}

pub fn error_response(status: StatusCode, error: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse { error })
}

fn not_initialized(data: &AppState) -> HttpResponse {
    let reason = data.init_error.as_deref().unwrap_or("unknown error");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Agent not initialized: {reason}"),
    )
}
