use tera::Tera;

use crate::error::ConfigError;
use crate::session::Session;

pub mod handlers;
pub mod models;
pub mod routes;

/// Shared state handed to every handler through `web::Data`.
pub struct AppState {
    pub tera: Tera,
    /// `None` when the agent failed to initialize; chat traffic is refused.
    pub session: Option<Session>,
    pub init_error: Option<String>,
}

impl AppState {
    pub fn new(tera: Tera, session: Result<Session, ConfigError>) -> Self {
        match session {
            Ok(session) => Self {
                tera,
                session: Some(session),
                init_error: None,
            },
            Err(e) => Self {
                tera,
                session: None,
                init_error: Some(e.to_string()),
            },
        }
    }
}
