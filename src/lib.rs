//! A single-session chat client for OpenAI-compatible completion APIs.
//!
//! The [`session::Session`] keeps the conversation and runs one turn at a
//! time through a [`model::CompletionClient`]. It is exposed both as a
//! terminal chat ([`cli`]) and as a small JSON API behind a static page
//! ([`web`]).

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod session;
pub mod web;

pub use config::{Config, SessionConfig, Settings};
pub use error::{ChatError, ClientError, ConfigError};
pub use model::{ChatCompletionRequest, CompletionClient, Message, OpenAiClient, Role};
pub use session::Session;
