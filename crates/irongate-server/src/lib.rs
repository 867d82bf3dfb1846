//! irongate-server — axum HTTP binary exposing the `analyze`, `send`,
//! and `events/batch` endpoints (the wire contract).

pub mod cli;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod health;
pub mod llm;
pub mod router;
pub mod state;
