//! Web layer for the departure board.
//!
//! Serves the reconciled board as JSON for a table front end.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
