//! HTTP surface of the student advisor: axum router, handlers, and the
//! embedded chat page.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod ui;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
