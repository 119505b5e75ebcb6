//! HTTP adapter (axum). JSON endpoints under `/api`; the inbound side of the hexagon.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use response::ApiResponse;
pub use router::build_router;
pub use state::AppState;
