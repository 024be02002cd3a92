pub mod auth;
pub mod response;

pub use auth::{require_auth, AuthUser, RequireAuth};
pub use response::{ApiResponse, GatewayResponse};
