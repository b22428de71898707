// src/auth/mod.rs
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;

use axum::Router;

use crate::state::AppState;

pub use extractors::{AdminUser, AuthUser};
pub use handlers::{AuthResponse, MeResponse};
pub use jwt::{Claims, JwtKeys};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
