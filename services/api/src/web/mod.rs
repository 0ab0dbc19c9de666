pub mod admin;
pub mod auth;
pub mod community;
pub mod content;
pub mod dashboard;
pub mod extract;
pub mod health;
pub mod middleware;
pub mod notifications;
pub mod profile;
pub mod rest;
pub mod router;
pub mod sessions;
pub mod state;
pub mod wallet;

pub use middleware::{require_admin, require_auth};
pub use router::build_router;
pub use state::AppState;
