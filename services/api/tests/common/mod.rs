//! Shared fixtures for the integration tests: an in-memory store wired into
//! the full application state.
#![allow(dead_code)]

use api_lib::{adapters::MemoryStore, web::AppState};
use chrono::{DateTime, Duration, Utc};
use mentor_core::{
    accounts::{AuthPayload, RegisterRequest},
    Caller, CreateSessionRequest, Role, TokenService, User,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const PASSWORD: &str = "Mentor2024";

pub fn tokens() -> TokenService {
    TokenService::new(SECRET.as_bytes(), Duration::hours(24)).unwrap()
}

pub fn app() -> (Arc<MemoryStore>, Arc<AppState>) {
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(store.clone(), tokens()));
    (store, state)
}

pub fn registration(email: &str, role: Role) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: PASSWORD.to_string(),
        confirm_password: PASSWORD.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        role,
        accept_terms: true,
    }
}

pub async fn register(state: &AppState, email: &str, role: Role) -> AuthPayload {
    state.accounts.register(registration(email, role)).await.unwrap()
}

pub fn caller(user: &User) -> Caller {
    Caller {
        user_id: user.id,
        email: user.email.clone(),
        role: user.role,
    }
}

pub fn admin() -> Caller {
    Caller {
        user_id: Uuid::new_v4(),
        email: "admin@synapmentor.test".to_string(),
        role: Role::Admin,
    }
}

pub fn booking(counterpart: Uuid, scheduled_at: DateTime<Utc>) -> CreateSessionRequest {
    CreateSessionRequest {
        title: "Lifetimes in practice".to_string(),
        description: Some("Walk through borrow checker errors".to_string()),
        category: "Programming".to_string(),
        sub_category: Some("Rust".to_string()),
        duration_minutes: 60,
        price: Decimal::new(4500, 2),
        scheduled_at,
        counterpart_id: Some(counterpart),
    }
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}
