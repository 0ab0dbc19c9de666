//! crates/mentor_core/src/accounts.rs
//!
//! Registration, login, token refresh, profiles, settings and admin account
//! management.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::credentials::{self, TokenService};
use crate::domain::{Caller, NewAccount, Page, ProfileUpdate, ProfileView, Role, Settings, User};
use crate::ports::{PortError, PortResult, UserStore};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(default)]
    pub accept_terms: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A deliberately loose shape check: `local@domain.tld`.
fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

impl RegisterRequest {
    fn validate(&self) -> PortResult<()> {
        if !looks_like_email(&normalize_email(&self.email)) {
            return Err(PortError::validation("a valid email is required"));
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(PortError::validation("first and last name are required"));
        }
        if !matches!(self.role, Role::Solver | Role::Seeker) {
            return Err(PortError::validation("role must be solver or seeker"));
        }
        if !self.accept_terms {
            return Err(PortError::validation("terms must be accepted"));
        }
        if self.password != self.confirm_password {
            return Err(PortError::validation("Passwords do not match"));
        }
        if !credentials::validate_password_strength(&self.password) {
            return Err(PortError::validation(
                "Password must be at least 8 characters with uppercase, lowercase, and number",
            ));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    /// Opens an account (user, profile and wallet) and signs the user in.
    pub async fn register(&self, req: RegisterRequest) -> PortResult<AuthPayload> {
        req.validate()?;
        let password_hash = credentials::hash_password(&req.password)?;
        let user = self
            .users
            .create_account(NewAccount {
                email: normalize_email(&req.email),
                password_hash,
                first_name: req.first_name.trim().to_string(),
                last_name: req.last_name.trim().to_string(),
                role: req.role,
            })
            .await?;
        info!(user_id = %user.id, role = %user.role, "User registered");
        self.sign_in(user)
    }

    pub async fn login(&self, req: LoginRequest) -> PortResult<AuthPayload> {
        let creds = self
            .users
            .find_credentials(&normalize_email(&req.email))
            .await?
            .ok_or(PortError::InvalidCredentials)?;
        if !creds.user.is_active {
            warn!(user_id = %creds.user.id, "Login attempt on deactivated account");
            return Err(PortError::AccountDeactivated);
        }
        if !credentials::verify_password(&req.password, &creds.password_hash) {
            return Err(PortError::InvalidCredentials);
        }
        info!(user_id = %creds.user.id, "User logged in");
        self.sign_in(creds.user)
    }

    pub fn refresh(&self, token: &str) -> PortResult<String> {
        Ok(self.tokens.refresh_token(token)?)
    }

    /// Resolves a bearer token into the caller identity.
    pub fn authenticate(&self, token: &str) -> PortResult<Caller> {
        let claims = self.tokens.validate_token(token)?;
        Ok(claims.into_caller()?)
    }

    pub async fn profile(&self, user_id: Uuid) -> PortResult<ProfileView> {
        let user = self.users.get_user(user_id).await?;
        let profile = self.users.get_profile(user_id).await?;
        Ok(ProfileView { user, profile })
    }

    pub async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> PortResult<ProfileView> {
        for (field, value) in [("first_name", &update.first_name), ("last_name", &update.last_name)] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(PortError::Validation(format!("{} must not be blank", field)));
            }
        }
        self.users.update_profile(user_id, &update).await?;
        self.profile(user_id).await
    }

    pub async fn settings(&self, user_id: Uuid) -> PortResult<Settings> {
        self.users.get_settings(user_id).await
    }

    pub async fn update_settings(&self, user_id: Uuid, settings: Settings) -> PortResult<Settings> {
        self.users.save_settings(user_id, &settings).await?;
        Ok(settings)
    }

    pub async fn list_users(&self, page: Page) -> PortResult<Vec<User>> {
        self.users.list_users(page).await
    }

    pub async fn set_user_active(&self, admin: &Caller, user_id: Uuid, active: bool) -> PortResult<User> {
        if admin.user_id == user_id && !active {
            return Err(PortError::validation("admins cannot deactivate themselves"));
        }
        let user = self.users.set_user_active(user_id, active).await?;
        info!(admin_id = %admin.user_id, %user_id, active, "User status changed");
        Ok(user)
    }

    fn sign_in(&self, user: User) -> PortResult<AuthPayload> {
        let token = self.tokens.issue_token(user.id, &user.email, user.role)?;
        Ok(AuthPayload { token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            email: "Jane.Seeker@Example.com ".into(),
            password: "Passw0rd".into(),
            confirm_password: "Passw0rd".into(),
            first_name: "Jane".into(),
            last_name: "Smith".into(),
            role: Role::Seeker,
            accept_terms: true,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("a@b.co"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.co"));
        assert!(!looks_like_email("a@@b.co"));
        assert_eq!(normalize_email(" A@B.Co "), "a@b.co");
    }

    #[test]
    fn mismatched_confirmation_is_rejected() {
        let mut req = request();
        req.confirm_password = "Passw0rd!".into();
        assert!(req.validate().unwrap_err().to_string().contains("do not match"));
    }

    #[test]
    fn admin_self_registration_is_rejected() {
        let mut req = request();
        req.role = Role::Admin;
        assert!(req.validate().is_err());
    }

    #[test]
    fn terms_must_be_accepted() {
        let mut req = request();
        req.accept_terms = false;
        assert!(req.validate().is_err());
    }
}
