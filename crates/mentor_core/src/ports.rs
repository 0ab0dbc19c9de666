//! crates/mentor_core/src/ports.rs
//!
//! Defines the storage contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of a specific store (PostgreSQL in production, an in-memory
//! store for local runs and tests).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::credentials::AuthError;
use crate::domain::{
    Content, ContentDraft, ContentFilter, ContentListing, DashboardStats, Discussion,
    DiscussionDraft, Event, EventDraft, LeaderboardEntry, MonthlyActivity, NewAccount,
    NewSession, Notification, Page, PlatformAnalytics, ProfileUpdate, Role, Session,
    SessionDigest, SessionFilter, SessionListing, SessionPatch, SessionStatus, Settings,
    Transaction, TransferReceipt, TransferRequest, User, UserCredentials, UserProfile, Wallet,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error type shared by every core operation and storage port.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Account is deactivated")]
    AccountDeactivated,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        available: Decimal,
        requested: Decimal,
    },
    #[error("No valid fields to update")]
    NoOp,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Storage Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates the user, their profile and their zero-balance wallet as one
    /// atomic unit. Fails with `Conflict` when the email is taken.
    async fn create_account(&self, account: NewAccount) -> PortResult<User>;

    async fn find_credentials(&self, email: &str) -> PortResult<Option<UserCredentials>>;

    async fn get_user(&self, user_id: Uuid) -> PortResult<User>;

    async fn get_profile(&self, user_id: Uuid) -> PortResult<UserProfile>;

    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> PortResult<()>;

    async fn list_users(&self, page: Page) -> PortResult<Vec<User>>;

    async fn set_user_active(&self, user_id: Uuid, active: bool) -> PortResult<User>;

    /// Returns the stored settings, or the defaults when none were saved.
    async fn get_settings(&self, user_id: Uuid) -> PortResult<Settings>;

    async fn save_settings(&self, user_id: Uuid, settings: &Settings) -> PortResult<()>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a new session in the `scheduled` state. Fails with
    /// `Validation` when either participant does not exist.
    async fn insert_session(&self, session: NewSession) -> PortResult<Session>;

    async fn find_session(&self, session_id: Uuid) -> PortResult<Option<SessionListing>>;

    /// Sessions where the user is solver or seeker, newest `scheduled_at` first.
    async fn list_sessions_for(
        &self,
        user_id: Uuid,
        filter: &SessionFilter,
    ) -> PortResult<Vec<SessionListing>>;

    async fn list_all_sessions(&self, page: Page) -> PortResult<Vec<SessionListing>>;

    /// Applies the patch only if the session is still in `expected` status.
    /// Returns `None` when the session changed (or vanished) in between.
    async fn update_session(
        &self,
        session_id: Uuid,
        expected: SessionStatus,
        patch: &SessionPatch,
    ) -> PortResult<Option<Session>>;

    async fn delete_session(&self, session_id: Uuid) -> PortResult<bool>;
}

#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn wallet_for_user(&self, user_id: Uuid) -> PortResult<Wallet>;

    /// Newest first.
    async fn list_transactions(&self, wallet_id: Uuid, page: Page) -> PortResult<Vec<Transaction>>;

    /// Reads the balance, checks it, records a `completed` transaction and writes
    /// the derived balance. Implementations must serialize this against every
    /// other transfer on the same wallet.
    async fn apply_transfer(
        &self,
        user_id: Uuid,
        request: &TransferRequest,
    ) -> PortResult<TransferReceipt>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
    ) -> PortResult<Notification>;

    async fn list_notifications(&self, user_id: Uuid, limit: i64) -> PortResult<Vec<Notification>>;

    /// Returns the number of rows affected.
    async fn mark_notification_read(&self, user_id: Uuid, notification_id: Uuid) -> PortResult<u64>;

    /// Returns the number of rows affected.
    async fn delete_notification(&self, user_id: Uuid, notification_id: Uuid) -> PortResult<u64>;
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn insert_content(&self, owner_id: Uuid, draft: &ContentDraft) -> PortResult<Content>;

    async fn find_content(&self, content_id: Uuid) -> PortResult<Option<ContentListing>>;

    /// The viewer's own items plus published items, newest first.
    async fn list_content(
        &self,
        viewer_id: Uuid,
        filter: &ContentFilter,
    ) -> PortResult<Vec<ContentListing>>;

    async fn record_view(&self, content_id: Uuid) -> PortResult<()>;

    async fn update_content(&self, content_id: Uuid, draft: &ContentDraft) -> PortResult<Content>;

    async fn delete_content(&self, content_id: Uuid) -> PortResult<bool>;
}

#[async_trait]
pub trait CommunityStore: Send + Sync {
    async fn insert_discussion(
        &self,
        author_id: Uuid,
        draft: &DiscussionDraft,
    ) -> PortResult<Discussion>;

    async fn list_discussions(
        &self,
        community_id: Option<Uuid>,
        page: Page,
    ) -> PortResult<Vec<Discussion>>;

    async fn insert_event(&self, creator_id: Uuid, draft: &EventDraft) -> PortResult<Event>;

    /// Active events dated after `after`, soonest first.
    async fn list_events(&self, after: DateTime<Utc>, page: Page) -> PortResult<Vec<Event>>;
}

#[async_trait]
pub trait DashboardStore: Send + Sync {
    async fn dashboard_stats(&self, user_id: Uuid) -> PortResult<DashboardStats>;

    /// Sessions seen from `role`'s side, newest `scheduled_at` first.
    async fn recent_sessions(
        &self,
        user_id: Uuid,
        role: Role,
        limit: i64,
    ) -> PortResult<Vec<SessionDigest>>;

    /// Scheduled or confirmed sessions after `now`, soonest first.
    async fn upcoming_sessions(
        &self,
        user_id: Uuid,
        role: Role,
        now: DateTime<Utc>,
    ) -> PortResult<Vec<SessionDigest>>;

    async fn monthly_activity(
        &self,
        solver_id: Uuid,
        since: DateTime<Utc>,
    ) -> PortResult<Vec<MonthlyActivity>>;

    async fn leaderboard(&self, limit: i64) -> PortResult<Vec<LeaderboardEntry>>;

    async fn platform_analytics(&self) -> PortResult<PlatformAnalytics>;
}

/// Everything the application needs from a single backing store.
pub trait Store:
    UserStore
    + SessionStore
    + WalletStore
    + NotificationStore
    + ContentStore
    + CommunityStore
    + DashboardStore
{
}

impl<T> Store for T where
    T: UserStore
        + SessionStore
        + WalletStore
        + NotificationStore
        + ContentStore
        + CommunityStore
        + DashboardStore
{
}
