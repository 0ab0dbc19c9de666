//! crates/mentor_core/src/domain.rs
//!
//! Defines the core data structures for the marketplace: accounts, sessions,
//! wallets, notifications, content and community items.
//! These structs are independent of any database; they carry serde and
//! OpenAPI derives so the web layer can return them as-is.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Default number of rows returned by list endpoints.
pub const DEFAULT_PAGE_SIZE: i64 = 20;
/// Upper bound on the number of rows a single list call may return.
pub const MAX_PAGE_SIZE: i64 = 100;
/// Exclusive upper bound on any stored amount of money (10^12). Prices,
/// transfer amounts and balances are `NUMERIC(14,2)` in the database.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Implements `as_str`, `Display` and `FromStr` for a unit-variant enum whose
/// wire form is a fixed lowercase string.
macro_rules! string_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!("unknown {} '{}'", stringify!($ty), other)),
                }
            }
        }
    };
}

//=========================================================================================
// Pagination
//=========================================================================================

/// A `(limit, offset)` window over an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Builds a page from optional query values, clamping the limit to
    /// `1..=MAX_PAGE_SIZE` and the offset to non-negative values.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

//=========================================================================================
// Users
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Seeker,
    Solver,
    Admin,
}

string_enum!(Role { Seeker => "seeker", Solver => "solver", Admin => "admin" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VerificationLevel {
    Light,
    Standard,
    Full,
}

string_enum!(VerificationLevel { Light => "light", Standard => "standard", Full => "full" });

/// A marketplace account. `id` and `email` never change after registration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_pic: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub is_email_verified: bool,
    pub is_phone_verified: bool,
    pub verification_level: VerificationLevel,
    pub is_active: bool,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Only used internally for login - contains the password hash.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// The fields needed to open a new account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Extended profile information, one row per user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub languages: Vec<String>,
    pub skills: Vec<String>,
    pub experience: Vec<String>,
    pub achievements: Vec<String>,
    pub projects: Vec<String>,
    pub interests: Vec<String>,
    pub bank_account: Option<String>,
    pub profile_complete: i32,
    pub followers: i32,
    pub following: i32,
}

/// A user together with their extended profile.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileView {
    pub user: User,
    pub profile: UserProfile,
}

/// Mutable personal fields. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_pic: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub languages: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<Vec<String>>,
    pub achievements: Option<Vec<String>>,
    pub projects: Option<Vec<String>>,
    pub interests: Option<Vec<String>>,
    pub bank_account: Option<String>,
}

/// The authenticated identity attached to a request by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
    System,
}

string_enum!(Theme { Dark => "dark", Light => "light", System => "system" });

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub theme: Theme,
    pub notifications: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            notifications: true,
        }
    }
}

//=========================================================================================
// Sessions
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Scheduled,
    Confirmed,
    Active,
    Completed,
    Cancelled,
}

string_enum!(SessionStatus {
    Scheduled => "scheduled",
    Confirmed => "confirmed",
    Active => "active",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// The lifecycle graph: `scheduled -> confirmed -> active -> completed`,
    /// with `cancelled` reachable from every non-terminal state.
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Scheduled, Confirmed)
                | (Confirmed, Active)
                | (Active, Completed)
                | (Scheduled, Cancelled)
                | (Confirmed, Cancelled)
                | (Active, Cancelled)
        )
    }
}

/// A scheduled engagement between a solver and a seeker.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Session {
    pub id: Uuid,
    pub solver_id: Uuid,
    pub seeker_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub sub_category: Option<String>,
    pub duration_minutes: i32,
    pub price: Decimal,
    pub status: SessionStatus,
    pub scheduled_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub recording_url: Option<String>,
    pub rating: Option<i16>,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.solver_id == user_id || self.seeker_id == user_id
    }

    /// Both participants, deduplicated when a user booked themselves.
    pub fn participants(&self) -> Vec<Uuid> {
        if self.solver_id == self.seeker_id {
            vec![self.solver_id]
        } else {
            vec![self.solver_id, self.seeker_id]
        }
    }
}

/// A session together with the display names of both participants.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionListing {
    pub session: Session,
    pub solver_name: String,
    pub seeker_name: String,
}

/// A validated session ready to be persisted in the `scheduled` state.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub solver_id: Uuid,
    pub seeker_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub sub_category: Option<String>,
    pub duration_minutes: i32,
    pub price: Decimal,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub status: Option<SessionStatus>,
    pub page: Page,
}

/// The only fields of a session that may change after creation.
///
/// Unknown keys are rejected during deserialization, so `title`, `category`
/// and `price` can never be smuggled in through an update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SessionPatch {
    pub status: Option<SessionStatus>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub rating: Option<i16>,
    pub review: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl SessionPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.started_at.is_none()
            && self.ended_at.is_none()
            && self.rating.is_none()
            && self.review.is_none()
            && self.scheduled_at.is_none()
    }

    /// Touches anything besides the post-session feedback fields.
    pub fn touches_schedule(&self) -> bool {
        self.started_at.is_some() || self.ended_at.is_some() || self.scheduled_at.is_some()
    }
}

//=========================================================================================
// Wallets
//=========================================================================================

/// One balance-bearing account per user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    Credit,
    Debit,
}

string_enum!(TransactionKind {
    Deposit => "deposit",
    Withdraw => "withdraw",
    Credit => "credit",
    Debit => "debit",
});

impl TransactionKind {
    /// The amount as it affects the wallet balance.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            Self::Deposit | Self::Credit => amount,
            Self::Withdraw | Self::Debit => -amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

string_enum!(TransactionStatus {
    Pending => "pending",
    Completed => "completed",
    Failed => "failed",
});

/// An append-only ledger entry against a wallet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub session_id: Option<Uuid>,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: Option<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

/// The user-initiated movements a transfer may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransferKind {
    Deposit,
    Withdraw,
}

impl From<TransferKind> for TransactionKind {
    fn from(kind: TransferKind) -> Self {
        match kind {
            TransferKind::Deposit => TransactionKind::Deposit,
            TransferKind::Withdraw => TransactionKind::Withdraw,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct TransferRequest {
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransferKind,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferReceipt {
    pub transaction: Transaction,
    pub new_balance: Decimal,
}

//=========================================================================================
// Notifications
//=========================================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub channel: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

//=========================================================================================
// Content
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Reel,
    Blog,
    Video,
    Link,
    Pdf,
    Github,
}

string_enum!(ContentKind {
    Reel => "reel",
    Blog => "blog",
    Video => "video",
    Link => "link",
    Pdf => "pdf",
    Github => "github",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

string_enum!(ContentStatus {
    Draft => "draft",
    Published => "published",
    Archived => "archived",
});

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Content {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub kind: ContentKind,
    pub url: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub tags: Vec<String>,
    pub views: i64,
    pub likes: i64,
    pub status: ContentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Content {
    pub fn is_visible_to(&self, viewer: Uuid) -> bool {
        self.user_id == viewer || self.status == ContentStatus::Published
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContentListing {
    pub content: Content,
    pub author_name: String,
}

/// The writable fields of a content item, used for both create and update.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ContentDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: ContentStatus,
}

#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    pub category: Option<String>,
    /// `None` lists every status.
    pub status: Option<ContentStatus>,
    pub page: Page,
}

//=========================================================================================
// Community
//=========================================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Discussion {
    pub id: Uuid,
    pub community_id: Option<Uuid>,
    /// Hidden from everyone but the author when the discussion is anonymous.
    pub user_id: Option<Uuid>,
    pub title: String,
    pub body: String,
    pub likes: i32,
    pub replies: i32,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct DiscussionDraft {
    #[serde(default)]
    pub community_id: Option<Uuid>,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub duration_minutes: i32,
    pub max_attendees: Option<i32>,
    pub current_attendees: i32,
    pub category: Option<String>,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct EventDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    #[serde(default = "default_event_duration")]
    pub duration_minutes: i32,
    #[serde(default)]
    pub max_attendees: Option<i32>,
    #[serde(default)]
    pub category: Option<String>,
}

fn default_event_duration() -> i32 {
    60
}

//=========================================================================================
// Dashboard
//=========================================================================================

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_sessions: i64,
    pub completed_sessions: i64,
    pub total_earnings: Decimal,
    pub total_content: i64,
    pub total_views: i64,
    pub followers: i32,
    pub following: i32,
    pub wallet_balance: Decimal,
    pub profile_complete: i32,
}

/// A compact session row seen from one participant's side.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionDigest {
    pub id: Uuid,
    pub title: String,
    pub counterpart_name: String,
    pub status: SessionStatus,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlyActivity {
    /// `YYYY-MM`
    pub month: String,
    pub sessions: i64,
    pub earnings: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub name: String,
    pub profile_pic: Option<String>,
    pub total_sessions: i64,
    pub rating: f64,
    pub earnings: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct PlatformAnalytics {
    pub total_users: i64,
    pub total_sessions: i64,
    pub total_content: i64,
    pub total_wallet_balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_follows_the_happy_path() {
        use SessionStatus::*;
        assert!(Scheduled.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Active));
        assert!(Active.can_transition_to(Completed));
        assert!(!Scheduled.can_transition_to(Completed));
        assert!(!Confirmed.can_transition_to(Scheduled));
    }

    #[test]
    fn cancelled_is_reachable_only_from_open_states() {
        use SessionStatus::*;
        for open in [Scheduled, Confirmed, Active] {
            assert!(open.can_transition_to(Cancelled));
        }
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Scheduled));
    }

    #[test]
    fn patch_rejects_immutable_fields() {
        let err = serde_json::from_value::<SessionPatch>(serde_json::json!({
            "status": "confirmed",
            "price": "10.00"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn empty_patch_is_detected() {
        let patch: SessionPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn page_is_clamped() {
        assert_eq!(Page::new(None, None), Page { limit: 20, offset: 0 });
        assert_eq!(Page::new(Some(1_000), Some(-4)), Page { limit: 100, offset: 0 });
        assert_eq!(Page::new(Some(0), Some(7)).limit, 1);
    }

    #[test]
    fn transaction_kind_sign() {
        let ten = Decimal::new(10, 0);
        assert_eq!(TransactionKind::Deposit.signed(ten), ten);
        assert_eq!(TransactionKind::Withdraw.signed(ten), -ten);
        assert_eq!("debit".parse::<TransactionKind>(), Ok(TransactionKind::Debit));
    }
}
