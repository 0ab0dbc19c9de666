//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the storage ports from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use mentor_core::domain::{
    Content, ContentDraft, ContentFilter, ContentListing, DashboardStats, Discussion,
    DiscussionDraft, Event, EventDraft, LeaderboardEntry, MonthlyActivity, NewAccount,
    NewSession, Notification, Page, PlatformAnalytics, ProfileUpdate, Role, Session,
    SessionDigest, SessionFilter, SessionListing, SessionPatch, SessionStatus, Settings,
    Transaction, TransactionKind, TransactionStatus, TransferReceipt, TransferRequest, User,
    UserCredentials, UserProfile, Wallet,
};
use mentor_core::ports::{
    CommunityStore, ContentStore, DashboardStore, NotificationStore, PortError, PortResult,
    SessionStore, UserStore, WalletStore,
};
use mentor_core::wallet::settle;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use tracing::error;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A PostgreSQL adapter that implements every storage port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// Error Mapping
//=========================================================================================

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Maps a driver error onto the port error vocabulary.
fn db_error(e: sqlx::Error) -> PortError {
    if let sqlx::Error::Database(db_err) = &e {
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return PortError::Conflict(db_err.message().to_string()),
            Some(FOREIGN_KEY_VIOLATION) => {
                return PortError::Validation("referenced record does not exist".to_string())
            }
            Some(CHECK_VIOLATION) => return PortError::Validation(db_err.message().to_string()),
            Some(NUMERIC_VALUE_OUT_OF_RANGE) => {
                return PortError::Validation("numeric value is out of range".to_string())
            }
            _ => {}
        }
    }
    error!("Database error: {}", e);
    PortError::Unexpected(e.to_string())
}

fn parse_column<T>(value: &str) -> PortResult<T>
where
    T: FromStr<Err = String>,
{
    value.parse::<T>().map_err(PortError::Unexpected)
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const USER_COLUMNS: &str = "u.id, u.email, u.first_name, u.last_name, u.country, u.city, \
    u.gender, u.date_of_birth, u.profile_pic, u.bio, u.phone, u.is_email_verified, \
    u.is_phone_verified, u.verification_level, u.is_active, u.role, u.created_at, u.updated_at";

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    country: Option<String>,
    city: Option<String>,
    gender: Option<String>,
    date_of_birth: Option<NaiveDate>,
    profile_pic: Option<String>,
    bio: Option<String>,
    phone: Option<String>,
    is_email_verified: bool,
    is_phone_verified: bool,
    verification_level: String,
    is_active: bool,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRecord {
    fn to_domain(self) -> PortResult<User> {
        Ok(User {
            id: self.id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            country: self.country,
            city: self.city,
            gender: self.gender,
            date_of_birth: self.date_of_birth,
            profile_pic: self.profile_pic,
            bio: self.bio,
            phone: self.phone,
            is_email_verified: self.is_email_verified,
            is_phone_verified: self.is_phone_verified,
            verification_level: parse_column(&self.verification_level)?,
            is_active: self.is_active,
            role: parse_column(&self.role)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    #[sqlx(flatten)]
    user: UserRecord,
    password_hash: String,
}

#[derive(FromRow)]
struct ProfileRecord {
    user_id: Uuid,
    languages: Vec<String>,
    skills: Vec<String>,
    experience: Vec<String>,
    achievements: Vec<String>,
    projects: Vec<String>,
    interests: Vec<String>,
    bank_account: Option<String>,
    profile_complete: i32,
    followers: i32,
    following: i32,
}

impl ProfileRecord {
    fn to_domain(self) -> UserProfile {
        UserProfile {
            user_id: self.user_id,
            languages: self.languages,
            skills: self.skills,
            experience: self.experience,
            achievements: self.achievements,
            projects: self.projects,
            interests: self.interests,
            bank_account: self.bank_account,
            profile_complete: self.profile_complete,
            followers: self.followers,
            following: self.following,
        }
    }
}

#[derive(FromRow)]
struct SettingsRecord {
    theme: String,
    notifications: bool,
}

const SESSION_COLUMNS: &str = "s.id, s.solver_id, s.seeker_id, s.title, s.description, \
    s.category, s.sub_category, s.duration_minutes, s.price, s.status, s.scheduled_at, \
    s.started_at, s.ended_at, s.recording_url, s.rating, s.review, s.created_at, s.updated_at";

/// Joins both participants so listings carry their display names.
const SESSION_LISTING_FROM: &str = "FROM sessions s \
    JOIN users sv ON sv.id = s.solver_id \
    JOIN users sk ON sk.id = s.seeker_id";

const PARTICIPANT_NAMES: &str = "TRIM(sv.first_name || ' ' || sv.last_name) AS solver_name, \
    TRIM(sk.first_name || ' ' || sk.last_name) AS seeker_name";

#[derive(FromRow)]
struct SessionRecord {
    id: Uuid,
    solver_id: Uuid,
    seeker_id: Uuid,
    title: String,
    description: Option<String>,
    category: String,
    sub_category: Option<String>,
    duration_minutes: i32,
    price: Decimal,
    status: String,
    scheduled_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    recording_url: Option<String>,
    rating: Option<i16>,
    review: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SessionRecord {
    fn to_domain(self) -> PortResult<Session> {
        Ok(Session {
            id: self.id,
            solver_id: self.solver_id,
            seeker_id: self.seeker_id,
            title: self.title,
            description: self.description,
            category: self.category,
            sub_category: self.sub_category,
            duration_minutes: self.duration_minutes,
            price: self.price,
            status: parse_column(&self.status)?,
            scheduled_at: self.scheduled_at,
            started_at: self.started_at,
            ended_at: self.ended_at,
            recording_url: self.recording_url,
            rating: self.rating,
            review: self.review,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct SessionListingRecord {
    #[sqlx(flatten)]
    session: SessionRecord,
    solver_name: String,
    seeker_name: String,
}

impl SessionListingRecord {
    fn to_domain(self) -> PortResult<SessionListing> {
        Ok(SessionListing {
            session: self.session.to_domain()?,
            solver_name: self.solver_name,
            seeker_name: self.seeker_name,
        })
    }
}

const WALLET_COLUMNS: &str = "id, user_id, balance, currency, created_at, updated_at";

#[derive(FromRow)]
struct WalletRecord {
    id: Uuid,
    user_id: Uuid,
    balance: Decimal,
    currency: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WalletRecord {
    fn to_domain(self) -> Wallet {
        Wallet {
            id: self.id,
            user_id: self.user_id,
            balance: self.balance,
            currency: self.currency,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const TRANSACTION_COLUMNS: &str =
    "id, wallet_id, session_id, kind, amount, description, status, created_at";

#[derive(FromRow)]
struct TransactionRecord {
    id: Uuid,
    wallet_id: Uuid,
    session_id: Option<Uuid>,
    kind: String,
    amount: Decimal,
    description: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TransactionRecord {
    fn to_domain(self) -> PortResult<Transaction> {
        Ok(Transaction {
            id: self.id,
            wallet_id: self.wallet_id,
            session_id: self.session_id,
            kind: parse_column::<TransactionKind>(&self.kind)?,
            amount: self.amount,
            description: self.description,
            status: parse_column::<TransactionStatus>(&self.status)?,
            created_at: self.created_at,
        })
    }
}

const NOTIFICATION_COLUMNS: &str = "id, user_id, title, message, channel, is_read, created_at";

#[derive(FromRow)]
struct NotificationRecord {
    id: Uuid,
    user_id: Uuid,
    title: String,
    message: String,
    channel: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl NotificationRecord {
    fn to_domain(self) -> Notification {
        Notification {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            message: self.message,
            channel: self.channel,
            is_read: self.is_read,
            created_at: self.created_at,
        }
    }
}

const CONTENT_COLUMNS: &str = "c.id, c.user_id, c.title, c.description, c.kind, c.url, \
    c.category, c.sub_category, c.tags, c.views, c.likes, c.status, c.created_at, c.updated_at";

#[derive(FromRow)]
struct ContentRecord {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: Option<String>,
    kind: String,
    url: Option<String>,
    category: Option<String>,
    sub_category: Option<String>,
    tags: Vec<String>,
    views: i64,
    likes: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContentRecord {
    fn to_domain(self) -> PortResult<Content> {
        Ok(Content {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            kind: parse_column(&self.kind)?,
            url: self.url,
            category: self.category,
            sub_category: self.sub_category,
            tags: self.tags,
            views: self.views,
            likes: self.likes,
            status: parse_column(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ContentListingRecord {
    #[sqlx(flatten)]
    content: ContentRecord,
    author_name: String,
}

const DISCUSSION_COLUMNS: &str = "id, community_id, user_id, title, body, likes, replies, \
    is_anonymous, created_at, updated_at";

#[derive(FromRow)]
struct DiscussionRecord {
    id: Uuid,
    community_id: Option<Uuid>,
    user_id: Uuid,
    title: String,
    body: String,
    likes: i32,
    replies: i32,
    is_anonymous: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DiscussionRecord {
    fn to_domain(self) -> Discussion {
        Discussion {
            id: self.id,
            community_id: self.community_id,
            user_id: Some(self.user_id),
            title: self.title,
            body: self.body,
            likes: self.likes,
            replies: self.replies,
            is_anonymous: self.is_anonymous,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const EVENT_COLUMNS: &str = "id, title, description, event_date, duration_minutes, \
    max_attendees, current_attendees, category, is_active, created_by, created_at";

#[derive(FromRow)]
struct EventRecord {
    id: Uuid,
    title: String,
    description: Option<String>,
    event_date: DateTime<Utc>,
    duration_minutes: i32,
    max_attendees: Option<i32>,
    current_attendees: i32,
    category: Option<String>,
    is_active: bool,
    created_by: Uuid,
    created_at: DateTime<Utc>,
}

impl EventRecord {
    fn to_domain(self) -> Event {
        Event {
            id: self.id,
            title: self.title,
            description: self.description,
            event_date: self.event_date,
            duration_minutes: self.duration_minutes,
            max_attendees: self.max_attendees,
            current_attendees: self.current_attendees,
            category: self.category,
            is_active: self.is_active,
            created_by: self.created_by,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct StatsRecord {
    total_sessions: i64,
    completed_sessions: i64,
    total_earnings: Decimal,
    total_content: i64,
    total_views: i64,
    followers: i32,
    following: i32,
    profile_complete: i32,
    wallet_balance: Decimal,
}

#[derive(FromRow)]
struct DigestRecord {
    id: Uuid,
    title: String,
    counterpart_name: String,
    status: String,
    scheduled_at: DateTime<Utc>,
    duration_minutes: i32,
    price: Decimal,
}

impl DigestRecord {
    fn to_domain(self) -> PortResult<SessionDigest> {
        Ok(SessionDigest {
            id: self.id,
            title: self.title,
            counterpart_name: self.counterpart_name,
            status: parse_column(&self.status)?,
            scheduled_at: self.scheduled_at,
            duration_minutes: self.duration_minutes,
            price: self.price,
        })
    }
}

#[derive(FromRow)]
struct MonthlyRecord {
    month: String,
    sessions: i64,
    earnings: Decimal,
}

#[derive(FromRow)]
struct LeaderboardRecord {
    user_id: Uuid,
    name: String,
    profile_pic: Option<String>,
    total_sessions: i64,
    rating: f64,
    earnings: Decimal,
}

#[derive(FromRow)]
struct PlatformRecord {
    total_users: i64,
    total_sessions: i64,
    total_content: i64,
    total_wallet_balance: Decimal,
}

/// The caller's own column and the counterpart's, from `role`'s side.
fn perspective(role: Role) -> (&'static str, &'static str) {
    match role {
        Role::Solver => ("solver_id", "seeker_id"),
        Role::Seeker | Role::Admin => ("seeker_id", "solver_id"),
    }
}

fn collect<R, T>(records: Vec<R>, f: impl Fn(R) -> PortResult<T>) -> PortResult<Vec<T>> {
    records.into_iter().map(f).collect()
}

//=========================================================================================
// `UserStore` Implementation
//=========================================================================================

#[async_trait]
impl UserStore for DbAdapter {
    async fn create_account(&self, account: NewAccount) -> PortResult<User> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users AS u (id, email, password_hash, first_name, last_name, role) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.role.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match db_error(e) {
            PortError::Conflict(_) => PortError::Conflict("Email already registered".to_string()),
            other => other,
        })?;

        sqlx::query("INSERT INTO user_profiles (user_id) VALUES ($1)")
            .bind(record.id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        sqlx::query("INSERT INTO wallets (id, user_id) VALUES ($1, $2)")
            .bind(Uuid::new_v4())
            .bind(record.id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        record.to_domain()
    }

    async fn find_credentials(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        let record = sqlx::query_as::<_, CredentialsRecord>(&format!(
            "SELECT {USER_COLUMNS}, u.password_hash FROM users u WHERE u.email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        record
            .map(|r| -> PortResult<UserCredentials> {
                Ok(UserCredentials {
                    user: r.user.to_domain()?,
                    password_hash: r.password_hash,
                })
            })
            .transpose()
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        sqlx::query_as::<_, UserRecord>(&format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?
            .to_domain()
    }

    async fn get_profile(&self, user_id: Uuid) -> PortResult<UserProfile> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "SELECT user_id, languages, skills, experience, achievements, projects, interests, \
             bank_account, profile_complete, followers, following \
             FROM user_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or_else(|| PortError::NotFound(format!("Profile for user {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let result = sqlx::query(
            "UPDATE users SET \
                first_name = COALESCE($2, first_name), \
                last_name = COALESCE($3, last_name), \
                country = COALESCE($4, country), \
                city = COALESCE($5, city), \
                gender = COALESCE($6, gender), \
                date_of_birth = COALESCE($7, date_of_birth), \
                profile_pic = COALESCE($8, profile_pic), \
                bio = COALESCE($9, bio), \
                phone = COALESCE($10, phone), \
                updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.country)
        .bind(&update.city)
        .bind(&update.gender)
        .bind(update.date_of_birth)
        .bind(&update.profile_pic)
        .bind(&update.bio)
        .bind(&update.phone)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }

        sqlx::query(
            "UPDATE user_profiles SET \
                languages = COALESCE($2, languages), \
                skills = COALESCE($3, skills), \
                experience = COALESCE($4, experience), \
                achievements = COALESCE($5, achievements), \
                projects = COALESCE($6, projects), \
                interests = COALESCE($7, interests), \
                bank_account = COALESCE($8, bank_account), \
                updated_at = NOW() \
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(&update.languages)
        .bind(&update.skills)
        .bind(&update.experience)
        .bind(&update.achievements)
        .bind(&update.projects)
        .bind(&update.interests)
        .bind(&update.bank_account)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)
    }

    async fn list_users(&self, page: Page) -> PortResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users u ORDER BY u.created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        collect(records, UserRecord::to_domain)
    }

    async fn set_user_active(&self, user_id: Uuid, active: bool) -> PortResult<User> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users AS u SET is_active = $2, updated_at = NOW() WHERE u.id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?
        .to_domain()
    }

    async fn get_settings(&self, user_id: Uuid) -> PortResult<Settings> {
        let record = sqlx::query_as::<_, SettingsRecord>(
            "SELECT theme, notifications FROM user_settings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        match record {
            Some(r) => Ok(Settings {
                theme: parse_column(&r.theme)?,
                notifications: r.notifications,
            }),
            None => Ok(Settings::default()),
        }
    }

    async fn save_settings(&self, user_id: Uuid, settings: &Settings) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO user_settings (user_id, theme, notifications) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id) DO UPDATE \
             SET theme = EXCLUDED.theme, notifications = EXCLUDED.notifications, updated_at = NOW()",
        )
        .bind(user_id)
        .bind(settings.theme.as_str())
        .bind(settings.notifications)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }
}

//=========================================================================================
// `SessionStore` Implementation
//=========================================================================================

#[async_trait]
impl SessionStore for DbAdapter {
    async fn insert_session(&self, new: NewSession) -> PortResult<Session> {
        sqlx::query_as::<_, SessionRecord>(&format!(
            "INSERT INTO sessions AS s (id, solver_id, seeker_id, title, description, category, \
             sub_category, duration_minutes, price, status, scheduled_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'scheduled', $10) \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(new.solver_id)
        .bind(new.seeker_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.category)
        .bind(&new.sub_category)
        .bind(new.duration_minutes)
        .bind(new.price)
        .bind(new.scheduled_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match db_error(e) {
            PortError::Validation(_) => {
                PortError::validation("both participants must be registered users")
            }
            other => other,
        })?
        .to_domain()
    }

    async fn find_session(&self, session_id: Uuid) -> PortResult<Option<SessionListing>> {
        sqlx::query_as::<_, SessionListingRecord>(&format!(
            "SELECT {SESSION_COLUMNS}, {PARTICIPANT_NAMES} {SESSION_LISTING_FROM} WHERE s.id = $1"
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .map(SessionListingRecord::to_domain)
        .transpose()
    }

    async fn list_sessions_for(
        &self,
        user_id: Uuid,
        filter: &SessionFilter,
    ) -> PortResult<Vec<SessionListing>> {
        let records = sqlx::query_as::<_, SessionListingRecord>(&format!(
            "SELECT {SESSION_COLUMNS}, {PARTICIPANT_NAMES} {SESSION_LISTING_FROM} \
             WHERE (s.solver_id = $1 OR s.seeker_id = $1) \
               AND ($2::TEXT IS NULL OR s.status = $2) \
             ORDER BY s.scheduled_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(user_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.page.limit)
        .bind(filter.page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        collect(records, SessionListingRecord::to_domain)
    }

    async fn list_all_sessions(&self, page: Page) -> PortResult<Vec<SessionListing>> {
        let records = sqlx::query_as::<_, SessionListingRecord>(&format!(
            "SELECT {SESSION_COLUMNS}, {PARTICIPANT_NAMES} {SESSION_LISTING_FROM} \
             ORDER BY s.created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        collect(records, SessionListingRecord::to_domain)
    }

    async fn update_session(
        &self,
        session_id: Uuid,
        expected: SessionStatus,
        patch: &SessionPatch,
    ) -> PortResult<Option<Session>> {
        sqlx::query_as::<_, SessionRecord>(&format!(
            "UPDATE sessions AS s SET \
                status = COALESCE($3, s.status), \
                started_at = COALESCE($4, s.started_at), \
                ended_at = COALESCE($5, s.ended_at), \
                rating = COALESCE($6, s.rating), \
                review = COALESCE($7, s.review), \
                scheduled_at = COALESCE($8, s.scheduled_at), \
                updated_at = NOW() \
             WHERE s.id = $1 AND s.status = $2 \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(session_id)
        .bind(expected.as_str())
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.started_at)
        .bind(patch.ended_at)
        .bind(patch.rating)
        .bind(&patch.review)
        .bind(patch.scheduled_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .map(SessionRecord::to_domain)
        .transpose()
    }

    async fn delete_session(&self, session_id: Uuid) -> PortResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }
}

//=========================================================================================
// `WalletStore` Implementation
//=========================================================================================

#[async_trait]
impl WalletStore for DbAdapter {
    async fn wallet_for_user(&self, user_id: Uuid) -> PortResult<Wallet> {
        let record = sqlx::query_as::<_, WalletRecord>(&format!(
            "SELECT {WALLET_COLUMNS} FROM wallets WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or_else(|| PortError::NotFound(format!("Wallet for user {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn list_transactions(&self, wallet_id: Uuid, page: Page) -> PortResult<Vec<Transaction>> {
        let records = sqlx::query_as::<_, TransactionRecord>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE wallet_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(wallet_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        collect(records, TransactionRecord::to_domain)
    }

    async fn apply_transfer(
        &self,
        user_id: Uuid,
        request: &TransferRequest,
    ) -> PortResult<TransferReceipt> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        // The row lock serializes concurrent transfers on this wallet until commit.
        let wallet = sqlx::query_as::<_, WalletRecord>(&format!(
            "SELECT {WALLET_COLUMNS} FROM wallets WHERE user_id = $1 FOR UPDATE"
        ))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error)?
        .ok_or_else(|| PortError::NotFound(format!("Wallet for user {} not found", user_id)))?;

        // On error the transaction is dropped and rolled back; nothing is recorded.
        let new_balance = settle(wallet.balance, request.kind, request.amount)?;
        let kind = TransactionKind::from(request.kind);

        let transaction = sqlx::query_as::<_, TransactionRecord>(&format!(
            "INSERT INTO transactions (id, wallet_id, kind, amount, description, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(wallet.id)
        .bind(kind.as_str())
        .bind(request.amount)
        .bind(&request.description)
        .bind(TransactionStatus::Completed.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?
        .to_domain()?;

        sqlx::query("UPDATE wallets SET balance = $2, updated_at = NOW() WHERE id = $1")
            .bind(wallet.id)
            .bind(new_balance)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;

        Ok(TransferReceipt {
            transaction,
            new_balance,
        })
    }
}

//=========================================================================================
// `NotificationStore` Implementation
//=========================================================================================

#[async_trait]
impl NotificationStore for DbAdapter {
    async fn insert_notification(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
    ) -> PortResult<Notification> {
        let record = sqlx::query_as::<_, NotificationRecord>(&format!(
            "INSERT INTO notifications (id, user_id, title, message) VALUES ($1, $2, $3, $4) \
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title)
        .bind(message)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(record.to_domain())
    }

    async fn list_notifications(&self, user_id: Uuid, limit: i64) -> PortResult<Vec<Notification>> {
        let records = sqlx::query_as::<_, NotificationRecord>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(records.into_iter().map(NotificationRecord::to_domain).collect())
    }

    async fn mark_notification_read(&self, user_id: Uuid, notification_id: Uuid) -> PortResult<u64> {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2")
            .bind(notification_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected())
    }

    async fn delete_notification(&self, user_id: Uuid, notification_id: Uuid) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(notification_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected())
    }
}

//=========================================================================================
// `ContentStore` Implementation
//=========================================================================================

const CONTENT_LISTING_FROM: &str = "FROM content c JOIN users a ON a.id = c.user_id";
const AUTHOR_NAME: &str = "TRIM(a.first_name || ' ' || a.last_name) AS author_name";

#[async_trait]
impl ContentStore for DbAdapter {
    async fn insert_content(&self, owner_id: Uuid, draft: &ContentDraft) -> PortResult<Content> {
        sqlx::query_as::<_, ContentRecord>(&format!(
            "INSERT INTO content AS c (id, user_id, title, description, kind, url, category, \
             sub_category, tags, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {CONTENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(draft.title.trim())
        .bind(&draft.description)
        .bind(draft.kind.as_str())
        .bind(&draft.url)
        .bind(&draft.category)
        .bind(&draft.sub_category)
        .bind(&draft.tags)
        .bind(draft.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?
        .to_domain()
    }

    async fn find_content(&self, content_id: Uuid) -> PortResult<Option<ContentListing>> {
        sqlx::query_as::<_, ContentListingRecord>(&format!(
            "SELECT {CONTENT_COLUMNS}, {AUTHOR_NAME} {CONTENT_LISTING_FROM} WHERE c.id = $1"
        ))
        .bind(content_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .map(|r| -> PortResult<ContentListing> {
            Ok(ContentListing {
                content: r.content.to_domain()?,
                author_name: r.author_name,
            })
        })
        .transpose()
    }

    async fn list_content(
        &self,
        viewer_id: Uuid,
        filter: &ContentFilter,
    ) -> PortResult<Vec<ContentListing>> {
        let records = sqlx::query_as::<_, ContentListingRecord>(&format!(
            "SELECT {CONTENT_COLUMNS}, {AUTHOR_NAME} {CONTENT_LISTING_FROM} \
             WHERE (c.user_id = $1 OR c.status = 'published') \
               AND ($2::TEXT IS NULL OR c.category = $2) \
               AND ($3::TEXT IS NULL OR c.status = $3) \
             ORDER BY c.created_at DESC LIMIT $4 OFFSET $5"
        ))
        .bind(viewer_id)
        .bind(&filter.category)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.page.limit)
        .bind(filter.page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        collect(records, |r| -> PortResult<ContentListing> {
            Ok(ContentListing {
                content: r.content.to_domain()?,
                author_name: r.author_name,
            })
        })
    }

    async fn record_view(&self, content_id: Uuid) -> PortResult<()> {
        sqlx::query("UPDATE content SET views = views + 1 WHERE id = $1")
            .bind(content_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn update_content(&self, content_id: Uuid, draft: &ContentDraft) -> PortResult<Content> {
        sqlx::query_as::<_, ContentRecord>(&format!(
            "UPDATE content AS c SET title = $2, description = $3, kind = $4, url = $5, \
             category = $6, sub_category = $7, tags = $8, status = $9, updated_at = NOW() \
             WHERE c.id = $1 RETURNING {CONTENT_COLUMNS}"
        ))
        .bind(content_id)
        .bind(draft.title.trim())
        .bind(&draft.description)
        .bind(draft.kind.as_str())
        .bind(&draft.url)
        .bind(&draft.category)
        .bind(&draft.sub_category)
        .bind(&draft.tags)
        .bind(draft.status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or_else(|| PortError::NotFound(format!("Content {} not found", content_id)))?
        .to_domain()
    }

    async fn delete_content(&self, content_id: Uuid) -> PortResult<bool> {
        let result = sqlx::query("DELETE FROM content WHERE id = $1")
            .bind(content_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }
}

//=========================================================================================
// `CommunityStore` Implementation
//=========================================================================================

#[async_trait]
impl CommunityStore for DbAdapter {
    async fn insert_discussion(
        &self,
        author_id: Uuid,
        draft: &DiscussionDraft,
    ) -> PortResult<Discussion> {
        let record = sqlx::query_as::<_, DiscussionRecord>(&format!(
            "INSERT INTO discussions (id, community_id, user_id, title, body, is_anonymous) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {DISCUSSION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(draft.community_id)
        .bind(author_id)
        .bind(draft.title.trim())
        .bind(&draft.body)
        .bind(draft.is_anonymous)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(record.to_domain())
    }

    async fn list_discussions(
        &self,
        community_id: Option<Uuid>,
        page: Page,
    ) -> PortResult<Vec<Discussion>> {
        let records = sqlx::query_as::<_, DiscussionRecord>(&format!(
            "SELECT {DISCUSSION_COLUMNS} FROM discussions \
             WHERE ($1::UUID IS NULL OR community_id = $1) \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(community_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(records.into_iter().map(DiscussionRecord::to_domain).collect())
    }

    async fn insert_event(&self, creator_id: Uuid, draft: &EventDraft) -> PortResult<Event> {
        let record = sqlx::query_as::<_, EventRecord>(&format!(
            "INSERT INTO events (id, title, description, event_date, duration_minutes, \
             max_attendees, category, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {EVENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(draft.title.trim())
        .bind(&draft.description)
        .bind(draft.event_date)
        .bind(draft.duration_minutes)
        .bind(draft.max_attendees)
        .bind(&draft.category)
        .bind(creator_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(record.to_domain())
    }

    async fn list_events(&self, after: DateTime<Utc>, page: Page) -> PortResult<Vec<Event>> {
        let records = sqlx::query_as::<_, EventRecord>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE is_active AND event_date > $1 \
             ORDER BY event_date ASC LIMIT $2 OFFSET $3"
        ))
        .bind(after)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(records.into_iter().map(EventRecord::to_domain).collect())
    }
}

//=========================================================================================
// `DashboardStore` Implementation
//=========================================================================================

#[async_trait]
impl DashboardStore for DbAdapter {
    async fn dashboard_stats(&self, user_id: Uuid) -> PortResult<DashboardStats> {
        let r = sqlx::query_as::<_, StatsRecord>(
            "SELECT \
                (SELECT COUNT(*) FROM sessions WHERE solver_id = u.id) AS total_sessions, \
                (SELECT COUNT(*) FROM sessions WHERE solver_id = u.id AND status = 'completed') \
                    AS completed_sessions, \
                (SELECT COALESCE(SUM(price), 0) FROM sessions \
                    WHERE solver_id = u.id AND status = 'completed') AS total_earnings, \
                (SELECT COUNT(*) FROM content WHERE user_id = u.id AND status = 'published') \
                    AS total_content, \
                (SELECT COALESCE(SUM(views), 0)::BIGINT FROM content \
                    WHERE user_id = u.id AND status = 'published') AS total_views, \
                COALESCE(p.followers, 0) AS followers, \
                COALESCE(p.following, 0) AS following, \
                COALESCE(p.profile_complete, 0) AS profile_complete, \
                COALESCE(w.balance, 0) AS wallet_balance \
             FROM users u \
             LEFT JOIN user_profiles p ON p.user_id = u.id \
             LEFT JOIN wallets w ON w.user_id = u.id \
             WHERE u.id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;

        Ok(DashboardStats {
            total_sessions: r.total_sessions,
            completed_sessions: r.completed_sessions,
            total_earnings: r.total_earnings,
            total_content: r.total_content,
            total_views: r.total_views,
            followers: r.followers,
            following: r.following,
            wallet_balance: r.wallet_balance,
            profile_complete: r.profile_complete,
        })
    }

    async fn recent_sessions(
        &self,
        user_id: Uuid,
        role: Role,
        limit: i64,
    ) -> PortResult<Vec<SessionDigest>> {
        let (own, other) = perspective(role);
        let records = sqlx::query_as::<_, DigestRecord>(&format!(
            "SELECT s.id, s.title, TRIM(o.first_name || ' ' || o.last_name) AS counterpart_name, \
                s.status, s.scheduled_at, s.duration_minutes, s.price \
             FROM sessions s JOIN users o ON o.id = s.{other} \
             WHERE s.{own} = $1 \
             ORDER BY s.scheduled_at DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        collect(records, DigestRecord::to_domain)
    }

    async fn upcoming_sessions(
        &self,
        user_id: Uuid,
        role: Role,
        now: DateTime<Utc>,
    ) -> PortResult<Vec<SessionDigest>> {
        let (own, other) = perspective(role);
        let records = sqlx::query_as::<_, DigestRecord>(&format!(
            "SELECT s.id, s.title, TRIM(o.first_name || ' ' || o.last_name) AS counterpart_name, \
                s.status, s.scheduled_at, s.duration_minutes, s.price \
             FROM sessions s JOIN users o ON o.id = s.{other} \
             WHERE s.{own} = $1 AND s.status IN ('scheduled', 'confirmed') AND s.scheduled_at > $2 \
             ORDER BY s.scheduled_at ASC"
        ))
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        collect(records, DigestRecord::to_domain)
    }

    async fn monthly_activity(
        &self,
        solver_id: Uuid,
        since: DateTime<Utc>,
    ) -> PortResult<Vec<MonthlyActivity>> {
        let records = sqlx::query_as::<_, MonthlyRecord>(
            "SELECT to_char(date_trunc('month', scheduled_at AT TIME ZONE 'UTC'), 'YYYY-MM') AS month, \
                COUNT(*) AS sessions, \
                COALESCE(SUM(CASE WHEN status = 'completed' THEN price ELSE 0 END), 0) AS earnings \
             FROM sessions \
             WHERE solver_id = $1 AND scheduled_at >= $2 \
             GROUP BY 1 ORDER BY 1",
        )
        .bind(solver_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(records
            .into_iter()
            .map(|r| MonthlyActivity {
                month: r.month,
                sessions: r.sessions,
                earnings: r.earnings,
            })
            .collect())
    }

    async fn leaderboard(&self, limit: i64) -> PortResult<Vec<LeaderboardEntry>> {
        let records = sqlx::query_as::<_, LeaderboardRecord>(
            "SELECT u.id AS user_id, TRIM(u.first_name || ' ' || u.last_name) AS name, u.profile_pic, \
                COUNT(s.id) AS total_sessions, \
                COALESCE(AVG(s.rating), 0)::FLOAT8 AS rating, \
                COALESCE(SUM(CASE WHEN s.status = 'completed' THEN s.price ELSE 0 END), 0) AS earnings \
             FROM users u JOIN sessions s ON s.solver_id = u.id \
             WHERE u.role = 'solver' AND u.is_active \
             GROUP BY u.id, u.first_name, u.last_name, u.profile_pic \
             ORDER BY earnings DESC, rating DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(records
            .into_iter()
            .map(|r| LeaderboardEntry {
                user_id: r.user_id,
                name: r.name,
                profile_pic: r.profile_pic,
                total_sessions: r.total_sessions,
                rating: r.rating,
                earnings: r.earnings,
            })
            .collect())
    }

    async fn platform_analytics(&self) -> PortResult<PlatformAnalytics> {
        let r = sqlx::query_as::<_, PlatformRecord>(
            "SELECT \
                (SELECT COUNT(*) FROM users) AS total_users, \
                (SELECT COUNT(*) FROM sessions) AS total_sessions, \
                (SELECT COUNT(*) FROM content) AS total_content, \
                (SELECT COALESCE(SUM(balance), 0) FROM wallets) AS total_wallet_balance",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(PlatformAnalytics {
            total_users: r.total_users,
            total_sessions: r.total_sessions,
            total_content: r.total_content,
            total_wallet_balance: r.total_wallet_balance,
        })
    }
}
