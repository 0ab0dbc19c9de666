//! services/api/src/adapters/memory.rs
//!
//! An in-memory implementation of every storage port, selected with
//! `DATABASE_URL=memory://` and used by the integration tests.
//!
//! All state sits behind one async mutex, so each port call (a transfer in
//! particular) observes and mutates the store atomically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mentor_core::domain::{
    Content, ContentDraft, ContentFilter, ContentListing, ContentStatus, DashboardStats,
    Discussion, DiscussionDraft, Event, EventDraft, LeaderboardEntry, MonthlyActivity,
    NewAccount, NewSession, Notification, Page, PlatformAnalytics, ProfileUpdate, Role, Session,
    SessionDigest, SessionFilter, SessionListing, SessionPatch, SessionStatus, Settings,
    Transaction, TransactionKind, TransactionStatus, TransferReceipt, TransferRequest, User,
    UserCredentials, UserProfile, VerificationLevel, Wallet,
};
use mentor_core::ports::{
    CommunityStore, ContentStore, DashboardStore, NotificationStore, PortError, PortResult,
    SessionStore, UserStore, WalletStore,
};
use mentor_core::wallet::settle;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;
use uuid::Uuid;

const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_CHANNEL: &str = "in_app";

#[derive(Default)]
struct Inner {
    users: Vec<UserCredentials>,
    profiles: HashMap<Uuid, UserProfile>,
    settings: HashMap<Uuid, Settings>,
    sessions: Vec<Session>,
    wallets: HashMap<Uuid, Wallet>,
    transactions: Vec<Transaction>,
    notifications: Vec<Notification>,
    content: Vec<Content>,
    discussions: Vec<Discussion>,
    events: Vec<Event>,
}

impl Inner {
    fn user(&self, user_id: Uuid) -> Option<&User> {
        self.users.iter().map(|c| &c.user).find(|u| u.id == user_id)
    }

    fn name_of(&self, user_id: Uuid) -> String {
        self.user(user_id).map(User::display_name).unwrap_or_default()
    }

    fn listing(&self, session: &Session) -> SessionListing {
        SessionListing {
            session: session.clone(),
            solver_name: self.name_of(session.solver_id),
            seeker_name: self.name_of(session.seeker_id),
        }
    }

    fn content_listing(&self, content: &Content) -> ContentListing {
        ContentListing {
            content: content.clone(),
            author_name: self.name_of(content.user_id),
        }
    }

    fn require_user(&self, user_id: Uuid) -> PortResult<&User> {
        self.user(user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    fn digest(&self, session: &Session, role: Role) -> SessionDigest {
        let counterpart = match role {
            Role::Solver => session.seeker_id,
            Role::Seeker | Role::Admin => session.solver_id,
        };
        SessionDigest {
            id: session.id,
            title: session.title.clone(),
            counterpart_name: self.name_of(counterpart),
            status: session.status,
            scheduled_at: session.scheduled_at,
            duration_minutes: session.duration_minutes,
            price: session.price,
        }
    }

    fn sessions_from_side(&self, user_id: Uuid, role: Role) -> impl Iterator<Item = &Session> {
        self.sessions.iter().filter(move |s| match role {
            Role::Solver => s.solver_id == user_id,
            Role::Seeker | Role::Admin => s.seeker_id == user_id,
        })
    }
}

fn window<T>(items: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    items
        .skip(page.offset.max(0) as usize)
        .take(page.limit.max(0) as usize)
        .collect()
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

//=========================================================================================
// `UserStore` Implementation
//=========================================================================================

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_account(&self, account: NewAccount) -> PortResult<User> {
        let mut inner = self.inner.lock().await;
        if inner.users.iter().any(|c| c.user.email == account.email) {
            return Err(PortError::Conflict("Email already registered".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            country: None,
            city: None,
            gender: None,
            date_of_birth: None,
            profile_pic: None,
            bio: None,
            phone: None,
            is_email_verified: false,
            is_phone_verified: false,
            verification_level: VerificationLevel::Light,
            is_active: true,
            role: account.role,
            created_at: now,
            updated_at: now,
        };
        inner.profiles.insert(
            user.id,
            UserProfile {
                user_id: user.id,
                ..Default::default()
            },
        );
        inner.wallets.insert(
            user.id,
            Wallet {
                id: Uuid::new_v4(),
                user_id: user.id,
                balance: Decimal::ZERO,
                currency: DEFAULT_CURRENCY.to_string(),
                created_at: now,
                updated_at: now,
            },
        );
        inner.users.push(UserCredentials {
            user: user.clone(),
            password_hash: account.password_hash,
        });
        Ok(user)
    }

    async fn find_credentials(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|c| c.user.email == email).cloned())
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        let inner = self.inner.lock().await;
        inner.require_user(user_id).cloned()
    }

    async fn get_profile(&self, user_id: Uuid) -> PortResult<UserProfile> {
        let inner = self.inner.lock().await;
        inner
            .profiles
            .get(&user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Profile for user {} not found", user_id)))
    }

    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> PortResult<()> {
        let mut inner = self.inner.lock().await;
        let creds = inner
            .users
            .iter_mut()
            .find(|c| c.user.id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;

        let user = &mut creds.user;
        let text_fields = [
            (&mut user.country, &update.country),
            (&mut user.city, &update.city),
            (&mut user.gender, &update.gender),
            (&mut user.profile_pic, &update.profile_pic),
            (&mut user.bio, &update.bio),
            (&mut user.phone, &update.phone),
        ];
        for (slot, value) in text_fields {
            if value.is_some() {
                slot.clone_from(value);
            }
        }
        if let Some(first_name) = &update.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &update.last_name {
            user.last_name = last_name.clone();
        }
        if update.date_of_birth.is_some() {
            user.date_of_birth = update.date_of_birth;
        }
        user.updated_at = Utc::now();

        let profile = inner.profiles.entry(user_id).or_insert_with(|| UserProfile {
            user_id,
            ..Default::default()
        });
        let list_fields = [
            (&mut profile.languages, &update.languages),
            (&mut profile.skills, &update.skills),
            (&mut profile.experience, &update.experience),
            (&mut profile.achievements, &update.achievements),
            (&mut profile.projects, &update.projects),
            (&mut profile.interests, &update.interests),
        ];
        for (slot, value) in list_fields {
            if let Some(value) = value {
                slot.clone_from(value);
            }
        }
        if update.bank_account.is_some() {
            profile.bank_account.clone_from(&update.bank_account);
        }
        Ok(())
    }

    async fn list_users(&self, page: Page) -> PortResult<Vec<User>> {
        let inner = self.inner.lock().await;
        Ok(window(inner.users.iter().rev().map(|c| c.user.clone()), page))
    }

    async fn set_user_active(&self, user_id: Uuid, active: bool) -> PortResult<User> {
        let mut inner = self.inner.lock().await;
        let creds = inner
            .users
            .iter_mut()
            .find(|c| c.user.id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        creds.user.is_active = active;
        creds.user.updated_at = Utc::now();
        Ok(creds.user.clone())
    }

    async fn get_settings(&self, user_id: Uuid) -> PortResult<Settings> {
        let inner = self.inner.lock().await;
        Ok(inner.settings.get(&user_id).cloned().unwrap_or_default())
    }

    async fn save_settings(&self, user_id: Uuid, settings: &Settings) -> PortResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.user(user_id).is_none() {
            return Err(PortError::validation("referenced record does not exist"));
        }
        inner.settings.insert(user_id, settings.clone());
        Ok(())
    }
}

//=========================================================================================
// `SessionStore` Implementation
//=========================================================================================

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert_session(&self, new: NewSession) -> PortResult<Session> {
        let mut inner = self.inner.lock().await;
        if inner.user(new.solver_id).is_none() || inner.user(new.seeker_id).is_none() {
            return Err(PortError::validation("both participants must be registered users"));
        }
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            solver_id: new.solver_id,
            seeker_id: new.seeker_id,
            title: new.title,
            description: new.description,
            category: new.category,
            sub_category: new.sub_category,
            duration_minutes: new.duration_minutes,
            price: new.price,
            status: SessionStatus::Scheduled,
            scheduled_at: new.scheduled_at,
            started_at: None,
            ended_at: None,
            recording_url: None,
            rating: None,
            review: None,
            created_at: now,
            updated_at: now,
        };
        inner.sessions.push(session.clone());
        Ok(session)
    }

    async fn find_session(&self, session_id: Uuid) -> PortResult<Option<SessionListing>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .sessions
            .iter()
            .find(|s| s.id == session_id)
            .map(|s| inner.listing(s)))
    }

    async fn list_sessions_for(
        &self,
        user_id: Uuid,
        filter: &SessionFilter,
    ) -> PortResult<Vec<SessionListing>> {
        let inner = self.inner.lock().await;
        let mut matching: Vec<&Session> = inner
            .sessions
            .iter()
            .filter(|s| s.is_participant(user_id))
            .filter(|s| filter.status.map_or(true, |status| s.status == status))
            .collect();
        matching.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        Ok(window(matching.into_iter().map(|s| inner.listing(s)), filter.page))
    }

    async fn list_all_sessions(&self, page: Page) -> PortResult<Vec<SessionListing>> {
        let inner = self.inner.lock().await;
        Ok(window(inner.sessions.iter().rev().map(|s| inner.listing(s)), page))
    }

    async fn update_session(
        &self,
        session_id: Uuid,
        expected: SessionStatus,
        patch: &SessionPatch,
    ) -> PortResult<Option<Session>> {
        let mut inner = self.inner.lock().await;
        let Some(session) = inner
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id && s.status == expected)
        else {
            return Ok(None);
        };

        if let Some(status) = patch.status {
            session.status = status;
        }
        if patch.started_at.is_some() {
            session.started_at = patch.started_at;
        }
        if patch.ended_at.is_some() {
            session.ended_at = patch.ended_at;
        }
        if patch.rating.is_some() {
            session.rating = patch.rating;
        }
        if patch.review.is_some() {
            session.review.clone_from(&patch.review);
        }
        if let Some(scheduled_at) = patch.scheduled_at {
            session.scheduled_at = scheduled_at;
        }
        session.updated_at = Utc::now();
        Ok(Some(session.clone()))
    }

    async fn delete_session(&self, session_id: Uuid) -> PortResult<bool> {
        let mut inner = self.inner.lock().await;
        let before = inner.sessions.len();
        inner.sessions.retain(|s| s.id != session_id);
        for tx in inner.transactions.iter_mut() {
            if tx.session_id == Some(session_id) {
                tx.session_id = None;
            }
        }
        Ok(inner.sessions.len() < before)
    }
}

//=========================================================================================
// `WalletStore` Implementation
//=========================================================================================

#[async_trait]
impl WalletStore for MemoryStore {
    async fn wallet_for_user(&self, user_id: Uuid) -> PortResult<Wallet> {
        let inner = self.inner.lock().await;
        inner
            .wallets
            .get(&user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Wallet for user {} not found", user_id)))
    }

    async fn list_transactions(&self, wallet_id: Uuid, page: Page) -> PortResult<Vec<Transaction>> {
        let inner = self.inner.lock().await;
        Ok(window(
            inner
                .transactions
                .iter()
                .rev()
                .filter(|t| t.wallet_id == wallet_id)
                .cloned(),
            page,
        ))
    }

    async fn apply_transfer(
        &self,
        user_id: Uuid,
        request: &TransferRequest,
    ) -> PortResult<TransferReceipt> {
        let mut inner = self.inner.lock().await;
        let wallet = inner
            .wallets
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("Wallet for user {} not found", user_id)))?;

        let new_balance = settle(wallet.balance, request.kind, request.amount)?;
        let now = Utc::now();
        wallet.balance = new_balance;
        wallet.updated_at = now;

        let transaction = Transaction {
            id: Uuid::new_v4(),
            wallet_id: wallet.id,
            session_id: None,
            kind: TransactionKind::from(request.kind),
            amount: request.amount,
            description: request.description.clone(),
            status: TransactionStatus::Completed,
            created_at: now,
        };
        inner.transactions.push(transaction.clone());

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
impl NotificationStore for MemoryStore {
    async fn insert_notification(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
    ) -> PortResult<Notification> {
        let mut inner = self.inner.lock().await;
        if inner.user(user_id).is_none() {
            return Err(PortError::validation("referenced record does not exist"));
        }
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            message: message.to_string(),
            channel: DEFAULT_CHANNEL.to_string(),
            is_read: false,
            created_at: Utc::now(),
        };
        inner.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn list_notifications(&self, user_id: Uuid, limit: i64) -> PortResult<Vec<Notification>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn mark_notification_read(&self, user_id: Uuid, notification_id: Uuid) -> PortResult<u64> {
        let mut inner = self.inner.lock().await;
        let mut affected = 0;
        for n in inner
            .notifications
            .iter_mut()
            .filter(|n| n.id == notification_id && n.user_id == user_id)
        {
            n.is_read = true;
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete_notification(&self, user_id: Uuid, notification_id: Uuid) -> PortResult<u64> {
        let mut inner = self.inner.lock().await;
        let before = inner.notifications.len();
        inner
            .notifications
            .retain(|n| !(n.id == notification_id && n.user_id == user_id));
        Ok((before - inner.notifications.len()) as u64)
    }
}

//=========================================================================================
// `ContentStore` Implementation
//=========================================================================================

#[async_trait]
impl ContentStore for MemoryStore {
    async fn insert_content(&self, owner_id: Uuid, draft: &ContentDraft) -> PortResult<Content> {
        let mut inner = self.inner.lock().await;
        if inner.user(owner_id).is_none() {
            return Err(PortError::validation("referenced record does not exist"));
        }
        let now = Utc::now();
        let content = Content {
            id: Uuid::new_v4(),
            user_id: owner_id,
            title: draft.title.trim().to_string(),
            description: draft.description.clone(),
            kind: draft.kind,
            url: draft.url.clone(),
            category: draft.category.clone(),
            sub_category: draft.sub_category.clone(),
            tags: draft.tags.clone(),
            views: 0,
            likes: 0,
            status: draft.status,
            created_at: now,
            updated_at: now,
        };
        inner.content.push(content.clone());
        Ok(content)
    }

    async fn find_content(&self, content_id: Uuid) -> PortResult<Option<ContentListing>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .content
            .iter()
            .find(|c| c.id == content_id)
            .map(|c| inner.content_listing(c)))
    }

    async fn list_content(
        &self,
        viewer_id: Uuid,
        filter: &ContentFilter,
    ) -> PortResult<Vec<ContentListing>> {
        let inner = self.inner.lock().await;
        let matching = inner
            .content
            .iter()
            .rev()
            .filter(|c| c.is_visible_to(viewer_id))
            .filter(|c| {
                filter
                    .category
                    .as_ref()
                    .map_or(true, |cat| c.category.as_ref() == Some(cat))
            })
            .filter(|c| filter.status.map_or(true, |status| c.status == status))
            .map(|c| inner.content_listing(c));
        Ok(window(matching, filter.page))
    }

    async fn record_view(&self, content_id: Uuid) -> PortResult<()> {
        let mut inner = self.inner.lock().await;
        if let Some(content) = inner.content.iter_mut().find(|c| c.id == content_id) {
            content.views += 1;
        }
        Ok(())
    }

    async fn update_content(&self, content_id: Uuid, draft: &ContentDraft) -> PortResult<Content> {
        let mut inner = self.inner.lock().await;
        let content = inner
            .content
            .iter_mut()
            .find(|c| c.id == content_id)
            .ok_or_else(|| PortError::NotFound(format!("Content {} not found", content_id)))?;
        content.title = draft.title.trim().to_string();
        content.description.clone_from(&draft.description);
        content.kind = draft.kind;
        content.url.clone_from(&draft.url);
        content.category.clone_from(&draft.category);
        content.sub_category.clone_from(&draft.sub_category);
        content.tags.clone_from(&draft.tags);
        content.status = draft.status;
        content.updated_at = Utc::now();
        Ok(content.clone())
    }

    async fn delete_content(&self, content_id: Uuid) -> PortResult<bool> {
        let mut inner = self.inner.lock().await;
        let before = inner.content.len();
        inner.content.retain(|c| c.id != content_id);
        Ok(inner.content.len() < before)
    }
}

//=========================================================================================
// `CommunityStore` Implementation
//=========================================================================================

#[async_trait]
impl CommunityStore for MemoryStore {
    async fn insert_discussion(
        &self,
        author_id: Uuid,
        draft: &DiscussionDraft,
    ) -> PortResult<Discussion> {
        let mut inner = self.inner.lock().await;
        // No communities exist in memory, so any reference to one dangles.
        if inner.user(author_id).is_none() || draft.community_id.is_some() {
            return Err(PortError::validation("referenced record does not exist"));
        }
        let now = Utc::now();
        let discussion = Discussion {
            id: Uuid::new_v4(),
            community_id: None,
            user_id: Some(author_id),
            title: draft.title.trim().to_string(),
            body: draft.body.clone(),
            likes: 0,
            replies: 0,
            is_anonymous: draft.is_anonymous,
            created_at: now,
            updated_at: now,
        };
        inner.discussions.push(discussion.clone());
        Ok(discussion)
    }

    async fn list_discussions(
        &self,
        community_id: Option<Uuid>,
        page: Page,
    ) -> PortResult<Vec<Discussion>> {
        let inner = self.inner.lock().await;
        let matching = inner
            .discussions
            .iter()
            .rev()
            .filter(|d| community_id.map_or(true, |id| d.community_id == Some(id)))
            .cloned();
        Ok(window(matching, page))
    }

    async fn insert_event(&self, creator_id: Uuid, draft: &EventDraft) -> PortResult<Event> {
        let mut inner = self.inner.lock().await;
        if inner.user(creator_id).is_none() {
            return Err(PortError::validation("referenced record does not exist"));
        }
        let event = Event {
            id: Uuid::new_v4(),
            title: draft.title.trim().to_string(),
            description: draft.description.clone(),
            event_date: draft.event_date,
            duration_minutes: draft.duration_minutes,
            max_attendees: draft.max_attendees,
            current_attendees: 0,
            category: draft.category.clone(),
            is_active: true,
            created_by: creator_id,
            created_at: Utc::now(),
        };
        inner.events.push(event.clone());
        Ok(event)
    }

    async fn list_events(&self, after: DateTime<Utc>, page: Page) -> PortResult<Vec<Event>> {
        let inner = self.inner.lock().await;
        let mut upcoming: Vec<&Event> = inner
            .events
            .iter()
            .filter(|e| e.is_active && e.event_date > after)
            .collect();
        upcoming.sort_by_key(|e| e.event_date);
        Ok(window(upcoming.into_iter().cloned(), page))
    }
}

//=========================================================================================
// `DashboardStore` Implementation
//=========================================================================================

#[async_trait]
impl DashboardStore for MemoryStore {
    async fn dashboard_stats(&self, user_id: Uuid) -> PortResult<DashboardStats> {
        let inner = self.inner.lock().await;
        inner.require_user(user_id)?;

        let as_solver: Vec<&Session> = inner.sessions.iter().filter(|s| s.solver_id == user_id).collect();
        let completed: Vec<&&Session> = as_solver
            .iter()
            .filter(|s| s.status == SessionStatus::Completed)
            .collect();
        let published: Vec<&Content> = inner
            .content
            .iter()
            .filter(|c| c.user_id == user_id && c.status == ContentStatus::Published)
            .collect();
        let profile = inner.profiles.get(&user_id);

        Ok(DashboardStats {
            total_sessions: as_solver.len() as i64,
            completed_sessions: completed.len() as i64,
            total_earnings: completed.iter().map(|s| s.price).sum(),
            total_content: published.len() as i64,
            total_views: published.iter().map(|c| c.views).sum(),
            followers: profile.map_or(0, |p| p.followers),
            following: profile.map_or(0, |p| p.following),
            wallet_balance: inner.wallets.get(&user_id).map_or(Decimal::ZERO, |w| w.balance),
            profile_complete: profile.map_or(0, |p| p.profile_complete),
        })
    }

    async fn recent_sessions(
        &self,
        user_id: Uuid,
        role: Role,
        limit: i64,
    ) -> PortResult<Vec<SessionDigest>> {
        let inner = self.inner.lock().await;
        let mut sessions: Vec<&Session> = inner.sessions_from_side(user_id, role).collect();
        sessions.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        Ok(sessions
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|s| inner.digest(s, role))
            .collect())
    }

    async fn upcoming_sessions(
        &self,
        user_id: Uuid,
        role: Role,
        now: DateTime<Utc>,
    ) -> PortResult<Vec<SessionDigest>> {
        let inner = self.inner.lock().await;
        let mut sessions: Vec<&Session> = inner
            .sessions_from_side(user_id, role)
            .filter(|s| matches!(s.status, SessionStatus::Scheduled | SessionStatus::Confirmed))
            .filter(|s| s.scheduled_at > now)
            .collect();
        sessions.sort_by_key(|s| s.scheduled_at);
        Ok(sessions.into_iter().map(|s| inner.digest(s, role)).collect())
    }

    async fn monthly_activity(
        &self,
        solver_id: Uuid,
        since: DateTime<Utc>,
    ) -> PortResult<Vec<MonthlyActivity>> {
        let inner = self.inner.lock().await;
        let mut months: BTreeMap<String, (i64, Decimal)> = BTreeMap::new();
        for s in inner
            .sessions
            .iter()
            .filter(|s| s.solver_id == solver_id && s.scheduled_at >= since)
        {
            let entry = months
                .entry(s.scheduled_at.format("%Y-%m").to_string())
                .or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            if s.status == SessionStatus::Completed {
                entry.1 += s.price;
            }
        }
        Ok(months
            .into_iter()
            .map(|(month, (sessions, earnings))| MonthlyActivity {
                month,
                sessions,
                earnings,
            })
            .collect())
    }

    async fn leaderboard(&self, limit: i64) -> PortResult<Vec<LeaderboardEntry>> {
        let inner = self.inner.lock().await;
        let mut entries: Vec<LeaderboardEntry> = inner
            .users
            .iter()
            .map(|c| &c.user)
            .filter(|u| u.role == Role::Solver && u.is_active)
            .filter_map(|u| {
                let sessions: Vec<&Session> =
                    inner.sessions.iter().filter(|s| s.solver_id == u.id).collect();
                if sessions.is_empty() {
                    return None;
                }
                let ratings: Vec<f64> = sessions.iter().filter_map(|s| s.rating).map(f64::from).collect();
                let rating = if ratings.is_empty() {
                    0.0
                } else {
                    ratings.iter().sum::<f64>() / ratings.len() as f64
                };
                Some(LeaderboardEntry {
                    user_id: u.id,
                    name: u.display_name(),
                    profile_pic: u.profile_pic.clone(),
                    total_sessions: sessions.len() as i64,
                    rating,
                    earnings: sessions
                        .iter()
                        .filter(|s| s.status == SessionStatus::Completed)
                        .map(|s| s.price)
                        .sum(),
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            b.earnings
                .cmp(&a.earnings)
                .then_with(|| b.rating.total_cmp(&a.rating))
        });
        entries.truncate(limit.max(0) as usize);
        Ok(entries)
    }

    async fn platform_analytics(&self) -> PortResult<PlatformAnalytics> {
        let inner = self.inner.lock().await;
        Ok(PlatformAnalytics {
            total_users: inner.users.len() as i64,
            total_sessions: inner.sessions.len() as i64,
            total_content: inner.content.len() as i64,
            total_wallet_balance: inner.wallets.values().map(|w| w.balance).sum(),
        })
    }
}
