//! crates/mentor_core/src/sessions.rs
//!
//! The session ledger: scheduling, participant-scoped reads, lifecycle
//! updates and deletion.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    Caller, NewSession, Page, Role, Session, SessionFilter, SessionListing, SessionPatch,
    MAX_AMOUNT,
};
use crate::notifications::Notifier;
use crate::ports::{PortError, PortResult, SessionStore};

pub const MIN_DURATION_MINUTES: i32 = 15;
pub const MAX_DURATION_MINUTES: i32 = 480;

/// Payload for booking a session.
///
/// `counterpart_id` is the other participant: the seeker when a solver books,
/// the solver otherwise.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateSessionRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default = "default_duration")]
    pub duration_minutes: i32,
    pub price: Decimal,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub counterpart_id: Option<Uuid>,
}

fn default_duration() -> i32 {
    60
}

impl CreateSessionRequest {
    fn validate(&self, now: DateTime<Utc>) -> PortResult<()> {
        if self.title.trim().is_empty() {
            return Err(PortError::validation("title is required"));
        }
        if self.category.trim().is_empty() {
            return Err(PortError::validation("category is required"));
        }
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&self.duration_minutes) {
            return Err(PortError::Validation(format!(
                "duration must be between {} and {} minutes",
                MIN_DURATION_MINUTES, MAX_DURATION_MINUTES
            )));
        }
        if self.price.is_sign_negative() {
            return Err(PortError::validation("price must not be negative"));
        }
        if self.price >= MAX_AMOUNT {
            return Err(PortError::Validation(format!("price must be less than {}", MAX_AMOUNT)));
        }
        if self.scheduled_at <= now {
            return Err(PortError::validation("scheduled time must be in the future"));
        }
        Ok(())
    }
}

/// Checks a patch against the session it would modify.
fn validate_patch(session: &Session, patch: &SessionPatch, now: DateTime<Utc>) -> PortResult<()> {
    if let Some(next) = patch.status {
        if next != session.status && !session.status.can_transition_to(next) {
            return Err(PortError::Validation(format!(
                "cannot move session from {} to {}",
                session.status, next
            )));
        }
    }

    let changes_status = patch.status.is_some_and(|s| s != session.status);
    if session.status.is_terminal() && (changes_status || patch.touches_schedule()) {
        return Err(PortError::Validation(format!(
            "session is {}; only rating and review may change",
            session.status
        )));
    }

    if let Some(rating) = patch.rating {
        if !(1..=5).contains(&rating) {
            return Err(PortError::validation("rating must be between 1 and 5"));
        }
    }

    if let Some(scheduled_at) = patch.scheduled_at {
        if scheduled_at <= now {
            return Err(PortError::validation("scheduled time must be in the future"));
        }
    }

    let started_at = patch.started_at.or(session.started_at);
    let ended_at = patch.ended_at.or(session.ended_at);
    if let (Some(start), Some(end)) = (started_at, ended_at) {
        if end < start {
            return Err(PortError::validation("ended_at must not be before started_at"));
        }
    }

    Ok(())
}

#[derive(Clone)]
pub struct SessionLedger {
    sessions: Arc<dyn SessionStore>,
    notifier: Notifier,
}

impl SessionLedger {
    pub fn new(sessions: Arc<dyn SessionStore>, notifier: Notifier) -> Self {
        Self { sessions, notifier }
    }

    /// Books a session in the `scheduled` state and notifies both participants.
    pub async fn create_session(
        &self,
        caller: &Caller,
        req: CreateSessionRequest,
    ) -> PortResult<Session> {
        req.validate(Utc::now())?;
        let counterpart_id = req
            .counterpart_id
            .ok_or_else(|| PortError::validation("counterpart_id is required"))?;
        if counterpart_id == caller.user_id {
            return Err(PortError::validation("a session needs two different participants"));
        }

        let (solver_id, seeker_id) = match caller.role {
            Role::Solver => (caller.user_id, counterpart_id),
            Role::Seeker | Role::Admin => (counterpart_id, caller.user_id),
        };

        let session = self
            .sessions
            .insert_session(NewSession {
                solver_id,
                seeker_id,
                title: req.title.trim().to_string(),
                description: req.description,
                category: req.category.trim().to_string(),
                sub_category: req.sub_category,
                duration_minutes: req.duration_minutes,
                price: req.price,
                scheduled_at: req.scheduled_at,
            })
            .await?;
        info!(session_id = %session.id, %solver_id, %seeker_id, "Session scheduled");

        self.notifier.session_scheduled(&session).await;
        Ok(session)
    }

    pub async fn list_sessions(
        &self,
        caller: &Caller,
        filter: &SessionFilter,
    ) -> PortResult<Vec<SessionListing>> {
        self.sessions.list_sessions_for(caller.user_id, filter).await
    }

    /// Non-participants get the same `NotFound` as for a missing session.
    pub async fn get_session(&self, caller: &Caller, session_id: Uuid) -> PortResult<SessionListing> {
        match self.sessions.find_session(session_id).await? {
            Some(listing) if listing.session.is_participant(caller.user_id) => Ok(listing),
            _ => Err(PortError::NotFound(format!("Session {} not found", session_id))),
        }
    }

    pub async fn update_session(
        &self,
        caller: &Caller,
        session_id: Uuid,
        patch: SessionPatch,
    ) -> PortResult<Session> {
        let current = self.participant_session(caller, session_id, "update").await?;
        if patch.is_empty() {
            return Err(PortError::NoOp);
        }
        validate_patch(&current, &patch, Utc::now())?;

        let updated = self
            .sessions
            .update_session(session_id, current.status, &patch)
            .await?
            .ok_or_else(|| {
                PortError::Conflict(format!("session {} was modified concurrently", session_id))
            })?;
        info!(%session_id, status = %updated.status, "Session updated");
        Ok(updated)
    }

    pub async fn delete_session(&self, caller: &Caller, session_id: Uuid) -> PortResult<()> {
        self.participant_session(caller, session_id, "delete").await?;
        if !self.sessions.delete_session(session_id).await? {
            return Err(PortError::NotFound(format!("Session {} not found", session_id)));
        }
        info!(%session_id, "Session deleted");
        Ok(())
    }

    pub async fn list_all_sessions(&self, page: Page) -> PortResult<Vec<SessionListing>> {
        self.sessions.list_all_sessions(page).await
    }

    async fn participant_session(
        &self,
        caller: &Caller,
        session_id: Uuid,
        action: &str,
    ) -> PortResult<Session> {
        let listing = self
            .sessions
            .find_session(session_id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("Session {} not found", session_id)))?;
        if !listing.session.is_participant(caller.user_id) {
            return Err(PortError::Forbidden(format!(
                "not authorized to {} this session",
                action
            )));
        }
        Ok(listing.session)
    }
}
