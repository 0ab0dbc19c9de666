//! crates/mentor_core/src/notifications.rs
//!
//! In-app notifications and the best-effort fan-out on session creation.

use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{Notification, Session};
use crate::ports::{NotificationStore, PortResult};

/// Most notifications returned by a single listing.
pub const NOTIFICATION_LIST_LIMIT: i64 = 50;

#[derive(Clone)]
pub struct Notifier {
    store: Arc<dyn NotificationStore>,
}

impl Notifier {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Inserts an unread in-app notification.
    pub async fn notify(&self, user_id: Uuid, title: &str, message: &str) -> PortResult<Notification> {
        self.store.insert_notification(user_id, title, message).await
    }

    /// Tells both participants about a new session. Failures are logged and
    /// never propagate to the caller.
    pub async fn session_scheduled(&self, session: &Session) {
        let message = format!("A new session has been scheduled: {}", session.title);
        for user_id in session.participants() {
            match self.notify(user_id, "New Session Scheduled", &message).await {
                Ok(n) => debug!(notification_id = %n.id, %user_id, "Session notification sent"),
                Err(e) => warn!(
                    session_id = %session.id,
                    %user_id,
                    "Failed to notify participant: {}",
                    e
                ),
            }
        }
    }

    pub async fn list(&self, user_id: Uuid) -> PortResult<Vec<Notification>> {
        self.store
            .list_notifications(user_id, NOTIFICATION_LIST_LIMIT)
            .await
    }

    /// Touching someone else's notification affects nothing and is not an error.
    pub async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> PortResult<()> {
        let affected = self
            .store
            .mark_notification_read(user_id, notification_id)
            .await?;
        debug!(%user_id, %notification_id, affected, "Mark notification read");
        Ok(())
    }

    pub async fn delete(&self, user_id: Uuid, notification_id: Uuid) -> PortResult<()> {
        let affected = self
            .store
            .delete_notification(user_id, notification_id)
            .await?;
        debug!(%user_id, %notification_id, affected, "Delete notification");
        Ok(())
    }
}
