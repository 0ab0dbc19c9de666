//! crates/mentor_core/src/community.rs
//!
//! Discussions and events, with author redaction for anonymous posts.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Discussion, DiscussionDraft, Event, EventDraft, Page};
use crate::ports::{CommunityStore, PortError, PortResult};

#[derive(Clone)]
pub struct CommunityService {
    store: Arc<dyn CommunityStore>,
}

impl CommunityService {
    pub fn new(store: Arc<dyn CommunityStore>) -> Self {
        Self { store }
    }

    /// Lists discussions newest first. Anonymous posts keep their author
    /// visible only to that author.
    pub async fn discussions(
        &self,
        viewer_id: Uuid,
        community_id: Option<Uuid>,
        page: Page,
    ) -> PortResult<Vec<Discussion>> {
        let mut discussions = self.store.list_discussions(community_id, page).await?;
        for discussion in &mut discussions {
            redact_author(discussion, viewer_id);
        }
        Ok(discussions)
    }

    pub async fn start_discussion(&self, author_id: Uuid, draft: DiscussionDraft) -> PortResult<Discussion> {
        if draft.title.trim().is_empty() || draft.body.trim().is_empty() {
            return Err(PortError::validation("title and body are required"));
        }
        self.store.insert_discussion(author_id, &draft).await
    }

    pub async fn upcoming_events(&self, page: Page) -> PortResult<Vec<Event>> {
        self.store.list_events(Utc::now(), page).await
    }

    pub async fn create_event(&self, creator_id: Uuid, draft: EventDraft) -> PortResult<Event> {
        if draft.title.trim().is_empty() {
            return Err(PortError::validation("title is required"));
        }
        if draft.event_date <= Utc::now() {
            return Err(PortError::validation("event date must be in the future"));
        }
        if draft.duration_minutes <= 0 {
            return Err(PortError::validation("duration must be positive"));
        }
        if draft.max_attendees.is_some_and(|max| max <= 0) {
            return Err(PortError::validation("max_attendees must be positive"));
        }
        self.store.insert_event(creator_id, &draft).await
    }
}

fn redact_author(discussion: &mut Discussion, viewer_id: Uuid) {
    if discussion.is_anonymous && discussion.user_id != Some(viewer_id) {
        discussion.user_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discussion(author: Uuid, is_anonymous: bool) -> Discussion {
        let now = Utc::now();
        Discussion {
            id: Uuid::new_v4(),
            community_id: None,
            user_id: Some(author),
            title: "Lifetimes".into(),
            body: "When do I need them?".into(),
            likes: 0,
            replies: 0,
            is_anonymous,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn anonymous_author_is_hidden_from_others_only() {
        let author = Uuid::new_v4();

        let mut seen_by_other = discussion(author, true);
        redact_author(&mut seen_by_other, Uuid::new_v4());
        assert_eq!(seen_by_other.user_id, None);

        let mut seen_by_author = discussion(author, true);
        redact_author(&mut seen_by_author, author);
        assert_eq!(seen_by_author.user_id, Some(author));

        let mut public = discussion(author, false);
        redact_author(&mut public, Uuid::new_v4());
        assert_eq!(public.user_id, Some(author));
    }
}
