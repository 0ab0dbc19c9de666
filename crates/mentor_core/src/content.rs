//! crates/mentor_core/src/content.rs
//!
//! User-authored content with owner-only mutation and a publish gate on reads.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{Content, ContentDraft, ContentFilter, ContentListing};
use crate::ports::{ContentStore, PortError, PortResult};

fn validate_draft(draft: &ContentDraft) -> PortResult<()> {
    if draft.title.trim().is_empty() {
        return Err(PortError::validation("title is required"));
    }
    if draft.tags.iter().any(|t| t.trim().is_empty()) {
        return Err(PortError::validation("tags must not be blank"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn ContentStore>,
}

impl ContentService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, viewer_id: Uuid, filter: &ContentFilter) -> PortResult<Vec<ContentListing>> {
        self.store.list_content(viewer_id, filter).await
    }

    pub async fn create(&self, owner_id: Uuid, draft: ContentDraft) -> PortResult<Content> {
        validate_draft(&draft)?;
        let content = self.store.insert_content(owner_id, &draft).await?;
        info!(content_id = %content.id, %owner_id, "Content created");
        Ok(content)
    }

    /// Every successful read counts as a view. Unpublished items of other
    /// users look missing.
    pub async fn get(&self, viewer_id: Uuid, content_id: Uuid) -> PortResult<ContentListing> {
        let mut listing = match self.store.find_content(content_id).await? {
            Some(listing) if listing.content.is_visible_to(viewer_id) => listing,
            _ => return Err(PortError::NotFound(format!("Content {} not found", content_id))),
        };
        self.store.record_view(content_id).await?;
        listing.content.views += 1;
        Ok(listing)
    }

    pub async fn update(&self, owner_id: Uuid, content_id: Uuid, draft: ContentDraft) -> PortResult<Content> {
        self.owned(owner_id, content_id, "update").await?;
        validate_draft(&draft)?;
        self.store.update_content(content_id, &draft).await
    }

    pub async fn delete(&self, owner_id: Uuid, content_id: Uuid) -> PortResult<()> {
        self.owned(owner_id, content_id, "delete").await?;
        if !self.store.delete_content(content_id).await? {
            return Err(PortError::NotFound(format!("Content {} not found", content_id)));
        }
        info!(%content_id, %owner_id, "Content deleted");
        Ok(())
    }

    async fn owned(&self, owner_id: Uuid, content_id: Uuid, action: &str) -> PortResult<Content> {
        let listing = self
            .store
            .find_content(content_id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("Content {} not found", content_id)))?;
        if listing.content.user_id != owner_id {
            return Err(PortError::Forbidden(format!(
                "not authorized to {} this content",
                action
            )));
        }
        Ok(listing.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContentKind, ContentStatus};

    fn draft(title: &str, tags: &[&str]) -> ContentDraft {
        ContentDraft {
            title: title.to_string(),
            description: None,
            kind: ContentKind::Link,
            url: Some("https://doc.rust-lang.org/book/".to_string()),
            category: None,
            sub_category: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            status: ContentStatus::Published,
        }
    }

    #[test]
    fn title_is_required() {
        assert!(validate_draft(&draft("  ", &[])).is_err());
        assert!(validate_draft(&draft("The Book", &["rust"])).is_ok());
    }

    #[test]
    fn blank_tags_are_rejected() {
        assert!(validate_draft(&draft("The Book", &["rust", " "])).is_err());
    }
}
