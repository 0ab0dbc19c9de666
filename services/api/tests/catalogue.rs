//! Content and community services over the in-memory store.

mod common;

use chrono::{Duration, Utc};
use common::*;
use mentor_core::{
    domain::{
        ContentDraft, ContentFilter, ContentKind, ContentStatus, DiscussionDraft, EventDraft, Page,
    },
    PortError, Role,
};

fn draft(title: &str, status: ContentStatus) -> ContentDraft {
    ContentDraft {
        title: title.to_string(),
        description: None,
        kind: ContentKind::Blog,
        url: None,
        category: Some("Programming".to_string()),
        sub_category: None,
        tags: vec!["rust".to_string()],
        status,
    }
}

fn published_only() -> ContentFilter {
    ContentFilter {
        status: Some(ContentStatus::Published),
        ..Default::default()
    }
}

#[tokio::test]
async fn drafts_are_private_until_published() {
    let (_, state) = app();
    let author = register(&state, "author@example.com", Role::Solver).await.user;
    let reader = register(&state, "reader@example.com", Role::Seeker).await.user;

    let hidden = state
        .content
        .create(author.id, draft("Work in progress", ContentStatus::Draft))
        .await
        .unwrap();
    let public = state
        .content
        .create(author.id, draft("Borrowing explained", ContentStatus::Published))
        .await
        .unwrap();

    let err = state.content.get(reader.id, hidden.id).await.unwrap_err();
    assert!(matches!(err, PortError::NotFound(_)));
    assert!(state.content.get(author.id, hidden.id).await.is_ok());

    let all = ContentFilter::default();
    let seen_by_reader = state.content.list(reader.id, &all).await.unwrap();
    assert_eq!(seen_by_reader.len(), 1);
    assert_eq!(seen_by_reader[0].content.id, public.id);
    assert_eq!(seen_by_reader[0].author_name, "Ada Lovelace");

    let seen_by_author = state.content.list(author.id, &all).await.unwrap();
    assert_eq!(seen_by_author.len(), 2);
    assert_eq!(state.content.list(author.id, &published_only()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn every_read_counts_as_a_view() {
    let (_, state) = app();
    let author = register(&state, "author@example.com", Role::Solver).await.user;
    let reader = register(&state, "reader@example.com", Role::Seeker).await.user;
    let item = state
        .content
        .create(author.id, draft("Traits", ContentStatus::Published))
        .await
        .unwrap();

    let first = state.content.get(reader.id, item.id).await.unwrap();
    let second = state.content.get(reader.id, item.id).await.unwrap();
    assert_eq!(first.content.views, 1);
    assert_eq!(second.content.views, 2);

    let stats = state.dashboard.stats(&caller(&author)).await.unwrap();
    assert_eq!(stats.total_content, 1);
    assert_eq!(stats.total_views, 2);
}

#[tokio::test]
async fn only_the_owner_may_change_content() {
    let (_, state) = app();
    let author = register(&state, "author@example.com", Role::Solver).await.user;
    let other = register(&state, "other@example.com", Role::Solver).await.user;
    let item = state
        .content
        .create(author.id, draft("Async", ContentStatus::Published))
        .await
        .unwrap();

    let err = state
        .content
        .update(other.id, item.id, draft("Hijacked", ContentStatus::Published))
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::Forbidden(_)));
    let err = state.content.delete(other.id, item.id).await.unwrap_err();
    assert!(matches!(err, PortError::Forbidden(_)));

    let renamed = state
        .content
        .update(author.id, item.id, draft("Async in depth", ContentStatus::Archived))
        .await
        .unwrap();
    assert_eq!(renamed.title, "Async in depth");
    assert_eq!(renamed.status, ContentStatus::Archived);

    state.content.delete(author.id, item.id).await.unwrap();
    let err = state.content.delete(author.id, item.id).await.unwrap_err();
    assert!(matches!(err, PortError::NotFound(_)));
}

#[tokio::test]
async fn discussions_need_a_title_and_body() {
    let (_, state) = app();
    let user = register(&state, "talker@example.com", Role::Seeker).await.user;

    let blank = DiscussionDraft {
        community_id: None,
        title: "How to start?".into(),
        body: "   ".into(),
        is_anonymous: false,
    };
    let err = state.community.start_discussion(user.id, blank).await.unwrap_err();
    assert!(matches!(err, PortError::Validation(_)));

    for title in ["First", "Second"] {
        let draft = DiscussionDraft {
            community_id: None,
            title: title.into(),
            body: "Looking for a Rust mentor".into(),
            is_anonymous: true,
        };
        state.community.start_discussion(user.id, draft).await.unwrap();
    }

    let listed = state.community.discussions(user.id, None, Page::default()).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].title, "Second");
    assert!(listed[0].is_anonymous);
    assert_eq!(listed[0].user_id, Some(user.id));

    let reader = register(&state, "reader@example.com", Role::Seeker).await.user;
    let seen = state.community.discussions(reader.id, None, Page::default()).await.unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|d| d.user_id.is_none()));
}

#[tokio::test]
async fn events_are_listed_soonest_first_and_must_be_in_the_future() {
    let (_, state) = app();
    let host = register(&state, "host@example.com", Role::Solver).await.user;
    let event = |title: &str, in_days: i64| EventDraft {
        title: title.into(),
        description: None,
        event_date: Utc::now() + Duration::days(in_days),
        duration_minutes: 90,
        max_attendees: Some(30),
        category: Some("Programming".into()),
    };

    let err = state.community.create_event(host.id, event("Yesterday", -1)).await.unwrap_err();
    assert!(matches!(err, PortError::Validation(_)));

    let mut full = event("Zero seats", 3);
    full.max_attendees = Some(0);
    assert!(state.community.create_event(host.id, full).await.is_err());

    state.community.create_event(host.id, event("Later", 10)).await.unwrap();
    state.community.create_event(host.id, event("Sooner", 2)).await.unwrap();

    let upcoming = state.community.upcoming_events(Page::default()).await.unwrap();
    let titles: Vec<&str> = upcoming.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["Sooner", "Later"]);
}
