//! Publish orchestration
//!
//! [`Publisher`] drives the two composition workflows: saving a draft and
//! publish-now. Publish-now is create-then-dispatch: the post is created
//! first, then published in a second backend call, and the final status is
//! derived from the per-platform results. If the create call fails, no
//! publish call is issued.
//!
//! The publisher never touches the caller's post collection; merge helpers
//! like [`prepend_post`] return a new list and let the caller decide.

use std::sync::Arc;

use crate::error::{Result, ValidationError};
use crate::events::{Event, EventBus};
use crate::gateway::{BackendGateway, PublishResponse};
use crate::types::{NewPost, Post, PostStatus};

/// Orchestrates draft creation and publish-now workflows
pub struct Publisher {
    gateway: Arc<dyn BackendGateway>,
    event_bus: EventBus,
}

impl Publisher {
    pub fn new(gateway: Arc<dyn BackendGateway>, event_bus: EventBus) -> Self {
        Self { gateway, event_bus }
    }

    /// Create a post without publishing it.
    ///
    /// The backend decides the stored status: `draft`, or `scheduled` when
    /// the input carries a schedule timestamp.
    ///
    /// # Errors
    ///
    /// `ValidationError::EmptyContent` before any network call if the
    /// content is blank; otherwise whatever the gateway surfaces.
    pub async fn save_draft(&self, input: &NewPost) -> Result<Post> {
        validate_content(input)?;

        let post = self.gateway.create_post(input).await?;
        tracing::info!(post_id = %post.id, status = %post.status, "Draft saved");
        self.event_bus.emit(Event::DraftSaved {
            post_id: post.id.clone(),
        });
        Ok(post)
    }

    /// Create a post and immediately publish it to every selected platform.
    ///
    /// The returned post carries the aggregate status derived from the
    /// per-platform results: all success is `published`, a mix is `partial`,
    /// all failure is `failed`.
    ///
    /// # Errors
    ///
    /// Validation failures (`EmptyContent`, `NoPlatformSelected`) are
    /// raised before any network call. A create failure aborts the workflow
    /// before any publish attempt. A publish failure leaves the post in the
    /// status the create step produced.
    pub async fn publish_now(&self, input: &NewPost) -> Result<PublishResponse> {
        validate_content(input)?;
        if input.platforms.is_empty() {
            return Err(ValidationError::NoPlatformSelected.into());
        }

        let created = match self.gateway.create_post(input).await {
            Ok(post) => post,
            Err(err) => {
                self.event_bus.emit(Event::PublishFailed {
                    post_id: None,
                    error: err.to_string(),
                });
                return Err(err);
            }
        };
        self.event_bus.emit(Event::PublishStarted {
            post_id: created.id.clone(),
            platforms: created.platforms.clone(),
        });

        let mut response = match self.gateway.publish_post(&created.id).await {
            Ok(response) => response,
            Err(err) => {
                self.event_bus.emit(Event::PublishFailed {
                    post_id: Some(created.id.clone()),
                    error: err.to_string(),
                });
                return Err(err);
            }
        };

        let status = PostStatus::from_results(&response.results);
        response.post.status = status;
        tracing::info!(
            post_id = %response.post.id,
            status = %status,
            succeeded = response.results.iter().filter(|r| r.success).count(),
            total = response.results.len(),
            "Publish completed"
        );
        self.event_bus.emit(Event::PublishCompleted {
            post_id: response.post.id.clone(),
            status,
            results: response.results.clone(),
        });
        Ok(response)
    }

    /// Fetch the caller's post feed, most recent first
    pub async fn posts(&self) -> Result<Vec<Post>> {
        self.gateway.list_posts().await
    }
}

/// Insert the latest post at the head of a feed.
///
/// Returns a new list; the input is untouched and nothing is deduplicated.
/// Whether an older copy of the same post should be dropped is the caller's
/// call.
pub fn prepend_post(known: &[Post], latest: Post) -> Vec<Post> {
    let mut feed = Vec::with_capacity(known.len() + 1);
    feed.push(latest);
    feed.extend(known.iter().cloned());
    feed
}

fn validate_content(input: &NewPost) -> std::result::Result<(), ValidationError> {
    if input.content.trim().is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CrosspubError;
    use crate::gateway::MockGateway;
    use crate::types::Platform;

    fn publisher(mock: Arc<MockGateway>) -> Publisher {
        Publisher::new(mock, EventBus::new(16))
    }

    fn sample_post(id: &str, status: PostStatus) -> Post {
        Post {
            id: id.to_string(),
            title: None,
            content: "hello".to_string(),
            platforms: vec![Platform::Facebook],
            scheduled_at: None,
            status,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_save_draft_rejects_blank_content_before_network() {
        let mock = Arc::new(MockGateway::new());
        let publisher = publisher(mock.clone());

        let err = publisher.save_draft(&NewPost::new("   ")).await.unwrap_err();
        assert!(matches!(
            err,
            CrosspubError::Validation(ValidationError::EmptyContent)
        ));
        assert_eq!(mock.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_publish_now_requires_platforms_before_network() {
        let mock = Arc::new(MockGateway::new());
        let publisher = publisher(mock.clone());

        let err = publisher.publish_now(&NewPost::new("hello")).await.unwrap_err();
        assert!(matches!(
            err,
            CrosspubError::Validation(ValidationError::NoPlatformSelected)
        ));
        assert_eq!(mock.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_content_checked_before_platforms() {
        let mock = Arc::new(MockGateway::new());
        let publisher = publisher(mock.clone());

        // Both preconditions violated; content wins
        let err = publisher.publish_now(&NewPost::new("")).await.unwrap_err();
        assert!(matches!(
            err,
            CrosspubError::Validation(ValidationError::EmptyContent)
        ));
    }

    #[tokio::test]
    async fn test_publish_now_emits_lifecycle_events() {
        let mock = Arc::new(MockGateway::new());
        let event_bus = EventBus::new(16);
        let mut receiver = event_bus.subscribe();
        let publisher = Publisher::new(mock, event_bus);

        let input = NewPost::new("hello").with_platforms(vec![Platform::Facebook]);
        let response = publisher.publish_now(&input).await.unwrap();

        match receiver.recv().await.unwrap() {
            Event::PublishStarted { post_id, platforms } => {
                assert_eq!(post_id, response.post.id);
                assert_eq!(platforms, vec![Platform::Facebook]);
            }
            other => panic!("expected PublishStarted, got {:?}", other),
        }
        match receiver.recv().await.unwrap() {
            Event::PublishCompleted { status, .. } => {
                assert_eq!(status, PostStatus::Published);
            }
            other => panic!("expected PublishCompleted, got {:?}", other),
        }
    }

    #[test]
    fn test_prepend_post_inserts_at_head() {
        let older = sample_post("a", PostStatus::Published);
        let latest = sample_post("b", PostStatus::Draft);

        let feed = prepend_post(&[older], latest);
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].id, "b");
        assert_eq!(feed[1].id, "a");
    }

    #[test]
    fn test_prepend_post_never_deduplicates() {
        let existing = sample_post("same", PostStatus::Draft);
        let incoming = sample_post("same", PostStatus::Published);

        let feed = prepend_post(&[existing], incoming);
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].id, feed[1].id);
    }
}
