//! Dashboard summary derivation
//!
//! Pure functions over caller-owned collections; nothing here touches the
//! network.

use serde::{Deserialize, Serialize};

use crate::types::{Post, PostStatus, SocialAccount};

/// The numbers the dashboard front page shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Linked social accounts
    pub connected_accounts: usize,
    /// All posts, regardless of status
    pub total_posts: usize,
    /// Posts that reached every selected platform
    pub published: usize,
    /// Posts waiting on a schedule
    pub scheduled: usize,
}

/// Derive the dashboard numbers from the caller's current collections
pub fn summarize(posts: &[Post], accounts: &[SocialAccount]) -> DashboardSummary {
    DashboardSummary {
        connected_accounts: accounts.len(),
        total_posts: posts.len(),
        published: posts
            .iter()
            .filter(|p| p.status == PostStatus::Published)
            .count(),
        scheduled: posts
            .iter()
            .filter(|p| p.status == PostStatus::Scheduled)
            .count(),
    }
}

/// The most recent posts for the dashboard feed preview
pub fn recent(posts: &[Post], limit: usize) -> &[Post] {
    &posts[..posts.len().min(limit)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Platform;

    fn post(id: &str, status: PostStatus) -> Post {
        Post {
            id: id.to_string(),
            title: None,
            content: "content".to_string(),
            platforms: vec![Platform::Facebook],
            scheduled_at: None,
            status,
            created_at: None,
        }
    }

    fn account(id: &str) -> SocialAccount {
        SocialAccount {
            id: id.to_string(),
            platform: Platform::Facebook,
            account_name: "user".to_string(),
            connected_at: None,
        }
    }

    #[test]
    fn test_summarize_counts_by_status() {
        let posts = vec![
            post("1", PostStatus::Published),
            post("2", PostStatus::Published),
            post("3", PostStatus::Scheduled),
            post("4", PostStatus::Draft),
            post("5", PostStatus::Partial),
            post("6", PostStatus::Failed),
        ];
        let accounts = vec![account("a"), account("b")];

        let summary = summarize(&posts, &accounts);
        assert_eq!(
            summary,
            DashboardSummary {
                connected_accounts: 2,
                total_posts: 6,
                published: 2,
                scheduled: 1,
            }
        );
    }

    #[test]
    fn test_summarize_empty_collections() {
        let summary = summarize(&[], &[]);
        assert_eq!(summary.connected_accounts, 0);
        assert_eq!(summary.total_posts, 0);
        assert_eq!(summary.published, 0);
        assert_eq!(summary.scheduled, 0);
    }

    #[test]
    fn test_recent_caps_at_limit() {
        let posts: Vec<Post> = (0..8)
            .map(|i| post(&i.to_string(), PostStatus::Draft))
            .collect();

        assert_eq!(recent(&posts, 5).len(), 5);
        assert_eq!(recent(&posts, 5)[0].id, "0");
        assert_eq!(recent(&posts, 20).len(), 8);
        assert_eq!(recent(&[], 5).len(), 0);
    }
}
