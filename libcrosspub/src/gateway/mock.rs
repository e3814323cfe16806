//! Mock gateway implementation for testing
//!
//! A configurable in-memory [`BackendGateway`] that can script rejections,
//! publish outcomes, and the account list a poll loop observes. Call counts
//! and submitted inputs are recorded so tests can assert exactly which
//! network operations an orchestration issued.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::credentials::CredentialFields;
use crate::error::{GatewayError, Result};
use crate::gateway::{BackendGateway, PublishResponse};
use crate::types::{
    CredentialStatusMap, NewPost, Platform, PlatformResult, Post, PostStatus, SocialAccount,
};

/// Number of calls the mock has served, per operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub create_post: usize,
    pub publish_post: usize,
    pub list_posts: usize,
    pub list_accounts: usize,
    pub begin_connect: usize,
    pub disconnect_account: usize,
    pub save_credentials: usize,
    pub credential_status: usize,
}

impl CallCounts {
    /// Total network operations served
    pub fn total(&self) -> usize {
        self.create_post
            + self.publish_post
            + self.list_posts
            + self.list_accounts
            + self.begin_connect
            + self.disconnect_account
            + self.save_credentials
            + self.credential_status
    }
}

/// Scriptable in-memory gateway
pub struct MockGateway {
    create_error: Option<String>,
    publish_error: Option<String>,
    publish_results: Option<Vec<PlatformResult>>,
    connect_error: Option<String>,
    disconnect_error: Option<String>,
    save_credentials_error: Option<String>,
    auth_url: String,
    posts: Vec<Post>,
    accounts: Vec<SocialAccount>,
    /// Account added to the listing once `list_accounts` has been called
    /// at least this many times (simulates authorization completing mid-poll)
    appearing_account: Option<(usize, SocialAccount)>,
    /// The first N `list_accounts` calls fail with a transient rejection
    list_failures: usize,

    counts: Arc<Mutex<CallCounts>>,
    created_posts: Arc<Mutex<Vec<Post>>>,
    published_ids: Arc<Mutex<Vec<String>>>,
    connect_requests: Arc<Mutex<Vec<Platform>>>,
    disconnected_ids: Arc<Mutex<Vec<String>>>,
    saved_credentials: Arc<Mutex<Vec<(Platform, Vec<String>)>>>,
    credential_status: Arc<Mutex<CredentialStatusMap>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        let status: CredentialStatusMap =
            Platform::ALL.iter().map(|p| (*p, false)).collect();
        Self {
            create_error: None,
            publish_error: None,
            publish_results: None,
            connect_error: None,
            disconnect_error: None,
            save_credentials_error: None,
            auth_url: "https://auth.example/authorize?state=mock".to_string(),
            posts: Vec::new(),
            accounts: Vec::new(),
            appearing_account: None,
            list_failures: 0,
            counts: Arc::new(Mutex::new(CallCounts::default())),
            created_posts: Arc::new(Mutex::new(Vec::new())),
            published_ids: Arc::new(Mutex::new(Vec::new())),
            connect_requests: Arc::new(Mutex::new(Vec::new())),
            disconnected_ids: Arc::new(Mutex::new(Vec::new())),
            saved_credentials: Arc::new(Mutex::new(Vec::new())),
            credential_status: Arc::new(Mutex::new(status)),
        }
    }
}

impl MockGateway {
    /// A gateway where every operation succeeds and nothing is linked yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject `create_post` with the given backend message
    pub fn with_create_error(mut self, message: &str) -> Self {
        self.create_error = Some(message.to_string());
        self
    }

    /// Reject `publish_post` with the given backend message
    pub fn with_publish_error(mut self, message: &str) -> Self {
        self.publish_error = Some(message.to_string());
        self
    }

    /// Script the per-platform results `publish_post` reports.
    ///
    /// Without this, every targeted platform succeeds.
    pub fn with_publish_results(mut self, results: Vec<PlatformResult>) -> Self {
        self.publish_results = Some(results);
        self
    }

    /// Seed the post feed returned by `list_posts`
    pub fn with_posts(mut self, posts: Vec<Post>) -> Self {
        self.posts = posts;
        self
    }

    /// Seed the accounts returned by `list_accounts`
    pub fn with_accounts(mut self, accounts: Vec<SocialAccount>) -> Self {
        self.accounts = accounts;
        self
    }

    /// Make `account` show up in listings from the `on_call`-th
    /// `list_accounts` call onwards (1-based)
    pub fn with_account_appearing(mut self, account: SocialAccount, on_call: usize) -> Self {
        self.appearing_account = Some((on_call, account));
        self
    }

    /// Fail the first `n` `list_accounts` calls with a transient rejection
    pub fn with_list_failures(mut self, n: usize) -> Self {
        self.list_failures = n;
        self
    }

    /// Reject `begin_connect` with the given backend message
    pub fn with_connect_error(mut self, message: &str) -> Self {
        self.connect_error = Some(message.to_string());
        self
    }

    /// Override the authorization URL `begin_connect` hands out
    pub fn with_auth_url(mut self, url: &str) -> Self {
        self.auth_url = url.to_string();
        self
    }

    /// Reject `disconnect_account` with the given backend message
    pub fn with_disconnect_error(mut self, message: &str) -> Self {
        self.disconnect_error = Some(message.to_string());
        self
    }

    /// Reject `save_credentials` with the given backend message
    pub fn with_save_credentials_error(mut self, message: &str) -> Self {
        self.save_credentials_error = Some(message.to_string());
        self
    }

    /// Mark the given platforms as having configured credentials
    pub fn with_configured(self, platforms: &[Platform]) -> Self {
        {
            let mut status = self.credential_status.lock().unwrap();
            for platform in platforms {
                status.insert(*platform, true);
            }
        }
        self
    }

    /// Snapshot of the per-operation call counts
    pub fn counts(&self) -> CallCounts {
        *self.counts.lock().unwrap()
    }

    /// Total network operations served
    pub fn total_calls(&self) -> usize {
        self.counts().total()
    }

    /// Posts handed to `create_post`, in call order
    pub fn created_posts(&self) -> Vec<Post> {
        self.created_posts.lock().unwrap().clone()
    }

    /// Ids handed to `publish_post`, in call order
    pub fn published_ids(&self) -> Vec<String> {
        self.published_ids.lock().unwrap().clone()
    }

    /// Platforms handed to `begin_connect`, in call order
    pub fn connect_requests(&self) -> Vec<Platform> {
        self.connect_requests.lock().unwrap().clone()
    }

    /// Ids handed to `disconnect_account`, in call order
    pub fn disconnected_ids(&self) -> Vec<String> {
        self.disconnected_ids.lock().unwrap().clone()
    }

    /// Platform and field keys of each `save_credentials` call.
    ///
    /// Values are deliberately not recorded.
    pub fn saved_credentials(&self) -> Vec<(Platform, Vec<String>)> {
        self.saved_credentials.lock().unwrap().clone()
    }

    fn rejected(message: &str) -> GatewayError {
        GatewayError::rejected(400, message)
    }
}

#[async_trait]
impl BackendGateway for MockGateway {
    async fn create_post(&self, input: &NewPost) -> Result<Post> {
        self.counts.lock().unwrap().create_post += 1;

        if let Some(message) = &self.create_error {
            return Err(Self::rejected(message).into());
        }

        let status = if input.scheduled_at.is_some() {
            PostStatus::Scheduled
        } else {
            PostStatus::Draft
        };
        let post = Post {
            id: Uuid::new_v4().to_string(),
            title: input.title.clone(),
            content: input.content.clone(),
            platforms: input.platforms.clone(),
            scheduled_at: input.scheduled_at,
            status,
            created_at: Some(Utc::now()),
        };
        self.created_posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn publish_post(&self, post_id: &str) -> Result<PublishResponse> {
        self.counts.lock().unwrap().publish_post += 1;
        self.published_ids.lock().unwrap().push(post_id.to_string());

        if let Some(message) = &self.publish_error {
            return Err(Self::rejected(message).into());
        }

        let created = self
            .created_posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == post_id)
            .cloned();
        let mut post = match created {
            Some(post) => post,
            None => {
                return Err(GatewayError::rejected(404, "Post non trovato").into());
            }
        };

        let results = match &self.publish_results {
            Some(results) => results.clone(),
            None => post
                .platforms
                .iter()
                .map(|p| PlatformResult::success(*p))
                .collect(),
        };
        post.status = PostStatus::from_results(&results);
        Ok(PublishResponse { post, results })
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        self.counts.lock().unwrap().list_posts += 1;

        let mut feed: Vec<Post> = self
            .created_posts
            .lock()
            .unwrap()
            .iter()
            .rev()
            .cloned()
            .collect();
        feed.extend(self.posts.iter().cloned());
        Ok(feed)
    }

    async fn list_accounts(&self) -> Result<Vec<SocialAccount>> {
        let call = {
            let mut counts = self.counts.lock().unwrap();
            counts.list_accounts += 1;
            counts.list_accounts
        };

        if call <= self.list_failures {
            return Err(GatewayError::rejected(503, "Temporarily unavailable").into());
        }

        let mut accounts = self.accounts.clone();
        if let Some((on_call, account)) = &self.appearing_account {
            if call >= *on_call {
                accounts.push(account.clone());
            }
        }
        Ok(accounts)
    }

    async fn begin_connect(&self, platform: Platform) -> Result<String> {
        self.counts.lock().unwrap().begin_connect += 1;
        self.connect_requests.lock().unwrap().push(platform);

        if let Some(message) = &self.connect_error {
            return Err(Self::rejected(message).into());
        }
        Ok(self.auth_url.clone())
    }

    async fn disconnect_account(&self, account_id: &str) -> Result<()> {
        self.counts.lock().unwrap().disconnect_account += 1;
        self.disconnected_ids
            .lock()
            .unwrap()
            .push(account_id.to_string());

        if let Some(message) = &self.disconnect_error {
            return Err(Self::rejected(message).into());
        }
        Ok(())
    }

    async fn save_credentials(&self, platform: Platform, fields: &CredentialFields) -> Result<()> {
        self.counts.lock().unwrap().save_credentials += 1;
        let mut keys: Vec<String> = fields.keys().map(str::to_string).collect();
        keys.sort_unstable();
        self.saved_credentials.lock().unwrap().push((platform, keys));

        if let Some(message) = &self.save_credentials_error {
            return Err(Self::rejected(message).into());
        }
        self.credential_status.lock().unwrap().insert(platform, true);
        Ok(())
    }

    async fn credential_status(&self) -> Result<CredentialStatusMap> {
        self.counts.lock().unwrap().credential_status += 1;
        Ok(self.credential_status.lock().unwrap().clone())
    }
}
