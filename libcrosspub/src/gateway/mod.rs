//! Backend gateway abstraction
//!
//! All network I/O in the core goes through the [`BackendGateway`] trait.
//! [`HttpGateway`] talks to the real backend over HTTP; [`MockGateway`] is a
//! scriptable in-memory stand-in.
//!
//! # Examples
//!
//! ```no_run
//! use libcrosspub::gateway::{BackendGateway, HttpGateway};
//! use libcrosspub::types::NewPost;
//!
//! # async fn example() -> libcrosspub::error::Result<()> {
//! let gateway = HttpGateway::new("http://localhost:5000")?;
//!
//! let post = gateway.create_post(&NewPost::new("Hello")).await?;
//! println!("created {}", post.id);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::credentials::CredentialFields;
use crate::error::Result;
use crate::types::{CredentialStatusMap, NewPost, Platform, PlatformResult, Post, SocialAccount};

pub mod http;

// Mock gateway is available for all builds (not just tests) to support
// integration tests and scripted shells
pub mod mock;

pub use http::HttpGateway;
pub use mock::MockGateway;

/// The boundary object through which the core performs all backend I/O.
///
/// Implementations are shared as `Arc<dyn BackendGateway>`; the publisher and
/// the account linker both hold one.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Create a post.
    ///
    /// The backend assigns the id and the initial status: `draft`, or
    /// `scheduled` when the input carries a schedule timestamp.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the backend rejects the post or cannot be
    /// reached.
    async fn create_post(&self, input: &NewPost) -> Result<Post>;

    /// Publish an existing post to every platform it targets.
    ///
    /// The backend fans out to the platforms itself and reports one
    /// [`PlatformResult`] per platform alongside the final post.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` only when the publish call itself fails;
    /// per-platform failures are carried inside the results, not as errors.
    async fn publish_post(&self, post_id: &str) -> Result<PublishResponse>;

    /// Fetch the caller's post feed, most recent first
    async fn list_posts(&self) -> Result<Vec<Post>>;

    /// Fetch the currently linked accounts
    async fn list_accounts(&self) -> Result<Vec<SocialAccount>>;

    /// Start the authorization handshake for a platform.
    ///
    /// Returns the URL the user must visit to authorize the application.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the backend rejects the attempt, e.g. when
    /// credentials for the platform are not configured.
    async fn begin_connect(&self, platform: Platform) -> Result<String>;

    /// Remove a linked account
    async fn disconnect_account(&self, account_id: &str) -> Result<()>;

    /// Submit application credentials for a platform.
    ///
    /// Field values are serialized once, inside the implementation; they are
    /// never echoed back.
    async fn save_credentials(&self, platform: Platform, fields: &CredentialFields) -> Result<()>;

    /// Which platforms have application credentials configured
    async fn credential_status(&self) -> Result<CredentialStatusMap>;
}

/// What the backend reports after a publish call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishResponse {
    pub post: Post,
    pub results: Vec<PlatformResult>,
}
