//! Crosspub - compose once, publish everywhere
//!
//! Core library for the Crosspub client: create and publish posts across
//! social platforms through the Crosspub backend, and drive the
//! account-linking workflow from any shell.

pub mod config;
pub mod credentials;
pub mod error;
pub mod events;
pub mod gateway;
pub mod linker;
pub mod logging;
pub mod publisher;
pub mod schedule;
pub mod service;
pub mod summary;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{CrosspubError, Result};
pub use gateway::{BackendGateway, PublishResponse};
pub use linker::{AccountLinker, ConnectOutcome, LinkState};
pub use publisher::Publisher;
pub use service::CrosspubService;
pub use types::{NewPost, Platform, PlatformResult, Post, PostStatus, SocialAccount};
