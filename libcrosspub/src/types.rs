//! Core types for Crosspub

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Social platforms the backend can publish to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
    Linkedin,
    Twitter,
    Tiktok,
}

impl Platform {
    /// Every platform the backend knows about, in display order
    pub const ALL: [Platform; 5] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::Linkedin,
        Platform::Twitter,
        Platform::Tiktok,
    ];

    /// Wire identifier, as the backend spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Instagram => "instagram",
            Self::Linkedin => "linkedin",
            Self::Twitter => "twitter",
            Self::Tiktok => "tiktok",
        }
    }

    /// Human-readable name for display
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Facebook => "Facebook",
            Self::Instagram => "Instagram",
            Self::Linkedin => "LinkedIn",
            Self::Twitter => "Twitter",
            Self::Tiktok => "TikTok",
        }
    }

    /// Parse a comma-separated platform list (e.g. from a CLI flag).
    ///
    /// Entries are trimmed and deduplicated; order of first appearance is
    /// kept. Empty entries are ignored.
    pub fn parse_list(input: &str) -> Result<Vec<Platform>, ValidationError> {
        let mut platforms = Vec::new();
        for entry in input.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let platform = entry.parse::<Platform>()?;
            if !platforms.contains(&platform) {
                platforms.push(platform);
            }
        }
        Ok(platforms)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "facebook" => Ok(Self::Facebook),
            "instagram" => Ok(Self::Instagram),
            "linkedin" => Ok(Self::Linkedin),
            "twitter" => Ok(Self::Twitter),
            "tiktok" => Ok(Self::Tiktok),
            other => Err(ValidationError::UnknownPlatform(other.to_string())),
        }
    }
}

/// Lifecycle status of a post.
///
/// Once a publish has been attempted, the status is always derived from the
/// per-platform results via [`PostStatus::from_results`]; it is never set
/// independently of that derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
    Partial,
    Failed,
}

impl PostStatus {
    /// Derive the aggregate status from one publish attempt's results.
    ///
    /// All results success means `Published`, a mix of success and failure
    /// means `Partial`, and all failure (or an empty set) means `Failed`.
    /// Order of the results does not matter.
    pub fn from_results(results: &[PlatformResult]) -> Self {
        if results.is_empty() {
            Self::Failed
        } else if results.iter().all(|r| r.success) {
            Self::Published
        } else if results.iter().any(|r| r.success) {
            Self::Partial
        } else {
            Self::Failed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A post as the backend knows it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    pub status: PostStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Input for composing a post, accepted by both orchestrator operations
/// and forwarded verbatim to the backend's create call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewPost {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    pub platforms: Vec<Platform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl NewPost {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_platforms(mut self, platforms: Vec<Platform>) -> Self {
        self.platforms = platforms;
        self
    }

    pub fn scheduled(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(at);
        self
    }
}

/// Outcome of one publish attempt on one platform.
///
/// Immutable once produced; a set of these belongs to exactly one attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformResult {
    pub platform: Platform,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlatformResult {
    pub fn success(platform: Platform) -> Self {
        Self {
            platform,
            success: true,
            error: None,
        }
    }

    pub fn failure(platform: Platform, error: impl Into<String>) -> Self {
        Self {
            platform,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// A linked platform account, created by the backend when authorization
/// completes and removed on disconnect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialAccount {
    pub id: String,
    pub platform: Platform,
    pub account_name: String,
    #[serde(default)]
    pub connected_at: Option<DateTime<Utc>>,
}

/// Which platforms have application-level API credentials configured
pub type CredentialStatusMap = HashMap<Platform, bool>;
