//! Per-platform API credential schemas and submission values
//!
//! The backend owns credential storage; this module only describes what each
//! platform's credential form looks like and carries the entered values to
//! the gateway. Values are write-only from the core's perspective: they are
//! held in [`secrecy::SecretString`] (redacted `Debug`, zeroed on drop) and
//! leave the wrapper exactly once, at the serialization boundary.

use std::collections::HashMap;
use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ValidationError;
use crate::types::Platform;

/// One field of a platform's credential form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialField {
    /// Wire key the backend expects
    pub key: &'static str,
    /// Label shown when prompting
    pub label: &'static str,
    /// Secret fields are prompted without echo and never printed
    pub secret: bool,
    pub required: bool,
}

/// The credential fields a platform requires, keyed by platform.
///
/// Transcribed from the provider developer consoles the backend integrates
/// with; the shell renders prompts from this and the core validates presence
/// against it, so there is no per-platform branching anywhere else.
pub fn schema(platform: Platform) -> &'static [CredentialField] {
    match platform {
        Platform::Facebook => &[
            CredentialField {
                key: "app_id",
                label: "App ID",
                secret: false,
                required: true,
            },
            CredentialField {
                key: "app_secret",
                label: "App Secret",
                secret: true,
                required: true,
            },
        ],
        Platform::Instagram => &[
            CredentialField {
                key: "client_id",
                label: "Client ID",
                secret: false,
                required: true,
            },
            CredentialField {
                key: "client_secret",
                label: "Client Secret",
                secret: true,
                required: true,
            },
        ],
        Platform::Linkedin => &[
            CredentialField {
                key: "client_id",
                label: "Client ID",
                secret: false,
                required: true,
            },
            CredentialField {
                key: "client_secret",
                label: "Client Secret",
                secret: true,
                required: true,
            },
        ],
        Platform::Twitter => &[
            CredentialField {
                key: "client_id",
                label: "Client ID (API Key)",
                secret: false,
                required: true,
            },
            CredentialField {
                key: "client_secret",
                label: "Client Secret (API Secret)",
                secret: true,
                required: true,
            },
            CredentialField {
                key: "access_token",
                label: "Access Token",
                secret: true,
                required: false,
            },
        ],
        Platform::Tiktok => &[
            CredentialField {
                key: "client_id",
                label: "Client Key",
                secret: false,
                required: true,
            },
            CredentialField {
                key: "client_secret",
                label: "Client Secret",
                secret: true,
                required: true,
            },
        ],
    }
}

/// Entered credential values, ready for submission
#[derive(Default)]
pub struct CredentialFields {
    values: HashMap<String, SecretString>,
}

impl CredentialFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a field value, replacing any previous value for the key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), SecretString::from(value.into()));
    }

    /// Builder-style variant of [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&SecretString> {
        self.values.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Serialize the values for submission.
    ///
    /// The only place field values leave the redacted wrapper; called by the
    /// gateway when building the request body.
    pub fn expose_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .values
            .iter()
            .map(|(key, value)| {
                (
                    key.clone(),
                    serde_json::Value::String(value.expose_secret().to_string()),
                )
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

impl fmt::Debug for CredentialFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("CredentialFields")
            .field("keys", &keys)
            .field("values", &"[REDACTED]")
            .finish()
    }
}

/// Check that every required field for `platform` is present and non-blank.
///
/// Presence checking is the shell's concern; it calls this before submitting
/// so the user gets a precise message instead of a backend rejection.
pub fn validate_required(
    platform: Platform,
    fields: &CredentialFields,
) -> Result<(), ValidationError> {
    for field in schema(platform) {
        if !field.required {
            continue;
        }
        let present = fields
            .get(field.key)
            .map(|value| !value.expose_secret().trim().is_empty())
            .unwrap_or(false);
        if !present {
            return Err(ValidationError::MissingField {
                platform,
                field: field.key.to_string(),
            });
        }
    }
    Ok(())
}
