//! Service layer for Crosspub
//!
//! A single entry point coordinating the two workflow drivers so every
//! interface (the CLIs, tests, custom shells) wires them the same way:
//!
//! - [`Publisher`]: draft and publish-now orchestration
//! - [`AccountLinker`]: connect, disconnect, credential submission
//! - [`EventBus`]: progress event distribution shared by both
//!
//! # Example
//!
//! ```no_run
//! use libcrosspub::config::Config;
//! use libcrosspub::service::CrosspubService;
//! use libcrosspub::types::{NewPost, Platform};
//!
//! # async fn example() -> libcrosspub::error::Result<()> {
//! let config = Config::load()?;
//! let service = CrosspubService::from_config(&config)?;
//!
//! let input = NewPost::new("Hello world").with_platforms(vec![Platform::Facebook]);
//! let response = service.publisher().publish_now(&input).await?;
//! println!("Published with status {}", response.post.status);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::events::{EventBus, EventReceiver};
use crate::gateway::{BackendGateway, HttpGateway};
use crate::linker::{AccountLinker, AuthorizationHost, BrowserHost};
use crate::publisher::Publisher;

/// Main service facade wiring gateway, host, event bus and drivers together
pub struct CrosspubService {
    gateway: Arc<dyn BackendGateway>,
    publisher: Publisher,
    linker: AccountLinker,
    event_bus: EventBus,
}

impl CrosspubService {
    /// Build a service over any gateway/host pair.
    ///
    /// Both drivers share the gateway and one event bus; tests pass a
    /// `MockGateway` and `RecordingHost` here.
    pub fn new(gateway: Arc<dyn BackendGateway>, host: Arc<dyn AuthorizationHost>) -> Self {
        let event_bus = EventBus::new(100);
        let publisher = Publisher::new(Arc::clone(&gateway), event_bus.clone());
        let linker = AccountLinker::new(Arc::clone(&gateway), host, event_bus.clone());
        Self {
            gateway,
            publisher,
            linker,
            event_bus,
        }
    }

    /// Build a service talking to the backend named by `config`, opening
    /// authorization URLs in the system browser.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self> {
        let gateway = Arc::new(HttpGateway::new(&config.api.base_url)?);
        Ok(Self::new(gateway, Arc::new(BrowserHost)))
    }

    /// Direct access to the gateway, for operations outside the drivers
    pub fn gateway(&self) -> &Arc<dyn BackendGateway> {
        &self.gateway
    }

    /// Access the publish orchestrator
    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// Access the account linker
    pub fn linker(&self) -> &AccountLinker {
        &self.linker
    }

    /// Subscribe to workflow events
    ///
    /// The receiver sees events from both drivers. Multiple subscribers are
    /// supported.
    pub fn subscribe(&self) -> EventReceiver {
        self.event_bus.subscribe()
    }
}
