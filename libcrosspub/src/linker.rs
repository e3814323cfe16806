//! Account linking workflow
//!
//! [`AccountLinker`] drives the connect-account handshake: request an
//! authorization URL, open it through the host environment, then poll the
//! backend's account list until the newly authorized account shows up or a
//! deadline passes. Polling runs in a spawned task; the caller keeps a
//! [`ConnectHandle`] to await or cancel it.
//!
//! The linker also owns the non-polling account operations: disconnecting an
//! account and submitting application credentials. Like the publisher, it
//! never mutates caller-owned collections; it returns derived values.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::credentials::CredentialFields;
use crate::error::{Result, ValidationError};
use crate::events::{Event, EventBus};
use crate::gateway::BackendGateway;
use crate::types::{CredentialStatusMap, Platform, SocialAccount};

/// How often an attempt re-fetches the account list
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Wall-clock budget for one connect attempt, measured from attempt start
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(120);

/// Phase of the connect workflow for one platform
///
/// `Linked`, `TimedOut` and `Failed` are terminal for an attempt; a later
/// `connect` on the same platform starts over from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    Idle,
    Initiating,
    AwaitingAuthorization,
    Linked,
    TimedOut,
    Failed,
}

impl LinkState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkState::Idle => "idle",
            LinkState::Initiating => "initiating",
            LinkState::AwaitingAuthorization => "awaiting_authorization",
            LinkState::Linked => "linked",
            LinkState::TimedOut => "timed_out",
            LinkState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a finished connect attempt resolved
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectOutcome {
    /// The newly authorized account appeared in a poll.
    ///
    /// Carries the account itself plus the full account list as fetched, so
    /// the caller can replace its known set wholesale.
    Linked {
        account: SocialAccount,
        accounts: Vec<SocialAccount>,
    },
    /// The deadline passed with no new account. Not an error; the shell
    /// treats it as "still not connected".
    TimedOut,
    /// The attempt was cancelled before resolving
    Cancelled,
}

/// Where authorization URLs get opened
pub trait AuthorizationHost: Send + Sync {
    /// Open `url` in a surface the user can authorize from, without
    /// blocking the caller
    fn open(&self, url: &str) -> io::Result<()>;
}

/// Opens authorization URLs in the system browser
pub struct BrowserHost;

impl AuthorizationHost for BrowserHost {
    fn open(&self, url: &str) -> io::Result<()> {
        // detached: must not stall the connect call on a slow opener
        open::that_detached(url)
    }
}

// Recording host is available for all builds (not just tests) to support
// integration tests and scripted shells
/// Host that records opened URLs instead of launching anything
#[derive(Default)]
pub struct RecordingHost {
    fail: bool,
    urls: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host whose `open` always fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            urls: Mutex::new(Vec::new()),
        }
    }

    /// URLs handed to `open`, in call order
    pub fn opened_urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl AuthorizationHost for RecordingHost {
    fn open(&self, url: &str) -> io::Result<()> {
        self.urls.lock().unwrap().push(url.to_string());
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no browser available"));
        }
        Ok(())
    }
}

/// The caller's grip on an in-flight connect attempt
#[derive(Debug)]
pub struct ConnectHandle {
    platform: Platform,
    auth_url: String,
    cancel: CancellationToken,
    task: JoinHandle<ConnectOutcome>,
}

impl ConnectHandle {
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The authorization URL the attempt opened, for display
    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    /// Request cancellation.
    ///
    /// Stops the polling task deterministically; the handle then resolves
    /// with [`ConnectOutcome::Cancelled`] and the platform's state returns
    /// to [`LinkState::Idle`]. Safe to call more than once.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Clone of the attempt's cancellation token, for wiring into shutdown
    /// handling while [`wait`](Self::wait) owns the handle
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the attempt has reached a terminal outcome
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Await the attempt's outcome
    pub async fn wait(self) -> ConnectOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(platform = %self.platform, error = %err, "Connect task aborted");
                ConnectOutcome::Cancelled
            }
        }
    }
}

/// Drives account linking, disconnection and credential submission
pub struct AccountLinker {
    gateway: Arc<dyn BackendGateway>,
    host: Arc<dyn AuthorizationHost>,
    event_bus: EventBus,
    states: Arc<RwLock<HashMap<Platform, LinkState>>>,
}

impl AccountLinker {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        host: Arc<dyn AuthorizationHost>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            gateway,
            host,
            event_bus,
            states: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Current link state for a platform
    pub fn state(&self, platform: Platform) -> LinkState {
        let states = self.states.read().unwrap();
        states.get(&platform).copied().unwrap_or(LinkState::Idle)
    }

    /// Whether a connect attempt is currently running for a platform
    pub fn is_active(&self, platform: Platform) -> bool {
        matches!(
            self.state(platform),
            LinkState::Initiating | LinkState::AwaitingAuthorization
        )
    }

    /// Start a connect attempt for `platform`.
    ///
    /// Requests an authorization URL, opens it through the host, and spawns
    /// the polling task. `known_accounts` is the caller's current account
    /// set; the attempt resolves when a `platform` account with an id not in
    /// that set shows up. Polls run every 2 seconds until a match, the
    /// 120-second deadline, or cancellation.
    ///
    /// A host failure to open the URL is logged and does not abort the
    /// attempt; the user can still complete authorization out of band.
    ///
    /// # Errors
    ///
    /// `ValidationError::ConnectInProgress` if an attempt for `platform` is
    /// already running. `GatewayError` if the backend refuses to start the
    /// handshake; the platform then lands in [`LinkState::Failed`] and no
    /// polling starts.
    pub async fn connect(
        &self,
        platform: Platform,
        known_accounts: &[SocialAccount],
    ) -> Result<ConnectHandle> {
        {
            let mut states = self.states.write().unwrap();
            let current = states.get(&platform).copied().unwrap_or(LinkState::Idle);
            if matches!(
                current,
                LinkState::Initiating | LinkState::AwaitingAuthorization
            ) {
                return Err(ValidationError::ConnectInProgress(platform).into());
            }
            states.insert(platform, LinkState::Initiating);
        }
        self.event_bus.emit(Event::LinkStateChanged {
            platform,
            state: LinkState::Initiating,
        });
        tracing::debug!(%platform, "Starting connect attempt");

        let auth_url = match self.gateway.begin_connect(platform).await {
            Ok(url) => url,
            Err(err) => {
                self.set_state(platform, LinkState::Failed);
                return Err(err);
            }
        };

        if let Err(err) = self.host.open(&auth_url) {
            tracing::warn!(
                %platform,
                error = %err,
                url = %auth_url,
                "Could not open authorization URL; open it manually"
            );
        }

        self.set_state(platform, LinkState::AwaitingAuthorization);

        let known_ids: HashSet<String> =
            known_accounts.iter().map(|a| a.id.clone()).collect();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(poll_until_linked(
            self.gateway.clone(),
            self.event_bus.clone(),
            self.states.clone(),
            platform,
            known_ids,
            cancel.clone(),
        ));

        Ok(ConnectHandle {
            platform,
            auth_url,
            cancel,
            task,
        })
    }

    /// Remove a linked account.
    ///
    /// On success returns `known_accounts` minus the removed account. On
    /// failure the error is surfaced and the caller's set is untouched
    /// (it was never mutated).
    pub async fn disconnect(
        &self,
        account_id: &str,
        known_accounts: &[SocialAccount],
    ) -> Result<Vec<SocialAccount>> {
        self.gateway.disconnect_account(account_id).await?;
        tracing::info!(account_id, "Account disconnected");
        self.event_bus.emit(Event::AccountDisconnected {
            account_id: account_id.to_string(),
        });
        Ok(known_accounts
            .iter()
            .filter(|a| a.id != account_id)
            .cloned()
            .collect())
    }

    /// Submit application credentials for a platform.
    ///
    /// Only after the backend confirms does the returned status map mark
    /// the platform configured; on failure `known` is returned unchanged in
    /// meaning (the caller's map was never touched).
    pub async fn save_credentials(
        &self,
        platform: Platform,
        fields: &CredentialFields,
        known: &CredentialStatusMap,
    ) -> Result<CredentialStatusMap> {
        self.gateway.save_credentials(platform, fields).await?;
        tracing::info!(%platform, "Credentials saved");
        self.event_bus.emit(Event::CredentialsSaved { platform });

        let mut updated = known.clone();
        updated.insert(platform, true);
        Ok(updated)
    }

    /// Fetch the currently linked accounts
    pub async fn accounts(&self) -> Result<Vec<SocialAccount>> {
        self.gateway.list_accounts().await
    }

    /// Which platforms have configured credentials
    pub async fn credential_status(&self) -> Result<CredentialStatusMap> {
        self.gateway.credential_status().await
    }

    fn set_state(&self, platform: Platform, state: LinkState) {
        set_state(&self.states, &self.event_bus, platform, state);
    }
}

fn set_state(
    states: &RwLock<HashMap<Platform, LinkState>>,
    event_bus: &EventBus,
    platform: Platform,
    state: LinkState,
) {
    {
        let mut states = states.write().unwrap();
        states.insert(platform, state);
    }
    tracing::debug!(%platform, %state, "Link state changed");
    event_bus.emit(Event::LinkStateChanged { platform, state });
}

/// The polling half of a connect attempt.
///
/// Runs on its own task so the caller can do other work while waiting. At
/// most one list fetch is in flight at any time; a missed tick is delayed
/// rather than bursted, so polls never overlap.
async fn poll_until_linked(
    gateway: Arc<dyn BackendGateway>,
    event_bus: EventBus,
    states: Arc<RwLock<HashMap<Platform, LinkState>>>,
    platform: Platform,
    known_ids: HashSet<String>,
    cancel: CancellationToken,
) -> ConnectOutcome {
    let started = Instant::now();
    let deadline = started + CONNECT_TIMEOUT;
    let mut ticker = time::interval_at(started + POLL_INTERVAL, POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                set_state(&states, &event_bus, platform, LinkState::Idle);
                tracing::debug!(%platform, "Connect attempt cancelled");
                return ConnectOutcome::Cancelled;
            }
            _ = ticker.tick() => {
                // a tick landing exactly on the deadline still polls;
                // one delivered late does not
                if Instant::now() > deadline {
                    set_state(&states, &event_bus, platform, LinkState::TimedOut);
                    tracing::info!(%platform, "Connect attempt timed out");
                    return ConnectOutcome::TimedOut;
                }
            }
            _ = time::sleep_until(deadline) => {
                set_state(&states, &event_bus, platform, LinkState::TimedOut);
                tracing::info!(%platform, "Connect attempt timed out");
                return ConnectOutcome::TimedOut;
            }
        }

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                set_state(&states, &event_bus, platform, LinkState::Idle);
                tracing::debug!(%platform, "Connect attempt cancelled mid-poll");
                return ConnectOutcome::Cancelled;
            }
            result = gateway.list_accounts() => result,
        };

        let accounts = match fetched {
            Ok(accounts) => accounts,
            Err(err) => {
                // transient; keep polling until the deadline
                tracing::warn!(%platform, error = %err, "Account poll failed");
                continue;
            }
        };

        let matched = accounts
            .iter()
            .find(|a| a.platform == platform && !known_ids.contains(&a.id))
            .cloned();
        if let Some(account) = matched {
            set_state(&states, &event_bus, platform, LinkState::Linked);
            tracing::info!(
                %platform,
                account_name = %account.account_name,
                "Account linked"
            );
            event_bus.emit(Event::AccountLinked {
                platform,
                account_id: account.id.clone(),
                account_name: account.account_name.clone(),
            });
            return ConnectOutcome::Linked { account, accounts };
        }
    }
}
