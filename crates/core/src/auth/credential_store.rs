//! Process-wide owner of the session credential
//!
//! Readers see a [`CredentialSnapshot`]: the session credential and identity
//! are always published together, so nobody observes an identity without a
//! credential. Every write goes through one async mutex.

use std::sync::Arc;

use inkstat_common::lifecycle::{EventBus, Observable};
use inkstat_domain::{
    CredentialEvent, CredentialSnapshot, Identity, InkstatError, Result, SessionToken,
    StoredCredential,
};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::ports::{CookiePurger, CredentialPersistence};

pub struct CredentialStore {
    persistence: Arc<dyn CredentialPersistence>,
    cookies: Arc<dyn CookiePurger>,
    cookie_domain: String,
    snapshot: Observable<CredentialSnapshot>,
    events: EventBus<CredentialEvent>,
    writer: Mutex<()>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("cookie_domain", &self.cookie_domain)
            .field("signed_in", &self.snapshot.get().is_signed_in())
            .finish_non_exhaustive()
    }
}

impl CredentialStore {
    pub fn new(
        persistence: Arc<dyn CredentialPersistence>,
        cookies: Arc<dyn CookiePurger>,
        cookie_domain: impl Into<String>,
        events: EventBus<CredentialEvent>,
    ) -> Self {
        Self {
            persistence,
            cookies,
            cookie_domain: cookie_domain.into(),
            snapshot: Observable::default(),
            events,
            writer: Mutex::new(()),
        }
    }

    /// Load the persisted credential into memory.
    ///
    /// # Errors
    /// Propagates persistence failures; the in-memory state stays empty.
    pub async fn init(&self) -> Result<CredentialSnapshot> {
        let _guard = self.writer.lock().await;
        let loaded = self.persistence.load().await?.map(CredentialSnapshot::from).unwrap_or_default();
        debug!(signed_in = loaded.is_signed_in(), "credential store initialized");
        self.snapshot.set(loaded.clone());
        Ok(loaded)
    }

    /// Store a new session credential with its identity.
    ///
    /// Replacing an existing credential is a normal re-authentication. The
    /// in-memory snapshot is published even if persisting fails.
    ///
    /// # Errors
    /// Returns [`InkstatError::InvalidInput`] for an empty token, or the
    /// persistence error.
    pub async fn set(&self, token: SessionToken, identity: Option<Identity>) -> Result<()> {
        self.set_if(token, identity, || true).await.map(|_| ())
    }

    /// Like [`set`](Self::set), but only writes when `proceed` still returns
    /// `true` once the writer lock is held. Returns whether anything was
    /// written.
    ///
    /// # Errors
    /// See [`set`](Self::set).
    pub async fn set_if<F>(
        &self,
        token: SessionToken,
        identity: Option<Identity>,
        proceed: F,
    ) -> Result<bool>
    where
        F: FnOnce() -> bool,
    {
        if token.is_empty() {
            return Err(InkstatError::InvalidInput("session token is empty".into()));
        }

        let _guard = self.writer.lock().await;
        if !proceed() {
            debug!("credential write skipped");
            return Ok(false);
        }
        let stored = StoredCredential::new(token, identity);
        self.snapshot.set(CredentialSnapshot::from(stored.clone()));
        self.events.publish(CredentialEvent::SignedIn);
        info!("session credential stored");

        self.persistence.save(&stored).await.map(|()| true)
    }

    pub fn get(&self) -> Option<SessionToken> {
        self.snapshot.get().session_token
    }

    pub fn identity(&self) -> Option<Identity> {
        self.snapshot.get().identity
    }

    pub fn snapshot(&self) -> CredentialSnapshot {
        self.snapshot.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<CredentialSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn events(&self) -> &EventBus<CredentialEvent> {
        &self.events
    }

    /// Replace the identity of the current credential.
    ///
    /// # Errors
    /// Returns [`InkstatError::NotFound`] when no credential is stored.
    pub async fn set_identity(&self, identity: Identity) -> Result<()> {
        let _guard = self.writer.lock().await;
        let Some(token) = self.snapshot.get().session_token else {
            return Err(InkstatError::NotFound("no session credential".into()));
        };

        let stored = StoredCredential::new(token, Some(identity));
        self.snapshot.set(CredentialSnapshot::from(stored.clone()));
        self.persistence.save(&stored).await
    }

    /// Set or clear the session credential. `None` is a logout.
    ///
    /// A new token keeps the current identity.
    ///
    /// # Errors
    /// See [`set`](Self::set) and [`clear`](Self::clear).
    pub async fn update(&self, token: Option<SessionToken>) -> Result<()> {
        match token {
            Some(token) => {
                let identity = self.identity();
                self.set(token, identity).await
            }
            None => self.clear().await.map(|_| ()),
        }
    }

    /// Log out: drop credential and identity together, delete the persisted
    /// record, purge provider cookies and announce the logout.
    ///
    /// Returns whether anything was signed in. The in-memory state is cleared
    /// even when deleting the persisted record fails.
    ///
    /// # Errors
    /// Returns the persistence error after the rest of the logout completed.
    pub async fn clear(&self) -> Result<bool> {
        let _guard = self.writer.lock().await;
        let previous = self.snapshot.get();
        self.snapshot.set(CredentialSnapshot::default());

        let deleted = self.persistence.delete().await;
        if let Err(err) = &deleted {
            warn!(error = %err, "failed to delete persisted credential");
        }

        let purged = self.cookies.purge_domain(&self.cookie_domain);
        debug!(domain = %self.cookie_domain, purged, "provider cookies purged");

        let had_credential = !previous.is_empty();
        if had_credential {
            info!("logged out");
            self.events.publish(CredentialEvent::LoggedOut);
        }

        deleted.map(|()| had_credential)
    }
}
