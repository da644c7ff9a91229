//! Platform keychain persistence for the session credential
//!
//! The credential is stored as one JSON document under a single keychain
//! entry (`service`, `account`). All keychain calls block, so they run on the
//! blocking pool.
//!
//! ```no_run
//! use inkstat_infra::storage::KeychainCredentialStore;
//!
//! let store = KeychainCredentialStore::new("dev.inkstat.credentials", "session")?;
//! # Ok::<(), inkstat_domain::InkstatError>(())
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use inkstat_core::CredentialPersistence;
use inkstat_domain::{InkstatError, Result, StorageConfig, StoredCredential};
use keyring::Entry;
use thiserror::Error;
use tracing::debug;

use crate::errors::InfraError;

/// Failures reading or writing the keychain record.
#[derive(Debug, Error)]
pub enum KeychainError {
    #[error("keychain access failed: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("credential record is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl From<KeychainError> for InfraError {
    fn from(value: KeychainError) -> Self {
        match value {
            KeychainError::Keyring(err) => InfraError::from(err),
            KeychainError::Corrupt(err) => InfraError::from(err),
        }
    }
}

impl From<KeychainError> for InkstatError {
    fn from(value: KeychainError) -> Self {
        InfraError::from(value).into()
    }
}

/// [`CredentialPersistence`] backed by the platform keychain.
pub struct KeychainCredentialStore {
    service: String,
    account: String,
    entry: Arc<Entry>,
}

impl std::fmt::Debug for KeychainCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeychainCredentialStore")
            .field("service", &self.service)
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl KeychainCredentialStore {
    /// # Errors
    /// Returns a storage error if the keychain rejects the entry attributes.
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Result<Self> {
        let service = service.into();
        let account = account.into();
        let entry = Entry::new(&service, &account).map_err(InfraError::from)?;
        Ok(Self { service, account, entry: Arc::new(entry) })
    }

    /// # Errors
    /// See [`KeychainCredentialStore::new`].
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        Self::new(config.keychain_service.clone(), config.keychain_account.clone())
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Entry) -> Result<T> + Send + 'static,
    {
        let entry = Arc::clone(&self.entry);
        tokio::task::spawn_blocking(move || op(&entry))
            .await
            .map_err(|err| InkstatError::Internal(format!("keychain task failed: {err}")))?
    }
}

fn read(entry: &Entry) -> std::result::Result<Option<StoredCredential>, KeychainError> {
    let raw = match entry.get_password() {
        Ok(raw) => raw,
        Err(keyring::Error::NoEntry) => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(serde_json::from_str(&raw)?))
}

#[async_trait]
impl CredentialPersistence for KeychainCredentialStore {
    async fn load(&self) -> Result<Option<StoredCredential>> {
        debug!(service = %self.service, account = %self.account, "loading credential from keychain");
        self.blocking(|entry| read(entry).map_err(InkstatError::from)).await
    }

    async fn save(&self, credential: &StoredCredential) -> Result<()> {
        let raw = serde_json::to_string(credential).map_err(KeychainError::from)?;
        debug!(service = %self.service, account = %self.account, "storing credential in keychain");
        self.blocking(move |entry| entry.set_password(&raw).map_err(|e| KeychainError::from(e).into()))
            .await
    }

    async fn delete(&self) -> Result<()> {
        debug!(service = %self.service, account = %self.account, "deleting credential from keychain");
        self.blocking(|entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(KeychainError::from(err).into()),
        })
        .await
    }
}
