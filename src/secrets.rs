// Credential loading from a secret store.
//
// Secrets are looked up by (service, account). The default backend is the
// OS secret store via the keyring crate; environment variables (populated
// from .env by dotenvy at startup) are the fallback. Nothing is hardcoded.

use std::env;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::SecretBackend;

/// Service name under which all Twitter secrets are stored.
pub const TWITTER_SERVICE: &str = "twitter";

/// Account labels for the five Twitter secrets, in load order.
pub const TWITTER_ACCOUNTS: [&str; 5] = [
    "api_key",
    "api_key_secret",
    "bearer_Token",
    "token",
    "token_secret",
];

/// Read-only secret lookup.
pub trait SecretStore {
    /// Fetch a secret. `Ok(None)` means the secret is not there.
    fn get_secret(&self, service: &str, account: &str) -> Result<Option<String>>;
}

/// Secret store backed by the platform keychain (macOS Keychain, Windows
/// Credential Manager, Linux kernel keyring).
pub struct KeyringSecretStore;

impl SecretStore for KeyringSecretStore {
    fn get_secret(&self, service: &str, account: &str) -> Result<Option<String>> {
        let entry = keyring::Entry::new(service, account)
            .with_context(|| format!("Invalid keyring entry {service}/{account}"))?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read {service}/{account} from the keyring"))
            }
        }
    }
}

/// Open the configured secret store.
pub fn open_store(backend: SecretBackend) -> Box<dyn SecretStore> {
    match backend {
        SecretBackend::Keyring => Box::new(KeyringSecretStore),
        SecretBackend::Env => Box::new(EnvSecretStore),
    }
}

/// Secret store backed by environment variables.
///
/// `(service, account)` maps to `SERVICE_ACCOUNT` in upper case, so
/// `("twitter", "bearer_Token")` is read from `TWITTER_BEARER_TOKEN`.
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn variable_name(service: &str, account: &str) -> String {
        format!("{service}_{account}").to_uppercase()
    }
}

impl SecretStore for EnvSecretStore {
    fn get_secret(&self, service: &str, account: &str) -> Result<Option<String>> {
        let name = Self::variable_name(service, account);
        match env::var(&name) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => {
                anyhow::bail!("{name} is set but is not valid UTF-8")
            }
        }
    }
}

/// The five Twitter secrets needed to build an authenticated client.
///
/// Only the bearer token is used for the app-only search context; the
/// user-context keys are loaded and checked so a half-configured store is
/// caught at startup.
#[derive(Clone)]
pub struct TwitterCredentials {
    /// User-context keys: presence-checked at startup, not sent anywhere yet.
    pub api_key: String,
    pub api_key_secret: String,
    pub bearer_token: String,
    /// Presence-checked only, like `api_key`.
    pub access_token: String,
    pub access_token_secret: String,
}

impl std::fmt::Debug for TwitterCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterCredentials").finish_non_exhaustive()
    }
}

impl TwitterCredentials {
    /// Load all five secrets, failing with the full list of missing ones.
    ///
    /// Empty values count as missing.
    pub fn load(store: &dyn SecretStore) -> Result<Self> {
        let values = TWITTER_ACCOUNTS
            .iter()
            .map(|account| {
                store
                    .get_secret(TWITTER_SERVICE, account)
                    .map(|v| v.filter(|s| !s.trim().is_empty()))
            })
            .collect::<Result<Vec<_>>>()?;

        let missing: Vec<&str> = TWITTER_ACCOUNTS
            .iter()
            .zip(&values)
            .filter(|(_, value)| value.is_none())
            .map(|(account, _)| *account)
            .collect();

        if !missing.is_empty() {
            anyhow::bail!(
                "Missing {} secret(s) for service \"{TWITTER_SERVICE}\": {}\n\
                 Add them to the OS keyring, or set GEOTOX_SECRET_STORE=env and \
                 provide the env vars {}.",
                missing.len(),
                missing.join(", "),
                missing
                    .iter()
                    .map(|a| EnvSecretStore::variable_name(TWITTER_SERVICE, a))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        let [api_key, api_key_secret, bearer_token, access_token, access_token_secret]: [String; 5] =
            values
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .try_into()
                .map_err(|_| anyhow::anyhow!("Secret store returned an unexpected number of values"))?;

        debug!("Loaded Twitter credentials");

        Ok(Self {
            api_key,
            api_key_secret,
            bearer_token,
            access_token,
            access_token_secret,
        })
    }
}

/// Presence of each Twitter secret, for the `credentials` command.
pub fn secret_presence(store: &dyn SecretStore) -> Vec<(&'static str, bool)> {
    TWITTER_ACCOUNTS
        .iter()
        .map(|account| {
            let present = matches!(
                store.get_secret(TWITTER_SERVICE, account),
                Ok(Some(v)) if !v.trim().is_empty()
            );
            (*account, present)
        })
        .collect()
}
