//! Startup population of the process environment from an external secret
//! store.
//!
//! The crew libraries and the trace client read their credentials from
//! environment variables, so this runs once before any request is handled.
//! Values already present in the environment always win, which lets a
//! deployment inject overrides without touching the store.

use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Environment variable naming the secret store base URL.
pub const SECRETS_ENDPOINT_ENV: &str = "TECHRESEARCH_SECRETS_ENDPOINT";
/// Optional bearer token for the secret store.
pub const SECRETS_TOKEN_ENV: &str = "TECHRESEARCH_SECRETS_TOKEN";
/// Local JSON file override, used for development and tests.
pub const SECRETS_FILE_ENV: &str = "TECHRESEARCH_SECRETS_FILE";

/// Secrets the crew libraries require; absence is a fatal startup error.
const REQUIRED_SECRETS: &[&str] = &["OPENAI_API_KEY", "SERPER_API_KEY"];

/// Trace credentials; tracing is optional, so these may be absent.
const OPTIONAL_SECRETS: &[&str] = &[
    "TECHRESEARCH_TRACING_PUBLIC_KEY",
    "TECHRESEARCH_TRACING_SECRET_KEY",
];

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A read-only store of named secrets.
pub trait SecretStore {
    /// Fetch a named secret, returning `None` when the store has no entry.
    fn fetch(&self, name: &str) -> Result<Option<String>>;
}

/// Secret store reached over HTTP: `GET {endpoint}/{name}` returns the raw
/// secret value, 404 means the entry does not exist.
pub struct HttpSecretStore {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpSecretStore {
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        let client = Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
        })
    }
}

impl SecretStore for HttpSecretStore {
    fn fetch(&self, name: &str) -> Result<Option<String>> {
        let url = format!("{}/{}", self.endpoint, name);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let value = response.error_for_status()?.text()?;
        Ok(Some(value))
    }
}

/// Secret store backed by a local JSON document mapping names to values.
#[derive(Debug)]
pub struct FileSecretStore {
    entries: HashMap<String, String>,
}

impl FileSecretStore {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let entries: HashMap<String, String> =
            serde_json::from_str(&raw).map_err(|e| Error::SecretDocumentParse {
                message: format!("{}: {}", path.display(), e),
            })?;
        Ok(Self { entries })
    }
}

impl SecretStore for FileSecretStore {
    fn fetch(&self, name: &str) -> Result<Option<String>> {
        Ok(self.entries.get(name).cloned())
    }
}

/// Populate the environment with the predetermined secret names.
///
/// Returns the number of variables written. A required secret missing from
/// both the environment and the store is an error.
pub fn populate_env(store: &dyn SecretStore) -> Result<usize> {
    populate(store, REQUIRED_SECRETS, OPTIONAL_SECRETS)
}

fn populate(store: &dyn SecretStore, required: &[&str], optional: &[&str]) -> Result<usize> {
    let mut populated = 0;

    for name in required {
        if env::var_os(name).is_some() {
            continue;
        }
        match store.fetch(name)? {
            Some(value) => {
                env::set_var(name, value);
                populated += 1;
            }
            None => {
                return Err(Error::MissingSecret {
                    name: name.to_string(),
                })
            }
        }
    }

    for name in optional {
        if env::var_os(name).is_some() {
            continue;
        }
        if let Some(value) = store.fetch(name)? {
            env::set_var(name, value);
            populated += 1;
        }
    }

    info!(populated, "secret population complete");
    Ok(populated)
}

/// Populate the environment from whichever store the environment names.
///
/// `TECHRESEARCH_SECRETS_FILE` takes precedence over
/// `TECHRESEARCH_SECRETS_ENDPOINT`. With neither set this is a no-op: the
/// deployment is assumed to have injected the environment directly.
pub fn populate_env_from_default_store() -> Result<usize> {
    if let Some(path) = env::var_os(SECRETS_FILE_ENV) {
        let store = FileSecretStore::load(Path::new(&path))?;
        return populate_env(&store);
    }

    if let Ok(endpoint) = env::var(SECRETS_ENDPOINT_ENV) {
        if !endpoint.trim().is_empty() {
            let store = HttpSecretStore::new(endpoint.trim(), env::var(SECRETS_TOKEN_ENV).ok())?;
            return populate_env(&store);
        }
    }

    debug!("no secret store configured; assuming the environment is pre-populated");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct MapStore(HashMap<String, String>);

    impl MapStore {
        fn with(pairs: &[(&str, &str)]) -> Self {
            Self(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            )
        }
    }

    impl SecretStore for MapStore {
        fn fetch(&self, name: &str) -> Result<Option<String>> {
            Ok(self.0.get(name).cloned())
        }
    }

    // Each test uses its own variable names so parallel tests never race on
    // shared environment state.

    #[test]
    fn populates_missing_required_secret() {
        env::remove_var("TEST_POPULATE_REQUIRED_KEY");
        let store = MapStore::with(&[("TEST_POPULATE_REQUIRED_KEY", "sk-123")]);

        let populated = populate(&store, &["TEST_POPULATE_REQUIRED_KEY"], &[]).unwrap();

        assert_eq!(populated, 1);
        assert_eq!(env::var("TEST_POPULATE_REQUIRED_KEY").unwrap(), "sk-123");
        env::remove_var("TEST_POPULATE_REQUIRED_KEY");
    }

    #[test]
    fn existing_environment_wins_over_store() {
        env::set_var("TEST_POPULATE_EXISTING_KEY", "from-env");
        let store = MapStore::with(&[("TEST_POPULATE_EXISTING_KEY", "from-store")]);

        let populated = populate(&store, &["TEST_POPULATE_EXISTING_KEY"], &[]).unwrap();

        assert_eq!(populated, 0);
        assert_eq!(env::var("TEST_POPULATE_EXISTING_KEY").unwrap(), "from-env");
        env::remove_var("TEST_POPULATE_EXISTING_KEY");
    }

    #[test]
    fn missing_required_secret_is_an_error() {
        env::remove_var("TEST_POPULATE_ABSENT_KEY");
        let store = MapStore::with(&[]);

        let err = populate(&store, &["TEST_POPULATE_ABSENT_KEY"], &[]).unwrap_err();
        assert!(matches!(err, Error::MissingSecret { name } if name == "TEST_POPULATE_ABSENT_KEY"));
    }

    #[test]
    fn missing_optional_secret_is_skipped() {
        env::remove_var("TEST_POPULATE_OPTIONAL_KEY");
        let store = MapStore::with(&[]);

        let populated = populate(&store, &[], &["TEST_POPULATE_OPTIONAL_KEY"]).unwrap();

        assert_eq!(populated, 0);
        assert!(env::var_os("TEST_POPULATE_OPTIONAL_KEY").is_none());
    }

    #[test]
    fn file_store_reads_json_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"ALPHA": "one", "BETA": "two"}}"#).unwrap();

        let store = FileSecretStore::load(file.path()).unwrap();
        assert_eq!(store.fetch("ALPHA").unwrap(), Some("one".to_string()));
        assert_eq!(store.fetch("GAMMA").unwrap(), None);
    }

    #[test]
    fn file_store_rejects_malformed_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = FileSecretStore::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::SecretDocumentParse { .. }));
    }
}
