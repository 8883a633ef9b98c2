//! The bearer token guarding the [HTTP API][crate::api].
//!
//! On startup the token is taken from the token file, then from
//! [`Config::token`][crate::config::Config::token], and otherwise generated and saved to the
//! token file. It can be rotated at runtime through the API, which saves it again.
use crate::config::Config;
use crate::error::Error;
use base64::engine::general_purpose;
use base64::{alphabet, engine, Engine};
use lazy_static::lazy_static;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

pub type SharedToken = Arc<TokenStore>;

lazy_static! {
    static ref BASE64_ENGINE: engine::GeneralPurpose =
        engine::GeneralPurpose::new(&alphabet::URL_SAFE, general_purpose::NO_PAD);
}

/// Where the active token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    File,
    Config,
    /// Freshly generated. `saved` is false when it couldn't be written to the token file.
    Generated { saved: bool },
}

#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TokenStore {
    path: PathBuf,
    current: RwLock<String>,
}

impl TokenStore {
    /// Resolve the startup token for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] if the token file exists but can't be read. Failing to save a
    /// generated token is not an error, see [`TokenSource::Generated`].
    pub async fn resolve(config: &Config) -> Result<(Self, TokenSource), Error> {
        let path = config.token_file_path.clone();
        if let Some(token) = Self::load(&path).await? {
            return Ok((Self::new(path, token), TokenSource::File));
        }
        if let Some(token) = config.token.as_ref().filter(|token| !token.is_empty()) {
            return Ok((Self::new(path, token.clone()), TokenSource::Config));
        }

        let token = generate();
        let saved = match save(&path, &token).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("failed to save generated token to {}: {err}", path.display());
                false
            }
        };
        Ok((Self::new(path, token), TokenSource::Generated { saved }))
    }

    pub fn new(path: impl Into<PathBuf>, token: String) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(token),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn current(&self) -> String {
        self.current.read().await.clone()
    }

    /// Whether `presented` is the active token. The comparison takes the same time for every
    /// token of the right length.
    pub async fn verify(&self, presented: &str) -> bool {
        constant_time_eq(self.current.read().await.as_bytes(), presented.as_bytes())
    }

    /// Save `token` to the token file and make it the active token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyToken`] for an empty token, or [`Error::IO`] if the token file
    /// can't be written. The active token only changes once the file has been written.
    pub async fn replace(&self, token: String) -> Result<(), Error> {
        if token.is_empty() {
            return Err(Error::EmptyToken);
        }
        let mut current = self.current.write().await;
        save(&self.path, &token).await?;
        *current = token;
        tracing::info!("authentication token updated");
        Ok(())
    }

    async fn load(path: &Path) -> Result<Option<String>, Error> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::IO(err)),
        }
    }
}

/// 32 random bytes from the thread-local CSPRNG, URL-safe base64 encoded.
fn generate() -> String {
    let raw: [u8; 32] = rand::random();
    BASE64_ENGINE.encode(raw)
}

async fn save(path: &Path, token: &str) -> Result<(), Error> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await?;
    }
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);
    let mut file = options.open(path).await?;
    file.write_all(token.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn config_in(dir: &Path) -> Config {
        Config {
            token_file_path: dir.join("secrets").join("token"),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn prefers_the_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            token: Some("from-config".to_string()),
            ..config_in(dir.path())
        };
        fs::create_dir_all(config.token_file_path.parent().unwrap()).unwrap();
        fs::write(&config.token_file_path, "  from-file\n").unwrap();

        let (store, source) = TokenStore::resolve(&config).await.unwrap();

        assert_eq!(source, TokenSource::File);
        assert_eq!(store.current().await, "from-file");
    }

    #[tokio::test]
    async fn falls_back_to_config_token() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            token: Some("from-config".to_string()),
            ..config_in(dir.path())
        };

        let (store, source) = TokenStore::resolve(&config).await.unwrap();

        assert_eq!(source, TokenSource::Config);
        assert!(store.verify("from-config").await);
        assert!(!config.token_file_path.exists());
    }

    #[tokio::test]
    async fn generates_and_saves_a_token() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let (store, source) = TokenStore::resolve(&config).await.unwrap();

        assert_eq!(source, TokenSource::Generated { saved: true });
        let token = store.current().await;
        assert_eq!(token.len(), 43);
        assert_eq!(fs::read_to_string(&config.token_file_path).unwrap(), token);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&config.token_file_path)
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[tokio::test]
    async fn generated_tokens_differ() {
        assert_ne!(generate(), generate());
        assert_eq!(BASE64_ENGINE.decode(generate()).unwrap().len(), 32);
    }

    #[tokio::test]
    async fn replace_saves_and_swaps() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token"), "old".to_string());

        store.replace("new".to_string()).await.unwrap();

        assert!(store.verify("new").await);
        assert!(!store.verify("old").await);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "new");
    }

    #[tokio::test]
    async fn replace_rejects_empty_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token"), "old".to_string());

        let err = store.replace(String::new()).await.unwrap_err();

        assert!(matches!(err, Error::EmptyToken));
        assert!(store.verify("old").await);
        assert!(!store.path().exists());
    }

    #[test]
    fn compares_tokens() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"secret2"));
    }
}
