use crate::error::Error;
use crate::host_store::{DynHostStore, FileHostStore};
use crate::interface_store::{DynInterfaceStore, FileInterfaceStore};
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::fs::File;
use std::io::BufReader;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

pub type SharedConfig = Arc<Config>;

/// Process configuration, loaded from a JSON file. Every field is optional; missing fields take
/// the values of [`Config::default`].
#[serde_as]
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub api_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub api_timeout: Duration,
    /// The ISC-DHCP configuration file holding `host` blocks.
    pub dhcp_conf_path: PathBuf,
    /// The `isc-dhcp-server` defaults file holding the `INTERFACESv4`/`INTERFACESv6` lines.
    pub interfaces_conf_path: PathBuf,
    /// Where the API bearer token is persisted.
    pub token_file_path: PathBuf,
    /// Bearer token to use when the token file is missing or empty.
    pub token: Option<String>,
    pub environment: Environment,
    pub rate_limit: RateLimit,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// Per client IP token bucket settings. A `requests_per_second` of zero disables limiting.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct RateLimit {
    pub requests_per_second: u32,
    pub burst: u32,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst: 20,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080)),
            api_timeout: Duration::from_secs(10),
            dhcp_conf_path: PathBuf::from("/etc/dhcp/dhcpd.conf"),
            interfaces_conf_path: PathBuf::from("/etc/default/isc-dhcp-server"),
            token_file_path: PathBuf::from("/etc/dhcp-rest-api/token"),
            token: None,
            environment: Environment::default(),
            rate_limit: RateLimit::default(),
        }
    }
}

impl Config {
    /// Load a [`Config`] from the JSON file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] if the path can't be opened, or [`Error::InvalidJSON`] if its
    /// content isn't a valid configuration.
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        Ok(conf)
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Configuration files that don't exist yet. Listing hosts fails until the DHCP config
    /// exists; a missing interfaces file reads as empty but can't be written.
    #[must_use]
    pub fn missing_files(&self) -> Vec<&Path> {
        [&self.dhcp_conf_path, &self.interfaces_conf_path]
            .into_iter()
            .map(PathBuf::as_path)
            .filter(|path| !path.exists())
            .collect()
    }

    #[must_use]
    pub fn host_store(&self) -> DynHostStore {
        Arc::new(RwLock::new(FileHostStore::new(&self.dhcp_conf_path)))
    }

    #[must_use]
    pub fn interface_store(&self) -> DynInterfaceStore {
        Arc::new(RwLock::new(FileInterfaceStore::new(
            &self.interfaces_conf_path,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn empty_object_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.api_bind_addr.port(), 8080);
        assert_eq!(config.rate_limit.burst, 20);
        assert!(!config.is_production());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dhcpctl.json");
        fs::write(
            &path,
            r#"{
                "api_bind_addr": "127.0.0.1:9090",
                "api_timeout": 3,
                "dhcp_conf_path": "/srv/dhcpd.conf",
                "environment": "production",
                "rate_limit": { "requests_per_second": 5 }
            }"#,
        )
        .unwrap();

        let config = Config::try_from_file(&path).unwrap();

        assert_eq!(config.api_bind_addr, "127.0.0.1:9090".parse().unwrap());
        assert_eq!(config.api_timeout, Duration::from_secs(3));
        assert_eq!(config.dhcp_conf_path, PathBuf::from("/srv/dhcpd.conf"));
        assert_eq!(
            config.interfaces_conf_path,
            PathBuf::from("/etc/default/isc-dhcp-server")
        );
        assert!(config.is_production());
        assert_eq!(
            config.rate_limit,
            RateLimit {
                requests_per_second: 5,
                burst: 20,
            }
        );
    }

    #[test]
    fn rejects_unknown_environment() {
        let err = serde_json::from_str::<Config>(r#"{"environment":"staging"}"#).unwrap_err();

        assert!(err.is_data());
    }

    #[test]
    fn reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let dhcp_conf_path = dir.path().join("dhcpd.conf");
        fs::write(&dhcp_conf_path, "").unwrap();
        let config = Config {
            dhcp_conf_path,
            interfaces_conf_path: dir.path().join("isc-dhcp-server"),
            ..Config::default()
        };

        assert_eq!(
            config.missing_files(),
            vec![dir.path().join("isc-dhcp-server").as_path()]
        );
    }
}
