//! A file-backed implementation of the [`HostStore`][super::HostStore] trait.
//!
//! Every call reads the whole configuration file; nothing is cached between calls.
use crate::error::Error;
use crate::host_store::block;
use crate::host_store::{HostPatch, HostRecord, HostStore};
use crate::persist;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Edits the `host` blocks of an ISC-DHCP configuration file.
///
/// Additions are appended to the file. Updates and deletions rewrite the file through
/// [`persist::replace_file`], changing only the span of the affected block.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct FileHostStore {
    path: PathBuf,
}

impl FileHostStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<String, Error> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| Error::read(&self.path, err))
    }
}

#[async_trait::async_trait]
impl HostStore for FileHostStore {
    /// # Errors
    ///
    /// Returns [`Error::Read`] if the configuration file can't be read.
    async fn list_hosts(&self) -> Result<Vec<HostRecord>, Error> {
        let content = self.read().await?;
        Ok(block::blocks(&content)
            .iter()
            .map(block::HostBlock::record)
            .collect())
    }

    /// # Errors
    ///
    /// Returns [`Error::Write`] if the configuration file doesn't exist or can't be appended to.
    async fn add_host(&mut self, host: HostRecord) -> Result<(), Error> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await
            .map_err(|err| Error::write(&self.path, err))?;
        file.write_all(format!("\n{host}\n").as_bytes())
            .await
            .map_err(|err| Error::write(&self.path, err))?;
        file.flush()
            .await
            .map_err(|err| Error::write(&self.path, err))?;
        tracing::info!("added host \"{}\" to {}", host.name, self.path.display());
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`Error::HostNotFound`] if no block is named `name`.
    ///
    /// Returns [`Error::Read`] or [`Error::Write`] if the configuration file can't be read or
    /// replaced.
    async fn update_host(&mut self, name: &str, patch: HostPatch) -> Result<(), Error> {
        let content = self.read().await?;
        let Some(found) = block::find_named(&content, name) else {
            tracing::debug!("host \"{name}\" not found for update");
            return Err(Error::HostNotFound(name.to_string()));
        };

        let mut host = found.record();
        host.apply(patch);
        let updated = format!(
            "{}{host}{}",
            &content[..found.span.start],
            &content[found.span.end..]
        );
        persist::replace_file(&self.path, updated).await?;
        tracing::info!("updated host \"{name}\" as \"{}\"", host.name);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`Error::Read`] or [`Error::Write`] if the configuration file can't be read or
    /// replaced.
    async fn delete_host(&mut self, name: &str) -> Result<(), Error> {
        let content = self.read().await?;
        let Some(range) = block::find_named_padded(&content, name) else {
            tracing::debug!("host \"{name}\" not found for deletion, nothing to do");
            return Ok(());
        };

        let mut remaining = [&content[..range.start], &content[range.end..]]
            .concat()
            .trim()
            .to_string();
        if !remaining.is_empty() {
            remaining.push('\n');
        }
        persist::replace_file(&self.path, remaining).await?;
        tracing::info!("deleted host \"{name}\"");
        Ok(())
    }
}
