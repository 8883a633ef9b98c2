//! A file-backed implementation of the [`InterfaceStore`][super::InterfaceStore] trait.
use crate::error::Error;
use crate::interface_store::assignment;
use crate::interface_store::{InterfaceFamily, InterfaceSet, InterfaceStore};
use crate::persist;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Edits the `INTERFACESv4` / `INTERFACESv6` lines of an `isc-dhcp-server` defaults file.
///
/// Reading tolerates a missing file, writing does not: the file is never created.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct FileInterfaceStore {
    path: PathBuf,
}

impl FileInterfaceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Option<String>, Error> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::read(&self.path, err)),
        }
    }
}

#[async_trait::async_trait]
impl InterfaceStore for FileInterfaceStore {
    /// # Errors
    ///
    /// Returns [`Error::Read`] if the file exists but can't be read.
    async fn interfaces(&self) -> Result<InterfaceSet, Error> {
        let Some(content) = self.read().await? else {
            tracing::debug!(
                "interfaces config {} not found, treating as empty",
                self.path.display()
            );
            return Ok(InterfaceSet::default());
        };
        Ok(InterfaceSet {
            v4: assignment::value(&content, InterfaceFamily::V4).to_string(),
            v6: assignment::value(&content, InterfaceFamily::V6).to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns [`Error::InterfacesFileMissing`] if the file doesn't exist.
    ///
    /// Returns [`Error::Read`] or [`Error::Write`] if the file can't be read or replaced.
    async fn save_interfaces(&mut self, interfaces: &InterfaceSet) -> Result<(), Error> {
        let Some(content) = self.read().await? else {
            return Err(Error::InterfacesFileMissing(self.path.clone()));
        };
        persist::replace_file(&self.path, assignment::rewrite(&content, interfaces)).await
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidInterfaceType`] if `family` isn't `v4` or `v6`, otherwise the
    /// errors of [`Self::interfaces`] and [`Self::save_interfaces`].
    async fn add_interface(&mut self, family: &str, name: &str) -> Result<(), Error> {
        let family: InterfaceFamily = family.parse()?;
        let mut interfaces = self.interfaces().await?;
        if !interfaces.insert(family, name) {
            tracing::debug!("interface {name} already present in {}", family.key());
            return Ok(());
        }
        self.save_interfaces(&interfaces).await?;
        tracing::info!("added interface {name} to {}", family.key());
        Ok(())
    }

    /// # Errors
    ///
    /// Same as [`Self::add_interface`].
    async fn delete_interface(&mut self, family: &str, name: &str) -> Result<(), Error> {
        let family: InterfaceFamily = family.parse()?;
        let mut interfaces = self.interfaces().await?;
        if !interfaces.remove(family, name) {
            tracing::debug!("interface {name} not found in {}, nothing to do", family.key());
            return Ok(());
        }
        self.save_interfaces(&interfaces).await?;
        tracing::info!("removed interface {name} from {}", family.key());
        Ok(())
    }
}
