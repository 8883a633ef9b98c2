//! Interfaces the DHCP server listens on.
//!
//! On Debian-style systems `isc-dhcp-server` reads them from shell assignments in
//! `/etc/default/isc-dhcp-server`:
//!
//! ```text
//! INTERFACESv4="eth0 eth1"
//! INTERFACESv6=""
//! ```
//!
//! [`file::FileInterfaceStore`] edits those two lines and passes every other line through.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;

mod assignment;
pub mod file;

#[allow(clippy::module_name_repetitions)]
pub use file::FileInterfaceStore;

/// `DynInterfaceStore` is a type alias for an [`InterfaceStore`] shared by concurrent request
/// handlers, see [`crate::host_store::DynHostStore`].
#[allow(clippy::module_name_repetitions)]
pub type DynInterfaceStore = Arc<RwLock<dyn InterfaceStore + Send + Sync>>;

/// Address family of an interface selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceFamily {
    V4,
    V6,
}

impl InterfaceFamily {
    pub const ALL: [InterfaceFamily; 2] = [InterfaceFamily::V4, InterfaceFamily::V6];

    /// The shell variable holding the selection for this family.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            InterfaceFamily::V4 => "INTERFACESv4",
            InterfaceFamily::V6 => "INTERFACESv6",
        }
    }
}

impl FromStr for InterfaceFamily {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("v4") {
            Ok(InterfaceFamily::V4)
        } else if s.eq_ignore_ascii_case("v6") {
            Ok(InterfaceFamily::V6)
        } else {
            Err(Error::InvalidInterfaceType(s.to_string()))
        }
    }
}

impl fmt::Display for InterfaceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceFamily::V4 => f.write_str("v4"),
            InterfaceFamily::V6 => f.write_str("v6"),
        }
    }
}

/// The raw, space separated interface selections for both families.
#[derive(Serialize, Deserialize, Debug, Clone, Default, Eq, PartialEq)]
pub struct InterfaceSet {
    pub v4: String,
    pub v6: String,
}

impl InterfaceSet {
    #[must_use]
    pub fn get(&self, family: InterfaceFamily) -> &str {
        match family {
            InterfaceFamily::V4 => &self.v4,
            InterfaceFamily::V6 => &self.v6,
        }
    }

    fn get_mut(&mut self, family: InterfaceFamily) -> &mut String {
        match family {
            InterfaceFamily::V4 => &mut self.v4,
            InterfaceFamily::V6 => &mut self.v6,
        }
    }

    /// The interface names selected for `family`, in order.
    pub fn tokens(&self, family: InterfaceFamily) -> impl Iterator<Item = &str> {
        self.get(family).split_whitespace()
    }

    /// Append `name` to the selection for `family`. Returns `false`, changing nothing, when it
    /// is already selected.
    pub fn insert(&mut self, family: InterfaceFamily, name: &str) -> bool {
        if self.tokens(family).any(|token| token == name) {
            return false;
        }
        let appended = self
            .tokens(family)
            .chain(std::iter::once(name))
            .collect::<Vec<_>>()
            .join(" ");
        *self.get_mut(family) = appended;
        true
    }

    /// Remove every occurrence of `name` from the selection for `family`. Returns `false`,
    /// changing nothing, when it isn't selected.
    pub fn remove(&mut self, family: InterfaceFamily, name: &str) -> bool {
        if !self.tokens(family).any(|token| token == name) {
            return false;
        }
        let remaining = self
            .tokens(family)
            .filter(|token| *token != name)
            .collect::<Vec<_>>()
            .join(" ");
        *self.get_mut(family) = remaining;
        true
    }
}

/// An async trait describing editing of the DHCP server's interface selections.
#[async_trait::async_trait]
pub trait InterfaceStore {
    /// Current selections. A missing file reads as empty selections.
    async fn interfaces(&self) -> Result<InterfaceSet, Error>;

    /// Write both selections back, failing with [`Error::InterfacesFileMissing`] if the file
    /// doesn't exist.
    async fn save_interfaces(&mut self, interfaces: &InterfaceSet) -> Result<(), Error>;

    /// Select interface `name` for `family` (`v4` or `v6`, any case). Selecting an
    /// already-selected interface succeeds without writing.
    async fn add_interface(&mut self, family: &str, name: &str) -> Result<(), Error>;

    /// Deselect interface `name` for `family`. Deselecting an interface that isn't selected
    /// succeeds without writing.
    async fn delete_interface(&mut self, family: &str, name: &str) -> Result<(), Error>;
}
