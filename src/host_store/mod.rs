//! DHCP host reservations.
//!
//! Reservations live in the ISC-DHCP configuration file as `host` blocks:
//!
//! ```text
//! host printer {
//!     hardware ethernet 00:11:22:33:44:55;
//!     option routers 10.0.0.1;
//!     option subnet-mask 255.255.255.0;
//!     fixed-address 10.0.0.5;
//!     option domain-name-servers 8.8.8.8;
//! }
//! ```
//!
//! [`file::FileHostStore`] edits these blocks in place. Text outside the blocks it touches is
//! kept byte for byte. Blocks it writes always use the field order shown above.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

mod block;
pub mod file;

#[allow(clippy::module_name_repetitions)]
pub use file::FileHostStore;

/// `DynHostStore` is a type alias for a [`HostStore`] shared by concurrent request handlers.
/// Writers take the [`RwLock`] exclusively, so read-modify-write cycles on the file don't
/// interleave within the process.
#[allow(clippy::module_name_repetitions)]
pub type DynHostStore = Arc<RwLock<dyn HostStore + Send + Sync>>;

/// One DHCP reservation. Values are copied verbatim to and from the config syntax.
#[derive(Serialize, Deserialize, Debug, Clone, Default, Eq, PartialEq)]
pub struct HostRecord {
    pub name: String,
    pub hardware_ethernet: String,
    pub option_routers: String,
    pub option_subnet_mask: String,
    pub fixed_address: String,
    pub option_domain_name_servers: String,
}

impl HostRecord {
    /// Apply `patch`, keeping the current value of every unset field. A `name` is only replaced
    /// by a non-empty value.
    pub fn apply(&mut self, patch: HostPatch) {
        if let Some(name) = patch.name.filter(|name| !name.is_empty()) {
            self.name = name;
        }
        let fields = [
            (&mut self.hardware_ethernet, patch.hardware_ethernet),
            (&mut self.option_routers, patch.option_routers),
            (&mut self.option_subnet_mask, patch.option_subnet_mask),
            (&mut self.fixed_address, patch.fixed_address),
            (
                &mut self.option_domain_name_servers,
                patch.option_domain_name_servers,
            ),
        ];
        for (current, new) in fields {
            if let Some(new) = new {
                *current = new;
            }
        }
    }
}

/// Renders the record as a `host` block, without surrounding whitespace.
impl fmt::Display for HostRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "host {} {{", self.name)?;
        writeln!(f, "    hardware ethernet {};", self.hardware_ethernet)?;
        writeln!(f, "    option routers {};", self.option_routers)?;
        writeln!(f, "    option subnet-mask {};", self.option_subnet_mask)?;
        writeln!(f, "    fixed-address {};", self.fixed_address)?;
        writeln!(
            f,
            "    option domain-name-servers {};",
            self.option_domain_name_servers
        )?;
        write!(f, "}}")
    }
}

/// A partial update of a [`HostRecord`]. `None` leaves a field as it is, `Some("")` writes an
/// empty value.
#[derive(Serialize, Deserialize, Debug, Clone, Default, Eq, PartialEq)]
pub struct HostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_ethernet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_routers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_subnet_mask: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_domain_name_servers: Option<String>,
}

/// An async trait describing editing of DHCP host reservations.
#[async_trait::async_trait]
pub trait HostStore {
    /// List every reservation, in file order.
    async fn list_hosts(&self) -> Result<Vec<HostRecord>, Error>;

    /// Add a reservation. Names are not checked for uniqueness.
    async fn add_host(&mut self, host: HostRecord) -> Result<(), Error>;

    /// Update the first reservation named `name`, failing with [`Error::HostNotFound`] if
    /// there is none.
    async fn update_host(&mut self, name: &str, patch: HostPatch) -> Result<(), Error>;

    /// Delete the first reservation named `name`. Deleting a missing reservation succeeds.
    async fn delete_host(&mut self, name: &str) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn printer() -> HostRecord {
        HostRecord {
            name: "printer".to_string(),
            hardware_ethernet: "00:11:22:33:44:55".to_string(),
            option_routers: "10.0.0.1".to_string(),
            option_subnet_mask: "255.255.255.0".to_string(),
            fixed_address: "10.0.0.5".to_string(),
            option_domain_name_servers: "8.8.8.8".to_string(),
        }
    }

    #[test]
    fn renders_fields_in_fixed_order() {
        assert_eq!(
            printer().to_string(),
            "host printer {\n    hardware ethernet 00:11:22:33:44:55;\n    option routers 10.0.0.1;\n    option subnet-mask 255.255.255.0;\n    fixed-address 10.0.0.5;\n    option domain-name-servers 8.8.8.8;\n}"
        );
    }

    #[test]
    fn patch_keeps_unset_fields_and_writes_empty_ones() {
        let mut host = printer();
        host.apply(HostPatch {
            fixed_address: Some("10.0.0.6".to_string()),
            option_routers: Some(String::new()),
            ..HostPatch::default()
        });

        assert_eq!(
            host,
            HostRecord {
                fixed_address: "10.0.0.6".to_string(),
                option_routers: String::new(),
                ..printer()
            }
        );
    }

    #[test]
    fn empty_name_patch_does_not_rename() {
        let mut host = printer();
        host.apply(HostPatch {
            name: Some(String::new()),
            ..HostPatch::default()
        });
        assert_eq!(host.name, "printer");

        host.apply(HostPatch {
            name: Some("scanner".to_string()),
            ..HostPatch::default()
        });
        assert_eq!(host.name, "scanner");
    }

    #[test]
    fn patch_distinguishes_missing_from_empty() {
        let patch: HostPatch =
            serde_json::from_str(r#"{"fixed_address":"","option_routers":null}"#).unwrap();

        assert_eq!(patch.fixed_address, Some(String::new()));
        assert_eq!(patch.option_routers, None);
        assert_eq!(patch.hardware_ethernet, None);
    }
}
