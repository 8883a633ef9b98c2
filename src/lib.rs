//! dhcpctl
//!
//! A small HTTP API for managing an [ISC DHCP] server's static configuration: `host`
//! reservations in `dhcpd.conf` and the `INTERFACESv4`/`INTERFACESv6` selections in
//! `/etc/default/isc-dhcp-server`.
//!
//! Both files are edited as text. Only the block or line a request is about gets rewritten;
//! comments, subnets and every other line are left exactly as they were. Rewrites go through a
//! temp file and a rename, and writers to the same file are serialized within the process.
//!
//! [ISC DHCP]: https://www.isc.org/dhcp/
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod config;
pub mod error;
pub mod host_store;
pub mod interface_store;
pub mod persist;
pub mod token;

pub use api::new as new_http;
pub use config::{Config, SharedConfig};
pub use host_store::{FileHostStore, HostPatch, HostRecord, HostStore};
pub use interface_store::{FileInterfaceStore, InterfaceFamily, InterfaceSet, InterfaceStore};
pub use token::TokenStore;
