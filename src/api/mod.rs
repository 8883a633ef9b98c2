//! HTTP API for editing the DHCP server's host reservations and interface selections.
//!
//! Every endpoint except `/health` requires an `Authorization: Bearer <token>` header carrying
//! the [active token][crate::token]. Requests without it get HTTP 403 (Forbidden). Clients
//! exceeding the [configured rate][crate::config::RateLimit] get HTTP 429 (Too Many Requests).
//!
//! Errors are returned as a JSON body of the form `{"error": "..."}`.
//!
//! # API Endpoints
//!
//! ## `/health` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"status":"UP"}`. Needs no token.
//!
//! ## `/hosts` (GET)
//!
//!   Lists the `host` blocks of the DHCP configuration in file order:
//!
//!   ```json
//!   { "hosts": [ {
//!       "name": "printer",
//!       "hardware_ethernet": "00:11:22:33:44:55",
//!       "option_routers": "10.0.0.1",
//!       "option_subnet_mask": "255.255.255.0",
//!       "fixed_address": "10.0.0.5",
//!       "option_domain_name_servers": "8.8.8.8"
//!   } ] }
//!   ```
//!
//!   Fields missing from a block are returned as empty strings.
//!
//! ## `/hosts` (POST)
//!
//!   Appends a new `host` block. The body is a host as listed above, with every field
//!   required. Names are not checked for uniqueness.
//!
//! ## `/hosts/:name` (PUT)
//!
//!   Updates the first block named `:name`. The body holds any subset of the host fields;
//!   omitted fields keep their value, `""` writes an empty value, and a non-empty `name`
//!   renames the block. The block is rewritten in the canonical field order. Returns HTTP 404
//!   (Not Found) if there is no such block.
//!
//! ## `/hosts/:name` (DELETE)
//!
//!   Removes the first block named `:name`. Deleting a missing host succeeds.
//!
//! ## `/interfaces` (GET)
//!
//!   Returns the raw interface selections, `{"interfaces": {"v4": "eth0 eth1", "v6": ""}}`.
//!
//! ## `/interfaces` (POST, DELETE)
//!
//!   Selects or deselects one interface for one family:
//!
//!   ```json
//!   { "type": "v4", "interface": "eth1" }
//!   ```
//!
//!   `type` must be `v4` or `v6`. Selecting an interface twice, or deselecting one that isn't
//!   selected, succeeds without changing the file.
//!
//! ## `/token` (PUT)
//!
//!   Replaces the bearer token with `{"token": "..."}`. The new token is saved to the token
//!   file and required from the next request on.

mod api_error;
mod middleware;
mod model;
mod rate_limit;
mod routes;
pub mod server;

pub use server::{new, router};
