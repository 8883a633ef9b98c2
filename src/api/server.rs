use crate::api::rate_limit::RateLimiter;
use crate::api::routes;
use crate::config::SharedConfig;
use crate::host_store::DynHostStore;
use crate::interface_store::DynInterfaceStore;
use crate::token::SharedToken;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: SharedConfig,
    pub hosts: DynHostStore,
    pub interfaces: DynInterfaceStore,
    pub token: SharedToken,
    pub rate_limiter: Arc<RateLimiter>,
}

/// Build the API [`Router`] around the given stores.
pub fn router(
    config: SharedConfig,
    hosts: DynHostStore,
    interfaces: DynInterfaceStore,
    token: SharedToken,
) -> Router {
    let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit));
    routes::new(AppState {
        config,
        hosts,
        interfaces,
        token,
        rate_limiter,
    })
}

/// Bind [`Config::api_bind_addr`][crate::config::Config::api_bind_addr] and return the future
/// serving the API on it.
///
/// # Errors
///
/// Returns an error if the address can't be bound.
pub fn new(
    config: SharedConfig,
    hosts: DynHostStore,
    interfaces: DynInterfaceStore,
    token: SharedToken,
) -> hyper::Result<impl Future<Output = hyper::Result<()>>> {
    let builder = axum::Server::try_bind(&config.api_bind_addr)?;
    Ok(builder.serve(
        router(config, hosts, interfaces, token)
            .into_make_service_with_connect_info::<SocketAddr>(),
    ))
}
