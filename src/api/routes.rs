use crate::api::api_error::APIError;
use crate::api::middleware;
use crate::api::model::{
    validate_host_patch, validate_new_host, HostsResponse, InterfaceOperation, InterfacesResponse,
    MessageResponse, TokenUpdateRequest,
};
use crate::api::server::AppState;
use crate::host_store::{HostPatch, HostRecord};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde_json::json;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub(super) fn new(state: AppState) -> Router {
    let hosts = get(list_hosts).post(add_host);
    let interfaces = get(list_interfaces)
        .post(add_interface)
        .delete(delete_interface);
    let mut protected = Router::new()
        .route("/hosts", hosts.clone())
        .route("/hosts/", hosts)
        .route("/hosts/:name", put(update_host).delete(delete_host))
        .route("/interfaces", interfaces.clone())
        .route("/interfaces/", interfaces)
        .route("/token", put(update_token))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_bearer,
        ));
    for header in middleware::NO_CACHE_HEADERS {
        protected = protected.layer(middleware::set_header(header));
    }

    let mut router = Router::new()
        .route("/health", get(health_check))
        .merge(protected);
    for header in middleware::SECURITY_HEADERS {
        router = router.layer(middleware::set_header(header));
    }
    router
        .layer(middleware::cors())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.api_timeout))
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"status":"UP"}))
}

async fn list_hosts(State(state): State<AppState>) -> Result<Json<HostsResponse>, APIError> {
    let hosts = state.hosts.read().await.list_hosts().await?;
    Ok(Json(HostsResponse { hosts }))
}

async fn add_host(
    State(state): State<AppState>,
    WithRejection(Json(host), _): WithRejection<Json<HostRecord>, APIError>,
) -> Result<Json<MessageResponse>, APIError> {
    validate_new_host(&host)?;
    state.hosts.write().await.add_host(host).await?;
    Ok(Json(MessageResponse::new("Host added successfully")))
}

async fn update_host(
    State(state): State<AppState>,
    Path(name): Path<String>,
    WithRejection(Json(patch), _): WithRejection<Json<HostPatch>, APIError>,
) -> Result<Json<MessageResponse>, APIError> {
    validate_host_patch(&patch)?;
    state.hosts.write().await.update_host(&name, patch).await?;
    Ok(Json(MessageResponse::new("Host updated successfully")))
}

async fn delete_host(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, APIError> {
    state.hosts.write().await.delete_host(&name).await?;
    Ok(Json(MessageResponse::new("Host deleted successfully")))
}

async fn list_interfaces(
    State(state): State<AppState>,
) -> Result<Json<InterfacesResponse>, APIError> {
    let interfaces = state.interfaces.read().await.interfaces().await?;
    Ok(Json(InterfacesResponse { interfaces }))
}

async fn add_interface(
    State(state): State<AppState>,
    WithRejection(Json(op), _): WithRejection<Json<InterfaceOperation>, APIError>,
) -> Result<Json<MessageResponse>, APIError> {
    let family = op.validate()?;
    state
        .interfaces
        .write()
        .await
        .add_interface(&op.family, &op.interface)
        .await?;
    Ok(Json(MessageResponse::new(format!(
        "Interface {} added to {} successfully.",
        op.interface,
        family.key()
    ))))
}

async fn delete_interface(
    State(state): State<AppState>,
    WithRejection(Json(op), _): WithRejection<Json<InterfaceOperation>, APIError>,
) -> Result<Json<MessageResponse>, APIError> {
    let family = op.validate()?;
    state
        .interfaces
        .write()
        .await
        .delete_interface(&op.family, &op.interface)
        .await?;
    Ok(Json(MessageResponse::new(format!(
        "Interface {} removed from {} successfully.",
        op.interface,
        family.key()
    ))))
}

async fn update_token(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<TokenUpdateRequest>, APIError>,
) -> Result<Json<MessageResponse>, APIError> {
    state.token.replace(payload.token).await?;
    Ok(Json(MessageResponse::new("Token updated successfully")))
}
