use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::admin::dashboard::render_dashboard;
use crate::admin::service::PoolAdmin;
use crate::load_balancer::backend::BackendEntry;
use crate::load_balancer::pool::{PoolError, PoolSnapshot};

impl IntoResponse for PoolError {
    fn into_response(self) -> Response {
        let status = match self {
            PoolError::DuplicateBackend(_) => StatusCode::CONFLICT,
            PoolError::InvalidIndex { .. } => StatusCode::NOT_FOUND,
            PoolError::InvalidAddress { .. } | PoolError::MissingPort | PoolError::InvalidWeight => {
                StatusCode::BAD_REQUEST
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct PoolHealth {
    pub server_pool: Vec<ServerHealth>,
}

#[derive(Serialize)]
pub struct ServerHealth {
    pub url: String,
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddBackendRequest {
    pub address: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct AddInstanceForm {
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub port: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveInstanceForm {
    #[serde(default)]
    pub index: String,
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

pub async fn get_pool_health(State(admin): State<PoolAdmin>) -> Json<PoolHealth> {
    let server_pool = admin
        .list()
        .backends
        .into_iter()
        .map(|b| ServerHealth {
            url: b.address,
            active: b.alive,
        })
        .collect();
    Json(PoolHealth { server_pool })
}

pub async fn get_backends(State(admin): State<PoolAdmin>) -> Json<PoolSnapshot> {
    Json(admin.list())
}

pub async fn add_backend(
    State(admin): State<PoolAdmin>,
    Json(body): Json<AddBackendRequest>,
) -> Result<(StatusCode, Json<BackendEntry>), PoolError> {
    let entry = admin.add(&body.address, body.weight).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn remove_backend(
    State(admin): State<PoolAdmin>,
    Path(index): Path<String>,
) -> Result<Json<BackendEntry>, PoolError> {
    admin.remove_raw(&index).map(Json)
}

pub async fn dashboard(State(admin): State<PoolAdmin>) -> Html<String> {
    Html(render_dashboard(&admin.list()))
}

pub async fn add_instance(
    State(admin): State<PoolAdmin>,
    Form(form): Form<AddInstanceForm>,
) -> Response {
    match admin.add_host_port(&form.ip, &form.port).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, format!("Error: {}", e)).into_response(),
    }
}

pub async fn remove_instance(
    State(admin): State<PoolAdmin>,
    Form(form): Form<RemoveInstanceForm>,
) -> Response {
    match admin.remove_raw(&form.index) {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, format!("Error: {}", e)).into_response(),
    }
}
