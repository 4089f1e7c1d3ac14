//! Client management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, error::ApiError};
use invoicer_core::invoice::Client;
use invoicer_db::{ClientInput, ClientRepository};

/// Creates the client routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route(
            "/clients/{id}",
            get(get_client).put(update_client).delete(delete_client),
        )
}

/// Request body for creating or updating a client.
#[derive(Debug, Deserialize)]
pub struct ClientRequest {
    /// Contact person, required.
    #[serde(default)]
    pub contact_person: String,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
}

/// Empty strings from form fields are stored as NULL.
fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<ClientRequest> for ClientInput {
    fn from(req: ClientRequest) -> Self {
        Self {
            contact_person: req.contact_person.trim().to_string(),
            email: blank_to_none(req.email),
            phone: blank_to_none(req.phone),
            address: blank_to_none(req.address),
        }
    }
}

/// GET `/clients` - All clients ordered by contact person.
async fn list_clients(State(state): State<AppState>) -> Result<Json<Vec<Client>>, ApiError> {
    let db = state.store.read().await;
    let clients = ClientRepository::new(db.clone()).list().await?;
    Ok(Json(clients))
}

/// GET `/clients/{id}`
async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Client>, ApiError> {
    let db = state.store.read().await;
    ClientRepository::new(db.clone())
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Client {id} not found")))
}

/// POST `/clients`
async fn create_client(
    State(state): State<AppState>,
    Json(payload): Json<ClientRequest>,
) -> Result<Json<Value>, ApiError> {
    let db = state.store.read().await;
    let client_id = ClientRepository::new(db.clone())
        .create(payload.into())
        .await?;
    Ok(Json(json!({ "success": true, "client_id": client_id })))
}

/// PUT `/clients/{id}` - Replace a client's details.
async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ClientRequest>,
) -> Result<Json<Value>, ApiError> {
    let db = state.store.read().await;
    let client = ClientRepository::new(db.clone())
        .update(id, payload.into())
        .await?;
    Ok(Json(json!({ "success": true, "client": client })))
}

/// DELETE `/clients/{id}` - Invoices keep their dangling reference.
async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let db = state.store.read().await;
    ClientRepository::new(db.clone()).delete(id).await?;
    Ok(Json(json!({ "success": true })))
}
