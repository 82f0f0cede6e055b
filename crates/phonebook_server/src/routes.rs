//! Route handlers for the phonebook API.

use crate::error::ApiFailure;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use phonebook_core::{Person, PersonPayload};
use serde::Serialize;

const LIST_CACHE_CONTROL: &str = "public, max-age=60";

#[derive(Debug, Serialize)]
struct ListBody {
    success: bool,
    count: usize,
    data: Vec<Person>,
}

#[derive(Debug, Serialize)]
struct PersonBody {
    success: bool,
    data: Person,
}

impl PersonBody {
    fn ok(data: Person) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

pub static ENDPOINTS: [EndpointInfo; 6] = [
    EndpointInfo {
        method: "GET",
        path: "/api/persons",
        description: "List all entries",
    },
    EndpointInfo {
        method: "GET",
        path: "/api/persons/:id",
        description: "Get single entry",
    },
    EndpointInfo {
        method: "POST",
        path: "/api/persons",
        description: "Create new entry",
    },
    EndpointInfo {
        method: "PUT",
        path: "/api/persons/:id",
        description: "Update entry",
    },
    EndpointInfo {
        method: "DELETE",
        path: "/api/persons/:id",
        description: "Delete entry",
    },
    EndpointInfo {
        method: "GET",
        path: "/info",
        description: "Phonebook summary",
    },
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UnknownEndpointBody<'a> {
    success: bool,
    error: &'static str,
    kind: &'static str,
    available_endpoints: &'static [EndpointInfo],
    documentation: &'a str,
}

pub async fn list_persons(State(state): State<AppState>) -> Result<Response, ApiFailure> {
    let persons = state.run(|service| service.list_persons()).await?;
    let body = ListBody {
        success: true,
        count: persons.len(),
        data: persons,
    };
    Ok(([(header::CACHE_CONTROL, LIST_CACHE_CONTROL)], Json(body)).into_response())
}

pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiFailure> {
    let person = state.run(move |service| service.get_person(&id)).await?;
    Ok(PersonBody::ok(person))
}

pub async fn create_person(
    State(state): State<AppState>,
    payload: Result<Json<PersonPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiFailure> {
    let Json(payload) = payload.map_err(|rejection| state.fail(rejection.into()))?;
    let person = state
        .run(move |service| service.create_person(&payload))
        .await?;
    Ok((StatusCode::CREATED, PersonBody::ok(person)))
}

pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PersonPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiFailure> {
    let Json(payload) = payload.map_err(|rejection| state.fail(rejection.into()))?;
    let person = state
        .run(move |service| service.update_person(&id, &payload))
        .await?;
    Ok(PersonBody::ok(person))
}

pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiFailure> {
    state.run(move |service| service.delete_person(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn info(State(state): State<AppState>) -> Result<Html<String>, ApiFailure> {
    let count = state.run(|service| service.count_persons()).await?;
    Ok(Html(format!(
        "<div style=\"font-family: sans-serif\">\
         <h1>Phonebook Info</h1>\
         <p>Total entries: {count}</p>\
         <p>Server time: {}</p>\
         <p>Environment: {}</p>\
         </div>",
        chrono::Local::now().to_rfc2822(),
        state.mode
    )))
}

pub async fn unknown_endpoint(State(state): State<AppState>) -> Response {
    let body = UnknownEndpointBody {
        success: false,
        error: "Endpoint not found",
        kind: "NotFound",
        available_endpoints: &ENDPOINTS,
        documentation: &state.docs_url,
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
