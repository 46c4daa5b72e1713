use crate::aggregator::Aggregator;
use crate::db_storage::PeopleStorage;
use crate::enrichment::enrich_name;
use crate::errors::AppError;
use crate::models::*;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Person persistence.
    pub storage: PeopleStorage,
    /// Fan-out client for the demographic providers.
    pub aggregator: Aggregator,
}

/// Parses a path id; anything that is not a positive integer is a bad request.
pub fn parse_id(raw: &str) -> Result<i32, AppError> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(AppError::BadRequest(format!("invalid id: {}", raw))),
    }
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "people-enrichment-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /people
///
/// Lists people with optional filters and pagination.
#[utoipa::path(
    get,
    path = "/people",
    tag = "people",
    params(ListPeopleQuery),
    responses(
        (status = 200, description = "One page of people", body = PaginatedPeople),
        (status = 400, description = "Invalid age filter", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn list_people(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListPeopleQuery>,
) -> Result<Json<PaginatedPeople>, AppError> {
    tracing::info!("GET /people - query: {:?}", query);

    let filter = ListingFilter::from_query(&query)?;
    let (people, total) = state.storage.list_paged(&filter).await?;

    Ok(Json(PaginatedPeople::new(filter.pagination, people, total)))
}

/// POST /people
///
/// Creates a person, enriching it with age, gender and nationality guesses.
/// Enrichment is best-effort: the person is stored even if every provider fails.
#[utoipa::path(
    post,
    path = "/people",
    tag = "people",
    request_body = PersonRequest,
    responses(
        (status = 201, description = "Person created", body = PersonRecord),
        (status = 400, description = "Missing name", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn create_person(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PersonRequest>,
) -> Result<(StatusCode, Json<PersonRecord>), AppError> {
    tracing::info!("POST /people - name: {}", request.name);
    request.validate_for_create()?;

    let enrichment = enrich_name(&state.aggregator, request.name.trim()).await;
    let person = NewPerson::enriched(request, enrichment);
    let record = state.storage.create_person(&person).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// PATCH /people/{id}
///
/// Updates only the supplied fields. No enrichment.
#[utoipa::path(
    patch,
    path = "/people/{id}",
    tag = "people",
    params(("id" = i32, Path, description = "Person id")),
    request_body = PersonPatch,
    responses(
        (status = 200, description = "Person updated", body = PersonRecord),
        (status = 400, description = "Invalid id or body", body = ErrorResponse),
        (status = 404, description = "No such person", body = ErrorResponse)
    )
)]
pub async fn update_person(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    Json(patch): Json<PersonPatch>,
) -> Result<Json<PersonRecord>, AppError> {
    let id = parse_id(&raw_id)?;
    tracing::info!("PATCH /people/{} - {:?}", id, patch);
    patch.validate()?;

    let record = state.storage.update_partial(id, &patch).await?;
    Ok(Json(record))
}

/// PUT /people/enrich/{id}
///
/// Replaces the person's names. When the first name changes the person is
/// re-enriched and every column is rewritten; otherwise the supplied surname
/// and patronymic are written and the demographic fields are kept.
#[utoipa::path(
    put,
    path = "/people/enrich/{id}",
    tag = "people",
    params(("id" = i32, Path, description = "Person id")),
    request_body = PersonRequest,
    responses(
        (status = 200, description = "Person updated", body = PersonRecord),
        (status = 400, description = "Invalid id or body", body = ErrorResponse),
        (status = 404, description = "No such person", body = ErrorResponse)
    )
)]
pub async fn update_person_enrich(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    Json(request): Json<PersonRequest>,
) -> Result<Json<PersonRecord>, AppError> {
    let id = parse_id(&raw_id)?;
    tracing::info!("PUT /people/enrich/{} - name: {}", id, request.name);

    let current_name = state.storage.fetch_name(id).await?;
    let new_name = request.name.trim().to_string();

    let record = if !new_name.is_empty() && new_name != current_name {
        tracing::info!("Name changed ({} -> {}), re-enriching", current_name, new_name);
        let enrichment = enrich_name(&state.aggregator, &new_name).await;
        let person = NewPerson::enriched(request, enrichment);
        state.storage.update_full(id, &person).await?
    } else {
        let patch = PersonPatch {
            surname: Some(request.surname.trim().to_string()).filter(|s| !s.is_empty()),
            patronymic: Some(request.patronymic.trim().to_string()).filter(|s| !s.is_empty()),
            ..Default::default()
        };
        if patch.is_empty() {
            state.storage.fetch_person(id).await?
        } else {
            state.storage.update_partial(id, &patch).await?
        }
    };

    Ok(Json(record))
}

/// DELETE /people/{id}
#[utoipa::path(
    delete,
    path = "/people/{id}",
    tag = "people",
    params(("id" = i32, Path, description = "Person id")),
    responses(
        (status = 200, description = "Person deleted", body = StatusResponse),
        (status = 400, description = "Invalid id", body = ErrorResponse),
        (status = 404, description = "No such person", body = ErrorResponse)
    )
)]
pub async fn delete_person(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    let id = parse_id(&raw_id)?;
    tracing::info!("DELETE /people/{}", id);

    state.storage.delete_person(id).await?;

    Ok(Json(StatusResponse {
        status: "deleted".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id(" 7 ").unwrap(), 7);
        for bad in ["", "abc", "0", "-3", "1.5", "99999999999"] {
            assert!(parse_id(bad).is_err(), "{}", bad);
        }
    }

    #[tokio::test]
    async fn test_health() {
        let (status, Json(body)) = health().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }
}
