use crate::enrichment::EnrichmentResult;
use crate::handlers;
use crate::models::{
    ErrorResponse, PaginatedPeople, PersonPatch, PersonRecord, PersonRequest, StatusResponse,
};
use utoipa::OpenApi;

/// OpenAPI document for the people endpoints, served through Swagger UI.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "People Enrichment API",
        description = "Person records enriched with age, gender and nationality guesses"
    ),
    paths(
        handlers::health,
        handlers::list_people,
        handlers::create_person,
        handlers::update_person,
        handlers::update_person_enrich,
        handlers::delete_person,
    ),
    components(schemas(
        PersonRecord,
        PersonRequest,
        PersonPatch,
        PaginatedPeople,
        StatusResponse,
        ErrorResponse,
        EnrichmentResult,
    )),
    tags(
        (name = "people", description = "Person records"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;
