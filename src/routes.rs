use crate::handlers::{self, AppState};
use crate::openapi::ApiDoc;
use axum::{
    routing::{get, patch, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Request size limit: person bodies are tiny.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Builds the full HTTP application around `state`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let people_routes = Router::new()
        .route(
            "/people",
            get(handlers::list_people).post(handlers::create_person),
        )
        .route(
            "/people/:id",
            patch(handlers::update_person).delete(handlers::delete_person),
        )
        .route("/people/enrich/:id", put(handlers::update_person_enrich))
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(people_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
