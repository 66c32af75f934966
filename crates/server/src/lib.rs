pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "College Compass API",
        version = "0.1.0",
        description = "Search colleges for a career and location, save favourites and compare them"
    ),
    paths(
        routes::health_check,
        routes::get_state,
        routes::update_form,
        routes::search,
        routes::toggle_saved,
        routes::compare,
        routes::set_comparison_visibility,
        routes::sse::events_stream,
    ),
    components(schemas(
        routes::HealthResponse,
        routes::StateResponse,
        routes::FormUpdate,
        routes::ToggleSaveResponse,
        routes::VisibilityRequest,
        error::ErrorResponse,
        orchestrator::StoreSnapshot,
        orchestrator::SearchForm,
        compass_core::College,
        compass_core::ComparisonAnalysis,
        compass_core::ComparisonEntry,
    )),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "view", description = "Search, saved selection and comparison"),
        (name = "events", description = "Real-time event streaming (SSE)"),
    )
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    let app_dir = state.app_dir.clone();

    let api_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health_check))
        .route("/api/state", get(routes::get_state))
        .route("/api/form", put(routes::update_form))
        .route("/api/search", post(routes::search))
        .route("/api/saved/toggle", post(routes::toggle_saved))
        .route("/api/compare", post(routes::compare))
        .route(
            "/api/comparison/visibility",
            put(routes::set_comparison_visibility),
        )
        .route("/api/events", get(routes::sse::events_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    if let Some(app_dir) = app_dir {
        let index_file = app_dir.join("index.html");
        let serve_dir = ServeDir::new(&app_dir).not_found_service(ServeFile::new(&index_file));
        api_router.fallback_service(serve_dir)
    } else {
        api_router
    }
}
