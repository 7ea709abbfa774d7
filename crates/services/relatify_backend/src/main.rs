// File: services/relatify_backend/src/main.rs
use axum::{routing::get, Router};
use http::Method;
use relatify_calendar::routes as calendar_routes;
use relatify_config::load_config;
#[cfg(feature = "outlook")]
use relatify_outlook::routes as outlook_routes;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

mod app_state;
use app_state::AppState;

#[tokio::main]
async fn main() {
    relatify_common::logging::init();
    let config = Arc::new(load_config().expect("Failed to load config"));
    let state = AppState::new(config.clone());

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the Relatify API!" }))
        .merge(calendar_routes::routes(state.calendar_state.clone()));

    #[cfg(feature = "outlook")]
    let api_router = match &state.outlook_state {
        Some(outlook_state) => api_router.merge(outlook_routes::routes(outlook_state.clone())),
        None => api_router,
    };

    // The calendar view is consumed by the CRM frontend on another origin.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(Any);

    #[allow(unused_mut)] // mutable only when the openapi feature is on
    let mut app = Router::new().nest("/api", api_router).layer(cors);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use relatify_calendar::doc::CalendarApiDoc;
        #[cfg(feature = "outlook")]
        use relatify_outlook::doc::OutlookApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Relatify API",
                version = "0.1.0",
                description = "Relatify calendar aggregation service API docs",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            components(),
            tags( (name = "Relatify", description = "Core service endpoints")),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(CalendarApiDoc::openapi());
        #[cfg(feature = "outlook")]
        openapi_doc.merge(OutlookApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui =
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc.clone());
        app = app.merge(swagger_ui);
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await.expect("Failed to bind server address");
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
