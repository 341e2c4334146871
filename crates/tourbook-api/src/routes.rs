// ============================================================================
// Tourbook API - Router
// File: crates/tourbook-api/src/routes.rs
// ============================================================================

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use tourbook_core::ports::photo_storage::MAX_PHOTO_BYTES;

use crate::handlers::{
    activities, auth, companies, company_activities, guide, health, members, registrations,
};
use crate::middleware::session_middleware;
use crate::state::AppState;

/// Every route lives under `/api/v1`. Sessions are resolved for all of
/// them; handlers that need a user extract `AuthenticatedUser`.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/activities", get(activities::list_upcoming))
        .route("/activities/{id}", get(activities::show))
        .route("/activities/{id}/register", post(registrations::register));

    let customer_routes = Router::new()
        .route("/my-activities", get(registrations::my_activities))
        .route("/my-activities/{id}", delete(registrations::withdraw));

    let guide_routes = Router::new()
        .route("/guide/activities", get(guide::activities))
        .route("/guide/activities/{id}/participants", get(guide::participants));

    let company_routes = Router::new()
        .route("/companies", get(companies::list).post(companies::create))
        .route(
            "/companies/{id}",
            get(companies::get).put(companies::update).delete(companies::delete),
        )
        .route(
            "/companies/{id}/users",
            get(members::list_owners).post(members::invite_owner),
        )
        .route(
            "/companies/{id}/users/{member_id}",
            put(members::update_owner).delete(members::remove_owner),
        )
        .route(
            "/companies/{id}/guides",
            get(members::list_guides).post(members::invite_guide),
        )
        .route(
            "/companies/{id}/guides/{member_id}",
            put(members::update_guide).delete(members::remove_guide),
        )
        .route(
            "/companies/{id}/activities",
            get(company_activities::list).post(company_activities::create),
        )
        .route(
            "/companies/{id}/activities/{activity_id}",
            put(company_activities::update).delete(company_activities::delete),
        );

    let api = Router::new()
        .merge(public_routes)
        .merge(customer_routes)
        .merge(guide_routes)
        .merge(company_routes)
        .layer(middleware::from_fn_with_state(state.clone(), session_middleware));

    Router::new()
        .nest("/api/v1", api)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        // Photo plus the other form fields.
        .layer(DefaultBodyLimit::max(2 * MAX_PHOTO_BYTES))
        .with_state(state)
}
