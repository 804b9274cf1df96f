mod actor;
mod handlers;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use actor::{RequestActor, ACTOR_HEADER};

use crate::models::Actor;
use crate::service::HierarchyService;

#[derive(Clone)]
pub struct AppState {
    pub service: HierarchyService,
    /// Stamped on writes from requests without an `X-Actor` header.
    pub fallback_actor: Actor,
}

pub fn create_router(service: HierarchyService, fallback_actor: Actor) -> Router {
    let api = Router::new()
        // Projects
        .route("/projects", get(handlers::list_projects))
        .route("/projects", post(handlers::create_project))
        .route("/projects/{id}", put(handlers::update_project))
        .route("/projects/{id}/tree", get(handlers::project_tree))
        .route("/projects/{id}/recalculate", post(handlers::recalculate_project))
        .route("/projects/{id}/initiatives", post(handlers::add_initiative))
        // Initiatives
        .route("/initiatives/{id}", put(handlers::update_initiative))
        .route("/initiatives/{id}/goals", post(handlers::add_goal))
        // Goals
        .route("/goals/{id}", put(handlers::update_goal))
        .route("/goals/{id}/objectives", post(handlers::add_objective))
        // Objectives
        .route("/objectives/{id}", put(handlers::update_objective))
        .route("/objectives/{id}/key-results", post(handlers::add_key_result))
        // Key results
        .route("/key-results/{id}", put(handlers::update_key_result))
        .route("/key-results/{id}/action-items", post(handlers::add_action_item))
        // Action items
        .route("/action-items/{id}", put(handlers::update_action_item))
        // Archive
        .route("/archive", get(handlers::list_archived))
        .route("/archive/restore/{kind}/{id}", post(handlers::restore))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(AppState {
            service,
            fallback_actor,
        })
}
