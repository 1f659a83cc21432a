//! Route definitions for the Warehouse ROI platform

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Question catalogue (public)
        .route("/questions", get(handlers::list_questions))
        // Auth routes
        .nest("/auth", auth_routes(state.clone()))
        // Protected routes - company management
        .nest("/companies", company_routes(state.clone()))
        // Protected routes - questionnaire answers
        .nest("/questionnaire", questionnaire_routes(state.clone()))
        // Protected routes - ROI calculator
        .nest("/roi", roi_routes(state.clone()))
        // Protected routes - data file transfer
        .merge(transfer_routes(state))
}

/// Authentication routes; only login is public
fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::me))
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/users/:user_id", delete(handlers::delete_user))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        .route("/login", post(handlers::login))
}

/// Company routes (protected)
fn company_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_companies).post(handlers::create_company),
        )
        .route(
            "/:company_id",
            get(handlers::get_company)
                .put(handlers::update_company)
                .delete(handlers::delete_company),
        )
        .route(
            "/:company_id/data",
            get(handlers::get_company_data).post(handlers::save_company_data),
        )
        .route("/:company_id/roi", get(handlers::company_roi))
        .route("/:company_id/roi/export", get(handlers::export_company_roi))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Questionnaire routes (protected)
fn questionnaire_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/:company_id",
            get(handlers::get_answers).post(handlers::save_answers),
        )
        .route("/:company_id/export", get(handlers::export_questionnaire))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// ROI calculator routes (protected)
fn roi_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/calculate", post(handlers::calculate))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Export/import routes (protected)
fn transfer_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/export", get(handlers::export_data))
        .route("/import", post(handlers::import_data))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
