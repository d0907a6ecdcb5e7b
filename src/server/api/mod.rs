mod assets;
mod auth;
mod notifications;
mod reference;
mod submissions;
mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::server::AppState;

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Auth routes
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/reset-password", post(auth::reset_password))
        // Asset routes
        .route("/assets", post(assets::create_asset).get(assets::list_assets))
        .route("/assets/by-hash", get(assets::get_asset_by_hash))
        .route(
            "/assets/{id}",
            get(assets::get_asset)
                .put(assets::update_asset)
                .delete(assets::delete_asset),
        )
        .route("/assets/{id}/status", put(assets::update_asset_status))
        .route("/assets/{id}/history", get(assets::list_asset_history))
        // Submission routes
        .route(
            "/submissions",
            post(submissions::create_submission).get(submissions::list_submissions),
        )
        .route("/submissions/{id}", get(submissions::get_submission))
        .route(
            "/submissions/{id}/status",
            put(submissions::update_submission_status),
        )
        .route(
            "/submission-parents",
            post(submissions::create_submission_parent).get(submissions::list_submission_parents),
        )
        // Notification routes
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/sweep", post(notifications::sweep_notifications))
        .route("/notifications/{id}", get(notifications::get_notification))
        // User routes
        .route("/users", post(users::create_user).get(users::list_users))
        .route(
            "/users/{nip}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // Reference data routes
        .route(
            "/areas",
            get(reference::list_areas).post(reference::create_area),
        )
        .route(
            "/outlets",
            get(reference::list_outlets).post(reference::create_outlet),
        )
        .route("/roles", get(reference::list_roles))
        .route(
            "/positions",
            get(reference::list_positions).post(reference::create_position),
        )
        .route(
            "/personal-responsibles",
            get(reference::list_personal_responsibles)
                .post(reference::create_personal_responsible),
        )
        .route(
            "/maintenance-periods",
            get(reference::list_maintenance_periods).post(reference::create_maintenance_period),
        )
        .route(
            "/classifications",
            get(reference::list_classifications).post(reference::create_classification),
        )
        .route("/classifications/{id}", get(reference::get_classification))
}
