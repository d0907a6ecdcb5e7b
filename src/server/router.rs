use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};

use super::api::api_router;
use crate::auth::{CredentialHasher, JwtService, require_auth};
use crate::mail::MailQueue;
use crate::service::{
    AssetService, AuthService, NotificationService, ReferenceService, SubmissionService,
    UserService,
};
use crate::store::Store;

pub struct AppState {
    pub assets: AssetService,
    pub submissions: SubmissionService,
    pub notifications: Arc<NotificationService>,
    pub users: UserService,
    pub reference: ReferenceService,
    pub auth: AuthService,
}

impl AppState {
    /// Wires every service to the same store.
    pub fn new(store: Arc<dyn Store>, jwt: JwtService, mail: MailQueue) -> Self {
        let hasher = Arc::new(CredentialHasher::new());
        Self {
            assets: AssetService::new(store.clone(), hasher.clone()),
            submissions: SubmissionService::new(store.clone(), mail),
            notifications: Arc::new(NotificationService::new(store.clone())),
            users: UserService::new(store.clone(), hasher.clone()),
            reference: ReferenceService::new(store.clone()),
            auth: AuthService::new(store, jwt, hasher),
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

pub(crate) async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
