//! Shared harness for driving the REST router in-process.

#![allow(dead_code)]

use std::sync::Arc;

use assetman::auth::{CredentialHasher, JwtService};
use assetman::mail::{MailMessage, MailQueue};
use assetman::server::{AppState, create_router};
use assetman::store::{SqliteStore, Store};
use assetman::types::{KnownRole, NewClassification, User};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;
use tower::ServiceExt;

pub const ADMIN_NIP: &str = "1001";
pub const ADMIN_PASSWORD: &str = "rahasia";

pub struct TestApp {
    _temp: TempDir,
    pub store: Arc<dyn Store>,
    pub router: Router,
    pub mail: UnboundedReceiver<MailMessage>,
}

impl TestApp {
    /// A fresh database with the default roles and one administrator.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("failed to create temp dir");
        let store = SqliteStore::new(temp.path().join("assetman.db")).expect("open store");
        store.initialize().expect("initialize store");
        let store: Arc<dyn Store> = Arc::new(store);

        let hasher = CredentialHasher::new();
        store
            .create_user(&User {
                nip: ADMIN_NIP.to_string(),
                user_full_name: "Admin Utama".to_string(),
                user_email: "admin@example.com".to_string(),
                user_password: hasher.hash(ADMIN_PASSWORD).expect("hash password"),
                role_id: KnownRole::Administrator.id(),
                area_id: None,
                outlet_id: None,
            })
            .expect("seed admin");

        let (queue, mail) = MailQueue::channel();
        let state = Arc::new(AppState::new(
            store.clone(),
            JwtService::new("integration-secret"),
            queue,
        ));

        Self {
            _temp: temp,
            store,
            router: create_router(state),
            mail,
        }
    }

    /// Creates a maintenance period and a classification, returning the
    /// classification id.
    pub fn seed_classification(&self, economic_value: i64, months: u32) -> i64 {
        let period = self
            .store
            .create_maintenance_period(&format!("{months} Bulan"), months)
            .expect("create period");
        self.store
            .create_classification(&NewClassification {
                classification_name: "Elektronik".to_string(),
                classification_economic_value: economic_value,
                maintenance_period_id: Some(period.period_id),
                asset_healthy_param: None,
            })
            .expect("create classification")
            .classification_id
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).to_string())
            })
        };
        (status, json)
    }

    pub async fn login(&self, nip: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/auth/login",
                None,
                Some(serde_json::json!({ "nip": nip, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_NIP, ADMIN_PASSWORD).await
    }
}
