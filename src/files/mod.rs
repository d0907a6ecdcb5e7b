//! API-key protected proxy in front of the remote document store.
//!
//! Runs on its own listener. Uploads are forwarded with a WebDAV `PUT` and
//! downloads are streamed back with the content type the remote reports.

mod client;
mod handlers;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};

pub use client::{RemoteObject, StorageClient};

use crate::server::log_request;

const BODY_LIMIT: usize = 110 * 1024 * 1024;

pub struct FileState {
    pub client: StorageClient,
    pub api_keys: Vec<String>,
}

pub fn create_file_router(state: Arc<FileState>) -> Router {
    Router::new()
        .route("/upload", post(handlers::upload))
        .route("/get-file", get(handlers::get_file))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::require_api_key,
        ))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use axum::{
        body::{Body, Bytes},
        extract::{Path, State},
        http::{HeaderMap, Request, StatusCode, header},
        response::{IntoResponse, Response},
        routing::put,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tower::ServiceExt;

    type Objects = Arc<Mutex<HashMap<String, (String, Vec<u8>)>>>;

    async fn remote_put(
        State(objects): State<Objects>,
        Path(path): Path<String>,
        headers: HeaderMap,
        body: Bytes,
    ) -> StatusCode {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        objects
            .lock()
            .unwrap()
            .insert(path, (content_type, body.to_vec()));
        StatusCode::CREATED
    }

    async fn remote_get(State(objects): State<Objects>, Path(path): Path<String>) -> Response {
        match objects.lock().unwrap().get(&path).cloned() {
            Some((content_type, data)) => {
                ([(header::CONTENT_TYPE, content_type)], data).into_response()
            }
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }

    /// Minimal WebDAV stand-in that keeps objects in memory.
    async fn spawn_remote() -> (String, Objects) {
        let objects: Objects = Arc::default();
        let app = Router::new()
            .route("/dav/{*path}", put(remote_put).get(remote_get))
            .with_state(objects.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), objects)
    }

    fn proxy(endpoint: &str) -> Router {
        let config = StorageConfig {
            endpoint: endpoint.to_string(),
            asset_path: "/dav/".to_string(),
            username: "svc".to_string(),
            password: "pw".to_string(),
        };
        let state = Arc::new(FileState {
            client: StorageClient::new(config).unwrap(),
            api_keys: vec!["key-1".to_string()],
        });
        create_file_router(state)
    }

    fn multipart_body(boundary: &str, file_name: &str, data: &str) -> String {
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: text/plain\r\n\r\n{data}\r\n--{boundary}--\r\n"
        )
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_and_invalid_api_key() {
        let app = proxy("http://127.0.0.1:9");

        let response = app
            .clone()
            .oneshot(
                Request::get("/get-file?path=a/b.txt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Missing API key");

        let response = app
            .oneshot(
                Request::get("/get-file?path=a/b.txt")
                    .header("X-API-KEY", "nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Invalid API key");
    }

    #[tokio::test]
    async fn test_upload_then_download() {
        let (endpoint, objects) = spawn_remote().await;
        let app = proxy(&endpoint);

        let boundary = "XBOUNDARY";
        let response = app
            .clone()
            .oneshot(
                Request::post("/upload?module=asset")
                    .header("X-API-KEY", "key-1")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(multipart_body(boundary, "note.txt", "hello")))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["file_path"], "asset/note.txt");
        assert!(objects.lock().unwrap().contains_key("asset/note.txt"));

        let response = app
            .oneshot(
                Request::get("/get-file?path=asset/note.txt")
                    .header("X-API-KEY", "key-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"hello");
    }

    #[tokio::test]
    async fn test_reserved_characters_in_file_name() {
        let (endpoint, objects) = spawn_remote().await;
        let app = proxy(&endpoint);

        let boundary = "XBOUNDARY";
        let response = app
            .clone()
            .oneshot(
                Request::post("/upload?module=asset")
                    .header("X-API-KEY", "key-1")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(multipart_body(boundary, "report#1?.pdf", "isi")))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["file_path"], "asset/report#1?.pdf");
        assert!(objects.lock().unwrap().contains_key("asset/report#1?.pdf"));

        let response = app
            .oneshot(
                Request::get("/get-file?path=asset/report%231%3F.pdf")
                    .header("X-API-KEY", "key-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"isi");
    }

    #[tokio::test]
    async fn test_unreachable_remote_is_bad_gateway() {
        // Nothing listens on the discard port.
        let app = proxy("http://127.0.0.1:9");
        let response = app
            .oneshot(
                Request::get("/get-file?path=asset/x.pdf")
                    .header("X-API-KEY", "key-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["code"], "502");
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let app = proxy("http://127.0.0.1:9");
        let response = app
            .oneshot(
                Request::get("/get-file?path=asset/../etc/passwd")
                    .header("X-API-KEY", "key-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
