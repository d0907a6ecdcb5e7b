use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, Response, StatusCode, header::CONTENT_TYPE};

use crate::config::StorageConfig;
use crate::error::{Error, Result};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// A remote object whose body has not been read yet.
#[derive(Debug)]
pub struct RemoteObject {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub response: Response,
}

/// WebDAV-style client for the remote document store.
#[derive(Clone)]
pub struct StorageClient {
    client: Client,
    config: StorageConfig,
}

impl StorageClient {
    pub fn new(config: StorageConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("failed to build storage client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Stores `body` at `relative`. The remote must answer 201 Created.
    pub async fn upload(
        &self,
        relative: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<()> {
        let url = self.config.object_url(relative);
        let mut request = self
            .client
            .put(&url)
            .timeout(UPLOAD_TIMEOUT)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .body(body);
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("upload of {relative} failed: {e}")))?;

        if response.status() != StatusCode::CREATED {
            return Err(Error::Upstream(format!(
                "remote answered {} for upload of {relative}",
                response.status()
            )));
        }
        Ok(())
    }

    /// Opens `relative` for reading. The body is left on the response so the
    /// caller can stream it.
    pub async fn download(&self, relative: &str) -> Result<RemoteObject> {
        let url = self.config.object_url(relative);
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("download of {relative} failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::not_found(format!("File {relative} not found")));
        }
        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "remote answered {status} for {relative}"
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(RemoteObject {
            content_type,
            content_length: response.content_length(),
            response,
        })
    }
}
