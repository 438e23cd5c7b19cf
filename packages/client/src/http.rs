//! REST implementation of [`PageApi`] over `reqwest`

use pagecraft_blocks::{LandingPage, PageContent, UuidIds};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::api::{CheckoutRequest, CopyRequest, PageApi, SaveVersionRequest, SnapshotRef, VersionSnapshot};
use crate::error::ApiError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct TextResponse {
    text: String,
}

#[derive(Deserialize)]
struct UrlResponse {
    url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplyVersionBody<'a> {
    snapshot_payload: &'a PageContent,
}

/// Page backend reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpPageApi {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpPageApi {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL extended by percent-encoded path segments
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "Page API request");
        let request = self.client.request(method, url);
        Ok(match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(response.url().path().to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

impl PageApi for HttpPageApi {
    async fn get_landing_page(&self, owner: &str) -> Result<LandingPage, ApiError> {
        let request = self.request(Method::GET, &["landing-pages", owner])?;
        let value: Value = Self::send(request).await?.json().await?;
        Ok(LandingPage::from_value(value, &mut UuidIds)?)
    }

    async fn put_landing_page(&self, page: &LandingPage) -> Result<(), ApiError> {
        let request = self.request(Method::PUT, &["landing-pages", &page.id])?.json(page);
        Self::send(request).await?;
        Ok(())
    }

    async fn save_version(&self, page_id: &str, request: &SaveVersionRequest) -> Result<SnapshotRef, ApiError> {
        let request = self
            .request(Method::POST, &["landing-pages", page_id, "versions"])?
            .json(request);
        Ok(Self::send(request).await?.json().await?)
    }

    async fn list_versions(&self, page_id: &str) -> Result<Vec<SnapshotRef>, ApiError> {
        let request = self.request(Method::GET, &["landing-pages", page_id, "versions"])?;
        Ok(Self::send(request).await?.json().await?)
    }

    async fn fetch_version_payload(&self, version_id: &str) -> Result<PageContent, ApiError> {
        let request = self.request(Method::GET, &["versions", version_id])?;
        let snapshot: VersionSnapshot = Self::send(request).await?.json().await?;
        Ok(snapshot.snapshot_payload)
    }

    async fn apply_version(&self, page_id: &str, payload: &PageContent) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, &["landing-pages", page_id, "apply-version"])?
            .json(&ApplyVersionBody {
                snapshot_payload: payload,
            });
        Self::send(request).await?;
        Ok(())
    }

    async fn delete_version(&self, version_id: &str) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &["versions", version_id])?;
        Self::send(request).await?;
        Ok(())
    }

    async fn generate_copy(&self, request: &CopyRequest) -> Result<String, ApiError> {
        let request = self.request(Method::POST, &["ai", "copy"])?.json(request);
        let body: TextResponse = Self::send(request).await?.json().await?;
        Ok(body.text)
    }

    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<String, ApiError> {
        let request = self.request(Method::POST, &["checkout", "sessions"])?.json(request);
        let body: UrlResponse = Self::send(request).await?.json().await?;
        Ok(body.url)
    }

    async fn upload_asset(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ApiError> {
        let request = self
            .request(Method::POST, &["uploads"])?
            .query(&[("fileName", file_name)])
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes);
        let body: UrlResponse = Self::send(request).await?.json().await?;
        Ok(body.url)
    }
}
