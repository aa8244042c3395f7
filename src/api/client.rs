//! HTTP client for the DermX backend.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use tracing::{debug, instrument};

use super::types::{
    AnalyzeResponse, DiagnosisResult, LoginRequest, LoginResponse, PhotoUpdateRequest,
    PhotoUpdateResponse, Profile, SignupCompleteRequest,
};
use crate::diagnosis::ImageFile;
use crate::error::DermxError;
use crate::Result;

/// Default hosted backend origin.
pub const DEFAULT_BASE_URL: &str = "https://derm-x-ai-backend.onrender.com/";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin typed wrapper over the backend REST endpoints.
///
/// Cloning is cheap; clones share the underlying connection pool. Nothing
/// here retries, deduplicates or cancels: each call is one request.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base: Url,
}

impl BackendClient {
    /// Create a client for the given base URL with the default timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = normalize_base(base_url)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dermx-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, base })
    }

    /// The normalized base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| DermxError::InvalidUrl(format!("{}{}: {}", self.base, path, e)))
    }

    /// Tell the backend that an identity provider sign-in completed.
    #[instrument(skip_all, fields(google_id = %payload.google_id))]
    pub async fn signup_complete(&self, payload: &SignupCompleteRequest) -> Result<()> {
        let resp = self
            .http
            .post(self.endpoint("api/auth/signup-complete")?)
            .json(payload)
            .send()
            .await?;
        ensure_success(resp, "sync signup").await?;
        Ok(())
    }

    /// Exchange email and password for a bearer token.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginRequest<'_>) -> Result<LoginResponse> {
        let resp = self
            .http
            .post(self.endpoint("api/auth/login")?)
            .json(credentials)
            .send()
            .await?;
        let resp = ensure_success(resp, "login").await?;
        Ok(resp.json().await?)
    }

    /// Fetch the profile of the token's owner.
    #[instrument(skip_all)]
    pub async fn fetch_profile(&self, token: &str) -> Result<Profile> {
        let resp = self
            .http
            .get(self.endpoint("api/users/profile")?)
            .bearer_auth(token)
            .send()
            .await?;
        let resp = ensure_success(resp, "fetch profile").await?;
        Ok(resp.json().await?)
    }

    /// Delete the token owner's account.
    #[instrument(skip_all)]
    pub async fn delete_account(&self, token: &str) -> Result<()> {
        let resp = self
            .http
            .delete(self.endpoint("api/users/account")?)
            .bearer_auth(token)
            .send()
            .await?;
        ensure_success(resp, "delete account").await?;
        Ok(())
    }

    /// Set the token owner's profile photo. Returns the stored URL.
    #[instrument(skip_all, fields(photo_url = %photo_url))]
    pub async fn upload_profile_photo(&self, token: &str, photo_url: &str) -> Result<String> {
        let resp = self
            .http
            .post(self.endpoint("api/users/profile/photo")?)
            .bearer_auth(token)
            .json(&PhotoUpdateRequest { photo_url })
            .send()
            .await?;
        let resp = ensure_success(resp, "update profile photo").await?;
        let body: PhotoUpdateResponse = resp.json().await?;
        Ok(body.photo_url)
    }

    /// Upload an image for diagnosis.
    ///
    /// The token is optional; anonymous analysis is allowed by the backend.
    #[instrument(skip_all, fields(image = %image.name(), bytes = image.len()))]
    pub async fn analyze_image(
        &self,
        image: &ImageFile,
        token: Option<&str>,
    ) -> Result<DiagnosisResult> {
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.name().to_string())
            .mime_str(image.mime())?;
        let form = Form::new().part("image", part);

        let mut request = self
            .http
            .post(self.endpoint("api/diagnosis/analyze")?)
            .multipart(form);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = if text.trim().is_empty() {
                format!("Request failed with status {}", status.as_u16())
            } else {
                text
            };
            return Err(DermxError::AnalysisFailed(message));
        }

        let body: AnalyzeResponse = resp.json().await?;
        debug!(condition = %body.result.condition, "analysis complete");
        Ok(body.result)
    }
}

async fn ensure_success(resp: Response, operation: &'static str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    debug!(operation, status = status.as_u16(), "backend rejected request");
    Err(DermxError::Rejected {
        operation,
        status: status.as_u16(),
    })
}

/// Parse a base URL and make sure relative joins land under its path.
fn normalize_base(base_url: &str) -> Result<Url> {
    let mut url =
        Url::parse(base_url).map_err(|e| DermxError::InvalidUrl(format!("{}: {}", base_url, e)))?;
    if url.cannot_be_a_base() {
        return Err(DermxError::InvalidUrl(base_url.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
