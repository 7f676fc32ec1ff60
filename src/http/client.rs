//! HTTP Client Adapter
//!
//! Single entry point for all backend traffic. Responsibilities:
//! - upgrade insecure base URLs to https (loopback hosts exempt)
//! - attach the bearer token from the persisted session
//! - on a 401, exchange the refresh token and re-issue the original
//!   request exactly once
//! - map responses into the `ApiError` taxonomy

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::Settings;
use crate::domain::auth::{AuthResponse, RefreshTokenRequest};
use crate::error::{ApiError, ApiResult};
use crate::http::session::{Session, SessionStore};

/// Request body kept in a re-issuable form so a retried request is
/// byte-identical to the original.
#[derive(Debug, Clone)]
enum RequestBody {
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

/// Adapter wrapping `reqwest::Client` with session handling.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    session: SessionStore,
}

impl HttpClient {
    pub fn new(settings: &Settings, session: SessionStore) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = secure_base_url(&settings.api_base_url)?;

        tracing::info!(base_url = %base_url, "HTTP client initialized");

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> ApiResult<R> {
        self.request(Method::GET, path, &[], None).await
    }

    pub async fn get_with_query<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> ApiResult<R> {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> ApiResult<R> {
        let body = RequestBody::Json(
            serde_json::to_value(body).map_err(|e| anyhow!("failed to serialize body: {e}"))?,
        );
        self.request(Method::POST, path, &[], Some(body)).await
    }

    /// POST with no body (e.g. restore endpoints).
    pub async fn post_empty<R: DeserializeOwned>(&self, path: &str) -> ApiResult<R> {
        self.request(Method::POST, path, &[], None).await
    }

    /// POST with form-encoded fields (the login endpoint).
    pub async fn post_form<R: DeserializeOwned>(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> ApiResult<R> {
        let body = RequestBody::Form(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> ApiResult<R> {
        let body = RequestBody::Json(
            serde_json::to_value(body).map_err(|e| anyhow!("failed to serialize body: {e}"))?,
        );
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> ApiResult<R> {
        self.request(Method::DELETE, path, &[], None).await
    }

    /// DELETE where the backend answers 204 with no body.
    pub async fn delete_no_content(&self, path: &str) -> ApiResult<()> {
        let response = self.send_with_retry(Method::DELETE, path, &[], None).await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// Probe the backend's health endpoint at the API origin.
    ///
    /// Used to warm up backends that sleep when idle.
    pub async fn health_check(&self) -> Result<()> {
        let mut url = Url::parse(&self.base_url).context("invalid base URL")?;
        url.set_path("/health");

        self.client
            .get(url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .context("Backend health check failed")?
            .error_for_status()
            .context("Backend unhealthy")?;

        Ok(())
    }

    async fn request<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<RequestBody>,
    ) -> ApiResult<R> {
        let response = self.send_with_retry(method, path, query, body).await?;
        let status = response.status();
        if status.is_success() {
            response.json::<R>().await.map_err(|e| {
                ApiError::Internal(anyhow!("invalid response body: {e}"))
            })
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// Issue the request; on a 401, refresh the token pair and re-issue
    /// once. The retry decision is local to this call, so concurrent
    /// requests cannot observe each other's retry state.
    #[instrument(skip(self, body), fields(path = path))]
    async fn send_with_retry(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<RequestBody>,
    ) -> ApiResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let access = self.session.access_token();

        let response = self
            .execute(&method, &url, query, body.as_ref(), access.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(url = %url, "received 401, exchanging refresh token");
        let access = self.refresh_session().await?;

        // A 401 on this second attempt surfaces as Unauthorized; no
        // further refresh is attempted for this request.
        self.execute(&method, &url, query, body.as_ref(), Some(&access))
            .await
    }

    async fn execute(
        &self,
        method: &Method,
        url: &str,
        query: &[(&'static str, String)],
        body: Option<&RequestBody>,
        access_token: Option<&str>,
    ) -> ApiResult<reqwest::Response> {
        let mut req = self.client.request(method.clone(), url);

        if !query.is_empty() {
            req = req.query(query);
        }

        if let Some(token) = access_token {
            req = req.bearer_auth(token);
        }

        match body {
            Some(RequestBody::Json(value)) => req = req.json(value),
            Some(RequestBody::Form(fields)) => req = req.form(fields),
            None => {}
        }

        req.send().await.map_err(|e| {
            warn!(url = %url, error = %e, "request failed");
            ApiError::Network(e)
        })
    }

    /// Exchange the stored refresh token for a new token pair.
    ///
    /// Goes out as a bare request (no bearer, no retry). Any failure here
    /// is fatal for the session: state is cleared and the caller gets
    /// `SessionExpired`.
    async fn refresh_session(&self) -> ApiResult<String> {
        let refresh_token = match self.session.refresh_token() {
            Some(token) => token,
            None => {
                self.session.clear();
                return Err(ApiError::SessionExpired);
            }
        };

        let url = format!("{}/auth/refresh", self.base_url);
        let result = self
            .client
            .post(&url)
            .json(&RefreshTokenRequest { refresh_token })
            .send()
            .await;

        let response = match result {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!(status = %r.status(), "refresh token exchange rejected");
                self.session.clear();
                return Err(ApiError::SessionExpired);
            }
            Err(e) => {
                warn!(error = %e, "refresh token exchange failed");
                self.session.clear();
                return Err(ApiError::SessionExpired);
            }
        };

        let auth: AuthResponse = match response.json().await {
            Ok(auth) => auth,
            Err(e) => {
                warn!(error = %e, "invalid refresh response");
                self.session.clear();
                return Err(ApiError::SessionExpired);
            }
        };

        self.session
            .store(Session::from_auth(&auth))
            .map_err(ApiError::Internal)?;

        debug!("session refreshed");
        Ok(auth.access_token)
    }
}

/// Map a non-success response into the error taxonomy, pulling the
/// backend's `detail` field out of the body when present.
async fn error_from_response(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let detail = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| extract_detail(&body));

    if status == StatusCode::UNAUTHORIZED {
        return ApiError::Unauthorized(
            detail.unwrap_or_else(|| "Could not validate credentials".to_string()),
        );
    }

    if status.is_client_error() {
        return ApiError::Validation {
            status: status.as_u16(),
            message: detail.unwrap_or_else(|| format!("Request rejected ({status})")),
        };
    }

    ApiError::Server {
        status: status.as_u16(),
    }
}

fn extract_detail(body: &serde_json::Value) -> Option<String> {
    match body.get("detail") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(other) if !other.is_null() => Some(other.to_string()),
        _ => None,
    }
}

/// Normalize the base URL: strip the trailing slash and force https
/// unless the host is a loopback address.
fn secure_base_url(raw: &str) -> Result<String> {
    let mut url = Url::parse(raw).with_context(|| format!("invalid API base URL: {raw}"))?;

    if url.scheme() == "http" && !is_loopback(&url) {
        url.set_scheme("https")
            .map_err(|_| anyhow!("cannot upgrade scheme for {raw}"))?;
        tracing::warn!(url = %url, "insecure API URL upgraded to https");
    }

    Ok(url.to_string().trim_end_matches('/').to_string())
}

fn is_loopback(url: &Url) -> bool {
    matches!(
        url.host_str(),
        Some("localhost") | Some("127.0.0.1") | Some("[::1]") | Some("::1")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insecure_urls_are_upgraded() {
        assert_eq!(
            secure_base_url("http://api.example.com/api/v1").unwrap(),
            "https://api.example.com/api/v1"
        );
        assert_eq!(
            secure_base_url("https://api.example.com/api/v1/").unwrap(),
            "https://api.example.com/api/v1"
        );
    }

    #[test]
    fn loopback_hosts_stay_http() {
        assert_eq!(
            secure_base_url("http://localhost:8000/api/v1").unwrap(),
            "http://localhost:8000/api/v1"
        );
        assert_eq!(
            secure_base_url("http://127.0.0.1:8000/api/v1").unwrap(),
            "http://127.0.0.1:8000/api/v1"
        );
    }

    #[test]
    fn detail_extraction_handles_shapes() {
        let body = serde_json::json!({ "detail": "Incorrect username or password" });
        assert_eq!(
            extract_detail(&body).as_deref(),
            Some("Incorrect username or password")
        );

        // FastAPI validation errors carry a structured detail array
        let body = serde_json::json!({ "detail": [{"loc": ["body", "title"], "msg": "required"}] });
        assert!(extract_detail(&body).unwrap().contains("required"));

        assert_eq!(extract_detail(&serde_json::json!({})), None);
    }
}
