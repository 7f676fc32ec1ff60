//! Authentication resource client
//!
//! Login and signup persist the returned token pair and user into the
//! session store; logout and failed refresh exchanges are the only paths
//! that clear it.

use tracing::instrument;

use crate::domain::auth::{AuthResponse, SignupRequest, User};
use crate::error::{ApiError, ApiResult};
use crate::http::{HttpClient, Session};

#[derive(Clone)]
pub struct AuthApi {
    http: HttpClient,
}

impl AuthApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// POST /auth/login (form-encoded username/password).
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<AuthResponse> {
        let auth: AuthResponse = self
            .http
            .post_form("/auth/login", &[("username", username), ("password", password)])
            .await?;

        self.http
            .session()
            .store(Session::from_auth(&auth))
            .map_err(ApiError::Internal)?;

        Ok(auth)
    }

    /// POST /auth/signup (JSON body).
    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn signup(&self, req: &SignupRequest) -> ApiResult<AuthResponse> {
        let auth: AuthResponse = self.http.post("/auth/signup", req).await?;

        self.http
            .session()
            .store(Session::from_auth(&auth))
            .map_err(ApiError::Internal)?;

        Ok(auth)
    }

    /// GET /auth/me, the authoritative current user.
    pub async fn me(&self) -> ApiResult<User> {
        self.http.get("/auth/me").await
    }

    pub fn logout(&self) {
        self.http.session().clear();
    }

    /// User as persisted at last login/refresh, without a network call.
    pub fn current_user(&self) -> Option<User> {
        self.http.session().user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.http.session().is_authenticated()
    }
}
