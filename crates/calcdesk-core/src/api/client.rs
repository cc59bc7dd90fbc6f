//! API client for the calculator REST service.
//!
//! This module provides the `ApiClient` struct. Every operation is a single
//! request/response exchange routed through one request helper that attaches
//! the bearer token and unwraps the JSON body or the server's error message.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::models::{
    Calculation, CalculationUpdate, Health, LoginRequest, Message, NewCalculation, NewUser,
    PasswordChange, TokenResponse, User, UserStatistics, UserUpdate,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Server used when neither the command line, environment nor config name one
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Page size the service uses when none is given
pub const DEFAULT_HISTORY_LIMIT: u32 = 100;

/// API client for the calculator service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    token: Option<Arc<str>>,
}

impl ApiClient {
    /// Create a new API client for the given server
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(Arc::from(token.into()));
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: Arc::clone(&self.base_url),
            token: Some(Arc::from(token.into())),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a request, attaching the bearer token if one is held
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.url(path))
            .header(header::ACCEPT, "application/json");

        match self.token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Check if response is successful, returning the server's message if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!(%status, body = %ApiError::truncate_body(&body), "Request rejected");
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        path: &str,
    ) -> Result<T, ApiError> {
        let response = builder.send().await.inspect_err(|e| {
            warn!(path, error = %e, "Request failed");
        })?;
        let response = Self::check_response(response).await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            warn!(path, error = %e, "Failed to parse response");
            ApiError::InvalidResponse(format!("{}: {}", path, e))
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "GET");
        self.execute(self.request(Method::GET, path), path).await
    }

    async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!(%method, path, "Sending");
        self.execute(self.request(method, path).json(body), path).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "DELETE");
        self.execute(self.request(Method::DELETE, path), path).await
    }

    // ===== Authentication =====

    /// Exchange credentials for a bearer token
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let request = LoginRequest::new(username, password);
        request.validate()?;
        self.send(Method::POST, "/api/auth/login", &request).await
    }

    pub async fn register(&self, user: &NewUser) -> Result<User, ApiError> {
        user.validate()?;
        self.send(Method::POST, "/api/auth/register", user).await
    }

    // ===== Current user =====

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get("/api/users/me").await
    }

    pub async fn update_profile(&self, update: &UserUpdate) -> Result<User, ApiError> {
        update.validate()?;
        self.send(Method::PUT, "/api/users/me", update).await
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<Message, ApiError> {
        change.validate()?;
        self.send(Method::POST, "/api/users/me/change-password", change)
            .await
    }

    pub async fn statistics(&self) -> Result<UserStatistics, ApiError> {
        self.get("/api/users/me/statistics").await
    }

    /// Delete the account and all of its calculations
    pub async fn delete_account(&self) -> Result<Message, ApiError> {
        self.delete("/api/users/me").await
    }

    // ===== Calculations =====

    pub async fn create_calculation(&self, calc: &NewCalculation) -> Result<Calculation, ApiError> {
        calc.validate()?;
        self.send(Method::POST, "/api/calculations/", calc).await
    }

    /// List calculations, newest first
    pub async fn list_calculations(&self, skip: u32, limit: u32) -> Result<Vec<Calculation>, ApiError> {
        let path = "/api/calculations/";
        debug!(path, skip, limit, "GET");
        let builder = self
            .request(Method::GET, path)
            .query(&[("skip", skip), ("limit", limit)]);
        self.execute(builder, path).await
    }

    pub async fn get_calculation(&self, id: i64) -> Result<Calculation, ApiError> {
        self.get(&format!("/api/calculations/{}", id)).await
    }

    pub async fn update_calculation(
        &self,
        id: i64,
        update: &CalculationUpdate,
    ) -> Result<Calculation, ApiError> {
        update.validate()?;
        self.send(Method::PUT, &format!("/api/calculations/{}", id), update)
            .await
    }

    pub async fn delete_calculation(&self, id: i64) -> Result<Message, ApiError> {
        self.delete(&format!("/api/calculations/{}", id)).await
    }

    // ===== Service =====

    pub async fn health(&self) -> Result<Health, ApiError> {
        self.get("/health").await
    }
}
