//! Shared HTTP plumbing for the plain endpoints

use std::sync::Arc;

use reqwest::{RequestBuilder, Response};

use crate::auth::{StaticToken, TokenProvider};
use crate::config::Config;
use crate::error::ApiError;

/// Client for the backend's request/response endpoints
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Option<Arc<dyn TokenProvider>>,
}

impl ApiClient {
    /// Build a client from configuration, using the configured token if any
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let tokens = config
            .api_token
            .clone()
            .map(|token| Arc::new(StaticToken::new(token)) as Arc<dyn TokenProvider>);
        Self::with_token_provider(config, tokens)
    }

    pub fn with_token_provider(
        config: &Config,
        tokens: Option<Arc<dyn TokenProvider>>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.base().to_string(),
            tokens,
        })
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.url(path))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach a bearer token; the authenticated endpoints refuse without one
    pub(crate) async fn authed(
        &self,
        request: RequestBuilder,
    ) -> Result<RequestBuilder, ApiError> {
        let tokens = self.tokens.as_ref().ok_or(ApiError::NotAuthenticated)?;
        let token = tokens.bearer_token().await.map_err(ApiError::Auth)?;
        Ok(request.bearer_auth(token))
    }

    /// Map a non-OK status to an error before touching the body
    pub(crate) fn handle_error_response(&self, response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(ApiError::Status(response.status()))
        }
    }
}
