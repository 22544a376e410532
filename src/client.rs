use std::sync::Arc;

use log::{debug, error, log_enabled, Level};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::{
    Clock, SystemClock, Token, TokenRequest, TokenResponse, BOOTSTRAP_AUTHORIZATION,
    CLIENT_IDENTIFIER, TOKEN_ENDPOINT,
};
use crate::error::{Error, Result};
use crate::redact::mask_sensitive_payload;
use crate::types::{BreweryOverview, Session};

pub const DEFAULT_BASE_URL: &str = "https://api.minibrew.io";

const CLIENT_HEADER: &str = "client";

/// Client for the MiniBrew brewery portal API.
///
/// Holds the credentials and the cached bearer token. Any authenticated call
/// renews the token first when it is missing or expired.
pub struct MinibrewClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    headers: HeaderMap,
    token: Option<Token>,
    clock: Arc<dyn Clock>,
}

impl MinibrewClient {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::new_with_base_url(username, password, DEFAULT_BASE_URL)
    }

    pub fn new_with_base_url(
        username: impl Into<String>,
        password: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(CLIENT_HEADER),
            HeaderValue::from_static(CLIENT_IDENTIFIER),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
            headers,
            token: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for token expiry checks
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Headers sent with authenticated requests
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn auth_header(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
    }

    /// Seed the client with a token obtained earlier
    pub fn set_token(&mut self, token: Token) -> Result<()> {
        let bearer = HeaderValue::from_str(&token.bearer())?;
        self.headers.insert(AUTHORIZATION, bearer);
        self.token = Some(token);
        Ok(())
    }

    pub fn is_token_valid(&self) -> bool {
        match &self.token {
            Some(token) if token.is_valid_at(self.clock.now()) => true,
            _ => {
                debug!("Token is missing or expired");
                false
            }
        }
    }

    /// Exchange the credentials for a fresh token and cache it
    pub async fn fetch_token(&mut self) -> Result<TokenResponse> {
        debug!("Fetching new token for {}", self.username);

        let mut token_headers = self.headers.clone();
        token_headers.insert(
            AUTHORIZATION,
            HeaderValue::from_static(BOOTSTRAP_AUTHORIZATION),
        );

        let request = serde_json::to_value(TokenRequest {
            email: self.username.clone(),
            password: self.password.clone(),
        })?;

        let response = match self
            .post(TOKEN_ENDPOINT, None, Some(&request), Some(token_headers))
            .await
        {
            Ok(response) => response,
            Err(Error::Request { status, body, .. }) => {
                error!("Authentication failed with status: {}", status);
                return Err(Error::Auth { status, body });
            }
            Err(e) => return Err(e),
        };

        let token_response: TokenResponse = decode(response).await?;
        let token = Token::from_response(&token_response, self.clock.now())?;
        self.set_token(token)?;

        debug!("Token obtained, valid for {} seconds", token_response.exp);
        Ok(token_response)
    }

    /// Make sure a non-expired token is attached to the default headers
    pub async fn ensure_valid_token(&mut self) -> Result<()> {
        debug!("Ensuring token is valid");
        if !self.is_token_valid() {
            self.fetch_token().await?;
        }
        Ok(())
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}/", self.base_url, endpoint.trim_matches('/'))
    }

    /// Authenticated GET against `endpoint`, renewing the token if needed
    pub async fn get(
        &mut self,
        endpoint: &str,
        params: Option<&[(&str, &str)]>,
    ) -> Result<reqwest::Response> {
        self.ensure_valid_token().await?;
        self.get_without_token_check(endpoint, params).await
    }

    /// GET against `endpoint` with whatever headers are currently set
    pub async fn get_without_token_check(
        &self,
        endpoint: &str,
        params: Option<&[(&str, &str)]>,
    ) -> Result<reqwest::Response> {
        debug!("GET request to {} with params: {:?}", endpoint, params);

        let mut request = self
            .client
            .get(self.url(endpoint))
            .headers(self.headers.clone());
        if let Some(params) = params {
            request = request.query(params);
        }

        check_status(request.send().await?).await
    }

    /// POST to `endpoint`. Never touches the token, so it also serves the token
    /// endpoint itself. When both bodies are given only `json` is sent and
    /// `data` is ignored.
    pub async fn post(
        &self,
        endpoint: &str,
        data: Option<&Value>,
        json: Option<&Value>,
        headers: Option<HeaderMap>,
    ) -> Result<reqwest::Response> {
        if log_enabled!(Level::Debug) {
            debug!("{}", describe_post(endpoint, data, json));
        }

        let mut headers = headers.unwrap_or_else(|| self.headers.clone());
        let request = self.client.post(self.url(endpoint));
        let request = match (json, data) {
            (Some(json), _) => request.headers(headers).json(json),
            (None, Some(data)) => {
                // let reqwest set the form content type
                headers.remove(CONTENT_TYPE);
                request.headers(headers).form(data)
            }
            (None, None) => request.headers(headers),
        };

        check_status(request.send().await?).await
    }

    pub async fn get_brewery_overview(&mut self) -> Result<BreweryOverview> {
        debug!("Fetching brewery overview");
        let response = self.get("v1/breweryoverview", None).await?;
        let overview: BreweryOverview = decode(response).await?;
        debug!(
            "Overview: {} brew/clean idle, {} fermenting, {} serving, {} acid clean idle",
            overview.brew_clean_idle.len(),
            overview.fermenting.len(),
            overview.serving.len(),
            overview.brew_acid_clean_idle.len()
        );
        Ok(overview)
    }

    pub async fn get_session_info(&mut self, session_id: i64) -> Result<Session> {
        debug!("Fetching session info for session ID: {}", session_id);
        let response = self
            .get(&format!("v1/sessions/{}", session_id), None)
            .await?;
        decode(response).await
    }
}

/// Log line for a POST, with credentials masked in both bodies
fn describe_post(endpoint: &str, data: Option<&Value>, json: Option<&Value>) -> String {
    format!(
        "POST request to {} with data: {:?}, json: {:?}",
        endpoint,
        data.map(mask_sensitive_payload),
        json.map(mask_sensitive_payload)
    )
}

/// Turn a non-success response into `Error::Request` without reading it as JSON
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    error!("Request to {} failed with status {}: {}", url, status, body);
    Err(Error::Request { status, url, body })
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let response_text = response.text().await?;
    match serde_json::from_str::<T>(&response_text) {
        Ok(value) => Ok(value),
        Err(e) => {
            error!("Failed to decode response: {}", e);
            debug!("Raw response: {}", response_text);
            Err(Error::Decode(e))
        }
    }
}
