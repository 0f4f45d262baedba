//! Main Thesia REST client with builder pattern.
//!
//! Provides the HTTP side of the notification path: fetching the current
//! user's notifications, read/delete mutations, delivery settings and the
//! admin send endpoint.

use serde::Deserialize;
use std::time::Duration;

use crate::{
    auth::AuthProvider,
    connection::websocket::resolve_ws_url,
    error::{Result, ThesiaLinkError},
    models::{Notification, NotificationSettings, SendNotificationRequest},
};

/// Main Thesia REST client.
///
/// Use [`ThesiaLinkClientBuilder`] to construct instances with custom
/// configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use thesia_link::ThesiaLinkClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ThesiaLinkClient::builder()
///     .base_url("http://localhost:8080")
///     .bearer_token("jwt-token")
///     .timeout(std::time::Duration::from_secs(30))
///     .build()?;
///
/// let notifications = client.fetch_my_notifications().await?;
/// println!("{} notification(s)", notifications.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ThesiaLinkClient {
    base_url: String,
    http_client: reqwest::Client,
    auth: AuthProvider,
    max_retries: u32,
}

/// Optional `{message}` error body the backend attaches to failures.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl ThesiaLinkClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> ThesiaLinkClientBuilder {
        ThesiaLinkClientBuilder::new()
    }

    /// The configured base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The configured credentials.
    pub fn auth(&self) -> &AuthProvider {
        &self.auth
    }

    /// The base URL resolved to a WebSocket URL (`ws://`/`wss://`), for
    /// feeding [`ConnectionManager::connect_with_auth`](crate::ConnectionManager::connect_with_auth).
    pub fn websocket_url(&self) -> String {
        resolve_ws_url(&self.base_url)
    }

    /// Fetch the current user's notifications (`GET /notifications/me`).
    pub async fn fetch_my_notifications(&self) -> Result<Vec<Notification>> {
        let url = format!("{}/notifications/me", self.base_url);
        let response = self
            .send_with_retry(|| self.http_client.get(&url))
            .await?;
        Ok(response.json().await?)
    }

    /// Mark one notification as read (`PUT /notifications/{id}/read`).
    pub async fn mark_notification_read(&self, id: i64) -> Result<()> {
        let url = format!("{}/notifications/{}/read", self.base_url, id);
        self.send_with_retry(|| self.http_client.put(&url)).await?;
        Ok(())
    }

    /// Mark every notification as read (`PUT /notifications/read-all`).
    pub async fn mark_all_notifications_read(&self) -> Result<()> {
        let url = format!("{}/notifications/read-all", self.base_url);
        self.send_with_retry(|| self.http_client.put(&url)).await?;
        Ok(())
    }

    /// Delete one notification (`DELETE /notifications/{id}`).
    pub async fn delete_notification(&self, id: i64) -> Result<()> {
        let url = format!("{}/notifications/{}", self.base_url, id);
        self.send_with_retry(|| self.http_client.delete(&url))
            .await?;
        Ok(())
    }

    /// Fetch the current user's delivery settings
    /// (`GET /notifications/settings`).
    pub async fn notification_settings(&self) -> Result<NotificationSettings> {
        let url = format!("{}/notifications/settings", self.base_url);
        let response = self
            .send_with_retry(|| self.http_client.get(&url))
            .await?;
        Ok(response.json().await?)
    }

    /// Update the current user's delivery settings
    /// (`PUT /notifications/settings`).
    pub async fn update_notification_settings(
        &self,
        settings: &NotificationSettings,
    ) -> Result<NotificationSettings> {
        let url = format!("{}/notifications/settings", self.base_url);
        let response = self
            .send_with_retry(|| self.http_client.put(&url).json(settings))
            .await?;
        Ok(response.json().await?)
    }

    /// Send a notification to a user (`POST /notifications`, admin only).
    pub async fn send_notification(
        &self,
        request: &SendNotificationRequest,
    ) -> Result<Notification> {
        let url = format!("{}/notifications", self.base_url);
        let response = self
            .send_with_retry(|| self.http_client.post(&url).json(request))
            .await?;
        Ok(response.json().await?)
    }

    /// Issue a request, retrying timeouts and connect failures up to
    /// `max_retries` with a linear sleep. Non-success statuses are mapped to
    /// [`ThesiaLinkError::ServerError`] with the optional `{message}` body.
    async fn send_with_retry<F>(&self, build: F) -> Result<reqwest::Response>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut retries = 0;
        loop {
            // Build the request fresh on each attempt (builders with bodies
            // cannot be cloned).
            let request = self.auth.apply_to_request(build())?;

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    let message = Self::error_message(response).await;
                    log::warn!(
                        "[thesia-link] Server error: status={} message=\"{}\"",
                        status,
                        message
                    );
                    return Err(ThesiaLinkError::ServerError {
                        status_code: status.as_u16(),
                        message,
                    });
                }
                Err(e) if retries < self.max_retries && Self::is_retriable(&e) => {
                    retries += 1;
                    log::warn!(
                        "[thesia-link] Retriable HTTP error (attempt {}/{}): {}",
                        retries,
                        self.max_retries + 1,
                        e
                    );
                    tokio::time::sleep(Duration::from_millis(100 * retries as u64)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Extract the error message from a failed response: the `{message}`
    /// body when present, the raw text otherwise.
    async fn error_message(response: reqwest::Response) -> String {
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => body.message,
            Err(_) if text.is_empty() => "Unknown error".to_string(),
            Err(_) => text,
        }
    }

    fn is_retriable(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }
}

/// Builder for configuring [`ThesiaLinkClient`] instances.
pub struct ThesiaLinkClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    connect_timeout: Duration,
    auth: AuthProvider,
    max_retries: u32,
}

impl ThesiaLinkClientBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            auth: AuthProvider::None,
            max_retries: 3,
        }
    }

    /// Set the base URL of the Thesia backend (required).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout for HTTP calls.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the TCP/TLS connect timeout for HTTP calls.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set bearer token authentication.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = AuthProvider::bearer_token(token.into());
        self
    }

    /// Set the authentication provider directly.
    pub fn auth(mut self, auth: AuthProvider) -> Self {
        self.auth = auth;
        self
    }

    /// Set the maximum number of retries for timed-out or unconnectable
    /// requests.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ThesiaLinkClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| ThesiaLinkError::ConfigurationError("base_url is required".into()))?;
        let base_url = base_url.trim_end_matches('/').to_string();

        // Keep-alive pooling: idle connections are reused across the
        // frequent, small notification calls.
        let http_client = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| ThesiaLinkError::ConfigurationError(e.to_string()))?;

        Ok(ThesiaLinkClient {
            base_url,
            http_client,
            auth: self.auth,
            max_retries: self.max_retries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_pattern() {
        let result = ThesiaLinkClient::builder()
            .base_url("http://localhost:8080")
            .timeout(Duration::from_secs(10))
            .bearer_token("test_token")
            .build();

        assert!(result.is_ok());
    }

    #[test]
    fn test_builder_missing_url() {
        let result = ThesiaLinkClient::builder().build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_strips_trailing_slash() {
        let client = ThesiaLinkClient::builder()
            .base_url("http://localhost:8080/")
            .build()
            .unwrap();

        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.websocket_url(), "ws://localhost:8080");
    }
}
