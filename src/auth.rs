//! Authentication provider for the Thesia backend.
//!
//! A bearer token obtained from the platform's login flow is attached to
//! every HTTP request; the real-time channel authenticates once, via a
//! `token` query parameter on the connect URL (see
//! [`ConnectionManager::connect_with_auth`](crate::ConnectionManager::connect_with_auth)).

use crate::error::Result;

/// Credentials for the Thesia backend.
///
/// # Examples
///
/// ```rust
/// use thesia_link::AuthProvider;
///
/// // Bearer token from the login flow
/// let auth = AuthProvider::bearer_token("eyJhbGc...".to_string());
///
/// // No authentication (public endpoints only)
/// let auth = AuthProvider::none();
/// ```
#[derive(Debug, Clone)]
pub enum AuthProvider {
    /// Bearer token authentication.
    BearerToken(String),

    /// No authentication.
    None,
}

impl AuthProvider {
    /// Create bearer token authentication.
    pub fn bearer_token(token: String) -> Self {
        Self::BearerToken(token)
    }

    /// No authentication.
    pub fn none() -> Self {
        Self::None
    }

    /// Attach authentication headers to an HTTP request builder.
    pub fn apply_to_request(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder> {
        match self {
            Self::BearerToken(token) => Ok(request.bearer_auth(token)),
            Self::None => Ok(request),
        }
    }

    /// The raw token, when one is configured. Used to build the
    /// authenticated WebSocket connect URL.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::BearerToken(token) => Some(token),
            Self::None => None,
        }
    }

    /// Check if authentication is configured.
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_provider_creation() {
        let bearer = AuthProvider::bearer_token("test_token".to_string());
        assert!(bearer.is_authenticated());
        assert_eq!(bearer.token(), Some("test_token"));

        let none = AuthProvider::none();
        assert!(!none.is_authenticated());
        assert!(none.token().is_none());
    }
}
