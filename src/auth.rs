//! Signed-in identity and the OAuth callback redirect
//!
//! The provider flow itself happens elsewhere; this module only models the
//! identity it hands back and where the callback sends the browser next.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::error::{CifraError, CifraResult};
use crate::models::profile::DEFAULT_PROFILE_NAME;
use crate::models::UserId;

/// An authenticated user as issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    /// Provider metadata (`full_name`, `name`, `avatar_url`, `picture`, ...)
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Identity {
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Add a metadata entry; blank values are ignored
    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.metadata.insert(key.to_string(), value);
        }
        self
    }

    fn meta(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// `full_name`, then `name`, then "Usuario"
    pub fn display_name(&self) -> String {
        self.meta("full_name")
            .or_else(|| self.meta("name"))
            .unwrap_or(DEFAULT_PROFILE_NAME)
            .to_string()
    }

    /// `avatar_url`, then `picture`
    pub fn avatar_url(&self) -> Option<&str> {
        self.meta("avatar_url").or_else(|| self.meta("picture"))
    }
}

/// Failure reported by the provider when trading a code for a session
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ExchangeError {
    pub message: String,
}

impl ExchangeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Trades an authorization code for a session
pub trait CodeExchange {
    fn exchange_code_for_session(&self, code: &str) -> Result<Identity, ExchangeError>;
}

/// Where the callback sends the browser, and who signed in if anyone did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackOutcome {
    pub redirect: String,
    pub identity: Option<Identity>,
}

/// The origin to redirect to: the configured site URL wins over the
/// origin the request came in on.
pub fn resolve_origin(request_origin: &str, site_url: Option<&str>) -> String {
    let origin = site_url
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(request_origin);
    origin.trim_end_matches('/').to_string()
}

/// Decide the redirect for an OAuth callback request
///
/// - no `code` parameter: `{origin}/`
/// - exchange failure: `{request origin}/auth-error?error=<message>`
/// - success: `{origin}/?auth=success`
pub fn callback_redirect(
    request_url: &str,
    site_url: Option<&str>,
    exchanger: &dyn CodeExchange,
) -> CifraResult<CallbackOutcome> {
    let url = Url::parse(request_url)
        .map_err(|e| CifraError::Validation(format!("Invalid callback URL '{}': {}", request_url, e)))?;

    let request_origin = url.origin().ascii_serialization();
    let origin = resolve_origin(&request_origin, site_url);

    let code = url
        .query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .filter(|c| !c.is_empty());

    let Some(code) = code else {
        tracing::debug!(%origin, "callback without code");
        return Ok(CallbackOutcome {
            redirect: format!("{}/", origin),
            identity: None,
        });
    };

    match exchanger.exchange_code_for_session(&code) {
        Ok(identity) => Ok(CallbackOutcome {
            redirect: format!("{}/?auth=success", origin),
            identity: Some(identity),
        }),
        Err(e) => {
            tracing::warn!(error = %e, "code exchange failed");
            Ok(CallbackOutcome {
                redirect: format!(
                    "{}/auth-error?error={}",
                    request_origin,
                    urlencoding::encode(&e.message)
                ),
                identity: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Accepting;

    impl CodeExchange for Accepting {
        fn exchange_code_for_session(&self, _code: &str) -> Result<Identity, ExchangeError> {
            Ok(Identity::new(UserId::new(), "ana@example.com"))
        }
    }

    struct Rejecting;

    impl CodeExchange for Rejecting {
        fn exchange_code_for_session(&self, _code: &str) -> Result<Identity, ExchangeError> {
            Err(ExchangeError::new("invalid grant & expired"))
        }
    }

    #[test]
    fn test_display_name_fallbacks() {
        let base = Identity::new(UserId::new(), "ana@example.com");
        assert_eq!(base.display_name(), "Usuario");

        let named = base.clone().with_metadata("name", "Ana");
        assert_eq!(named.display_name(), "Ana");

        let full = named.with_metadata("full_name", "Ana Pérez");
        assert_eq!(full.display_name(), "Ana Pérez");
    }

    #[test]
    fn test_avatar_fallbacks() {
        let identity = Identity::new(UserId::new(), "ana@example.com");
        assert_eq!(identity.avatar_url(), None);

        let identity = identity.with_metadata("picture", "https://img/p.png");
        assert_eq!(identity.avatar_url(), Some("https://img/p.png"));

        let identity = identity.with_metadata("avatar_url", "https://img/a.png");
        assert_eq!(identity.avatar_url(), Some("https://img/a.png"));
    }

    #[test]
    fn test_resolve_origin() {
        assert_eq!(
            resolve_origin("http://localhost:3000", Some("https://cifrafinance.app/")),
            "https://cifrafinance.app"
        );
        assert_eq!(resolve_origin("http://localhost:3000", None), "http://localhost:3000");
        assert_eq!(resolve_origin("http://localhost:3000", Some("  ")), "http://localhost:3000");
    }

    #[test]
    fn test_callback_without_code() {
        let outcome =
            callback_redirect("http://localhost:3000/auth/callback", None, &Accepting).unwrap();
        assert_eq!(outcome.redirect, "http://localhost:3000/");
        assert!(outcome.identity.is_none());
    }

    #[test]
    fn test_callback_success_uses_site_url() {
        let outcome = callback_redirect(
            "http://internal:8080/auth/callback?code=abc",
            Some("https://cifrafinance.app"),
            &Accepting,
        )
        .unwrap();
        assert_eq!(outcome.redirect, "https://cifrafinance.app/?auth=success");
        assert!(outcome.identity.is_some());
    }

    #[test]
    fn test_callback_failure_uses_request_origin() {
        let outcome = callback_redirect(
            "http://internal:8080/auth/callback?code=abc",
            Some("https://cifrafinance.app"),
            &Rejecting,
        )
        .unwrap();
        assert_eq!(
            outcome.redirect,
            "http://internal:8080/auth-error?error=invalid%20grant%20%26%20expired"
        );
    }

    #[test]
    fn test_invalid_callback_url() {
        assert!(callback_redirect("not a url", None, &Accepting).is_err());
    }
}
