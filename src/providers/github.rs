// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! Upstream GitHub OAuth client.
//!
//! GitHub is the upstream assertion provider: a returned account is
//! trusted only when its numeric id equals the pre-registered one. That
//! comparison happens at the callback handler; this client only moves
//! bytes.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const USER_URL: &str = "https://api.github.com/user";
const OAUTH_SCOPE: &str = "user:email read:user";
const USER_AGENT: &str = "bridgeworld-idp";

#[derive(Debug, thiserror::Error)]
pub enum GithubError {
    #[error("GitHub request failed: {0}")]
    Request(String),

    /// Token exchange returned no access token.
    #[error("GitHub auth failed: {0}")]
    AuthFailed(String),
}

#[derive(Debug, Deserialize)]
pub struct GithubUser {
    pub id: u64,
    pub login: String,
}

#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Build the upstream authorize URL. The pending id rides in `state` so
/// the callback can correlate the original relying-party request.
pub fn authorize_url(client_id: &str, issuer: &str, pending_id: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", &format!("{issuer}/oauth/github-callback"))
        .append_pair("scope", OAUTH_SCOPE)
        .append_pair("state", pending_id)
        .finish();
    format!("{AUTHORIZE_URL}?{query}")
}

/// Exchange an upstream authorization code for an access token.
pub async fn exchange_code(
    http: &Client,
    client_id: &str,
    client_secret: &str,
    code: &str,
) -> Result<String, GithubError> {
    let response = http
        .post(TOKEN_URL)
        .header("Accept", "application/json")
        .json(&json!({
            "client_id": client_id,
            "client_secret": client_secret,
            "code": code,
        }))
        .send()
        .await
        .map_err(|e| GithubError::Request(e.to_string()))?;

    let body: TokenExchangeResponse = response
        .json()
        .await
        .map_err(|e| GithubError::Request(e.to_string()))?;

    body.access_token.ok_or_else(|| {
        GithubError::AuthFailed(
            body.error_description
                .or(body.error)
                .unwrap_or_else(|| "no access token in response".to_string()),
        )
    })
}

/// Fetch the authenticated account's profile.
pub async fn fetch_user(http: &Client, access_token: &str) -> Result<GithubUser, GithubError> {
    let response = http
        .get(USER_URL)
        .header("Authorization", format!("Bearer {access_token}"))
        .header("User-Agent", USER_AGENT)
        .send()
        .await
        .map_err(|e| GithubError::Request(e.to_string()))?;

    response
        .json()
        .await
        .map_err(|e| GithubError::Request(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_carries_pending_id_as_state() {
        let url = authorize_url("app-id", "https://idp.test", "pending-123");
        assert!(url.starts_with("https://github.com/login/oauth/authorize?"));
        assert!(url.contains("client_id=app-id"));
        assert!(url.contains("state=pending-123"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fidp.test%2Foauth%2Fgithub-callback"));
        assert!(url.contains("scope=user%3Aemail+read%3Auser"));
    }
}
