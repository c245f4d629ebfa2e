// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! OAuth 2.0 / OIDC protocol endpoints.
//!
//! The gateway never authenticates arbitrary users. `authorize` parks the
//! relying party's request, sends the caller to GitHub, and the callback
//! accepts the assertion only when the returned account is the
//! pre-registered one. Every token issued afterwards describes the
//! canonical identity.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    auth::{
        self, get_cookie, session::ACCESS_COOKIE, session_cookie_header, verify_access_jwt,
        SESSION_COOKIE,
    },
    config::{CODE_TTL_SECS, GITHUB_CLIENT_SECRET_ENV, PENDING_TTL_SECS, SESSION_TTL_SECS},
    error::ApiError,
    models::{AuthorizationCodeRecord, IdpSessionRecord, PendingAuthorizationRequest, TokenResponse},
    providers::github,
    state::AppState,
    store::{code_key, pending_key, session_key, token_key},
};

const TOKEN_SCOPE: &str = "openid profile email groups web3";

/// A `302 Found` redirect. Downstream OAuth clients expect 302 exactly,
/// so the status is set by hand instead of through `axum::response::Redirect`
/// (which issues 303/307/308).
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

fn found_with_session(location: &str, session_id: &str) -> Response {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, location.to_string()),
            (header::SET_COOKIE, session_cookie_header(session_id)),
        ],
    )
        .into_response()
}

/// Append `code` (and `state` when present) to the relying party's
/// redirect URI.
fn code_redirect(redirect_uri: &str, code: &str, state: Option<&str>) -> Result<String, ApiError> {
    let mut url = url::Url::parse(redirect_uri)
        .map_err(|_| ApiError::invalid_request("redirect_uri is not a valid URL"))?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("code", code);
        if let Some(state) = state {
            pairs.append_pair("state", state);
        }
    }
    Ok(url.into())
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AuthorizeParams {
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub state: Option<String>,
    pub nonce: Option<String>,
    pub scope: Option<String>,
    pub response_type: Option<String>,
}

#[utoipa::path(
    get,
    path = "/oauth/authorize",
    params(AuthorizeParams),
    tag = "OAuth",
    responses(
        (status = 302, description = "Redirect with authorization code, or to upstream auth"),
        (status = 400, description = "Missing redirect_uri"),
    )
)]
pub async fn authorize(
    State(state): State<AppState>,
    Query(params): Query<AuthorizeParams>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let redirect_uri = params
        .redirect_uri
        .ok_or_else(|| ApiError::invalid_request("redirect_uri required"))?;
    let scope = params.scope.unwrap_or_else(|| "openid".to_string());

    // A session is proven either by an edge access-layer JWT or by our
    // own cookie backed by a live store record.
    let mut verified = false;
    if let Some(access_jwt) = get_cookie(&headers, ACCESS_COOKIE) {
        verified = verify_access_jwt(&access_jwt, &state.identity, &state.config.access_team);
    }
    if !verified {
        if let Some(session_id) = get_cookie(&headers, SESSION_COOKIE) {
            verified = state.store.contains(&session_key(&session_id)).await;
        }
    }

    if !verified {
        // Park the request and bounce to GitHub; the pending id rides as
        // the upstream `state` parameter.
        let pending_id = Uuid::new_v4().to_string();
        state
            .store
            .put(
                &pending_key(&pending_id),
                &PendingAuthorizationRequest {
                    client_id: params.client_id,
                    redirect_uri,
                    state: params.state,
                    nonce: params.nonce,
                    scope,
                },
                PENDING_TTL_SECS,
            )
            .await;

        let upstream = github::authorize_url(
            &state.config.github_client_id,
            &state.config.issuer,
            &pending_id,
        );
        tracing::info!(pending_id, "no session, redirecting to upstream auth");
        return Ok(found(&upstream));
    }

    let code = Uuid::new_v4().to_string();
    state
        .store
        .put(
            &code_key(&code),
            &AuthorizationCodeRecord {
                client_id: params.client_id,
                redirect_uri: redirect_uri.clone(),
                nonce: params.nonce,
                scope,
                created: Utc::now().timestamp_millis(),
            },
            CODE_TTL_SECS,
        )
        .await;

    let location = code_redirect(&redirect_uri, &code, params.state.as_deref())?;
    Ok(found(&location))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

#[utoipa::path(
    get,
    path = "/oauth/github-callback",
    params(CallbackParams),
    tag = "OAuth",
    responses(
        (status = 302, description = "Session established; flow resumed"),
        (status = 401, description = "Upstream token exchange failed"),
        (status = 403, description = "Upstream account is not the registered one"),
    )
)]
pub async fn github_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, ApiError> {
    let (upstream_code, pending_id) = match (params.code, params.state) {
        (Some(code), Some(state)) => (code, state),
        _ => return Err(ApiError::bad_request("missing code or state")),
    };

    let client_secret = state
        .config
        .github_client_secret
        .as_deref()
        .ok_or_else(|| ApiError::not_configured(GITHUB_CLIENT_SECRET_ENV))?;

    let access_token = github::exchange_code(
        &state.http,
        &state.config.github_client_id,
        client_secret,
        &upstream_code,
    )
    .await
    .map_err(|e| match e {
        github::GithubError::AuthFailed(_) => {
            tracing::warn!("upstream token exchange failed: {e}");
            ApiError::unauthorized("github_auth_failed")
        }
        github::GithubError::Request(_) => ApiError::internal(e.to_string()),
    })?;

    let user = github::fetch_user(&state.http, &access_token)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    // The trust boundary: only the pre-registered account may assert
    // this identity.
    if user.id != state.identity.github_id {
        tracing::warn!(
            upstream_id = user.id,
            upstream_login = %user.login,
            "rejected assertion from unexpected account"
        );
        return Err(ApiError::identity_mismatch(format!(
            "Expected GitHub user {} ({}), got {} ({})",
            state.identity.github_login, state.identity.github_id, user.login, user.id
        )));
    }

    let session_id = Uuid::new_v4().to_string();
    state
        .store
        .put(
            &session_key(&session_id),
            &IdpSessionRecord {
                github_id: user.id,
                github_login: user.login,
                canonical_email: state.identity.canonical_email.clone(),
                created: Utc::now().timestamp_millis(),
            },
            SESSION_TTL_SECS,
        )
        .await;

    // Resume the parked flow; the pending record is single-use.
    let pending: Option<PendingAuthorizationRequest> =
        state.store.take(&pending_key(&pending_id)).await;

    if let Some(pending) = pending {
        let code = Uuid::new_v4().to_string();
        state
            .store
            .put(
                &code_key(&code),
                &AuthorizationCodeRecord {
                    client_id: pending.client_id,
                    redirect_uri: pending.redirect_uri.clone(),
                    nonce: pending.nonce,
                    scope: pending.scope,
                    created: Utc::now().timestamp_millis(),
                },
                CODE_TTL_SECS,
            )
            .await;

        let location = code_redirect(&pending.redirect_uri, &code, pending.state.as_deref())?;
        return Ok(found_with_session(&location, &session_id));
    }

    // Direct login with no parked flow is valid; land on the identity page.
    let home = format!("{}/whoami", state.config.issuer);
    Ok(found_with_session(&home, &session_id))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenForm {
    pub code: Option<String>,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub grant_type: Option<String>,
}

#[utoipa::path(
    post,
    path = "/oauth/token",
    tag = "OAuth",
    responses(
        (status = 200, body = TokenResponse),
        (status = 400, description = "invalid_grant"),
    )
)]
pub async fn token(
    State(state): State<AppState>,
    Form(form): Form<TokenForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let code = form.code.ok_or_else(ApiError::invalid_grant)?;

    // `take` consumes the record; a replayed code observes a miss.
    let record: AuthorizationCodeRecord = state
        .store
        .take(&code_key(&code))
        .await
        .ok_or_else(ApiError::invalid_grant)?;

    let id_token = auth::build_id_token(
        &state.identity,
        &state.config.issuer,
        form.client_id.as_deref(),
        record.nonce.as_deref(),
        state.config.signing_key_pem.as_deref(),
    )
    .map_err(|e| ApiError::internal(e.to_string()))?;

    let access_token = Uuid::new_v4().to_string();
    state
        .store
        .put(
            &token_key(&access_token),
            &state.identity.userinfo(),
            SESSION_TTL_SECS,
        )
        .await;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: SESSION_TTL_SECS,
        id_token,
        scope: TOKEN_SCOPE.to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/oauth/userinfo",
    tag = "OAuth",
    responses(
        (status = 200, description = "Claim bundle for the canonical identity"),
        (status = 401, description = "Presented bearer token is unknown"),
    )
)]
pub async fn userinfo(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    // A presented bearer token must be one we issued; absent credentials
    // fall through to the single-tenant bundle.
    if let Some(auth_header) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(bearer) = auth_header.strip_prefix("Bearer ") {
            if !state.store.contains(&token_key(bearer.trim())).await {
                return Err(ApiError::unauthorized("invalid_token"));
            }
        }
    }

    Ok(Json(state.identity.userinfo()))
}
