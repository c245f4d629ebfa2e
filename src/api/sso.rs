// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! SSO session introspection endpoints. Single-tenant: the session is
//! always active and always describes the canonical identity.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::IntoParams;

use crate::{config::SESSION_TTL_SECS, identity::CanonicalIdentity, state::AppState};

fn session_document(identity: &CanonicalIdentity) -> Value {
    let now = Utc::now().timestamp();
    json!({
        "active": true,
        "identity": identity.primary_email,
        "alias": identity.canonical_email,
        "ens": identity.ens_name,
        "eoa": identity.eoa,
        "safe": identity.safe,
        "orcid": identity.orcid_id,
        "groups": identity.groups,
        "iat": now,
        "exp": now + SESSION_TTL_SECS as i64,
        "wallet_email_binding": true,
        "protocols": {
            "oauth": true,
            "saml": true,
            "oidc": true,
            "siwe": true,
        },
    })
}

#[utoipa::path(
    get,
    path = "/sso/session",
    tag = "SSO",
    responses((status = 200, description = "Current session descriptor"))
)]
pub async fn session(State(state): State<AppState>) -> Json<Value> {
    Json(session_document(&state.identity))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LoginParams {
    pub redirect: Option<String>,
}

#[utoipa::path(
    get,
    path = "/sso/login",
    params(LoginParams),
    tag = "SSO",
    responses((status = 200, description = "Immediate authentication for the canonical subject"))
)]
pub async fn login(
    State(state): State<AppState>,
    Query(params): Query<LoginParams>,
) -> Json<Value> {
    Json(json!({
        "status": "authenticated",
        "identity": state.identity.canonical_email,
        "redirect": params.redirect.unwrap_or_else(|| state.config.issuer.clone()),
        "session": session_document(&state.identity),
    }))
}

#[utoipa::path(
    get,
    path = "/sso/logout",
    tag = "SSO",
    responses((status = 200, description = "Logout acknowledged"))
)]
pub async fn logout(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "logged_out",
        "identity": state.identity.canonical_email,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn session_is_active_with_full_lifetime() {
        let state = AppState::default();
        let Json(doc) = session(State(state.clone())).await;

        assert_eq!(doc["active"], true);
        assert_eq!(doc["identity"], state.identity.primary_email);
        assert_eq!(doc["alias"], state.identity.canonical_email);
        let lifetime = doc["exp"].as_i64().unwrap() - doc["iat"].as_i64().unwrap();
        assert_eq!(lifetime, SESSION_TTL_SECS as i64);
        assert_eq!(doc["protocols"]["saml"], true);
    }

    #[tokio::test]
    async fn login_echoes_redirect_or_falls_back_to_issuer() {
        let state = AppState::default();

        let Json(with_redirect) = login(
            State(state.clone()),
            Query(LoginParams {
                redirect: Some("https://app.example/home".to_string()),
            }),
        )
        .await;
        assert_eq!(with_redirect["redirect"], "https://app.example/home");
        assert_eq!(with_redirect["status"], "authenticated");
        assert_eq!(with_redirect["session"]["active"], true);

        let Json(without_redirect) =
            login(State(state.clone()), Query(LoginParams { redirect: None })).await;
        assert_eq!(without_redirect["redirect"], state.config.issuer);
    }

    #[tokio::test]
    async fn logout_acknowledges() {
        let state = AppState::default();
        let Json(doc) = logout(State(state.clone())).await;
        assert_eq!(doc["status"], "logged_out");
        assert_eq!(doc["identity"], state.identity.canonical_email);
    }
}
