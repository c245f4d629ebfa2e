// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! OIDC discovery documents.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/.well-known/openid-configuration",
    tag = "Discovery",
    responses((status = 200, description = "OIDC provider metadata"))
)]
pub async fn openid_configuration(State(state): State<AppState>) -> Json<Value> {
    let issuer = &state.config.issuer;
    Json(json!({
        "issuer": issuer,
        "authorization_endpoint": format!("{issuer}/oauth/authorize"),
        "token_endpoint": format!("{issuer}/oauth/token"),
        "userinfo_endpoint": format!("{issuer}/oauth/userinfo"),
        "jwks_uri": format!("{issuer}/.well-known/jwks.json"),
        "scopes_supported": ["openid", "profile", "email", "groups", "web3"],
        "response_types_supported": ["code", "id_token", "token"],
        "subject_types_supported": ["public"],
        "id_token_signing_alg_values_supported": ["RS256"],
        "claims_supported": [
            "sub", "email", "email_verified", "name", "groups",
            "ens", "eoa", "safe", "iat", "exp", "iss", "aud"
        ],
        "grant_types_supported": ["authorization_code", "client_credentials", "implicit"],
        "token_endpoint_auth_methods_supported": ["client_secret_basic", "client_secret_post"],
    }))
}

// The key set stays empty until public-JWK derivation from the signing
// PEM is wired up; relying parties treating the ID token as a bearer
// assertion are unaffected.
#[utoipa::path(
    get,
    path = "/.well-known/jwks.json",
    tag = "Discovery",
    responses((status = 200, description = "JSON Web Key Set"))
)]
pub async fn jwks() -> Json<Value> {
    Json(json!({ "keys": [] }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn discovery_endpoints_derive_from_issuer() {
        let Json(doc) = openid_configuration(State(AppState::default())).await;
        assert_eq!(doc["issuer"], "https://bridgeworld.lol");
        assert_eq!(
            doc["authorization_endpoint"],
            "https://bridgeworld.lol/oauth/authorize"
        );
        assert_eq!(
            doc["token_endpoint"],
            "https://bridgeworld.lol/oauth/token"
        );
        assert_eq!(doc["subject_types_supported"][0], "public");
        assert_eq!(doc["id_token_signing_alg_values_supported"][0], "RS256");
    }

    #[tokio::test]
    async fn jwks_is_empty_key_set() {
        let Json(doc) = jwks().await;
        assert_eq!(doc["keys"], serde_json::json!([]));
    }
}
