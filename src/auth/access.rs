// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! Edge access-layer JWT verification.
//!
//! The fronting access-control layer already restricts who can reach the
//! gateway, so for this single-subject IdP the assertion cookie is decoded
//! without signature verification and its claims are matched against the
//! canonical identity. Accepted when any of the following holds:
//!
//! - the `email` claim equals the canonical email,
//! - the embedded identity's `user_id` equals the registered GitHub id,
//! - the token carries `aud` and its `iss` contains the configured team
//!   (the edge policy itself restricts that audience to our subject).

use jsonwebtoken::dangerous::insecure_decode;
use serde::Deserialize;

use crate::identity::CanonicalIdentity;

#[derive(Debug, Deserialize)]
struct AccessClaims {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    iss: Option<String>,
    #[serde(default)]
    aud: Option<serde_json::Value>,
    #[serde(default)]
    identity: Option<AccessIdentity>,
}

#[derive(Debug, Deserialize)]
struct AccessIdentity {
    #[serde(default)]
    user_id: Option<String>,
}

/// Check whether an access-layer JWT asserts the canonical identity.
/// Any malformed token is simply not a proof; this never errors.
pub fn verify_access_jwt(token: &str, identity: &CanonicalIdentity, access_team: &str) -> bool {
    let Ok(data) = insecure_decode::<AccessClaims>(token) else {
        return false;
    };
    let claims = data.claims;

    if claims.email.as_deref() == Some(identity.canonical_email.as_str()) {
        return true;
    }

    if let Some(user_id) = claims.identity.as_ref().and_then(|i| i.user_id.as_deref()) {
        if user_id == identity.github_id.to_string() {
            return true;
        }
    }

    if claims.aud.is_some() {
        if let Some(iss) = claims.iss.as_deref() {
            if iss.contains(access_team) {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    fn jwt_with_payload(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        format!("{header}.{body}.sig")
    }

    #[test]
    fn canonical_email_claim_is_accepted() {
        let identity = CanonicalIdentity::default();
        let token = jwt_with_payload(&format!(
            r#"{{"email":"{}","exp":9999999999}}"#,
            identity.canonical_email
        ));
        assert!(verify_access_jwt(&token, &identity, "system76"));
    }

    #[test]
    fn matching_github_user_id_is_accepted() {
        let identity = CanonicalIdentity::default();
        let token = jwt_with_payload(&format!(
            r#"{{"identity":{{"user_id":"{}"}},"exp":9999999999}}"#,
            identity.github_id
        ));
        assert!(verify_access_jwt(&token, &identity, "system76"));
    }

    #[test]
    fn team_issuer_with_audience_is_accepted() {
        let identity = CanonicalIdentity::default();
        let token = jwt_with_payload(
            r#"{"aud":["x"],"iss":"https://system76.cloudflareaccess.com","exp":9999999999}"#,
        );
        assert!(verify_access_jwt(&token, &identity, "system76"));
    }

    #[test]
    fn foreign_claims_are_rejected() {
        let identity = CanonicalIdentity::default();
        let token = jwt_with_payload(
            r#"{"email":"other@example.com","iss":"https://other.example","exp":9999999999}"#,
        );
        assert!(!verify_access_jwt(&token, &identity, "system76"));
    }

    #[test]
    fn garbage_is_not_a_proof() {
        let identity = CanonicalIdentity::default();
        assert!(!verify_access_jwt("not-a-jwt", &identity, "system76"));
        assert!(!verify_access_jwt("", &identity, "system76"));
    }
}
