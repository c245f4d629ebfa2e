// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! OIDC ID-token builder.
//!
//! When `SIGNING_KEY` carries an RSA private key PEM the token is signed
//! RS256 with `jsonwebtoken`. Without it the compact form is emitted with
//! `alg: "none"` and an empty signature — a deliberate, documented gap for
//! deployments that have not provisioned a key yet, not a production mode.

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;

use crate::config::SESSION_TTL_SECS;
use crate::identity::CanonicalIdentity;

#[derive(Debug, Serialize)]
struct IdTokenClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    nonce: Option<&'a str>,
    email: &'a str,
    primary_email: &'a str,
    email_verified: bool,
    name: &'a str,
    ens: &'a str,
    eoa: &'a str,
    safe: &'a str,
    github_id: u64,
    orcid: &'a str,
    groups: &'a [String],
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("ID token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("ID token serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Build the ID token for the canonical identity.
///
/// `aud` falls back to the issuer when the client supplied no `client_id`.
/// `exp - iat` always equals the session TTL.
pub fn build_id_token(
    identity: &CanonicalIdentity,
    issuer: &str,
    audience: Option<&str>,
    nonce: Option<&str>,
    signing_key_pem: Option<&str>,
) -> Result<String, TokenError> {
    let now = Utc::now().timestamp();
    let claims = IdTokenClaims {
        iss: issuer,
        sub: &identity.primary_email,
        aud: audience.unwrap_or(issuer),
        exp: now + SESSION_TTL_SECS as i64,
        iat: now,
        nonce,
        email: &identity.canonical_email,
        primary_email: &identity.primary_email,
        email_verified: true,
        name: &identity.display_name,
        ens: &identity.ens_name,
        eoa: &identity.eoa,
        safe: &identity.safe,
        github_id: identity.github_id,
        orcid: &identity.orcid_id,
        groups: &identity.groups,
    };

    match signing_key_pem {
        Some(pem) => {
            let key = EncodingKey::from_rsa_pem(pem.as_bytes())?;
            Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
        }
        None => build_unsigned(&claims),
    }
}

fn build_unsigned(claims: &IdTokenClaims<'_>) -> Result<String, TokenError> {
    let header = Base64UrlUnpadded::encode_string(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = Base64UrlUnpadded::encode_string(&serde_json::to_vec(claims)?);
    Ok(format!("{header}.{payload}."))
}
