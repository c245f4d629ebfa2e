// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! The canonical identity this gateway vouches for.
//!
//! Exactly one `CanonicalIdentity` exists per deployment. Every token,
//! assertion and claim bundle the gateway issues embeds a subset of its
//! fields; no other subject is ever authenticated. The value is injected
//! through `AppState` rather than read from module constants, so the
//! protocol engine is testable against fixture identities.

use std::env;

use serde_json::{json, Value};

/// The single subject of this identity provider.
#[derive(Debug, Clone)]
pub struct CanonicalIdentity {
    /// Externally-owned account (20-byte hex address).
    pub eoa: String,
    /// Multisig contract wallet address.
    pub safe: String,
    /// ENS name expected to resolve to the EOA.
    pub ens_name: String,
    /// Wallet-derived email: the lowercase EOA at the mail provider.
    pub primary_email: String,
    /// ENS-alias email, used as SAML NameID and OIDC `email` claim.
    pub canonical_email: String,
    pub display_name: String,
    /// Fixed upstream GitHub account trusted to assert this identity.
    pub github_id: u64,
    pub github_login: String,
    pub orcid_id: String,
    pub orcid_url: String,
    pub groups: Vec<String>,
}

impl CanonicalIdentity {
    /// Build the identity from the environment, falling back to the
    /// deployment's registered subject for any unset field.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            eoa: env_or(IDENTITY_EOA_ENV, default.eoa),
            safe: env_or(IDENTITY_SAFE_ENV, default.safe),
            ens_name: env_or(IDENTITY_ENS_ENV, default.ens_name),
            primary_email: env_or(IDENTITY_PRIMARY_EMAIL_ENV, default.primary_email),
            canonical_email: env_or(IDENTITY_EMAIL_ENV, default.canonical_email),
            display_name: env_or(IDENTITY_DISPLAY_NAME_ENV, default.display_name),
            github_id: env::var(IDENTITY_GITHUB_ID_ENV)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.github_id),
            github_login: env_or(IDENTITY_GITHUB_LOGIN_ENV, default.github_login),
            orcid_id: env_or(IDENTITY_ORCID_ENV, default.orcid_id.clone()),
            orcid_url: env::var(IDENTITY_ORCID_ENV)
                .ok()
                .filter(|v| !v.is_empty())
                .map(|id| format!("https://orcid.org/{id}"))
                .unwrap_or(default.orcid_url),
            groups: default.groups,
        }
    }

    /// Whether `address` is this identity's EOA (addresses compare
    /// case-insensitively).
    pub fn is_eoa(&self, address: &str) -> bool {
        address.eq_ignore_ascii_case(&self.eoa)
    }

    /// The full claim bundle served by `userinfo` and stored with each
    /// issued access token.
    pub fn userinfo(&self) -> Value {
        json!({
            "sub": self.primary_email,
            "email": self.canonical_email,
            "email_verified": true,
            "primary_email": self.primary_email,
            "email_alias": self.canonical_email,
            "name": self.display_name,
            "preferred_username": self.ens_name,
            "ens": self.ens_name,
            "eoa": self.eoa,
            "safe": self.safe,
            "github_id": self.github_id,
            "orcid": self.orcid_id,
            "orcid_url": self.orcid_url,
            "groups": self.groups,
            "ethermail": {
                "primary": self.primary_email,
                "alias": self.canonical_email,
                "wallet_binding": "The primary email IS the wallet address — EtherMail proves ownership via wallet signature",
            },
        })
    }
}

impl Default for CanonicalIdentity {
    fn default() -> Self {
        let eoa = "0x67A977eaD94C3b955ECbf27886CE9f62464423B2".to_string();
        Self {
            primary_email: format!("{}@ethermail.io", eoa.to_lowercase()),
            eoa,
            safe: "0xfD5b99618ea8941Ad3F455f0D347285AB68F1A43".to_string(),
            ens_name: "theosmagic.uni.eth".to_string(),
            canonical_email: "theosmagic.uni.eth@ethermail.io".to_string(),
            display_name: "Θ𝜀ό𝜍°•⟐•Σ℧ΛΘ".to_string(),
            github_id: 232_430_312,
            github_login: "theosmagic".to_string(),
            orcid_id: "0009-0005-7822-7939".to_string(),
            orcid_url: "https://orcid.org/0009-0005-7822-7939".to_string(),
            groups: vec!["owner".into(), "admin".into(), "signer".into()],
        }
    }
}

pub const IDENTITY_EOA_ENV: &str = "IDENTITY_EOA";
pub const IDENTITY_SAFE_ENV: &str = "IDENTITY_SAFE";
pub const IDENTITY_ENS_ENV: &str = "IDENTITY_ENS";
pub const IDENTITY_EMAIL_ENV: &str = "IDENTITY_EMAIL";
pub const IDENTITY_PRIMARY_EMAIL_ENV: &str = "IDENTITY_PRIMARY_EMAIL";
pub const IDENTITY_DISPLAY_NAME_ENV: &str = "IDENTITY_DISPLAY_NAME";
pub const IDENTITY_GITHUB_ID_ENV: &str = "IDENTITY_GITHUB_ID";
pub const IDENTITY_GITHUB_LOGIN_ENV: &str = "IDENTITY_GITHUB_LOGIN";
pub const IDENTITY_ORCID_ENV: &str = "IDENTITY_ORCID";

fn env_or(name: &str, default: String) -> String {
    env::var(name).ok().filter(|v| !v.is_empty()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_email_is_lowercase_eoa() {
        let identity = CanonicalIdentity::default();
        assert_eq!(
            identity.primary_email,
            "0x67a977ead94c3b955ecbf27886ce9f62464423b2@ethermail.io"
        );
    }

    #[test]
    fn eoa_comparison_is_case_insensitive() {
        let identity = CanonicalIdentity::default();
        assert!(identity.is_eoa(&identity.eoa.to_uppercase().replace("0X", "0x")));
        assert!(!identity.is_eoa("0x0000000000000000000000000000000000000000"));
    }

    #[test]
    fn userinfo_embeds_canonical_claims() {
        let identity = CanonicalIdentity::default();
        let claims = identity.userinfo();
        assert_eq!(claims["sub"], identity.primary_email);
        assert_eq!(claims["email"], identity.canonical_email);
        assert_eq!(claims["ens"], identity.ens_name);
        assert_eq!(claims["groups"][0], "owner");
    }
}
