// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! Identity summary and on-chain verification endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::IntoParams;

use crate::{
    chain::{
        alchemy_rpc_url, chain_info, format_units, onchain_verification, supported_chain_ids,
        ChainClient, CHAINS,
    },
    config::{ALCHEMY_API_KEY_ENV, ONCHAIN_CACHE_TTL_SECS},
    error::ApiError,
    providers::orcid,
    state::AppState,
    store::ONCHAIN_CACHE_KEY,
};

#[utoipa::path(
    get,
    path = "/identity",
    tag = "Identity",
    responses((status = 200, description = "Canonical identity summary with anchors and endpoint links"))
)]
pub async fn summary(State(state): State<AppState>) -> Json<Value> {
    let identity = &state.identity;
    let issuer = &state.config.issuer;

    Json(json!({
        "primary_email": identity.primary_email,
        "email": identity.canonical_email,
        "ens": identity.ens_name,
        "name": identity.display_name,
        "eoa": identity.eoa,
        "safe": identity.safe,
        "github_id": identity.github_id,
        "orcid": identity.orcid_id,
        "orcid_url": identity.orcid_url,
        "groups": identity.groups,
        "identity_proof": format!(
            "{} = {} (wallet IS the email, wallet-signature binding)",
            identity.primary_email, identity.eoa
        ),
        "identity_anchors": {
            "ethermail": format!("{} (wallet address is the email)", identity.primary_email),
            "ens": format!("{} resolves to {}", identity.ens_name, identity.eoa),
            "github": format!("@{} (ID {}), upstream OAuth", identity.github_login, identity.github_id),
            "orcid": identity.orcid_url,
            "safe": format!("{} (contract wallet, owner: {})", identity.safe, identity.eoa),
        },
        "protocols": {
            "oauth": format!("{issuer}/oauth/authorize"),
            "saml": format!("{issuer}/saml/metadata"),
            "oidc": format!("{issuer}/.well-known/openid-configuration"),
            "sso": format!("{issuer}/sso/session"),
            "siwe": { "domain": issuer.trim_start_matches("https://"), "chain_id": 1 },
        },
        "onchain": format!("{issuer}/identity/onchain"),
        "portfolio": format!("{issuer}/identity/portfolio"),
        "tokens": format!("{issuer}/identity/tokens"),
        "defi": format!("{issuer}/identity/defi"),
        "nfts": format!("{issuer}/identity/nfts"),
        "chains": format!("{issuer}/identity/chains"),
        "balance": format!("{issuer}/identity/balance?chain=1"),
        "safe_info": format!("{issuer}/identity/safe"),
        "orcid_record": format!("{issuer}/identity/orcid"),
        "simulate": format!("{issuer}/identity/simulate (POST)"),
        "verify": format!("{issuer}/identity/verify?address=0x...&chain=1"),
    }))
}

#[utoipa::path(
    get,
    path = "/identity/onchain",
    tag = "Identity",
    responses(
        (status = 200, description = "On-chain verification document, cached five minutes"),
        (status = 500, description = "RPC key not configured"),
    )
)]
pub async fn onchain(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let api_key = state
        .config
        .alchemy_api_key
        .as_deref()
        .ok_or_else(|| ApiError::not_configured(ALCHEMY_API_KEY_ENV))?;

    if let Some(mut cached) = state.store.get::<Value>(ONCHAIN_CACHE_KEY).await {
        if let Some(doc) = cached.as_object_mut() {
            doc.insert("cached".to_string(), json!(true));
        }
        return Ok(Json(cached));
    }

    let mut result = onchain_verification(&state.identity, api_key).await;
    if let Some(doc) = result.as_object_mut() {
        doc.insert(
            "providers".to_string(),
            json!({
                "alchemy": { "active": true, "chains": CHAINS.len() },
                "tenderly": { "active": state.config.tenderly_access_key.is_some() },
                "zapper": { "active": state.config.zapper_api_key.is_some() },
            }),
        );
    }

    state
        .store
        .put(ONCHAIN_CACHE_KEY, &result, ONCHAIN_CACHE_TTL_SECS)
        .await;
    Ok(Json(result))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct BalanceParams {
    pub address: Option<String>,
    pub chain: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/identity/balance",
    params(BalanceParams),
    tag = "Identity",
    responses(
        (status = 200, description = "Native balance on one chain"),
        (status = 400, description = "Unsupported chain"),
    )
)]
pub async fn balance(
    State(state): State<AppState>,
    Query(params): Query<BalanceParams>,
) -> Result<Json<Value>, ApiError> {
    let api_key = state
        .config
        .alchemy_api_key
        .as_deref()
        .ok_or_else(|| ApiError::not_configured(ALCHEMY_API_KEY_ENV))?;

    let address = params
        .address
        .unwrap_or_else(|| state.identity.eoa.clone());
    let chain_id = params.chain.unwrap_or(1);

    let client = ChainClient::new(chain_id, api_key).map_err(|_| {
        ApiError::bad_request(format!(
            "Chain {chain_id} not supported, supported: {:?}",
            supported_chain_ids()
        ))
    })?;

    // A failed RPC reads as a zero balance rather than an error; the
    // wei field still distinguishes the two in logs.
    let wei = match client.native_balance(&address).await {
        Ok(wei) => wei,
        Err(e) => {
            tracing::warn!(chain_id, %address, "balance fetch failed: {e}");
            alloy::primitives::U256::ZERO
        }
    };

    Ok(Json(json!({
        "address": address,
        "chain_id": chain_id,
        "chain_name": client.chain().name,
        "wei": format!("0x{wei:x}"),
        "native": format_units(wei, 18),
    })))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SafeParams {
    pub address: Option<String>,
    pub chain: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/identity/safe",
    params(SafeParams),
    tag = "Identity",
    responses(
        (status = 200, description = "Safe owners and threshold"),
        (status = 400, description = "Unsupported chain"),
    )
)]
pub async fn safe(
    State(state): State<AppState>,
    Query(params): Query<SafeParams>,
) -> Result<Json<Value>, ApiError> {
    let api_key = state
        .config
        .alchemy_api_key
        .as_deref()
        .ok_or_else(|| ApiError::not_configured(ALCHEMY_API_KEY_ENV))?;

    let safe_address = params
        .address
        .unwrap_or_else(|| state.identity.safe.clone());
    let chain_id = params.chain.unwrap_or(1);
    let chain = chain_info(chain_id).ok_or_else(|| {
        ApiError::bad_request(format!(
            "Chain {chain_id} not supported, supported: {:?}",
            supported_chain_ids()
        ))
    })?;

    let (owners, threshold) =
        crate::chain::safe::owners_and_threshold(chain_id, &safe_address, api_key).await;
    let eoa_is_owner = owners
        .as_ref()
        .map(|list| list.iter().any(|o| state.identity.is_eoa(o)));

    Ok(Json(json!({
        "safe": safe_address,
        "chain_id": chain_id,
        "chain_name": chain.name,
        "threshold": threshold,
        "owners": owners,
        "canonical_eoa_is_owner": eoa_is_owner,
    })))
}

#[utoipa::path(
    get,
    path = "/identity/orcid",
    tag = "Identity",
    responses((status = 200, description = "Live ORCID public record, reshaped"))
)]
pub async fn orcid_record(State(state): State<AppState>) -> Json<Value> {
    let identity = &state.identity;
    let record = orcid::fetch_record(&state.http, &identity.orcid_id, &identity.display_name).await;

    Json(json!({
        "identity": identity.primary_email,
        "alias": identity.canonical_email,
        "orcid": {
            "id": identity.orcid_id,
            "url": identity.orcid_url,
            "record": record,
        },
        "identity_anchors": {
            "orcid": identity.orcid_url,
            "ethermail": identity.primary_email,
            "ens": identity.ens_name,
            "github": format!("https://github.com/{}", identity.github_login),
            "eoa": identity.eoa,
            "safe": identity.safe,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/identity/chains",
    tag = "Identity",
    responses((status = 200, description = "Chain directory with key material masked"))
)]
pub async fn chains(State(state): State<AppState>) -> Json<Value> {
    let identity = &state.identity;
    let issuer = &state.config.issuer;
    let has_alchemy = state.config.alchemy_api_key.is_some();
    let has_tenderly = state.config.tenderly_access_key.is_some();

    let directory: Vec<Value> = CHAINS
        .iter()
        .map(|c| {
            json!({
                "chain_id": c.chain_id,
                "name": c.name,
                "alchemy": has_alchemy
                    .then(|| alchemy_rpc_url(c.chain_id, "***"))
                    .flatten(),
                "tenderly": c.tenderly_slug.filter(|_| has_tenderly).map(|slug| {
                    format!("https://{slug}.gateway.tenderly.co/***")
                }),
            })
        })
        .collect();

    Json(json!({
        "identity": identity.primary_email,
        "eoa": identity.eoa,
        "safe": identity.safe,
        "providers": {
            "alchemy": has_alchemy,
            "tenderly": has_tenderly,
            "zapper": state.config.zapper_api_key.is_some(),
        },
        "chains": directory,
        "tenderly_features": {
            "simulate": format!("{issuer}/identity/simulate"),
            "verify": format!("{issuer}/identity/verify?address=0x...&chain=1"),
            "diamondcut": format!("{issuer}/identity/simulate-diamondcut"),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::identity::CanonicalIdentity;

    fn state_with(config: GatewayConfig) -> AppState {
        AppState::new(CanonicalIdentity::default(), config)
    }

    #[tokio::test]
    async fn summary_cross_links_protocol_endpoints() {
        let state = AppState::default();
        let Json(doc) = summary(State(state.clone())).await;

        assert_eq!(doc["primary_email"], state.identity.primary_email);
        assert_eq!(doc["ens"], state.identity.ens_name);
        assert_eq!(
            doc["protocols"]["oidc"],
            "https://bridgeworld.lol/.well-known/openid-configuration"
        );
        assert_eq!(doc["onchain"], "https://bridgeworld.lol/identity/onchain");
        assert_eq!(doc["protocols"]["siwe"]["domain"], "bridgeworld.lol");
    }

    #[tokio::test]
    async fn onchain_without_key_names_missing_config() {
        let error = onchain(State(AppState::default()))
            .await
            .expect_err("missing key is surfaced");
        assert_eq!(error.message, "ALCHEMY_API_KEY not configured");
    }

    #[tokio::test]
    async fn onchain_serves_cached_document_marked_cached() {
        let state = state_with(GatewayConfig {
            alchemy_api_key: Some("test-key".to_string()),
            ..GatewayConfig::default()
        });
        state
            .store
            .put(
                ONCHAIN_CACHE_KEY,
                &json!({"identity": "cached-doc"}),
                ONCHAIN_CACHE_TTL_SECS,
            )
            .await;

        let Json(doc) = onchain(State(state)).await.expect("cache hit");
        assert_eq!(doc["identity"], "cached-doc");
        assert_eq!(doc["cached"], true);
    }

    #[tokio::test]
    async fn balance_rejects_unsupported_chain() {
        let state = state_with(GatewayConfig {
            alchemy_api_key: Some("test-key".to_string()),
            ..GatewayConfig::default()
        });

        let error = balance(
            State(state),
            Query(BalanceParams {
                address: None,
                chain: Some(99_999),
            }),
        )
        .await
        .expect_err("unsupported chain is rejected");
        assert_eq!(error.status, axum::http::StatusCode::BAD_REQUEST);
        assert!(error.message.contains("99999 not supported"));
        assert!(error.message.contains("42161"));
    }

    #[tokio::test]
    async fn safe_rejects_unsupported_chain() {
        let state = state_with(GatewayConfig {
            alchemy_api_key: Some("test-key".to_string()),
            ..GatewayConfig::default()
        });

        let error = safe(
            State(state),
            Query(SafeParams {
                address: None,
                chain: Some(555),
            }),
        )
        .await
        .expect_err("unsupported chain is rejected");
        assert_eq!(error.status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chains_directory_masks_keys_and_flags_providers() {
        let state = state_with(GatewayConfig {
            alchemy_api_key: Some("real-secret".to_string()),
            tenderly_access_key: Some("another-secret".to_string()),
            ..GatewayConfig::default()
        });

        let Json(doc) = chains(State(state)).await;
        assert_eq!(doc["providers"]["alchemy"], true);
        assert_eq!(doc["providers"]["tenderly"], true);
        assert_eq!(doc["providers"]["zapper"], false);

        let serialized = doc.to_string();
        assert!(!serialized.contains("real-secret"));
        assert!(!serialized.contains("another-secret"));
        assert!(serialized.contains("/v2/***"));
        assert!(serialized.contains("gateway.tenderly.co/***"));

        // Ronin has RPC coverage but no simulation gateway.
        let ronin = doc["chains"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["chain_id"] == 2020)
            .unwrap();
        assert!(ronin["alchemy"].is_string());
        assert!(ronin["tenderly"].is_null());
    }

    #[tokio::test]
    async fn chains_directory_nulls_urls_without_keys() {
        let Json(doc) = chains(State(AppState::default())).await;
        let eth = doc["chains"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["chain_id"] == 1)
            .unwrap();
        assert!(eth["alchemy"].is_null());
        assert!(eth["tenderly"].is_null());
    }
}
