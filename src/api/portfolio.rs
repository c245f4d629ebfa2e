// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! Portfolio endpoints proxying the Zapper GraphQL API.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::IntoParams;

use crate::{
    config::{PORTFOLIO_CACHE_TTL_SECS, ZAPPER_API_KEY_ENV},
    error::ApiError,
    providers::zapper::{self, ZapperError},
    state::AppState,
    store::PORTFOLIO_CACHE_KEY,
};

const PORTFOLIO_TOKENS_FIRST: u32 = 50;
const DEFAULT_TOKENS_FIRST: u32 = 25;
const DEFAULT_NFTS_FIRST: u32 = 30;

/// Split a fan-out leg into its data (under `path`) and its error, so one
/// failed leg never hides the others.
fn leg(
    result: Result<Value, ZapperError>,
    path: &[&str],
) -> (Value, Value) {
    match result {
        Ok(response) => {
            let data = zapper::extract(&response, path).cloned().unwrap_or(Value::Null);
            let errors = response.get("errors").cloned().unwrap_or(Value::Null);
            (data, errors)
        }
        Err(e) => (Value::Null, json!(e.to_string())),
    }
}

#[utoipa::path(
    get,
    path = "/identity/portfolio",
    tag = "Portfolio",
    responses(
        (status = 200, description = "Combined tokens, DeFi and NFT document, cached ten minutes"),
        (status = 500, description = "Portfolio key not configured"),
    )
)]
pub async fn portfolio(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let api_key = state
        .config
        .zapper_api_key
        .as_deref()
        .ok_or_else(|| ApiError::not_configured(ZAPPER_API_KEY_ENV))?;

    if let Some(mut cached) = state.store.get::<Value>(PORTFOLIO_CACHE_KEY).await {
        if let Some(doc) = cached.as_object_mut() {
            doc.insert("cached".to_string(), json!(true));
        }
        return Ok(Json(cached));
    }

    let identity = &state.identity;
    let addresses = [identity.eoa.as_str(), identity.safe.as_str()];

    let (token_result, app_result, nft_result) = tokio::join!(
        zapper::token_balances(&state.http, api_key, &addresses, PORTFOLIO_TOKENS_FIRST),
        zapper::app_balances(&state.http, api_key, &addresses),
        zapper::nft_balances(&state.http, api_key, &addresses, DEFAULT_NFTS_FIRST),
    );

    let (tokens, token_errors) = leg(token_result, &["data", "portfolioV2", "tokenBalances"]);
    let (apps, app_errors) = leg(app_result, &["data", "portfolioV2", "appBalances"]);
    let (nfts, nft_errors) = leg(nft_result, &["data", "nftUsersTokens"]);

    let document = json!({
        "identity": identity.canonical_email,
        "ens": identity.ens_name,
        "addresses": { "eoa": identity.eoa, "safe": identity.safe },
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "tokens": tokens,
        "apps": apps,
        "nfts": nfts,
        "errors": {
            "tokens": token_errors,
            "apps": app_errors,
            "nfts": nft_errors,
        },
    });

    state
        .store
        .put(PORTFOLIO_CACHE_KEY, &document, PORTFOLIO_CACHE_TTL_SECS)
        .await;
    Ok(Json(document))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TokensParams {
    /// Override wallet; defaults to both canonical wallets.
    pub address: Option<String>,
    pub first: Option<u32>,
}

#[utoipa::path(
    get,
    path = "/identity/tokens",
    params(TokensParams),
    tag = "Portfolio",
    responses((status = 200, description = "Token balances only"))
)]
pub async fn tokens(
    State(state): State<AppState>,
    Query(params): Query<TokensParams>,
) -> Result<Json<Value>, ApiError> {
    let api_key = state
        .config
        .zapper_api_key
        .as_deref()
        .ok_or_else(|| ApiError::not_configured(ZAPPER_API_KEY_ENV))?;

    let identity = &state.identity;
    let addresses: Vec<&str> = match params.address.as_deref() {
        Some(address) => vec![address],
        None => vec![&identity.eoa, &identity.safe],
    };
    let first = params.first.unwrap_or(DEFAULT_TOKENS_FIRST);

    let result = zapper::token_balances(&state.http, api_key, &addresses, first).await;
    let (tokens, errors) = leg(result, &["data", "portfolioV2", "tokenBalances"]);

    Ok(Json(json!({
        "identity": identity.canonical_email,
        "addresses": addresses,
        "tokens": tokens,
        "errors": errors,
    })))
}

#[utoipa::path(
    get,
    path = "/identity/defi",
    tag = "Portfolio",
    responses((status = 200, description = "DeFi app positions"))
)]
pub async fn defi(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let api_key = state
        .config
        .zapper_api_key
        .as_deref()
        .ok_or_else(|| ApiError::not_configured(ZAPPER_API_KEY_ENV))?;

    let identity = &state.identity;
    let addresses = [identity.eoa.as_str(), identity.safe.as_str()];

    let result = zapper::app_balances(&state.http, api_key, &addresses).await;
    let (apps, errors) = leg(result, &["data", "portfolioV2", "appBalances"]);

    Ok(Json(json!({
        "identity": identity.canonical_email,
        "addresses": addresses,
        "apps": apps,
        "errors": errors,
    })))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct NftsParams {
    pub first: Option<u32>,
}

#[utoipa::path(
    get,
    path = "/identity/nfts",
    params(NftsParams),
    tag = "Portfolio",
    responses((status = 200, description = "NFT holdings"))
)]
pub async fn nfts(
    State(state): State<AppState>,
    Query(params): Query<NftsParams>,
) -> Result<Json<Value>, ApiError> {
    let api_key = state
        .config
        .zapper_api_key
        .as_deref()
        .ok_or_else(|| ApiError::not_configured(ZAPPER_API_KEY_ENV))?;

    let identity = &state.identity;
    let addresses = [identity.eoa.as_str(), identity.safe.as_str()];
    let first = params.first.unwrap_or(DEFAULT_NFTS_FIRST);

    let result = zapper::nft_balances(&state.http, api_key, &addresses, first).await;
    let (nfts, errors) = leg(result, &["data", "nftUsersTokens"]);

    Ok(Json(json!({
        "identity": identity.canonical_email,
        "addresses": addresses,
        "nfts": nfts,
        "errors": errors,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::identity::CanonicalIdentity;

    fn state_with_key() -> AppState {
        AppState::new(
            CanonicalIdentity::default(),
            GatewayConfig {
                zapper_api_key: Some("test-key".to_string()),
                ..GatewayConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn portfolio_without_key_names_missing_config() {
        let error = portfolio(State(AppState::default()))
            .await
            .expect_err("missing key is surfaced");
        assert_eq!(error.message, "ZAPPER_API_KEY not configured");
    }

    #[tokio::test]
    async fn portfolio_serves_cached_document_marked_cached() {
        let state = state_with_key();
        state
            .store
            .put(
                PORTFOLIO_CACHE_KEY,
                &json!({"identity": "cached", "tokens": null}),
                PORTFOLIO_CACHE_TTL_SECS,
            )
            .await;

        let Json(doc) = portfolio(State(state)).await.expect("cache hit");
        assert_eq!(doc["identity"], "cached");
        assert_eq!(doc["cached"], true);
    }

    #[test]
    fn leg_separates_data_and_graphql_errors() {
        let ok = json!({
            "data": { "portfolioV2": { "tokenBalances": { "totalBalanceUSD": 1.0 } } }
        });
        let (data, errors) = leg(Ok(ok), &["data", "portfolioV2", "tokenBalances"]);
        assert_eq!(data["totalBalanceUSD"], 1.0);
        assert!(errors.is_null());

        let partial = json!({ "errors": [{"message": "rate limited"}] });
        let (data, errors) = leg(Ok(partial), &["data", "portfolioV2", "tokenBalances"]);
        assert!(data.is_null());
        assert_eq!(errors[0]["message"], "rate limited");

        let (data, errors) = leg(
            Err(ZapperError::Request("connect timeout".to_string())),
            &["data"],
        );
        assert!(data.is_null());
        assert!(errors.as_str().unwrap().contains("connect timeout"));
    }
}
