// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! Transaction simulation and contract verification via Tenderly.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::IntoParams;

use crate::{
    config::TENDERLY_ACCESS_KEY_ENV,
    error::ApiError,
    providers::tenderly,
    state::AppState,
};

/// `diamondCut(FacetCut[],address,bytes)` selector.
const DIAMOND_CUT_SELECTOR: &str = "0x1f931c1c";
const DIAMOND_CUT_GAS: u64 = 15_000_000;
const DIAMOND_CUT_DEFAULT_CHAIN: u64 = 42161;

fn chain_id_of(body: &Value, default: u64) -> u64 {
    body.get("network_id")
        .or_else(|| body.get("chain_id"))
        .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
        .unwrap_or(default)
}

#[utoipa::path(
    post,
    path = "/identity/simulate",
    tag = "Simulation",
    responses(
        (status = 200, description = "Simulation result"),
        (status = 400, description = "Missing to address"),
        (status = 500, description = "Simulation key not configured"),
    )
)]
pub async fn simulate(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let access_key = state
        .config
        .tenderly_access_key
        .as_deref()
        .ok_or_else(|| ApiError::not_configured(TENDERLY_ACCESS_KEY_ENV))?;

    if body.get("to").and_then(Value::as_str).is_none() {
        return Err(ApiError::bad_request(
            "POST body required with at least { to, input, network_id }",
        ));
    }

    let chain_id = chain_id_of(&body, 1);
    let params = json!({
        "from": body.get("from").cloned().unwrap_or_else(|| json!(state.identity.eoa)),
        "to": body["to"],
        "input": body.get("input").or_else(|| body.get("data")).cloned().unwrap_or_else(|| json!("0x")),
        "value": body.get("value").cloned().unwrap_or_else(|| json!("0")),
        "gas": body.get("gas").cloned().unwrap_or_else(|| json!(8_000_000)),
    });

    let simulation = tenderly::simulate(&state.http, access_key, chain_id, &params)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(json!({
        "identity": state.identity.primary_email,
        "simulation": simulation,
    })))
}

#[utoipa::path(
    post,
    path = "/identity/simulate-diamondcut",
    tag = "Simulation",
    responses(
        (status = 200, description = "Diamond cut simulation result"),
        (status = 400, description = "Missing diamond address"),
    )
)]
pub async fn simulate_diamondcut(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let access_key = state
        .config
        .tenderly_access_key
        .as_deref()
        .ok_or_else(|| ApiError::not_configured(TENDERLY_ACCESS_KEY_ENV))?;

    let diamond = body
        .get("diamond")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ApiError::bad_request(
                "POST body required: { diamond, facetCuts, init, calldata, network_id }",
            )
        })?
        .to_string();

    let chain_id = chain_id_of(&body, DIAMOND_CUT_DEFAULT_CHAIN);
    let params = json!({
        "from": body.get("from").cloned().unwrap_or_else(|| json!(state.identity.eoa)),
        "to": diamond,
        "input": body
            .get("encoded_calldata")
            .cloned()
            .unwrap_or_else(|| json!(DIAMOND_CUT_SELECTOR)),
        "value": "0",
        "gas": body.get("gas").cloned().unwrap_or_else(|| json!(DIAMOND_CUT_GAS)),
    });

    let simulation = tenderly::simulate(&state.http, access_key, chain_id, &params)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(json!({
        "identity": state.identity.primary_email,
        "diamond": diamond,
        "network_id": chain_id,
        "simulation": simulation,
    })))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct VerifyParams {
    pub address: Option<String>,
    pub chain: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/identity/verify",
    params(VerifyParams),
    tag = "Simulation",
    responses((status = 200, description = "Contract verification status"))
)]
pub async fn verify(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Result<Json<Value>, ApiError> {
    let access_key = state
        .config
        .tenderly_access_key
        .as_deref()
        .ok_or_else(|| ApiError::not_configured(TENDERLY_ACCESS_KEY_ENV))?;

    let address = params
        .address
        .unwrap_or_else(|| state.identity.safe.clone());
    let chain_id = params.chain.unwrap_or(1);

    let verification = tenderly::verify_contract(&state.http, access_key, chain_id, &address)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(json!({
        "address": address,
        "network_id": chain_id,
        "verification": verification,
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
                tenderly_access_key: Some("test-key".to_string()),
                ..GatewayConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn simulate_without_key_names_missing_config() {
        let error = simulate(State(AppState::default()), Json(json!({"to": "0x1"})))
            .await
            .expect_err("missing key is surfaced");
        assert_eq!(error.message, "TENDERLY_ACCESS_KEY not configured");
    }

    #[tokio::test]
    async fn simulate_requires_to_address() {
        let error = simulate(State(state_with_key()), Json(json!({"input": "0x"})))
            .await
            .expect_err("missing to is rejected");
        assert_eq!(error.status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn diamondcut_requires_diamond_address() {
        let error = simulate_diamondcut(State(state_with_key()), Json(json!({})))
            .await
            .expect_err("missing diamond is rejected");
        assert_eq!(error.status, axum::http::StatusCode::BAD_REQUEST);
        assert!(error.message.contains("diamond"));
    }

    #[test]
    fn chain_id_accepts_number_or_string_under_either_name() {
        assert_eq!(chain_id_of(&json!({"network_id": 42161}), 1), 42161);
        assert_eq!(chain_id_of(&json!({"network_id": "137"}), 1), 137);
        assert_eq!(chain_id_of(&json!({"chain_id": 8453}), 1), 8453);
        assert_eq!(chain_id_of(&json!({}), 1), 1);
    }
}
