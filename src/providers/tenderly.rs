// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! Tenderly simulation API client.

use reqwest::Client;
use serde_json::{json, Value};

const TENDERLY_API: &str = "https://api.tenderly.co/api/v1";

#[derive(Debug, thiserror::Error)]
pub enum TenderlyError {
    #[error("Tenderly request failed: {0}")]
    Request(String),

    #[error("Tenderly returned {status}: {body}")]
    Upstream { status: u16, body: String },
}

/// Run a full transaction simulation.
///
/// `params` comes straight from the caller; missing fields get the
/// defaults Tenderly expects (`gas` 8M, `value` 0). Failed simulations
/// are persisted upstream (`save_if_fails`) so they can be replayed.
pub async fn simulate(
    http: &Client,
    access_key: &str,
    chain_id: u64,
    params: &Value,
) -> Result<Value, TenderlyError> {
    let body = json!({
        "network_id": chain_id.to_string(),
        "from": params.get("from").cloned().unwrap_or(Value::Null),
        "to": params.get("to").cloned().unwrap_or(Value::Null),
        "input": params.get("input").cloned().unwrap_or_else(|| json!("0x")),
        "value": params.get("value").cloned().unwrap_or_else(|| json!("0")),
        "gas": params.get("gas").cloned().unwrap_or_else(|| json!(8_000_000)),
        "save": true,
        "save_if_fails": true,
        "simulation_type": "full",
    });

    let response = http
        .post(format!("{TENDERLY_API}/account/me/project/project/simulate"))
        .header("X-Access-Key", access_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| TenderlyError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TenderlyError::Upstream {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| TenderlyError::Request(e.to_string()))
}

/// Look up contract verification status. A non-success upstream status
/// degrades to `{"verified": false}` rather than an error, since absence
/// of verification data is itself an answer.
pub async fn verify_contract(
    http: &Client,
    access_key: &str,
    chain_id: u64,
    address: &str,
) -> Result<Value, TenderlyError> {
    let response = http
        .get(format!(
            "{TENDERLY_API}/account/me/project/project/contract/{chain_id}/{address}"
        ))
        .header("X-Access-Key", access_key)
        .send()
        .await
        .map_err(|e| TenderlyError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Ok(json!({
            "verified": false,
            "status": status.as_u16(),
        }));
    }

    response
        .json()
        .await
        .map_err(|e| TenderlyError::Request(e.to_string()))
}
