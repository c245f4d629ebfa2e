// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! ERC-20 balance queries for the primary token set.

use std::str::FromStr;
use std::time::Duration;

use alloy::{
    primitives::{Address, U256},
    sol,
};
use serde_json::{json, Map, Value};

use super::client::{format_units, ChainClient, ChainError};
use super::networks::chain_info;
use crate::config::PROVIDER_TIMEOUT_SECS;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
    }
}

/// A token tracked across chains for the canonical identity.
#[derive(Debug, Clone, Copy)]
pub struct PrimaryToken {
    pub symbol: &'static str,
    pub full_name: &'static str,
    pub decimals: u8,
    /// (chain id, contract address) deployments.
    pub contracts: &'static [(u64, &'static str)],
}

/// MAGIC, SAND, MANA — the deployment's primary tokens.
pub const PRIMARY_TOKENS: &[PrimaryToken] = &[
    PrimaryToken {
        symbol: "MAGIC",
        full_name: "Magic (Treasure)",
        decimals: 18,
        contracts: &[
            (1, "0xB0c7a3Ba49C7a6EaBa6cD4a96C55a1391070Ac9A"),
            (42161, "0x539bdE0d7Dbd336b79148AA742883198BBF60342"),
        ],
    },
    PrimaryToken {
        symbol: "SAND",
        full_name: "The Sandbox",
        decimals: 18,
        contracts: &[
            (1, "0x3845badAde8e6dFF049820680d1F14bD3903a5d0"),
            (137, "0xBbba073C31bF03b8ACf7c28EF0738DeCF3695683"),
        ],
    },
    PrimaryToken {
        symbol: "MANA",
        full_name: "Decentraland",
        decimals: 18,
        contracts: &[
            (1, "0x0F5D2fB29fb7d3CFeE444a200298f468908cC942"),
            (137, "0xA1c57f48F0Deb89f569dFbE6E2B7f46D33606fD4"),
        ],
    },
];

/// One ERC-20 `balanceOf` call with a bounded timeout.
async fn balance_of(
    chain_id: u64,
    token_address: &str,
    wallet_address: &str,
    api_key: &str,
) -> Result<U256, ChainError> {
    let client = ChainClient::new(chain_id, api_key)?;
    let token = Address::from_str(token_address)
        .map_err(|e| ChainError::InvalidAddress(e.to_string()))?;
    let wallet = Address::from_str(wallet_address)
        .map_err(|e| ChainError::InvalidAddress(e.to_string()))?;

    let contract = IERC20::new(token, client.provider().clone());
    let builder = contract.balanceOf(wallet);
    tokio::time::timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS), builder.call())
        .await
        .map_err(|_| ChainError::Timeout)?
        .map_err(|e| ChainError::RpcError(e.to_string()))
}

/// Collect primary-token balances for one wallet across every chain each
/// token is deployed on. Legs run concurrently; a failed leg is skipped
/// (treated as a zero balance), never an error.
pub async fn collect_primary_balances(wallet_address: &str, api_key: &str) -> Value {
    let mut jobs = Vec::new();
    for token in PRIMARY_TOKENS {
        for &(chain_id, contract) in token.contracts {
            let wallet = wallet_address.to_string();
            let key = api_key.to_string();
            jobs.push(async move {
                let raw = balance_of(chain_id, contract, &wallet, &key).await;
                (token, chain_id, contract, raw)
            });
        }
    }

    let settled = futures_join_all(jobs).await;

    let mut result = Map::new();
    for (token, chain_id, contract, raw) in settled {
        let raw = match raw {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    "{} balance on chain {chain_id} unavailable: {e}",
                    token.symbol
                );
                continue;
            }
        };

        let entry = result.entry(token.symbol.to_string()).or_insert_with(|| {
            json!({
                "name": token.full_name,
                "symbol": token.symbol,
                "decimals": token.decimals,
                "chains": {},
                "total_raw": "0",
            })
        });

        let chain_name = chain_info(chain_id)
            .map(|c| c.name.to_string())
            .unwrap_or_else(|| format!("Chain {chain_id}"));
        entry["chains"][chain_id.to_string()] = json!({
            "chain": chain_name,
            "contract": contract,
            "raw": format!("{raw:#x}"),
            "balance": format_units(raw, token.decimals),
        });

        let prior = entry["total_raw"]
            .as_str()
            .and_then(|s| U256::from_str(s).ok())
            .unwrap_or(U256::ZERO);
        let total = prior + raw;
        entry["total_raw"] = json!(total.to_string());
        entry["total"] = json!(format_units(total, token.decimals));
    }

    Value::Object(result)
}

/// Spawn each leg as a task and collect the results in submission order.
/// A leg that panics is dropped from the output.
async fn futures_join_all<F, T>(jobs: Vec<F>) -> Vec<T>
where
    F: std::future::Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let handles: Vec<_> = jobs.into_iter().map(tokio::spawn).collect();
    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        if let Ok(value) = handle.await {
            results.push(value);
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_lists_primary_tokens_with_deployments() {
        let symbols: Vec<&str> = PRIMARY_TOKENS.iter().map(|t| t.symbol).collect();
        assert_eq!(symbols, vec!["MAGIC", "SAND", "MANA"]);
        for token in PRIMARY_TOKENS {
            assert_eq!(token.decimals, 18);
            assert!(!token.contracts.is_empty());
            // Every deployment must be on a chain the gateway knows.
            for &(chain_id, _) in token.contracts {
                assert!(chain_info(chain_id).is_some());
            }
        }
    }

    #[tokio::test]
    async fn balance_call_surfaces_rpc_failure() {
        // Valid addresses but a bogus key: the call itself must run and
        // come back as an Err, never hang or panic.
        let (chain_id, contract) = PRIMARY_TOKENS[0].contracts[0];
        let result = balance_of(
            chain_id,
            contract,
            "0x67A977eaD94C3b955ECbf27886CE9f62464423B2",
            "invalid-key",
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn invalid_wallet_yields_empty_collection() {
        // Every leg fails address parsing, so every leg is skipped.
        let value = collect_primary_balances("not-an-address", "key").await;
        assert_eq!(value, serde_json::json!({}));
    }
}
