// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! Zapper GraphQL client for portfolio, DeFi and NFT holdings.

use reqwest::Client;
use serde_json::{json, Value};

const ZAPPER_GQL: &str = "https://public.zapper.xyz/graphql";

const TOKEN_BALANCES_QUERY: &str = "query TokenBalances($addresses: [Address!]!, $first: Int) {
    portfolioV2(addresses: $addresses) {
      tokenBalances {
        totalBalanceUSD
        byToken(first: $first) {
          totalCount
          edges {
            node {
              symbol
              tokenAddress
              balance
              balanceUSD
              price
              imgUrlV2
              name
              network { name }
            }
          }
        }
      }
    }
  }";

const APP_BALANCES_QUERY: &str = "query AppBalances($addresses: [Address!]!) {
    portfolioV2(addresses: $addresses) {
      appBalances {
        totalBalanceUSD
        byApp {
          totalCount
          edges {
            node {
              appId
              balanceUSD
            }
          }
        }
      }
    }
  }";

const NFT_BALANCES_QUERY: &str = "query NftBalances($owners: [Address!]!, $first: Int) {
    nftUsersTokens(owners: $owners, first: $first) {
      edges {
        node {
          tokenId
          name
          collection { name address floorPriceEth }
          estimatedValueEth
          mediasV3 { images { url } }
        }
      }
    }
  }";

#[derive(Debug, thiserror::Error)]
pub enum ZapperError {
    #[error("Zapper request failed: {0}")]
    Request(String),
}

async fn query(
    http: &Client,
    api_key: &str,
    query: &str,
    variables: Value,
) -> Result<Value, ZapperError> {
    let response = http
        .post(ZAPPER_GQL)
        .header("x-zapper-api-key", api_key)
        .json(&json!({ "query": query, "variables": variables }))
        .send()
        .await
        .map_err(|e| ZapperError::Request(e.to_string()))?;

    response
        .json()
        .await
        .map_err(|e| ZapperError::Request(e.to_string()))
}

/// Token balances across both wallets, `first` tokens per wallet.
pub async fn token_balances(
    http: &Client,
    api_key: &str,
    addresses: &[&str],
    first: u32,
) -> Result<Value, ZapperError> {
    query(
        http,
        api_key,
        TOKEN_BALANCES_QUERY,
        json!({ "addresses": addresses, "first": first }),
    )
    .await
}

/// DeFi app positions.
pub async fn app_balances(
    http: &Client,
    api_key: &str,
    addresses: &[&str],
) -> Result<Value, ZapperError> {
    query(
        http,
        api_key,
        APP_BALANCES_QUERY,
        json!({ "addresses": addresses }),
    )
    .await
}

/// NFT holdings.
pub async fn nft_balances(
    http: &Client,
    api_key: &str,
    owners: &[&str],
    first: u32,
) -> Result<Value, ZapperError> {
    query(
        http,
        api_key,
        NFT_BALANCES_QUERY,
        json!({ "owners": owners, "first": first }),
    )
    .await
}

/// Pull a nested field out of a GraphQL response, `None` when absent.
pub fn extract<'a>(response: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = response;
    for segment in path {
        current = current.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_walks_nested_fields() {
        let doc = json!({
            "data": { "portfolioV2": { "tokenBalances": { "totalBalanceUSD": 42.5 } } }
        });
        let balances = extract(&doc, &["data", "portfolioV2", "tokenBalances"]);
        assert_eq!(
            balances.and_then(|v| v.get("totalBalanceUSD")),
            Some(&json!(42.5))
        );
        assert!(extract(&doc, &["data", "missing"]).is_none());
    }
}
