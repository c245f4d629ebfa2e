// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! ORCID public record client.
//!
//! The ORCID registry uses kebab-case field names, so the raw record is
//! reshaped into a flat document before it reaches any response body.

use reqwest::Client;
use serde_json::{json, Value};

const ORCID_API: &str = "https://pub.orcid.org/v3.0";

/// Fetch and reshape the public ORCID record for `orcid_id`.
///
/// A fetch failure degrades to an `{"error": ...}` document rather than
/// an error, since the record is an enrichment and not load-bearing.
pub async fn fetch_record(http: &Client, orcid_id: &str, fallback_name: &str) -> Value {
    let response = match http
        .get(format!("{ORCID_API}/{orcid_id}/record"))
        .header("Accept", "application/json")
        .send()
        .await
    {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            return json!({ "error": format!("ORCID registry returned {}", r.status()) });
        }
        Err(e) => {
            return json!({ "error": format!("Failed to fetch ORCID record: {e}") });
        }
    };

    let data: Value = match response.json().await {
        Ok(v) => v,
        Err(e) => {
            return json!({ "error": format!("Failed to fetch ORCID record: {e}") });
        }
    };

    reshape(&data, orcid_id, fallback_name)
}

fn reshape(data: &Value, orcid_id: &str, fallback_name: &str) -> Value {
    let person = data.get("person");
    let name = person.and_then(|p| p.get("name"));

    let display_name = name
        .and_then(|n| n.get("credit-name"))
        .and_then(|c| c.get("value"))
        .and_then(Value::as_str)
        .unwrap_or(fallback_name);

    let emails: Vec<Value> = person
        .and_then(|p| p.get("emails"))
        .and_then(|e| e.get("email"))
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .map(|e| {
                    json!({
                        "email": e.get("email").cloned().unwrap_or(Value::Null),
                        "verified": e.get("verified").cloned().unwrap_or(Value::Null),
                        "primary": e.get("primary").cloned().unwrap_or(Value::Null),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let urls: Vec<Value> = person
        .and_then(|p| p.get("researcher-urls"))
        .and_then(|r| r.get("researcher-url"))
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .map(|u| {
                    json!({
                        "name": u.get("url-name").cloned().unwrap_or(Value::Null),
                        "url": u.get("url").and_then(|v| v.get("value")).cloned().unwrap_or(Value::Null),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    json!({
        "orcid_id": orcid_id,
        "url": format!("https://orcid.org/{orcid_id}"),
        "display_name": display_name,
        "given_names": name
            .and_then(|n| n.get("given-names"))
            .and_then(|g| g.get("value"))
            .cloned()
            .unwrap_or(Value::Null),
        "family_name": name
            .and_then(|n| n.get("family-name"))
            .and_then(|f| f.get("value"))
            .cloned()
            .unwrap_or(Value::Null),
        "country": person
            .and_then(|p| p.get("addresses"))
            .and_then(|a| a.get("address"))
            .and_then(|a| a.get(0))
            .and_then(|a| a.get("country"))
            .and_then(|c| c.get("value"))
            .cloned()
            .unwrap_or_else(|| json!("US")),
        "emails": emails,
        "urls": urls,
        "last_modified": data
            .get("history")
            .and_then(|h| h.get("last-modified-date"))
            .and_then(|d| d.get("value"))
            .cloned()
            .unwrap_or(Value::Null),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reshape_flattens_registry_record() {
        let raw = json!({
            "person": {
                "name": {
                    "credit-name": { "value": "T. Magic" },
                    "given-names": { "value": "Theo" },
                    "family-name": { "value": "Magic" },
                },
                "emails": {
                    "email": [
                        { "email": "theosmagic.uni.eth@ethermail.io", "verified": true, "primary": false },
                    ]
                },
                "researcher-urls": {
                    "researcher-url": [
                        { "url-name": "IdP", "url": { "value": "https://bridgeworld.lol" } },
                    ]
                },
            },
            "history": { "last-modified-date": { "value": 1700000000000u64 } },
        });

        let record = reshape(&raw, "0009-0005-7822-7939", "fallback");
        assert_eq!(record["display_name"], "T. Magic");
        assert_eq!(record["given_names"], "Theo");
        assert_eq!(record["url"], "https://orcid.org/0009-0005-7822-7939");
        assert_eq!(record["emails"][0]["email"], "theosmagic.uni.eth@ethermail.io");
        assert_eq!(record["emails"][0]["verified"], true);
        assert_eq!(record["urls"][0]["url"], "https://bridgeworld.lol");
        assert_eq!(record["last_modified"], 1700000000000u64);
    }

    #[test]
    fn reshape_degrades_to_fallbacks_when_fields_missing() {
        let record = reshape(&json!({}), "0009-0005-7822-7939", "Θ fallback");
        assert_eq!(record["display_name"], "Θ fallback");
        assert_eq!(record["given_names"], Value::Null);
        assert_eq!(record["country"], "US");
        assert_eq!(record["emails"], json!([]));
    }
}
