// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! SAML 2.0 IdP endpoints.
//!
//! Assertions are unsigned; the metadata advertises
//! `WantAuthnRequestsSigned="false"` accordingly. Signing requires the
//! same key material as RS256 ID tokens and lands together with it.

use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use base64ct::{Base64, Encoding};
use chrono::{Duration, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{identity::CanonicalIdentity, state::AppState};

/// Assertion validity window.
const ASSERTION_WINDOW_MINS: i64 = 5;
/// SAML session lifetime, matching the IdP session TTL.
const SESSION_HOURS: i64 = 24;

#[utoipa::path(
    get,
    path = "/saml/metadata",
    tag = "SAML",
    responses((status = 200, description = "IdP EntityDescriptor", content_type = "application/xml"))
)]
pub async fn metadata(State(state): State<AppState>) -> impl IntoResponse {
    let issuer = &state.config.issuer;
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<EntityDescriptor xmlns="urn:oasis:names:tc:SAML:2.0:metadata"
                  entityID="{issuer}/saml/metadata">
  <IDPSSODescriptor
    WantAuthnRequestsSigned="false"
    protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol">
    <NameIDFormat>urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress</NameIDFormat>
    <SingleSignOnService
      Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect"
      Location="{issuer}/saml/sso"/>
    <SingleSignOnService
      Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST"
      Location="{issuer}/saml/sso"/>
    <SingleLogoutService
      Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect"
      Location="{issuer}/saml/slo"/>
  </IDPSSODescriptor>
</EntityDescriptor>"#
    );

    ([(header::CONTENT_TYPE, "application/xml")], xml)
}

/// Build the success response with the canonical subject's assertion.
pub fn saml_response(
    identity: &CanonicalIdentity,
    issuer: &str,
    request_id: &str,
    acs_url: &str,
    audience: &str,
) -> String {
    let now = Utc::now();
    let not_on_or_after = now + Duration::minutes(ASSERTION_WINDOW_MINS);
    let session_expiry = now + Duration::hours(SESSION_HOURS);
    let issue_instant = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let expiry_instant = not_on_or_after.to_rfc3339_opts(SecondsFormat::Millis, true);
    let session_instant = session_expiry.to_rfc3339_opts(SecondsFormat::Millis, true);
    let response_id = format!("_{}", Uuid::new_v4());
    let assertion_id = format!("_{}", Uuid::new_v4());
    let groups = identity.groups.join(",");

    format!(
        r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
                   xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
                   ID="{response_id}"
                   InResponseTo="{request_id}"
                   IssueInstant="{issue_instant}"
                   Destination="{acs_url}"
                   Version="2.0">
  <saml:Issuer>{issuer}/saml/metadata</saml:Issuer>
  <samlp:Status>
    <samlp:StatusCode Value="urn:oasis:names:tc:SAML:2.0:status:Success"/>
  </samlp:Status>
  <saml:Assertion ID="{assertion_id}" IssueInstant="{issue_instant}" Version="2.0">
    <saml:Issuer>{issuer}/saml/metadata</saml:Issuer>
    <saml:Subject>
      <saml:NameID Format="urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress">{email}</saml:NameID>
      <saml:SubjectConfirmation Method="urn:oasis:names:tc:SAML:2.0:cm:bearer">
        <saml:SubjectConfirmationData InResponseTo="{request_id}"
                                       Recipient="{acs_url}"
                                       NotOnOrAfter="{expiry_instant}"/>
      </saml:SubjectConfirmation>
    </saml:Subject>
    <saml:Conditions NotBefore="{issue_instant}" NotOnOrAfter="{expiry_instant}">
      <saml:AudienceRestriction>
        <saml:Audience>{audience}</saml:Audience>
      </saml:AudienceRestriction>
    </saml:Conditions>
    <saml:AuthnStatement AuthnInstant="{issue_instant}"
                         SessionNotOnOrAfter="{session_instant}"
                         SessionIndex="{assertion_id}">
      <saml:AuthnContext>
        <saml:AuthnContextClassRef>urn:oasis:names:tc:SAML:2.0:ac:classes:PasswordProtectedTransport</saml:AuthnContextClassRef>
      </saml:AuthnContext>
    </saml:AuthnStatement>
    <saml:AttributeStatement>
      <saml:Attribute Name="email"><saml:AttributeValue>{email}</saml:AttributeValue></saml:Attribute>
      <saml:Attribute Name="primary_email"><saml:AttributeValue>{primary_email}</saml:AttributeValue></saml:Attribute>
      <saml:Attribute Name="name"><saml:AttributeValue>{name}</saml:AttributeValue></saml:Attribute>
      <saml:Attribute Name="groups"><saml:AttributeValue>{groups}</saml:AttributeValue></saml:Attribute>
      <saml:Attribute Name="ens"><saml:AttributeValue>{ens}</saml:AttributeValue></saml:Attribute>
      <saml:Attribute Name="eoa"><saml:AttributeValue>{eoa}</saml:AttributeValue></saml:Attribute>
      <saml:Attribute Name="safe"><saml:AttributeValue>{safe}</saml:AttributeValue></saml:Attribute>
      <saml:Attribute Name="orcid"><saml:AttributeValue>{orcid}</saml:AttributeValue></saml:Attribute>
    </saml:AttributeStatement>
  </saml:Assertion>
</samlp:Response>"#,
        email = identity.canonical_email,
        primary_email = identity.primary_email,
        name = identity.display_name,
        ens = identity.ens_name,
        eoa = identity.eoa,
        safe = identity.safe,
        orcid = identity.orcid_id,
    )
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SsoParams {
    #[serde(rename = "SAMLRequest")]
    pub saml_request: Option<String>,
    #[serde(rename = "RelayState")]
    pub relay_state: Option<String>,
    pub acs: Option<String>,
    pub audience: Option<String>,
}

/// Auto-submitting POST form carrying the base64 response to the ACS.
/// The single subject is pre-authenticated, so no login page exists.
#[utoipa::path(
    get,
    path = "/saml/sso",
    params(SsoParams),
    tag = "SAML",
    responses((status = 200, description = "Auto-submitting SAMLResponse form", content_type = "text/html"))
)]
pub async fn sso(State(state): State<AppState>, Query(params): Query<SsoParams>) -> Html<String> {
    let issuer = &state.config.issuer;
    let request_id = format!("_{}", Uuid::new_v4());
    let acs_url = params
        .acs
        .unwrap_or_else(|| format!("{issuer}/saml/acs"));
    let audience = params.audience.unwrap_or_else(|| issuer.clone());

    let response = saml_response(&state.identity, issuer, &request_id, &acs_url, &audience);
    let encoded = Base64::encode_string(response.as_bytes());

    let relay_input = params
        .relay_state
        .map(|relay| {
            format!(
                r#"<input type="hidden" name="RelayState" value="{}"/>"#,
                escape_attribute(&relay)
            )
        })
        .unwrap_or_default();

    Html(format!(
        r#"<!DOCTYPE html>
<html><body onload="document.forms[0].submit()">
<form method="POST" action="{acs_url}">
  <input type="hidden" name="SAMLResponse" value="{encoded}"/>
  {relay_input}
  <noscript><button type="submit">Continue</button></noscript>
</form>
</body></html>"#,
        acs_url = escape_attribute(&acs_url),
    ))
}

/// Escape caller-supplied text for HTML attribute positions.
fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[utoipa::path(
    post,
    path = "/saml/acs",
    tag = "SAML",
    responses((status = 200, description = "Assertion acknowledged"))
)]
pub async fn acs(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "authenticated",
        "identity": state.identity.canonical_email,
        "ens": state.identity.ens_name,
    }))
}

#[utoipa::path(
    get,
    path = "/saml/slo",
    tag = "SAML",
    responses((status = 200, description = "Logout acknowledged"))
)]
pub async fn slo(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "logged_out",
        "identity": state.identity.canonical_email,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assertion_binds_subject_request_and_audience() {
        let identity = CanonicalIdentity::default();
        let xml = saml_response(
            &identity,
            "https://idp.test",
            "_req-1",
            "https://sp.example/acs",
            "https://sp.example",
        );

        assert!(xml.contains(&format!(
            r#"<saml:NameID Format="urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress">{}</saml:NameID>"#,
            identity.canonical_email
        )));
        assert!(xml.contains(r#"InResponseTo="_req-1""#));
        assert!(xml.contains("<saml:Audience>https://sp.example</saml:Audience>"));
        assert!(xml.contains(&identity.eoa));
        assert!(xml.contains("owner,admin,signer"));
        assert!(xml.contains("urn:oasis:names:tc:SAML:2.0:status:Success"));
    }

    #[tokio::test]
    async fn sso_form_includes_relay_state_only_when_supplied() {
        let state = AppState::default();

        let Html(with_relay) = sso(
            State(state.clone()),
            Query(SsoParams {
                saml_request: None,
                relay_state: Some("relay-1".to_string()),
                acs: Some("https://sp.example/acs".to_string()),
                audience: None,
            }),
        )
        .await;
        assert!(with_relay.contains(r#"name="RelayState" value="relay-1""#));
        assert!(with_relay.contains(r#"action="https://sp.example/acs""#));
        assert!(with_relay.contains(r#"name="SAMLResponse""#));

        let Html(without_relay) = sso(
            State(state),
            Query(SsoParams {
                saml_request: None,
                relay_state: None,
                acs: None,
                audience: None,
            }),
        )
        .await;
        assert!(!without_relay.contains("RelayState"));
        // Defaults fall back to the issuer's own ACS.
        assert!(without_relay.contains(r#"action="https://bridgeworld.lol/saml/acs""#));
    }

    #[tokio::test]
    async fn sso_form_escapes_caller_supplied_markup() {
        let Html(html) = sso(
            State(AppState::default()),
            Query(SsoParams {
                saml_request: None,
                relay_state: Some(r#""><script>alert(1)</script>"#.to_string()),
                acs: Some(r#"https://sp.example/acs" onsubmit="x()"#.to_string()),
                audience: None,
            }),
        )
        .await;

        assert!(!html.contains("<script>"));
        assert!(!html.contains(r#"onsubmit="x()"#));
        assert!(html.contains("&quot;&gt;&lt;script&gt;"));
        assert!(html.contains(r#"action="https://sp.example/acs&quot; onsubmit=&quot;x()""#));
    }

    #[tokio::test]
    async fn sso_payload_decodes_to_the_assertion() {
        let Html(html) = sso(
            State(AppState::default()),
            Query(SsoParams {
                saml_request: None,
                relay_state: None,
                acs: None,
                audience: None,
            }),
        )
        .await;

        let marker = r#"name="SAMLResponse" value=""#;
        let start = html.find(marker).expect("payload input present") + marker.len();
        let end = html[start..].find('"').expect("value terminated") + start;
        let decoded = Base64::decode_vec(&html[start..end]).expect("payload is base64");
        let xml = String::from_utf8(decoded).expect("payload is UTF-8");
        assert!(xml.contains("samlp:Response"));
    }

    #[tokio::test]
    async fn acs_and_slo_acknowledge_with_identity() {
        let state = AppState::default();

        let Json(acs_body) = acs(State(state.clone())).await;
        assert_eq!(acs_body["status"], "authenticated");
        assert_eq!(acs_body["identity"], state.identity.canonical_email);

        let Json(slo_body) = slo(State(state.clone())).await;
        assert_eq!(slo_body["status"], "logged_out");
        assert_eq!(slo_body["identity"], state.identity.canonical_email);
    }
}
