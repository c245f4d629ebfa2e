// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        AuthorizationCodeRecord, IdpSessionRecord, PendingAuthorizationRequest, TokenResponse,
        VerificationVerdict,
    },
    state::AppState,
};

pub mod discovery;
pub mod identity;
pub mod oauth;
pub mod portfolio;
pub mod saml;
pub mod simulate;
pub mod sso;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route(
            "/.well-known/openid-configuration",
            get(discovery::openid_configuration),
        )
        .route("/.well-known/jwks.json", get(discovery::jwks))
        .route("/oauth/authorize", get(oauth::authorize))
        .route("/oauth/github-callback", get(oauth::github_callback))
        .route("/oauth/token", post(oauth::token))
        .route("/oauth/userinfo", get(oauth::userinfo))
        .route("/saml/metadata", get(saml::metadata))
        .route("/saml/sso", get(saml::sso).post(saml::sso))
        .route("/saml/acs", post(saml::acs))
        .route("/saml/slo", get(saml::slo))
        .route("/sso/session", get(sso::session))
        .route("/sso/login", get(sso::login))
        .route("/sso/logout", get(sso::logout))
        .route("/identity", get(identity::summary))
        .route("/whoami", get(identity::summary))
        .route("/identity/onchain", get(identity::onchain))
        .route("/identity/balance", get(identity::balance))
        .route("/identity/safe", get(identity::safe))
        .route("/identity/orcid", get(identity::orcid_record))
        .route("/identity/chains", get(identity::chains))
        .route("/identity/portfolio", get(portfolio::portfolio))
        .route("/identity/tokens", get(portfolio::tokens))
        .route("/identity/defi", get(portfolio::defi))
        .route("/identity/nfts", get(portfolio::nfts))
        .route("/identity/simulate", post(simulate::simulate))
        .route(
            "/identity/simulate-diamondcut",
            post(simulate::simulate_diamondcut),
        )
        .route("/identity/verify", get(simulate::verify))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        discovery::openid_configuration,
        discovery::jwks,
        oauth::authorize,
        oauth::github_callback,
        oauth::token,
        oauth::userinfo,
        saml::metadata,
        saml::sso,
        saml::acs,
        saml::slo,
        sso::session,
        sso::login,
        sso::logout,
        identity::summary,
        identity::onchain,
        identity::balance,
        identity::safe,
        identity::orcid_record,
        identity::chains,
        portfolio::portfolio,
        portfolio::tokens,
        portfolio::defi,
        portfolio::nfts,
        simulate::simulate,
        simulate::simulate_diamondcut,
        simulate::verify
    ),
    components(
        schemas(
            PendingAuthorizationRequest,
            AuthorizationCodeRecord,
            IdpSessionRecord,
            TokenResponse,
            VerificationVerdict
        )
    ),
    tags(
        (name = "Discovery", description = "OIDC discovery documents"),
        (name = "OAuth", description = "OAuth 2.0 / OIDC authorization code flow"),
        (name = "SAML", description = "SAML 2.0 IdP"),
        (name = "SSO", description = "Session introspection"),
        (name = "Identity", description = "Identity summary and on-chain verification"),
        (name = "Portfolio", description = "Portfolio proxying"),
        (name = "Simulation", description = "Transaction simulation and contract verification")
    )
)]
struct ApiDoc;
