// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! IdP session cookie handling.

use axum::http::HeaderMap;

use crate::config::SESSION_TTL_SECS;

/// Cookie carrying the opaque session id.
pub const SESSION_COOKIE: &str = "idp_session";

/// Cookie set by the fronting access-control layer.
pub const ACCESS_COOKIE: &str = "CF_Authorization";

/// Extract a cookie value from the request headers.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

/// `Set-Cookie` value for a freshly minted session.
///
/// HttpOnly + Secure + SameSite=Lax; Max-Age matches the session record's
/// store TTL so the cookie and the record expire together.
pub fn session_cookie_header(session_id: &str) -> String {
    format!(
        "{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age={SESSION_TTL_SECS}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, value.parse().unwrap());
        headers
    }

    #[test]
    fn finds_cookie_among_several() {
        let headers = headers_with_cookie("a=1; idp_session=sess-42; b=2");
        assert_eq!(
            get_cookie(&headers, SESSION_COOKIE),
            Some("sess-42".to_string())
        );
        assert_eq!(get_cookie(&headers, "a"), Some("1".to_string()));
    }

    #[test]
    fn missing_cookie_is_none() {
        let headers = headers_with_cookie("other=x");
        assert!(get_cookie(&headers, SESSION_COOKIE).is_none());
        assert!(get_cookie(&HeaderMap::new(), SESSION_COOKIE).is_none());
    }

    #[test]
    fn session_cookie_has_security_attributes() {
        let header = session_cookie_header("abc");
        assert!(header.starts_with("idp_session=abc;"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Secure"));
        assert!(header.contains("SameSite=Lax"));
        assert!(header.contains("Max-Age=86400"));
    }
}
