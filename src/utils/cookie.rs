// src/utils/cookie.rs

use axum::http::{HeaderMap, header};

/// Name of the cookie carrying the session JWT.
pub const AUTH_COOKIE: &str = "authToken";

/// Name of the cookie binding an OAuth `state` to the browser that started the flow.
pub const OAUTH_STATE_COOKIE: &str = "oauthState";

/// Returns the value of cookie `name` from the request's `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value for an HttpOnly, SameSite=Lax cookie.
pub fn build_cookie(name: &str, value: &str, max_age_secs: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, value, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that expires cookie `name` immediately.
pub fn clear_cookie(name: &str, secure: bool) -> String {
    build_cookie(name, "", 0, secure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; authToken=abc.def.ghi; other=1"),
        );
        assert_eq!(read_cookie(&headers, AUTH_COOKIE), Some("abc.def.ghi"));
        assert_eq!(read_cookie(&headers, "theme"), Some("dark"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_counts_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("authToken="));
        assert_eq!(read_cookie(&headers, AUTH_COOKIE), None);
    }

    #[test]
    fn builds_and_clears() {
        assert_eq!(
            build_cookie(AUTH_COOKIE, "tok", 60, true),
            "authToken=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=60; Secure"
        );
        assert!(clear_cookie(AUTH_COOKIE, false).contains("Max-Age=0"));
    }
}
