use axum::http::header::COOKIE;
use axum::http::HeaderMap;

use crate::error::AppError;

const SESSION_COOKIE: &str = "admin_session";

/// Pull the admin session token out of the request's Cookie headers.
pub fn extract_session_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            (name.trim() == SESSION_COOKIE).then(|| value.trim())
        })
        .next()
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized("Missing admin session cookie"))
}

/// Check a presented session token against the configured one.
pub fn verify_session_token(presented: &str, expected: &str) -> Result<(), AppError> {
    if presented == expected {
        Ok(())
    } else {
        Err(AppError::unauthorized("Invalid admin session"))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use pretty_assertions::assert_eq;

    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_session_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; admin_session=tok-123; lang=en");
        assert_eq!(extract_session_token(&headers).unwrap(), "tok-123");
    }

    #[test]
    fn missing_cookie_is_unauthorized() {
        let headers = headers_with_cookie("theme=dark");
        assert!(extract_session_token(&headers).is_err());

        let empty = HeaderMap::new();
        assert!(extract_session_token(&empty).is_err());
    }

    #[test]
    fn empty_session_value_is_unauthorized() {
        let headers = headers_with_cookie("admin_session=");
        assert!(extract_session_token(&headers).is_err());
    }

    #[test]
    fn token_comparison_is_exact() {
        assert!(verify_session_token("tok", "tok").is_ok());
        assert!(verify_session_token("tok", "other").is_err());
        assert!(verify_session_token("Tok", "tok").is_err());
    }
}
