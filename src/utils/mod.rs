//! Helpers shared by the route handlers.

use axum::{extract::rejection::JsonRejection, Json};
use bookshop_http::AppError;

/// Parse a numeric path segment, reporting bad input in the standard envelope.
pub fn parse_id(raw: &str, what: &str) -> Result<u64, AppError> {
    raw.parse()
        .map_err(|_| AppError::bad_request(format!("Invalid {what} id: {raw}")))
}

/// Unwrap a JSON body, turning malformed payloads into 400s.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

/// Formats a shared log prefix for project logs.
pub fn log_prefix(module: &str) -> String {
    format!("bookshop::{module}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_ids() {
        assert_eq!(parse_id("42", "book").unwrap(), 42);
    }

    #[test]
    fn rejects_non_numeric_ids() {
        let err = parse_id("abc", "book").unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
        assert!(err.to_string().contains("Invalid book id: abc"));

        assert!(parse_id("-1", "book").is_err());
    }
}
