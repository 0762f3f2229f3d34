use serde::Deserialize;

/// Body of `POST /api/books/{id}/reviews`.
///
/// Fields are optional so a missing value is reported in the envelope
/// instead of as a deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    /// 1 through 5
    pub rating: Option<i64>,
    pub comment: Option<String>,
}
