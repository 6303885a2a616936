//! RFC 9457 Problem Details for HTTP APIs.
//!
//! Every error response the service emits is one of these: a
//! machine-classifiable `code`, an HTTP status, and a human-readable
//! detail. No stack traces or internal identifiers leak through.

use http::StatusCode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
fn serialize_status_code<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

fn deserialize_status_code<'de, D>(deserializer: D) -> Result<StatusCode, D::Error>
where
    D: Deserializer<'de>,
{
    let code = u16::deserialize(deserializer)?;
    StatusCode::from_u16(code).map_err(serde::de::Error::custom)
}

/// RFC 9457 problem document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[must_use]
pub struct Problem {
    /// A URI reference identifying the problem type.
    #[serde(rename = "type")]
    pub type_url: String,
    /// Short, human-readable summary of the problem type.
    pub title: String,
    /// HTTP status code, serialized as u16.
    #[serde(
        serialize_with = "serialize_status_code",
        deserialize_with = "deserialize_status_code"
    )]
    pub status: StatusCode,
    /// Human-readable explanation specific to this occurrence.
    pub detail: String,
    /// Machine-readable error code defined by the application.
    pub code: String,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_owned(),
            title: title.into(),
            status,
            detail: detail.into(),
            code: String::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }
}

impl axum::response::IntoResponse for Problem {
    fn into_response(self) -> axum::response::Response {
        use axum::http::HeaderValue;

        let status = self.status;
        let mut response = axum::Json(self).into_response();
        *response.status_mut() = status;
        response.headers_mut().insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        response
    }
}

/// Handler result type: success or a ready-to-send problem document.
pub type ApiResult<T> = Result<T, Problem>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_as_u16() {
        let problem = Problem::new(StatusCode::NOT_FOUND, "Not Found", "Cart not found: C1")
            .with_code("not_found");
        let json = serde_json::to_value(&problem).unwrap();
        assert_eq!(json["status"], 404);
        assert_eq!(json["type"], "about:blank");
        assert_eq!(json["code"], "not_found");
    }

    #[test]
    fn response_carries_problem_content_type() {
        use axum::response::IntoResponse;

        let response =
            Problem::new(StatusCode::CONFLICT, "Conflict", "Shop ID already exists").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            APPLICATION_PROBLEM_JSON
        );
    }
}
