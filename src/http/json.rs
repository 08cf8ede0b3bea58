use axum::{
    Json,
    extract::{FromRequest, OptionalFromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::error::{BulkheadError, ErrorCode};

/// JSON body extractor whose rejection is a regular [`BulkheadError`].
///
/// A malformed or mistyped body is answered with the usual error envelope and
/// `INVALID_REQUEST` instead of axum's plain-text rejection.
///
/// # Example
///
/// ```rust,ignore
/// async fn create(ApiJson(req): ApiJson<CreateUser>) -> bulkhead::Result<Json<User>> {
///     // ...
/// }
/// ```
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = BulkheadError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = <Json<T> as FromRequest<S>>::from_request(req, state)
            .await
            .map_err(invalid_body)?;
        Ok(ApiJson(value))
    }
}

/// A request without a JSON content type yields `None`.
impl<T, S> OptionalFromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = BulkheadError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let json = <Json<T> as OptionalFromRequest<S>>::from_request(req, state)
            .await
            .map_err(invalid_body)?;
        Ok(json.map(|Json(value)| ApiJson(value)))
    }
}

fn invalid_body(rejection: JsonRejection) -> BulkheadError {
    BulkheadError::bad_request(
        ErrorCode::InvalidRequest,
        format!("Invalid JSON: {}", rejection.body_text()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Body1 {
        name: String,
    }

    fn request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body() {
        let ApiJson(body) = <ApiJson<Body1> as FromRequest<()>>::from_request(request(r#"{"name":"x"}"#), &())
            .await
            .unwrap();
        assert_eq!(body.name, "x");
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_request() {
        let err = <ApiJson<Body1> as FromRequest<()>>::from_request(request("{"), &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);

        let err = <ApiJson<Body1> as FromRequest<()>>::from_request(request(r#"{"name":1}"#), &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn test_missing_body_is_none_when_optional() {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let body = <ApiJson<Body1> as OptionalFromRequest<()>>::from_request(req, &())
            .await
            .unwrap();
        assert!(body.is_none());
    }
}
