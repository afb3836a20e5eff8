//! Gateway-injected identity header extractors.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-cookbook-user-id";

/// User identity injected by the gateway via the `x-cookbook-user-id` header.
///
/// Returns 401 if the header is absent or cannot be parsed as a UUID.
/// Ownership checks (403) are done by usecases after extraction.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: Uuid,
}

/// Optional identity for endpoints that serve anonymous callers.
///
/// Never rejects: a missing or malformed header yields `MaybeIdentity(None)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaybeIdentity(pub Option<Identity>);

impl MaybeIdentity {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.map(|i| i.user_id)
    }
}

fn user_id_from_parts(parts: &Parts) -> Option<Uuid> {
    parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<Uuid>().ok())
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // In Rust 1.82+ precise capturing, `async fn` captures lifetimes differently,
    // causing E0195. Fix: extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let user_id = user_id_from_parts(parts);
        async move {
            let user_id = user_id.ok_or(StatusCode::UNAUTHORIZED)?;
            Ok(Self { user_id })
        }
    }
}

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let user_id = user_id_from_parts(parts);
        async move { Ok(Self(user_id.map(|user_id| Identity { user_id }))) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRequestParts;
    use http::Request;

    fn request_parts(headers: Vec<(&str, &str)>) -> Parts {
        let mut builder = Request::builder().method("GET").uri("/test");
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        let request = builder.body(()).unwrap();
        let (parts, _body) = request.into_parts();
        parts
    }

    #[tokio::test]
    async fn should_extract_valid_identity_header() {
        let user_id = Uuid::new_v4();
        let mut parts = request_parts(vec![(USER_ID_HEADER, &user_id.to_string())]);
        let identity = Identity::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(identity.user_id, user_id);
    }

    #[tokio::test]
    async fn should_reject_missing_user_id() {
        let mut parts = request_parts(vec![]);
        let result = Identity::from_request_parts(&mut parts, &()).await;
        assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn should_reject_invalid_uuid() {
        let mut parts = request_parts(vec![(USER_ID_HEADER, "not-a-uuid")]);
        let result = Identity::from_request_parts(&mut parts, &()).await;
        assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn should_extract_maybe_identity_when_header_present() {
        let user_id = Uuid::new_v4();
        let mut parts = request_parts(vec![(USER_ID_HEADER, &user_id.to_string())]);
        let maybe = MaybeIdentity::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(maybe.user_id(), Some(user_id));
    }

    #[tokio::test]
    async fn should_yield_none_for_anonymous_caller() {
        let mut parts = request_parts(vec![]);
        let maybe = MaybeIdentity::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(maybe.user_id().is_none());
    }

    #[tokio::test]
    async fn should_yield_none_for_malformed_header() {
        let mut parts = request_parts(vec![(USER_ID_HEADER, "garbage")]);
        let maybe = MaybeIdentity::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(maybe.user_id().is_none());
    }
}
