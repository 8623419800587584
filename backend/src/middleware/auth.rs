//! Bearer-token boundary in front of the resource routes.
//!
//! When a token is configured every request must carry
//! `Authorization: Bearer <token>`; anything else is answered with a `401`
//! envelope before the handler runs. Without a configured token the boundary
//! lets every request through. Health probes and API docs are mounted outside
//! the wrapped scope.

use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::{StatusCode, header};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::domain::Error as DomainError;
use crate::inbound::http::error::envelope_response;

/// Message returned when the token is missing or wrong.
pub const UNAUTHENTICATED_MESSAGE: &str = "Unauthenticated.";

/// Bearer-token guard.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use booking_backend::BearerAuth;
///
/// let app = App::new().wrap(BearerAuth::new(Some("s3cret".to_owned())));
/// ```
#[derive(Clone, Default)]
pub struct BearerAuth {
    token: Option<Arc<str>>,
}

impl BearerAuth {
    /// Guard requiring `token`; `None` or a blank token disables the check.
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token
                .filter(|token| !token.trim().is_empty())
                .map(Arc::from),
        }
    }

    /// Whether requests are checked at all.
    pub fn is_enforced(&self) -> bool {
        self.token.is_some()
    }
}

fn presented_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Compare SHA-256 digests byte by byte without short-circuiting, so timing
/// depends on neither the token contents nor their lengths.
fn tokens_match(presented: &str, expected: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    presented
        .iter()
        .zip(expected.iter())
        .fold(0_u8, |acc, (left, right)| acc | (left ^ right))
        == 0
}

impl<S, B> Transform<S, ServiceRequest> for BearerAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = BearerAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BearerAuthMiddleware {
            service,
            token: self.token.clone(),
        }))
    }
}

/// Service wrapper produced by [`BearerAuth`].
pub struct BearerAuthMiddleware<S> {
    service: S,
    token: Option<Arc<str>>,
}

impl<S, B> Service<ServiceRequest> for BearerAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let allowed = self.token.as_deref().is_none_or(|expected| {
            presented_token(&req).is_some_and(|presented| tokens_match(presented, expected))
        });
        if allowed {
            let fut = self.service.call(req);
            return Box::pin(async move { Ok(fut.await?.map_into_left_body()) });
        }

        warn!(method = %req.method(), path = req.path(), "rejected unauthenticated request");
        let response = envelope_response(
            &DomainError::unauthorized(UNAUTHENTICATED_MESSAGE),
            StatusCode::UNAUTHORIZED,
        )
        .map_into_right_body();
        Box::pin(async move { Ok(req.into_response(response)) })
    }
}
