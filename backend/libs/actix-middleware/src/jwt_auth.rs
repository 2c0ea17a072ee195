use crate::rejection::GateRejection;
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use operator_auth::{AuthError, AuthenticatedPrincipal, TokenValidator};
use std::ops::Deref;
use std::rc::Rc;
use std::sync::Arc;

/// Operator principal attached by [`OperatorAuthMiddleware`]
#[derive(Debug, Clone)]
pub struct Operator(pub AuthenticatedPrincipal);

impl Deref for Operator {
    type Target = AuthenticatedPrincipal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Bearer token gate for operator routes
///
/// Requests without a valid token are answered with 401 here and never reach
/// the wrapped service.
#[derive(Clone)]
pub struct OperatorAuthMiddleware {
    validator: Arc<TokenValidator>,
}

impl OperatorAuthMiddleware {
    pub fn new(validator: Arc<TokenValidator>) -> Self {
        Self { validator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for OperatorAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = OperatorAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(OperatorAuthMiddlewareService {
            service: Rc::new(service),
            validator: self.validator.clone(),
        }))
    }
}

pub struct OperatorAuthMiddlewareService<S> {
    service: Rc<S>,
    validator: Arc<TokenValidator>,
}

impl<S, B> Service<ServiceRequest> for OperatorAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let outcome = bearer_token(&req).and_then(|token| self.validator.validate(token));

        match outcome {
            Ok(principal) => {
                tracing::debug!(jti = %principal.token_id(), "operator token accepted");
                req.extensions_mut().insert(Operator(principal));

                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            Err(e) => {
                if e.is_rejection() {
                    tracing::debug!(reason = e.kind(), path = %req.path(), "operator request rejected");
                } else {
                    tracing::warn!(error = %e, path = %req.path(), "token validation failed");
                }

                let response = GateRejection::Unauthorized(e).error_response();
                Box::pin(ready(Ok(req.into_response(response).map_into_right_body())))
            }
        }
    }
}

/// Token from an `Authorization: Bearer <token>` header.
fn bearer_token(req: &ServiceRequest) -> Result<&str, AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::Missing)?;

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::Missing)?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::Missing);
    }

    Ok(token.trim())
}

/// FromRequest implementation for Operator
impl actix_web::FromRequest for Operator {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        match req.extensions().get::<Operator>() {
            Some(operator) => ready(Ok(operator.clone())),
            None => ready(Err(GateRejection::Unauthorized(AuthError::Missing).into())),
        }
    }
}
