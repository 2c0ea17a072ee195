//! Access log middleware
//!
//! One structured line per request. Query strings and headers are left out so
//! tokens never reach the log; an authenticated request is tied to its token
//! by `jti` instead.

use crate::jwt_auth::Operator;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::StatusCode,
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::net::IpAddr;
use std::time::Instant;
use tracing::{error, info, warn};

/// How a request ended, as far as an auditor cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Served,
    /// Gate or login refused the caller
    Rejected,
    Throttled,
    Fault,
}

impl Outcome {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Outcome::Rejected,
            StatusCode::TOO_MANY_REQUESTS => Outcome::Throttled,
            s if s.is_server_error() => Outcome::Fault,
            _ => Outcome::Served,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Served => "served",
            Outcome::Rejected => "rejected",
            Outcome::Throttled => "throttled",
            Outcome::Fault => "fault",
        }
    }
}

/// Access log for the operator API
#[derive(Clone, Default)]
pub struct AccessLog;

impl<S, B> Transform<S, ServiceRequest> for AccessLog
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessLogService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessLogService { service }))
    }
}

pub struct AccessLogService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AccessLogService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_string();
        let client: Option<IpAddr> = req.peer_addr().map(|addr| addr.ip());

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await;
            let duration_ms = start.elapsed().as_millis() as u64;
            let client = client.map(|ip| ip.to_string()).unwrap_or_default();

            let res = match res {
                Ok(res) => res,
                Err(e) => {
                    error!(
                        method = %method,
                        path = %path,
                        client = %client,
                        error = %e,
                        duration_ms,
                        "request failed before a response was built"
                    );
                    return Err(e);
                }
            };

            let status = res.status().as_u16();
            let outcome = Outcome::from_status(res.status());
            let jti = res
                .request()
                .extensions()
                .get::<Operator>()
                .map(|operator| operator.token_id().to_string())
                .unwrap_or_default();

            match outcome {
                Outcome::Served => info!(
                    method = %method, path = %path, client = %client,
                    status, outcome = outcome.as_str(), jti = %jti, duration_ms,
                    "request"
                ),
                Outcome::Rejected | Outcome::Throttled => warn!(
                    method = %method, path = %path, client = %client,
                    status, outcome = outcome.as_str(), duration_ms,
                    "request"
                ),
                Outcome::Fault => error!(
                    method = %method, path = %path, client = %client,
                    status, outcome = outcome.as_str(), jti = %jti, duration_ms,
                    "request"
                ),
            }

            Ok(res)
        })
    }
}
