//! Rate limiting middleware for the account pages.

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::ContentType,
};
use askama::Template;
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use quill_core::ports::RateLimiter;
use quill_shared::ErrorResponse;

use crate::observability::RequestId;
use crate::views::ErrorPage;

/// Rate limiting middleware factory.
pub struct RateLimitMiddleware {
    limiter: Arc<dyn RateLimiter>,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Arc<dyn RateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Arc<dyn RateLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let limiter = self.limiter.clone();

        // The socket peer, not `X-Forwarded-For`, which any client can rotate.
        let key = client_key(&req);

        Box::pin(async move {
            match limiter.check(&key).await {
                Ok(result) if !result.allowed => {
                    let retry_after = result.reset_after.as_secs().max(1);
                    tracing::warn!(client = %key, retry_after, "Rate limit exceeded");

                    let mut problem = ErrorResponse::too_many_requests(retry_after)
                        .with_instance(req.path());
                    if let Some(id) = RequestId::of(req.request()) {
                        problem = problem.with_request_id(id.as_str());
                    }
                    let response = too_many_requests(problem, retry_after);
                    Ok(req.into_response(response).map_into_right_body())
                }
                outcome => {
                    if let Err(e) = outcome {
                        tracing::error!("Rate limiter error, failing open: {}", e);
                    }
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
            }
        })
    }
}

fn client_key(req: &ServiceRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn too_many_requests(problem: ErrorResponse, retry_after: u64) -> HttpResponse {
    let mut builder = HttpResponse::TooManyRequests();
    builder
        .insert_header(("X-RateLimit-Remaining", "0"))
        .insert_header(("Retry-After", retry_after.to_string()));

    match ErrorPage::from(problem.clone()).render() {
        Ok(html) => builder.content_type(ContentType::html()).body(html),
        Err(e) => {
            tracing::error!("Failed to render error page: {}", e);
            builder.json(problem)
        }
    }
}
