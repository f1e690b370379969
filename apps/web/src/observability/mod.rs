//! Observability module - request IDs on top of the tracing subscriber.

mod request_id;

pub use request_id::{RequestId, RequestIdMiddleware};
