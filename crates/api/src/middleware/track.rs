//! In-flight request tracking.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::state::AppState;

/// Count of requests currently inside the middleware stack.
///
/// One handle lives in [`AppState`] for the middleware to bump; the
/// health endpoint reads the same counter.
#[derive(Clone, Default)]
pub struct RequestGauge {
    in_flight: Arc<AtomicI64>,
}

impl RequestGauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> i64 {
        self.in_flight.load(Ordering::Relaxed)
    }
}

/// Middleware keeping [`RequestGauge`] current. Sits outside the panic
/// handler, so the decrement runs even when a handler panics.
pub async fn track_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    state.request_gauge.in_flight.fetch_add(1, Ordering::Relaxed);
    let response = next.run(request).await;
    state.request_gauge.in_flight.fetch_sub(1, Ordering::Relaxed);
    response
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
