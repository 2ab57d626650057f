//! Moderation pipeline metrics.
//!
//! Collectors live in [`content`] and register with the default prometheus
//! registry on first use; `GET /metrics` renders that registry.

use actix_web::http::header::ContentType;
use actix_web::HttpResponse;
use prometheus::{Encoder, TextEncoder};

pub mod content;

pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let mut body = Vec::new();

    match encoder.encode(&prometheus::gather(), &mut body) {
        Ok(()) => HttpResponse::Ok()
            .content_type(encoder.format_type())
            .body(body),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            HttpResponse::InternalServerError()
                .content_type(ContentType::plaintext())
                .body("failed to encode metrics")
        }
    }
}
