use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

lazy_static! {
    /// Content transforms by outcome (accepted, rejected, external_error, error).
    pub static ref CONTENT_TRANSFORM_TOTAL: IntCounterVec = register_int_counter_vec!(
        "content_transform_total",
        "Content transforms segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register content_transform_total");

    /// Latency of individual NER attempts.
    pub static ref NER_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "ner_request_duration_seconds",
        "NER request duration segmented by result",
        &["result"]
    )
    .expect("failed to register ner_request_duration_seconds");

    pub static ref CROSS_REFERENCES_RESOLVED_TOTAL: IntCounter = register_int_counter!(
        "cross_references_resolved_total",
        "Cross-reference tags rewritten into post links"
    )
    .expect("failed to register cross_references_resolved_total");
}
