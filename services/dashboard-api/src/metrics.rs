//! Prometheus instrumentation.

use std::time::Duration;

use metrics::{counter, histogram};

pub fn record_cache_hit() {
    counter!("overlay_cache_hits_total").increment(1);
}

pub fn record_cache_miss() {
    counter!("overlay_cache_misses_total").increment(1);
}

/// One overlay render, labelled by layer family (`ndvi`, `delta_ndbi`, ...).
pub fn record_render(layer: &'static str, duration: Duration) {
    counter!("overlay_renders_total", "layer" => layer).increment(1);
    histogram!("overlay_render_duration_ms", "layer" => layer).record(duration.as_secs_f64() * 1000.0);
}

pub fn record_request_error(code: &'static str) {
    counter!("request_errors_total", "code" => code).increment(1);
}
