//! Timing helpers for stream commands.
//!
//! The stream worker wraps every kernel launch in a [`PerformanceSpan`] and
//! reports host/device copies through [`record_transfer`].

use std::time::Instant;

/// Target of every performance span and event, toggled by
/// [`TracingConfig::enable_performance_tracing`](crate::TracingConfig::enable_performance_tracing).
pub const PERF_TARGET: &str = "offload_perf";

/// RAII timer that logs its duration on drop when it crosses a threshold.
pub struct PerformanceSpan {
    name: String,
    threshold_us: Option<u64>,
    start: Instant,
    span: tracing::Span,
}

impl PerformanceSpan {
    /// Start timing `name`. With `threshold_us = None` every span is logged.
    pub fn new(name: impl Into<String>, threshold_us: Option<u64>) -> Self {
        let name = name.into();
        let span = tracing::debug_span!(target: PERF_TARGET, "perf", name = %name);
        Self {
            name,
            threshold_us,
            start: Instant::now(),
            span,
        }
    }

    /// Span name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Microseconds since the span started.
    pub fn elapsed_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    /// Enter the underlying tracing span.
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for PerformanceSpan {
    fn drop(&mut self) {
        let elapsed_us = self.elapsed_us();
        if self.threshold_us.is_none_or(|t| elapsed_us >= t) {
            let _entered = self.span.enter();
            tracing::debug!(
                target: PERF_TARGET,
                duration_us = elapsed_us,
                duration_ms = elapsed_us as f64 / 1000.0,
                "performance_span_complete"
            );
        }
    }
}

/// Bandwidth in MiB/s for `bytes` moved in `duration_us`.
pub fn bandwidth_mbps(bytes: usize, duration_us: u64) -> f64 {
    if duration_us == 0 {
        return 0.0;
    }
    (bytes as f64 / duration_us as f64) * 1_000_000.0 / (1024.0 * 1024.0)
}

/// Record a host/device copy. `direction` is `"H2D"` or `"D2H"`.
pub fn record_transfer(bytes: usize, direction: &str, duration_us: u64) {
    tracing::debug!(
        target: PERF_TARGET,
        event = "transfer",
        bytes = bytes,
        kb = bytes as f64 / 1024.0,
        direction = direction,
        duration_us = duration_us,
        bandwidth_mbps = bandwidth_mbps(bytes, duration_us),
        "data_transfer"
    );
}

/// Record a finished kernel with its element throughput.
pub fn record_kernel(kernel: &str, elements: usize, duration_us: u64) {
    let elements_per_sec = if duration_us > 0 {
        (elements as f64 / duration_us as f64) * 1_000_000.0
    } else {
        0.0
    };

    tracing::debug!(
        target: PERF_TARGET,
        event = "kernel",
        kernel = kernel,
        elements = elements,
        duration_us = duration_us,
        elements_per_sec = elements_per_sec,
        "kernel_complete"
    );
}
