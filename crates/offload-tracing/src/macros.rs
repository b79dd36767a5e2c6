//! Shorthand for performance instrumentation.

/// Start a [`crate::performance::PerformanceSpan`], optionally with fields.
///
/// ```rust
/// use offload_tracing::perf_span;
///
/// {
///     let _span = perf_span!("offload_array_add", elements = 1024);
/// } // duration logged here
/// ```
#[macro_export]
macro_rules! perf_span {
    ($name:expr) => {{
        $crate::performance::PerformanceSpan::new($name, None)
    }};
    ($name:expr, $($field:tt = $value:expr),+ $(,)?) => {{
        tracing::debug!(target: $crate::performance::PERF_TARGET, event = "perf_span_start", name = $name, $($field = $value),+);
        $crate::performance::PerformanceSpan::new($name, None)
    }};
}

/// Like [`perf_span!`] but only logs spans at least `threshold_us` long.
#[macro_export]
macro_rules! perf_span_threshold {
    ($name:expr, $threshold_us:expr) => {{
        $crate::performance::PerformanceSpan::new($name, $threshold_us)
    }};
}

/// Emit a debug event tagged with `event = $name`.
///
/// ```rust
/// use offload_tracing::perf_event;
///
/// perf_event!("buffer_released", bytes = 4096);
/// ```
#[macro_export]
macro_rules! perf_event {
    ($name:expr, $($field:tt = $value:expr),+ $(,)?) => {
        tracing::debug!(
            target: $crate::performance::PERF_TARGET,
            event = $name,
            $($field = $value),+
        );
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn perf_span_variants() {
        let _plain = perf_span!("plain");
        let _fields = perf_span!("with_fields", elements = 16, dtype = "f32");
        let _threshold = perf_span_threshold!("threshold", Some(1_000));
    }

    #[test]
    fn perf_event_accepts_fields() {
        perf_event!("test_event", bytes = 128, direction = "D2H");
    }
}
