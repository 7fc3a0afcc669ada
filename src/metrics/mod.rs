// Metrics module - Prometheus metrics for the HTTP surface
//
// Provides:
// - Request counters by endpoint and status code
// - Render duration histograms by operation
// - Text exposition for GET /metrics

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Instant;

/// Request and render metrics backed by a dedicated registry.
///
/// Each instance owns its registry, so several routers (e.g. in tests) can
/// coexist without name clashes.
#[derive(Clone)]
pub struct ServiceMetrics {
    registry: Registry,

    /// Total requests by endpoint and status code
    pub requests: IntCounterVec,

    /// Image work duration in seconds by operation
    pub render_duration: HistogramVec,
}

impl ServiceMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new(
                "qr_builder_requests_total",
                "Total number of handled requests by endpoint and status",
            ),
            &["endpoint", "status"],
        )?;
        registry.register(Box::new(requests.clone()))?;

        let render_duration = HistogramVec::new(
            HistogramOpts::new(
                "qr_builder_render_duration_seconds",
                "Duration of QR rendering and compositing in seconds",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]), // 1ms to 10s
            &["operation"],
        )?;
        registry.register(Box::new(render_duration.clone()))?;

        Ok(Self {
            registry,
            requests,
            render_duration,
        })
    }

    pub fn record_request(&self, endpoint: &str, status: u16) {
        let status = status.to_string();
        self.requests
            .with_label_values(&[endpoint, status.as_str()])
            .inc();
    }

    /// Start timing an operation
    ///
    /// # Example
    /// ```ignore
    /// let timer = metrics.start_render_timer("embed");
    /// // ... render ...
    /// timer.observe_duration();
    /// ```
    pub fn start_render_timer(&self, operation: &str) -> RenderTimer {
        RenderTimer {
            histogram: self.render_duration.with_label_values(&[operation]),
            start: Instant::now(),
        }
    }

    /// Prometheus text exposition of every registered metric.
    pub fn export(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl std::fmt::Debug for ServiceMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceMetrics").finish_non_exhaustive()
    }
}

/// Timer for render operations
pub struct RenderTimer {
    histogram: prometheus::Histogram,
    start: Instant,
}

impl RenderTimer {
    /// Observe the elapsed duration and record it
    pub fn observe_duration(self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
