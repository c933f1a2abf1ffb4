use prometheus::{
    CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Prometheus metrics for client operations
#[derive(Clone)]
pub struct ClientMetrics {
    pub requests_total: CounterVec,
    pub request_errors: CounterVec,
    pub request_latency: HistogramVec,
    pub bulk_batch_size: Histogram,

    registry: Arc<Registry>,
}

impl ClientMetrics {
    /// Create a new ClientMetrics instance with its own registry
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = CounterVec::new(
            Opts::new("docquery_requests_total", "Total number of operations by type"),
            &["op"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_errors = CounterVec::new(
            Opts::new(
                "docquery_request_errors_total",
                "Total number of failed operations by type and error kind",
            ),
            &["op", "kind"],
        )?;
        registry.register(Box::new(request_errors.clone()))?;

        let request_latency = HistogramVec::new(
            HistogramOpts::new("docquery_request_latency_seconds", "Operation latency")
                .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0]),
            &["op"],
        )?;
        registry.register(Box::new(request_latency.clone()))?;

        let bulk_batch_size = Histogram::with_opts(
            HistogramOpts::new(
                "docquery_bulk_batch_size",
                "Number of documents in bulk inserts",
            )
            .buckets(vec![1.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0]),
        )?;
        registry.register(Box::new(bulk_batch_size.clone()))?;

        Ok(Self {
            requests_total,
            request_errors,
            request_latency,
            bulk_batch_size,
            registry: Arc::new(registry),
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Record a finished operation
    pub fn record(&self, op: &str, duration_secs: f64, error_kind: Option<&str>) {
        self.requests_total.with_label_values(&[op]).inc();
        self.request_latency
            .with_label_values(&[op])
            .observe(duration_secs);
        if let Some(kind) = error_kind {
            self.request_errors.with_label_values(&[op, kind]).inc();
        }
    }

    /// Record bulk insert size
    pub fn record_batch(&self, size: usize) {
        self.bulk_batch_size.observe(size as f64);
    }

    /// Text exposition format of every registered metric
    pub fn gather_text(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
