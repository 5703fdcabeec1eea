use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub ride_transitions_total: IntCounterVec,
    pub events_broadcast_total: IntCounterVec,
    pub ws_subscribers: IntGauge,
    pub fare_amount: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let ride_transitions_total = IntCounterVec::new(
            Opts::new(
                "ride_transitions_total",
                "Lifecycle transitions by kind and outcome",
            ),
            &["transition", "outcome"],
        )
        .expect("valid ride_transitions_total metric");

        let events_broadcast_total = IntCounterVec::new(
            Opts::new(
                "events_broadcast_total",
                "Ride events published to the notification hub",
            ),
            &["event"],
        )
        .expect("valid events_broadcast_total metric");

        let ws_subscribers = IntGauge::new(
            "ws_subscribers",
            "Currently connected realtime subscribers",
        )
        .expect("valid ws_subscribers metric");

        let fare_amount = Histogram::with_opts(
            HistogramOpts::new("fare_amount", "Quoted fare per created ride")
                .buckets(prometheus::exponential_buckets(25.0, 2.0, 6).expect("valid buckets")),
        )
        .expect("valid fare_amount metric");

        registry
            .register(Box::new(ride_transitions_total.clone()))
            .expect("register ride_transitions_total");
        registry
            .register(Box::new(events_broadcast_total.clone()))
            .expect("register events_broadcast_total");
        registry
            .register(Box::new(ws_subscribers.clone()))
            .expect("register ws_subscribers");
        registry
            .register(Box::new(fare_amount.clone()))
            .expect("register fare_amount");

        Self {
            registry,
            ride_transitions_total,
            events_broadcast_total,
            ws_subscribers,
            fare_amount,
        }
    }

    pub fn record_transition(&self, transition: &str, ok: bool) {
        let outcome = if ok { "success" } else { "error" };
        self.ride_transitions_total
            .with_label_values(&[transition, outcome])
            .inc();
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
