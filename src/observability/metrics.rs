use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub bookings_total: IntCounterVec,
    pub booking_transitions_total: IntCounterVec,
    pub pending_confirmations: IntGauge,
    pub booking_fare: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let bookings_total = IntCounterVec::new(
            Opts::new("bookings_total", "Booking requests by outcome"),
            &["outcome"],
        )
        .expect("valid bookings_total metric");

        let booking_transitions_total = IntCounterVec::new(
            Opts::new(
                "booking_transitions_total",
                "Booking status transitions by target status",
            ),
            &["status"],
        )
        .expect("valid booking_transitions_total metric");

        let pending_confirmations = IntGauge::new(
            "pending_confirmations",
            "Scheduled driver assignments that have not fired yet",
        )
        .expect("valid pending_confirmations metric");

        let booking_fare = Histogram::with_opts(
            HistogramOpts::new("booking_fare", "Fare of created bookings in currency units")
                .buckets(vec![50.0, 75.0, 100.0, 150.0, 200.0, 300.0, 500.0, 1000.0]),
        )
        .expect("valid booking_fare metric");

        registry
            .register(Box::new(bookings_total.clone()))
            .expect("register bookings_total");
        registry
            .register(Box::new(booking_transitions_total.clone()))
            .expect("register booking_transitions_total");
        registry
            .register(Box::new(pending_confirmations.clone()))
            .expect("register pending_confirmations");
        registry
            .register(Box::new(booking_fare.clone()))
            .expect("register booking_fare");

        Self {
            registry,
            bookings_total,
            booking_transitions_total,
            pending_confirmations,
            booking_fare,
        }
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
