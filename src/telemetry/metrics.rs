use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
};
use std::sync::LazyLock;

pub static METER: LazyLock<Meter> = LazyLock::new(|| global::meter("scouting-proxy"));

// --- Scouting Metrics ---

pub static SCOUTING_REQUESTS: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("scouting.requests")
        .with_description("Number of scouting fan-outs started")
        .with_unit("{request}")
        .build()
});

pub static SCOUTING_PROVIDER_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("scouting.provider.duration")
        .with_description("Duration of a single provider call in seconds")
        .with_unit("s")
        .build()
});

pub static SCOUTING_PROVIDER_FAILURES: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("scouting.provider.failures")
        .with_description("Number of provider calls that ended in a failure marker")
        .with_unit("{failure}")
        .build()
});

pub static SCOUTING_PROVIDER_RETRIES: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("scouting.provider.retries")
        .with_description("Number of provider call retries")
        .with_unit("{retry}")
        .build()
});

// --- HTTP Metrics ---

pub static HTTP_REQUESTS_TOTAL: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("http.requests.total")
        .with_description("Total number of HTTP requests")
        .with_unit("{request}")
        .build()
});

pub static HTTP_REQUEST_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("http.request.duration")
        .with_description("HTTP request duration in milliseconds")
        .with_unit("ms")
        .with_boundaries(vec![
            1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0,
        ])
        .build()
});
