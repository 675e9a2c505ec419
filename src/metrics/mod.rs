use metrics::{counter, histogram};

pub const REQUESTS_TOTAL: &str = "body_capture_requests_total";
pub const TRUNCATED_REQUESTS_TOTAL: &str = "body_capture_truncated_requests_total";
pub const RESPONSE_FAILURES_TOTAL: &str = "body_capture_response_failures_total";
pub const RESPONSE_CAPTURED_BYTES: &str = "body_capture_response_captured_bytes";

// Handles are resolved per call so they bind to whichever recorder is
// installed at that point, not at first use.

pub fn record_request() {
    counter!(REQUESTS_TOTAL).increment(1);
}

pub fn record_truncated_request() {
    counter!(TRUNCATED_REQUESTS_TOTAL).increment(1);
}

pub fn record_response_failure() {
    counter!(RESPONSE_FAILURES_TOTAL).increment(1);
}

/// Bytes buffered from a response body, which stops short of the full body
/// once the capture limit is reached.
pub fn record_captured_response_bytes(len: usize) {
    histogram!(RESPONSE_CAPTURED_BYTES).record(len as f64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics::{
        Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
    };
    use std::sync::Mutex;

    #[derive(Default)]
    struct HistogramNames {
        names: Mutex<Vec<String>>,
    }

    impl Recorder for HistogramNames {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, _: &Key, _: &Metadata<'_>) -> Counter {
            Counter::noop()
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, key: &Key, _: &Metadata<'_>) -> Histogram {
            self.names.lock().unwrap().push(key.name().to_string());
            Histogram::noop()
        }
    }

    #[test]
    fn captured_response_size_goes_to_captured_histogram() {
        let recorder = HistogramNames::default();
        metrics::with_local_recorder(&recorder, || record_captured_response_bytes(64));

        let names = recorder.names.lock().unwrap().clone();
        assert_eq!(names, vec!["body_capture_response_captured_bytes"]);
    }
}
