use thiserror::Error;

/// Conditions met while capturing a body. None of them abort the request.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("request body truncated: declared {declared} bytes, received {received}")]
    TruncatedBody { declared: usize, received: usize },

    #[error("downstream body failed after {received} bytes: {reason}")]
    Downstream { received: usize, reason: String },

    #[error("failed to read capture buffer: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downstream_failure_reports_bytes_and_reason() {
        let err = CaptureError::Downstream {
            received: 7,
            reason: "upstream reset".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "downstream body failed after 7 bytes: upstream reset"
        );
    }
}
