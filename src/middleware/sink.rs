use tracing::info;

/// Destination for captured lines. Every line is written at informational severity.
pub trait LogSink: Send + Sync + 'static {
    fn info(&self, line: &str);
}

/// Emits each line as a `tracing` event under the `body_capture` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn info(&self, line: &str) {
        info!(target: "body_capture", "{}", line);
    }
}
