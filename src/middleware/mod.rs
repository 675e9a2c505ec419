// Middleware modules
pub mod capture;
pub mod logging;
pub mod sink;
pub mod snapshot;

pub use capture::{CaptureBuffer, CapturedBody};
pub use logging::{body_logging_middleware, BodyLogger};
pub use sink::{LogSink, TracingSink};
pub use snapshot::{RequestSnapshot, ResponseSnapshot};
