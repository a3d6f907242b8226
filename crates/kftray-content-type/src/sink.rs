use tracing::warn;

use crate::error::FormatError;

/// Receives pretty-print failures. Implementations must not panic; the
/// printer ignores whatever they do with the message.
#[cfg_attr(test, mockall::automock)]
pub trait WarnSink: Send + Sync {
    fn warn(&self, message: &str, cause: &FormatError);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl WarnSink for TracingSink {
    fn warn(&self, message: &str, cause: &FormatError) {
        warn!(error = %cause, "{}", message);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl WarnSink for NoopSink {
    fn warn(&self, _message: &str, _cause: &FormatError) {}
}
