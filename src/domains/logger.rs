use std::sync::Arc;

/// Domain-level logging port.
/// Kept small and infallible; adapters decide where messages end up.
pub trait DomainLogger: Send + Sync + 'static {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

pub type DynLogger = Arc<dyn DomainLogger>;

/// Tags every message with the component that produced it.
pub struct ScopedLogger {
    scope: String,
    inner: DynLogger,
}

impl ScopedLogger {
    pub fn wrap(scope: impl Into<String>, inner: DynLogger) -> DynLogger {
        Arc::new(Self {
            scope: scope.into(),
            inner,
        })
    }
}

impl DomainLogger for ScopedLogger {
    fn info(&self, msg: &str) {
        self.inner.info(&format!("[{}] {}", self.scope, msg));
    }

    fn warn(&self, msg: &str) {
        self.inner.warn(&format!("[{}] {}", self.scope, msg));
    }

    fn error(&self, msg: &str) {
        self.inner.error(&format!("[{}] {}", self.scope, msg));
    }
}
