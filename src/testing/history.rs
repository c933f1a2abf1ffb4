//! Call history capture for testing
//!
//! Thread-safe log of gateway calls, shared between a gateway and the test
//! that inspects it.

use parking_lot::RwLock;
use std::sync::Arc;

use super::events::GatewayCall;

/// Thread-safe log of gateway calls
#[derive(Clone, Default)]
pub struct CallLog {
    inner: Arc<RwLock<Vec<GatewayCall>>>,
}

impl CallLog {
    /// Create a new empty log
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: GatewayCall) {
        self.inner.write().push(call);
    }

    /// Get all calls, oldest first
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.inner.read().clone()
    }

    pub fn last(&self) -> Option<GatewayCall> {
        self.inner.read().last().cloned()
    }

    /// Calls with the given operation name
    pub fn calls_named(&self, name: &str) -> Vec<GatewayCall> {
        self.inner
            .read()
            .iter()
            .filter(|c| c.name() == name)
            .cloned()
            .collect()
    }

    /// Number of recorded calls
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if log is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Clear all calls
    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_shared_between_clones() {
        let log = CallLog::new();
        let other = log.clone();
        other.record(GatewayCall::GetMapping { tables: vec![] });

        assert_eq!(log.len(), 1);
        assert_eq!(log.calls_named("get_mapping").len(), 1);
        assert!(log.calls_named("search").is_empty());

        log.clear();
        assert!(other.is_empty());
    }
}
