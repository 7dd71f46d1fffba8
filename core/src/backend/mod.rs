//! The response source a request is answered from.
//!
//! The console ships with simulated backends only; a real on-device model
//! would implement the same trait and plug into the request processor
//! without touching its timing logic.

pub trait ResponseBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Full response for `query`. Must be deterministic: the same query
    /// always yields the same text.
    fn compose(&self, query: &str) -> String;
}
