//! Outbound notification seam.

use async_trait::async_trait;

/// A best-effort outbound notification channel.
///
/// Implementations must swallow and log their own failures — callers fire
/// and forget, typically from error paths that must not grow new errors.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str);
}

/// A notifier that drops every message. Useful in tests and for deployments
/// without an outbound channel configured.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, _message: &str) {}
}
