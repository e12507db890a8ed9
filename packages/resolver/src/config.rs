use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Settings shared by offer resolution and profile lookups
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Upper bound on any single collaborator call
    pub timeout: Duration,
}

impl ResolverConfig {
    pub fn with_timeout_ms(timeout_ms: u64) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::with_timeout_ms(DEFAULT_TIMEOUT_MS)
    }
}

/// Run `call`, mapping an elapsed `timeout` to [`ResolveError::Timeout`].
pub(crate) async fn with_timeout<T, F>(timeout: Duration, call: F) -> Result<T, crate::ResolveError>
where
    F: std::future::Future<Output = Result<T, crate::ResolveError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(crate::ResolveError::Timeout),
    }
}
