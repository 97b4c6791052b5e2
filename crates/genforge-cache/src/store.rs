//! Storage seam between the orchestrator and a cache backend

use crate::error::CacheError;
use crate::fifo::ResultCache;
use async_trait::async_trait;
use genforge_artifact::CacheKey;

/// Keyed storage of completed generation results
///
/// The in-memory [`ResultCache`] is the default backend; remote or shared
/// stores implement this trait and may fail with [`CacheError`].
#[async_trait]
pub trait ResultStore<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// Look up a live entry
    async fn get(&self, key: &CacheKey) -> Result<Option<V>, CacheError>;

    /// Store a value, replacing any entry under the same key
    async fn set(&self, key: CacheKey, value: V) -> Result<(), CacheError>;

    /// Drop an entry; returns whether one was present
    async fn invalidate(&self, key: &CacheKey) -> Result<bool, CacheError>;
}

#[async_trait]
impl<V> ResultStore<V> for ResultCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &CacheKey) -> Result<Option<V>, CacheError> {
        Ok(ResultCache::get(self, key))
    }

    async fn set(&self, key: CacheKey, value: V) -> Result<(), CacheError> {
        ResultCache::set(self, key, value);
        Ok(())
    }

    async fn invalidate(&self, key: &CacheKey) -> Result<bool, CacheError> {
        Ok(self.remove(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn result_cache_is_a_store() {
        let store: Arc<dyn ResultStore<u32>> =
            Arc::new(ResultCache::new(4, Duration::from_secs(60)));
        let key = CacheKey::derive("p1").unwrap();

        assert_eq!(store.get(&key).await.unwrap(), None);
        store.set(key, 7).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some(7));
        assert!(store.invalidate(&key).await.unwrap());
        assert!(!store.invalidate(&key).await.unwrap());
    }
}
