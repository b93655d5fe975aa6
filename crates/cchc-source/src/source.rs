//! The dashboard's data source: one client plus the cache in front of it.

use std::sync::Arc;

use cchc_core::{AppConfig, Dataset};

use crate::cache::{Clock, DatasetCache, SystemClock};
use crate::client::DatasetClient;
use crate::error::SourceError;

pub struct DataSource<C = SystemClock> {
    client: DatasetClient,
    cache: DatasetCache<C>,
}

impl DataSource<SystemClock> {
    /// Builds a data source on the system clock from application config.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidUrl`] or [`SourceError::Http`] if the
    /// client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        Ok(Self::new(
            DatasetClient::from_config(config)?,
            DatasetCache::new(config.cache_ttl()),
        ))
    }
}

impl<C: Clock> DataSource<C> {
    #[must_use]
    pub fn new(client: DatasetClient, cache: DatasetCache<C>) -> Self {
        Self { client, cache }
    }

    #[must_use]
    pub fn client(&self) -> &DatasetClient {
        &self.client
    }

    /// Returns the cached dataset, fetching it on first use or after expiry.
    ///
    /// # Errors
    ///
    /// See [`DatasetClient::load`].
    pub async fn load(&self) -> Result<Arc<Dataset>, SourceError> {
        self.cache.get_or_load(|| self.client.load()).await
    }

    /// Discards the cached dataset and fetches it again.
    ///
    /// # Errors
    ///
    /// See [`DatasetClient::load`].
    pub async fn reload(&self) -> Result<Arc<Dataset>, SourceError> {
        self.cache.reload(|| self.client.load()).await
    }

    pub async fn invalidate(&self) {
        self.cache.invalidate().await;
    }

    /// The cached dataset, without fetching.
    pub async fn cached(&self) -> Option<Arc<Dataset>> {
        self.cache.cached().await
    }
}
