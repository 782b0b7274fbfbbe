//! Pagination factory
//!
//! Holds the shared engine and config, and hands out a fresh
//! [`PaginationService`] per request.

use super::orchestrator::PaginationService;
use crate::args::PaginationArgs;
use crate::config::PaginationConfig;
use crate::error::Result;
use crate::query::{QueryEngine, QuerySpec};
use crate::relay::Connection;
use std::sync::Arc;

/// Creates pagination services that share one engine and config
pub struct PaginationFactory<E: QueryEngine> {
    engine: Arc<E>,
    config: Arc<PaginationConfig>,
}

impl<E: QueryEngine> Clone for PaginationFactory<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            config: Arc::clone(&self.config),
        }
    }
}

impl<E: QueryEngine> PaginationFactory<E> {
    /// Create a factory, validating the config
    pub fn new(engine: E, config: PaginationConfig) -> Result<Self> {
        Self::from_shared(Arc::new(engine), config)
    }

    /// Create a factory around an engine that is shared elsewhere
    pub fn from_shared(engine: Arc<E>, config: PaginationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine,
            config: Arc::new(config),
        })
    }

    /// Shared engine
    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Shared config
    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// A fresh service for one request
    pub fn create(&self) -> PaginationService<E> {
        PaginationService::new(Arc::clone(&self.engine), Arc::clone(&self.config))
    }

    /// Set up and run one request
    ///
    /// Counts are computed unless `calculate_total_count` is off.
    pub async fn paginate(
        &self,
        query: impl Into<QuerySpec>,
        args: PaginationArgs,
    ) -> Result<Connection<E::Row>> {
        let mut service = self.create();
        service.setup(query, args)?;

        if self.config.calculate_total_count {
            service.get_many_with_count().await
        } else {
            service.get_many().await
        }
    }
}
