//! Pagination service
//!
//! Single-use orchestrator of one pagination request:
//! `Uninitialized → Configured → Executed`.

use super::types::{ConfiguredRequest, ServiceState};
use crate::args::PaginationArgs;
use crate::config::PaginationConfig;
use crate::cursor::{Cursor, CursorCodec, CursorFields};
use crate::error::{Error, Result};
use crate::query::{QueryAdapter, QueryEngine, QuerySpec};
use crate::relay::{Connection, ConnectionBuilder};
use crate::value::Value;
use std::sync::Arc;

/// Runs one pagination request against a query engine
///
/// ```rust,ignore
/// let mut service = factory.create();
/// service.setup("tasks", PaginationArgs::new().first(10))?;
/// service.with_where("status", "open")?;
/// let connection = service.get_many_with_count().await?;
/// ```
pub struct PaginationService<E: QueryEngine> {
    engine: Arc<E>,
    config: Arc<PaginationConfig>,
    cursor_fields: Option<CursorFields>,
    state: ServiceState,
}

impl<E: QueryEngine> PaginationService<E> {
    /// Create an unconfigured service
    pub fn new(engine: Arc<E>, config: Arc<PaginationConfig>) -> Self {
        Self {
            engine,
            config,
            cursor_fields: None,
            state: ServiceState::Uninitialized,
        }
    }

    /// Use these cursor fields instead of resolving them from metadata
    #[must_use]
    pub fn with_cursor_fields(mut self, fields: CursorFields) -> Self {
        self.cursor_fields = Some(fields);
        self
    }

    /// Whether `setup` succeeded and the request has not run yet
    pub fn is_configured(&self) -> bool {
        matches!(self.state, ServiceState::Configured(_))
    }

    /// Query the request will run, once configured
    pub fn query(&self) -> Option<&QuerySpec> {
        match &self.state {
            ServiceState::Configured(request) => Some(&request.query),
            _ => None,
        }
    }

    /// Validate the arguments, decode the cursor and bind the base query
    ///
    /// Nothing is queried here; on error the service stays unconfigured.
    pub fn setup(&mut self, query: impl Into<QuerySpec>, args: PaginationArgs) -> Result<()> {
        if matches!(self.state, ServiceState::Executed) {
            return Err(Error::AlreadyExecuted);
        }

        let args = args.with_default_limit(self.config.default_limit);
        args.validate()?;
        let cursor = self.decode_cursor(&args)?;
        let query = query.into();

        tracing::debug!(
            table = query.table(),
            first = ?args.first,
            last = ?args.last,
            has_cursor = cursor.is_some(),
            "Configured pagination request"
        );

        self.state = ServiceState::Configured(ConfiguredRequest {
            query,
            args,
            cursor,
        });
        Ok(())
    }

    /// Restrict the configured query to rows where `field = value`
    pub fn with_where(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        match &mut self.state {
            ServiceState::Configured(request) => {
                request.query = request.query.clone().with_where(field, value);
                Ok(())
            }
            ServiceState::Uninitialized => Err(Error::NotConfigured),
            ServiceState::Executed => Err(Error::AlreadyExecuted),
        }
    }

    /// Fetch the page without counts
    ///
    /// `totalCount` is absent and `hasNextPage` falls back to "the page is
    /// full".
    pub async fn get_many(&mut self) -> Result<Connection<E::Row>> {
        self.execute(false).await
    }

    /// Fetch the page together with the counts around the cursor
    pub async fn get_many_with_count(&mut self) -> Result<Connection<E::Row>> {
        self.execute(true).await
    }

    async fn execute(&mut self, with_counts: bool) -> Result<Connection<E::Row>> {
        let request = match std::mem::replace(&mut self.state, ServiceState::Executed) {
            ServiceState::Configured(request) => request,
            ServiceState::Uninitialized => {
                self.state = ServiceState::Uninitialized;
                return Err(Error::NotConfigured);
            }
            ServiceState::Executed => return Err(Error::AlreadyExecuted),
        };

        let adapter = QueryAdapter::new(
            self.engine.as_ref(),
            request.query,
            request.args,
            request.cursor,
            self.cursor_fields.as_ref(),
            &self.config,
        )?;

        let window = adapter.paginate(with_counts).await?;

        let connection = ConnectionBuilder::new(adapter.fields(), adapter.args())
            .with_counts(window.counts)
            .build(window.rows)?;

        tracing::debug!(
            edges = connection.edges.len(),
            has_next_page = connection.page_info.has_next_page,
            has_previous_page = connection.page_info.has_previous_page,
            total_count = ?connection.total_count,
            "Built connection"
        );

        Ok(connection)
    }

    /// Decode `before`, or else `after`, with the configured decode policy
    fn decode_cursor(&self, args: &PaginationArgs) -> Result<Option<Cursor>> {
        let decode = |token: &str| {
            if self.config.strict_cursors {
                CursorCodec::decode_strict(token)
            } else {
                CursorCodec::decode(token)
            }
        };

        if let Some(token) = args.before_cursor() {
            let decoded = decode(token)?;
            return Ok(Some(Cursor::from_before(decoded.id, decoded.order_value)));
        }
        if let Some(token) = args.after_cursor() {
            let decoded = decode(token)?;
            return Ok(Some(Cursor::from_after(decoded.id, decoded.order_value)));
        }
        Ok(None)
    }
}
