//! Query adapter
//!
//! Turns a base query plus Relay arguments into the window query and the two
//! count queries, and runs them against a [`QueryEngine`].

use super::engine::QueryEngine;
use super::operators::{comparison_operator, cursor_predicate, effective_order, paging_direction};
use super::types::{OrderBy, QuerySpec, TableMetadata};
use crate::args::PaginationArgs;
use crate::config::PaginationConfig;
use crate::cursor::{Cursor, CursorFields};
use crate::error::{Error, Result};
use crate::relay::Counts;
use crate::types::{Comparison, NullsOrder, PagingDirection, QueryOrder};

/// Rows of one page plus whatever counts were computed for it
#[derive(Debug, Clone)]
pub struct PageWindow<R> {
    /// Rows in the order the client expects them
    pub rows: Vec<R>,
    /// Current/previous counts, unknown unless requested
    pub counts: Counts,
}

/// Resolve the id and sort fields of a request
///
/// Preference order: explicit fields, the `orderBy` argument, the base
/// query's first ORDER BY column, the table's date column, the id itself.
pub fn resolve_cursor_fields(
    metadata: Option<&TableMetadata>,
    query: &QuerySpec,
    args: &PaginationArgs,
    explicit: Option<&CursorFields>,
) -> Result<CursorFields> {
    if let Some(fields) = explicit {
        fields.validate()?;
        if let Some(metadata) = metadata {
            for field in [fields.id_field(), fields.order_by_field()] {
                if !metadata.has_column(field) {
                    return Err(Error::config(format!(
                        "Cursor field '{field}' is not a column of table '{}'",
                        metadata.table
                    )));
                }
            }
        }
        return Ok(fields.clone());
    }

    let id_field = metadata
        .and_then(TableMetadata::primary_column)
        .ok_or_else(|| {
            Error::config(format!(
                "Cannot resolve the id field of table '{}': no primary key declared",
                query.table()
            ))
        })?;

    if let (Some(order_by), Some(metadata)) = (args.order_by.as_deref(), metadata) {
        if !metadata.has_column(order_by) {
            return Err(Error::validation(format!(
                "Unknown orderBy field '{order_by}'"
            )));
        }
    }

    let order_by_field = args
        .order_by
        .as_deref()
        .filter(|f| !f.is_empty())
        .or_else(|| query.primary_order().map(|o| o.field.as_str()))
        .or_else(|| metadata.and_then(TableMetadata::date_column))
        .unwrap_or(id_field);

    CursorFields::new(id_field, order_by_field)
}

/// Builds and runs the queries of one pagination request
///
/// Constructed per request; holds no state beyond the request it was built
/// for.
pub struct QueryAdapter<'a, E: QueryEngine> {
    engine: &'a E,
    base: QuerySpec,
    args: PaginationArgs,
    cursor: Option<Cursor>,
    fields: CursorFields,
    order: QueryOrder,
    nulls: NullsOrder,
}

impl<'a, E: QueryEngine> QueryAdapter<'a, E> {
    /// Resolve fields and sort order for a request
    pub fn new(
        engine: &'a E,
        base: QuerySpec,
        args: PaginationArgs,
        cursor: Option<Cursor>,
        explicit_fields: Option<&CursorFields>,
        config: &PaginationConfig,
    ) -> Result<Self> {
        let metadata = engine.metadata(base.table());
        let fields = resolve_cursor_fields(metadata.as_ref(), &base, &args, explicit_fields)?;

        if let Some(metadata) = &metadata {
            for field in base.filters().iter().flat_map(|p| p.fields()) {
                if !metadata.has_column(field) {
                    return Err(Error::config(format!(
                        "Filter field '{field}' is not a column of table '{}'",
                        metadata.table
                    )));
                }
            }
            if config.warn_unindexed {
                warn_unindexed(metadata, &fields);
            }
        }

        let order = args
            .order
            .or_else(|| base.primary_order().map(|o| o.order))
            .unwrap_or(config.default_order);

        // NULLS LAST unless the base query places them
        let nulls = base
            .primary_order()
            .filter(|o| o.field == fields.order_by_field())
            .and_then(|o| o.nulls)
            .unwrap_or(NullsOrder::Last);

        let adapter = Self {
            engine,
            base,
            args,
            cursor,
            fields,
            order,
            nulls,
        };

        tracing::debug!(
            table = adapter.base.table(),
            id_field = adapter.fields.id_field(),
            order_by_field = adapter.fields.order_by_field(),
            order = %adapter.order,
            direction = ?adapter.direction(),
            operator = %adapter.operator(),
            "Resolved pagination request"
        );

        Ok(adapter)
    }

    /// Resolved cursor fields
    pub fn fields(&self) -> &CursorFields {
        &self.fields
    }

    /// Logical sort order of the connection
    pub fn order(&self) -> QueryOrder {
        self.order
    }

    /// Placement of NULL sort values in the logical order
    pub fn nulls(&self) -> NullsOrder {
        self.nulls
    }

    /// Paging direction of the request
    pub fn direction(&self) -> PagingDirection {
        paging_direction(&self.args)
    }

    /// Operator selecting the rows of the requested window
    pub fn operator(&self) -> Comparison {
        comparison_operator(self.order, self.direction())
    }

    /// Arguments of the request
    pub fn args(&self) -> &PaginationArgs {
        &self.args
    }

    /// Decoded cursor of the request
    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    // ========================================================================
    // Derived queries
    // ========================================================================

    /// Base filters plus the cursor predicate towards `direction`, unordered
    /// and unlimited
    fn filtered(&self, direction: PagingDirection) -> QuerySpec {
        let query = self.base.clone().without_order().without_limit();
        match &self.cursor {
            Some(cursor) => query.with_filter(cursor_predicate(
                &self.fields,
                cursor,
                self.order,
                direction,
                self.nulls,
            )),
            None => query,
        }
    }

    /// Query returning the rows of the page, in physical order
    pub fn window_query(&self) -> QuerySpec {
        let physical = effective_order(self.order, &self.args);

        let mut primary =
            OrderBy::new(self.fields.order_by_field(), self.order).with_nulls(self.nulls);
        if physical != self.order {
            primary = primary.reversed();
        }

        let mut query = self.filtered(self.direction()).with_order_term(primary);
        if self.fields.is_composite() {
            query = query.with_order_by(self.fields.id_field(), physical);
        }

        query.with_limit(self.args.limit())
    }

    /// Query counting the rows on the requested side of the cursor
    pub fn current_count_query(&self) -> QuerySpec {
        self.filtered(self.direction())
    }

    /// Query counting the rows on the other side of the cursor
    ///
    /// The cursor row itself matches neither side. `None` without a cursor.
    pub fn previous_count_query(&self) -> Option<QuerySpec> {
        self.cursor
            .as_ref()
            .map(|_| self.filtered(self.direction().opposite()))
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Fetch the page rows in the order the client expects
    pub async fn fetch_entities(&self) -> Result<Vec<E::Row>> {
        let mut rows = self.engine.fetch(&self.window_query()).await?;
        if self.args.has_last() {
            rows.reverse();
        }
        Ok(rows)
    }

    /// Count the rows on the requested side of the cursor
    pub async fn calculate_current_count(&self) -> Result<u64> {
        self.engine.count(&self.current_count_query()).await
    }

    /// Count the rows on the other side of the cursor, zero without a cursor
    pub async fn calculate_previous_count(&self) -> Result<u64> {
        match self.previous_count_query() {
            Some(query) => self.engine.count(&query).await,
            None => Ok(0),
        }
    }

    /// Fetch the page rows and both counts concurrently
    pub async fn fetch_entities_and_count(&self) -> Result<PageWindow<E::Row>> {
        let (rows, current, previous) = tokio::try_join!(
            self.fetch_entities(),
            self.calculate_current_count(),
            self.calculate_previous_count(),
        )?;

        Ok(PageWindow {
            rows,
            counts: Counts::known(current, previous),
        })
    }

    /// Fetch the page, with counts when `with_counts` is set
    pub async fn paginate(&self, with_counts: bool) -> Result<PageWindow<E::Row>> {
        if with_counts {
            self.fetch_entities_and_count().await
        } else {
            Ok(PageWindow {
                rows: self.fetch_entities().await?,
                counts: Counts::unknown(),
            })
        }
    }
}

/// Advisory only: a seek predicate on unindexed columns degrades to a scan
fn warn_unindexed(metadata: &TableMetadata, fields: &CursorFields) {
    if !metadata.declares_indexes() {
        return;
    }

    let indexed = metadata.indexed_fields();
    let mut checked = vec![fields.id_field()];
    if fields.is_composite() {
        checked.push(fields.order_by_field());
    }

    for field in checked {
        if !indexed.contains(field) {
            tracing::warn!(
                table = %metadata.table,
                field,
                "Cursor field is not covered by any index, pagination may be slow"
            );
        }
    }
}
