//! Service state

use crate::args::PaginationArgs;
use crate::cursor::Cursor;
use crate::query::QuerySpec;

/// A request that passed validation and is ready to run
#[derive(Debug, Clone)]
pub(crate) struct ConfiguredRequest {
    pub query: QuerySpec,
    pub args: PaginationArgs,
    pub cursor: Option<Cursor>,
}

/// Lifecycle of a pagination service
#[derive(Debug, Clone, Default)]
pub(crate) enum ServiceState {
    /// `setup` has not succeeded yet
    #[default]
    Uninitialized,
    /// Ready to run exactly once
    Configured(ConfiguredRequest),
    /// Already ran
    Executed,
}
