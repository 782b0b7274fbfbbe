//! Service module
//!
//! The orchestrator that wires cursor decoding, the query adapter and the
//! connection builder together, and the factory that creates one per request.

mod factory;
mod orchestrator;
mod types;

pub use factory::PaginationFactory;
pub use orchestrator::PaginationService;
