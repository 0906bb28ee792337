// Application layer - use cases and orchestration over the repository.
// The CLI and the exporter only talk to FinanceService.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
