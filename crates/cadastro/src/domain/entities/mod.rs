//! Domain Entities
//!
//! - PersonRecord: a registered pessoa física
//! - PagedResult: one page of an ordered result set
//! - ReportJob: asynchronous CSV report generation job
//! - PostalAddress: address resolved from a postal code

mod address;
mod page;
mod pessoa;
mod report;

pub use address::*;
pub use page::*;
pub use pessoa::*;
pub use report::*;
