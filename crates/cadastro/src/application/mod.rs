//! Application Layer
//!
//! Controllers that drive the registry front-end on top of the ports:
//! - `Debouncer`: settles bursts of input into one action
//! - `ListController`: paged/filtered listing kept in sync with `QueryState`
//! - `ReportWorkflow`: request → poll → ready → download of CSV reports
//! - `FormController`: validation and submission of a single record

mod debounce;
mod form_controller;
mod list_controller;
mod report_workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use debounce::*;
pub use form_controller::*;
pub use list_controller::*;
pub use report_workflow::*;
