//! Ports (Interfaces)
//!
//! Abstract interfaces that define how the controllers interact with
//! external systems: the registry API, the report service, the postal
//! lookup, persisted client state and the user.
//!
//! Implementations of these traits live in `adapters` (and in the CLI for
//! `Notifier`).

mod notifier;
mod pessoa_api;
mod postal_lookup;
mod report_api;
mod report_store;

pub use notifier::*;
pub use pessoa_api::*;
pub use postal_lookup::*;
pub use report_api::*;
pub use report_store::*;
