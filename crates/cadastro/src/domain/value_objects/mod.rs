//! Value Objects
//!
//! Immutable value types used by entities and controllers.

mod cpf;
mod query_state;
mod validation;

pub use cpf::*;
pub use query_state::*;
pub use validation::*;
