//! Report Location Store Port
//!
//! Single-slot durable storage for the location of the last generated
//! report. It survives restarts until cleared or replaced.

use crate::domain::errors::DomainError;

pub trait ReportLocationStore: Send + Sync {
    /// The persisted location, if any
    fn get(&self) -> Result<Option<String>, DomainError>;

    /// Persist a location, replacing the previous one.
    ///
    /// An empty location clears the slot.
    fn set(&self, location: &str) -> Result<(), DomainError>;

    /// Forget the persisted location
    fn clear(&self) -> Result<(), DomainError>;
}
