//! Postal Lookup Port

use async_trait::async_trait;

use crate::domain::{errors::DomainError, PostalAddress};

/// Resolves a postal code (CEP) to an address
#[async_trait]
pub trait PostalCodeLookup: Send + Sync {
    async fn lookup(&self, postal_code: &str) -> Result<PostalAddress, DomainError>;
}
