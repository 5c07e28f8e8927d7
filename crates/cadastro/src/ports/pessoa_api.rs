//! Pessoa API Port
//!
//! Abstract interface for person record operations on the remote API.

use async_trait::async_trait;

use crate::domain::{errors::DomainError, PagedResult, PersonData, PersonRecord};

/// Remote API for pessoa física records
#[async_trait]
pub trait PessoaApi: Send + Sync {
    /// List one page of all records (`page_index` is zero-based)
    async fn list_page(
        &self,
        page_index: u32,
        page_size: u32,
    ) -> Result<PagedResult<PersonRecord>, DomainError>;

    /// List one page of records whose name matches `name`
    async fn search_by_name(
        &self,
        name: &str,
        page_index: u32,
        page_size: u32,
    ) -> Result<PagedResult<PersonRecord>, DomainError>;

    /// Fetch a single record
    async fn get(&self, id: i64) -> Result<PersonRecord, DomainError>;

    /// Create a record, returning the id assigned by the server
    async fn create(&self, data: &PersonData) -> Result<i64, DomainError>;

    /// Replace a record (body includes the id)
    async fn update(&self, record: &PersonRecord) -> Result<(), DomainError>;

    /// Delete a record by id
    async fn delete(&self, id: i64) -> Result<(), DomainError>;

    /// Whether a record with this canonical CPF already exists
    async fn cpf_exists(&self, cpf: &str) -> Result<bool, DomainError>;
}
