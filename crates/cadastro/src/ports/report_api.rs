//! Report Service Port
//!
//! Abstract interface for the asynchronous CSV report service.

use async_trait::async_trait;

use crate::domain::{errors::DomainError, ReportJob, ReportJobId};

#[async_trait]
pub trait ReportApi: Send + Sync {
    /// Ask the service to start generating a report
    async fn request_report(&self) -> Result<ReportJobId, DomainError>;

    /// Current status of a job. A ready job carries its resource location.
    async fn check_report(&self, id: &ReportJobId) -> Result<ReportJob, DomainError>;

    /// Download the report stored at `location`
    async fn fetch_report(&self, location: &str) -> Result<Vec<u8>, DomainError>;
}
