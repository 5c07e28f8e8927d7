//! Cadastro Client Library
//!
//! Client-side core of the pessoa física registry admin: listing, CSV
//! reports and record editing on top of the registry's REST API.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain/`): records, pages, report jobs and value types
//!   - `entities/`: PersonRecord, PagedResult, ReportJob, PostalAddress
//!   - `value_objects/`: Cpf, QueryState, ValidationErrorSet
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits) for the API, the
//!   postal lookup, persisted report state and user notifications
//!
//! - **Application** (`application/`): ListController, ReportWorkflow,
//!   FormController and the Debouncer they share
//!
//! - **Adapters** (`adapters/`): reqwest API client, ViaCEP lookup and
//!   report location stores
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cadastro::{CadastroClient, ClientConfig, ListController};
//!
//! let config = ClientConfig::new("http://localhost:8080");
//! let api = Arc::new(CadastroClient::from_config(&config)?);
//! let list = ListController::new(api, notifier, &config);
//! list.navigate_to("busca=Ana&pagina=2");
//! ```

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use adapters::{CadastroClient, FileReportLocationStore, MemoryReportLocationStore, ViaCepLookup};
pub use application::{
    should_offer_report, Debouncer, FormController, ListController, ListState, PersonForm,
    ReportState, ReportWorkflow, SubmitOutcome,
};
pub use config::{ClientConfig, PollPolicy};
pub use domain::{
    Cpf, DomainError, PagedResult, Pagination, PersonData, PersonRecord, PostalAddress,
    QueryState, ReportJob, ReportJobId, ReportStatus, ValidationErrorSet,
};
pub use ports::{Notifier, PessoaApi, PostalCodeLookup, ReportApi, ReportLocationStore};
