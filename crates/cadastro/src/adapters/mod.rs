//! Adapters
//!
//! Infrastructure implementations of the ports: the reqwest-based API
//! client, the ViaCEP postal lookup and report location stores.

pub mod http;
pub mod report_store;
pub mod viacep;

pub use http::CadastroClient;
pub use report_store::{FileReportLocationStore, MemoryReportLocationStore};
pub use viacep::ViaCepLookup;
