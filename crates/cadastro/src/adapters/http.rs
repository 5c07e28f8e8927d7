//! HTTP API Client
//!
//! reqwest implementation of `PessoaApi` and `ReportApi` against the
//! registry's REST API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::domain::{
    DomainError, PagedResult, PersonData, PersonRecord, ReportJob, ReportJobId,
};
use crate::ports::{PessoaApi, ReportApi};

const PESSOA_PATH: &str = "/api/pessoa-fisica";
const REPORT_PATH: &str = "/relatorio-csv/pessoa-fisica";

const MSG_LIST: &str = "Erro ao listar os registros.";
const MSG_GET: &str = "Erro ao consultar o registro.";
const MSG_CREATE: &str = "Erro ao criar o registro.";
const MSG_UPDATE: &str = "Erro ao atualizar o registro.";
const MSG_DELETE: &str = "Erro ao apagar o registro.";
const MSG_VALID_CPF: &str = "Erro ao validar o CPF.";
const MSG_REPORT_REQUEST: &str = "Erro ao solicitar relatório.";
const MSG_REPORT_CHECK: &str = "Erro ao consultar relatório.";
const MSG_REPORT_FETCH: &str = "Erro ao baixar relatório.";

/// API client for the pessoa física registry
#[derive(Clone)]
pub struct CadastroClient {
    client: Client,
    base_url: String,
}

// ============================================
// Wire Types
// ============================================

/// Spring Data page envelope
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageResponse<T> {
    #[serde(default = "Vec::new")]
    content: Vec<T>,
    total_elements: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportRequestResponse {
    report_id: ReportJobId,
}

#[derive(Debug, Deserialize)]
struct ReportCheckResponse {
    #[serde(default)]
    ready: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl<T> From<PageResponse<T>> for PagedResult<T> {
    fn from(page: PageResponse<T>) -> Self {
        let total = page
            .total_elements
            .unwrap_or(page.content.len() as u64);
        PagedResult::new(page.content, total)
    }
}

impl CadastroClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client with the timeout from `config`
    pub fn from_config(config: &ClientConfig) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DomainError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Where a finished report can be downloaded from
    pub fn report_location(&self, id: &ReportJobId) -> String {
        format!(
            "{}{}/get-relatorio/{}",
            self.base_url,
            REPORT_PATH,
            urlencoding::encode(id.as_str())
        )
    }

    fn pessoa_url(&self, suffix: &str) -> String {
        format!("{}{}{}", self.base_url, PESSOA_PATH, suffix)
    }

    async fn send(&self, request: RequestBuilder, fallback: &str) -> Result<Response, DomainError> {
        let resp = request.send().await.map_err(|e| {
            warn!(error = %e, "Request to registry API failed");
            DomainError::Transport(e.to_string())
        })?;

        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        warn!(status = %status, body = %body, "Registry API returned an error");
        Err(api_error(status, &body, fallback))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T, DomainError> {
        let resp = self.send(request, fallback).await?;
        resp.json::<T>()
            .await
            .map_err(|e| DomainError::Parse(format!("{fallback} ({e})")))
    }
}

/// Prefer the server's `message`, fall back to the operation's default
fn api_error(status: StatusCode, body: &str, fallback: &str) -> DomainError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());

    DomainError::api(Some(status.as_u16()), message)
}

#[async_trait]
impl PessoaApi for CadastroClient {
    async fn list_page(
        &self,
        page_index: u32,
        page_size: u32,
    ) -> Result<PagedResult<PersonRecord>, DomainError> {
        debug!(page_index, page_size, "Listing records");
        let request = self
            .client
            .get(self.pessoa_url(""))
            .query(&[("page", page_index), ("size", page_size)]);

        let page: PageResponse<PersonRecord> = self.send_json(request, MSG_LIST).await?;
        Ok(page.into())
    }

    async fn search_by_name(
        &self,
        name: &str,
        page_index: u32,
        page_size: u32,
    ) -> Result<PagedResult<PersonRecord>, DomainError> {
        debug!(search = name, page_index, page_size, "Searching records by name");
        let url = self.pessoa_url(&format!("/filter/{}", urlencoding::encode(name)));
        let request = self
            .client
            .get(url)
            .query(&[("page", page_index), ("size", page_size)]);

        let page: PageResponse<PersonRecord> = self.send_json(request, MSG_LIST).await?;
        Ok(page.into())
    }

    async fn get(&self, id: i64) -> Result<PersonRecord, DomainError> {
        debug!(id, "Fetching record");
        let request = self.client.get(self.pessoa_url(&format!("/{id}")));

        match self.send_json(request, MSG_GET).await {
            Err(DomainError::Api {
                status: Some(404), ..
            }) => Err(DomainError::not_found("PersonRecord", id)),
            other => other,
        }
    }

    async fn create(&self, data: &PersonData) -> Result<i64, DomainError> {
        debug!(person = %data.name, "Creating record");
        let request = self.client.post(self.pessoa_url("")).json(data);

        let created: CreatedResponse = self.send_json(request, MSG_CREATE).await?;
        Ok(created.id)
    }

    async fn update(&self, record: &PersonRecord) -> Result<(), DomainError> {
        debug!(id = record.id, "Updating record");
        let request = self.client.put(self.pessoa_url("")).json(record);

        self.send(request, MSG_UPDATE).await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        debug!(id, "Deleting record");
        let request = self.client.delete(self.pessoa_url(&format!("/{id}")));

        self.send(request, MSG_DELETE).await?;
        Ok(())
    }

    async fn cpf_exists(&self, cpf: &str) -> Result<bool, DomainError> {
        let url = self.pessoa_url(&format!("/valid-cpf/{}", urlencoding::encode(cpf)));
        self.send_json(self.client.get(url), MSG_VALID_CPF).await
    }
}

#[async_trait]
impl ReportApi for CadastroClient {
    async fn request_report(&self) -> Result<ReportJobId, DomainError> {
        let url = format!("{}{}/gerar", self.base_url, REPORT_PATH);
        let resp: ReportRequestResponse = self
            .send_json(self.client.post(url), MSG_REPORT_REQUEST)
            .await?;

        debug!(report_id = %resp.report_id, "Report requested");
        Ok(resp.report_id)
    }

    async fn check_report(&self, id: &ReportJobId) -> Result<ReportJob, DomainError> {
        let url = format!(
            "{}{}/check/{}",
            self.base_url,
            REPORT_PATH,
            urlencoding::encode(id.as_str())
        );
        let resp: ReportCheckResponse = self.send_json(self.client.get(url), MSG_REPORT_CHECK).await?;

        if resp.ready {
            Ok(ReportJob::ready(id.clone(), self.report_location(id)))
        } else {
            Ok(ReportJob::pending(id.clone()))
        }
    }

    async fn fetch_report(&self, location: &str) -> Result<Vec<u8>, DomainError> {
        debug!(location, "Downloading report");
        let resp = self.send(self.client.get(location), MSG_REPORT_FETCH).await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| DomainError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
