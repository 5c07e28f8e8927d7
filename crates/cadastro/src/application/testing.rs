//! In-memory fakes for controller tests

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{
    DomainError, PagedResult, PersonData, PersonRecord, PostalAddress, ReportJob, ReportJobId,
};
use crate::ports::{Notifier, PessoaApi, PostalCodeLookup, ReportApi};

pub(crate) fn person(id: i64, name: &str, cpf: &str) -> PersonRecord {
    PersonRecord::new(
        id,
        PersonData {
            name: name.to_string(),
            cpf: cpf.to_string(),
            ..Default::default()
        },
    )
}

/// Registry API backed by a vector of records
#[derive(Default)]
pub(crate) struct FakePessoaApi {
    pub records: Mutex<Vec<PersonRecord>>,
    pub calls: Mutex<Vec<String>>,
    /// Reported total instead of the number of matching records
    pub total_override: Mutex<Option<u64>>,
    /// Response delay per search text ("" for the unfiltered listing)
    pub delays: Mutex<HashMap<String, Duration>>,
    pub fail_next: Mutex<Option<DomainError>>,
    pub fail_cpf_check: Mutex<bool>,
    pub created: Mutex<Vec<PersonData>>,
    pub updated: Mutex<Vec<PersonRecord>>,
}

impl FakePessoaApi {
    pub fn with_records(records: Vec<PersonRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_next(&self, err: DomainError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    fn record_call(&self, call: String) -> Result<(), DomainError> {
        self.calls.lock().unwrap().push(call);
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn page(
        &self,
        search: &str,
        page_index: u32,
        page_size: u32,
    ) -> Result<PagedResult<PersonRecord>, DomainError> {
        let delay = self.delays.lock().unwrap().get(search).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let matching: Vec<PersonRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.name().to_lowercase().contains(&search.to_lowercase()))
            .cloned()
            .collect();
        let total = self
            .total_override
            .lock()
            .unwrap()
            .unwrap_or(matching.len() as u64);
        let items = matching
            .into_iter()
            .skip((page_index * page_size) as usize)
            .take(page_size as usize)
            .collect();

        Ok(PagedResult::new(items, total))
    }
}

#[async_trait]
impl PessoaApi for FakePessoaApi {
    async fn list_page(
        &self,
        page_index: u32,
        page_size: u32,
    ) -> Result<PagedResult<PersonRecord>, DomainError> {
        self.record_call(format!("list page={page_index} size={page_size}"))?;
        self.page("", page_index, page_size).await
    }

    async fn search_by_name(
        &self,
        name: &str,
        page_index: u32,
        page_size: u32,
    ) -> Result<PagedResult<PersonRecord>, DomainError> {
        self.record_call(format!("filter {name} page={page_index} size={page_size}"))?;
        self.page(name, page_index, page_size).await
    }

    async fn get(&self, id: i64) -> Result<PersonRecord, DomainError> {
        self.record_call(format!("get {id}"))?;
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("PersonRecord", id))
    }

    async fn create(&self, data: &PersonData) -> Result<i64, DomainError> {
        self.record_call("create".to_string())?;
        let mut records = self.records.lock().unwrap();
        let id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        records.push(PersonRecord::new(id, data.clone()));
        self.created.lock().unwrap().push(data.clone());
        Ok(id)
    }

    async fn update(&self, record: &PersonRecord) -> Result<(), DomainError> {
        self.record_call(format!("update {}", record.id))?;
        self.updated.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        self.record_call(format!("delete {id}"))?;
        self.records.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn cpf_exists(&self, cpf: &str) -> Result<bool, DomainError> {
        self.calls.lock().unwrap().push(format!("valid-cpf {cpf}"));
        if *self.fail_cpf_check.lock().unwrap() {
            return Err(DomainError::Transport("connection refused".to_string()));
        }
        Ok(self.records.lock().unwrap().iter().any(|r| r.cpf() == cpf))
    }
}

/// Report service answering status checks from a script.
///
/// `Ok(true)` means ready; an exhausted script keeps answering pending.
#[derive(Default)]
pub(crate) struct FakeReportApi {
    pub request_error: Mutex<Option<DomainError>>,
    pub request_delay: Mutex<Option<Duration>>,
    pub script: Mutex<VecDeque<Result<bool, DomainError>>>,
    pub checks: AtomicUsize,
    pub fetched: Mutex<Vec<String>>,
}

impl FakeReportApi {
    pub fn scripted(script: Vec<Result<bool, DomainError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    pub fn location_for(id: &ReportJobId) -> String {
        format!("mem://relatorio/{id}")
    }
}

#[async_trait]
impl ReportApi for FakeReportApi {
    async fn request_report(&self) -> Result<ReportJobId, DomainError> {
        let delay = *self.request_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.request_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(ReportJobId::new("42")),
        }
    }

    async fn check_report(&self, id: &ReportJobId) -> Result<ReportJob, DomainError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front().unwrap_or(Ok(false));
        match next? {
            true => Ok(ReportJob::ready(id.clone(), Self::location_for(id))),
            false => Ok(ReportJob::pending(id.clone())),
        }
    }

    async fn fetch_report(&self, location: &str) -> Result<Vec<u8>, DomainError> {
        self.fetched.lock().unwrap().push(location.to_string());
        Ok(b"id;nome;cpf\n1;Ana;12345678909\n".to_vec())
    }
}

/// Notifier that records messages and answers confirmations with a fixed value
pub(crate) struct RecordingNotifier {
    pub confirm_answer: bool,
    pub errors: Mutex<Vec<String>>,
    pub infos: Mutex<Vec<String>>,
    pub prompts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn confirming(confirm_answer: bool) -> Self {
        Self {
            confirm_answer,
            errors: Mutex::new(Vec::new()),
            infos: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn notify_info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.confirm_answer
    }
}

/// Postal lookup with a single known code
pub(crate) struct FakePostalLookup;

#[async_trait]
impl PostalCodeLookup for FakePostalLookup {
    async fn lookup(&self, postal_code: &str) -> Result<PostalAddress, DomainError> {
        if postal_code == "01310100" {
            Ok(PostalAddress {
                postal_code: "01310-100".to_string(),
                street: "Avenida Paulista".to_string(),
                complement: String::new(),
                neighborhood: "Bela Vista".to_string(),
                city: "São Paulo".to_string(),
                state: "São Paulo".to_string(),
            })
        } else {
            Err(DomainError::not_found("CEP", postal_code))
        }
    }
}
