//! Report Workflow - Asynchronous CSV report generation
//!
//! `Idle → Generating → Ready`, plus `Failed` when polling gives up.
//! The location of the last ready report is persisted through a
//! `ReportLocationStore`, so a workflow created later starts in `Ready`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::PollPolicy;
use crate::domain::{DomainError, ReportJobId};
use crate::ports::{ReportApi, ReportLocationStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportState {
    Idle,
    /// `job_id` is `None` until the service has accepted the request
    Generating { job_id: Option<ReportJobId> },
    Ready { location: String },
    Failed { reason: String },
}

impl ReportState {
    pub fn is_generating(&self) -> bool {
        matches!(self, Self::Generating { .. })
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Ready { location } => Some(location),
            _ => None,
        }
    }
}

pub struct ReportWorkflow<R: ReportApi + 'static> {
    api: Arc<R>,
    store: Arc<dyn ReportLocationStore>,
    policy: PollPolicy,
    state: Arc<watch::Sender<ReportState>>,
    poller: Mutex<Option<JoinHandle<()>>>,
    /// Bumped by `shutdown`; a request that resolves under an older epoch
    /// is dropped
    epoch: AtomicU64,
}

impl<R: ReportApi + 'static> ReportWorkflow<R> {
    /// Create a workflow, resuming from a persisted report location
    pub fn new(api: Arc<R>, store: Arc<dyn ReportLocationStore>, policy: PollPolicy) -> Self {
        let initial = match store.get() {
            Ok(Some(location)) => {
                debug!(location = %location, "Resuming with persisted report");
                ReportState::Ready { location }
            }
            Ok(None) => ReportState::Idle,
            Err(e) => {
                warn!(error = %e, "Could not read persisted report location");
                ReportState::Idle
            }
        };
        let (state, _) = watch::channel(initial);

        Self {
            api,
            store,
            policy,
            state: Arc::new(state),
            poller: Mutex::new(None),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> ReportState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ReportState> {
        self.state.subscribe()
    }

    /// Drives the "generating" indicator
    pub fn is_generating(&self) -> bool {
        self.state.borrow().is_generating()
    }

    /// Location of the last ready report.
    ///
    /// While a new report is generating, or after it failed, this is still
    /// the previously persisted one.
    pub fn location(&self) -> Option<String> {
        let ready = self.state.borrow().location().map(str::to_string);
        if ready.is_some() {
            return ready;
        }

        match self.store.get() {
            Ok(location) => location,
            Err(e) => {
                warn!(error = %e, "Could not read persisted report location");
                None
            }
        }
    }

    /// Wait for the current generation to settle.
    ///
    /// Returns the download location, or `ReportFailed` when the job failed
    /// or nothing was being generated.
    pub async fn wait_until_ready(&self) -> Result<String, DomainError> {
        let mut rx = self.state.subscribe();
        let settled = rx
            .wait_for(|s| !s.is_generating())
            .await
            .map_err(|_| DomainError::ReportFailed("Report workflow stopped".to_string()))?
            .clone();

        match settled {
            ReportState::Ready { location } => Ok(location),
            ReportState::Failed { reason } => Err(DomainError::ReportFailed(reason)),
            ReportState::Idle | ReportState::Generating { .. } => Err(DomainError::ReportFailed(
                "Nenhum relatório em geração.".to_string(),
            )),
        }
    }

    /// Ask for a new report and start polling for it.
    ///
    /// Rejected while a report is already being generated. When the
    /// request itself fails the previous state is restored.
    /// A request that resolves after `shutdown` starts no poller.
    pub async fn generate(&self) -> Result<ReportJobId, DomainError> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let mut previous = None;
        self.state.send_if_modified(|s| {
            if s.is_generating() {
                return false;
            }
            previous = Some(std::mem::replace(s, ReportState::Generating { job_id: None }));
            true
        });
        let Some(previous) = previous else {
            return Err(DomainError::Conflict(
                "A report is already being generated".to_string(),
            ));
        };

        let result = self.api.request_report().await;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!("Workflow shut down while the report was requested");
            return Err(DomainError::ReportFailed(
                "Geração de relatório cancelada.".to_string(),
            ));
        }

        match result {
            Ok(job_id) => {
                info!(job_id = %job_id, "Report generation started");
                self.state.send_replace(ReportState::Generating {
                    job_id: Some(job_id.clone()),
                });
                self.spawn_poller(job_id.clone());
                Ok(job_id)
            }
            Err(e) => {
                error!(error = %e, "Failed to request report");
                self.state.send_replace(previous);
                Err(e)
            }
        }
    }

    fn spawn_poller(&self, job_id: ReportJobId) {
        let task = tokio::spawn(poll_until_ready(
            Arc::clone(&self.api),
            Arc::clone(&self.store),
            self.policy.clone(),
            Arc::clone(&self.state),
            job_id,
        ));

        let mut poller = self.poller.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = poller.replace(task) {
            previous.abort();
        }
    }

    /// Fetch the ready report. `Ok(None)` when there is nothing to download.
    pub async fn download(&self) -> Result<Option<Vec<u8>>, DomainError> {
        let Some(location) = self.location() else {
            debug!("No report to download");
            return Ok(None);
        };

        let bytes = self.api.fetch_report(&location).await?;
        info!(location = %location, bytes = bytes.len(), "Report downloaded");
        Ok(Some(bytes))
    }

    /// Forget the persisted report. A generation in progress keeps running.
    pub fn clear(&self) -> Result<(), DomainError> {
        self.store.clear()?;
        self.state.send_if_modified(|s| {
            if s.is_generating() {
                return false;
            }
            *s = ReportState::Idle;
            true
        });
        Ok(())
    }

    /// Stop polling. A generation in progress is abandoned.
    pub fn shutdown(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.abort_poller();
        self.state.send_if_modified(|s| {
            if !s.is_generating() {
                return false;
            }
            *s = ReportState::Idle;
            true
        });
    }

    fn abort_poller(&self) {
        let mut poller = self.poller.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(task) = poller.take() {
            task.abort();
        }
    }
}

impl<R: ReportApi + 'static> Drop for ReportWorkflow<R> {
    fn drop(&mut self) {
        self.abort_poller();
    }
}

/// Poll the job until it is ready, giving up after too many consecutive
/// failed checks or once `max_wait` has passed.
async fn poll_until_ready<R: ReportApi>(
    api: Arc<R>,
    store: Arc<dyn ReportLocationStore>,
    policy: PollPolicy,
    state: Arc<watch::Sender<ReportState>>,
    job_id: ReportJobId,
) {
    let started = Instant::now();
    let mut failures = 0u32;

    loop {
        tokio::time::sleep(policy.next_delay(failures)).await;

        if started.elapsed() >= policy.max_wait {
            warn!(job_id = %job_id, "Gave up waiting for report");
            state.send_replace(ReportState::Failed {
                reason: "Tempo esgotado aguardando o relatório.".to_string(),
            });
            return;
        }

        match api.check_report(&job_id).await {
            Ok(job) if job.is_ready() => {
                let Some(location) = job.location else {
                    error!(job_id = %job_id, "Ready report without a location");
                    state.send_replace(ReportState::Failed {
                        reason: "Relatório pronto sem endereço de download.".to_string(),
                    });
                    return;
                };

                if let Err(e) = store.set(&location) {
                    warn!(error = %e, "Could not persist report location");
                }
                info!(job_id = %job_id, location = %location, "Report ready");
                state.send_replace(ReportState::Ready { location });
                return;
            }
            Ok(_) => {
                debug!(job_id = %job_id, "Report not ready yet");
                failures = 0;
            }
            Err(e) => {
                failures += 1;
                warn!(job_id = %job_id, failures, error = %e, "Report status check failed");

                if failures >= policy.max_consecutive_failures {
                    state.send_replace(ReportState::Failed {
                        reason: e.user_message(),
                    });
                    return;
                }
            }
        }
    }
}
