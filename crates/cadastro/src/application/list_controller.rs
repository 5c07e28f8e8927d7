//! List Controller - Paged, filterable listing of person records
//!
//! Keeps the displayed rows consistent with the current `QueryState`.
//! Queries go through a `Debouncer` so typing a search sends one request,
//! and every request carries a sequence number so that a slow response to
//! an older query never overwrites a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::application::Debouncer;
use crate::config::ClientConfig;
use crate::domain::{DomainError, Pagination, PersonRecord, QueryState};
use crate::ports::{Notifier, PessoaApi};

pub const DELETE_CONFIRMATION: &str = "Realmente deseja apagar?";
pub const DELETE_SUCCESS: &str = "Registro apagado com sucesso!";

/// Snapshot of what the list view renders
#[derive(Debug, Clone, Default)]
pub struct ListState {
    pub query: QueryState,
    pub rows: Vec<PersonRecord>,
    pub total_count: u64,
    pub loading: bool,
    /// Message of the last failed query, cleared by the next success
    pub last_error: Option<String>,
}

impl ListState {
    /// Whether the "no records" caption should be shown
    pub fn is_empty_listing(&self) -> bool {
        self.total_count == 0 && !self.loading
    }
}

/// The report toolbar action is only offered when rows are displayed
pub fn should_offer_report(row_count: usize) -> bool {
    row_count > 0
}

pub struct ListController<A: PessoaApi + 'static> {
    api: Arc<A>,
    notifier: Arc<dyn Notifier>,
    debouncer: Debouncer,
    page_size: u32,
    state: Arc<watch::Sender<ListState>>,
    latest_request: Arc<AtomicU64>,
}

impl<A: PessoaApi + 'static> ListController<A> {
    pub fn new(api: Arc<A>, notifier: Arc<dyn Notifier>, config: &ClientConfig) -> Self {
        let (state, _) = watch::channel(ListState::default());

        Self {
            api,
            notifier,
            debouncer: Debouncer::new(config.debounce),
            page_size: config.page_size.max(1),
            state: Arc::new(state),
            latest_request: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Current snapshot
    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    /// Observe state changes (re-render on every change)
    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.subscribe()
    }

    pub fn query(&self) -> QueryState {
        self.state.borrow().query.clone()
    }

    /// Pagination control, `None` when everything fits on one page
    pub fn pagination(&self) -> Option<Pagination> {
        let state = self.state.borrow();
        Pagination::compute(state.total_count, self.page_size, state.query.page)
    }

    /// Replace the query (navigation, back/forward, shared link) and refresh
    pub fn navigate(&self, query: QueryState) {
        self.state.send_modify(|s| s.query = query);
        self.refresh();
    }

    /// Navigate using a query string such as `busca=Ana&pagina=2`
    pub fn navigate_to(&self, query_string: &str) {
        self.navigate(QueryState::from_query_string(query_string));
    }

    /// New search text goes back to page 1; the current text keeps the page
    pub fn set_search(&self, search: &str) {
        let current = self.query();
        if current.search == search {
            return;
        }
        self.update_query(current.with_search(search));
    }

    pub fn set_page(&self, page: u32) {
        let query = self.query().with_page(page);
        self.update_query(query);
    }

    fn update_query(&self, query: QueryState) {
        if query == self.query() {
            return;
        }
        self.navigate(query);
    }

    /// Re-query the current page.
    ///
    /// Sets `loading` immediately; the request itself is sent once the
    /// debounce delay has passed without another refresh.
    pub fn refresh(&self) {
        let query = self.query();
        let seq = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| s.loading = true);

        let api = Arc::clone(&self.api);
        let notifier = Arc::clone(&self.notifier);
        let state = Arc::clone(&self.state);
        let latest = Arc::clone(&self.latest_request);
        let page_size = self.page_size;

        self.debouncer.schedule(move || async move {
            debug!(seq, query = %query, "Sending listing query");
            let result = if query.is_search() {
                api.search_by_name(&query.search, query.api_page_index(), page_size)
                    .await
            } else {
                api.list_page(query.api_page_index(), page_size).await
            };

            if latest.load(Ordering::SeqCst) != seq {
                debug!(seq, "Discarding response to a superseded query");
                return;
            }

            match result {
                Ok(page) => state.send_modify(|s| {
                    s.loading = false;
                    s.rows = page.items;
                    s.total_count = page.total_count;
                    s.last_error = None;
                }),
                Err(e) => {
                    let message = e.user_message();
                    warn!(error = %e, "Listing query failed");
                    state.send_modify(|s| {
                        s.loading = false;
                        s.last_error = Some(message.clone());
                    });
                    notifier.notify_error(&message);
                }
            }
        });
    }

    /// Delete a record after confirmation.
    ///
    /// On success the row is dropped from the displayed page without a
    /// refresh; the total count is left as reported by the last query.
    /// Returns whether a record was deleted.
    pub async fn remove(&self, id: i64) -> Result<bool, DomainError> {
        if !self.notifier.confirm(DELETE_CONFIRMATION) {
            return Ok(false);
        }

        match self.api.delete(id).await {
            Ok(()) => {
                self.state.send_modify(|s| s.rows.retain(|row| row.id != id));
                self.notifier.notify_info(DELETE_SUCCESS);
                Ok(true)
            }
            Err(e) => {
                warn!(id, error = %e, "Delete failed");
                self.notifier.notify_error(&e.user_message());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{person, FakePessoaApi, RecordingNotifier};
    use std::time::Duration;

    fn config() -> ClientConfig {
        ClientConfig::default()
            .with_page_size(4)
            .with_debounce(Duration::from_millis(300))
    }

    fn people(n: i64) -> Vec<PersonRecord> {
        (1..=n)
            .map(|id| person(id, &format!("Pessoa {id}"), &format!("{:011}", id)))
            .collect()
    }

    fn controller(
        api: Arc<FakePessoaApi>,
        notifier: Arc<RecordingNotifier>,
    ) -> ListController<FakePessoaApi> {
        ListController::new(api, notifier, &config())
    }

    async fn settled(rx: &mut watch::Receiver<ListState>) -> ListState {
        rx.wait_for(|s| !s.loading).await.unwrap().clone()
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_uses_filter_endpoint_and_paginates() {
        let api = Arc::new(FakePessoaApi::with_records(vec![
            person(1, "Ana Lima", "11111111111"),
            person(2, "Ana Souza", "22222222222"),
            person(3, "Bruno", "33333333333"),
        ]));
        *api.total_override.lock().unwrap() = Some(10);
        let ctl = controller(api.clone(), Arc::new(RecordingNotifier::confirming(true)));
        let mut rx = ctl.subscribe();

        ctl.set_search("Ana");
        assert!(ctl.state().loading);
        let state = settled(&mut rx).await;

        assert_eq!(api.calls(), vec!["filter Ana page=0 size=4"]);
        assert_eq!(state.rows.len(), 2);
        assert_eq!(state.total_count, 10);
        let pagination = ctl.pagination().unwrap();
        assert_eq!(pagination.page_count, 3);
        assert_eq!(pagination.current_page, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_search_lists_all() {
        let api = Arc::new(FakePessoaApi::with_records(people(6)));
        let ctl = controller(api.clone(), Arc::new(RecordingNotifier::confirming(true)));
        let mut rx = ctl.subscribe();

        ctl.navigate_to("pagina=2");
        let state = settled(&mut rx).await;

        assert_eq!(api.calls(), vec!["list page=1 size=4"]);
        assert_eq!(state.rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![5, 6]);
        assert_eq!(state.query.to_query_string(), "busca=&pagina=2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_change_resets_page() {
        let api = Arc::new(FakePessoaApi::with_records(people(12)));
        let ctl = controller(api.clone(), Arc::new(RecordingNotifier::confirming(true)));
        let mut rx = ctl.subscribe();

        ctl.navigate(QueryState::new("", 3));
        settled(&mut rx).await;
        ctl.set_search("Pessoa");
        let state = settled(&mut rx).await;

        assert_eq!(state.query.page, 1);
        assert_eq!(api.calls().last().unwrap(), "filter Pessoa page=0 size=4");
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_burst_sends_one_query() {
        let api = Arc::new(FakePessoaApi::with_records(people(3)));
        let ctl = controller(api.clone(), Arc::new(RecordingNotifier::confirming(true)));
        let mut rx = ctl.subscribe();

        for text in ["P", "Pe", "Pes", "Pess"] {
            ctl.set_search(text);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        settled(&mut rx).await;

        assert_eq!(api.calls(), vec!["filter Pess page=0 size=4"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_query_does_not_refresh() {
        let api = Arc::new(FakePessoaApi::with_records(people(3)));
        let ctl = controller(api.clone(), Arc::new(RecordingNotifier::confirming(true)));
        let mut rx = ctl.subscribe();

        ctl.set_search("Pessoa");
        settled(&mut rx).await;
        ctl.set_search("Pessoa");
        ctl.set_page(1);
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_search_keeps_page() {
        let api = Arc::new(FakePessoaApi::with_records(people(12)));
        let ctl = controller(api.clone(), Arc::new(RecordingNotifier::confirming(true)));
        let mut rx = ctl.subscribe();

        ctl.navigate(QueryState::new("Pessoa", 3));
        settled(&mut rx).await;
        ctl.set_search("Pessoa");
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(ctl.query().page, 3);
        assert_eq!(api.calls(), vec!["filter Pessoa page=2 size=4"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let api = Arc::new(FakePessoaApi::with_records(vec![
            person(1, "Ana", "11111111111"),
            person(2, "Bruno", "22222222222"),
        ]));
        api.delays
            .lock()
            .unwrap()
            .insert("Ana".to_string(), Duration::from_secs(5));
        let ctl = controller(api.clone(), Arc::new(RecordingNotifier::confirming(true)));
        let mut rx = ctl.subscribe();

        ctl.set_search("Ana");
        // Let the slow query go out before typing the next one
        tokio::time::sleep(Duration::from_millis(400)).await;
        ctl.set_search("Bruno");
        let state = settled(&mut rx).await;
        assert_eq!(state.rows[0].name(), "Bruno");

        // The slow "Ana" response arrives later and must be ignored
        tokio::time::sleep(Duration::from_secs(10)).await;
        let state = ctl.state();
        assert_eq!(api.calls().len(), 2);
        assert_eq!(state.rows.len(), 1);
        assert_eq!(state.rows[0].name(), "Bruno");
        assert_eq!(state.query.search, "Bruno");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_rows_and_notifies() {
        let api = Arc::new(FakePessoaApi::with_records(people(3)));
        let notifier = Arc::new(RecordingNotifier::confirming(true));
        let ctl = controller(api.clone(), notifier.clone());
        let mut rx = ctl.subscribe();

        ctl.refresh();
        let before = settled(&mut rx).await;
        assert_eq!(before.rows.len(), 3);

        api.fail_next(DomainError::api(Some(500), "Erro ao listar os registros."));
        ctl.set_page(2);
        let after = settled(&mut rx).await;

        assert_eq!(after.rows, before.rows);
        assert_eq!(after.last_error.as_deref(), Some("Erro ao listar os registros."));
        assert_eq!(notifier.errors(), vec!["Erro ao listar os registros."]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_drops_row_but_keeps_total() {
        let api = Arc::new(FakePessoaApi::with_records(people(8)));
        let notifier = Arc::new(RecordingNotifier::confirming(true));
        let ctl = controller(api.clone(), notifier.clone());
        let mut rx = ctl.subscribe();

        ctl.navigate_to("pagina=2");
        settled(&mut rx).await;

        assert!(ctl.remove(7).await.unwrap());
        let state = ctl.state();
        assert!(state.rows.iter().all(|r| r.id != 7));
        assert_eq!(state.rows.len(), 3);
        assert_eq!(state.total_count, 8);
        assert_eq!(notifier.infos(), vec![DELETE_SUCCESS]);
        assert_eq!(api.calls().last().unwrap(), "delete 7");
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_requires_confirmation() {
        let api = Arc::new(FakePessoaApi::with_records(people(2)));
        let ctl = controller(api.clone(), Arc::new(RecordingNotifier::confirming(false)));
        let mut rx = ctl.subscribe();

        ctl.refresh();
        settled(&mut rx).await;

        assert!(!ctl.remove(1).await.unwrap());
        assert_eq!(ctl.state().rows.len(), 2);
        assert!(!api.calls().iter().any(|c| c.starts_with("delete")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_failure_leaves_rows() {
        let api = Arc::new(FakePessoaApi::with_records(people(2)));
        let notifier = Arc::new(RecordingNotifier::confirming(true));
        let ctl = controller(api.clone(), notifier.clone());
        let mut rx = ctl.subscribe();

        ctl.refresh();
        settled(&mut rx).await;

        api.fail_next(DomainError::api(Some(500), "Erro ao apagar o registro."));
        assert!(ctl.remove(1).await.is_err());
        assert_eq!(ctl.state().rows.len(), 2);
        assert_eq!(notifier.errors(), vec!["Erro ao apagar o registro."]);
    }

    #[test]
    fn test_report_offered_only_with_rows() {
        assert!(!should_offer_report(0));
        assert!(should_offer_report(1));
    }

    #[test]
    fn test_empty_listing_caption() {
        let state = ListState::default();
        assert!(state.is_empty_listing());

        let loading = ListState {
            loading: true,
            ..Default::default()
        };
        assert!(!loading.is_empty_listing());
    }
}
