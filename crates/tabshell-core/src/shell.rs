//! Shell state container
//!
//! Tab state lives behind one lock and every mutation runs to completion
//! under it. Page loads happen outside the lock and are applied through
//! load tickets, so a slow response can't overwrite a newer navigation.
//! Change events are queued while the lock is held and delivered after it
//! is released, so observers can read shell state.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

use tabshell_navigation::{
    Bookmark, BookmarkManager, HistoryEntry, HistoryManager, InputResolution, InputResolver,
};
use tabshell_relay::{ContentRelay, Fetcher, HttpFetcher, UNTITLED};
use tabshell_storage::{Database, FallbackStore, MemoryStore, RecordStore, SqliteStore};
use tabshell_tabs::{LoadTicket, Location, Observer, Tab, TabEvent, TabId, TabRegistry};

use crate::config::Config;
use crate::view::{PageView, FAILED_TITLE};
use crate::Result;

struct ShellState {
    registry: TabRegistry,
    views: HashMap<TabId, PageView>,
}

impl ShellState {
    /// Reset a tab's view for a navigation that may need a load
    fn begin(&mut self, tab_id: TabId, ticket: Option<&LoadTicket>) {
        let view = match ticket {
            Some(ticket) => PageView::Loading {
                url: ticket.url().to_string(),
            },
            None => PageView::NewTab,
        };
        self.views.insert(tab_id, view);
    }
}

pub struct Shell<F: Fetcher = HttpFetcher> {
    config: Config,
    state: Arc<Mutex<ShellState>>,
    relay: Arc<ContentRelay<F>>,
    history_manager: HistoryManager,
    bookmark_manager: BookmarkManager,
    input_resolver: Arc<RwLock<InputResolver>>,
    observers: Arc<RwLock<Vec<Observer>>>,
    /// Events raised under the state lock, not yet delivered
    pending: Arc<Mutex<Vec<TabEvent>>>,
}

impl Shell<HttpFetcher> {
    /// Open the database named by `config` and start with one new tab
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::open(&config.database_path)?;

        let relay = ContentRelay::http(config.relay_options())?;
        let history_store = FallbackStore::new(
            SqliteStore::new(db.clone(), "history"),
            MemoryStore::new(),
        );
        let bookmark_store =
            FallbackStore::new(SqliteStore::new(db, "bookmarks"), MemoryStore::new());

        Ok(Self::with_parts(
            config,
            relay,
            Arc::new(history_store),
            Arc::new(bookmark_store),
        ))
    }
}

impl<F: Fetcher> Shell<F> {
    pub fn with_parts(
        config: Config,
        relay: ContentRelay<F>,
        history_store: Arc<dyn RecordStore>,
        bookmark_store: Arc<dyn RecordStore>,
    ) -> Self {
        let mut registry = TabRegistry::new();
        let first = registry.create_tab(None);

        let mut views = HashMap::new();
        views.insert(first, PageView::NewTab);

        let pending = Arc::new(Mutex::new(Vec::new()));
        let queue = Arc::clone(&pending);
        registry.on_change(Arc::new(move |event: &TabEvent| queue.lock().push(*event)));

        let input_resolver = InputResolver::with_search_engine(config.search_engine.clone());

        tracing::info!("Shell initialized");

        Self {
            history_manager: HistoryManager::with_limit(history_store, config.history_limit),
            bookmark_manager: BookmarkManager::new(bookmark_store),
            input_resolver: Arc::new(RwLock::new(input_resolver)),
            relay: Arc::new(relay),
            state: Arc::new(Mutex::new(ShellState { registry, views })),
            observers: Arc::new(RwLock::new(Vec::new())),
            pending,
            config,
        }
    }

    /// Register a change observer.
    ///
    /// Observers are called after the mutation completes, outside the state
    /// lock. They may read shell state but must not mutate it synchronously.
    pub fn subscribe(&self, observer: Observer) {
        self.observers.write().push(observer);
    }

    /// Run a mutation under the state lock, then deliver its events
    fn mutate<T>(&self, f: impl FnOnce(&mut ShellState) -> T) -> T {
        let result = {
            let mut state = self.state.lock();
            f(&mut state)
        };
        self.dispatch();
        result
    }

    fn dispatch(&self) {
        let events = std::mem::take(&mut *self.pending.lock());
        if events.is_empty() {
            return;
        }

        let observers = self.observers.read().clone();
        for event in &events {
            for observer in &observers {
                observer(event);
            }
        }
    }

    // === Tab operations ===

    /// Open a tab, make it active and load its location
    pub async fn open_tab(&self, location: Option<Location>) -> TabId {
        let (tab_id, ticket) = self.mutate(|state| {
            let tab_id = state.registry.create_tab(location);
            let ticket = state.registry.load_ticket(tab_id);
            state.begin(tab_id, ticket.as_ref());
            (tab_id, ticket)
        });

        if let Some(ticket) = ticket {
            self.load(ticket).await;
        }
        tab_id
    }

    /// Close a tab and drop its page view. Late loads for it are ignored.
    pub fn close_tab(&self, tab_id: TabId) {
        self.mutate(|state| {
            state.registry.close_tab(tab_id);
            state.views.remove(&tab_id);

            // Closing the last tab creates a replacement without a view
            let missing: Vec<TabId> = state
                .registry
                .tabs()
                .iter()
                .map(|t| t.id)
                .filter(|id| !state.views.contains_key(id))
                .collect();
            for id in missing {
                state.views.insert(id, PageView::NewTab);
            }
        });
    }

    pub fn switch_tab(&self, tab_id: TabId) {
        self.mutate(|state| state.registry.switch_tab(tab_id));
    }

    pub fn active_tab(&self) -> Option<Tab> {
        self.state.lock().registry.active().cloned()
    }

    pub fn active_tab_id(&self) -> Option<TabId> {
        self.state.lock().registry.active_id()
    }

    pub fn tab(&self, tab_id: TabId) -> Option<Tab> {
        self.state.lock().registry.get(tab_id).cloned()
    }

    /// Tabs in display order
    pub fn tabs(&self) -> Vec<Tab> {
        self.state.lock().registry.tabs().to_vec()
    }

    /// Current content of a live tab
    pub fn page_view(&self, tab_id: TabId) -> Option<PageView> {
        let state = self.state.lock();
        state.registry.get(tab_id)?;
        Some(state.views.get(&tab_id).cloned().unwrap_or(PageView::NewTab))
    }

    // === Navigation operations ===

    pub fn resolve_input(&self, input: &str) -> InputResolution {
        self.input_resolver.read().resolve(input)
    }

    /// Navigate the active tab to address-bar input. Blank input is ignored.
    pub async fn navigate(&self, input: &str) {
        let Some(location) = self.resolve_input(input).into_location() else {
            return;
        };
        self.navigate_to(location).await;
    }

    pub async fn navigate_to(&self, location: Location) {
        let ticket = self.begin_navigation(location);
        if let Some(ticket) = ticket {
            self.load(ticket).await;
        }
    }

    /// Push `location` onto the active tab's history without loading it.
    ///
    /// Returns the ticket to pass to [`Shell::load`] when the location has
    /// remote content.
    pub fn begin_navigation(&self, location: Location) -> Option<LoadTicket> {
        self.mutate(|state| {
            let tab_id = state.registry.active_id()?;
            let ticket = state.registry.navigate_tab(tab_id, location);
            state.begin(tab_id, ticket.as_ref());
            ticket
        })
    }

    pub async fn go_back(&self) {
        let ticket = self.step(|registry| registry.go_back());
        if let Some(ticket) = ticket {
            self.load(ticket).await;
        }
    }

    pub async fn go_forward(&self) {
        let ticket = self.step(|registry| registry.go_forward());
        if let Some(ticket) = ticket {
            self.load(ticket).await;
        }
    }

    /// Re-fetch the active tab's location without touching its history
    pub async fn refresh(&self) {
        let ticket = self.mutate(|state| {
            let tab_id = state.registry.active_id()?;
            let ticket = state.registry.load_ticket(tab_id);
            if ticket.is_some() {
                state.begin(tab_id, ticket.as_ref());
            }
            ticket
        });

        if let Some(ticket) = ticket {
            self.load(ticket).await;
        }
    }

    pub async fn go_home(&self) {
        self.navigate_to(Location::parse(&self.config.home)).await;
    }

    /// History step on the active tab; no-ops leave the view alone
    fn step<S>(&self, step: S) -> Option<LoadTicket>
    where
        S: FnOnce(&mut TabRegistry) -> Option<LoadTicket>,
    {
        self.mutate(|state| {
            let tab_id = state.registry.active_id()?;
            let before = state.registry.get(tab_id)?.history_index();

            let ticket = step(&mut state.registry);
            if state.registry.get(tab_id)?.history_index() != before {
                state.begin(tab_id, ticket.as_ref());
            }
            ticket
        })
    }

    /// Fetch a ticket's location and apply the result if still current.
    ///
    /// Returns whether the result was applied.
    pub async fn load(&self, ticket: LoadTicket) -> bool {
        let url = ticket.url().to_string();

        let (title, view, visit_title) = match self.relay.fetch(&url).await {
            Ok(response) => {
                let title = response.title.clone();
                let visit_title = if title == UNTITLED { url.clone() } else { title.clone() };
                (title, PageView::from_response(response), Some(visit_title))
            }
            Err(e) => {
                tracing::warn!(tab_id = ticket.tab_id, url = %url, error = %e, "Page load failed");
                (FAILED_TITLE.to_string(), PageView::from_error(&e), None)
            }
        };

        let applied = self.mutate(|state| {
            let applied = state.registry.complete_load(&ticket, title);
            if applied {
                state.views.insert(ticket.tab_id, view);
            }
            applied
        });

        if applied {
            if let Some(title) = visit_title {
                if let Err(e) = self.history_manager.record_visit(&title, &url) {
                    tracing::warn!(url = %url, error = %e, "Failed to record history");
                }
            }
        }

        applied
    }

    // === History ===

    /// Visited pages, newest first
    pub fn history(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.history_manager.entries()?)
    }

    pub fn remove_history_entry(&self, id: &str) -> Result<()> {
        Ok(self.history_manager.remove(id)?)
    }

    pub fn clear_history(&self) -> Result<()> {
        Ok(self.history_manager.clear_all()?)
    }

    // === Bookmarks ===

    /// Bookmark the active tab's page, or remove its bookmark.
    ///
    /// Returns whether the page is bookmarked afterwards. The new-tab page
    /// can't be bookmarked.
    pub fn toggle_bookmark(&self) -> Result<bool> {
        let Some(tab) = self.active_tab() else {
            return Ok(false);
        };
        let Some(url) = tab.location.url() else {
            return Ok(false);
        };

        Ok(self.bookmark_manager.toggle(&tab.title, url)?)
    }

    /// Whether the active tab's page is bookmarked
    pub fn is_bookmarked(&self) -> Result<bool> {
        match self.active_tab().as_ref().and_then(|tab| tab.location.url()) {
            Some(url) => Ok(self.bookmark_manager.is_bookmarked(url)?),
            None => Ok(false),
        }
    }

    /// Bookmarks, newest first
    pub fn bookmarks(&self) -> Result<Vec<Bookmark>> {
        Ok(self.bookmark_manager.all()?)
    }

    pub fn remove_bookmark(&self, id: &str) -> Result<()> {
        Ok(self.bookmark_manager.remove(id)?)
    }

    // === Settings ===

    pub fn search_engine(&self) -> String {
        self.input_resolver.read().search_template().to_string()
    }

    pub fn set_search_engine(&self, template: String) {
        self.input_resolver.write().set_search_engine(template);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<F: Fetcher> Clone for Shell<F> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            state: Arc::clone(&self.state),
            relay: Arc::clone(&self.relay),
            history_manager: self.history_manager.clone(),
            bookmark_manager: self.bookmark_manager.clone(),
            input_resolver: Arc::clone(&self.input_resolver),
            observers: Arc::clone(&self.observers),
            pending: Arc::clone(&self.pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tabshell_relay::{FetchedPage, RelayError};
    use tokio::sync::Notify;
    use url::Url;

    /// Serves `<title>{host}{path}</title>` pages. Hosts named `slow.test`
    /// wait until released; `down.test` fails.
    #[derive(Default)]
    struct TestFetcher {
        gate: Arc<Notify>,
        calls: Arc<AtomicUsize>,
    }

    impl Fetcher for TestFetcher {
        async fn fetch(&self, url: &Url) -> tabshell_relay::Result<FetchedPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match url.host_str() {
                Some("down.test") => {
                    return Err(RelayError::FetchFailed("connection refused".to_string()))
                }
                Some("slow.test") => self.gate.notified().await,
                _ => {}
            }

            let content_type = if url.path().ends_with(".bin") {
                "application/octet-stream"
            } else {
                "text/html"
            };

            Ok(FetchedPage {
                status: 200,
                final_url: url.to_string(),
                content_type: content_type.to_string(),
                body: format!(
                    "<title>{}{}</title>",
                    url.host_str().unwrap_or_default(),
                    url.path()
                ),
            })
        }
    }

    fn test_shell() -> (Shell<TestFetcher>, Arc<Notify>, Arc<AtomicUsize>) {
        let fetcher = TestFetcher::default();
        let gate = Arc::clone(&fetcher.gate);
        let calls = Arc::clone(&fetcher.calls);

        let shell = Shell::with_parts(
            Config::new(PathBuf::from("/unused")),
            ContentRelay::new(fetcher, Duration::from_secs(15)),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
        );
        (shell, gate, calls)
    }

    fn active_view(shell: &Shell<TestFetcher>) -> PageView {
        shell.page_view(shell.active_tab_id().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_starts_with_new_tab() {
        let (shell, _, calls) = test_shell();

        let tabs = shell.tabs();
        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs[0].title, "New Tab");
        assert_eq!(active_view(&shell), PageView::NewTab);

        shell.refresh().await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_navigate_loads_and_records_history() {
        let (shell, _, _) = test_shell();

        shell.navigate("ex.com/docs").await;

        let tab = shell.active_tab().unwrap();
        assert_eq!(tab.location.as_str(), "https://ex.com/docs");
        assert_eq!(tab.title, "ex.com/docs");
        assert!(matches!(active_view(&shell), PageView::Document { .. }));

        let history = shell.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].title, "ex.com/docs");
        assert_eq!(history[0].url, "https://ex.com/docs");
    }

    #[tokio::test]
    async fn test_blank_input_ignored() {
        let (shell, _, calls) = test_shell();

        shell.navigate("   ").await;

        assert_eq!(shell.active_tab().unwrap().history_index(), -1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_load() {
        let (shell, _, _) = test_shell();

        shell.navigate("https://down.test/").await;

        assert_eq!(shell.active_tab().unwrap().title, "Failed to load");
        assert_eq!(
            active_view(&shell).message().as_deref(),
            Some("connection refused")
        );
        assert!(shell.history().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_content() {
        let (shell, _, _) = test_shell();

        shell.navigate("https://ex.com/file.bin").await;

        assert_eq!(
            active_view(&shell).message().as_deref(),
            Some("Cannot display content of type application/octet-stream")
        );
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let (shell, gate, _) = test_shell();

        let slow = shell.begin_navigation(Location::parse("https://slow.test/one")).unwrap();
        let pending = tokio::spawn({
            let shell = shell.clone();
            async move { shell.load(slow).await }
        });

        // Let the slow fetch start before moving on
        tokio::task::yield_now().await;
        shell.navigate("https://ex.com/two").await;

        gate.notify_one();
        assert!(!pending.await.unwrap());

        let tab = shell.active_tab().unwrap();
        assert_eq!(tab.location.as_str(), "https://ex.com/two");
        assert_eq!(tab.title, "ex.com/two");
        match active_view(&shell) {
            PageView::Document { url, .. } => assert_eq!(url, "https://ex.com/two"),
            other => panic!("unexpected view {other:?}"),
        }

        let history = shell.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].url, "https://ex.com/two");
    }

    #[tokio::test]
    async fn test_load_for_closed_tab_is_ignored() {
        let (shell, _, _) = test_shell();

        let tab_id = shell.open_tab(None).await;
        let ticket = shell.begin_navigation(Location::parse("https://ex.com/")).unwrap();
        shell.close_tab(tab_id);

        assert!(!shell.load(ticket).await);
        assert!(shell.page_view(tab_id).is_none());
        assert_eq!(shell.tabs().len(), 1);
    }

    #[tokio::test]
    async fn test_history_steps_reload() {
        let (shell, _, calls) = test_shell();

        shell.navigate("https://ex.com/a").await;
        shell.navigate("https://ex.com/b").await;
        shell.go_back().await;

        let tab = shell.active_tab().unwrap();
        assert_eq!(tab.location.as_str(), "https://ex.com/a");
        assert!(tab.can_go_forward());
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        // Already at the start: nothing to load
        shell.go_back().await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        shell.go_forward().await;
        assert_eq!(shell.active_tab().unwrap().title, "ex.com/b");

        shell.refresh().await;
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(shell.active_tab().unwrap().history().len(), 2);
    }

    #[tokio::test]
    async fn test_go_home() {
        let (shell, _, _) = test_shell();

        shell.navigate("https://ex.com/").await;
        shell.go_home().await;

        let tab = shell.active_tab().unwrap();
        assert!(tab.location.is_new_tab());
        assert_eq!(tab.title, "New Tab");
        assert_eq!(active_view(&shell), PageView::NewTab);
        assert!(tab.can_go_back());
    }

    #[tokio::test]
    async fn test_close_last_tab_replaces_it() {
        let (shell, _, _) = test_shell();

        let only = shell.active_tab_id().unwrap();
        shell.close_tab(only);

        let tabs = shell.tabs();
        assert_eq!(tabs.len(), 1);
        assert_ne!(tabs[0].id, only);
        assert_eq!(shell.page_view(tabs[0].id), Some(PageView::NewTab));
    }

    #[tokio::test]
    async fn test_toggle_bookmark() {
        let (shell, _, _) = test_shell();

        // New-tab page can't be bookmarked
        assert!(!shell.toggle_bookmark().unwrap());
        assert!(shell.bookmarks().unwrap().is_empty());

        shell.navigate("https://ex.com/page").await;
        assert!(shell.toggle_bookmark().unwrap());
        assert!(shell.is_bookmarked().unwrap());

        let bookmarks = shell.bookmarks().unwrap();
        assert_eq!(bookmarks[0].title, "ex.com/page");
        assert_eq!(bookmarks[0].url, "https://ex.com/page");

        assert!(!shell.toggle_bookmark().unwrap());
        assert!(!shell.is_bookmarked().unwrap());
    }

    #[tokio::test]
    async fn test_observers_see_mutations() {
        let (shell, _, _) = test_shell();
        let events = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let sink = Arc::clone(&events);
        shell.subscribe(Arc::new(move |event: &TabEvent| sink.lock().push(event.clone())));

        let tab_id = shell.open_tab(Some(Location::parse("https://ex.com/"))).await;
        shell.switch_tab(tab_id);

        assert_eq!(
            *events.lock(),
            vec![
                TabEvent::Created(tab_id),
                TabEvent::Updated(tab_id),
                TabEvent::Switched(tab_id),
            ]
        );
    }

    #[test]
    fn test_observers_can_read_state() {
        let (shell, _, _) = test_shell();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let reader = shell.clone();
        let sink = Arc::clone(&seen);
        shell.subscribe(Arc::new(move |event: &TabEvent| {
            let title = reader.tab(event.tab_id()).map(|tab| tab.title);
            sink.lock().push((*event, title));
        }));

        let (done_tx, done_rx) = std::sync::mpsc::channel();
        let worker = shell.clone();
        std::thread::spawn(move || {
            let first = worker.active_tab_id().unwrap();
            worker.switch_tab(first);
            worker.close_tab(first);
            let _ = done_tx.send(());
        });
        done_rx
            .recv_timeout(Duration::from_secs(3))
            .expect("observer reading shell state must not block mutations");

        let seen = seen.lock();
        assert_eq!(
            *seen,
            vec![
                (TabEvent::Switched(1), Some("New Tab".to_string())),
                // Already gone when observers run
                (TabEvent::Closed(1), None),
            ]
        );
    }
}
