//! Tab data structure

use serde::Serialize;

use crate::location::Location;
use crate::stack::NavigationStack;

/// Process-unique tab identifier, allocated in increasing order
pub type TabId = u64;

pub const NEW_TAB_TITLE: &str = "New Tab";
pub const LOADING_TITLE: &str = "Loading...";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: TabId,
    /// Display title
    pub title: String,
    /// Location shown in the address bar; follows the history cursor
    pub location: Location,
    history: NavigationStack,
    /// Sequence number of the newest load applied to this tab
    #[serde(skip)]
    pub(crate) applied_load: u64,
}

impl Tab {
    pub(crate) fn new(id: TabId, initial: Option<Location>) -> Self {
        match initial {
            Some(location) => Self {
                id,
                title: title_for(&location).to_string(),
                history: NavigationStack::with_initial(location.clone()),
                location,
                applied_load: 0,
            },
            None => Self {
                id,
                title: NEW_TAB_TITLE.to_string(),
                location: Location::NewTab,
                history: NavigationStack::new(),
                applied_load: 0,
            },
        }
    }

    pub fn history(&self) -> &NavigationStack {
        &self.history
    }

    pub fn history_index(&self) -> isize {
        self.history.index()
    }

    pub fn can_go_back(&self) -> bool {
        self.history.can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.history.can_go_forward()
    }

    pub(crate) fn navigate(&mut self, location: Location) {
        self.history.navigate(location.clone());
        self.title = title_for(&location).to_string();
        self.location = location;

        tracing::debug!(
            tab_id = self.id,
            location = %self.location,
            index = self.history.index(),
            "Tab navigated"
        );
    }

    pub(crate) fn go_back(&mut self) -> bool {
        self.history.go_back() && self.sync_location()
    }

    pub(crate) fn go_forward(&mut self) -> bool {
        self.history.go_forward() && self.sync_location()
    }

    fn sync_location(&mut self) -> bool {
        if let Some(current) = self.history.current() {
            self.location = current.clone();
            self.title = title_for(&self.location).to_string();
        }

        tracing::debug!(
            tab_id = self.id,
            location = %self.location,
            index = self.history.index(),
            "Tab moved through history"
        );

        true
    }

    /// Title, falling back to the location while a page has none
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            self.location.as_str()
        } else {
            &self.title
        }
    }
}

fn title_for(location: &Location) -> &'static str {
    if location.is_new_tab() {
        NEW_TAB_TITLE
    } else {
        LOADING_TITLE
    }
}
