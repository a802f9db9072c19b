//! Tab Registry
//!
//! Owns every tab and the active-tab selection. At least one tab exists
//! once the first one is created: closing the last tab replaces it in the
//! same call.

use crate::event::{Observer, TabEvent};
use crate::location::Location;
use crate::tab::{Tab, TabId};

/// Tag for an in-flight page load.
///
/// A load result may only be applied while the tab is still at the
/// location the ticket was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub tab_id: TabId,
    pub location: Location,
    sequence: u64,
}

impl LoadTicket {
    /// URL to fetch. Tickets are only issued for remote locations.
    pub fn url(&self) -> &str {
        self.location.as_str()
    }
}

pub struct TabRegistry {
    /// Tabs in display order
    tabs: Vec<Tab>,
    active_tab_id: Option<TabId>,
    next_id: TabId,
    next_load: u64,
    observers: Vec<Observer>,
}

impl TabRegistry {
    /// Empty registry. Callers create the first tab.
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            active_tab_id: None,
            next_id: 1,
            next_load: 0,
            observers: Vec::new(),
        }
    }

    /// Register a change observer
    pub fn on_change(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    /// Create a tab, make it active and return its id
    pub fn create_tab(&mut self, initial: Option<Location>) -> TabId {
        let id = self.insert_tab(initial);
        self.notify(TabEvent::Created(id));
        id
    }

    /// Close a tab. Unknown ids are ignored.
    pub fn close_tab(&mut self, tab_id: TabId) {
        let Some(index) = self.position(tab_id) else {
            tracing::debug!(tab_id, "Ignoring close of unknown tab");
            return;
        };

        self.tabs.remove(index);
        tracing::info!(tab_id, "Closed tab");

        if self.tabs.is_empty() {
            let replacement = self.insert_tab(None);
            tracing::debug!(tab_id = replacement, "Replaced last closed tab");
        } else if self.active_tab_id == Some(tab_id) {
            // Keep the user near where they were
            let next = index.min(self.tabs.len() - 1);
            self.active_tab_id = Some(self.tabs[next].id);
        }

        self.notify(TabEvent::Closed(tab_id));
    }

    /// Make `tab_id` the active tab. Unknown ids are ignored.
    pub fn switch_tab(&mut self, tab_id: TabId) {
        if self.position(tab_id).is_none() {
            tracing::debug!(tab_id, "Ignoring switch to unknown tab");
            return;
        }

        self.active_tab_id = Some(tab_id);
        self.notify(TabEvent::Switched(tab_id));
    }

    pub fn active(&self) -> Option<&Tab> {
        self.active_tab_id.and_then(|id| self.get(id))
    }

    pub fn active_id(&self) -> Option<TabId> {
        self.active_tab_id
    }

    pub fn get(&self, tab_id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == tab_id)
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Navigate the active tab
    pub fn navigate(&mut self, location: Location) -> Option<LoadTicket> {
        let tab_id = self.active_tab_id?;
        self.navigate_tab(tab_id, location)
    }

    /// Push `location` onto a tab's history.
    ///
    /// Returns a load ticket when the new location has remote content.
    pub fn navigate_tab(&mut self, tab_id: TabId, location: Location) -> Option<LoadTicket> {
        let tab = self.tab_mut(tab_id)?;
        tab.navigate(location);

        self.notify(TabEvent::Navigated(tab_id));
        self.load_ticket(tab_id)
    }

    /// Step the active tab back. No-op (and no notification) at the start
    /// of its history.
    pub fn go_back(&mut self) -> Option<LoadTicket> {
        let tab_id = self.active_tab_id?;
        if !self.tab_mut(tab_id)?.go_back() {
            return None;
        }

        self.notify(TabEvent::Navigated(tab_id));
        self.load_ticket(tab_id)
    }

    /// Step the active tab forward. No-op (and no notification) at the end
    /// of its history.
    pub fn go_forward(&mut self) -> Option<LoadTicket> {
        let tab_id = self.active_tab_id?;
        if !self.tab_mut(tab_id)?.go_forward() {
            return None;
        }

        self.notify(TabEvent::Navigated(tab_id));
        self.load_ticket(tab_id)
    }

    /// Replace a tab's display title
    pub fn update_title(&mut self, tab_id: TabId, title: String) {
        let Some(tab) = self.tab_mut(tab_id) else {
            return;
        };
        if tab.title == title {
            return;
        }

        tab.title = title;
        self.notify(TabEvent::Updated(tab_id));
    }

    /// Issue a ticket for loading the tab's current location, if remote
    pub fn load_ticket(&mut self, tab_id: TabId) -> Option<LoadTicket> {
        let location = self.get(tab_id)?.location.clone();
        if location.is_new_tab() {
            return None;
        }

        self.next_load += 1;
        Some(LoadTicket {
            tab_id,
            location,
            sequence: self.next_load,
        })
    }

    /// Whether a load result for `ticket` may still be applied
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.get(ticket.tab_id).is_some_and(|tab| {
            tab.location == ticket.location && ticket.sequence > tab.applied_load
        })
    }

    /// Apply a finished load's title.
    ///
    /// Results for closed tabs, for tabs that have moved elsewhere, or
    /// older than an already applied load are discarded.
    pub fn complete_load(&mut self, ticket: &LoadTicket, title: String) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                tab_id = ticket.tab_id,
                location = %ticket.location,
                "Discarding stale load result"
            );
            return false;
        }

        let Some(tab) = self.tab_mut(ticket.tab_id) else {
            return false;
        };
        tab.applied_load = ticket.sequence;
        tab.title = title;

        self.notify(TabEvent::Updated(ticket.tab_id));
        true
    }

    fn insert_tab(&mut self, initial: Option<Location>) -> TabId {
        let id = self.next_id;
        self.next_id += 1;

        let tab = Tab::new(id, initial);
        tracing::info!(tab_id = id, location = %tab.location, "Created new tab");

        self.tabs.push(tab);
        self.active_tab_id = Some(id);
        id
    }

    fn position(&self, tab_id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }

    fn tab_mut(&mut self, tab_id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == tab_id)
    }

    fn notify(&self, event: TabEvent) {
        for observer in &self.observers {
            observer(&event);
        }
    }
}

impl Default for TabRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording(registry: &mut TabRegistry) -> Arc<Mutex<Vec<TabEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        registry.on_change(Arc::new(move |event: &TabEvent| {
            sink.lock().unwrap().push(*event);
        }));
        events
    }

    fn url(s: &str) -> Location {
        Location::parse(s)
    }

    #[test]
    fn test_create_tab_allocates_increasing_ids() {
        let mut registry = TabRegistry::new();
        assert!(registry.active().is_none());

        let first = registry.create_tab(None);
        let second = registry.create_tab(Some(url("https://example.com")));

        assert!(second > first);
        assert_eq!(registry.active_id(), Some(second));
        assert!(registry.get(first).unwrap().history().is_empty());
        assert_eq!(registry.get(second).unwrap().history().len(), 1);
    }

    #[test]
    fn test_branching_navigation() {
        let mut registry = TabRegistry::new();
        let id = registry.create_tab(None);

        registry.navigate(url("https://a.test"));
        registry.navigate(url("https://b.test"));
        registry.go_back();
        registry.navigate(url("https://c.test"));

        let tab = registry.get(id).unwrap();
        assert_eq!(
            tab.history().entries(),
            &[url("https://a.test"), url("https://c.test")]
        );
        assert_eq!(tab.history_index(), 1);
        assert!(!tab.can_go_forward());
        assert!(tab.can_go_back());
        assert_eq!(tab.location, url("https://c.test"));
    }

    #[test]
    fn test_boundary_noops_do_not_notify() {
        let mut registry = TabRegistry::new();
        registry.create_tab(None);
        registry.navigate(url("https://a.test"));

        let events = recording(&mut registry);

        assert!(registry.go_back().is_none());
        assert!(registry.go_back().is_none());
        assert!(registry.go_forward().is_none());
        registry.switch_tab(999);
        registry.close_tab(999);

        assert!(events.lock().unwrap().is_empty());
        assert_eq!(registry.active().unwrap().history_index(), 0);
    }

    #[test]
    fn test_each_mutation_notifies_once() {
        let mut registry = TabRegistry::new();
        let events = recording(&mut registry);

        let id = registry.create_tab(None);
        registry.navigate(url("https://a.test"));
        registry.navigate(url("https://b.test"));
        registry.go_back();
        registry.go_forward();
        registry.update_title(id, "B".to_string());

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                TabEvent::Created(id),
                TabEvent::Navigated(id),
                TabEvent::Navigated(id),
                TabEvent::Navigated(id),
                TabEvent::Navigated(id),
                TabEvent::Updated(id),
            ]
        );
    }

    #[test]
    fn test_closing_only_tab_creates_replacement() {
        let mut registry = TabRegistry::new();
        let only = registry.create_tab(Some(url("https://example.com")));

        registry.close_tab(only);

        assert_eq!(registry.len(), 1);
        let replacement = registry.active().unwrap();
        assert_ne!(replacement.id, only);
        assert!(replacement.history().is_empty());
        assert_eq!(replacement.location, Location::NewTab);
    }

    #[test]
    fn test_closing_inactive_tab_keeps_active() {
        let mut registry = TabRegistry::new();
        let first = registry.create_tab(None);
        let second = registry.create_tab(None);
        let third = registry.create_tab(None);
        registry.switch_tab(second);

        registry.close_tab(first);
        assert_eq!(registry.active_id(), Some(second));

        registry.close_tab(third);
        assert_eq!(registry.active_id(), Some(second));
    }

    #[test]
    fn test_closing_active_tab_selects_neighbor_at_same_position() {
        let mut registry = TabRegistry::new();
        let a = registry.create_tab(None);
        let b = registry.create_tab(None);
        let c = registry.create_tab(None);

        registry.switch_tab(b);
        registry.close_tab(b);
        assert_eq!(registry.active_id(), Some(c));

        // Closing the last position clamps to the new last tab
        registry.close_tab(c);
        assert_eq!(registry.active_id(), Some(a));
    }

    #[test]
    fn test_new_tab_location_issues_no_ticket() {
        let mut registry = TabRegistry::new();
        registry.create_tab(None);

        assert!(registry.navigate(Location::NewTab).is_none());
        let ticket = registry.navigate(url("https://example.com")).unwrap();
        assert_eq!(ticket.url(), "https://example.com");

        assert!(registry.go_back().is_none());
        assert_eq!(registry.active().unwrap().location, Location::NewTab);
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut registry = TabRegistry::new();
        let id = registry.create_tab(None);

        let first = registry.navigate(url("https://one.test")).unwrap();
        let second = registry.navigate(url("https://two.test")).unwrap();

        assert!(!registry.complete_load(&first, "One".to_string()));
        assert!(registry.complete_load(&second, "Two".to_string()));
        assert_eq!(registry.get(id).unwrap().title, "Two");
    }

    #[test]
    fn test_older_ticket_for_same_location_is_discarded() {
        let mut registry = TabRegistry::new();
        registry.create_tab(Some(url("https://one.test")));
        let id = registry.active_id().unwrap();

        let older = registry.load_ticket(id).unwrap();
        let newer = registry.load_ticket(id).unwrap();

        assert!(registry.complete_load(&newer, "Fresh".to_string()));
        assert!(!registry.complete_load(&older, "Old".to_string()));
        assert_eq!(registry.get(id).unwrap().title, "Fresh");
    }

    #[test]
    fn test_ticket_for_closed_tab_is_discarded() {
        let mut registry = TabRegistry::new();
        registry.create_tab(None);
        let doomed = registry.create_tab(None);
        let ticket = registry.navigate(url("https://example.com")).unwrap();

        registry.close_tab(doomed);

        assert!(!registry.complete_load(&ticket, "Late".to_string()));
    }
}
