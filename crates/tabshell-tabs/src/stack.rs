//! Back/forward history for a single tab
//!
//! ```text
//! navigate(c) after going back from b:
//!
//!   [a, b]  cursor=0   →   [a, c]  cursor=1
//!        ^ discarded            ^ new head
//! ```
//!
//! The cursor is `None` only while the stack is empty; otherwise it
//! always points at a valid entry.

use serde::{Deserialize, Serialize};

use crate::location::Location;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationStack {
    entries: Vec<Location>,
    cursor: Option<usize>,
}

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stack holding a single entry
    pub fn with_initial(location: Location) -> Self {
        Self {
            entries: vec![location],
            cursor: Some(0),
        }
    }

    /// Push a location, discarding any forward entries past the cursor
    pub fn navigate(&mut self, location: Location) {
        if let Some(cursor) = self.cursor {
            self.entries.truncate(cursor + 1);
        }

        self.entries.push(location);
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Step back one entry. Returns `false` without changing anything at
    /// the start of the stack.
    pub fn go_back(&mut self) -> bool {
        match self.cursor {
            Some(cursor) if cursor > 0 => {
                self.cursor = Some(cursor - 1);
                true
            }
            _ => false,
        }
    }

    /// Step forward one entry. Returns `false` without changing anything
    /// at the end of the stack.
    pub fn go_forward(&mut self) -> bool {
        match self.cursor {
            Some(cursor) if cursor + 1 < self.entries.len() => {
                self.cursor = Some(cursor + 1);
                true
            }
            _ => false,
        }
    }

    pub fn can_go_back(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor > 0)
    }

    pub fn can_go_forward(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor + 1 < self.entries.len())
    }

    /// Entry under the cursor
    pub fn current(&self) -> Option<&Location> {
        self.cursor.and_then(|cursor| self.entries.get(cursor))
    }

    pub fn entries(&self) -> &[Location] {
        &self.entries
    }

    /// Cursor position, `-1` when the stack is empty
    pub fn index(&self) -> isize {
        self.cursor.map_or(-1, |cursor| cursor as isize)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(url: &str) -> Location {
        Location::parse(url)
    }

    #[test]
    fn test_empty_stack() {
        let stack = NavigationStack::new();
        assert_eq!(stack.index(), -1);
        assert!(stack.current().is_none());
        assert!(!stack.can_go_back());
        assert!(!stack.can_go_forward());
    }

    #[test]
    fn test_navigate_advances_cursor() {
        let mut stack = NavigationStack::new();
        for (i, url) in ["https://a.test", "https://b.test", "https://c.test"]
            .iter()
            .enumerate()
        {
            stack.navigate(loc(url));
            assert_eq!(stack.index(), i as isize);
            assert!(!stack.can_go_forward());
        }
        assert!(stack.can_go_back());
    }

    #[test]
    fn test_branch_truncates_forward_entries() {
        let mut stack = NavigationStack::new();
        stack.navigate(loc("https://a.test"));
        stack.navigate(loc("https://b.test"));
        assert!(stack.go_back());
        stack.navigate(loc("https://c.test"));

        assert_eq!(
            stack.entries(),
            &[loc("https://a.test"), loc("https://c.test")]
        );
        assert_eq!(stack.index(), 1);
        assert!(!stack.can_go_forward());
        assert!(stack.can_go_back());
    }

    #[test]
    fn test_back_at_start_is_noop() {
        let mut stack = NavigationStack::with_initial(loc("https://a.test"));
        let before = stack.clone();

        assert!(!stack.go_back());
        assert!(!stack.go_back());
        assert_eq!(stack, before);
    }

    #[test]
    fn test_back_and_forward() {
        let mut stack = NavigationStack::new();
        stack.navigate(loc("https://a.test"));
        stack.navigate(loc("https://b.test"));

        assert!(stack.go_back());
        assert_eq!(stack.current(), Some(&loc("https://a.test")));
        assert!(stack.can_go_forward());
        assert!(!stack.can_go_back());

        assert!(stack.go_forward());
        assert_eq!(stack.current(), Some(&loc("https://b.test")));
        assert!(!stack.go_forward());
        assert_eq!(stack.len(), 2);
    }
}
