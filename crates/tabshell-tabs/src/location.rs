//! Tab locations

use serde::{Deserialize, Serialize};

/// Address of the built-in new-tab page
pub const NEW_TAB_URL: &str = "about:newtab";

/// Where a tab points: the built-in new-tab page or a remote URL.
///
/// Serialized as a plain string so observers and history records see the
/// same text the address bar shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Location {
    NewTab,
    Url(String),
}

impl Location {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() || input.eq_ignore_ascii_case(NEW_TAB_URL) {
            Location::NewTab
        } else {
            Location::Url(input.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Location::NewTab => NEW_TAB_URL,
            Location::Url(url) => url,
        }
    }

    /// The URL to fetch, if this location has remote content
    pub fn url(&self) -> Option<&str> {
        match self {
            Location::NewTab => None,
            Location::Url(url) => Some(url),
        }
    }

    pub fn is_new_tab(&self) -> bool {
        matches!(self, Location::NewTab)
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::NewTab
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for Location {
    fn from(value: String) -> Self {
        Location::parse(&value)
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Location::parse(value)
    }
}

impl From<Location> for String {
    fn from(value: Location) -> Self {
        match value {
            Location::NewTab => NEW_TAB_URL.to_string(),
            Location::Url(url) => url,
        }
    }
}
