//! Input resolution for the address bar
//!
//! 1. `about:newtab` → new-tab page
//! 2. Valid http(s) URL or domain-like text → navigate
//! 3. Anything else → search

use std::net::IpAddr;
use tabshell_tabs::{Location, NEW_TAB_URL};
use url::Url;

pub const DEFAULT_SEARCH_ENGINE: &str = "https://duckduckgo.com/?q=%s";

/// Result of resolving address bar input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResolution {
    /// Blank input, nothing to do
    Ignore,
    /// Navigate to a location
    Navigate(Location),
    /// Navigate to a search results URL
    Search(String),
}

impl InputResolution {
    /// Location the tab should move to, if any
    pub fn into_location(self) -> Option<Location> {
        match self {
            InputResolution::Ignore => None,
            InputResolution::Navigate(location) => Some(location),
            InputResolution::Search(url) => Some(Location::Url(url)),
        }
    }
}

pub struct InputResolver {
    /// Search engine URL template (%s replaced with query)
    search_template: String,
}

impl InputResolver {
    pub fn new() -> Self {
        Self::with_search_engine(DEFAULT_SEARCH_ENGINE.to_string())
    }

    pub fn with_search_engine(template: String) -> Self {
        Self {
            search_template: template,
        }
    }

    pub fn set_search_engine(&mut self, template: String) {
        self.search_template = template;
    }

    pub fn search_template(&self) -> &str {
        &self.search_template
    }

    /// Resolve user input into an action
    pub fn resolve(&self, input: &str) -> InputResolution {
        let input = input.trim();

        if input.is_empty() {
            return InputResolution::Ignore;
        }

        if input.eq_ignore_ascii_case(NEW_TAB_URL) {
            return InputResolution::Navigate(Location::NewTab);
        }

        if let Some(url) = self.try_parse_url(input) {
            return InputResolution::Navigate(Location::Url(url));
        }

        InputResolution::Search(self.build_search_url(input))
    }

    /// Try to parse input as a fetchable URL
    fn try_parse_url(&self, input: &str) -> Option<String> {
        let lowered = input.to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            return Url::parse(input).ok().map(|_| input.to_string());
        }

        // URL without scheme - check if it looks like a domain
        if self.looks_like_url(input) {
            let (host, rest) = Self::split_host_and_rest(input);
            let with_https = if self.is_ipv6_host(host) && !host.starts_with('[') {
                format!("https://[{}]{}", host, rest)
            } else {
                format!("https://{}{}", host, rest)
            };

            if Url::parse(&with_https).is_ok() {
                return Some(with_https);
            }
        }

        None
    }

    /// Heuristic check if input looks like a URL
    fn looks_like_url(&self, input: &str) -> bool {
        if input.contains(' ') {
            return false;
        }

        if input.starts_with("localhost") || self.is_ip_address(input) {
            return true;
        }

        // Domain-like pattern: something dotted with an alphabetic TLD
        let (host, _) = Self::split_host_and_rest(input);
        let host = host.split(':').next().unwrap_or(host);
        match host.rsplit_once('.') {
            Some((name, tld)) => {
                !name.is_empty()
                    && tld.len() >= 2
                    && tld.len() <= 24
                    && tld.chars().all(|c| c.is_alphabetic())
            }
            None => false,
        }
    }

    fn is_ip_address(&self, input: &str) -> bool {
        let (host, _) = Self::split_host_and_rest(input);
        self.parse_ip_host(host).is_some()
    }

    fn is_ipv6_host(&self, host: &str) -> bool {
        matches!(self.parse_ip_host(host), Some(IpAddr::V6(_)))
    }

    fn parse_ip_host(&self, host: &str) -> Option<IpAddr> {
        let host = host.trim();
        if host.is_empty() {
            return None;
        }

        let host = if host.starts_with('[') {
            host.strip_prefix('[')
                .and_then(|s| s.split(']').next())
                .unwrap_or(host)
        } else if host.matches(':').count() == 1 {
            host.split(':').next().unwrap_or(host)
        } else {
            host
        };

        host.parse().ok()
    }

    fn split_host_and_rest(input: &str) -> (&str, &str) {
        let cut = input.find(['/', '?', '#']).unwrap_or(input.len());
        input.split_at(cut)
    }

    fn build_search_url(&self, query: &str) -> String {
        let encoded = urlencoding::encode(query);
        self.search_template.replace("%s", &encoded)
    }
}

impl Default for InputResolver {
    fn default() -> Self {
        Self::new()
    }
}
