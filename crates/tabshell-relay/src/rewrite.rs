//! Markup rewriting
//!
//! Text-level pass over `src`/`href` attributes and `<script>` elements.
//! No parsing: malformed markup is matched on a best-effort basis and
//! anything unrecognized is left exactly as it was.
//!
//! Each attribute value is rewritten at most once, in this order of
//! precedence:
//!
//! 1. root-relative (`/path`) → base origin + path
//! 2. absolute (has a scheme, including `data:` and `javascript:`) → kept
//! 3. fragment-only `href` (`#top`) → kept
//! 4. anything else → resolved against the base URL
//!
//! Finally, `<script>` elements sourced from anything but a `data:` URI
//! are removed.

use regex::{Captures, Regex};
use std::sync::OnceLock;
use url::Url;

fn attribute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?i)(?P<lead>\s)(?P<attr>src|href)\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<uq>[^\s"'=<>`]+))"#,
        )
        .expect("attribute pattern is valid")
    })
}

fn script_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)<script\b(?P<attrs>[^>]*)>.*?</script\s*>")
            .expect("script pattern is valid")
    })
}

fn script_src_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)(?:^|\s)src\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<uq>[^\s>]+))"#)
            .expect("script src pattern is valid")
    })
}

/// Rewrite `markup` fetched from `base_url`.
///
/// An unparsable base leaves the markup untouched.
pub fn rewrite(markup: &str, base_url: &str) -> String {
    match Url::parse(base_url) {
        Ok(base) => rewrite_with_base(markup, &base),
        Err(e) => {
            tracing::warn!(base_url = %base_url, error = %e, "Skipping rewrite, unusable base URL");
            markup.to_string()
        }
    }
}

pub fn rewrite_with_base(markup: &str, base: &Url) -> String {
    let origin = base.origin().ascii_serialization();

    let rewritten = attribute_pattern().replace_all(markup, |caps: &Captures| {
        let (value, quote) = if let Some(v) = caps.name("dq") {
            (v.as_str(), "\"")
        } else if let Some(v) = caps.name("sq") {
            (v.as_str(), "'")
        } else if let Some(v) = caps.name("uq") {
            (v.as_str(), "")
        } else {
            return caps[0].to_string();
        };

        let attr = &caps["attr"];
        match resolve_reference(attr, value, base, &origin) {
            Some(resolved) => format!("{}{}={quote}{resolved}{quote}", &caps["lead"], attr),
            None => caps[0].to_string(),
        }
    });

    strip_external_scripts(&rewritten)
}

/// New value for an attribute, or `None` to keep it as written
fn resolve_reference(attr: &str, value: &str, base: &Url, origin: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if value.starts_with('/') && !value.starts_with("//") {
        return Some(format!("{origin}{value}"));
    }

    if has_scheme(value) {
        return None;
    }

    if attr.eq_ignore_ascii_case("href") && value.starts_with('#') {
        return None;
    }

    // Relative paths and protocol-relative `//host/...`
    base.join(value).ok().map(String::from)
}

/// `scheme:` prefix per RFC 3986
fn has_scheme(value: &str) -> bool {
    let Some((scheme, _)) = value.split_once(':') else {
        return false;
    };

    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn strip_external_scripts(markup: &str) -> String {
    script_pattern()
        .replace_all(markup, |caps: &Captures| {
            let Some(src) = script_src_pattern().captures(&caps["attrs"]) else {
                // Inline script without a source
                return caps[0].to_string();
            };

            let source = src
                .name("dq")
                .or_else(|| src.name("sq"))
                .or_else(|| src.name("uq"))
                .map(|m| m.as_str().trim())
                .unwrap_or_default();

            if source.to_ascii_lowercase().starts_with("data:") {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}
