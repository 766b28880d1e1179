//! Cross-reference extraction from section content
//!
//! Four syntaxes are recognized:
//! - `[[Label]]`, normalized with [`slugify`]. `[[./file.md#anchor]]` uses the
//!   anchor and `[[Target|alias]]` uses the target.
//! - `@token`
//! - `{node:id}`
//! - bare `http://` / `https://` URLs, kept verbatim

use crate::parser::slugify;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static WIKI_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\[\]]+?)\]\]").expect("wiki link pattern is a valid regex"));

static MENTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\w@])@([A-Za-z0-9][\w-]*)").expect("mention pattern is a valid regex")
});

static NODE_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{node:\s*([^{}\s]+)\s*\}").expect("node reference pattern is a valid regex")
});

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s<>()\[\]{}"'`]+"#).expect("url pattern is a valid regex")
});

/// Punctuation that ends a sentence rather than a URL
const URL_TRAILING: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Whether a reference token is an external URL
pub fn is_url(token: &str) -> bool {
    token.starts_with("http://") || token.starts_with("https://")
}

/// Whether the part of a wiki link before `#` names a markdown file
fn is_file_link(path: &str) -> bool {
    path.is_empty() || path.starts_with("./") || path.starts_with("../") || path.ends_with(".md")
}

fn wiki_target(inner: &str) -> String {
    let target = inner.split('|').next().unwrap_or(inner).trim();
    let target = match target.rsplit_once('#') {
        Some((path, anchor)) if is_file_link(path.trim()) => {
            if anchor.trim().is_empty() {
                path
            } else {
                anchor
            }
        }
        _ => target,
    };
    let target = target.trim();
    let target = match target.strip_suffix(".md") {
        Some(stem) => stem.rsplit('/').next().unwrap_or(stem),
        None => target,
    };
    slugify(target)
}

/// Extract the deduplicated set of reference tokens in `content`
pub fn extract_references(content: &str) -> BTreeSet<String> {
    let mut refs = BTreeSet::new();
    if content.is_empty() {
        return refs;
    }

    for caps in WIKI_LINK.captures_iter(content) {
        if let Some(inner) = caps.get(1) {
            refs.insert(wiki_target(inner.as_str()));
        }
    }
    for caps in MENTION.captures_iter(content) {
        if let Some(token) = caps.get(1) {
            refs.insert(token.as_str().trim_end_matches('-').to_string());
        }
    }
    for caps in NODE_REF.captures_iter(content) {
        if let Some(id) = caps.get(1) {
            refs.insert(id.as_str().to_string());
        }
    }
    for m in URL.find_iter(content) {
        let url = m.as_str().trim_end_matches(URL_TRAILING);
        let scheme = if url.starts_with("https://") {
            "https://".len()
        } else {
            "http://".len()
        };
        if url.len() > scheme {
            refs.insert(url.to_string());
        }
    }

    refs
}
