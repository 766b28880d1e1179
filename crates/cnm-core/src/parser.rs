//! Markdown section parser
//!
//! Turns ATX-headed markdown into a forest of [`ParsedSection`]s. A heading of
//! level L closes every open section of level >= L and opens a new section
//! under whatever remains open. Level gaps (`#` followed by `####`) nest
//! directly; no intermediate sections are synthesized.

use crate::reference::extract_references;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ {0,3}(#{1,6})(?:[ \t]+(.*?))?(?:[ \t]+#+)?[ \t]*$")
        .expect("heading pattern is a valid regex")
});

/// Fallback slug for titles with no usable characters
pub const UNTITLED: &str = "untitled";

/// Derive a stable identifier from a title
///
/// Lowercases, keeps only `[a-z0-9 -]`, turns space runs into single
/// hyphens, collapses repeated hyphens and trims them at both ends. Other
/// whitespace (tabs, NBSP) is stripped with the rest of the punctuation.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        match c {
            'a'..='z' | '0'..='9' => {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(c);
            }
            ' ' | '-' => pending_hyphen = true,
            _ => {}
        }
    }

    if slug.is_empty() {
        UNTITLED.to_string()
    } else {
        slug
    }
}

/// One heading and the content beneath it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSection {
    pub title: String,
    pub content: String,
    /// Heading level, 1 through 6
    pub level: u8,
    /// Slug of the title
    pub id: String,
    pub subsections: Vec<ParsedSection>,
    /// Reference tokens found in `content`
    pub references: BTreeSet<String>,
    /// Titles of the enclosing sections, outermost first
    pub parent_path: Vec<String>,
}

impl ParsedSection {
    /// Number of sections in this subtree, including `self`
    pub fn count(&self) -> usize {
        1 + self.subsections.iter().map(ParsedSection::count).sum::<usize>()
    }
}

/// Section being accumulated while its heading is open
struct OpenSection {
    title: String,
    level: u8,
    lines: Vec<String>,
    subsections: Vec<ParsedSection>,
    parent_path: Vec<String>,
}

impl OpenSection {
    fn close(self) -> ParsedSection {
        let content = self.lines.join("\n").trim().to_string();
        ParsedSection {
            id: slugify(&self.title),
            references: extract_references(&content),
            title: self.title,
            content,
            level: self.level,
            subsections: self.subsections,
            parent_path: self.parent_path,
        }
    }
}

fn heading(line: &str) -> Option<(u8, String)> {
    let caps = HEADING.captures(line)?;
    let level = caps.get(1)?.as_str().len() as u8;
    let title = caps
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    Some((level, title))
}

fn fence_marker(line: &str) -> Option<char> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("```") {
        Some('`')
    } else if trimmed.starts_with("~~~") {
        Some('~')
    } else {
        None
    }
}

/// Pop the top of the stack and attach it to its parent (or the roots)
fn close_top(stack: &mut Vec<OpenSection>, roots: &mut Vec<ParsedSection>) {
    if let Some(open) = stack.pop() {
        let section = open.close();
        match stack.last_mut() {
            Some(parent) => parent.subsections.push(section),
            None => roots.push(section),
        }
    }
}

/// Parse markdown text into a forest of sections
///
/// Lines before the first heading belong to no section and are dropped.
/// Headings inside fenced code blocks are treated as content.
pub fn parse_sections(text: &str) -> Vec<ParsedSection> {
    let mut roots: Vec<ParsedSection> = Vec::new();
    let mut stack: Vec<OpenSection> = Vec::new();
    let mut fence: Option<char> = None;
    let mut preamble_lines = 0usize;

    for line in text.lines() {
        if let Some(marker) = fence_marker(line) {
            fence = match fence {
                Some(open) if open == marker => None,
                Some(open) => Some(open),
                None => Some(marker),
            };
        } else if fence.is_none() {
            if let Some((level, title)) = heading(line) {
                while stack.last().is_some_and(|top| top.level >= level) {
                    close_top(&mut stack, &mut roots);
                }
                let parent_path = stack.iter().map(|s| s.title.clone()).collect();
                stack.push(OpenSection {
                    title,
                    level,
                    lines: Vec::new(),
                    subsections: Vec::new(),
                    parent_path,
                });
                continue;
            }
        }

        match stack.last_mut() {
            Some(open) => open.lines.push(line.to_string()),
            None => preamble_lines += 1,
        }
    }

    while !stack.is_empty() {
        close_top(&mut stack, &mut roots);
    }

    tracing::debug!(
        "Parsed {} top-level sections ({} preamble lines dropped)",
        roots.len(),
        preamble_lines
    );
    roots
}
