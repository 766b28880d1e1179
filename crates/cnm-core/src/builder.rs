//! Graph construction from parsed category documents

use crate::graph::GraphData;
use crate::link::{Link, LinkType};
use crate::node::{Category, Node, NodeType};
use crate::parser::{parse_sections, slugify, ParsedSection};
use crate::reference::is_url;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Maximum description length in characters
pub const MAX_DESCRIPTION_CHARS: usize = 280;

/// One markdown document whose sections all belong to a category
#[derive(Debug, Clone)]
pub struct CategoryDocument {
    pub category: Category,
    /// Where the document came from (file name), recorded on its nodes
    pub source: Option<String>,
    pub sections: Vec<ParsedSection>,
}

impl CategoryDocument {
    pub fn new(category: Category, sections: Vec<ParsedSection>) -> Self {
        Self {
            category,
            source: None,
            sections,
        }
    }

    /// Parse markdown text into a document
    pub fn parse(category: Category, markdown: &str) -> Self {
        Self::new(category, parse_sections(markdown))
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Statistics from one build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub documents: usize,
    pub sections: usize,
    pub nodes: usize,
    /// Sections whose id was already taken by an earlier section
    pub duplicate_sections: usize,
    pub hierarchy_links: usize,
    pub reference_links: usize,
    /// References that matched no node id and were dropped
    pub unresolved_references: usize,
    pub external_urls: usize,
}

/// Builds one [`GraphData`] from any number of category documents
#[derive(Debug, Default)]
pub struct GraphBuilder {
    documents: Vec<CategoryDocument>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(&mut self, document: CategoryDocument) -> &mut Self {
        self.documents.push(document);
        self
    }

    pub fn with_document(mut self, document: CategoryDocument) -> Self {
        self.documents.push(document);
        self
    }

    /// Build the graph and a report of what was emitted or dropped
    pub fn build(&self) -> (GraphData, BuildReport) {
        let mut report = BuildReport {
            documents: self.documents.len(),
            ..Default::default()
        };

        let mut nodes: Vec<Node> = Vec::new();
        let mut ids: HashSet<String> = HashSet::new();
        for doc in &self.documents {
            for section in &doc.sections {
                Self::collect_nodes(doc, section, true, &mut nodes, &mut ids, &mut report);
            }
        }

        let mut links: Vec<Link> = Vec::new();
        let mut seen_links: HashSet<(String, String, LinkType)> = HashSet::new();
        for doc in &self.documents {
            for section in &doc.sections {
                Self::collect_links(section, &ids, &mut links, &mut seen_links, &mut report);
            }
        }

        report.nodes = nodes.len();
        tracing::info!(
            "Built graph: {} nodes, {} hierarchy links, {} reference links ({} unresolved references dropped)",
            report.nodes,
            report.hierarchy_links,
            report.reference_links,
            report.unresolved_references
        );

        (GraphData::from_parts(nodes, links), report)
    }

    fn collect_nodes(
        doc: &CategoryDocument,
        section: &ParsedSection,
        top_level: bool,
        nodes: &mut Vec<Node>,
        ids: &mut HashSet<String>,
        report: &mut BuildReport,
    ) {
        report.sections += 1;

        if ids.insert(section.id.clone()) {
            nodes.push(Self::section_node(doc, section, top_level));
        } else {
            report.duplicate_sections += 1;
            tracing::debug!("Section id already in use, merging: {}", section.id);
        }

        for child in &section.subsections {
            Self::collect_nodes(doc, child, false, nodes, ids, report);
        }
    }

    fn section_node(doc: &CategoryDocument, section: &ParsedSection, top_level: bool) -> Node {
        let node_type = if top_level && section.level == 1 {
            NodeType::Overview(doc.category)
        } else {
            NodeType::Entity(doc.category)
        };
        let label = if section.title.is_empty() {
            section.id.clone()
        } else {
            section.title.clone()
        };

        let mut node = Node::new(section.id.clone(), node_type, label);
        node.description = first_paragraph(&section.content);
        node.metadata
            .insert("level".to_string(), serde_json::json!(section.level));
        if let Some(source) = &doc.source {
            node.metadata
                .insert("source".to_string(), serde_json::json!(source));
        }
        let urls: Vec<&str> = section
            .references
            .iter()
            .map(String::as_str)
            .filter(|r| is_url(r))
            .collect();
        if !urls.is_empty() {
            node.metadata
                .insert("urls".to_string(), serde_json::json!(urls));
        }
        node
    }

    fn collect_links(
        section: &ParsedSection,
        ids: &HashSet<String>,
        links: &mut Vec<Link>,
        seen: &mut HashSet<(String, String, LinkType)>,
        report: &mut BuildReport,
    ) {
        for child in &section.subsections {
            if push_link(links, seen, Link::new(&section.id, &child.id, LinkType::Categorizes)) {
                report.hierarchy_links += 1;
            }
        }

        for reference in &section.references {
            if is_url(reference) {
                report.external_urls += 1;
                continue;
            }
            let Some(target) = resolve(reference, ids) else {
                report.unresolved_references += 1;
                tracing::debug!("Unresolved reference in {}: {}", section.id, reference);
                continue;
            };
            let link = Link::new(&section.id, target, LinkType::References)
                .with_justification(format!("Referenced in \"{}\"", section.title));
            if push_link(links, seen, link) {
                report.reference_links += 1;
            }
        }

        for child in &section.subsections {
            Self::collect_links(child, ids, links, seen, report);
        }
    }
}

/// Build a graph from category documents
pub fn build_graph(documents: impl IntoIterator<Item = CategoryDocument>) -> GraphData {
    let mut builder = GraphBuilder::new();
    for doc in documents {
        builder.add_document(doc);
    }
    builder.build().0
}

/// Resolve a reference token against the node id set
fn resolve(reference: &str, ids: &HashSet<String>) -> Option<String> {
    if ids.contains(reference) {
        return Some(reference.to_string());
    }
    let slug = slugify(reference);
    ids.contains(&slug).then_some(slug)
}

/// Push unless it is a self-loop or an exact duplicate; returns whether pushed
fn push_link(
    links: &mut Vec<Link>,
    seen: &mut HashSet<(String, String, LinkType)>,
    link: Link,
) -> bool {
    if link.source == link.target {
        return false;
    }
    if !seen.insert((link.source.clone(), link.target.clone(), link.link_type)) {
        return false;
    }
    links.push(link);
    true
}

fn first_paragraph(content: &str) -> Option<String> {
    let paragraph = content
        .split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty())?;
    let collapsed = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_DESCRIPTION_CHARS {
        return Some(collapsed);
    }
    let truncated: String = collapsed.chars().take(MAX_DESCRIPTION_CHARS).collect();
    Some(format!("{}...", truncated.trim_end()))
}
