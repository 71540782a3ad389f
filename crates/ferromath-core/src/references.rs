//! Label/reference dependency graph of a document.
//!
//! Every `\label` becomes a node and every `\ref` an edge from the label that
//! "owns" the referencing line to the referenced label. Sections are nodes
//! too, so references in running text hang off the section they appear in.
//!
//! The owner of a line is, in order of preference:
//!
//! 1. the last label seen so far inside the enclosing numbered environment
//! 2. the label of the most recent environment or free-standing `\label`
//! 3. the current section
//!
//! The scan is line-based and ignores `%` comments.

use ferromath_syntax::{TokenKind, scan};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

static LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\label\{([^}]+)\}").unwrap());
static REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\ref\{([^}]+)\}").unwrap());
static SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(?:section|subsection|subsubsection)\*?\{([^}]+)\}").unwrap()
});
static BEGIN_ENV: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\begin\{(?:equation|align|gather|split|multline|figure|table)\*?\}").unwrap()
});
static END_ENV: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\end\{(?:equation|align|gather|split|multline|figure|table)\*?\}").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Section,
    Equation,
    Figure,
    Generic,
}

impl NodeKind {
    /// Classifies a label by its conventional prefix (`eq:`, `fig:`, `sec:`).
    pub fn from_label(label: &str) -> Self {
        if label.starts_with("eq:") {
            NodeKind::Equation
        } else if label.starts_with("fig:") {
            NodeKind::Figure
        } else if label.starts_with("sec:") {
            NodeKind::Section
        } else {
            NodeKind::Generic
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceNode {
    pub id: String,
    /// Display name: the section title or the label itself.
    pub label: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// One-based line of the definition.
    pub line: usize,
    /// The defining line, or the whole environment for labels inside one.
    pub content: String,
    pub ref_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceEdge {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceGraph {
    /// In order of first definition.
    pub nodes: Vec<ReferenceNode>,
    /// Only edges whose target is a defined node.
    pub edges: Vec<ReferenceEdge>,
}

impl ReferenceGraph {
    pub fn node(&self, id: &str) -> Option<&ReferenceNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Builds the label/reference graph of `text`.
///
/// ```
/// use ferromath_core::build_reference_graph;
///
/// let graph = build_reference_graph("\\section{Intro}\nSee \\ref{eq:a}.\n\\label{eq:a}\n");
/// assert_eq!(graph.edges.len(), 1);
/// assert_eq!(graph.node("eq:a").unwrap().ref_count, 1);
/// ```
pub fn build_reference_graph(text: &str) -> ReferenceGraph {
    let mut builder = GraphBuilder::default();
    for (i, line) in text.lines().enumerate() {
        builder.line(i + 1, line);
    }
    builder.finish()
}

#[derive(Default)]
struct GraphBuilder {
    nodes: Vec<ReferenceNode>,
    index: HashMap<String, usize>,
    edges: Vec<ReferenceEdge>,
    ref_counts: HashMap<String, usize>,

    current_section: Option<String>,
    /// Owner of references made after an environment or free label.
    current_label: Option<String>,
    /// Lines of the open environment, `None` outside one.
    environment: Option<Vec<String>>,
    environment_labels: Vec<String>,
}

impl GraphBuilder {
    fn line(&mut self, number: usize, line: &str) {
        let code = strip_comment(line);

        if let Some(title) = SECTION.captures(code).and_then(|c| c.get(1)) {
            let title = title.as_str();
            let id = format!("sec:{}", title.to_lowercase().replace(' ', "_"));
            if !self.index.contains_key(&id) {
                self.upsert(ReferenceNode {
                    id: id.clone(),
                    label: title.to_string(),
                    kind: NodeKind::Section,
                    line: number,
                    content: format!(r"\section{{{title}}}"),
                    ref_count: 0,
                });
            }
            self.current_section = Some(id);
            self.current_label = None;
        }

        match self.environment.as_mut() {
            None => {
                if let Some(begin) = BEGIN_ENV.find(code) {
                    // A one-line environment closes on the same line.
                    if !END_ENV.is_match(&code[begin.end()..]) {
                        self.environment = Some(vec![line.to_string()]);
                        self.environment_labels.clear();
                    }
                }
            }
            Some(lines) => {
                lines.push(line.to_string());
                if END_ENV.is_match(code) {
                    self.close_environment();
                }
            }
        }

        for cap in LABEL.captures_iter(code) {
            let label = &cap[1];
            self.upsert(ReferenceNode {
                id: label.to_string(),
                label: label.to_string(),
                kind: NodeKind::from_label(label),
                line: number,
                content: line.trim().to_string(),
                ref_count: 0,
            });
            if self.environment.is_some() {
                self.environment_labels.push(label.to_string());
            } else {
                self.current_label = Some(label.to_string());
            }
        }

        let source = match self.environment_labels.last() {
            Some(label) if self.environment.is_some() => Some(label.clone()),
            _ => self
                .current_label
                .clone()
                .or_else(|| self.current_section.clone()),
        };
        for cap in REF.captures_iter(code) {
            let target = &cap[1];
            match &source {
                Some(from) if from != target => {
                    self.edges.push(ReferenceEdge {
                        from: from.clone(),
                        to: target.to_string(),
                    });
                    *self.ref_counts.entry(target.to_string()).or_default() += 1;
                }
                _ => {}
            }
        }
    }

    fn close_environment(&mut self) {
        let Some(lines) = self.environment.take() else {
            return;
        };
        let content = lines.join("\n").trim().to_string();
        for label in &self.environment_labels {
            if let Some(&i) = self.index.get(label) {
                self.nodes[i].content = content.clone();
            }
        }
        if let Some(last) = self.environment_labels.last() {
            self.current_label = Some(last.clone());
        }
    }

    /// Inserts a node, or replaces a redefined one in place.
    fn upsert(&mut self, node: ReferenceNode) {
        match self.index.get(&node.id) {
            Some(&i) => self.nodes[i] = node,
            None => {
                self.index.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    fn finish(mut self) -> ReferenceGraph {
        if self.environment.is_some() {
            log::debug!("Unterminated environment at end of document");
        }
        for node in &mut self.nodes {
            node.ref_count = self.ref_counts.get(&node.id).copied().unwrap_or(0);
        }
        let index = self.index;
        self.edges.retain(|e| index.contains_key(&e.to));
        ReferenceGraph {
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}

fn strip_comment(line: &str) -> &str {
    scan(line)
        .find(|t| t.kind == TokenKind::Comment)
        .map_or(line, |t| &line[..t.position])
}
