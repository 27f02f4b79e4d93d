//! Format envelopes, nodes, directory trees, and consistency reports as text.

use crate::envelope::ResponseEnvelope;
use crate::hierarchy::{ConsistencyReport, Inconsistency, NodeListing};
use crate::tree::{DirectoryNode, Node, NodeKind, Properties};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// One-line envelope status, followed by the error message on failure.
pub fn format_envelope_status<T>(envelope: &ResponseEnvelope<T>) -> String {
    let code = envelope.status.code();
    match &envelope.errors {
        Some(errors) => format!("{} {}\n  {}\n", code, "failure".red(), errors),
        None => format!("{} {}\n", code, "success".green()),
    }
}

fn kind_label(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Folder => "folder",
        NodeKind::File => "file",
    }
}

fn property_rows(properties: &Properties) -> Vec<(&'static str, String)> {
    match properties {
        Properties::Test(p) => vec![
            ("url", p.url.clone()),
            ("browser", p.browser.clone()),
            ("host", p.host.clone().unwrap_or_else(|| "-".to_string())),
            ("content", p.content.clone()),
            ("set", p.set.to_string()),
        ],
        Properties::Phrase(p) => vec![("id", p.id.clone()), ("content", p.content.clone())],
    }
}

/// Format a single node record as a field table.
pub fn format_node_text(node: &Node) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["path".to_string(), node.path.clone()]);
    table.add_row(vec!["type".to_string(), kind_label(node.kind).to_string()]);
    table.add_row(vec!["name".to_string(), node.name.clone()]);
    table.add_row(vec![
        "parent".to_string(),
        node.parent.clone().unwrap_or_else(|| "-".to_string()),
    ]);
    if let Some(properties) = &node.properties {
        for (key, value) in property_rows(properties) {
            table.add_row(vec![key.to_string(), value]);
        }
    }
    format!("{}\n", table)
}

/// Format a node and its direct children.
pub fn format_listing_text(listing: &NodeListing) -> String {
    let mut out = format!("{}\n\n", format_section_heading(&listing.node.path));
    out.push_str(&format_node_text(&listing.node));
    if listing.node.is_folder() {
        out.push('\n');
        if listing.children.is_empty() {
            out.push_str("  (empty folder)\n");
        } else {
            let mut table = Table::new();
            table.load_preset(UTF8_BORDERS_ONLY);
            table.set_header(vec!["Name", "Type", "Path"]);
            for child in &listing.children {
                table.add_row(vec![
                    child.name.clone(),
                    kind_label(child.kind).to_string(),
                    child.path.clone(),
                ]);
            }
            out.push_str(&format!("{}\n", table));
        }
    }
    out
}

/// Format the nested directory view as an indented tree.
pub fn format_directory_text(root: &DirectoryNode) -> String {
    let mut out = format!("{}\n", root.path.bold());
    push_branches(&mut out, root.children(), "");
    out.push_str(&format!("\n{} node(s)\n", root.count()));
    out
}

fn push_branches(out: &mut String, children: &[DirectoryNode], prefix: &str) {
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let (branch, extension) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        match child.kind {
            NodeKind::Folder => {
                out.push_str(&format!("{}{}{}/\n", prefix, branch, child.name.bold()));
                push_branches(out, child.children(), &format!("{}{}", prefix, extension));
            }
            NodeKind::File => out.push_str(&format!("{}{}{}\n", prefix, branch, child.name)),
        }
    }
}

/// Format phrase lookup results.
pub fn format_phrases_text(nodes: &[Node]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Path", "Id", "Content"]);
    for node in nodes {
        let (id, content) = match &node.properties {
            Some(Properties::Phrase(p)) => (p.id.clone(), p.content.clone()),
            _ => ("-".to_string(), "-".to_string()),
        };
        table.add_row(vec![node.path.clone(), id, content]);
    }
    format!("{}\n\nTotal: {} phrase(s)\n", table, nodes.len())
}

fn describe(issue: &Inconsistency) -> (&'static str, String) {
    match issue {
        Inconsistency::MissingRoot => ("missing_root", "no record at /".to_string()),
        Inconsistency::RootHasParent { parent } => {
            ("root_has_parent", format!("root names parent {}", parent))
        }
        Inconsistency::Parentless { path } => ("parentless", path.clone()),
        Inconsistency::WrongParent {
            path,
            parent,
            expected,
        } => (
            "wrong_parent",
            format!("{} names {}, expected {}", path, parent, expected),
        ),
        Inconsistency::Orphan { path, parent } => {
            ("orphan", format!("{} has no folder at {}", path, parent))
        }
        Inconsistency::Unlisted { path, parent } => {
            ("unlisted", format!("{} missing from {}", path, parent))
        }
        Inconsistency::DanglingChild { folder, child } => {
            ("dangling_child", format!("{} lists missing {}", folder, child))
        }
        Inconsistency::MisparentedChild {
            folder,
            child,
            actual_parent,
        } => (
            "misparented_child",
            format!(
                "{} lists {}, whose parent is {}",
                folder,
                child,
                actual_parent.as_deref().unwrap_or("-")
            ),
        ),
        Inconsistency::DuplicateChild { folder, child } => {
            ("duplicate_child", format!("{} lists {} twice", folder, child))
        }
        Inconsistency::Malformed { path, reason } => {
            ("malformed", format!("{}: {}", path, reason))
        }
    }
}

/// Format a consistency report.
pub fn format_report_text(report: &ConsistencyReport) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Hierarchy Check"));
    out.push_str(&format!("  Records: {}\n", report.node_count));
    if report.valid {
        out.push_str(&format!("  Status: {}\n", "consistent".green()));
        return out;
    }
    out.push_str(&format!(
        "  Status: {} ({} issue(s))\n\n",
        "inconsistent".red(),
        report.issues.len()
    ));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Kind", "Detail"]);
    for issue in &report.issues {
        let (kind, detail) = describe(issue);
        table.add_row(vec![kind.to_string(), detail]);
    }
    out.push_str(&format!("{}\n", table));
    out
}
