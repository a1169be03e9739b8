//! Extraction and merge of the two polish-eligible proposal sections.
//!
//! Deliberately not a markdown parser: a heading-pattern scan over a fixed
//! two-section set is all the polish pass needs, and keeping it that narrow
//! keeps the merge a pure textual substitution.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// The only sections the polish pass is allowed to rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    ExecutiveSummary,
    SolutionArchitecture,
}

pub const SECTIONS: [Section; 2] = [Section::ExecutiveSummary, Section::SolutionArchitecture];

static EXEC_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)##\s*Executive Summary\s*\n").unwrap());
// The solution heading carries a product-name suffix that models reproduce
// inconsistently, hence the anything-to-end-of-line tail.
static SOLUTION_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)##\s*SOLUTION\s+ARCHITECTURE[^\n]*\n").unwrap());
static NEXT_HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n##\s").unwrap());

impl Section {
    fn heading(&self) -> &'static Regex {
        match self {
            Section::ExecutiveSummary => &EXEC_HEADING,
            Section::SolutionArchitecture => &SOLUTION_HEADING,
        }
    }
}

/// Locate a section's span: the heading line plus body, up to but excluding
/// the next `## ` heading (or end of document).
fn span(doc: &str, section: Section) -> Option<Range<usize>> {
    let heading = section.heading().find(doc)?;
    let body_from = heading.end();
    let end = NEXT_HEADING
        .find(&doc[body_from..])
        .map(|next| body_from + next.start())
        .unwrap_or(doc.len());
    Some(heading.start()..end)
}

/// The section's text span, or `None` when the heading is absent.
pub fn extract(doc: &str, section: Section) -> Option<&str> {
    span(doc, section).map(|range| &doc[range])
}

/// Substitute the candidate's recognized sections into the base document.
///
/// Sections missing from the candidate leave the base untouched; everything
/// outside a replaced span stays byte-identical to the base. The result is
/// trimmed of leading/trailing whitespace.
pub fn merge(base: &str, candidate: &str) -> String {
    let mut merged = base.to_string();
    for section in SECTIONS {
        let Some(replacement) = extract(candidate, section) else {
            continue;
        };
        if let Some(range) = span(&merged, section) {
            merged.replace_range(range, replacement.trim());
        }
    }
    merged.trim().to_string()
}
