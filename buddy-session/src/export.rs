//! Plain-text export of a strategy, shared by copy and `.md` download.

use buddy_primitives::{Section, SectionKind, StrategyRequest, StrategyResult};

/// File name offered for downloads.
pub const EXPORT_FILE_NAME: &str = "strategy.md";

/// Content type of the exported document.
pub const EXPORT_CONTENT_TYPE: &str = "text/markdown";

const RULE: &str = "----------------";

/// Converts a camelCase field key into a display title.
///
/// A space goes before every uppercase letter, then the first character is
/// uppercased: `v1Improvements` becomes `V1 Improvements`.
#[must_use]
pub fn title_case(key: &str) -> String {
    let mut spaced = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_uppercase() {
            spaced.push(' ');
        }
        spaced.push(ch);
    }

    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Renders a section's fields as `Title:\nvalue` blocks joined by blank lines.
#[must_use]
pub fn format_section(section: &dyn Section) -> String {
    section
        .fields()
        .into_iter()
        .map(|(key, value)| format!("{}:\n{value}", title_case(key)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Heading line for a section, icon included.
#[must_use]
pub const fn section_heading(kind: SectionKind) -> &'static str {
    match kind {
        SectionKind::GtmStrategy => "📈 GTM Strategy",
        SectionKind::FeatureRoadmap => "🧩 Feature Roadmap",
        SectionKind::SwotAnalysis => "🔍 SWOT Analysis",
    }
}

/// Renders the full strategy document. No trailing newline.
#[must_use]
pub fn render_full(request: &StrategyRequest, result: &StrategyResult) -> String {
    let header = format!(
        "Startup Idea: {}\nMarket: {}",
        request.startup_idea(),
        request.market_or_general()
    );

    let sections = result
        .sections()
        .iter()
        .map(|section| {
            format!(
                "{}\n{RULE}\n{}",
                section_heading(section.kind()),
                format_section(*section)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{header}\n\n{sections}")
}
