//! Depth-bounded rendering of section stubs.
//!
//! # Responsibility
//! - Project section summaries into relative, display-only stubs.
//! - Expand stubs into indented lines, descending at most `remaining_depth`
//!   levels.
//!
//! # Invariants
//! - Depth strictly decreases on every recursive call.
//! - Depth 0 issues no queries.
//! - Query failures drop the affected block and never abort the listing.

use crate::index::sections::SectionSummary;
use crate::model::item::Item;
use crate::model::placement::Placement;
use log::warn;
use std::fmt::Display;

/// Display-only summary of one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionStub {
    pub placement: Placement,
    /// Section path relative to the listing base, always ending in `/`.
    pub relative_path: String,
    pub item_count: usize,
    pub section_count: usize,
}

impl SectionStub {
    /// Projects `summary` relative to `base`.
    ///
    /// When `summary` is not nested under `base`, the full section path is used.
    pub fn from_summary(summary: &SectionSummary, base: &Placement) -> Self {
        let section = summary.placement.section();
        let skip = if summary.placement.is_within(base) {
            base.section().len()
        } else {
            0
        };
        let mut relative_path = String::new();
        for value in &section[skip..] {
            relative_path.push_str(&value.to_string());
            relative_path.push('/');
        }
        if relative_path.is_empty() {
            relative_path.push('/');
        }
        Self {
            placement: summary.placement.clone(),
            relative_path,
            item_count: summary.item_count,
            section_count: summary.section_count,
        }
    }

    /// Collapsed one-line form.
    pub fn summary_line(&self) -> String {
        format!(
            "{} (items: {}, sections: {})",
            self.relative_path, self.item_count, self.section_count
        )
    }
}

/// Index lookups needed while expanding stubs.
pub trait StubQueries {
    type Error: Display;

    /// Items placed exactly at `placement`.
    fn items_at(&self, placement: &Placement) -> Result<Vec<Item>, Self::Error>;
    /// Immediate child sections of `placement`.
    fn sections_at(&self, placement: &Placement) -> Result<Vec<SectionSummary>, Self::Error>;
}

/// Layout options shared with the item formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Prefix repeated once per indent level.
    pub indent: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
        }
    }
}

/// Recursive stub renderer with injected item formatting and filtering.
pub struct StubExpander<'a, Q: StubQueries> {
    deps: &'a Q,
    options: &'a FormatOptions,
    format_items: &'a dyn Fn(&[Item], &FormatOptions) -> Vec<String>,
    status_filter: &'a dyn Fn(&Item) -> bool,
}

impl<'a, Q: StubQueries> StubExpander<'a, Q> {
    pub fn new(
        deps: &'a Q,
        options: &'a FormatOptions,
        format_items: &'a dyn Fn(&[Item], &FormatOptions) -> Vec<String>,
        status_filter: &'a dyn Fn(&Item) -> bool,
    ) -> Self {
        Self {
            deps,
            options,
            format_items,
            status_filter,
        }
    }

    /// Expands `stubs` starting at indent level 0.
    pub fn expand_lines(&self, stubs: &[SectionStub], remaining_depth: usize) -> Vec<String> {
        let mut lines = Vec::new();
        self.expand(stubs, remaining_depth, 0, &mut lines);
        lines
    }

    /// Appends the rendering of `stubs` to `lines`.
    pub fn expand(
        &self,
        stubs: &[SectionStub],
        remaining_depth: usize,
        indent_level: usize,
        lines: &mut Vec<String>,
    ) {
        for stub in stubs {
            if remaining_depth == 0 {
                self.push(lines, indent_level, stub.summary_line());
                continue;
            }

            self.push(lines, indent_level, stub.relative_path.clone());
            self.expand_items(stub, indent_level + 1, lines);

            let children = match self.deps.sections_at(&stub.placement) {
                Ok(children) => children
                    .iter()
                    .filter(|summary| !summary.is_empty())
                    .map(|summary| SectionStub::from_summary(summary, &stub.placement))
                    .collect::<Vec<_>>(),
                Err(err) => {
                    warn!(
                        "event=stub_expand module=partition status=error block=sections placement={} error={}",
                        stub.placement, err
                    );
                    continue;
                }
            };

            if remaining_depth > 1 {
                self.expand(&children, remaining_depth - 1, indent_level + 1, lines);
            } else {
                for child in &children {
                    self.push(lines, indent_level + 1, child.summary_line());
                }
            }
        }
    }

    fn expand_items(&self, stub: &SectionStub, indent_level: usize, lines: &mut Vec<String>) {
        let mut items = match self.deps.items_at(&stub.placement) {
            Ok(items) => items,
            Err(err) => {
                warn!(
                    "event=stub_expand module=partition status=error block=items placement={} error={}",
                    stub.placement, err
                );
                return;
            }
        };
        items.retain(|item| (self.status_filter)(item));
        items.sort_by(|left, right| left.rank.cmp(&right.rank));
        for line in (self.format_items)(&items, self.options) {
            self.push(lines, indent_level, line);
        }
    }

    fn push(&self, lines: &mut Vec<String>, indent_level: usize, text: String) {
        lines.push(format!("{}{text}", self.options.indent.repeat(indent_level)));
    }
}
