//! Partition assembly for placement queries.
//!
//! # Responsibility
//! - Group resolved items and child-section summaries into display partitions.
//! - Apply caller caps and report degraded output as warnings.
//!
//! # Invariants
//! - No partition is emitted with zero items and zero stubs.
//! - Date partitions run newest first; numeric partitions run ascending.
//! - Items inside a partition are ordered by rank (stable on ties).
//! - Warnings never abort a build.

use crate::index::sections::SectionSummary;
use crate::model::day::CalendarDay;
use crate::model::item::Item;
use crate::model::placement::{Placement, PlacementHead};
use crate::model::range::PlacementRange;
use crate::partition::stub::SectionStub;
use log::debug;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Identity shown above one partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionHeader {
    /// Date shelf.
    Date(CalendarDay),
    /// Item or permanent section, keyed by its last section number (`0` at the head).
    ItemSection {
        section_prefix: u32,
        display_label: String,
    },
}

/// One display group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub header: PartitionHeader,
    pub items: Vec<Item>,
    pub stubs: Vec<SectionStub>,
}

/// Degraded-output notice attached to a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionWarning {
    DateRangeCapped { requested: usize, limit: usize },
    SectionRangeCapped { requested: usize, limit: usize },
    ItemHeadEventsSkipped { count: usize },
}

/// Build output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionSet {
    pub partitions: Vec<Partition>,
    pub warnings: Vec<PartitionWarning>,
}

/// Caller-supplied caps. `None` means uncapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionOptions {
    pub date_limit: Option<usize>,
    pub section_limit: Option<usize>,
}

/// Assembles partitions from a range, its items and child-section summaries.
pub struct PartitionBuilder<'a> {
    options: PartitionOptions,
    label_formatter: Option<Box<dyn Fn(&Placement) -> String + 'a>>,
}

impl<'a> PartitionBuilder<'a> {
    pub fn new(options: PartitionOptions) -> Self {
        Self {
            options,
            label_formatter: None,
        }
    }

    /// Overrides the section header label (default: placement wire form).
    pub fn with_label_formatter(mut self, formatter: impl Fn(&Placement) -> String + 'a) -> Self {
        self.label_formatter = Some(Box::new(formatter));
        self
    }

    /// Placements whose child sections decorate partitions of `range`, after caps.
    pub fn section_anchors(&self, range: &PlacementRange) -> Vec<Placement> {
        match range {
            PlacementRange::Single(anchor) => vec![anchor.clone()],
            PlacementRange::DateRange { .. } => Vec::new(),
            PlacementRange::NumericRange { parent, from, to } => {
                let (span, _) = cap_numeric(*from, *to, self.options.section_limit);
                span.map(|n| parent.child(n)).collect()
            }
        }
    }

    /// Portion of `range` that survives the caps; `None` when nothing does.
    ///
    /// Callers resolve items for this range and pass the requested range to
    /// [`PartitionBuilder::build`], which reports the cap.
    pub fn effective_range(&self, range: &PlacementRange) -> Option<PlacementRange> {
        match range {
            PlacementRange::Single(_) => Some(range.clone()),
            PlacementRange::DateRange { from, to } => match self.options.date_limit {
                Some(0) => None,
                Some(limit) if from.days_through(*to) > limit => Some(PlacementRange::DateRange {
                    from: most_recent_start(*from, *to, limit),
                    to: *to,
                }),
                _ => Some(range.clone()),
            },
            PlacementRange::NumericRange { parent, from, to } => {
                let (span, _) = cap_numeric(*from, *to, self.options.section_limit);
                (!span.is_empty()).then(|| PlacementRange::NumericRange {
                    parent: parent.clone(),
                    from: *span.start(),
                    to: *span.end(),
                })
            }
        }
    }

    /// Builds partitions.
    ///
    /// `sections` may describe children of any placement; each summary is
    /// attached to the partition whose placement is its parent.
    pub fn build(
        &self,
        range: &PlacementRange,
        items: Vec<Item>,
        sections: &[SectionSummary],
    ) -> PartitionSet {
        let set = match range {
            PlacementRange::Single(anchor) => self.build_single(anchor, items, sections),
            PlacementRange::DateRange { from, to } => self.build_dates(*from, *to, items),
            PlacementRange::NumericRange { parent, from, to } => {
                self.build_numeric(parent, *from, *to, items, sections)
            }
        };
        debug!(
            "event=partition_build module=partition status=ok shape={} partitions={} warnings={}",
            range.shape(),
            set.partitions.len(),
            set.warnings.len()
        );
        set
    }

    fn build_single(
        &self,
        anchor: &Placement,
        items: Vec<Item>,
        sections: &[SectionSummary],
    ) -> PartitionSet {
        let mut skipped = 0;
        let mut matched = Vec::new();
        for item in items {
            if item.placement == *anchor {
                matched.push(item);
            } else if is_foreign_item_head(&item, Some(anchor.head())) {
                skipped += 1;
            }
        }

        let header = match (anchor.head(), anchor.is_root()) {
            (PlacementHead::Date(day), true) => PartitionHeader::Date(*day),
            _ => PartitionHeader::ItemSection {
                section_prefix: anchor.last_section().unwrap_or(0),
                display_label: self.label(anchor),
            },
        };

        let mut set = PartitionSet::default();
        if let Some(partition) = make_partition(header, matched, stubs_for(anchor, sections)) {
            set.partitions.push(partition);
        }
        push_skipped(&mut set.warnings, skipped);
        set
    }

    fn build_dates(&self, from: CalendarDay, to: CalendarDay, items: Vec<Item>) -> PartitionSet {
        let mut set = PartitionSet::default();
        let requested = from.days_through(to);
        let mut first = from;
        let mut closed = false;
        if let Some(limit) = self.options.date_limit {
            if requested > limit {
                set.warnings
                    .push(PartitionWarning::DateRangeCapped { requested, limit });
                first = most_recent_start(from, to, limit);
                closed = limit == 0;
            }
        }

        let mut skipped = 0;
        let mut by_day: BTreeMap<CalendarDay, Vec<Item>> = BTreeMap::new();
        for item in items {
            let shelf = match item.placement.head() {
                PlacementHead::Date(day) if item.placement.is_root() => Some(*day),
                _ => None,
            };
            match shelf {
                Some(day) if !closed && day >= first && day <= to => {
                    by_day.entry(day).or_default().push(item)
                }
                Some(_) => {}
                None if is_foreign_item_head(&item, None) => skipped += 1,
                None => {}
            }
        }

        for (day, day_items) in by_day.into_iter().rev() {
            if let Some(partition) =
                make_partition(PartitionHeader::Date(day), day_items, Vec::new())
            {
                set.partitions.push(partition);
            }
        }
        push_skipped(&mut set.warnings, skipped);
        set
    }

    fn build_numeric(
        &self,
        parent: &Placement,
        from: u32,
        to: u32,
        items: Vec<Item>,
        sections: &[SectionSummary],
    ) -> PartitionSet {
        let mut set = PartitionSet::default();
        let (span, warning) = cap_numeric(from, to, self.options.section_limit);
        if let Some(warning) = warning {
            set.warnings.push(warning);
        }
        if span.is_empty() {
            return set;
        }

        let mut by_prefix: BTreeMap<u32, Vec<Item>> = BTreeMap::new();
        for item in items {
            let Some(prefix) = item.placement.last_section() else {
                continue;
            };
            if !span.contains(&prefix) {
                continue;
            }
            if item.placement.parent().as_ref() == Some(parent) {
                by_prefix.entry(prefix).or_default().push(item);
            }
        }

        for n in span {
            let placement = parent.child(n);
            let header = PartitionHeader::ItemSection {
                section_prefix: n,
                display_label: self.label(&placement),
            };
            let section_items = by_prefix.remove(&n).unwrap_or_default();
            if let Some(partition) =
                make_partition(header, section_items, stubs_for(&placement, sections))
            {
                set.partitions.push(partition);
            }
        }
        set
    }

    fn label(&self, placement: &Placement) -> String {
        match &self.label_formatter {
            Some(formatter) => formatter(placement),
            None => placement.to_string(),
        }
    }
}

/// Renders a warning as one line of user-facing text.
pub fn format_warning(warning: &PartitionWarning) -> String {
    match warning {
        PartitionWarning::SectionRangeCapped { requested, limit } => {
            format!("warning: section range capped at {limit} prefixes (requested {requested})")
        }
        PartitionWarning::DateRangeCapped { requested, limit } => {
            format!("warning: date range capped at {limit} days (requested {requested})")
        }
        PartitionWarning::ItemHeadEventsSkipped { count } => {
            format!("warning: skipped {count} event(s) not under a date head")
        }
    }
}

/// Item filed directly under some item other than the anchor's own head item.
fn is_foreign_item_head(item: &Item, anchor_head: Option<&PlacementHead>) -> bool {
    match item.placement.head() {
        PlacementHead::Item(id) => anchor_head != Some(&PlacementHead::Item(*id)),
        _ => false,
    }
}

fn stubs_for(base: &Placement, sections: &[SectionSummary]) -> Vec<SectionStub> {
    sections
        .iter()
        .filter(|summary| !summary.is_empty())
        .filter(|summary| summary.placement.parent().as_ref() == Some(base))
        .map(|summary| SectionStub::from_summary(summary, base))
        .collect()
}

fn make_partition(
    header: PartitionHeader,
    mut items: Vec<Item>,
    stubs: Vec<SectionStub>,
) -> Option<Partition> {
    if items.is_empty() && stubs.is_empty() {
        return None;
    }
    items.sort_by(|left, right| left.rank.cmp(&right.rank));
    Some(Partition {
        header,
        items,
        stubs,
    })
}

fn push_skipped(warnings: &mut Vec<PartitionWarning>, count: usize) {
    if count > 0 {
        warnings.push(PartitionWarning::ItemHeadEventsSkipped { count });
    }
}

/// Section values processed and the cap warning, if the cap applied.
///
/// A zero `from` (possible only through a struct literal) is treated as `1`.
fn cap_numeric(
    from: u32,
    to: u32,
    limit: Option<usize>,
) -> (RangeInclusive<u32>, Option<PartitionWarning>) {
    let from = from.max(1);
    if to < from {
        return (empty_span(), None);
    }
    let requested = (to - from) as usize + 1;
    match limit {
        Some(0) => (
            empty_span(),
            Some(PartitionWarning::SectionRangeCapped {
                requested,
                limit: 0,
            }),
        ),
        Some(limit) if requested > limit => (
            from..=from + (limit as u32 - 1),
            Some(PartitionWarning::SectionRangeCapped { requested, limit }),
        ),
        _ => (from..=to, None),
    }
}

fn empty_span() -> RangeInclusive<u32> {
    RangeInclusive::new(1, 0)
}

/// First day of the `limit` most recent days ending at `to`.
fn most_recent_start(from: CalendarDay, to: CalendarDay, limit: usize) -> CalendarDay {
    let mut first = to;
    for _ in 1..limit {
        match first.pred() {
            Some(previous) if previous >= from => first = previous,
            _ => break,
        }
    }
    first
}
