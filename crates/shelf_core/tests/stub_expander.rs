use shelf_core::{
    FormatOptions, Item, ItemKind, ItemRank, Placement, SectionStub, SectionSummary,
    StubExpander, StubQueries, TaskStatus,
};
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Default)]
struct FakeIndex {
    items: HashMap<Placement, Vec<Item>>,
    sections: HashMap<Placement, Vec<SectionSummary>>,
    broken: Vec<Placement>,
    item_queries: RefCell<Vec<Placement>>,
    section_queries: RefCell<Vec<Placement>>,
}

impl FakeIndex {
    fn add_item(&mut self, item: Item) {
        self.items
            .entry(item.placement.clone())
            .or_default()
            .push(item);
    }

    fn add_section(&mut self, placement: Placement, item_count: usize, section_count: usize) {
        let parent = placement.parent().unwrap();
        self.sections.entry(parent).or_default().push(SectionSummary {
            placement,
            item_count,
            section_count,
        });
    }
}

impl StubQueries for FakeIndex {
    type Error = String;

    fn items_at(&self, placement: &Placement) -> Result<Vec<Item>, Self::Error> {
        self.item_queries.borrow_mut().push(placement.clone());
        if self.broken.contains(placement) {
            return Err(format!("unreadable {placement}"));
        }
        Ok(self.items.get(placement).cloned().unwrap_or_default())
    }

    fn sections_at(&self, placement: &Placement) -> Result<Vec<SectionSummary>, Self::Error> {
        self.section_queries.borrow_mut().push(placement.clone());
        if self.broken.contains(placement) {
            return Err(format!("unreadable {placement}"));
        }
        Ok(self.sections.get(placement).cloned().unwrap_or_default())
    }
}

fn task(placement: Placement, rank: &str, title: &str) -> Item {
    Item::new(ItemKind::Task, title, placement, ItemRank::parse(rank).unwrap())
}

fn titles(items: &[Item], _options: &FormatOptions) -> Vec<String> {
    items.iter().map(|item| format!("- {}", item.title)).collect()
}

fn any(_item: &Item) -> bool {
    true
}

fn stub(base: &Placement, placement: Placement, item_count: usize, section_count: usize) -> SectionStub {
    SectionStub::from_summary(
        &SectionSummary {
            placement,
            item_count,
            section_count,
        },
        base,
    )
}

#[test]
fn depth_zero_renders_summaries_without_queries() {
    let base = Placement::permanent(Vec::new());
    let fake = FakeIndex::default();
    let options = FormatOptions::default();
    let stubs = vec![stub(&base, base.child(1), 2, 1), stub(&base, base.child(4), 0, 3)];

    let lines = StubExpander::new(&fake, &options, &titles, &any).expand_lines(&stubs, 0);

    assert_eq!(
        lines,
        vec!["1/ (items: 2, sections: 1)", "4/ (items: 0, sections: 3)"]
    );
    assert!(fake.item_queries.borrow().is_empty());
    assert!(fake.section_queries.borrow().is_empty());
}

#[test]
fn depth_one_queries_each_stub_once_for_items_and_sections() {
    let base = Placement::permanent(Vec::new());
    let mut fake = FakeIndex::default();
    fake.add_section(base.child(1).child(5), 1, 0);
    let options = FormatOptions::default();
    let stubs = vec![stub(&base, base.child(1), 0, 1), stub(&base, base.child(2), 1, 0)];

    StubExpander::new(&fake, &options, &titles, &any).expand_lines(&stubs, 1);

    let expected = vec![base.child(1), base.child(2)];
    assert_eq!(*fake.item_queries.borrow(), expected);
    assert_eq!(*fake.section_queries.borrow(), expected);
}

#[test]
fn depth_two_queries_once_per_stub_at_every_expanded_level() {
    let base = Placement::permanent(Vec::new());
    let first = base.child(1);
    let second = base.child(2);
    let mut fake = FakeIndex::default();
    fake.add_section(first.child(3), 1, 0);
    fake.add_section(first.child(4), 0, 2);
    fake.add_section(first.child(4).child(1), 1, 0);
    let options = FormatOptions::default();
    let stubs = vec![stub(&base, first.clone(), 0, 2), stub(&base, second.clone(), 1, 0)];

    StubExpander::new(&fake, &options, &titles, &any).expand_lines(&stubs, 2);

    let expected = vec![first.clone(), first.child(3), first.child(4), second];
    assert_eq!(*fake.item_queries.borrow(), expected);
    assert_eq!(*fake.section_queries.borrow(), expected);
}

#[test]
fn depth_one_lists_items_and_child_summaries() {
    let base = Placement::permanent(Vec::new());
    let section = base.child(1);
    let mut fake = FakeIndex::default();
    fake.add_item(task(section.clone(), "b", "second"));
    fake.add_item(task(section.clone(), "a", "first"));
    fake.add_section(section.child(2), 1, 0);
    fake.add_section(section.child(3), 0, 0);
    let options = FormatOptions::default();

    let lines = StubExpander::new(&fake, &options, &titles, &any)
        .expand_lines(&[stub(&base, section, 2, 1)], 1);

    assert_eq!(
        lines,
        vec![
            "1/",
            "  - first",
            "  - second",
            "  2/ (items: 1, sections: 0)",
        ]
    );
}

#[test]
fn deeper_levels_recurse_with_growing_indent() {
    let base = Placement::permanent(vec![5]);
    let section = base.child(1);
    let nested = section.child(2);
    let mut fake = FakeIndex::default();
    fake.add_section(nested.clone(), 1, 1);
    fake.add_item(task(nested.clone(), "a", "inner"));
    fake.add_section(nested.child(9), 4, 0);
    let options = FormatOptions {
        indent: "..".to_string(),
    };

    let lines = StubExpander::new(&fake, &options, &titles, &any)
        .expand_lines(&[stub(&base, section, 0, 1)], 2);

    assert_eq!(
        lines,
        vec![
            "1/",
            "..2/",
            "....- inner",
            "....9/ (items: 4, sections: 0)",
        ]
    );
}

#[test]
fn status_filter_drops_items_before_formatting() {
    let base = Placement::permanent(Vec::new());
    let section = base.child(1);
    let mut fake = FakeIndex::default();
    let mut done = task(section.clone(), "a", "shipped");
    done.status = Some(TaskStatus::Done);
    fake.add_item(done);
    fake.add_item(task(section.clone(), "b", "pending"));
    let options = FormatOptions::default();
    let open_only = |item: &Item| item.status.is_some_and(|status| status.is_open());

    let lines = StubExpander::new(&fake, &options, &titles, &open_only)
        .expand_lines(&[stub(&base, section, 2, 0)], 1);

    assert_eq!(lines, vec!["1/", "  - pending"]);
}

#[test]
fn failed_queries_drop_only_the_affected_block() {
    let base = Placement::permanent(Vec::new());
    let mut fake = FakeIndex::default();
    fake.broken.push(base.child(1));
    fake.add_item(task(base.child(2), "a", "still here"));
    let options = FormatOptions::default();
    let stubs = vec![stub(&base, base.child(1), 1, 0), stub(&base, base.child(2), 1, 0)];

    let lines = StubExpander::new(&fake, &options, &titles, &any).expand_lines(&stubs, 1);

    assert_eq!(lines, vec!["1/", "2/", "  - still here"]);
}

#[test]
fn expand_appends_at_requested_indent() {
    let base = Placement::permanent(Vec::new());
    let fake = FakeIndex::default();
    let options = FormatOptions::default();
    let mut lines = vec!["header".to_string()];

    StubExpander::new(&fake, &options, &titles, &any).expand(
        &[stub(&base, base.child(3), 1, 0)],
        0,
        2,
        &mut lines,
    );

    assert_eq!(lines, vec!["header", "    3/ (items: 1, sections: 0)"]);
}
