use shelf_core::db::{migrations::latest_version, schema_version};
use shelf_core::{
    CalendarDay, Item, ItemKind, ItemRank, ItemRepository, Placement, PlacementRange, Workspace,
    WorkspaceError,
};
use std::fs;

#[test]
fn open_uses_defaults_without_config_file() {
    let root = tempfile::tempdir().unwrap();

    let workspace = Workspace::open(root.path()).unwrap();

    assert_eq!(workspace.index().root(), root.path().join("index"));
    assert_eq!(workspace.config().date_limit, 31);
    assert!(root.path().join("shelf.db").is_file());
    assert_eq!(
        schema_version(workspace.connection()).unwrap(),
        latest_version()
    );
}

#[test]
fn configured_paths_and_limits_apply() {
    let root = tempfile::tempdir().unwrap();
    fs::write(
        root.path().join("shelf.toml"),
        "index_dir = \"graph\"\ndatabase_file = \"items.sqlite\"\ndate_limit = 1\n",
    )
    .unwrap();

    let workspace = Workspace::open(root.path()).unwrap();
    let repo = workspace.items().unwrap();
    let early = CalendarDay::parse("2025-02-09").unwrap();
    let late = CalendarDay::parse("2025-02-10").unwrap();
    for day in [early, late] {
        repo.save(&Item::new(
            ItemKind::Note,
            "entry",
            Placement::date(day, Vec::new()),
            ItemRank::initial(),
        ))
        .unwrap();
    }

    assert!(root.path().join("items.sqlite").is_file());
    assert!(root.path().join("graph/dates/2025-02-10").is_dir());

    let set = workspace
        .placements()
        .unwrap()
        .partitions(
            &PlacementRange::date_range(early, late),
            workspace.config().partition_options(),
        )
        .unwrap();
    assert_eq!(set.partitions.len(), 1);
    assert_eq!(set.warnings.len(), 1);
}

#[test]
fn invalid_config_fails_open() {
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("shelf.toml"), "section_limit = \"many\"").unwrap();

    assert!(matches!(
        Workspace::open(root.path()),
        Err(WorkspaceError::Config(_))
    ));
}
