use rusqlite::Connection;
use shelf_core::db::open_db_in_memory;
use shelf_core::{
    CalendarDay, GraphIndex, Item, ItemId, ItemKind, ItemRank, ItemRepository,
    ItemValidationError, Placement, PlacementRange, RepoError, SqliteItemRepository, TaskStatus,
};

fn shelf(value: &str) -> Placement {
    Placement::date(CalendarDay::parse(value).unwrap(), Vec::new())
}

fn note(placement: Placement, rank: &str) -> Item {
    Item::new(
        ItemKind::Note,
        "plain note",
        placement,
        ItemRank::parse(rank).unwrap(),
    )
}

#[test]
fn save_then_load_roundtrip_writes_edge() {
    let conn = open_db_in_memory().unwrap();
    let root = tempfile::tempdir().unwrap();
    let index = GraphIndex::new(root.path());
    let repo = SqliteItemRepository::try_new(&conn, &index).unwrap();

    let mut task = Item::new(
        ItemKind::Task,
        "file taxes",
        Placement::permanent(vec![2]),
        ItemRank::initial(),
    );
    task.status = Some(TaskStatus::InProgress);
    repo.save(&task).unwrap();

    assert_eq!(repo.load(task.id).unwrap(), Some(task.clone()));
    assert!(index.edge_exists(&task.placement, task.id));
}

#[test]
fn moving_an_item_moves_its_edge() {
    let conn = open_db_in_memory().unwrap();
    let root = tempfile::tempdir().unwrap();
    let index = GraphIndex::new(root.path());
    let repo = SqliteItemRepository::try_new(&conn, &index).unwrap();

    let mut item = note(shelf("2025-02-10"), "m");
    repo.save(&item).unwrap();
    let old_placement = item.placement.clone();

    item.placement = shelf("2025-02-11").child(1);
    repo.save(&item).unwrap();

    assert!(!index.edge_exists(&old_placement, item.id));
    assert!(index.edge_exists(&item.placement, item.id));
    assert!(repo
        .list_by_placement(&PlacementRange::single(old_placement))
        .unwrap()
        .is_empty());
}

#[test]
fn reranking_rewrites_edge_rank() {
    let conn = open_db_in_memory().unwrap();
    let root = tempfile::tempdir().unwrap();
    let index = GraphIndex::new(root.path());
    let repo = SqliteItemRepository::try_new(&conn, &index).unwrap();

    let mut item = note(shelf("2025-02-10"), "m");
    repo.save(&item).unwrap();
    item.rank = ItemRank::parse("c").unwrap();
    repo.save(&item).unwrap();

    let refs = index
        .query_edge_references(&PlacementRange::single(item.placement.clone()))
        .unwrap();
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].rank.as_str(), "c");
}

#[test]
fn delete_removes_row_and_edge() {
    let conn = open_db_in_memory().unwrap();
    let root = tempfile::tempdir().unwrap();
    let index = GraphIndex::new(root.path());
    let repo = SqliteItemRepository::try_new(&conn, &index).unwrap();

    let item = note(Placement::permanent(vec![1, 1]), "a");
    repo.save(&item).unwrap();
    repo.delete(item.id).unwrap();

    assert_eq!(repo.load(item.id).unwrap(), None);
    assert!(!index.edge_exists(&item.placement, item.id));
    assert!(matches!(
        repo.delete(item.id).unwrap_err(),
        RepoError::NotFound(id) if id == item.id
    ));
}

#[test]
fn list_by_placement_resolves_date_range() {
    let conn = open_db_in_memory().unwrap();
    let root = tempfile::tempdir().unwrap();
    let index = GraphIndex::new(root.path());
    let repo = SqliteItemRepository::try_new(&conn, &index).unwrap();

    let ninth = note(shelf("2025-02-09"), "a");
    let tenth = note(shelf("2025-02-10"), "a");
    let outside = note(shelf("2025-02-12"), "a");
    for item in [&ninth, &tenth, &outside] {
        repo.save(item).unwrap();
    }

    let items = repo
        .list_by_placement(&PlacementRange::date_range(
            CalendarDay::parse("2025-02-09").unwrap(),
            CalendarDay::parse("2025-02-11").unwrap(),
        ))
        .unwrap();

    assert_eq!(
        items.iter().map(|item| item.id).collect::<Vec<_>>(),
        vec![ninth.id, tenth.id]
    );
}

#[test]
fn dangling_edges_are_skipped() {
    let conn = open_db_in_memory().unwrap();
    let root = tempfile::tempdir().unwrap();
    let index = GraphIndex::new(root.path());
    let repo = SqliteItemRepository::try_new(&conn, &index).unwrap();

    let kept = note(shelf("2025-02-10"), "a");
    let orphan = note(shelf("2025-02-10"), "b");
    repo.save(&kept).unwrap();
    repo.save(&orphan).unwrap();
    conn.execute("DELETE FROM items WHERE id = ?1;", [orphan.id.to_string()])
        .unwrap();

    let items = repo
        .list_by_placement(&PlacementRange::single(shelf("2025-02-10")))
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, kept.id);
}

#[test]
fn invalid_items_are_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let root = tempfile::tempdir().unwrap();
    let index = GraphIndex::new(root.path());
    let repo = SqliteItemRepository::try_new(&conn, &index).unwrap();

    let mut blank = note(Placement::permanent(Vec::new()), "a");
    blank.title = "   ".to_string();
    assert!(matches!(
        repo.save(&blank).unwrap_err(),
        RepoError::Validation(ItemValidationError::BlankTitle(_))
    ));

    let mut looped = note(Placement::permanent(Vec::new()), "a");
    looped.placement = Placement::item(looped.id, vec![1]);
    assert!(matches!(
        repo.save(&looped).unwrap_err(),
        RepoError::Validation(ItemValidationError::SelfParented(_))
    ));

    assert_eq!(repo.load(blank.id).unwrap(), None);
    assert!(!index.edge_exists(&blank.placement, blank.id));
}

#[test]
fn permanent_root_id_head_shares_the_permanent_listing() {
    let conn = open_db_in_memory().unwrap();
    let root = tempfile::tempdir().unwrap();
    let index = GraphIndex::new(root.path());
    let repo = SqliteItemRepository::try_new(&conn, &index).unwrap();

    let spelled_as_id = Placement::parse(&format!("{}/1", ItemId::PERMANENT_ROOT)).unwrap();
    let item = note(spelled_as_id, "a");
    repo.save(&item).unwrap();

    let permanent = Placement::permanent(vec![1]);
    assert_eq!(item.placement, permanent);
    assert!(index.edge_exists(&permanent, item.id));
    let listed = repo
        .list_by_placement(&PlacementRange::single(permanent))
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, item.id);
    assert_eq!(repo.load(item.id).unwrap().unwrap().placement.to_string(), "permanent/1");
}

#[test]
fn permanent_root_id_is_reserved_for_items() {
    let conn = open_db_in_memory().unwrap();
    let root = tempfile::tempdir().unwrap();
    let index = GraphIndex::new(root.path());
    let repo = SqliteItemRepository::try_new(&conn, &index).unwrap();

    let mut item = note(Placement::permanent(Vec::new()), "a");
    item.id = ItemId::from_uuid(uuid::Uuid::nil());

    assert!(matches!(
        repo.save(&item).unwrap_err(),
        RepoError::Validation(ItemValidationError::ReservedId(_))
    ));
    assert!(!index.edge_exists(&item.placement, item.id));
}

#[test]
fn corrupt_placement_row_is_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let root = tempfile::tempdir().unwrap();
    let index = GraphIndex::new(root.path());
    let repo = SqliteItemRepository::try_new(&conn, &index).unwrap();

    let id = ItemId::generate();
    conn.execute(
        "INSERT INTO items (id, kind, title, status, placement, rank, created_at, updated_at)
         VALUES (?1, 'note', 'broken', NULL, 'permanent/0', 'a', 0, 0);",
        [id.to_string()],
    )
    .unwrap();

    assert!(matches!(
        repo.load(id).unwrap_err(),
        RepoError::InvalidData(_)
    ));
}

#[test]
fn unmigrated_connection_is_rejected() {
    let conn = Connection::open_in_memory().unwrap();
    let root = tempfile::tempdir().unwrap();
    let index = GraphIndex::new(root.path());

    let err = SqliteItemRepository::try_new(&conn, &index).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}
