use shelf_core::{
    parse_placement, CalendarDay, ItemId, Placement, PlacementHead, PlacementRange,
    ValidationCode,
};

#[test]
fn permanent_placement_parses_and_serializes_back() {
    let placement = parse_placement("permanent/1/3").unwrap();

    assert_eq!(placement.head(), &PlacementHead::Permanent);
    assert_eq!(placement.section(), &[1, 3]);
    assert_eq!(placement.to_string(), "permanent/1/3");
}

#[test]
fn date_and_item_heads_round_trip() {
    let dated = parse_placement("2025-11-15/1/3").unwrap();
    assert_eq!(
        dated.head(),
        &PlacementHead::Date(CalendarDay::from_ymd(2025, 11, 15).unwrap())
    );
    assert_eq!(dated.to_string(), "2025-11-15/1/3");

    let parent = ItemId::generate();
    let text = format!("{parent}/2");
    let nested = parse_placement(text.as_str()).unwrap();
    assert_eq!(nested.head(), &PlacementHead::Item(parent));
    assert_eq!(nested.to_string(), text);
    assert_eq!(parse_placement(&nested).unwrap(), nested);
}

#[test]
fn parent_drops_last_section_value() {
    let placement = parse_placement("2025-11-15/1/3").unwrap();

    let parent = placement.parent().unwrap();
    assert_eq!(parent.section().len(), placement.section().len() - 1);
    assert_eq!(parent.to_string(), "2025-11-15/1");
    assert!(placement.is_within(&parent));
    assert!(parent.parent().unwrap().parent().is_none());
}

#[test]
fn equality_requires_same_head_kind_and_section() {
    let day = CalendarDay::from_ymd(2025, 2, 10).unwrap();

    assert_eq!(Placement::date(day, vec![1]), Placement::date(day, vec![1]));
    assert_ne!(Placement::date(day, vec![1]), Placement::permanent(vec![1]));
    assert_ne!(
        Placement::permanent(vec![1]),
        Placement::item(ItemId::PERMANENT_ROOT, vec![1])
    );
    assert_ne!(Placement::date(day, vec![1]), Placement::date(day, vec![1, 1]));
}

#[test]
fn empty_input_reports_empty_code() {
    let err = parse_placement("   ").unwrap_err();

    assert_eq!(err.code(), Some(ValidationCode::Empty));
    assert_eq!(err.first().unwrap().path_string(), "");
}

#[test]
fn malformed_inputs_report_format_code_with_path() {
    let leading = parse_placement("/2025-11-15").unwrap_err();
    assert_eq!(leading.code(), Some(ValidationCode::Format));

    let head = parse_placement("tomorrow/1").unwrap_err();
    assert_eq!(head.code(), Some(ValidationCode::Format));
    assert_eq!(head.first().unwrap().path_string(), "head");

    let zero = parse_placement("permanent/1/0").unwrap_err();
    assert_eq!(zero.code(), Some(ValidationCode::Format));
    assert_eq!(zero.first().unwrap().path_string(), "section[1]");
    assert!(zero.to_string().starts_with("section[1]: "));

    let signed = parse_placement("permanent/+1").unwrap_err();
    assert_eq!(signed.first().unwrap().path_string(), "section[0]");

    let negative = parse_placement("permanent/-4").unwrap_err();
    assert_eq!(negative.code(), Some(ValidationCode::Format));
}

#[test]
fn range_text_selects_shape() {
    let single = PlacementRange::parse("permanent/4").unwrap();
    assert_eq!(single, PlacementRange::single(Placement::permanent(vec![4])));

    let dates = PlacementRange::parse("2025-02-09..2025-02-10").unwrap();
    assert_eq!(dates.shape(), "date_range");
    assert_eq!(dates.placements().len(), 2);
    assert_eq!(dates.to_string(), "2025-02-09..2025-02-10");

    let numeric = PlacementRange::parse("permanent/2/1..3").unwrap();
    assert_eq!(
        numeric,
        PlacementRange::numeric_range(Placement::permanent(vec![2]), 1, 3)
    );
    assert_eq!(numeric.to_string(), "permanent/2/1..3");
}

#[test]
fn range_endpoint_of_wrong_kind_reports_type_code() {
    let err = PlacementRange::parse("2025-02-09..permanent").unwrap_err();
    assert_eq!(err.code(), Some(ValidationCode::Type));
}
