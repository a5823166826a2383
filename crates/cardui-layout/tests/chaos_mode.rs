#![forbid(unsafe_code)]

//! Chaos mode enter/exit and drag lifecycle against the in-memory page.

use cardui_core::css::parse_float_or_zero;
use cardui_core::{ChaosPolicy, PageConfig, PointerButton, PointerInput, Rect, ToggleLabels};
use cardui_harness::{CaptureCall, MockPage, three_card_page};
use cardui_layout::{
    CardId, ChaosMode, ChaosTransition, DragIgnoredReason, DragOutcome, LayoutHost, NodeRef,
    StyleProp, classes,
};
use pretty_assertions::assert_eq;

fn chaos() -> ChaosMode {
    ChaosMode::new(ChaosPolicy::default(), ToggleLabels::default(), 7)
}

fn down(id: i32, x: f64, y: f64) -> PointerInput {
    PointerInput::primary(id, x, y)
}

fn style(page: &MockPage, card: CardId, prop: StyleProp) -> String {
    page.style(NodeRef::Card(card), prop)
}

#[test]
fn enter_frees_cards_at_their_drawn_position() {
    let (mut page, grid, [a, b, c]) = three_card_page();
    let mut chaos = chaos();

    assert_eq!(
        chaos.enter(&mut page),
        ChaosTransition::Entered { grids: 1, cards: 3 }
    );
    assert!(chaos.is_active());

    assert_eq!(style(&page, a, StyleProp::Position), "absolute");
    assert_eq!(style(&page, a, StyleProp::Left), "0px");
    assert_eq!(style(&page, b, StyleProp::Left), "410px");
    assert_eq!(style(&page, c, StyleProp::Top), "120px");
    assert_eq!(style(&page, c, StyleProp::Height), "140px");
    assert_eq!(style(&page, a, StyleProp::Width), "390px");
    assert_eq!(style(&page, a, StyleProp::Cursor), "grab");

    assert_eq!(style(&page, a, StyleProp::ZIndex), "1001");
    assert_eq!(style(&page, b, StyleProp::ZIndex), "1002");
    assert_eq!(style(&page, c, StyleProp::ZIndex), "1003");

    // Lowest card bottom is 260, the grid is already 300 tall.
    assert_eq!(page.style(NodeRef::Grid(grid), StyleProp::Height), "300px");
    assert_eq!(page.style(NodeRef::Grid(grid), StyleProp::MinHeight), "300px");

    assert!(page.has_class(NodeRef::Body, classes::IS_CHAOS));
    assert!(page.has_class(NodeRef::Grid(grid), classes::IS_CHAOS));
    assert!(page.has_class(NodeRef::Card(a), classes::IS_CHAOS_CARD));
    assert_eq!(page.toggle_state(), (true, "LOVE HTML"));
}

#[test]
fn grid_grows_to_lowest_card_on_enter() {
    let (mut page, grid, _) = three_card_page();
    page.set_grid_offset_height(grid, 200.0);
    chaos().enter(&mut page);
    assert_eq!(page.style(NodeRef::Grid(grid), StyleProp::Height), "260px");
}

#[test]
fn enter_then_exit_restores_every_style_exactly() {
    let (mut page, grid, [a, b, c]) = three_card_page();
    page.with_style(NodeRef::Card(a), StyleProp::Cursor, "pointer")
        .with_style(NodeRef::Card(a), StyleProp::ZIndex, "3")
        .with_style(NodeRef::Card(b), StyleProp::Position, "relative")
        .with_style(NodeRef::Grid(grid), StyleProp::MinHeight, "12rem")
        .with_class(NodeRef::Grid(grid), classes::IS_STACK);
    let before: Vec<_> = [a, b, c]
        .iter()
        .map(|card| page.inline_styles(NodeRef::Card(*card)))
        .collect();
    let grid_before = page.inline_styles(NodeRef::Grid(grid));

    let mut chaos = chaos();
    chaos.enter(&mut page);
    assert!(!page.has_class(NodeRef::Grid(grid), classes::IS_STACK));
    assert_eq!(
        chaos.exit(&mut page),
        ChaosTransition::Exited {
            released_pointers: 0
        }
    );

    let after: Vec<_> = [a, b, c]
        .iter()
        .map(|card| page.inline_styles(NodeRef::Card(*card)))
        .collect();
    assert_eq!(after, before);
    assert_eq!(page.inline_styles(NodeRef::Grid(grid)), grid_before);
    assert!(!page.has_class(NodeRef::Body, classes::IS_CHAOS));
    assert!(!page.has_class(NodeRef::Card(a), classes::IS_CHAOS_CARD));
    assert_eq!(chaos.snapshot_count(), 0);
    assert_eq!(page.toggle_state(), (false, "HATE HTML"));
}

#[test]
fn enter_and_exit_are_idempotent() {
    let (mut page, _, _) = three_card_page();
    let mut chaos = chaos();

    assert_eq!(chaos.exit(&mut page), ChaosTransition::AlreadyIdle);
    chaos.enter(&mut page);
    let z = chaos.z_index();
    let writes = page.style_writes();
    assert_eq!(chaos.enter(&mut page), ChaosTransition::AlreadyActive);
    assert_eq!(chaos.z_index(), z);
    assert_eq!(page.style_writes(), writes);

    chaos.exit(&mut page);
    assert_eq!(chaos.exit(&mut page), ChaosTransition::AlreadyIdle);
}

#[test]
fn z_index_counter_keeps_growing_across_sessions() {
    let (mut page, _, [a, ..]) = three_card_page();
    let mut chaos = chaos();
    chaos.toggle(&mut page);
    chaos.toggle(&mut page);
    chaos.toggle(&mut page);
    assert_eq!(style(&page, a, StyleProp::ZIndex), "1004");
}

#[test]
fn page_without_cards_stays_idle() {
    let mut page = MockPage::new(1024.0);
    page.add_grid(Rect::new(0.0, 0.0, 800.0, 200.0));
    let mut chaos = chaos();
    assert_eq!(chaos.enter(&mut page), ChaosTransition::NoCards);
    assert!(!chaos.is_active());
    assert!(!page.has_class(NodeRef::Body, classes::IS_CHAOS));
    assert_eq!(page.toggle_state(), (false, ""));
}

#[test]
fn card_listed_by_two_grids_is_snapshotted_once() {
    let mut page = MockPage::new(1024.0);
    let outer = page.add_grid(Rect::new(0.0, 0.0, 800.0, 400.0));
    let inner = page.add_grid(Rect::new(0.0, 200.0, 800.0, 200.0));
    let card = page.add_card(outer, Rect::new(0.0, 220.0, 300.0, 100.0));
    page.adopt_card(inner, card);

    let mut chaos = chaos();
    assert_eq!(
        chaos.enter(&mut page),
        ChaosTransition::Entered { grids: 1, cards: 1 }
    );
    assert_eq!(chaos.snapshot(card).map(|s| s.grid), Some(outer));
    assert_eq!(chaos.grid_snapshot(inner), None);
}

#[test]
fn jittered_positions_stay_in_range_and_non_negative() {
    let (mut page, _, cards) = three_card_page();
    let originals = [(0.0, 0.0), (410.0, 0.0), (0.0, 120.0)];
    let mut chaos = ChaosMode::new(
        ChaosPolicy {
            jitter: 24.0,
            ..ChaosPolicy::default()
        },
        ToggleLabels::default(),
        99,
    );
    chaos.enter(&mut page);
    for (card, (x, y)) in cards.iter().zip(originals) {
        let left = parse_float_or_zero(&style(&page, *card, StyleProp::Left));
        let top = parse_float_or_zero(&style(&page, *card, StyleProp::Top));
        assert!(left >= 0.0 && top >= 0.0);
        assert!((left - x).abs() <= 24.0, "left {left} vs {x}");
        assert!((top - y).abs() <= 24.0, "top {top} vs {y}");
    }
}

#[test]
fn largest_accepted_jitter_enters_cleanly() {
    assert!(PageConfig::from_json_str(r#"{"chaos": {"jitter": 1e308}}"#).is_err());

    let config = PageConfig::from_json_str(r#"{"chaos": {"jitter": 1e6}}"#)
        .expect("jitter at the bound loads");
    let (mut page, _, cards) = three_card_page();
    let mut chaos = ChaosMode::new(config.chaos, config.labels, 3);
    assert!(matches!(
        chaos.enter(&mut page),
        ChaosTransition::Entered { cards: 3, .. }
    ));
    for card in cards {
        let left = parse_float_or_zero(&style(&page, card, StyleProp::Left));
        assert!((0.0..=1.0e6 + 410.0).contains(&left), "left {left}");
    }
}

#[test]
fn unvalidated_huge_jitter_leaves_positions_unjittered() {
    let (mut page, _, [a, b, _]) = three_card_page();
    let mut chaos = ChaosMode::new(
        ChaosPolicy {
            jitter: 1e308,
            ..ChaosPolicy::default()
        },
        ToggleLabels::default(),
        3,
    );
    chaos.enter(&mut page);
    assert_eq!(style(&page, a, StyleProp::Left), "0px");
    assert_eq!(style(&page, b, StyleProp::Left), "410px");
}

#[test]
fn drag_moves_card_by_pointer_delta() {
    let (mut page, _, [a, ..]) = three_card_page();
    let mut chaos = chaos();
    chaos.enter(&mut page);

    let started = chaos.pointer_down(&mut page, Some(a), down(1, 100.0, 150.0));
    assert_eq!(started.outcome, DragOutcome::Started);
    assert!(started.prevent_default());
    assert_eq!(page.captured_pointers(), vec![1]);
    assert!(page.has_class(NodeRef::Card(a), classes::IS_DRAGGING));
    assert_eq!(style(&page, a, StyleProp::Cursor), "grabbing");
    assert_eq!(style(&page, a, StyleProp::ZIndex), "1004");

    chaos.pointer_move(&mut page, down(1, 125.5, 160.0));
    assert_eq!(style(&page, a, StyleProp::Left), "25.5px");
    assert_eq!(style(&page, a, StyleProp::Top), "10px");

    let ended = chaos.pointer_up(&mut page, down(1, 125.5, 160.0));
    assert_eq!(ended.outcome, DragOutcome::Ended);
    assert!(page.captured_pointers().is_empty());
    assert!(!page.has_class(NodeRef::Card(a), classes::IS_DRAGGING));
    assert_eq!(style(&page, a, StyleProp::Cursor), "grab");
    assert!(chaos.active_pointer_ids().is_empty());
}

#[test]
fn grid_height_only_grows_during_drag() {
    let (mut page, grid, [a, ..]) = three_card_page();
    let mut chaos = chaos();
    chaos.enter(&mut page);
    chaos.pointer_down(&mut page, Some(a), down(1, 100.0, 150.0));

    let grew = chaos.pointer_move(&mut page, down(1, 130.0, 500.0));
    assert_eq!(grew.outcome, DragOutcome::Moved { grid_grew: true });
    // top 350 + height 110
    assert_eq!(page.style(NodeRef::Grid(grid), StyleProp::Height), "460px");
    assert_eq!(page.style(NodeRef::Grid(grid), StyleProp::MinHeight), "460px");

    let back = chaos.pointer_move(&mut page, down(1, 100.0, 150.0));
    assert_eq!(back.outcome, DragOutcome::Moved { grid_grew: false });
    assert_eq!(page.style(NodeRef::Grid(grid), StyleProp::Height), "460px");
}

#[test]
fn fractional_bottom_rounds_grid_height_up() {
    let (mut page, grid, [a, ..]) = three_card_page();
    let mut chaos = chaos();
    chaos.enter(&mut page);
    chaos.pointer_down(&mut page, Some(a), down(1, 0.0, 0.0));
    chaos.pointer_move(&mut page, down(1, 0.0, 300.25));
    assert_eq!(page.style(NodeRef::Grid(grid), StyleProp::Height), "411px");
}

#[test]
fn concurrent_pointers_drag_independently() {
    let (mut page, _, [a, _, c]) = three_card_page();
    let mut chaos = chaos();
    chaos.enter(&mut page);

    chaos.pointer_down(&mut page, Some(a), down(1, 10.0, 10.0));
    chaos.pointer_down(&mut page, Some(c), down(2, 500.0, 500.0));
    chaos.pointer_move(&mut page, down(1, 15.0, 15.0));
    chaos.pointer_move(&mut page, down(2, 495.0, 520.0));
    chaos.pointer_move(&mut page, down(1, 20.0, 20.0));

    assert_eq!(style(&page, a, StyleProp::Left), "10px");
    assert_eq!(style(&page, a, StyleProp::Top), "10px");
    assert_eq!(style(&page, c, StyleProp::Left), "-5px");
    assert_eq!(style(&page, c, StyleProp::Top), "140px");
    assert_eq!(chaos.active_pointer_ids(), vec![1, 2]);

    chaos.pointer_up(&mut page, down(1, 20.0, 20.0));
    chaos.pointer_move(&mut page, down(2, 500.0, 500.0));
    assert_eq!(style(&page, a, StyleProp::Left), "10px");
    assert_eq!(style(&page, c, StyleProp::Left), "0px");
    assert_eq!(style(&page, c, StyleProp::Top), "120px");
}

#[test]
fn exit_with_pointers_down_releases_everything() {
    let (mut page, grid, [a, b, _]) = three_card_page();
    let mut chaos = chaos();
    chaos.enter(&mut page);
    chaos.pointer_down(&mut page, Some(a), down(3, 0.0, 0.0));
    chaos.pointer_down(&mut page, Some(b), down(4, 0.0, 0.0));
    chaos.pointer_move(&mut page, down(3, 0.0, 900.0));

    assert_eq!(
        chaos.exit(&mut page),
        ChaosTransition::Exited {
            released_pointers: 2
        }
    );
    assert!(page.captured_pointers().is_empty());
    assert!(chaos.active_pointer_ids().is_empty());
    assert!(!page.has_class(NodeRef::Card(a), classes::IS_DRAGGING));
    assert!(!page.has_class(NodeRef::Card(b), classes::IS_DRAGGING));
    assert_eq!(page.style(NodeRef::Grid(grid), StyleProp::Height), "");

    // The pointer-up that arrives after exit finds nothing to do.
    let late = chaos.pointer_up(&mut page, down(3, 0.0, 0.0));
    assert_eq!(
        late.outcome,
        DragOutcome::Ignored(DragIgnoredReason::UnknownPointer)
    );
}

#[test]
fn pointer_down_is_ignored_when_not_applicable() {
    let (mut page, _, [a, ..]) = three_card_page();
    let mut chaos = chaos();

    let idle = chaos.pointer_down(&mut page, Some(a), down(1, 0.0, 0.0));
    assert_eq!(idle.outcome, DragOutcome::Ignored(DragIgnoredReason::Inactive));
    assert!(!idle.prevent_default());

    chaos.enter(&mut page);
    let secondary = chaos.pointer_down(
        &mut page,
        Some(a),
        PointerInput::new(1, 0.0, 0.0, PointerButton::Secondary),
    );
    assert_eq!(
        secondary.outcome,
        DragOutcome::Ignored(DragIgnoredReason::ButtonNotAllowed)
    );

    let miss = chaos.pointer_down(&mut page, None, down(1, 0.0, 0.0));
    assert_eq!(
        miss.outcome,
        DragOutcome::Ignored(DragIgnoredReason::NotAChaosCard)
    );
    let stranger = chaos.pointer_down(&mut page, Some(CardId(99)), down(1, 0.0, 0.0));
    assert_eq!(
        stranger.outcome,
        DragOutcome::Ignored(DragIgnoredReason::NotAChaosCard)
    );

    let untracked = chaos.pointer_move(&mut page, down(5, 1.0, 1.0));
    assert!(!untracked.accepted());
    assert!(page.capture_log().is_empty());
}

#[test]
fn lost_capture_ends_drag_without_second_release() {
    let (mut page, _, [a, ..]) = three_card_page();
    let mut chaos = chaos();
    chaos.enter(&mut page);
    chaos.pointer_down(&mut page, Some(a), down(8, 0.0, 0.0));

    let lost = chaos.lost_pointer_capture(&mut page, 8, Some(a));
    assert_eq!(lost.outcome, DragOutcome::Ended);
    assert_eq!(
        page.capture_log(),
        &[CaptureCall::Set {
            card: a,
            pointer_id: 8
        }]
    );
    assert!(!page.has_class(NodeRef::Card(a), classes::IS_DRAGGING));
}

#[test]
fn cancel_behaves_like_up() {
    let (mut page, _, [a, ..]) = three_card_page();
    let mut chaos = chaos();
    chaos.enter(&mut page);
    chaos.pointer_down(&mut page, Some(a), down(2, 0.0, 0.0));
    let cancel = chaos.pointer_cancel(&mut page, 2);
    assert_eq!(cancel.outcome, DragOutcome::Ended);
    assert!(page.captured_pointers().is_empty());
}

#[test]
fn reused_pointer_id_finishes_previous_drag() {
    let (mut page, _, [a, b, _]) = three_card_page();
    let mut chaos = chaos();
    chaos.enter(&mut page);
    chaos.pointer_down(&mut page, Some(a), down(1, 0.0, 0.0));
    chaos.pointer_down(&mut page, Some(b), down(1, 0.0, 0.0));

    assert!(!page.has_class(NodeRef::Card(a), classes::IS_DRAGGING));
    assert!(page.has_class(NodeRef::Card(b), classes::IS_DRAGGING));
    assert_eq!(chaos.drag(1).map(|d| d.card), Some(b));
    assert_eq!(chaos.active_pointer_ids(), vec![1]);
}

#[test]
fn late_lost_capture_from_previous_card_keeps_new_drag() {
    let (mut page, _, [a, b, _]) = three_card_page();
    let mut chaos = chaos();
    chaos.enter(&mut page);
    chaos.pointer_down(&mut page, Some(a), down(1, 0.0, 0.0));
    chaos.pointer_down(&mut page, Some(b), down(1, 0.0, 0.0));

    // The browser reports that A lost the capture after B took it.
    let stale = chaos.lost_pointer_capture(&mut page, 1, Some(a));
    assert_eq!(
        stale.outcome,
        DragOutcome::Ignored(DragIgnoredReason::StaleCapture)
    );
    assert_eq!(chaos.drag(1).map(|d| d.card), Some(b));
    assert!(page.has_class(NodeRef::Card(b), classes::IS_DRAGGING));

    let lost = chaos.lost_pointer_capture(&mut page, 1, Some(b));
    assert_eq!(lost.outcome, DragOutcome::Ended);
    assert_eq!(chaos.drag(1), None);
    assert!(!page.has_class(NodeRef::Card(b), classes::IS_DRAGGING));
}

#[test]
fn lost_capture_without_resolved_target_ends_drag() {
    let (mut page, _, [a, ..]) = three_card_page();
    let mut chaos = chaos();
    chaos.enter(&mut page);
    chaos.pointer_down(&mut page, Some(a), down(3, 0.0, 0.0));
    let lost = chaos.lost_pointer_capture(&mut page, 3, None);
    assert_eq!(lost.outcome, DragOutcome::Ended);
    assert!(chaos.active_pointer_ids().is_empty());
}

#[test]
fn two_pointers_on_one_card_keep_it_dragging_until_both_lift() {
    let (mut page, _, [a, ..]) = three_card_page();
    let mut chaos = chaos();
    chaos.enter(&mut page);
    chaos.pointer_down(&mut page, Some(a), down(1, 0.0, 0.0));
    chaos.pointer_down(&mut page, Some(a), down(2, 5.0, 5.0));

    chaos.pointer_up(&mut page, down(1, 0.0, 0.0));
    assert!(page.has_class(NodeRef::Card(a), classes::IS_DRAGGING));
    chaos.pointer_up(&mut page, down(2, 5.0, 5.0));
    assert!(!page.has_class(NodeRef::Card(a), classes::IS_DRAGGING));
}

#[test]
fn custom_labels_are_written_to_the_toggle() {
    let (mut page, _, _) = three_card_page();
    let mut chaos = ChaosMode::new(
        ChaosPolicy::default(),
        ToggleLabels {
            active: "calm down".to_owned(),
            inactive: "go wild".to_owned(),
        },
        0,
    );
    chaos.toggle(&mut page);
    assert_eq!(page.toggle_state(), (true, "calm down"));
    chaos.toggle(&mut page);
    assert_eq!(page.toggle_state(), (false, "go wild"));
}
