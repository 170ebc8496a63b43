// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::time::Duration;

use callviz_charts::BarChartSpec;
use callviz_core::{MarkDiff, MarkId, MarkKind, MarkPayload, TransitionSpec};
use callviz_transforms::{ReasonTable, Record};
use hashbrown::HashSet;
use kurbo::Rect;

use crate::command::Command;
use crate::state::ChartState;
use crate::surface::Controller;
use crate::surface::testing::{ManualClock, RecordedFrame, RecordingSurface};
use crate::svg::FileSurface;

type TestController = Controller<RecordingSurface, ManualClock>;

fn table(rows: &[(&str, f64)]) -> ReasonTable {
    rows.iter().map(|(r, c)| Record::new(*r, *c)).collect()
}

fn controller(rows: &[(&str, f64)], top_n: usize) -> (TestController, ManualClock) {
    let clock = ManualClock::default();
    let mut c = Controller::new(
        ChartState::new(&table(rows), top_n),
        BarChartSpec::new(Vec::new()),
        TransitionSpec::default(),
        RecordingSurface::default(),
        clock.clone(),
    );
    c.render().expect("initial render");
    (c, clock)
}

fn dispatch(c: &mut TestController, command: &str) {
    let command: Command = command.parse().expect("valid command");
    c.dispatch(&command).expect("dispatch");
}

fn bar_ids(frame: &RecordedFrame) -> HashSet<MarkId> {
    frame.bars.keys().copied().collect()
}

fn ids(reasons: &[&str]) -> HashSet<MarkId> {
    reasons.iter().map(|r| MarkId::for_key(r)).collect()
}

fn rect_of(payload: Option<&MarkPayload>) -> Rect {
    match payload {
        Some(MarkPayload::Rect(r)) => r.rect,
        other => panic!("expected a rect payload, got {other:?}"),
    }
}

fn bar_diffs(frame: &RecordedFrame) -> impl Iterator<Item = &MarkDiff> {
    frame.diffs.iter().filter(|d| match d {
        MarkDiff::Enter { kind, .. }
        | MarkDiff::Update { kind, .. }
        | MarkDiff::Exit { kind, .. } => *kind == MarkKind::Rect,
    })
}

fn checked_ids(c: &TestController) -> HashSet<MarkId> {
    c.state()
        .checkboxes()
        .filter(|(_, checked)| *checked)
        .map(|(r, _)| MarkId::for_key(r))
        .collect()
}

#[test]
fn top_two_of_three_renders_b_and_a() {
    let (c, _) = controller(&[("A", 5.0), ("B", 20.0), ("C", 1.0)], 2);
    let frame = c.surface().last();
    assert_eq!(bar_ids(frame), ids(&["B", "A"]));
    assert_eq!(
        c.state().checkboxes().collect::<Vec<_>>(),
        [("B", true), ("A", true)]
    );
    let b = rect_of(frame.bars.get(&MarkId::for_key("B")));
    let a = rect_of(frame.bars.get(&MarkId::for_key("A")));
    assert!(b.y0 < a.y0, "B ranks first");
    assert!((a.width() - 0.25 * b.width()).abs() < 1e-9);
}

#[test]
fn rendered_bars_always_match_the_checked_reasons() {
    let rows = [
        ("Street Lights", 40.0),
        ("Sanitation", 35.0),
        ("Needle Pickup", 20.0),
        ("Graffiti", 10.0),
    ];
    let (mut c, _) = controller(&rows, 2);
    for command in [
        "show-more",
        "uncheck Sanitation",
        "uncheck Graffiti",
        "check Sanitation",
        "uncheck Street Lights",
        "check Graffiti",
        "uncheck Needle Pickup",
    ] {
        dispatch(&mut c, command);
        assert_eq!(bar_ids(c.surface().last()), checked_ids(&c), "after {command}");
    }
    assert_eq!(bar_ids(c.surface().last()), ids(&["Sanitation", "Graffiti"]));
}

#[test]
fn unchecking_exits_one_bar_and_moves_the_others() {
    let (mut c, _) = controller(&[("A", 5.0), ("B", 20.0), ("C", 1.0)], 3);
    dispatch(&mut c, "uncheck B");
    let frame = c.surface().last();
    let exits: Vec<MarkId> = bar_diffs(frame)
        .filter_map(|d| match d {
            MarkDiff::Exit { id, .. } => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(exits, [MarkId::for_key("B")]);
    assert!(
        bar_diffs(frame).all(|d| !matches!(d, MarkDiff::Enter { .. })),
        "persisting keys never re-enter"
    );
    let updated: HashSet<MarkId> = bar_diffs(frame)
        .filter(|d| matches!(d, MarkDiff::Update { .. }))
        .map(MarkDiff::id)
        .collect();
    assert_eq!(updated, ids(&["A", "C"]));
}

#[test]
fn reset_clears_and_select_all_restores() {
    let (mut c, _) = controller(&[("A", 5.0), ("B", 20.0), ("C", 1.0)], 3);
    dispatch(&mut c, "reset");
    assert!(c.surface().last().bars.is_empty());
    assert!(c.state().checkboxes().all(|(_, checked)| !checked));

    dispatch(&mut c, "select-all");
    assert_eq!(bar_ids(c.surface().last()), ids(&["A", "B", "C"]));
    assert!(c.state().checkboxes().all(|(_, checked)| checked));
}

#[test]
fn apply_filter_renders_exactly_the_given_keys() {
    let (mut c, _) = controller(&[("A", 5.0), ("B", 20.0), ("C", 1.0)], 3);
    c.apply_filter(["C", "A"]).expect("filter");
    assert_eq!(bar_ids(c.surface().last()), ids(&["A", "C"]));
    c.apply_filter(Vec::<String>::new()).expect("filter");
    assert!(c.surface().last().bars.is_empty());
}

#[test]
fn filtering_out_the_hovered_bar_drops_the_hover() {
    let (mut c, _) = controller(&[("A", 5.0), ("B", 20.0)], 2);
    dispatch(&mut c, "hover A");
    c.apply_filter(["B"]).expect("filter");
    assert_eq!(c.state().hovered, None);

    c.apply_filter(["A", "B"]).expect("filter");
    let style = BarChartSpec::new(Vec::new()).style;
    match c.surface().last().bars.get(&MarkId::for_key("A")) {
        Some(MarkPayload::Rect(r)) => assert_eq!(r.fill, style.fill),
        other => panic!("A is not a rect: {other:?}"),
    }
}

#[test]
fn show_more_appends_the_tail_once() {
    let rows = [("e", 1.0), ("a", 9.0), ("d", 3.0), ("b", 7.0), ("c", 5.0)];
    let (mut c, _) = controller(&rows, 2);
    assert_eq!(bar_ids(c.surface().last()), ids(&["a", "b"]));

    dispatch(&mut c, "show-more");
    let order: Vec<&str> = c.state().dataset.reasons().collect();
    assert_eq!(order, ["a", "b", "c", "d", "e"]);
    assert_eq!(bar_ids(c.surface().last()), ids(&["a", "b", "c", "d", "e"]));
    assert_eq!(c.state().checkboxes().count(), 5);

    dispatch(&mut c, "uncheck a");
    assert_eq!(bar_ids(c.surface().last()), ids(&["b", "c", "d", "e"]));
    assert_eq!(bar_ids(c.surface().last()), checked_ids(&c));

    let frames = c.surface().frames.len();
    dispatch(&mut c, "show-more");
    assert_eq!(c.surface().frames.len(), frames + 1);
    assert!(c.surface().last().diffs.is_empty(), "second show-more is a no-op");
}

#[test]
fn toggle_hides_bars_without_changing_identity() {
    let (mut c, _) = controller(&[("A", 5.0), ("B", 20.0)], 2);
    dispatch(&mut c, "toggle");
    let frame = c.surface().last();
    assert_eq!(bar_ids(frame), ids(&["A", "B"]));
    assert!(bar_diffs(frame).all(|d| matches!(d, MarkDiff::Update { .. })));
    assert!(frame.bars.values().all(|p| matches!(p, MarkPayload::Rect(r) if !r.visible)));

    dispatch(&mut c, "toggle");
    assert!(c
        .surface()
        .last()
        .bars
        .values()
        .all(|p| matches!(p, MarkPayload::Rect(r) if r.visible)));
}

#[test]
fn hover_recolours_one_bar_and_leave_reverts_it() {
    let (mut c, _) = controller(&[("A", 5.0), ("B", 20.0)], 2);
    let resting = c.surface().last().bars.clone();

    dispatch(&mut c, "hover A");
    let frame = c.surface().last();
    let touched: Vec<MarkId> = bar_diffs(frame).map(MarkDiff::id).collect();
    assert_eq!(touched, [MarkId::for_key("A")]);
    let style = BarChartSpec::new(Vec::new()).style;
    match frame.bars.get(&MarkId::for_key("A")) {
        Some(MarkPayload::Rect(r)) => assert_eq!(r.fill, style.hover_fill),
        other => panic!("A is not a rect: {other:?}"),
    }

    dispatch(&mut c, "leave");
    assert_eq!(c.surface().last().bars, resting);
}

#[test]
fn a_second_update_starts_from_the_in_flight_geometry() {
    let (mut c, clock) = controller(&[("A", 5.0), ("B", 20.0), ("C", 1.0)], 3);
    let a = MarkId::for_key("A");
    let start = rect_of(c.surface().last().bars.get(&a));

    clock.advance(Duration::from_millis(100));
    dispatch(&mut c, "uncheck B");
    let moved = rect_of(c.surface().last().bars.get(&a));
    assert_eq!(rect_of(c.surface().last().origins.get(&a)), start);
    assert_ne!(moved.y0, start.y0);

    // Halfway through the 500ms tween; cubic-in-out is exactly 0.5 there.
    clock.advance(Duration::from_millis(250));
    dispatch(&mut c, "check B");
    let frame = c.surface().last();
    assert_eq!(frame.now, Duration::from_millis(350));
    let origin = rect_of(frame.origins.get(&a));
    let mid_y0 = 0.5 * (start.y0 + moved.y0);
    let mid_y1 = 0.5 * (start.y1 + moved.y1);
    assert!((origin.y0 - mid_y0).abs() < 1e-9, "{origin:?} vs {mid_y0}");
    assert!((origin.y1 - mid_y1).abs() < 1e-9, "{origin:?} vs {mid_y1}");
    assert_eq!(rect_of(frame.bars.get(&a)), start, "target is the original slot again");
}

#[test]
fn file_surface_writes_every_frame() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("chart.html");
    let mut c = Controller::new(
        ChartState::new(&table(&[("A & B", 5.0), ("C", 20.0)]), 2),
        BarChartSpec::new(Vec::new()),
        TransitionSpec::default(),
        FileSurface::new(path.clone(), "311"),
        ManualClock::default(),
    );
    c.render().expect("render");
    let first = std::fs::read_to_string(&path).expect("read output");
    assert_eq!(first.matches("<rect").count(), 2);
    assert!(first.contains(r#"value="A &amp; B" disabled checked>"#));

    c.dispatch(&Command::Reset).expect("reset");
    let second = std::fs::read_to_string(&path).expect("read output");
    assert!(!second.contains("<rect"));
    assert!(second.contains(r#"value="C" disabled>"#));
}
