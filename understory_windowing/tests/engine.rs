// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end engine behavior as a host sees it.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use understory_windowing::{
    EngineOptions, ItemSize, ManualClock, OptionsUpdate, RefinementMode, ScrollAlign,
    VisibleRange, WindowEngine,
};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn thousand_rows() -> (WindowEngine, ManualClock) {
    let clock = ManualClock::new();
    let engine = WindowEngine::with_clock(EngineOptions::new(1000, 50.0, 500.0), clock.clone());
    (engine, clock)
}

#[test]
fn initial_window_starts_at_the_top() {
    let (engine, _) = thousand_rows();
    let range = engine.get_state().visible_range;
    assert_eq!(range.start, 0);
    assert!((9..=14).contains(&range.end), "end was {}", range.end);
    assert_eq!(engine.total_extent(), 50_000.0);
}

#[test]
fn scroll_to_index_alignments() {
    let (mut engine, _) = thousand_rows();
    assert_eq!(engine.scroll_to_index(20, ScrollAlign::Start), 1000.0);
    assert_eq!(engine.scroll_to_index(20, ScrollAlign::Center), 775.0);
    assert_eq!(engine.scroll_to_index(20, ScrollAlign::End), 550.0);
}

#[test]
fn variable_sizes_accumulate() {
    let clock = ManualClock::new();
    let options = EngineOptions::new(
        100,
        ItemSize::variable(|i| 50.0 + (i % 3) as f64 * 20.0),
        500.0,
    );
    let engine = WindowEngine::with_clock(options, clock);
    let offsets: Vec<f64> = (0..4).map(|i| engine.offset_of(i)).collect();
    assert_eq!(offsets, [0.0, 50.0, 120.0, 210.0]);
    assert_eq!(engine.size_of(2), 90.0);
    assert!(!engine.position_index().is_fixed());
}

#[test]
fn scrolling_settles_back_to_idle() {
    let (mut engine, clock) = thousand_rows();
    clock.advance(ms(16));
    engine.on_scroll(1000.0);
    assert!(engine.get_state().is_scrolling);
    assert!(engine.get_state().overscan > 3);

    let deadline = engine.next_deadline().expect("scroll arms the idle deadline");
    clock.set(deadline);
    assert!(engine.tick());

    let state = engine.get_state();
    assert!(!state.is_scrolling);
    assert_eq!(state.overscan, 3);
    assert_eq!(state.scroll_velocity, 0.0);
    assert!(state.visible_range.contains(20));
}

#[test]
fn fling_widens_then_settle_narrows() {
    let (mut engine, clock) = thousand_rows();
    let mut widths = Vec::new();
    let mut offset = 0.0;
    for _ in 0..10 {
        clock.advance(ms(16));
        offset += 400.0;
        engine.on_scroll(offset);
        widths.push(engine.get_state().visible_range.len());
    }
    clock.advance(ms(150));
    assert!(engine.tick());

    // 25 units/ms saturates overscan at 10 per side; only the first sample
    // is cut short by the top of the list.
    assert_eq!(widths[0], 28);
    assert!(widths[1..].iter().all(|&w| w == 30), "widths were {widths:?}");
    assert_eq!(engine.get_state().visible_range.len(), 16);
}

#[test]
fn host_loop_mounts_visible_items() {
    let (mut engine, clock) = thousand_rows();
    let mounted = Rc::new(RefCell::new(Vec::<usize>::new()));
    let sink = Rc::clone(&mounted);
    engine.on_update(move |state, engine| {
        let mut mounted = sink.borrow_mut();
        mounted.clear();
        mounted.extend(engine.visible_items().map(|p| p.index));
        assert_eq!(mounted.len(), state.visible_range.len());
    });

    clock.advance(ms(100));
    engine.on_scroll(5_000.0);
    let range = engine.get_state().visible_range;
    assert_eq!(mounted.borrow().first(), Some(&range.start));
    assert_eq!(mounted.borrow().last(), Some(&range.end));

    let spacers = engine.spacer_extents();
    assert_eq!(spacers.before, engine.offset_of(range.start));
    let mounted_extent: f64 = engine.visible_items().map(|p| p.size).sum();
    assert_eq!(spacers.before + mounted_extent + spacers.after, engine.total_extent());
}

#[test]
fn jump_from_callback_is_delivered() {
    let (mut engine, clock) = thousand_rows();
    let offsets = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&offsets);
    engine.on_update(move |state, engine| {
        sink.borrow_mut().push(state.scroll_offset);
        if !state.visible_range.contains(900) && state.scroll_offset > 0.0 {
            engine.scroll_to_index(900, ScrollAlign::Start);
        }
    });

    clock.advance(ms(16));
    engine.on_scroll(250.0);
    assert_eq!(*offsets.borrow(), [250.0, 45_000.0]);
    assert!(engine.get_state().visible_range.contains(900));
}

#[test]
fn shrinking_the_list_keeps_the_range_valid() {
    let (mut engine, clock) = thousand_rows();
    clock.advance(ms(16));
    engine.on_scroll(40_000.0);

    engine.update_options(OptionsUpdate::default().item_count(50));
    let state = engine.get_state();
    assert_eq!(state.total_extent, 2_500.0);
    assert!(state.visible_range.end < 50);
    assert!(!state.visible_range.is_empty());

    // The next sample from the surface is clamped to the new content.
    clock.advance(ms(16));
    engine.on_scroll(40_000.0);
    assert_eq!(engine.get_state().scroll_offset, 2_000.0);

    engine.update_options(OptionsUpdate::default().item_count(0));
    let state = engine.get_state();
    assert!(state.visible_range.is_empty());
    assert_eq!(state.total_extent, 0.0);
    assert_eq!(engine.scroll_to_index(4, ScrollAlign::End), 0.0);
}

#[test]
fn replacing_size_function_rebuilds_positions() {
    let (mut engine, _) = thousand_rows();
    assert!(engine.position_index().is_fixed());

    let sizing = ItemSize::variable(|i| if i < 10 { 100.0 } else { 20.0 });
    engine.update_options(OptionsUpdate::default().item_size(sizing.clone()));
    assert_eq!(engine.offset_of(11), 1_020.0);
    assert_eq!(engine.total_extent(), 1_000.0 + 990.0 * 20.0);

    // Same function again: nothing to rebuild, same answers.
    engine.update_options(OptionsUpdate::default().item_size(sizing));
    assert_eq!(engine.offset_of(11), 1_020.0);
}

#[test]
fn overscan_bounds_can_change_mid_scroll() {
    let (mut engine, clock) = thousand_rows();
    clock.advance(ms(10));
    engine.on_scroll(3_000.0);
    assert_eq!(engine.get_state().overscan, 10);

    engine.update_options(OptionsUpdate::default().overscan_bounds(1, 4));
    assert_eq!(engine.get_state().overscan, 4);
    assert!(engine.get_state().is_scrolling);
}

#[test]
fn overscan_bounds_compose_across_updates() {
    let (mut engine, clock) = thousand_rows();
    engine.update_options(OptionsUpdate::default().min_overscan(12));
    engine.update_options(OptionsUpdate::default().max_overscan(20));
    let overscan = engine.options().overscan;
    assert_eq!((overscan.min, overscan.max), (12, 20));
    assert_eq!(engine.effective_options().overscan.max, 20);

    clock.advance(ms(10));
    engine.on_scroll(3_000.0);
    assert_eq!(engine.get_state().overscan, 20);
}

#[test]
fn visibility_hints_only_in_hint_mode() {
    let (mut engine, _) = thousand_rows();
    assert!(!engine.report_visible(VisibleRange::new(30, 31)));

    engine.update_options(
        OptionsUpdate::default().refinement_mode(RefinementMode::ScrollPlusVisibilityHints),
    );
    assert!(engine.report_visible(VisibleRange::new(30, 31)));
    let range = engine.get_state().visible_range;
    assert_eq!(range, VisibleRange::new(0, 34));

    // Switching back drops the hint on the next recompute.
    engine.update_options(OptionsUpdate::default().refinement_mode(RefinementMode::ScrollOnly));
    assert_eq!(engine.get_state().visible_range, VisibleRange::new(0, 12));
}

#[test]
fn destroy_stops_everything() {
    let (mut engine, clock) = thousand_rows();
    let calls = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&calls);
    engine.on_update(move |_, _| *sink.borrow_mut() += 1);

    clock.advance(ms(16));
    engine.on_scroll(500.0);
    engine.destroy();
    engine.destroy();

    clock.advance(ms(1_000));
    assert!(!engine.tick());
    engine.on_scroll(1_500.0);
    engine.on_update(|_, _| panic!("registration after destroy must be ignored"));
    engine.update_options(OptionsUpdate::default().viewport_extent(10.0));
    assert!(!engine.report_visible(VisibleRange::new(0, 1)));
    assert_eq!(engine.scroll_to_index(700, ScrollAlign::Start), 500.0);
    assert_eq!(*calls.borrow(), 1);
}

#[cfg(feature = "std")]
#[test]
fn wall_clock_engine_goes_idle_with_zero_delay() {
    let options = EngineOptions::new(100, 20.0, 200.0).with_idle_delay(Duration::ZERO);
    let mut engine = WindowEngine::new(options);
    engine.on_scroll(100.0);
    assert!(engine.get_state().is_scrolling);
    assert!(engine.tick());
    assert!(!engine.get_state().is_scrolling);
}

#[cfg(feature = "serde")]
#[test]
fn state_snapshot_serializes() {
    let (engine, _) = thousand_rows();
    let json = serde_json::to_string(&engine.get_state()).expect("serialize state");
    let back: understory_windowing::EngineState = serde_json::from_str(&json).expect("deserialize state");
    assert_eq!(back, engine.get_state());

    let overscan: understory_windowing::OverscanConfig =
        serde_json::from_str(r#"{"max": 6}"#).expect("partial config uses defaults");
    assert_eq!((overscan.base, overscan.min, overscan.max), (3, 1, 6));
}
