mod common;

use std::{cell::Cell as Counter, rc::Rc};

use calendar_core::{
    calendar::{FixedClock, Rejection},
    Anchor, CalendarError, CalendarPicker, Locale, PickOutcome, RangeState, SelectionEvent,
    SelectionMode, SelectionSnapshot,
};
use chrono::{Datelike, Weekday};
use common::{d, quarter_picker, record_events};

#[test]
fn init_resets_previous_state() {
    let mut picker = quarter_picker();
    picker.set_mode(SelectionMode::Multiple);
    picker.select_date(d(2024, 1, 3)).unwrap();
    picker.highlight_date(d(2024, 1, 4)).unwrap();
    picker.set_anchor(Some(Anchor::Lower(d(2024, 1, 2))));

    picker
        .init(d(2024, 5, 1), d(2024, 7, 1), Locale::new("de-DE"))
        .unwrap();

    assert_eq!(picker.mode(), SelectionMode::Single);
    assert!(picker.selected_dates().is_empty());
    assert!(picker.highlighted_dates().is_empty());
    assert_eq!(picker.anchor(), None);
    assert_eq!(picker.grid().unwrap().months().len(), 2);
    assert_eq!(picker.locale().first_day_of_week(), Weekday::Mon);
}

#[test]
fn initializer_seeds_range() {
    let mut picker = CalendarPicker::with_clock(FixedClock(d(2024, 1, 15)));
    picker
        .init(d(2024, 1, 1), d(2024, 4, 1), Locale::new("en-US"))
        .unwrap()
        .in_mode(SelectionMode::Range)
        .with_selected_dates([d(2024, 2, 10), d(2024, 2, 3)])
        .unwrap()
        .with_highlighted_dates([d(2024, 3, 8)])
        .unwrap();

    assert_eq!(picker.selected_dates().len(), 8);
    assert_eq!(picker.selected_date(), Some(d(2024, 2, 3)));
    assert_eq!(picker.scroll_target(), Some(1));
    assert_eq!(picker.initial_month_index(), Some(1));
    assert_eq!(picker.highlighted_dates(), &[d(2024, 3, 8)]);
}

#[test]
fn initializer_limits_dates_per_mode() {
    let mut picker = quarter_picker();
    let result = picker
        .init(d(2024, 1, 1), d(2024, 4, 1), Locale::default())
        .unwrap()
        .in_mode(SelectionMode::Range)
        .with_selected_dates([d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4)]);
    assert!(matches!(result.err(), Some(CalendarError::InvalidSelection(_))));

    let result = picker
        .init(d(2024, 1, 1), d(2024, 4, 1), Locale::default())
        .unwrap()
        .in_mode(SelectionMode::Multiple)
        .with_selected_dates([d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4)]);
    assert!(result.is_ok());
    assert_eq!(picker.selected_dates().len(), 3);
}

#[test]
fn out_of_bounds_initial_dates_need_opt_out() {
    let mut picker = quarter_picker();
    let result = picker
        .init(d(2024, 1, 1), d(2024, 4, 1), Locale::default())
        .unwrap()
        .with_selected_date(d(2024, 6, 1));
    assert!(matches!(result.err(), Some(CalendarError::InvalidDate(_))));

    let mut picker = quarter_picker();
    let log = record_events(&mut picker);
    picker
        .init(d(2024, 1, 1), d(2024, 4, 1), Locale::default())
        .unwrap()
        .ignore_validating_dates(true)
        .with_selected_date(d(2024, 6, 1))
        .unwrap();
    assert!(picker.selected_dates().is_empty());
    assert_eq!(
        *log.borrow(),
        vec![SelectionEvent::InvalidSelected {
            date: d(2024, 6, 1),
            reason: Rejection::OutOfBounds
        }]
    );
}

#[test]
fn tap_honours_interceptor_and_display_only() {
    let mut picker = quarter_picker();
    let intercepted = Rc::new(Counter::new(0));
    let counter = Rc::clone(&intercepted);
    picker.set_cell_click_interceptor(move |cell| {
        if cell.date().weekday() == Weekday::Mon {
            counter.set(counter.get() + 1);
            true
        } else {
            false
        }
    });

    let monday = picker.grid().unwrap().find(d(2024, 1, 8)).unwrap();
    let tuesday = picker.grid().unwrap().find(d(2024, 1, 9)).unwrap();
    assert_eq!(picker.tap(monday).unwrap(), PickOutcome::Intercepted);
    assert_eq!(intercepted.get(), 1);
    assert_eq!(picker.tap(tuesday).unwrap(), PickOutcome::Selected);

    picker
        .init(d(2024, 1, 1), d(2024, 4, 1), Locale::default())
        .unwrap()
        .display_only();
    let tuesday = picker.grid().unwrap().find(d(2024, 1, 9)).unwrap();
    assert_eq!(picker.tap(tuesday).unwrap(), PickOutcome::Ignored);
    assert!(picker.selected_dates().is_empty());
    assert!(picker.select_date(d(2024, 1, 9)).unwrap().is_accepted());
}

#[test]
fn tap_with_stale_cell_is_an_error() {
    let mut picker = quarter_picker();
    let stale = picker.grid().unwrap().find(d(2024, 1, 9)).unwrap();
    picker
        .init(d(2024, 1, 1), d(2024, 4, 1), Locale::default())
        .unwrap();
    assert!(matches!(picker.tap(stale), Err(CalendarError::UnknownCell(_))));
}

#[test]
fn locale_change_keeps_selection() {
    let mut picker = quarter_picker();
    picker.set_mode(SelectionMode::Range);
    picker.select_date(d(2024, 2, 27)).unwrap();
    picker.select_date(d(2024, 3, 2)).unwrap();
    picker.highlight_date(d(2024, 3, 15)).unwrap();
    let before = picker.selected_dates();
    let old_grid = picker.grid().unwrap().id();

    picker.set_locale(Locale::new("fr-FR")).unwrap();

    let grid = picker.grid().unwrap();
    assert_ne!(grid.id(), old_grid);
    assert_eq!(grid.locale().first_day_of_week(), Weekday::Mon);
    assert_eq!(picker.selected_dates(), before);
    let last = grid.cell(grid.find(d(2024, 3, 2)).unwrap()).unwrap();
    assert_eq!(last.range_state(), RangeState::Last);
    assert_eq!(picker.highlighted_dates(), &[d(2024, 3, 15)]);

    // the rebuilt range still behaves like a completed range
    picker.select_date(d(2024, 3, 20)).unwrap();
    assert_eq!(picker.selected_dates(), vec![d(2024, 3, 20)]);
}

#[test]
fn date_filter_refreshes_selectability() {
    let mut picker = quarter_picker();
    picker
        .set_date_filter(|date| date.weekday() != Weekday::Sun)
        .unwrap();
    let grid = picker.grid().unwrap();
    assert!(grid.find_selectable(d(2024, 1, 7)).is_none());
    assert_eq!(
        picker.select_date(d(2024, 1, 7)).unwrap(),
        PickOutcome::Rejected(Rejection::Unselectable)
    );

    picker.clear_date_filter().unwrap();
    assert!(picker.select_date(d(2024, 1, 7)).unwrap().is_accepted());
}

#[test]
fn snapshot_serializes_selection() {
    let mut picker = quarter_picker();
    picker.set_mode(SelectionMode::Multiple);
    picker.select_date(d(2024, 2, 14)).unwrap();
    picker.select_date(d(2024, 1, 1)).unwrap();

    let snapshot = picker.snapshot();
    assert_eq!(snapshot.selected, vec![d(2024, 1, 1), d(2024, 2, 14)]);

    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"mode\":\"multiple\""));
    assert!(json.contains("2024-02-14"));
    let parsed: SelectionSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, snapshot);
}

#[test]
fn label_format_updates_in_place() {
    let mut picker = quarter_picker();
    let id = picker.grid().unwrap().id();
    picker.set_label_format("%b '%y");
    let grid = picker.grid().unwrap();
    assert_eq!(grid.id(), id);
    assert_eq!(grid.months()[2].label(), "Mar '24");
}

#[test]
fn padding_copy_of_highlight_clears_after_rebuild() {
    let mut picker = quarter_picker();
    picker.highlight_date(d(2024, 1, 31)).unwrap();
    let copies = picker.grid().unwrap().cells_on(d(2024, 1, 31));
    assert_eq!(copies.len(), 2);
    assert!(copies
        .iter()
        .all(|id| picker.grid().unwrap().cell(*id).unwrap().is_highlighted()));

    picker.set_locale(Locale::new("fr-FR")).unwrap();
    let grid = picker.grid().unwrap();
    assert_eq!(grid.cells_on(d(2024, 1, 31)).len(), 2);
    assert_eq!(picker.highlighted_dates(), &[d(2024, 1, 31)]);

    picker.clear_highlighted_dates();
    let grid = picker.grid().unwrap();
    assert!(grid.cells().all(|(_, cell)| !cell.is_highlighted()));
    assert!(picker.highlighted_dates().is_empty());
}

#[test]
fn rebuild_in_multiple_mode_leaves_no_range_markers() {
    let mut picker = quarter_picker();
    picker.set_mode(SelectionMode::Multiple);
    picker.select_date(d(2024, 1, 5)).unwrap();
    picker.select_date(d(2024, 1, 10)).unwrap();

    picker.set_locale(Locale::new("fr-FR")).unwrap();
    let grid = picker.grid().unwrap();
    assert!(grid
        .cells()
        .all(|(_, cell)| cell.range_state() == RangeState::None));
    assert_eq!(picker.selected_dates(), vec![d(2024, 1, 5), d(2024, 1, 10)]);

    picker.set_mode(SelectionMode::Range);
    picker.select_date(d(2024, 1, 20)).unwrap();
    let grid = picker.grid().unwrap();
    let marked: Vec<_> = grid
        .cells()
        .filter(|(_, cell)| cell.range_state() != RangeState::None || cell.is_selected())
        .map(|(_, cell)| cell.date())
        .collect();
    assert_eq!(marked, vec![d(2024, 1, 20)]);
}

#[test]
fn rebuild_with_half_built_range_completes_cleanly() {
    let mut picker = quarter_picker();
    picker.set_mode(SelectionMode::Range);
    picker.select_date(d(2024, 1, 5)).unwrap();

    picker.set_locale(Locale::new("fr-FR")).unwrap();
    assert_eq!(picker.selected_dates(), vec![d(2024, 1, 5)]);
    assert!(picker
        .grid()
        .unwrap()
        .cells()
        .all(|(_, cell)| cell.range_state() == RangeState::None));

    picker.select_date(d(2024, 1, 12)).unwrap();
    let grid = picker.grid().unwrap();
    let state = |day| grid.cell(grid.find(d(2024, 1, day)).unwrap()).unwrap().range_state();
    assert_eq!(state(5), RangeState::First);
    assert_eq!(state(8), RangeState::Middle);
    assert_eq!(state(12), RangeState::Last);
    assert_eq!(state(13), RangeState::None);
    assert_eq!(picker.selected_dates().len(), 8);
}

#[test]
fn filter_change_drops_picks_it_rejects() {
    let mut picker = quarter_picker();
    let events = record_events(&mut picker);
    picker.select_date(d(2024, 1, 7)).unwrap();
    events.borrow_mut().clear();

    picker
        .set_date_filter(|date| date.weekday() != Weekday::Sun)
        .unwrap();

    let grid = picker.grid().unwrap();
    let cell = grid.cell(grid.find(d(2024, 1, 7)).unwrap()).unwrap();
    assert!(!cell.is_selected());
    assert!(!cell.is_selectable());
    assert!(picker.selected_dates().is_empty());
    assert_eq!(picker.selected_date(), None);
    assert_eq!(
        events.borrow().as_slice(),
        &[SelectionEvent::Unselected(d(2024, 1, 7))]
    );
}

#[test]
fn filter_change_on_range_endpoint_keeps_the_other_pick() {
    let mut picker = quarter_picker();
    picker.set_mode(SelectionMode::Range);
    picker.select_date(d(2024, 1, 3)).unwrap();
    picker.select_date(d(2024, 1, 11)).unwrap();

    picker
        .set_date_filter(|date| date.weekday() != Weekday::Wed)
        .unwrap();

    assert_eq!(picker.selected_dates(), vec![d(2024, 1, 11)]);
    let grid = picker.grid().unwrap();
    assert!(grid
        .cells()
        .all(|(_, cell)| cell.range_state() == RangeState::None));
}
