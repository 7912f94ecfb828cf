#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use calendar_core::{
    calendar::{FixedClock, Grid, GridBuilder},
    CalendarPicker, Locale, SelectionEvent,
};
use chrono::NaiveDate;

pub fn d(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// January 2024 laid out with Sunday week starts, today fixed on the 15th.
pub fn january_grid() -> Grid {
    GridBuilder::new()
        .bounds(d(2024, 1, 1), d(2024, 2, 1))
        .today(d(2024, 1, 15))
        .locale(Locale::new("en-US"))
        .build()
        .expect("build january grid")
}

/// A picker over Jan-Mar 2024 whose clock is pinned to 2024-01-15.
pub fn quarter_picker() -> CalendarPicker {
    let mut picker = CalendarPicker::with_clock(FixedClock(d(2024, 1, 15)));
    picker
        .init(d(2024, 1, 1), d(2024, 4, 1), Locale::new("en-US"))
        .expect("init quarter picker");
    picker
}

pub type EventLog = Rc<RefCell<Vec<SelectionEvent>>>;

pub fn record_events(picker: &mut CalendarPicker) -> EventLog {
    let log: EventLog = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    picker.subscribe(move |event| sink.borrow_mut().push(*event));
    log
}
