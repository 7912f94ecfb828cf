#![doc(test(attr(deny(warnings))))]

//! Calendar Core builds month-by-month calendar grids for a bounded date
//! range and tracks date selection over them in single, multiple, range and
//! anchored two-screen range modes.

pub mod calendar;
pub mod cli;
pub mod config;
pub mod errors;
pub mod picker;
pub mod utils;

pub use calendar::{
    Anchor, Cell, CellId, Grid, GridBuilder, Locale, PickOutcome, RangeState, SelectionEngine,
    SelectionEvent, SelectionMode,
};
pub use errors::{CalendarError, Result};
pub use picker::{CalendarPicker, SelectionSnapshot};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Calendar Core tracing initialized.");
    });
}
