//! Month grid construction and selection state.

mod cell;
mod clock;
pub mod date;
mod grid;
mod locale;
mod selection;

pub use cell::{Cell, CellId, RangeState};
pub use clock::{Clock, FixedClock, SystemClock};
pub use date::IntoCalendarDate;
pub use grid::{DateFilter, Grid, GridBuilder, Month, Week, DEFAULT_LABEL_FORMAT};
pub use locale::Locale;
pub use selection::{
    Anchor, PickOutcome, Rejection, SelectionEngine, SelectionEvent, SelectionListener,
    SelectionMode,
};
