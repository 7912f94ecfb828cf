use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Handle to a cell inside one specific grid build.
///
/// Handles carry the id of the grid that produced them, so a handle kept
/// across a rebuild is detected instead of silently addressing a new cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellId {
    grid: Uuid,
    index: usize,
}

impl CellId {
    pub(crate) fn new(grid: Uuid, index: usize) -> Self {
        Self { grid, index }
    }

    pub fn grid(&self) -> Uuid {
        self.grid
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.grid, self.index)
    }
}

/// Position of a cell inside a contiguous range selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeState {
    #[default]
    None,
    First,
    Middle,
    Last,
}

/// One calendar day as displayed in a month grid.
///
/// Everything except `selected`, `highlighted` and `range_state` is fixed
/// when the grid is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    date: NaiveDate,
    current_month: bool,
    selectable: bool,
    today: bool,
    selected: bool,
    highlighted: bool,
    range_state: RangeState,
}

impl Cell {
    pub(crate) fn new(
        date: NaiveDate,
        current_month: bool,
        selectable: bool,
        today: bool,
        selected: bool,
        highlighted: bool,
        range_state: RangeState,
    ) -> Self {
        Self {
            date,
            current_month,
            selectable,
            today,
            selected,
            highlighted,
            range_state,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Day of month; text formatting is left to the renderer.
    pub fn display_value(&self) -> u32 {
        self.date.day()
    }

    pub fn is_current_month(&self) -> bool {
        self.current_month
    }

    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    pub fn is_today(&self) -> bool {
        self.today
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn range_state(&self) -> RangeState {
        self.range_state
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub(crate) fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    pub(crate) fn set_range_state(&mut self, state: RangeState) {
        self.range_state = state;
    }
}
