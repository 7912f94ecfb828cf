use std::{fmt, mem, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::cell::{Cell, CellId, RangeState};
use super::grid::{DateFilter, Grid};
use crate::errors::{CalendarError, Result};

/// Policy applied when a date is picked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    /// One date at a time; a new pick replaces the old one.
    #[default]
    Single,
    /// Any number of dates; picking a selected date unselects it.
    Multiple,
    /// Two endpoints and every selectable day between them.
    Range,
    /// A range whose endpoints are chosen on separate views, one of them
    /// fixed by an [`Anchor`].
    #[serde(alias = "range-two-screens")]
    RangeOnTwoScreens,
}

impl SelectionMode {
    pub const ALL: [SelectionMode; 4] = [
        SelectionMode::Single,
        SelectionMode::Multiple,
        SelectionMode::Range,
        SelectionMode::RangeOnTwoScreens,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SelectionMode::Single => "single",
            SelectionMode::Multiple => "multiple",
            SelectionMode::Range => "range",
            SelectionMode::RangeOnTwoScreens => "range-two-screens",
        }
    }

    fn is_range(self) -> bool {
        matches!(self, SelectionMode::Range | SelectionMode::RangeOnTwoScreens)
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SelectionMode {
    type Err = CalendarError;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "single" => Ok(SelectionMode::Single),
            "multiple" | "multi" => Ok(SelectionMode::Multiple),
            "range" => Ok(SelectionMode::Range),
            "range-two-screens" | "range-on-two-screens" => Ok(SelectionMode::RangeOnTwoScreens),
            _ => Err(CalendarError::InvalidSelection(format!(
                "unknown selection mode `{}`",
                value.trim()
            ))),
        }
    }
}

/// Externally fixed endpoint for [`SelectionMode::RangeOnTwoScreens`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "date")]
pub enum Anchor {
    /// Fixed start; picks choose the end.
    Lower(NaiveDate),
    /// Fixed end; picks choose the start.
    Higher(NaiveDate),
}

impl Anchor {
    pub fn date(&self) -> NaiveDate {
        match self {
            Anchor::Lower(date) | Anchor::Higher(date) => *date,
        }
    }
}

/// Why a pick was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    OutOfBounds,
    Unselectable,
    NotInGrid,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Rejection::OutOfBounds => "outside the calendar bounds",
            Rejection::Unselectable => "not selectable",
            Rejection::NotInGrid => "not shown in the calendar",
        };
        f.write_str(label)
    }
}

/// Notification delivered to subscribers while a pick is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    Selected(NaiveDate),
    Unselected(NaiveDate),
    InvalidSelected { date: NaiveDate, reason: Rejection },
}

impl SelectionEvent {
    pub fn date(&self) -> NaiveDate {
        match self {
            SelectionEvent::Selected(date)
            | SelectionEvent::Unselected(date)
            | SelectionEvent::InvalidSelected { date, .. } => *date,
        }
    }
}

/// Result of a single pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    /// The picked date is now selected.
    Selected,
    /// The pick toggled an existing selection off.
    Unselected,
    Rejected(Rejection),
    /// A cell-click interceptor consumed the gesture.
    Intercepted,
    /// The picker is display-only.
    Ignored,
}

impl PickOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PickOutcome::Selected)
    }
}

pub type SelectionListener = Box<dyn FnMut(&SelectionEvent)>;

/// Owns the selection and highlight state for one picker.
///
/// The engine stores [`CellId`]s and mutates flags on the cells of the
/// [`Grid`] passed to each call. Subscribers are notified synchronously;
/// with no subscribers every notification is a no-op.
pub struct SelectionEngine {
    mode: SelectionMode,
    selected_cells: Vec<CellId>,
    picked: Vec<NaiveDate>,
    highlighted_cells: Vec<CellId>,
    highlighted_dates: Vec<NaiveDate>,
    anchor: Option<Anchor>,
    listeners: Vec<SelectionListener>,
}

impl fmt::Debug for SelectionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionEngine")
            .field("mode", &self.mode)
            .field("selected_cells", &self.selected_cells.len())
            .field("picked", &self.picked)
            .field("highlighted_dates", &self.highlighted_dates)
            .field("anchor", &self.anchor)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self::new(SelectionMode::default())
    }
}

impl SelectionEngine {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            selected_cells: Vec::new(),
            picked: Vec::new(),
            highlighted_cells: Vec::new(),
            highlighted_dates: Vec::new(),
            anchor: None,
            listeners: Vec::new(),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn anchor(&self) -> Option<Anchor> {
        self.anchor
    }

    /// Takes effect on the next pick.
    pub fn set_anchor(&mut self, anchor: Option<Anchor>) {
        self.anchor = anchor;
    }

    /// Selected cells in selection order, range fill included.
    pub fn selected_cells(&self) -> &[CellId] {
        &self.selected_cells
    }

    /// Dates the user actually picked, in pick order.
    pub fn picked_dates(&self) -> &[NaiveDate] {
        &self.picked
    }

    /// Highlighted cells, padding duplicates included.
    pub fn highlighted_cells(&self) -> &[CellId] {
        &self.highlighted_cells
    }

    pub fn highlighted_dates(&self) -> &[NaiveDate] {
        &self.highlighted_dates
    }

    /// Dates of every selected cell, sorted chronologically.
    pub fn selected_dates(&self, grid: &Grid) -> Vec<NaiveDate> {
        let mut dates: Vec<_> = self
            .selected_cells
            .iter()
            .filter_map(|id| grid.cell(*id).map(Cell::date))
            .collect();
        dates.sort();
        dates
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&SelectionEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Switching modes discards the current selection without notifying subscribers.
    pub fn set_mode(&mut self, grid: &mut Grid, mode: SelectionMode) {
        if self.mode == mode {
            return;
        }
        debug!(from = %self.mode, to = %mode, "Switching selection mode");
        self.discard_selection(grid);
        grid.clear_range_states();
        self.mode = mode;
    }

    /// Forgets every cell reference; used when the grid they pointed into is gone.
    pub(crate) fn reset(&mut self, mode: SelectionMode) {
        self.mode = mode;
        self.selected_cells.clear();
        self.picked.clear();
        self.highlighted_cells.clear();
        self.highlighted_dates.clear();
        self.anchor = None;
    }

    /// Picks `date`, locating its in-month cell in `grid`.
    pub fn pick(
        &mut self,
        grid: &mut Grid,
        date: NaiveDate,
        filter: Option<&DateFilter>,
    ) -> PickOutcome {
        if let Some(reason) = precondition(grid, date, filter) {
            return self.reject(date, reason);
        }
        match grid.find_selectable(date) {
            Some(cell) => self.apply(grid, cell, date),
            None => self.reject(date, Rejection::NotInGrid),
        }
    }

    /// Picks a specific cell. Padding cells and unselectable cells are rejected.
    pub fn select(
        &mut self,
        grid: &mut Grid,
        cell: CellId,
        filter: Option<&DateFilter>,
    ) -> Result<PickOutcome> {
        let target = grid.cell(cell).ok_or(CalendarError::UnknownCell(cell))?;
        let (date, selectable) = (target.date(), target.is_selectable());
        if let Some(reason) = precondition(grid, date, filter) {
            return Ok(self.reject(date, reason));
        }
        if !selectable {
            return Ok(self.reject(date, Rejection::Unselectable));
        }
        Ok(self.apply(grid, cell, date))
    }

    /// Highlights every cell showing each date, padding duplicates included.
    /// Dates without a selectable in-month cell are skipped. Returns how many
    /// dates were found.
    pub fn highlight(
        &mut self,
        grid: &mut Grid,
        dates: impl IntoIterator<Item = NaiveDate>,
    ) -> usize {
        let mut found = 0;
        for date in dates {
            if grid.find_selectable(date).is_none() {
                continue;
            }
            found += 1;
            if self.highlighted_dates.contains(&date) {
                continue;
            }
            for id in grid.cells_on(date) {
                if let Some(cell) = grid.cell_mut(id) {
                    cell.set_highlighted(true);
                }
                self.highlighted_cells.push(id);
            }
            self.highlighted_dates.push(date);
        }
        found
    }

    pub fn clear_highlights(&mut self, grid: &mut Grid) {
        for id in self.highlighted_cells.drain(..) {
            if let Some(cell) = grid.cell_mut(id) {
                cell.set_highlighted(false);
            }
        }
        self.highlighted_dates.clear();
    }

    /// Re-binds picked and highlighted dates to the cells of a rebuilt grid.
    ///
    /// The grid must have been seeded with [`Self::picked_dates`] and
    /// [`Self::highlighted_dates`]. Range markers are recomputed for the
    /// current mode. Picks whose cell is no longer selectable are unselected
    /// and reported; picks without a selected cell are dropped silently.
    pub fn restore(&mut self, grid: &mut Grid) {
        grid.clear_range_states();

        let picked = mem::take(&mut self.picked);
        self.selected_cells.clear();
        let mut dropped = Vec::new();
        for date in picked {
            let Some(id) = grid.find(date) else {
                continue;
            };
            let Some(cell) = grid.cell_mut(id) else {
                continue;
            };
            if !cell.is_selected() {
                continue;
            }
            if !cell.is_selectable() {
                cell.set_selected(false);
                dropped.push(date);
                continue;
            }
            self.selected_cells.push(id);
            self.picked.push(date);
        }

        match (self.mode, self.anchor, self.picked.first().copied()) {
            (SelectionMode::Range, _, _) if self.selected_cells.len() > 1 => self.fill_range(grid),
            (SelectionMode::RangeOnTwoScreens, Some(anchor), Some(date)) => {
                self.attach_anchor(grid, anchor, date)
            }
            _ => {}
        }

        self.highlighted_cells = grid
            .cells()
            .filter(|(_, cell)| cell.is_highlighted())
            .map(|(id, _)| id)
            .collect();
        let highlighted = &self.highlighted_cells;
        self.highlighted_dates.retain(|date| {
            highlighted
                .iter()
                .any(|id| grid.cell(*id).is_some_and(|cell| cell.date() == *date))
        });

        for date in dropped {
            debug!(%date, "Pick no longer selectable after rebuild");
            self.emit(SelectionEvent::Unselected(date));
        }
    }

    fn apply(&mut self, grid: &mut Grid, cell: CellId, date: NaiveDate) -> PickOutcome {
        debug!(%date, mode = %self.mode, "Applying pick");
        self.reset_range_states(grid);
        match self.mode {
            SelectionMode::Single => self.apply_single(grid, cell, date),
            SelectionMode::Multiple => self.apply_multiple(grid, cell, date),
            SelectionMode::Range => self.apply_range(grid, cell, date),
            SelectionMode::RangeOnTwoScreens => self.apply_two_screens(grid, cell, date),
        }
    }

    fn apply_single(&mut self, grid: &mut Grid, cell: CellId, date: NaiveDate) -> PickOutcome {
        self.clear_selection(grid);
        self.push_selected(grid, cell, date);
        self.emit(SelectionEvent::Selected(date));
        PickOutcome::Selected
    }

    fn apply_multiple(&mut self, grid: &mut Grid, cell: CellId, date: NaiveDate) -> PickOutcome {
        if let Some(pos) = self.selected_cells.iter().position(|id| *id == cell) {
            self.selected_cells.remove(pos);
            if let Some(target) = grid.cell_mut(cell) {
                target.set_selected(false);
            }
            if let Some(pos) = self.picked.iter().position(|picked| *picked == date) {
                self.picked.remove(pos);
            }
            self.emit(SelectionEvent::Unselected(date));
            return PickOutcome::Unselected;
        }
        self.push_selected(grid, cell, date);
        self.emit(SelectionEvent::Selected(date));
        PickOutcome::Selected
    }

    fn apply_range(&mut self, grid: &mut Grid, cell: CellId, date: NaiveDate) -> PickOutcome {
        match (self.picked.len(), self.picked.first().copied()) {
            (len, _) if len >= 2 => self.clear_selection(grid),
            (1, Some(start)) if date < start => self.clear_selection(grid),
            (1, Some(start)) if date == start => {
                debug!(%date, "Range start picked again");
                return PickOutcome::Selected;
            }
            _ => {}
        }
        self.push_selected(grid, cell, date);
        if self.selected_cells.len() > 1 {
            self.fill_range(grid);
        }
        self.emit(SelectionEvent::Selected(date));
        PickOutcome::Selected
    }

    fn apply_two_screens(&mut self, grid: &mut Grid, cell: CellId, date: NaiveDate) -> PickOutcome {
        self.clear_selection(grid);
        self.push_selected(grid, cell, date);
        if let Some(anchor) = self.anchor {
            self.attach_anchor(grid, anchor, date);
        }
        self.emit(SelectionEvent::Selected(date));
        PickOutcome::Selected
    }

    fn attach_anchor(&mut self, grid: &mut Grid, anchor: Anchor, date: NaiveDate) {
        let anchor_date = anchor.date();
        if anchor_date == date {
            return;
        }
        let Some(anchor_cell) = grid.find_selectable(anchor_date) else {
            warn!(%anchor_date, "Anchor date has no selectable cell in the current grid, ignoring it");
            return;
        };
        match anchor {
            Anchor::Lower(_) => self.selected_cells.insert(0, anchor_cell),
            Anchor::Higher(_) => {
                let pos = self.selected_cells.len().min(1);
                self.selected_cells.insert(pos, anchor_cell)
            }
        }
        if let Some(target) = grid.cell_mut(anchor_cell) {
            target.set_selected(true);
        }
        self.fill_range(grid);
    }

    /// Orders the two endpoints, marks them FIRST/LAST and selects every
    /// selectable day strictly between them as MIDDLE.
    fn fill_range(&mut self, grid: &mut Grid) {
        let (Some(&a), Some(&b)) = (self.selected_cells.first(), self.selected_cells.get(1)) else {
            return;
        };
        let (Some(a_date), Some(b_date)) = (
            grid.cell(a).map(Cell::date),
            grid.cell(b).map(Cell::date),
        ) else {
            return;
        };
        let (first, last, start, end) = if a_date <= b_date {
            (a, b, a_date, b_date)
        } else {
            (b, a, b_date, a_date)
        };
        self.selected_cells[0] = first;
        self.selected_cells[1] = last;

        for (id, state) in [(first, RangeState::First), (last, RangeState::Last)] {
            if let Some(cell) = grid.cell_mut(id) {
                cell.set_selected(true);
                cell.set_range_state(state);
            }
        }
        for id in grid.selectable_between(start, end) {
            if let Some(cell) = grid.cell_mut(id) {
                cell.set_selected(true);
                cell.set_range_state(RangeState::Middle);
            }
            self.selected_cells.push(id);
        }
        debug!(%start, %end, cells = self.selected_cells.len(), "Filled range");
    }

    fn push_selected(&mut self, grid: &mut Grid, cell: CellId, date: NaiveDate) {
        if let Some(target) = grid.cell_mut(cell) {
            target.set_selected(true);
        }
        self.selected_cells.push(cell);
        self.picked.push(date);
    }

    /// Unselects everything. Range modes only report the picked endpoints.
    fn clear_selection(&mut self, grid: &mut Grid) {
        let report_all = !self.mode.is_range();
        let cleared = mem::take(&mut self.selected_cells);
        let picked = mem::take(&mut self.picked);
        let mut events = Vec::new();
        for id in cleared {
            if let Some(cell) = grid.cell_mut(id) {
                cell.set_selected(false);
                cell.set_range_state(RangeState::None);
                if report_all || picked.contains(&cell.date()) {
                    events.push(SelectionEvent::Unselected(cell.date()));
                }
            }
        }
        for event in events {
            self.emit(event);
        }
    }

    fn discard_selection(&mut self, grid: &mut Grid) {
        for id in self.selected_cells.drain(..) {
            if let Some(cell) = grid.cell_mut(id) {
                cell.set_selected(false);
                cell.set_range_state(RangeState::None);
            }
        }
        self.picked.clear();
    }

    fn reset_range_states(&self, grid: &mut Grid) {
        for id in &self.selected_cells {
            if let Some(cell) = grid.cell_mut(*id) {
                cell.set_range_state(RangeState::None);
            }
        }
    }

    fn reject(&mut self, date: NaiveDate, reason: Rejection) -> PickOutcome {
        debug!(%date, %reason, "Rejected pick");
        self.emit(SelectionEvent::InvalidSelected { date, reason });
        PickOutcome::Rejected(reason)
    }

    fn emit(&mut self, event: SelectionEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

fn precondition(grid: &Grid, date: NaiveDate, filter: Option<&DateFilter>) -> Option<Rejection> {
    if !grid.within_bounds(date) {
        Some(Rejection::OutOfBounds)
    } else if filter.is_some_and(|filter| !filter(date)) {
        Some(Rejection::Unselectable)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::GridBuilder;
    use std::{cell::RefCell, rc::Rc};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn january() -> Grid {
        GridBuilder::new()
            .bounds(d(2024, 1, 1), d(2024, 2, 1))
            .today(d(2024, 1, 1))
            .build()
            .unwrap()
    }

    fn recorder(engine: &mut SelectionEngine) -> Rc<RefCell<Vec<SelectionEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        engine.subscribe(move |event| sink.borrow_mut().push(*event));
        events
    }

    #[test]
    fn mode_names_round_trip_through_from_str() {
        for mode in SelectionMode::ALL {
            assert_eq!(mode.label().parse::<SelectionMode>().unwrap(), mode);
        }
        assert_eq!(
            "RANGE_ON_TWO_SCREENS".parse::<SelectionMode>().unwrap(),
            SelectionMode::RangeOnTwoScreens
        );
        assert!("weekly".parse::<SelectionMode>().is_err());
    }

    #[test]
    fn single_replaces_previous_pick() {
        let mut grid = january();
        let mut engine = SelectionEngine::new(SelectionMode::Single);
        let events = recorder(&mut engine);

        engine.pick(&mut grid, d(2024, 1, 3), None);
        engine.pick(&mut grid, d(2024, 1, 9), None);

        assert_eq!(engine.selected_dates(&grid), vec![d(2024, 1, 9)]);
        assert_eq!(
            *events.borrow(),
            vec![
                SelectionEvent::Selected(d(2024, 1, 3)),
                SelectionEvent::Unselected(d(2024, 1, 3)),
                SelectionEvent::Selected(d(2024, 1, 9)),
            ]
        );
    }

    #[test]
    fn range_start_repicked_is_a_quiet_no_op() {
        let mut grid = january();
        let mut engine = SelectionEngine::new(SelectionMode::Range);
        let events = recorder(&mut engine);

        engine.pick(&mut grid, d(2024, 1, 5), None);
        let outcome = engine.pick(&mut grid, d(2024, 1, 5), None);

        assert_eq!(outcome, PickOutcome::Selected);
        assert_eq!(engine.picked_dates(), &[d(2024, 1, 5)]);
        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn rejected_pick_leaves_state_untouched() {
        let mut grid = january();
        let mut engine = SelectionEngine::new(SelectionMode::Multiple);
        let events = recorder(&mut engine);
        engine.pick(&mut grid, d(2024, 1, 3), None);

        let outcome = engine.pick(&mut grid, d(2024, 2, 1), None);
        assert_eq!(outcome, PickOutcome::Rejected(Rejection::OutOfBounds));

        let no_thirteenth: &DateFilter = &|date| date != d(2024, 1, 13);
        let outcome = engine.pick(&mut grid, d(2024, 1, 13), Some(no_thirteenth));
        assert_eq!(outcome, PickOutcome::Rejected(Rejection::Unselectable));

        assert_eq!(engine.picked_dates(), &[d(2024, 1, 3)]);
        assert_eq!(
            events.borrow().last(),
            Some(&SelectionEvent::InvalidSelected {
                date: d(2024, 1, 13),
                reason: Rejection::Unselectable
            })
        );
    }

    #[test]
    fn padding_cell_cannot_be_selected_directly() {
        let mut grid = january();
        let mut engine = SelectionEngine::default();
        let padding = grid
            .cells()
            .find(|(_, cell)| !cell.is_current_month())
            .map(|(id, _)| id)
            .unwrap();
        let outcome = engine.select(&mut grid, padding, None).unwrap();
        assert!(!outcome.is_accepted());
        assert!(engine.selected_cells().is_empty());
    }

    #[test]
    fn stale_cell_is_an_error() {
        let old = january();
        let mut grid = january();
        let mut engine = SelectionEngine::default();
        let stale = old.find(d(2024, 1, 10)).unwrap();
        let err = engine.select(&mut grid, stale, None).unwrap_err();
        assert!(matches!(err, CalendarError::UnknownCell(id) if id == stale));
    }

    #[test]
    fn lower_anchor_fills_towards_pick() {
        let mut grid = january();
        let mut engine = SelectionEngine::new(SelectionMode::RangeOnTwoScreens);
        engine.set_anchor(Some(Anchor::Lower(d(2024, 1, 10))));

        engine.pick(&mut grid, d(2024, 1, 14), None);

        let state = |date| grid.cell(grid.find(date).unwrap()).unwrap().range_state();
        assert_eq!(state(d(2024, 1, 10)), RangeState::First);
        assert_eq!(state(d(2024, 1, 12)), RangeState::Middle);
        assert_eq!(state(d(2024, 1, 14)), RangeState::Last);
        assert_eq!(engine.selected_dates(&grid).len(), 5);
        assert_eq!(engine.picked_dates(), &[d(2024, 1, 14)]);
    }

    #[test]
    fn unresolvable_anchor_degrades_to_single_pick() {
        let mut grid = january();
        let mut engine = SelectionEngine::new(SelectionMode::RangeOnTwoScreens);
        engine.set_anchor(Some(Anchor::Higher(d(2025, 6, 1))));

        let outcome = engine.pick(&mut grid, d(2024, 1, 14), None);

        assert_eq!(outcome, PickOutcome::Selected);
        assert_eq!(engine.selected_dates(&grid), vec![d(2024, 1, 14)]);
    }
}
