//! High-level picker that ties a [`Grid`] to a [`SelectionEngine`].

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calendar::{
    Anchor, Cell, CellId, Clock, DateFilter, Grid, GridBuilder, IntoCalendarDate, Locale,
    PickOutcome, SelectionEngine, SelectionEvent, SelectionMode, SystemClock, DEFAULT_LABEL_FORMAT,
};
use crate::errors::{CalendarError, Result};

/// Returns `true` when the host has handled the click itself.
pub type CellClickInterceptor = dyn FnMut(&Cell) -> bool;

/// Serializable view of the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub mode: SelectionMode,
    pub selected: Vec<NaiveDate>,
    pub highlighted: Vec<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Anchor>,
}

pub struct CalendarPicker {
    grid: Option<Grid>,
    engine: SelectionEngine,
    filter: Option<Box<DateFilter>>,
    interceptor: Option<Box<CellClickInterceptor>>,
    locale: Locale,
    label_format: String,
    clock: Box<dyn Clock>,
    display_only: bool,
    ignore_validating_dates: bool,
    scroll_target: Option<usize>,
}

impl fmt::Debug for CalendarPicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarPicker")
            .field("initialized", &self.grid.is_some())
            .field("engine", &self.engine)
            .field("locale", &self.locale)
            .field("display_only", &self.display_only)
            .field("scroll_target", &self.scroll_target)
            .finish()
    }
}

impl Default for CalendarPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarPicker {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            grid: None,
            engine: SelectionEngine::default(),
            filter: None,
            interceptor: None,
            locale: Locale::default(),
            label_format: DEFAULT_LABEL_FORMAT.to_string(),
            clock: Box::new(clock),
            display_only: false,
            ignore_validating_dates: false,
            scroll_target: None,
        }
    }

    /// Builds the grid for `[min, max)` and resets every piece of selection state.
    ///
    /// The previous grid and selection survive if the build fails.
    pub fn init(
        &mut self,
        min: impl IntoCalendarDate,
        max: impl IntoCalendarDate,
        locale: Locale,
    ) -> Result<Initializer<'_>> {
        let grid = GridBuilder::new()
            .bounds(min, max)
            .today(self.clock.today())
            .locale(locale.clone())
            .maybe_selectable_filter(self.filter.as_deref())
            .label_format(&self.label_format)
            .build()?;
        info!(
            min = %grid.min_date(),
            max = %grid.max_date(),
            months = grid.months().len(),
            locale = %locale,
            "Calendar initialized"
        );

        self.engine.reset(SelectionMode::Single);
        self.display_only = false;
        self.ignore_validating_dates = false;
        self.scroll_target = None;
        self.locale = locale;
        self.grid = Some(grid);
        Ok(Initializer { picker: self })
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn mode(&self) -> SelectionMode {
        self.engine.mode()
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn anchor(&self) -> Option<Anchor> {
        self.engine.anchor()
    }

    pub fn is_display_only(&self) -> bool {
        self.display_only
    }

    pub fn label_format(&self) -> &str {
        &self.label_format
    }

    /// User gesture on a cell. The interceptor runs first, then display-only,
    /// then the usual pick checks.
    pub fn tap(&mut self, cell: CellId) -> Result<PickOutcome> {
        let grid = self.grid.as_mut().ok_or(CalendarError::NotInitialized)?;
        let target = grid.cell(cell).ok_or(CalendarError::UnknownCell(cell))?;
        if let Some(interceptor) = self.interceptor.as_mut() {
            if interceptor(target) {
                debug!(date = %target.date(), "Cell click intercepted");
                return Ok(PickOutcome::Intercepted);
            }
        }
        if self.display_only {
            return Ok(PickOutcome::Ignored);
        }
        self.engine.select(grid, cell, self.filter.as_deref())
    }

    /// Programmatic pick. Accepted picks move the scroll target to the date's month.
    pub fn select_date(&mut self, date: impl IntoCalendarDate) -> Result<PickOutcome> {
        let date = date.into_calendar_date();
        let grid = self.grid.as_mut().ok_or(CalendarError::NotInitialized)?;
        let outcome = self.engine.pick(grid, date, self.filter.as_deref());
        if outcome.is_accepted() {
            self.scroll_target = grid.month_index_of(date);
        }
        Ok(outcome)
    }

    pub fn highlight_date(&mut self, date: impl IntoCalendarDate) -> Result<usize> {
        self.highlight_dates([date.into_calendar_date()])
    }

    /// Highlights each date's cell. Returns how many cells were highlighted.
    pub fn highlight_dates(&mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Result<usize> {
        let dates: Vec<_> = dates.into_iter().collect();
        for date in &dates {
            self.validate(*date)?;
        }
        let grid = self.grid.as_mut().ok_or(CalendarError::NotInitialized)?;
        Ok(self.engine.highlight(grid, dates))
    }

    pub fn clear_highlighted_dates(&mut self) {
        if let Some(grid) = self.grid.as_mut() {
            self.engine.clear_highlights(grid);
        }
    }

    /// First date picked, in pick order.
    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.engine.picked_dates().first().copied()
    }

    /// Every selected day, range fill included, sorted.
    pub fn selected_dates(&self) -> Vec<NaiveDate> {
        self.grid
            .as_ref()
            .map(|grid| self.engine.selected_dates(grid))
            .unwrap_or_default()
    }

    pub fn highlighted_dates(&self) -> &[NaiveDate] {
        self.engine.highlighted_dates()
    }

    /// Changing the mode clears the selection.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        match self.grid.as_mut() {
            Some(grid) => self.engine.set_mode(grid, mode),
            None => self.engine.reset(mode),
        }
    }

    pub fn set_anchor(&mut self, anchor: Option<Anchor>) {
        self.engine.set_anchor(anchor);
    }

    /// Rebuilds the grid for the new locale, keeping selected and highlighted dates.
    pub fn set_locale(&mut self, locale: Locale) -> Result<()> {
        self.locale = locale;
        self.rebuild()
    }

    /// Replaces the host predicate and refreshes cell selectability. Picks the
    /// new predicate rejects are unselected and reported.
    pub fn set_date_filter(&mut self, filter: impl Fn(NaiveDate) -> bool + 'static) -> Result<()> {
        self.filter = Some(Box::new(filter));
        self.rebuild()
    }

    pub fn clear_date_filter(&mut self) -> Result<()> {
        self.filter = None;
        self.rebuild()
    }

    pub fn set_cell_click_interceptor(&mut self, interceptor: impl FnMut(&Cell) -> bool + 'static) {
        self.interceptor = Some(Box::new(interceptor));
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&SelectionEvent) + 'static) {
        self.engine.subscribe(listener);
    }

    /// Changes month labels in place.
    pub fn set_label_format(&mut self, format: &str) {
        self.label_format = format.to_string();
        if let Some(grid) = self.grid.as_mut() {
            grid.relabel(format);
        }
    }

    pub fn month_index_of(&self, date: impl IntoCalendarDate) -> Option<usize> {
        let date = date.into_calendar_date();
        self.grid.as_ref()?.month_index_of(date)
    }

    /// Month to show first: the first picked date's month, else today's.
    pub fn initial_month_index(&self) -> Option<usize> {
        let grid = self.grid.as_ref()?;
        self.engine
            .picked_dates()
            .first()
            .and_then(|date| grid.month_index_of(*date))
            .or_else(|| grid.month_index_of(grid.today()))
    }

    /// Month of the last accepted programmatic selection.
    pub fn scroll_target(&self) -> Option<usize> {
        self.scroll_target
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            mode: self.engine.mode(),
            selected: self.selected_dates(),
            highlighted: self.engine.highlighted_dates().to_vec(),
            anchor: self.engine.anchor(),
        }
    }

    fn validate(&self, date: NaiveDate) -> Result<()> {
        if self.ignore_validating_dates {
            return Ok(());
        }
        let grid = self.grid.as_ref().ok_or(CalendarError::NotInitialized)?;
        if grid.within_bounds(date) {
            Ok(())
        } else {
            Err(CalendarError::InvalidDate(format!(
                "{date} is outside [{}, {})",
                grid.min_date(),
                grid.max_date()
            )))
        }
    }

    fn rebuild(&mut self) -> Result<()> {
        let Some(current) = self.grid.as_ref() else {
            return Ok(());
        };
        let grid = GridBuilder::new()
            .bounds(current.min_date(), current.max_date())
            .today(self.clock.today())
            .locale(self.locale.clone())
            .maybe_selectable_filter(self.filter.as_deref())
            .label_format(&self.label_format)
            .selected_dates(self.engine.picked_dates().iter().copied())
            .highlighted_dates(self.engine.highlighted_dates().iter().copied())
            .build()?;
        debug!(locale = %self.locale, "Rebuilt calendar grid");
        let grid = self.grid.insert(grid);
        self.engine.restore(grid);
        Ok(())
    }
}

/// Fluent setup returned by [`CalendarPicker::init`].
pub struct Initializer<'a> {
    picker: &'a mut CalendarPicker,
}

impl<'a> Initializer<'a> {
    pub fn in_mode(self, mode: SelectionMode) -> Self {
        self.picker.set_mode(mode);
        self
    }

    pub fn with_selected_date(self, date: impl IntoCalendarDate) -> Result<Self> {
        self.with_selected_dates([date.into_calendar_date()])
    }

    /// Picks each date in turn under the current mode.
    ///
    /// SINGLE accepts at most one date and RANGE at most two. Range dates
    /// are picked in chronological order.
    pub fn with_selected_dates(self, dates: impl IntoIterator<Item = NaiveDate>) -> Result<Self> {
        let mut dates: Vec<_> = dates.into_iter().collect();
        let mode = self.picker.mode();
        let limit = match mode {
            SelectionMode::Single => Some(1),
            SelectionMode::Range => Some(2),
            _ => None,
        };
        if let Some(limit) = limit.filter(|limit| dates.len() > *limit) {
            return Err(CalendarError::InvalidSelection(format!(
                "{mode} mode accepts at most {limit} initial date(s), got {}",
                dates.len()
            )));
        }
        for date in &dates {
            self.picker.validate(*date)?;
        }
        if mode == SelectionMode::Range {
            dates.sort();
        }
        for date in dates {
            self.picker.select_date(date)?;
        }
        Ok(self)
    }

    pub fn with_highlighted_date(self, date: impl IntoCalendarDate) -> Result<Self> {
        self.picker.highlight_date(date)?;
        Ok(self)
    }

    pub fn with_highlighted_dates(self, dates: impl IntoIterator<Item = NaiveDate>) -> Result<Self> {
        self.picker.highlight_dates(dates)?;
        Ok(self)
    }

    /// Taps are ignored; programmatic selection still works.
    pub fn display_only(self) -> Self {
        self.picker.display_only = true;
        self
    }

    pub fn with_anchor(self, anchor: Anchor) -> Self {
        self.picker.set_anchor(Some(anchor));
        self
    }

    /// Skips the bounds check on initial and highlighted dates.
    pub fn ignore_validating_dates(self, ignore: bool) -> Self {
        self.picker.ignore_validating_dates = ignore;
        self
    }
}
