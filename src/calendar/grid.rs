use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use chrono::{Local, NaiveDate};
use tracing::debug;
use uuid::Uuid;

use super::cell::{Cell, CellId, RangeState};
use super::date::{self, IntoCalendarDate};
use super::locale::Locale;
use crate::errors::{CalendarError, Result};

pub const DEFAULT_LABEL_FORMAT: &str = "%B %Y";

/// Host predicate deciding whether an in-range date may be picked.
pub type DateFilter = dyn Fn(NaiveDate) -> bool;

/// Seven consecutive days, stored in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Week {
    cells: [CellId; 7],
}

impl Week {
    pub fn cells(&self) -> &[CellId; 7] {
        &self.cells
    }

    /// Cells in display order. Right-to-left locales read the week backwards.
    pub fn presentation_order(&self, right_to_left: bool) -> [CellId; 7] {
        let mut order = self.cells;
        if right_to_left {
            order.reverse();
        }
        order
    }
}

/// A calendar month plus the padding days needed to complete its weeks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Month {
    month_index: u32,
    year: i32,
    first_day: NaiveDate,
    label: String,
    weeks: Vec<Week>,
}

impl Month {
    /// Zero-based month, `0` for January.
    pub fn month_index(&self) -> u32 {
        self.month_index
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn weeks(&self) -> &[Week] {
        &self.weeks
    }

    pub fn week_count(&self) -> usize {
        self.weeks.len()
    }
}

#[derive(Debug, Clone, Copy)]
struct DateSlot {
    cell: CellId,
    month: usize,
}

/// Every month between the configured bounds, backed by a flat cell arena.
///
/// Months and weeks hold [`CellId`]s into the arena; the selection engine
/// mutates the same cells the renderer reads, so there is no copy to keep
/// in sync.
#[derive(Debug, Clone)]
pub struct Grid {
    id: Uuid,
    min_date: NaiveDate,
    max_date: NaiveDate,
    today: NaiveDate,
    locale: Locale,
    cells: Vec<Cell>,
    months: Vec<Month>,
    by_date: HashMap<NaiveDate, DateSlot>,
}

impl Grid {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn min_date(&self) -> NaiveDate {
        self.min_date
    }

    /// Exclusive upper bound.
    pub fn max_date(&self) -> NaiveDate {
        self.max_date
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn months(&self) -> &[Month] {
        &self.months
    }

    pub fn month(&self, index: usize) -> Option<&Month> {
        self.months.get(index)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        if id.grid() != self.id {
            return None;
        }
        self.cells.get(id.index())
    }

    pub(crate) fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        if id.grid() != self.id {
            return None;
        }
        self.cells.get_mut(id.index())
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.cell(id).is_some()
    }

    /// All cells in month, week, day order.
    pub fn cells(&self) -> impl Iterator<Item = (CellId, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| (CellId::new(self.id, index), cell))
    }

    /// A week's cells as the renderer should lay them out for this grid's locale.
    pub fn presented_week(&self, week: &Week) -> Vec<&Cell> {
        week.presentation_order(self.locale.is_right_to_left())
            .iter()
            .filter_map(|id| self.cell(*id))
            .collect()
    }

    /// The in-month cell for `date`, ignoring padding duplicates.
    pub fn find(&self, date: NaiveDate) -> Option<CellId> {
        self.by_date.get(&date).map(|slot| slot.cell)
    }

    pub fn find_selectable(&self, date: NaiveDate) -> Option<CellId> {
        self.find(date)
            .filter(|id| self.cell(*id).is_some_and(Cell::is_selectable))
    }

    /// Index of the month that owns `date`, if that month was built.
    pub fn month_index_of(&self, date: NaiveDate) -> Option<usize> {
        self.by_date.get(&date).map(|slot| slot.month)
    }

    pub fn within_bounds(&self, date: NaiveDate) -> bool {
        date::within_bounds(date, self.min_date, self.max_date)
    }

    /// Selectable cells strictly between `start` and `end`, found by scanning
    /// the whole grid in display order.
    pub(crate) fn selectable_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<CellId> {
        self.cells()
            .filter(|(_, cell)| cell.date() > start && cell.date() < end && cell.is_selectable())
            .map(|(id, _)| id)
            .collect()
    }

    /// Every cell showing `date`, padding duplicates included.
    pub fn cells_on(&self, date: NaiveDate) -> Vec<CellId> {
        self.cells()
            .filter(|(_, cell)| cell.date() == date)
            .map(|(id, _)| id)
            .collect()
    }

    pub(crate) fn clear_range_states(&mut self) {
        for cell in &mut self.cells {
            cell.set_range_state(RangeState::None);
        }
    }

    /// Re-formats month labels without rebuilding any cells.
    pub fn relabel(&mut self, format: &str) {
        for month in &mut self.months {
            month.label = format_label(month.first_day, format);
        }
    }
}

struct BuildContext {
    min: NaiveDate,
    max: NaiveDate,
    today: NaiveDate,
    selected: HashSet<NaiveDate>,
    highlighted: HashSet<NaiveDate>,
    range: Option<(NaiveDate, NaiveDate)>,
}

/// Builds a [`Grid`] for `[min_date, max_date)`.
pub struct GridBuilder<'a> {
    min_date: Option<NaiveDate>,
    max_date: Option<NaiveDate>,
    today: Option<NaiveDate>,
    locale: Locale,
    filter: Option<&'a DateFilter>,
    selected: Vec<NaiveDate>,
    highlighted: Vec<NaiveDate>,
    label_format: String,
}

impl Default for GridBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> GridBuilder<'a> {
    pub fn new() -> Self {
        Self {
            min_date: None,
            max_date: None,
            today: None,
            locale: Locale::default(),
            filter: None,
            selected: Vec::new(),
            highlighted: Vec::new(),
            label_format: DEFAULT_LABEL_FORMAT.to_string(),
        }
    }

    pub fn min_date(mut self, date: impl IntoCalendarDate) -> Self {
        self.min_date = Some(date.into_calendar_date());
        self
    }

    pub fn max_date(mut self, date: impl IntoCalendarDate) -> Self {
        self.max_date = Some(date.into_calendar_date());
        self
    }

    pub fn bounds(self, min: impl IntoCalendarDate, max: impl IntoCalendarDate) -> Self {
        self.min_date(min).max_date(max)
    }

    /// Reference day for `is_today`; defaults to the local date at build time.
    pub fn today(mut self, date: impl IntoCalendarDate) -> Self {
        self.today = Some(date.into_calendar_date());
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn selectable_filter(self, filter: &'a DateFilter) -> Self {
        self.maybe_selectable_filter(Some(filter))
    }

    pub fn maybe_selectable_filter(mut self, filter: Option<&'a DateFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn selected_dates(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.selected = dates.into_iter().collect();
        self
    }

    pub fn highlighted_dates(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.highlighted = dates.into_iter().collect();
        self
    }

    pub fn label_format(mut self, format: &str) -> Self {
        self.label_format = format.to_string();
        self
    }

    pub fn build(&self) -> Result<Grid> {
        let (min, max) = match (self.min_date, self.max_date) {
            (Some(min), Some(max)) => (min, max),
            _ => {
                return Err(CalendarError::InvalidRange(
                    "min and max dates must both be set".into(),
                ))
            }
        };
        if min >= max {
            return Err(CalendarError::InvalidRange(format!(
                "min date {min} must be before max date {max}"
            )));
        }
        // max is exclusive: a max on the 1st must not pull its month in.
        let last = max.pred_opt().ok_or_else(|| {
            CalendarError::InvalidRange(format!("max date {max} has no previous day"))
        })?;

        let range = if self.selected.len() > 1 {
            date::min_date(&self.selected).zip(date::max_date(&self.selected))
        } else {
            None
        };
        let ctx = BuildContext {
            min,
            max,
            today: self.today.unwrap_or_else(|| Local::now().date_naive()),
            selected: self.selected.iter().copied().collect(),
            highlighted: self.highlighted.iter().copied().collect(),
            range,
        };

        let mut grid = Grid {
            id: Uuid::new_v4(),
            min_date: min,
            max_date: max,
            today: ctx.today,
            locale: self.locale.clone(),
            cells: Vec::new(),
            months: Vec::new(),
            by_date: HashMap::new(),
        };

        let last_key = date::month_key(last);
        let mut cursor = date::first_of_month(min);
        while date::month_key(cursor) <= last_key {
            let month = self.build_month(&mut grid, cursor, &ctx)?;
            debug!(label = %month.label, year = month.year, month = month.month_index, "Adding month");
            grid.months.push(month);
            cursor = match date::next_month(cursor) {
                Some(next) => next,
                None => break,
            };
        }

        Ok(grid)
    }

    fn build_month(&self, grid: &mut Grid, first: NaiveDate, ctx: &BuildContext) -> Result<Month> {
        let month_number = grid.months.len();
        let (year, month_index) = date::month_key(first);
        let mut day = date::grid_start(first, self.locale.first_day_of_week());
        let mut weeks = Vec::new();

        while date::month_key(day) <= (year, month_index) {
            debug!(start = %day, "Building week row");
            let mut ids = [CellId::new(grid.id, 0); 7];
            for slot in ids.iter_mut() {
                let cell = self.build_cell(day, (year, month_index), ctx);
                let id = CellId::new(grid.id, grid.cells.len());
                if cell.is_current_month() {
                    grid.by_date.insert(
                        day,
                        DateSlot {
                            cell: id,
                            month: month_number,
                        },
                    );
                }
                grid.cells.push(cell);
                *slot = id;
                day = day.succ_opt().ok_or_else(|| {
                    CalendarError::InvalidRange(format!("no calendar day after {day}"))
                })?;
            }
            weeks.push(Week { cells: ids });
        }

        Ok(Month {
            month_index,
            year,
            first_day: first,
            label: format_label(first, &self.label_format),
            weeks,
        })
    }

    fn build_cell(&self, day: NaiveDate, month_key: (i32, u32), ctx: &BuildContext) -> Cell {
        let current_month = date::month_key(day) == month_key;
        let selectable = current_month
            && date::within_bounds(day, ctx.min, ctx.max)
            && self.filter.map_or(true, |filter| filter(day));
        let range_state = match ctx.range {
            Some((first, _)) if day == first => RangeState::First,
            Some((_, last)) if day == last => RangeState::Last,
            Some((first, last)) if day > first && day < last => RangeState::Middle,
            _ => RangeState::None,
        };

        Cell::new(
            day,
            current_month,
            selectable,
            date::same_day(day, ctx.today),
            current_month && ctx.selected.contains(&day),
            ctx.highlighted.contains(&day),
            range_state,
        )
    }
}

fn format_label(first: NaiveDate, format: &str) -> String {
    let mut label = String::new();
    if write!(label, "{}", first.format(format)).is_err() {
        label.clear();
        let _ = write!(label, "{}", first.format(DEFAULT_LABEL_FORMAT));
    }
    label
}
