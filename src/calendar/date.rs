use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, TimeZone, Weekday};

/// Conversion into a calendar day with the time of day cleared.
///
/// Grid bounds and picks are compared by calendar day only, so every
/// instant-like input is reduced to its date before it reaches the grid.
pub trait IntoCalendarDate {
    fn into_calendar_date(self) -> NaiveDate;
}

impl IntoCalendarDate for NaiveDate {
    fn into_calendar_date(self) -> NaiveDate {
        self
    }
}

impl IntoCalendarDate for NaiveDateTime {
    fn into_calendar_date(self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> IntoCalendarDate for DateTime<Tz> {
    fn into_calendar_date(self) -> NaiveDate {
        self.date_naive()
    }
}

/// `(year, zero-based month)` key used for month ordering.
pub fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month0())
}

/// Compares by calendar day, never by instant.
pub fn same_day(a: impl IntoCalendarDate, b: impl IntoCalendarDate) -> bool {
    a.into_calendar_date() == b.into_calendar_date()
}

pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    month_key(a) == month_key(b)
}

/// `min` inclusive, `max` exclusive.
pub fn within_bounds(date: NaiveDate, min: NaiveDate, max: NaiveDate) -> bool {
    date >= min && date < max
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

pub fn next_month(first: NaiveDate) -> Option<NaiveDate> {
    first.checked_add_months(Months::new(1))
}

/// First day shown in a month's grid: the 1st walked back to the week start.
///
/// The grid never starts after the 1st, so a positive offset wraps back a week.
pub fn grid_start(first: NaiveDate, week_start: Weekday) -> NaiveDate {
    let mut offset = i64::from(week_start.num_days_from_sunday())
        - i64::from(first.weekday().num_days_from_sunday());
    if offset > 0 {
        offset -= 7;
    }
    first + Duration::days(offset)
}

pub fn min_date(dates: &[NaiveDate]) -> Option<NaiveDate> {
    dates.iter().min().copied()
}

pub fn max_date(dates: &[NaiveDate]) -> Option<NaiveDate> {
    dates.iter().max().copied()
}
