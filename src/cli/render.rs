//! Plain-text month rendering for the shell.

use crate::calendar::{Cell, Grid, Month, RangeState};

pub const LEGEND: &str =
    "[dd] selected  <dd> in range  *dd* highlighted  (dd) today  -dd- unavailable";

const PADDING: &str = "  ..";

/// Label, weekday header and one line per week.
pub fn render_month(grid: &Grid, month: &Month) -> Vec<String> {
    let mut lines = Vec::with_capacity(month.week_count() + 2);
    lines.push(month.label().to_string());

    let header: String = grid
        .locale()
        .weekday_order()
        .iter()
        .map(|weekday| format!("{:>4}", &weekday.to_string()[..2]))
        .collect();
    lines.push(header);

    for week in month.weeks() {
        let row: String = grid.presented_week(week).into_iter().map(cell_token).collect();
        lines.push(row);
    }
    lines
}

fn cell_token(cell: &Cell) -> String {
    if !cell.is_current_month() {
        return PADDING.to_string();
    }
    let day = cell.display_value();
    if cell.is_selected() {
        return match cell.range_state() {
            RangeState::Middle => format!("<{day:>2}>"),
            _ => format!("[{day:>2}]"),
        };
    }
    if cell.is_highlighted() {
        format!("*{day:>2}*")
    } else if cell.is_today() {
        format!("({day:>2})")
    } else if !cell.is_selectable() {
        format!("-{day:>2}-")
    } else {
        format!(" {day:>2} ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{GridBuilder, Locale};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn renders_header_and_markers() {
        let grid = GridBuilder::new()
            .bounds(d(2024, 1, 1), d(2024, 2, 1))
            .today(d(2024, 1, 20))
            .locale(Locale::new("en-US"))
            .selected_dates([d(2024, 1, 10), d(2024, 1, 12)])
            .highlighted_dates([d(2024, 1, 25)])
            .build()
            .unwrap();
        let lines = render_month(&grid, &grid.months()[0]);

        assert_eq!(lines[0], "January 2024");
        assert_eq!(lines[1], "  Su  Mo  Tu  We  Th  Fr  Sa");
        // 2023-12-31 pads the first row.
        assert!(lines[2].starts_with(PADDING));
        let body = lines[2..].join("\n");
        assert!(body.contains("[10]"));
        assert!(body.contains("[12]"));
        assert!(body.contains("*25*"));
        assert!(body.contains("(20)"));
    }
}
