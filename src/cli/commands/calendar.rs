use chrono::Months;

use crate::calendar::{Anchor, Locale, SelectionMode};
use crate::cli::context::ShellContext;
use crate::cli::error::{CommandError, CommandResult};
use crate::cli::output;
use crate::cli::render::{render_month, LEGEND};

use super::{parse_date, require_arg, ArgumentKind, Command, CommandGroup};

pub(crate) fn definitions() -> Vec<Command> {
    use CommandGroup::{Calendar, Selection};

    vec![
        Command::new(
            "init",
            Calendar,
            "Build the calendar for [min, max)",
            "init <min YYYY-MM-DD> [max YYYY-MM-DD] [locale]",
            cmd_init,
        ),
        Command::new(
            "locale",
            Calendar,
            "Switch locale, keeping the selection",
            "locale <tag>",
            cmd_locale,
        ),
        Command::new("show", Calendar, "Render a month", "show [month-index]", cmd_show),
        Command::new(
            "mode",
            Selection,
            "Change the selection mode (clears the selection)",
            "mode <single|multiple|range|range-two-screens>",
            cmd_mode,
        )
        .completes(ArgumentKind::Mode),
        Command::new("select", Selection, "Pick a date", "select <YYYY-MM-DD>", cmd_select),
        Command::new(
            "anchor",
            Selection,
            "Fix one end of a two-screen range",
            "anchor <lower|higher> <YYYY-MM-DD> | anchor none",
            cmd_anchor,
        )
        .completes(ArgumentKind::Anchor),
        Command::new(
            "highlight",
            Selection,
            "Highlight one or more dates",
            "highlight <YYYY-MM-DD>...",
            cmd_highlight,
        ),
        Command::new(
            "clear-highlights",
            Selection,
            "Remove every highlight",
            "clear-highlights",
            cmd_clear_highlights,
        ),
        Command::new("selected", Selection, "List selected dates", "selected", cmd_selected),
        Command::new(
            "export",
            Selection,
            "Print the selection as JSON",
            "export",
            cmd_export,
        ),
    ]
}

fn cmd_init(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "init <min YYYY-MM-DD> [max YYYY-MM-DD] [locale]";
    let min = parse_date(require_arg(args, 0, usage)?)?;
    let max = match args.get(1) {
        Some(raw) => parse_date(raw)?,
        None => min
            .checked_add_months(Months::new(context.config.months_ahead))
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!(
                    "no date {} months after {min}",
                    context.config.months_ahead
                ))
            })?,
    };
    let locale = args
        .get(2)
        .map(|tag| Locale::new(tag))
        .unwrap_or_else(|| context.config.locale());

    let mode = context.config.selection_mode;
    let display_only = context.config.display_only;
    let initializer = context.picker.init(min, max, locale)?.in_mode(mode);
    if display_only {
        initializer.display_only();
    }

    let grid = context.grid()?;
    output::success(format!(
        "Calendar ready: {} month(s) from {} to {} ({}, {} mode)",
        grid.months().len(),
        grid.min_date(),
        grid.max_date(),
        grid.locale(),
        mode
    ));
    Ok(())
}

fn cmd_mode(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let raw = require_arg(args, 0, "mode <single|multiple|range|range-two-screens>")?;
    let mode: SelectionMode = raw
        .parse()
        .map_err(|err| CommandError::InvalidArguments(format!("{err}")))?;
    context.picker.set_mode(mode);
    output::success(format!("Selection mode set to {mode}"));
    Ok(())
}

fn cmd_select(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let date = parse_date(require_arg(args, 0, "select <YYYY-MM-DD>")?)?;
    let outcome = context.picker.select_date(date)?;
    if outcome.is_accepted() && context.picker.mode() == SelectionMode::Range {
        let selected = context.picker.selected_dates();
        if let (true, Some(start), Some(end)) = (selected.len() > 1, selected.first(), selected.last()) {
            output::info(format!("Range: {start} to {end} ({} days)", selected.len()));
        }
    }
    Ok(())
}

fn cmd_highlight(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: highlight <YYYY-MM-DD>...".into(),
        ));
    }
    let dates = args
        .iter()
        .map(|raw| parse_date(raw))
        .collect::<Result<Vec<_>, _>>()?;
    let count = context.picker.highlight_dates(dates)?;
    output::success(format!("Highlighted {count} date(s)"));
    Ok(())
}

fn cmd_clear_highlights(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.picker.clear_highlighted_dates();
    output::success("Highlights cleared");
    Ok(())
}

fn cmd_anchor(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "anchor <lower|higher> <YYYY-MM-DD> | anchor none";
    let kind = require_arg(args, 0, usage)?.to_ascii_lowercase();
    let anchor = match kind.as_str() {
        "none" => None,
        "lower" => Some(Anchor::Lower(parse_date(require_arg(args, 1, usage)?)?)),
        "higher" => Some(Anchor::Higher(parse_date(require_arg(args, 1, usage)?)?)),
        _ => return Err(CommandError::InvalidArguments(format!("usage: {usage}"))),
    };
    context.picker.set_anchor(anchor);
    match anchor {
        Some(anchor) => output::success(format!("Anchor set: {kind} {}", anchor.date())),
        None => output::success("Anchor cleared"),
    }
    Ok(())
}

fn cmd_locale(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let locale = Locale::new(require_arg(args, 0, "locale <tag>")?);
    let week_start = locale.first_day_of_week();
    context.picker.set_locale(locale)?;
    output::success(format!(
        "Locale set to {} (weeks start on {week_start})",
        context.picker.locale()
    ));
    Ok(())
}

fn cmd_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let grid = context.grid()?;
    let index = match args.first() {
        Some(raw) => raw.parse::<usize>().map_err(|_| {
            CommandError::InvalidArguments(format!("invalid month index `{raw}`"))
        })?,
        None => context.picker.initial_month_index().unwrap_or(0),
    };
    let month = grid.month(index).ok_or_else(|| {
        CommandError::InvalidArguments(format!(
            "month index {index} out of range (0..{})",
            grid.months().len()
        ))
    })?;

    let mut lines = render_month(grid, month).into_iter();
    if let Some(label) = lines.next() {
        output::section(label);
    }
    for line in lines {
        output::plain(line);
    }
    output::plain(LEGEND);
    Ok(())
}

fn cmd_selected(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.grid()?;
    let dates = context.picker.selected_dates();
    if dates.is_empty() {
        output::info("No dates selected");
        return Ok(());
    }
    let joined: Vec<_> = dates.iter().map(ToString::to_string).collect();
    output::info(format!("Selected ({}): {}", dates.len(), joined.join(", ")));
    Ok(())
}

fn cmd_export(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.grid()?;
    let json = serde_json::to_string_pretty(&context.picker.snapshot())?;
    output::plain(json);
    Ok(())
}
