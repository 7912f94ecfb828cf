use crate::cli::context::{CliMode, ShellContext};
use crate::cli::error::{CommandError, CommandResult};
use crate::cli::output;
use crate::config::PickerConfig;

use super::{ArgumentKind, Command, CommandGroup};

pub(crate) fn definitions() -> Vec<Command> {
    vec![Command::new(
        "config",
        CommandGroup::Settings,
        "Show or change saved picker defaults",
        "config [show | set <key> <value>]",
        cmd_config,
    )
    .completes(ArgumentKind::ConfigAction)]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|action| action.to_ascii_lowercase()).as_deref() {
        None | Some("show") => show_config(context),
        Some("set") => {
            let (Some(key), Some(value)) = (args.get(1), args.get(2)) else {
                return Err(CommandError::InvalidArguments(format!(
                    "usage: config set <key> <value> (keys: {})",
                    PickerConfig::KEYS.join(", ")
                )));
            };
            set_config(context, key, value)
        }
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{other}`"
        ))),
    }
}

fn show_config(context: &ShellContext) -> CommandResult {
    let config = &context.config;
    output::section("Configuration");
    output::info(format!("  locale             : {}", config.locale));
    output::info(format!("  selection_mode     : {}", config.selection_mode));
    output::info(format!("  month_label_format : {}", config.month_label_format));
    output::info(format!("  months_ahead       : {}", config.months_ahead));
    output::info(format!("  display_only       : {}", config.display_only));
    output::info(format!("  ui_color_enabled   : {}", config.ui_color_enabled));
    output::info(format!(
        "  file               : {}",
        context.config_manager.path().display()
    ));
    Ok(())
}

fn set_config(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let mut updated = context.config.clone();
    updated
        .set(key, value)
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
    context.config_manager.save(&updated)?;

    match key {
        "month_label_format" => context.picker.set_label_format(&updated.month_label_format),
        "ui_color_enabled" if context.mode == CliMode::Interactive => {
            output::set_color_enabled(updated.ui_color_enabled)
        }
        _ => {}
    }
    context.config = updated;
    output::success(format!("Saved {key} = {value}"));
    Ok(())
}
