use chrono::NaiveDate;

pub mod calendar;
pub mod config;
pub mod system;

use crate::calendar::SelectionMode;
use crate::config::PickerConfig;

use super::context::ShellContext;
use super::error::{CommandError, CommandResult};

pub(crate) type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// Help sections, listed in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum CommandGroup {
    Calendar,
    Selection,
    Settings,
    Shell,
}

impl CommandGroup {
    pub(crate) const ALL: [CommandGroup; 4] = [
        CommandGroup::Calendar,
        CommandGroup::Selection,
        CommandGroup::Settings,
        CommandGroup::Shell,
    ];

    pub(crate) fn title(self) -> &'static str {
        match self {
            CommandGroup::Calendar => "Calendar",
            CommandGroup::Selection => "Selection",
            CommandGroup::Settings => "Settings",
            CommandGroup::Shell => "Shell",
        }
    }
}

/// Which values the shell offers when completing a command's arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArgumentKind {
    Free,
    Mode,
    Anchor,
    ConfigAction,
    CommandName,
}

#[derive(Clone)]
pub(crate) struct Command {
    pub name: &'static str,
    pub group: CommandGroup,
    pub summary: &'static str,
    pub usage: &'static str,
    pub arguments: ArgumentKind,
    pub handler: CommandHandler,
}

impl Command {
    pub(crate) fn new(
        name: &'static str,
        group: CommandGroup,
        summary: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            group,
            summary,
            usage,
            arguments: ArgumentKind::Free,
            handler,
        }
    }

    pub(crate) fn completes(mut self, arguments: ArgumentKind) -> Self {
        self.arguments = arguments;
        self
    }

    /// Usage text after the command word, shown as an inline hint.
    pub(crate) fn argument_usage(&self) -> &'static str {
        self.usage
            .strip_prefix(self.name)
            .map(str::trim_start)
            .unwrap_or(self.usage)
    }
}

/// Every shell command, kept in definition order.
#[derive(Clone)]
pub(crate) struct CommandTable {
    commands: Vec<Command>,
}

impl CommandTable {
    pub(crate) fn new() -> Self {
        let mut commands = Vec::new();
        commands.extend(calendar::definitions());
        commands.extend(config::definitions());
        commands.extend(system::definitions());
        Self { commands }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|command| command.name == name)
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().map(|command| command.name)
    }

    /// Commands of each non-empty group, groups in help order.
    pub(crate) fn grouped(&self) -> Vec<(CommandGroup, Vec<&Command>)> {
        CommandGroup::ALL
            .into_iter()
            .map(|group| {
                let members = self
                    .commands
                    .iter()
                    .filter(|command| command.group == group)
                    .collect::<Vec<_>>();
                (group, members)
            })
            .filter(|(_, members)| !members.is_empty())
            .collect()
    }

    /// Values that may fill the next argument of `command`, given the
    /// arguments already typed.
    pub(crate) fn argument_values(&self, command: &str, typed: &[&str]) -> Vec<String> {
        let Some(entry) = self.get(command) else {
            return Vec::new();
        };
        let values: Vec<&str> = match (entry.arguments, typed) {
            (ArgumentKind::Mode, []) => SelectionMode::ALL.iter().map(|mode| mode.label()).collect(),
            (ArgumentKind::Anchor, []) => vec!["lower", "higher", "none"],
            (ArgumentKind::ConfigAction, []) => vec!["show", "set"],
            (ArgumentKind::ConfigAction, [action]) if action.eq_ignore_ascii_case("set") => {
                PickerConfig::KEYS.to_vec()
            }
            (ArgumentKind::ConfigAction, [action, key]) if action.eq_ignore_ascii_case("set") => {
                match *key {
                    "selection_mode" => SelectionMode::ALL.iter().map(|mode| mode.label()).collect(),
                    "display_only" | "ui_color_enabled" => vec!["true", "false"],
                    _ => Vec::new(),
                }
            }
            (ArgumentKind::CommandName, []) => self.names().collect(),
            _ => Vec::new(),
        };
        values.into_iter().map(str::to_string).collect()
    }
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

pub(crate) fn require_arg<'a>(
    args: &[&'a str],
    index: usize,
    usage: &str,
) -> Result<&'a str, CommandError> {
    args.get(index)
        .copied()
        .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {usage}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_follow_help_order() {
        let table = CommandTable::new();
        let groups: Vec<_> = table.grouped().into_iter().map(|(group, _)| group).collect();
        assert_eq!(groups, CommandGroup::ALL.to_vec());
        assert_eq!(table.get("select").map(|command| command.group), Some(CommandGroup::Selection));
    }

    #[test]
    fn argument_values_follow_command_kind() {
        let table = CommandTable::new();
        assert!(table.argument_values("mode", &[]).contains(&"range-two-screens".to_string()));
        assert_eq!(table.argument_values("anchor", &[]), vec!["lower", "higher", "none"]);
        assert!(table
            .argument_values("config", &["set"])
            .contains(&"months_ahead".to_string()));
        assert_eq!(
            table.argument_values("config", &["set", "display_only"]),
            vec!["true", "false"]
        );
        assert!(table.argument_values("select", &[]).is_empty());
        assert!(table.argument_values("mode", &["range"]).is_empty());
    }

    #[test]
    fn argument_usage_drops_command_word() {
        let table = CommandTable::new();
        let select = table.get("select").unwrap();
        assert_eq!(select.argument_usage(), "<YYYY-MM-DD>");
    }
}
