use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use dialoguer::{theme::ColorfulTheme, Confirm};
use strsim::levenshtein;

use crate::calendar::{Grid, SelectionEvent};
use crate::config::{ConfigManager, PickerConfig};
use crate::picker::CalendarPicker;

use super::commands::{Command, CommandTable};
use super::error::{CliError, CommandError, LoopControl};
use super::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub(crate) commands: CommandTable,
    pub picker: CalendarPicker,
    pub config_manager: ConfigManager,
    pub config: PickerConfig,
    pub theme: ColorfulTheme,
    pub last_command: Option<String>,
    pub running: bool,
    events: Rc<RefCell<VecDeque<SelectionEvent>>>,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_config_manager(mode, ConfigManager::new()?)
    }

    pub fn with_config_manager(
        mode: CliMode,
        config_manager: ConfigManager,
    ) -> Result<Self, CliError> {
        let config = config_manager.load()?;
        output::set_color_enabled(mode == CliMode::Interactive && config.ui_color_enabled);

        let mut picker = CalendarPicker::new();
        picker.set_label_format(&config.month_label_format);
        let events = Rc::new(RefCell::new(VecDeque::new()));
        let sink = Rc::clone(&events);
        picker.subscribe(move |event| sink.borrow_mut().push_back(*event));

        Ok(Self {
            mode,
            commands: CommandTable::new(),
            picker,
            config_manager,
            config,
            theme: ColorfulTheme::default(),
            last_command: None,
            running: true,
            events,
        })
    }

    pub(crate) fn command(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn prompt(&self) -> String {
        match self.picker.grid() {
            Some(_) => format!("calendar [{}]> ", self.picker.mode()),
            None => "calendar> ".to_string(),
        }
    }

    pub fn grid(&self) -> Result<&Grid, CommandError> {
        self.picker.grid().ok_or(CommandError::NotInitialized)
    }

    /// Prints and drops every selection event raised since the last flush.
    pub fn flush_events(&self) {
        let drained: Vec<_> = self.events.borrow_mut().drain(..).collect();
        for event in drained {
            match event {
                SelectionEvent::Selected(date) => output::success(format!("Selected {date}")),
                SelectionEvent::Unselected(date) => output::info(format!("Unselected {date}")),
                SelectionEvent::InvalidSelected { date, reason } => {
                    output::warning(format!("Cannot select {date}: {reason}"))
                }
            }
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.commands.get(command).map(|entry| entry.handler) {
            let result = handler(self, args);
            self.flush_events();
            match result {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let mut suggestions: Vec<_> = self
            .commands
            .names()
            .map(|key| (levenshtein(key, input), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                output::info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt("Exit shell?")
            .default(true)
            .interact()?)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(&message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::NotInitialized => {
                output::error(CommandError::NotInitialized);
                output::hint("Try `init 2024-01-01 2024-04-01` to get started.");
                Ok(())
            }
            other => {
                output::error(other);
                Ok(())
            }
        }
    }

    /// Runs one shell line. Blank lines and `#` comments do nothing.
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(LoopControl::Continue);
        }
        let tokens = split_line(line)?;
        let Some(raw) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.last_command = Some(line.to_string());

        let control = self.dispatch(&raw.to_lowercase(), raw, &args)?;
        if control == LoopControl::Exit {
            self.running = false;
        }
        Ok(control)
    }
}

/// Splits a line with shell quoting rules.
pub(crate) fn split_line(line: &str) -> Result<Vec<String>, CommandError> {
    shell_words::split(line)
        .map_err(|err| CommandError::InvalidArguments(format!("cannot parse `{line}`: {err}")))
}
