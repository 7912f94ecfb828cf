use std::{
    borrow::Cow,
    io::{self, BufRead},
};

use colored::Colorize;
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use super::commands::CommandTable;
use super::context::{CliMode, ShellContext};
use super::error::{CliError, LoopControl};
use super::output;

const SCRIPT_ENV: &str = "CALENDAR_CORE_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context, io::stdin().lock()),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<ShellHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(ShellHelper::new(context.commands.clone())));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    output::info("Type `help` to list commands, `init <min> <max>` to build a calendar.");
    while context.running {
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    editor.add_history_entry(line.trim()).ok();
                }
                if execute(context, &line)? == LoopControl::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// Feeds every input line to the shell until input ends or `exit` runs.
fn run_script(context: &mut ShellContext, input: impl BufRead) -> Result<(), CliError> {
    for line in input.lines() {
        if !context.running || execute(context, &line?)? == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

fn execute(context: &mut ShellContext, line: &str) -> Result<LoopControl, CliError> {
    match context.process_line(line) {
        Ok(control) => Ok(control),
        Err(err) => {
            context.report_error(err)?;
            Ok(LoopControl::Continue)
        }
    }
}

/// Completes command names, then the values a command accepts (modes,
/// anchor kinds, configuration keys), and hints the remaining usage.
struct ShellHelper {
    commands: CommandTable,
}

impl ShellHelper {
    fn new(commands: CommandTable) -> Self {
        Self { commands }
    }

    fn candidates(&self, before: &str, partial: &str) -> Vec<Pair> {
        let mut words = before.split_whitespace();
        let values: Vec<String> = match words.next() {
            None => self.commands.names().map(str::to_string).collect(),
            Some(command) => {
                let typed: Vec<&str> = words.collect();
                self.commands
                    .argument_values(&command.to_ascii_lowercase(), &typed)
            }
        };
        let partial = partial.to_ascii_lowercase();
        let mut matches: Vec<_> = values
            .into_iter()
            .filter(|value| value.starts_with(&partial))
            .collect();
        matches.sort();
        matches.dedup();
        matches
            .into_iter()
            .map(|value| Pair {
                display: value.clone(),
                replacement: value,
            })
            .collect()
    }

    fn usage_hint(&self, line: &str) -> Option<String> {
        let command = line.strip_suffix(' ')?;
        if command.contains(char::is_whitespace) {
            return None;
        }
        let usage = self
            .commands
            .get(&command.to_ascii_lowercase())?
            .argument_usage();
        (!usage.is_empty()).then(|| usage.to_string())
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        Ok((start, self.candidates(&prefix[..start], &prefix[start..])))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &ReadlineContext<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        self.usage_hint(line)
    }
}

impl Highlighter for ShellHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.dimmed().to_string())
    }
}

impl Validator for ShellHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}
