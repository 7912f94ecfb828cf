use crate::cli::context::ShellContext;
use crate::cli::error::{CommandError, CommandResult};
use crate::cli::output;
use crate::utils::build_info;

use super::{ArgumentKind, Command, CommandGroup, CommandTable};

pub(crate) fn definitions() -> Vec<Command> {
    use CommandGroup::Shell;

    vec![
        Command::new("help", Shell, "Show available commands", "help [command]", cmd_help)
            .completes(ArgumentKind::CommandName),
        Command::new("version", Shell, "Show build metadata", "version", cmd_version),
        Command::new("exit", Shell, "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("Calendar Core {}", meta.version));
    output::info(format!("  Build hash   : {}", meta.git_hash));
    output::info(format!("  Built at     : {}", meta.timestamp));
    output::info(format!("  Profile      : {}", meta.profile));
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first().map(|name| name.to_lowercase()) {
        match context.command(&name) {
            Some(entry) => print_command(entry),
            None => context.suggest_command(args[0]),
        }
        return Ok(());
    }

    print_overview(&context.commands);
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}

fn print_overview(commands: &CommandTable) {
    for (group, members) in commands.grouped() {
        output::section(group.title());
        for command in members {
            output::info(format!("  {:<17} {}", command.name, command.summary));
        }
    }
    output::info("Use `help <command>` for details.");
}

fn print_command(command: &Command) {
    output::section(format!("Help: {}", command.name));
    output::info(format!("  {}", command.summary));
    output::info(format!("  Usage: {}", command.usage));
    output::info(format!("  Group: {}", command.group.title()));
}
