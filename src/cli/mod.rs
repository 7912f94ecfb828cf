//! Interactive shell around [`crate::picker::CalendarPicker`].

mod commands;
pub mod context;
mod error;
pub mod output;
pub mod render;
mod shell;

pub use context::{CliMode, ShellContext};
pub use error::{CliError, CommandError, CommandResult, LoopControl};
pub use shell::run_cli;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use tempfile::TempDir;

    fn process_script(lines: &[&str]) -> ShellContext {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let mut context = ShellContext::with_config_manager(CliMode::Script, manager).unwrap();
        for line in lines {
            match context.process_line(line) {
                Ok(LoopControl::Exit) => break,
                Ok(LoopControl::Continue) => {}
                Err(err) => context.report_error(err).unwrap(),
            }
        }
        context
    }

    #[test]
    fn script_builds_range_selection() {
        let context = process_script(&[
            "init 2024-01-01 2024-03-01 en-GB",
            "mode range",
            "select 2024-01-30",
            "select 2024-02-02",
        ]);
        assert_eq!(context.picker.selected_dates().len(), 4);
        assert_eq!(context.picker.locale().tag(), "en-GB");
    }

    #[test]
    fn exit_stops_processing() {
        let context = process_script(&["init 2024-01-01 2024-02-01", "exit", "select 2024-01-05"]);
        assert!(context.picker.selected_dates().is_empty());
    }
}
